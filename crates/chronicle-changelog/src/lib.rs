//! chronicle changelog - conventional commit changelogs
//!
//! This crate parses commit messages, classifies them into changelog
//! categories, renders the result in several link styles and merges new
//! releases into a changelog document.

pub mod categories;
pub mod formatter;
pub mod generator;
pub mod merge;
pub mod parser;
pub mod pipeline;
pub mod references;
pub mod types;

pub use categories::{CategoryFilter, ChangeCategory, CATEGORIES};
pub use formatter::{ChangelogRenderer, LinkStyle, RenderedChangelog, RepoLinks};
pub use generator::{ChangelogGenerator, GeneratorOptions};
pub use merge::{merge_document, MergeOutcome, ReleaseSection};
pub use parser::{ConventionalParser, GrammarError, ParserConfig};
pub use pipeline::{run_changelog, ChangelogRun, FileUpdate, RunContext, RunOutcome};
pub use types::{BreakingChange, ChangelogEntry, ChangelogModel, Note, ParsedCommit, Section};
