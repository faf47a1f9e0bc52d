//! chronicle git - repository history access
//!
//! This crate resolves commit ranges and fetches commit history through the
//! [`HistoryProvider`] trait, with a GitHub implementation and an in-memory
//! mock. Local git access is limited to deriving the repository slug.

mod fetch;
pub mod github;
pub mod mock;
pub mod provider;
mod range;
mod repository;
pub mod types;

pub use fetch::fetch_commits;
pub use github::GitHubProvider;
pub use mock::MockHistoryProvider;
pub use provider::{HistoryProvider, COMMITS_PER_PAGE};
pub use range::resolve_range;
pub use repository::{GitRepo, DEFAULT_REMOTE};
pub use types::{CommitPage, CommitRange, CommitRecord, RelatedIssue, TagRef};
