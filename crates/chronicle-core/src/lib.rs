//! chronicle core - shared configuration, errors and types
//!
//! This crate provides the foundational types, error handling and
//! configuration loading for the chronicle changelog compiler.

pub mod config;
pub mod error;
pub mod types;

pub use config::{ChangelogSettings, Language, RangeRequest};
pub use error::{ChronicleError, Result};
pub use types::RepoSlug;
