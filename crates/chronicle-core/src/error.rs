//! Error types for chronicle

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using ChronicleError
pub type Result<T> = std::result::Result<T, ChronicleError>;

/// Main error type for chronicle operations
#[derive(Debug, Error)]
pub enum ChronicleError {
    /// Configuration-related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Local git repository errors
    #[error(transparent)]
    Git(#[from] GitError),

    /// Commit range resolution errors
    #[error(transparent)]
    Range(#[from] RangeError),

    /// Repository history provider errors
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Changelog-related errors
    #[error(transparent)]
    Changelog(#[from] ChangelogError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found at {0}")]
    NotFound(PathBuf),

    /// Invalid configuration value
    #[error("Invalid configuration: {field} - {message}")]
    InvalidValue { field: String, message: String },

    /// Missing required field
    #[error("Missing required configuration field: {0}")]
    MissingField(String),

    /// Both a single tag and a from/to pair were supplied
    #[error("Must provide EITHER input tag OR (fromTag and toTag), not both!")]
    AmbiguousRange,

    /// Neither a single tag nor a from/to pair was supplied
    #[error("Must provide either input tag OR (fromTag and toTag). None found.")]
    MissingRange,

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// IO error
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),
}

/// Local git repository errors
#[derive(Debug, Error)]
pub enum GitError {
    /// Not a git repository
    #[error("Not a git repository: {0}")]
    NotARepository(PathBuf),

    /// Failed to open repository
    #[error("Failed to open repository: {0}")]
    OpenFailed(String),

    /// Remote not found
    #[error("Remote not found: {0}")]
    RemoteNotFound(String),

    /// Remote URL does not point at a recognizable owner/name repository
    #[error("Cannot derive a repository slug from remote URL: {0}")]
    UnrecognizedRemote(String),

    /// Git2 library error
    #[error("Git error: {0}")]
    Git2(#[from] git2::Error),
}

/// Commit range resolution errors
#[derive(Debug, Error)]
pub enum RangeError {
    /// Fewer than two tags exist in single-tag mode
    #[error("Couldn't find a previous tag ({found} tag(s) found). Make sure you have at least 2 tags already (current tag + previous initial tag).")]
    NotEnoughTags { found: usize },

    /// The most recent tag is not the one that was requested
    #[error("Provided tag {expected} doesn't match latest tag {latest}.")]
    TagMismatch { expected: String, latest: String },

    /// The resolved range holds no commits
    #[error("Couldn't find any commits between {older} and {newer}.")]
    NoCommits { older: String, newer: String },
}

/// Repository history provider errors
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// Authentication failed (invalid token, expired, insufficient permissions)
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The requested resource was not found
    #[error("not found: {0}")]
    NotFound(String),

    /// Rate limit exceeded
    #[error("rate limited")]
    RateLimited,

    /// API returned an error
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Network or connection error
    #[error("network error: {0}")]
    NetworkError(String),

    /// Response body did not have the expected shape
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Failure while fetching one page of commits
    #[error("failed to fetch commit page {page} of {range}: {reason}")]
    CommitPage {
        page: u32,
        range: String,
        reason: String,
    },

    /// Failure while looking up the issues a pull request closes
    #[error("failed to query related issues for PR #{pr}: {reason}")]
    ClosingIssues { pr: u64, reason: String },
}

/// Changelog-related errors
#[derive(Debug, Error)]
pub enum ChangelogError {
    /// Every commit was malformed or excluded
    #[error("No valid commits parsed since previous tag.")]
    NoValidCommits,

    /// Failed to write changelog
    #[error("Failed to write changelog {path}: {reason}")]
    WriteFailed { path: PathBuf, reason: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_errors_carry_context() {
        let err: ChronicleError = RangeError::TagMismatch {
            expected: "v2.0.0".to_string(),
            latest: "v1.9.0".to_string(),
        }
        .into();
        let msg = err.to_string();
        assert!(msg.contains("v2.0.0"));
        assert!(msg.contains("v1.9.0"));
    }

    #[test]
    fn test_provider_error_mentions_pr() {
        let err = ProviderError::ClosingIssues {
            pr: 42,
            reason: "boom".to_string(),
        };
        assert!(err.to_string().contains("PR #42"));
    }
}
