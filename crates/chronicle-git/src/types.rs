//! History types

use serde::{Deserialize, Serialize};

/// One raw commit as returned by the history provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    /// Commit hash (full)
    pub sha: String,
    /// Web URL of the commit
    pub url: String,
    /// Full raw commit message
    pub message: String,
    /// Platform login of the author, when the commit maps to an account
    pub author: Option<String>,
    /// Web URL of the author's profile
    pub author_url: Option<String>,
}

impl CommitRecord {
    /// Create a new CommitRecord without author identity
    pub fn new(sha: impl Into<String>, url: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            sha: sha.into(),
            url: url.into(),
            message: message.into(),
            author: None,
            author_url: None,
        }
    }

    /// Set the author login and profile URL
    pub fn with_author(mut self, login: impl Into<String>, url: impl Into<String>) -> Self {
        self.author = Some(login.into());
        self.author_url = Some(url.into());
        self
    }

    /// Short hash (first 7 characters)
    pub fn short_sha(&self) -> &str {
        let end = self
            .sha
            .char_indices()
            .nth(7)
            .map(|(i, _)| i)
            .unwrap_or(self.sha.len());
        &self.sha[..end]
    }
}

/// A tag as listed by the history provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRef {
    /// Tag name
    pub name: String,
    /// Commit the tag points to, when known
    pub commit_sha: Option<String>,
}

impl TagRef {
    /// Create a new TagRef
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            commit_sha: None,
        }
    }

    /// Set the target commit
    pub fn with_commit(mut self, sha: impl Into<String>) -> Self {
        self.commit_sha = Some(sha.into());
        self
    }
}

/// A resolved `(older, newer)` pair of refs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRange {
    /// Older ref (excluded)
    pub older: String,
    /// Newer ref (included), also the version label of the release
    pub newer: String,
}

impl CommitRange {
    /// Create a new range
    pub fn new(older: impl Into<String>, newer: impl Into<String>) -> Self {
        Self {
            older: older.into(),
            newer: newer.into(),
        }
    }

    /// `older...newer`, as used by compare endpoints and links
    pub fn basehead(&self) -> String {
        format!("{}...{}", self.older, self.newer)
    }
}

impl std::fmt::Display for CommitRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.basehead())
    }
}

/// One page of a commit listing
#[derive(Debug, Clone, Default)]
pub struct CommitPage {
    /// Total number of commits in the range, as declared by the provider
    pub total_commits: usize,
    /// Commits on this page, oldest first
    pub commits: Vec<CommitRecord>,
}

/// An issue closed by a pull request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedIssue {
    /// Issue number
    pub number: u64,
    /// Web URL of the issue
    pub url: String,
    /// Login of the issue author
    pub author_login: Option<String>,
    /// Web URL of the issue author's profile
    pub author_url: Option<String>,
}
