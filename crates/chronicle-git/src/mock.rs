//! Mock history provider for deterministic testing
//!
//! Holds tags, a commit list and pull-request issue links in memory, pages
//! through the commit list like the real compare endpoint, and records every
//! call so tests can check request sequences.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chronicle_core::error::ProviderError;

use crate::provider::{HistoryProvider, Result};
use crate::types::{CommitPage, CommitRange, CommitRecord, RelatedIssue, TagRef};

/// Mock provider for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping; clones share state.
#[derive(Debug, Clone, Default)]
pub struct MockHistoryProvider {
    inner: Arc<Mutex<MockInner>>,
}

#[derive(Debug, Default)]
struct MockInner {
    /// Tags, most recent first
    tags: Vec<TagRef>,
    /// Commits of the (single) range served
    commits: Vec<CommitRecord>,
    /// Closing issues by pull request number
    issues: HashMap<u64, Vec<RelatedIssue>>,
    /// Call to fail on (for testing error paths)
    fail_on: Vec<FailOn>,
    /// Recorded operations for verification
    operations: Vec<MockOperation>,
}

/// Configuration for which call should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    /// Fail latest_tags
    LatestTags(ProviderError),
    /// Fail list_commits for one page
    ListCommits { page: u32, error: ProviderError },
    /// Fail list_closing_issues for one pull request
    ClosingIssues { pr: u64, error: ProviderError },
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    LatestTags { limit: usize },
    ListCommits { range: CommitRange, page: u32, per_page: usize },
    ClosingIssues { pr: u64 },
}

impl MockHistoryProvider {
    /// Create an empty mock provider
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Set the tags, most recent first
    pub fn with_tags<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lock().tags = names.into_iter().map(TagRef::new).collect();
        self
    }

    /// Set the commits served for any range
    pub fn with_commits(self, commits: Vec<CommitRecord>) -> Self {
        self.lock().commits = commits;
        self
    }

    /// Link issues to a pull request
    pub fn with_issues(self, pr: u64, issues: Vec<RelatedIssue>) -> Self {
        self.lock().issues.insert(pr, issues);
        self
    }

    /// Make a call fail
    pub fn fail_on(self, fail: FailOn) -> Self {
        self.lock().fail_on.push(fail);
        self
    }

    /// All calls made so far, in order
    pub fn operations(&self) -> Vec<MockOperation> {
        self.lock().operations.clone()
    }

    /// Number of closing-issue lookups made so far
    pub fn issue_lookups(&self) -> usize {
        self.lock()
            .operations
            .iter()
            .filter(|op| matches!(op, MockOperation::ClosingIssues { .. }))
            .count()
    }
}

#[async_trait]
impl HistoryProvider for MockHistoryProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn latest_tags(&self, limit: usize) -> Result<Vec<TagRef>> {
        let mut inner = self.lock();
        inner.operations.push(MockOperation::LatestTags { limit });

        for fail in &inner.fail_on {
            if let FailOn::LatestTags(error) = fail {
                return Err(error.clone());
            }
        }

        Ok(inner.tags.iter().take(limit).cloned().collect())
    }

    async fn list_commits(
        &self,
        range: &CommitRange,
        page: u32,
        per_page: usize,
    ) -> Result<CommitPage> {
        let mut inner = self.lock();
        inner.operations.push(MockOperation::ListCommits {
            range: range.clone(),
            page,
            per_page,
        });

        for fail in &inner.fail_on {
            if let FailOn::ListCommits { page: p, error } = fail {
                if *p == page {
                    return Err(error.clone());
                }
            }
        }

        let start = (page.saturating_sub(1) as usize).saturating_mul(per_page);
        let commits = inner
            .commits
            .iter()
            .skip(start)
            .take(per_page)
            .cloned()
            .collect();

        Ok(CommitPage {
            total_commits: inner.commits.len(),
            commits,
        })
    }

    async fn list_closing_issues(&self, pr: u64) -> Result<Vec<RelatedIssue>> {
        let mut inner = self.lock();
        inner.operations.push(MockOperation::ClosingIssues { pr });

        for fail in &inner.fail_on {
            if let FailOn::ClosingIssues { pr: p, error } = fail {
                if *p == pr {
                    return Err(error.clone());
                }
            }
        }

        Ok(inner.issues.get(&pr).cloned().unwrap_or_default())
    }
}
