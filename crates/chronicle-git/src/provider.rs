//! Repository history provider trait
//!
//! The changelog pipeline only talks to the hosting service through this
//! trait. Every call is an await point; callers issue them one at a time.

use async_trait::async_trait;

use chronicle_core::error::ProviderError;

use crate::types::{CommitPage, CommitRange, RelatedIssue, TagRef};

/// Result type for provider calls
pub type Result<T> = std::result::Result<T, ProviderError>;

/// Fixed page size for commit listings
pub const COMMITS_PER_PAGE: usize = 100;

/// Access to tags, commit ranges and pull-request metadata
#[async_trait]
pub trait HistoryProvider: Send + Sync {
    /// Human-readable provider name (for logs)
    fn name(&self) -> &'static str;

    /// Most recent tags, ordered by commit date descending
    async fn latest_tags(&self, limit: usize) -> Result<Vec<TagRef>>;

    /// One page (1-based) of the commits between `range.older` and `range.newer`
    async fn list_commits(
        &self,
        range: &CommitRange,
        page: u32,
        per_page: usize,
    ) -> Result<CommitPage>;

    /// Issues that pull request `pr` closes
    async fn list_closing_issues(&self, pr: u64) -> Result<Vec<RelatedIssue>>;
}
