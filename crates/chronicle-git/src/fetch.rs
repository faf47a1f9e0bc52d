//! Paginated commit fetching

use tracing::{debug, info, instrument};

use chronicle_core::error::{ProviderError, RangeError};

use crate::provider::{HistoryProvider, COMMITS_PER_PAGE};
use crate::types::{CommitRange, CommitRecord};

/// Fetch every commit in `range`, in provider order
///
/// Pages are requested one at a time, starting at 1, until the running count
/// reaches the total the provider declares or a page comes back empty.
#[instrument(skip(provider, range), fields(provider = provider.name(), range = %range))]
pub async fn fetch_commits<P>(provider: &P, range: &CommitRange) -> chronicle_core::Result<Vec<CommitRecord>>
where
    P: HistoryProvider + ?Sized,
{
    let mut commits: Vec<CommitRecord> = Vec::new();
    let mut page: u32 = 1;

    loop {
        let batch = provider
            .list_commits(range, page, COMMITS_PER_PAGE)
            .await
            .map_err(|e| ProviderError::CommitPage {
                page,
                range: range.basehead(),
                reason: e.to_string(),
            })?;

        let received = batch.commits.len();
        commits.extend(batch.commits);
        debug!(page, received, total = batch.total_commits, "received commit page");

        if received == 0 || commits.len() >= batch.total_commits {
            break;
        }
        page += 1;
    }

    if commits.is_empty() {
        return Err(RangeError::NoCommits {
            older: range.older.clone(),
            newer: range.newer.clone(),
        }
        .into());
    }

    info!(count = commits.len(), pages = page, "fetched commits");
    Ok(commits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{FailOn, MockHistoryProvider, MockOperation};
    use chronicle_core::ChronicleError;

    fn commits(n: usize) -> Vec<CommitRecord> {
        (0..n)
            .map(|i| CommitRecord::new(format!("{:040x}", i), "u", format!("fix: change {}", i)))
            .collect()
    }

    fn pages_requested(mock: &MockHistoryProvider) -> Vec<u32> {
        mock.operations()
            .into_iter()
            .filter_map(|op| match op {
                MockOperation::ListCommits { page, per_page, .. } => {
                    assert_eq!(per_page, COMMITS_PER_PAGE);
                    Some(page)
                }
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_fetch_250_commits_in_three_pages() {
        let mock = MockHistoryProvider::new().with_commits(commits(250));
        let range = CommitRange::new("v1.0.0", "v1.1.0");

        let fetched = fetch_commits(&mock, &range).await.unwrap();

        assert_eq!(fetched.len(), 250);
        assert_eq!(fetched[0].message, "fix: change 0");
        assert_eq!(fetched[249].message, "fix: change 249");
        assert_eq!(pages_requested(&mock), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_exact_page_multiple_stops_on_count() {
        let mock = MockHistoryProvider::new().with_commits(commits(100));
        let fetched = fetch_commits(&mock, &CommitRange::new("a", "b")).await.unwrap();

        assert_eq!(fetched.len(), 100);
        assert_eq!(pages_requested(&mock), vec![1]);
    }

    #[tokio::test]
    async fn test_empty_range_is_an_error() {
        let mock = MockHistoryProvider::new();
        let err = fetch_commits(&mock, &CommitRange::new("v1", "v2"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ChronicleError::Range(RangeError::NoCommits { .. })
        ));
    }

    #[tokio::test]
    async fn test_page_failure_names_page() {
        let mock = MockHistoryProvider::new()
            .with_commits(commits(150))
            .fail_on(FailOn::ListCommits {
                page: 2,
                error: ProviderError::NetworkError("reset".into()),
            });

        let err = fetch_commits(&mock, &CommitRange::new("v1", "v2"))
            .await
            .unwrap_err();

        match err {
            ChronicleError::Provider(ProviderError::CommitPage { page, range, reason }) => {
                assert_eq!(page, 2);
                assert_eq!(range, "v1...v2");
                assert!(reason.contains("reset"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
