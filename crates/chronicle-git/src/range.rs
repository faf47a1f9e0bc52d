//! Commit range resolution

use tracing::{debug, info, instrument};

use chronicle_core::error::RangeError;
use chronicle_core::RangeRequest;

use crate::provider::HistoryProvider;
use crate::types::CommitRange;

/// Turn a range request into concrete `(older, newer)` refs
///
/// For a single tag the two most recent tags are listed; the most recent one
/// must be the requested tag and the one before it becomes the older end.
/// Explicit requests are used as given (`from` is the newer ref).
#[instrument(skip(provider), fields(provider = provider.name()))]
pub async fn resolve_range<P>(provider: &P, request: &RangeRequest) -> chronicle_core::Result<CommitRange>
where
    P: HistoryProvider + ?Sized,
{
    match request {
        RangeRequest::Explicit { from, to } => {
            info!(newer = %from, older = %to, "using explicit range");
            Ok(CommitRange::new(to.clone(), from.clone()))
        }
        RangeRequest::LatestTag(tag) => {
            let tags = provider.latest_tags(2).await?;
            debug!(tags = ?tags.iter().map(|t| &t.name).collect::<Vec<_>>(), "latest tags");

            let [latest, previous, ..] = tags.as_slice() else {
                return Err(RangeError::NotEnoughTags { found: tags.len() }.into());
            };

            if latest.name != *tag {
                return Err(RangeError::TagMismatch {
                    expected: tag.clone(),
                    latest: latest.name.clone(),
                }
                .into());
            }

            info!(newer = %latest.name, older = %previous.name, "using latest tag range");
            Ok(CommitRange::new(previous.name.clone(), latest.name.clone()))
        }
    }
}
