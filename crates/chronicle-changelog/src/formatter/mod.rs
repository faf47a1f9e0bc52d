//! Changelog rendering
//!
//! One renderer produces every output variant from the same model; the
//! variants differ only in their [`LinkStyle`].

mod renderer;

pub use renderer::{ChangelogRenderer, RenderedChangelog};

use chronicle_core::RepoSlug;
use chronicle_git::CommitRange;

/// How references are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkStyle {
    /// Plain markdown, no links at all
    None,
    /// Markdown with linked commit refs only (output variable)
    Transient,
    /// Markdown with every reference linked (changelog file)
    Permanent,
    /// Slack mrkdwn with every reference linked
    Chat,
}

impl LinkStyle {
    /// Whether commit refs are links
    pub fn links_commits(self) -> bool {
        !matches!(self, Self::None)
    }

    /// Whether pull requests, issues and users are links
    pub fn links_references(self) -> bool {
        matches!(self, Self::Permanent | Self::Chat)
    }

    /// Emphasis delimiter for attribution clauses
    pub fn emphasis(self) -> &'static str {
        match self {
            Self::Chat => "_",
            _ => "*",
        }
    }

    /// Write `text` as a link to `url`
    pub fn link(self, text: &str, url: &str) -> String {
        match self {
            Self::Chat => format!("<{}|{}>", url, text),
            _ => format!("[{}]({})", text, url),
        }
    }
}

/// Web URLs of a hosted repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoLinks {
    base: String,
}

impl RepoLinks {
    /// Create links for `slug` under `server_url`
    pub fn new(server_url: &str, slug: &RepoSlug) -> Self {
        Self {
            base: format!("{}/{}/{}", server_url.trim_end_matches('/'), slug.owner, slug.name),
        }
    }

    /// Pull request page
    pub fn pull(&self, number: u64) -> String {
        format!("{}/pull/{}", self.base, number)
    }

    /// Issue page (GitHub redirects pull request numbers)
    pub fn issue(&self, number: u64) -> String {
        format!("{}/issues/{}", self.base, number)
    }

    /// Compare view for a range
    pub fn compare(&self, range: &CommitRange) -> String {
        format!("{}/compare/{}", self.base, range.basehead())
    }
}
