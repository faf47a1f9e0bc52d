//! Local git repository access
//!
//! Only used to work out which hosted repository a checkout belongs to when
//! no `repository` setting is given.

use std::path::Path;

use git2::Repository;
use tracing::{debug, instrument};

use chronicle_core::error::GitError;
use chronicle_core::RepoSlug;

/// Result type for local git operations
pub type Result<T> = std::result::Result<T, GitError>;

/// Remote consulted when deriving the repository slug
pub const DEFAULT_REMOTE: &str = "origin";

/// Git repository wrapper
pub struct GitRepo {
    repo: Repository,
}

impl GitRepo {
    /// Discover and open a repository by searching parent directories
    #[instrument(fields(start_path = %start_path.display()))]
    pub fn discover(start_path: &Path) -> Result<Self> {
        debug!(start_path = %start_path.display(), "discovering git repository");
        let repo = Repository::discover(start_path).map_err(|e| {
            if e.code() == git2::ErrorCode::NotFound {
                GitError::NotARepository(start_path.to_path_buf())
            } else {
                GitError::OpenFailed(e.to_string())
            }
        })?;

        Ok(Self { repo })
    }

    /// Get the URL for a remote
    pub fn remote_url(&self, name: &str) -> Result<String> {
        let remote = match self.repo.find_remote(name) {
            Ok(remote) => remote,
            Err(e) if e.code() == git2::ErrorCode::NotFound => {
                return Err(GitError::RemoteNotFound(name.to_string()))
            }
            Err(e) => return Err(GitError::Git2(e)),
        };

        remote
            .url()
            .map(str::to_string)
            .ok_or_else(|| GitError::RemoteNotFound(name.to_string()))
    }

    /// `owner/name` of the hosted repository behind a remote
    pub fn repo_slug(&self, remote: &str) -> Result<RepoSlug> {
        let url = self.remote_url(remote)?;
        let slug = RepoSlug::from_remote_url(&url)
            .ok_or_else(|| GitError::UnrecognizedRemote(url.clone()))?;
        debug!(remote, %slug, "derived repository slug from remote");
        Ok(slug)
    }
}
