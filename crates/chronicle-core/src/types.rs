//! Core types for chronicle

use serde::{Deserialize, Serialize};

/// An `owner/name` repository identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoSlug {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub name: String,
}

impl RepoSlug {
    /// Create a new slug
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Derive a slug from a git remote URL
    ///
    /// Handles `https://host/owner/name(.git)`, `ssh://git@host/owner/name(.git)`
    /// and scp-like `git@host:owner/name(.git)` forms.
    pub fn from_remote_url(remote: &str) -> Option<Self> {
        let remote = remote.trim();
        let path = if let Some((_, rest)) = remote.split_once("://") {
            rest.split_once('/').map(|(_, path)| path)?
        } else {
            remote.split_once(':').map(|(_, path)| path)?
        };

        let path = path.trim_end_matches('/');
        let path = path.strip_suffix(".git").unwrap_or(path);
        // nested paths (`group/sub/name`) keep the last two segments
        let (owner, name) = path.rsplit_once('/')?;
        let owner = owner.rsplit('/').next()?;
        if owner.is_empty() || name.is_empty() {
            return None;
        }
        Some(Self::new(owner, name))
    }
}

impl std::fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl std::str::FromStr for RepoSlug {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
                Ok(Self::new(owner, name))
            }
            _ => Err(format!("Expected <owner>/<name>, got: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_from_str() {
        let slug: RepoSlug = "requarks/wiki".parse().unwrap();
        assert_eq!(slug.owner, "requarks");
        assert_eq!(slug.name, "wiki");
        assert_eq!(slug.to_string(), "requarks/wiki");
        assert!("no-slash".parse::<RepoSlug>().is_err());
        assert!("/name".parse::<RepoSlug>().is_err());
        assert!("owner/".parse::<RepoSlug>().is_err());
        assert!("a/b/c".parse::<RepoSlug>().is_err());
    }

    #[test]
    fn test_slug_from_remote_url() {
        let expected = RepoSlug::new("octo", "hello");
        assert_eq!(
            RepoSlug::from_remote_url("https://github.com/octo/hello.git"),
            Some(expected.clone())
        );
        assert_eq!(
            RepoSlug::from_remote_url("git@github.com:octo/hello.git"),
            Some(expected.clone())
        );
        assert_eq!(
            RepoSlug::from_remote_url("ssh://git@github.com/octo/hello"),
            Some(expected)
        );
        assert_eq!(
            RepoSlug::from_remote_url("https://gitlab.com/group/octo/hello.git"),
            Some(RepoSlug::new("octo", "hello"))
        );
        assert_eq!(RepoSlug::from_remote_url("not a remote"), None);
    }
}
