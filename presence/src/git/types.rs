//! Git repository records
//!
//! Read-only view of what a version control integration reports about the
//! repositories it knows: where each one lives, what HEAD points at, and which
//! remotes are configured.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Whether an integration has finished discovering repositories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntegrationState {
    Uninitialized,
    Initialized,
}

/// What HEAD currently points at
///
/// # Examples
///
/// ```
/// use presence::git::HeadRef;
///
/// let detached = HeadRef::detached("4f1c2a9");
/// assert_eq!(detached.reference(), Some("4f1c2a9"));
///
/// let branch = HeadRef::branch("main", Some("4f1c2a9"));
/// assert_eq!(branch.reference(), Some("main"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadRef {
    /// Symbolic branch name, when HEAD is on a branch
    pub name: Option<String>,

    /// Commit id HEAD resolves to, absent on an unborn branch
    pub commit: Option<String>,
}

impl HeadRef {
    pub fn branch(name: impl Into<String>, commit: Option<&str>) -> Self {
        Self {
            name: Some(name.into()),
            commit: commit.map(str::to_string),
        }
    }

    pub fn detached(commit: impl Into<String>) -> Self {
        Self {
            name: None,
            commit: Some(commit.into()),
        }
    }

    /// Branch name if there is one, otherwise the commit id
    pub fn reference(&self) -> Option<&str> {
        self.name
            .as_deref()
            .filter(|name| !name.is_empty())
            .or_else(|| self.commit.as_deref().filter(|commit| !commit.is_empty()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitRemote {
    pub name: String,
    pub fetch_url: Option<String>,
}

impl GitRemote {
    pub fn new(name: impl Into<String>, fetch_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fetch_url: Some(fetch_url.into()),
        }
    }
}

/// A repository as reported by the integration
///
/// # Examples
///
/// ```
/// use presence::git::{GitRemote, HeadRef, RepositoryRecord};
///
/// let repo = RepositoryRecord::new("/work/presence")
///     .with_head(HeadRef::branch("main", None))
///     .with_remote(GitRemote::new("origin", "git@github.com:org/presence.git"));
///
/// assert_eq!(repo.reference(), Some("main"));
/// assert_eq!(repo.fetch_url(), Some("git@github.com:org/presence.git"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryRecord {
    /// Working tree root
    pub root: PathBuf,

    pub head: Option<HeadRef>,

    /// Remotes in the order the repository lists them
    pub remotes: Vec<GitRemote>,
}

impl RepositoryRecord {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            head: None,
            remotes: Vec::new(),
        }
    }

    pub fn with_head(mut self, head: HeadRef) -> Self {
        self.head = Some(head);
        self
    }

    pub fn with_remote(mut self, remote: GitRemote) -> Self {
        self.remotes.push(remote);
        self
    }

    pub fn reference(&self) -> Option<&str> {
        self.head.as_ref().and_then(HeadRef::reference)
    }

    /// Fetch URL of the first configured remote
    pub fn fetch_url(&self) -> Option<&str> {
        self.remotes
            .first()
            .and_then(|remote| remote.fetch_url.as_deref())
            .filter(|url| !url.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_prefers_branch_name() {
        let head = HeadRef::branch("develop", Some("abc123"));
        assert_eq!(head.reference(), Some("develop"));
    }

    #[test]
    fn test_reference_falls_back_to_commit() {
        let head = HeadRef {
            name: Some(String::new()),
            commit: Some("abc123".to_string()),
        };
        assert_eq!(head.reference(), Some("abc123"));
    }

    #[test]
    fn test_reference_absent() {
        let head = HeadRef {
            name: None,
            commit: None,
        };
        assert_eq!(head.reference(), None);
        assert_eq!(RepositoryRecord::new("/repo").reference(), None);
    }

    #[test]
    fn test_fetch_url_uses_first_remote_only() {
        let repo = RepositoryRecord::new("/repo")
            .with_remote(GitRemote {
                name: "mirror".to_string(),
                fetch_url: None,
            })
            .with_remote(GitRemote::new("origin", "https://host.com/org/repo.git"));
        assert_eq!(repo.fetch_url(), None);
    }

    #[test]
    fn test_no_remotes() {
        let repo = RepositoryRecord::new("/repo").with_head(HeadRef::branch("main", None));
        assert_eq!(repo.fetch_url(), None);
    }
}
