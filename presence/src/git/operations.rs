//! Git operations layer
//!
//! Reads repository records with git2-rs and lists tracked files through the
//! `git` executable. Also provides the git2-backed [`VcsIntegration`].

use super::types::{GitRemote, HeadRef, IntegrationState, RepositoryRecord};
use crate::exec::{self, ExecResult};
use crate::integration::{IntegrationError, IntegrationLoader, IntegrationResult, VcsIntegration};
use async_trait::async_trait;
use git2::{ErrorCode, Repository};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during git operations
#[derive(Error, Debug)]
pub enum GitOperationError {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Repository has no working directory: {0}")]
    BareRepository(String),
}

pub type GitOperationResult<T> = Result<T, GitOperationError>;

pub const LIST_TRACKED_FILES: &str = "git ls-files";
pub const GIT_VERSION: &str = "git --version";

/// Read the repository containing `path`
pub fn read_repository_record(path: impl AsRef<Path>) -> GitOperationResult<RepositoryRecord> {
    let path = path.as_ref();
    let repo = Repository::discover(path)?;
    let root = repo
        .workdir()
        .ok_or_else(|| GitOperationError::BareRepository(path.display().to_string()))?
        .to_path_buf();

    Ok(RepositoryRecord {
        root,
        head: read_head(&repo),
        remotes: read_remotes(&repo)?,
    })
}

fn read_head(repo: &Repository) -> Option<HeadRef> {
    match repo.head() {
        Ok(head) => {
            let name = if head.is_branch() {
                head.shorthand().map(str::to_string)
            } else {
                None
            };
            Some(HeadRef {
                name,
                commit: head.target().map(|oid| oid.to_string()),
            })
        }
        // Fresh repository: HEAD names a branch that has no commits yet
        Err(e) if e.code() == ErrorCode::UnbornBranch => {
            let name = repo
                .find_reference("HEAD")
                .ok()
                .and_then(|head| head.symbolic_target().map(str::to_string))
                .map(|target| target.trim_start_matches("refs/heads/").to_string());
            Some(HeadRef { name, commit: None })
        }
        Err(e) => {
            tracing::debug!("Could not resolve HEAD: {}", e);
            None
        }
    }
}

fn read_remotes(repo: &Repository) -> GitOperationResult<Vec<GitRemote>> {
    let names = repo.remotes()?;
    let mut remotes = Vec::new();
    for name in names.iter().flatten() {
        let fetch_url = repo
            .find_remote(name)
            .ok()
            .and_then(|remote| remote.url().map(str::to_string));
        remotes.push(GitRemote {
            name: name.to_string(),
            fetch_url,
        });
    }
    Ok(remotes)
}

/// Tracked files of the repository at `root`, in the order git reports them
pub async fn list_tracked_files(root: impl AsRef<Path>) -> ExecResult<Vec<String>> {
    let output = exec::execute(LIST_TRACKED_FILES, root).await?;
    Ok(output
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Integration backed by git2, one repository lookup per workspace folder
pub struct Git2Integration {
    folders: Vec<PathBuf>,
}

impl Git2Integration {
    pub fn new(folders: Vec<PathBuf>) -> Self {
        Self { folders }
    }
}

impl VcsIntegration for Git2Integration {
    fn state(&self) -> IntegrationState {
        IntegrationState::Initialized
    }

    fn repositories(&self) -> Vec<RepositoryRecord> {
        let mut records: Vec<RepositoryRecord> = Vec::new();
        for folder in &self.folders {
            match read_repository_record(folder) {
                Ok(record) => {
                    if !records.iter().any(|r| r.root == record.root) {
                        records.push(record);
                    }
                }
                Err(e) => tracing::debug!("No repository at {}: {}", folder.display(), e),
            }
        }
        records
    }
}

/// Activates [`Git2Integration`] once the `git` executable is confirmed runnable
pub struct Git2Loader {
    folders: Vec<PathBuf>,
}

impl Git2Loader {
    pub fn new(folders: Vec<PathBuf>) -> Self {
        Self { folders }
    }
}

#[async_trait]
impl IntegrationLoader for Git2Loader {
    async fn load(&self) -> IntegrationResult<Arc<dyn VcsIntegration>> {
        let output = exec::execute(GIT_VERSION, std::env::temp_dir()).await?;
        let version = parse_git_version(&output)?;
        tracing::debug!("Found git {}", version);
        Ok(Arc::new(Git2Integration::new(self.folders.clone())))
    }

    fn name(&self) -> &'static str {
        "git"
    }
}

/// Version number from `git --version` output such as `git version 2.43.0`
fn parse_git_version(output: &str) -> IntegrationResult<&str> {
    output
        .trim()
        .strip_prefix("git version ")
        .map(str::trim)
        .filter(|version| !version.is_empty())
        .ok_or_else(|| IntegrationError::Activation {
            message: format!("unexpected '{}' output: {:?}", GIT_VERSION, output.trim()),
        })
}
