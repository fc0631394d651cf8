//! Icon resolution
//!
//! [`resolve_file_icon`] asks [`resolve_repository_icon`] first and falls back
//! to the static icon tables. A repository icon is the raw-content URL of the
//! shallowest tracked file matching one of the configured `bigImageFilePaths`
//! globs.

use crate::exec::ExecError;
use crate::git::{
    list_tracked_files, normalize_remote_url, raw_content_url, IntegrationState, RepositoryRecord,
};
use crate::integration::PresenceContext;
use crate::pattern::PatternSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Failed to list tracked files: {0}")]
    Exec(#[from] ExecError),
}

pub type ResolveResult<T> = Result<T, ResolveError>;

/// The document currently open in the editor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub path: String,
    pub language_id: String,
}

impl Document {
    pub fn new(path: impl Into<String>, language_id: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            language_id: language_id.into(),
        }
    }
}

/// Raw-content URL of the repository icon, if the active workspace has one.
///
/// Missing integration, repository, reference, remote or matching file all
/// yield `Ok(None)`. Only a failure of the tracked-file listing is an error.
pub async fn resolve_repository_icon(ctx: &PresenceContext) -> ResolveResult<Option<String>> {
    let Some(integration) = ctx.integration().await else {
        return Ok(None);
    };
    if integration.state() != IntegrationState::Initialized {
        tracing::debug!("Integration not initialized yet");
        return Ok(None);
    }

    let repositories = integration.repositories();
    if repositories.is_empty() || ctx.workspace_folders().is_empty() {
        return Ok(None);
    }

    let Some(repo) = select_repository(&repositories, ctx.workspace_folders()) else {
        tracing::debug!("No repository matches the open workspace folders");
        return Ok(None);
    };

    let (Some(reference), Some(fetch_url)) = (repo.reference(), repo.fetch_url()) else {
        tracing::debug!("Repository {} has no reference or remote", repo.root.display());
        return Ok(None);
    };

    let patterns = compile_patterns(&ctx.settings().big_image_file_paths);
    if patterns.is_empty() {
        return Ok(None);
    }

    let remote_url = normalize_remote_url(fetch_url);
    let files = rank_by_depth(list_tracked_files(&repo.root).await?);

    let icon = select_icon_file(&files, &patterns)
        .map(|file| raw_content_url(&remote_url, reference, file));
    match &icon {
        Some(url) => tracing::debug!("Repository icon: {}", url),
        None => tracing::debug!("No tracked file matches the image patterns"),
    }
    Ok(icon)
}

/// Icon for `document`: repository icon first, then the file and language tables.
pub async fn resolve_file_icon(ctx: &PresenceContext, document: &Document) -> ResolveResult<String> {
    if let Some(url) = resolve_repository_icon(ctx).await? {
        return Ok(url);
    }
    Ok(ctx
        .icon_table()
        .lookup(&document.path, &document.language_id)
        .to_string())
}

/// First repository whose root is one of the workspace folders
pub fn select_repository<'a>(
    repositories: &'a [RepositoryRecord],
    workspace_folders: &[PathBuf],
) -> Option<&'a RepositoryRecord> {
    repositories.iter().find(|repo| {
        workspace_folders
            .iter()
            .any(|folder| same_path(&repo.root, folder))
    })
}

fn same_path(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Stable sort by number of path separators, shallowest first
pub fn rank_by_depth(mut files: Vec<String>) -> Vec<String> {
    files.sort_by_key(|file| file.matches('/').count());
    files
}

/// Compile glob patterns, including extended `@(a|b)`-style groups. `*` stays
/// within a path segment, `**` crosses segments. Patterns that fail to compile
/// are skipped.
pub fn compile_patterns<S: AsRef<str>>(patterns: &[S]) -> PatternSet {
    PatternSet::compile(patterns)
}

/// First file, in order, matched by any pattern
pub fn select_icon_file<'a>(files: &'a [String], patterns: &PatternSet) -> Option<&'a str> {
    files
        .iter()
        .find(|file| patterns.is_match(file.as_str()))
        .map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::{GitRemote, HeadRef};
    use crate::integration::{
        IntegrationError, IntegrationLoader, IntegrationResult, VcsIntegration,
    };
    use async_trait::async_trait;
    use icons::Settings;
    use std::sync::Arc;

    struct FakeIntegration {
        state: IntegrationState,
        repositories: Vec<RepositoryRecord>,
    }

    impl VcsIntegration for FakeIntegration {
        fn state(&self) -> IntegrationState {
            self.state
        }

        fn repositories(&self) -> Vec<RepositoryRecord> {
            self.repositories.clone()
        }
    }

    struct FakeLoader {
        state: IntegrationState,
        repositories: Option<Vec<RepositoryRecord>>,
    }

    #[async_trait]
    impl IntegrationLoader for FakeLoader {
        async fn load(&self) -> IntegrationResult<Arc<dyn VcsIntegration>> {
            match &self.repositories {
                Some(repositories) => Ok(Arc::new(FakeIntegration {
                    state: self.state,
                    repositories: repositories.clone(),
                })),
                None => Err(IntegrationError::Activation {
                    message: "not installed".to_string(),
                }),
            }
        }

        fn name(&self) -> &'static str {
            "fake"
        }
    }

    fn context(
        state: IntegrationState,
        repositories: Option<Vec<RepositoryRecord>>,
        folders: &[&str],
    ) -> PresenceContext {
        PresenceContext::new(
            Box::new(FakeLoader {
                state,
                repositories,
            }),
            folders.iter().map(PathBuf::from).collect(),
            Settings::new().with_big_image_file_paths(["logo.*"]),
        )
        .unwrap()
    }

    fn repo_without_remotes() -> RepositoryRecord {
        RepositoryRecord::new("/work/repo").with_head(HeadRef::branch("main", None))
    }

    #[test]
    fn test_rank_by_depth_is_stable() {
        let ranked = rank_by_depth(vec![
            "a/b/icon.png".to_string(),
            "z.png".to_string(),
            "docs/logo.png".to_string(),
            "icon.png".to_string(),
            "assets/icon.png".to_string(),
        ]);
        assert_eq!(
            ranked,
            vec![
                "z.png",
                "icon.png",
                "docs/logo.png",
                "assets/icon.png",
                "a/b/icon.png"
            ]
        );
    }

    #[test]
    fn test_shallowest_match_wins() {
        let files = rank_by_depth(vec!["a/b/icon.png".to_string(), "icon.png".to_string()]);
        let patterns = compile_patterns(&["**/icon.png"]);
        assert_eq!(select_icon_file(&files, &patterns), Some("icon.png"));
    }

    #[test]
    fn test_star_stays_in_segment() {
        let patterns = compile_patterns(&["logo.*"]);
        let files = vec!["assets/logo.png".to_string()];
        assert_eq!(select_icon_file(&files, &patterns), None);

        let files = vec!["assets/logo.png".to_string(), "logo.svg".to_string()];
        assert_eq!(select_icon_file(&files, &patterns), Some("logo.svg"));
    }

    #[test]
    fn test_alternation_and_classes() {
        let patterns = compile_patterns(&["{docs,assets}/icon.[ps][nv]g"]);
        let files = vec!["src/icon.png".to_string(), "assets/icon.svg".to_string()];
        assert_eq!(select_icon_file(&files, &patterns), Some("assets/icon.svg"));
    }

    #[test]
    fn test_extended_groups_against_ranked_files() {
        let files = rank_by_depth(vec!["logo.svg".to_string(), "icon.png".to_string()]);
        for pattern in ["@(logo|icon).png", "+(icon).png", "!(README).png"] {
            let patterns = compile_patterns(&[pattern]);
            assert_eq!(select_icon_file(&files, &patterns), Some("icon.png"), "{pattern}");
        }

        let files = rank_by_depth(vec!["README.png".to_string(), "logo.png".to_string()]);
        let patterns = compile_patterns(&["!(README).png"]);
        assert_eq!(select_icon_file(&files, &patterns), Some("logo.png"));
    }

    #[test]
    fn test_optional_group_spans_directories() {
        let patterns = compile_patterns(&["?(assets/)icon.png"]);
        let files = rank_by_depth(vec!["assets/icon.png".to_string(), "src/icon.png".to_string()]);
        assert_eq!(select_icon_file(&files, &patterns), Some("assets/icon.png"));

        let files = rank_by_depth(vec!["assets/icon.png".to_string(), "icon.png".to_string()]);
        assert_eq!(select_icon_file(&files, &patterns), Some("icon.png"));
    }

    #[test]
    fn test_invalid_patterns_are_skipped() {
        let patterns = compile_patterns(&["[unclosed", "@(logo|icon", "logo.*"]);
        assert_eq!(patterns.len(), 1);
        let files = vec!["logo.png".to_string()];
        assert_eq!(select_icon_file(&files, &patterns), Some("logo.png"));
    }

    #[test]
    fn test_select_repository_by_workspace_root() {
        let repositories = vec![
            RepositoryRecord::new("/work/other"),
            RepositoryRecord::new("/work/repo"),
        ];
        let folders = vec![PathBuf::from("/work/repo/")];
        let selected = select_repository(&repositories, &folders).unwrap();
        assert_eq!(selected.root, PathBuf::from("/work/repo"));

        let folders = vec![PathBuf::from("/work/repo/src")];
        assert!(select_repository(&repositories, &folders).is_none());
    }

    #[tokio::test]
    async fn test_no_remotes_yields_none() {
        let ctx = context(
            IntegrationState::Initialized,
            Some(vec![repo_without_remotes()]),
            &["/work/repo"],
        );
        assert_eq!(resolve_repository_icon(&ctx).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_no_reference_yields_none() {
        let repo = RepositoryRecord::new("/work/repo")
            .with_remote(GitRemote::new("origin", "git@host.com:org/repo.git"));
        let ctx = context(IntegrationState::Initialized, Some(vec![repo]), &["/work/repo"]);
        assert_eq!(resolve_repository_icon(&ctx).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_uninitialized_integration_yields_none() {
        let ctx = context(
            IntegrationState::Uninitialized,
            Some(vec![repo_without_remotes()]),
            &["/work/repo"],
        );
        assert_eq!(resolve_repository_icon(&ctx).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_no_workspace_folders_yields_none() {
        let ctx = context(
            IntegrationState::Initialized,
            Some(vec![repo_without_remotes()]),
            &[],
        );
        assert_eq!(resolve_repository_icon(&ctx).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_failed_integration_falls_back_to_tables() {
        let ctx = context(IntegrationState::Initialized, None, &["/work/repo"]);
        let document = Document::new("/work/repo/src/main.rs", "plaintext");
        assert_eq!(resolve_file_icon(&ctx, &document).await.unwrap(), "rust");

        let document = Document::new("/work/repo/NOTES", "no-such-language");
        assert_eq!(resolve_file_icon(&ctx, &document).await.unwrap(), "text");
    }
}
