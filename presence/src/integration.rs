//! Version control integration seam and the resolution context
//!
//! A [`PresenceContext`] owns everything a resolution needs: the open workspace
//! folders, user settings, the compiled icon table and a lazily loaded
//! [`VcsIntegration`]. The integration is loaded at most once per context. A
//! failed load is remembered, so the context stays in "no repository icons"
//! mode for the rest of its life.

use crate::exec::ExecError;
use crate::git::{IntegrationState, RepositoryRecord};
use async_trait::async_trait;
use icons::{ConfigResult, IconTable, Settings};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::OnceCell;

#[derive(Error, Debug)]
pub enum IntegrationError {
    #[error("Version control tool is not available: {0}")]
    Unavailable(#[from] ExecError),

    #[error("Version control integration failed to activate: {message}")]
    Activation { message: String },
}

pub type IntegrationResult<T> = Result<T, IntegrationError>;

/// Read-only view of the repositories a version control backend knows about
pub trait VcsIntegration: Send + Sync {
    fn state(&self) -> IntegrationState;

    /// Current repository records. Recomputed on every call.
    fn repositories(&self) -> Vec<RepositoryRecord>;
}

/// Locates and activates a [`VcsIntegration`]
#[async_trait]
pub trait IntegrationLoader: Send + Sync {
    async fn load(&self) -> IntegrationResult<Arc<dyn VcsIntegration>>;

    fn name(&self) -> &'static str;
}

pub struct PresenceContext {
    loader: Box<dyn IntegrationLoader>,
    integration: OnceCell<Option<Arc<dyn VcsIntegration>>>,
    workspace_folders: Vec<PathBuf>,
    settings: Settings,
    icon_table: IconTable,
}

impl PresenceContext {
    pub fn new(
        loader: Box<dyn IntegrationLoader>,
        workspace_folders: Vec<PathBuf>,
        settings: Settings,
    ) -> ConfigResult<Self> {
        let icon_table = IconTable::from_settings(&settings)?;
        Ok(Self {
            loader,
            integration: OnceCell::new(),
            workspace_folders,
            settings,
            icon_table,
        })
    }

    /// The loaded integration, or `None` if loading failed.
    ///
    /// Only the first call runs the loader; its outcome is kept for good.
    pub async fn integration(&self) -> Option<Arc<dyn VcsIntegration>> {
        self.integration
            .get_or_init(|| async {
                match self.loader.load().await {
                    Ok(integration) => {
                        tracing::info!("Loaded {} integration", self.loader.name());
                        Some(integration)
                    }
                    Err(e) => {
                        tracing::error!(
                            "Failed to load {} integration, repository icons disabled: {}",
                            self.loader.name(),
                            e
                        );
                        None
                    }
                }
            })
            .await
            .clone()
    }

    pub fn workspace_folders(&self) -> &[PathBuf] {
        &self.workspace_folders
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn icon_table(&self) -> &IconTable {
        &self.icon_table
    }
}
