pub mod exec;
pub mod git;
pub mod integration;
pub mod pattern;
pub mod resolver;

pub use exec::{execute, ExecError, ExecResult};
pub use git::{
    list_tracked_files, normalize_remote_url, raw_content_url, read_repository_record,
    Git2Integration, Git2Loader, GitOperationError, GitRemote, HeadRef, IntegrationState,
    RepositoryRecord,
};
pub use integration::{
    IntegrationError, IntegrationLoader, IntegrationResult, PresenceContext, VcsIntegration,
};
pub use pattern::{ImagePattern, PatternError, PatternResult, PatternSet};
pub use resolver::{
    compile_patterns, rank_by_depth, resolve_file_icon, resolve_repository_icon,
    select_icon_file, select_repository, Document, ResolveError, ResolveResult,
};
