pub mod config;
pub mod rules;
pub mod tables;

pub use config::{ConfigError, ConfigResult, Settings, DEFAULT_ICON};
pub use rules::{MatchRule, RuleError, RuleResult};
pub use tables::{FileIconEntry, IconDescriptor, IconTable, LanguageIconEntry};

pub mod prelude {
    pub use crate::config::*;
    pub use crate::rules::*;
    pub use crate::tables::*;
}
