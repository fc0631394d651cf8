//! File name match rules
//!
//! A rule key is either a literal suffix (`".rs"`, `"Cargo.toml"`) or a
//! serialized regular expression in `/pattern/flags` form. Keys are parsed once,
//! when a table is built, so lookups never touch the regex compiler.

use regex::{Regex, RegexBuilder};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RuleError {
    #[error("Empty match rule")]
    Empty,

    #[error("Invalid regular expression in rule '{key}': {source}")]
    InvalidPattern {
        key: String,
        #[source]
        source: regex::Error,
    },
}

pub type RuleResult<T> = Result<T, RuleError>;

/// Flags accepted after the closing slash. Only `i`, `m` and `s` change matching;
/// the rest are valid for the serialized form but meaningless for a single test.
const ACCEPTED_FLAGS: &str = "gimsuy";

#[derive(Debug, Clone)]
pub enum MatchRule {
    /// File name ends with this literal text
    Suffix(String),
    /// File name is matched by a compiled regular expression
    Pattern(Regex),
}

impl MatchRule {
    /// Parse a rule key, compiling `/pattern/flags` keys into a [`Regex`].
    pub fn parse(key: &str) -> RuleResult<Self> {
        if key.is_empty() {
            return Err(RuleError::Empty);
        }

        match split_serialized_regex(key) {
            Some((pattern, flags)) => {
                let mut builder = RegexBuilder::new(pattern);
                for flag in flags.chars() {
                    match flag {
                        'i' => {
                            builder.case_insensitive(true);
                        }
                        'm' => {
                            builder.multi_line(true);
                        }
                        's' => {
                            builder.dot_matches_new_line(true);
                        }
                        _ => {}
                    }
                }
                let regex = builder.build().map_err(|source| RuleError::InvalidPattern {
                    key: key.to_string(),
                    source,
                })?;
                Ok(MatchRule::Pattern(regex))
            }
            None => Ok(MatchRule::Suffix(key.to_string())),
        }
    }

    pub fn matches(&self, file_name: &str) -> bool {
        match self {
            MatchRule::Suffix(suffix) => file_name.ends_with(suffix.as_str()),
            MatchRule::Pattern(regex) => regex.is_match(file_name),
        }
    }
}

/// Split `/body/flags` into its parts. Returns `None` for anything that is not
/// in serialized form, which then falls back to a literal suffix.
fn split_serialized_regex(key: &str) -> Option<(&str, &str)> {
    let rest = key.strip_prefix('/')?;
    let close = rest.rfind('/')?;
    let (body, flags) = (&rest[..close], &rest[close + 1..]);
    if body.is_empty() || !flags.chars().all(|c| ACCEPTED_FLAGS.contains(c)) {
        return None;
    }
    Some((body, flags))
}
