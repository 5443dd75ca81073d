use std::fmt::Display;

use crate::parser::{NodeKind, Phase};

/// Failure raised by the listener while walking a parse tree.
#[derive(Debug, Clone, PartialEq)]
pub enum WalkError {
    /// A clause started while another one was still being collected.
    NestedClause { active: Phase, entered: Phase },
    /// The node is valid grammar but has no rendering, like arithmetic.
    Unsupported { kind: NodeKind, text: String },
    /// The node arrived at a point where the field cannot take it.
    InvalidState { kind: NodeKind, text: String, state: &'static str },
}

impl WalkError {
    pub fn unsupported(kind: NodeKind, text: &str) -> Self {
        WalkError::Unsupported {
            kind,
            text: text.to_string(),
        }
    }

    pub fn invalid_state(kind: NodeKind, text: &str, state: &'static str) -> Self {
        WalkError::InvalidState {
            kind,
            text: text.to_string(),
            state,
        }
    }
}

impl Display for WalkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WalkError::NestedClause { active, entered } => {
                write!(f, "WalkError: {:?} clause entered while {:?} is active", entered, active)
            }
            WalkError::Unsupported { kind, text } => {
                write!(f, "WalkError: unsupported {} -> '{}'", kind, text)
            }
            WalkError::InvalidState { kind, text, state } => {
                write!(f, "WalkError: unexpected {} in {} -> '{}'", kind, state, text)
            }
        }
    }
}

impl std::error::Error for WalkError {}

/// Error returned by the rewrite entry points. Both variants display the
/// same message; the reason is kept in `detail`.
#[derive(Debug, Clone, PartialEq)]
pub enum RewriteError {
    ParseFailure { query: String, detail: String },
    WalkPanic { query: String, detail: String },
}

impl RewriteError {
    pub fn parse_failure(query: &str, detail: impl Into<String>) -> Self {
        RewriteError::ParseFailure {
            query: query.to_string(),
            detail: detail.into(),
        }
    }

    pub fn walk_panic(query: &str, detail: impl Into<String>) -> Self {
        RewriteError::WalkPanic {
            query: query.to_string(),
            detail: detail.into(),
        }
    }

    pub fn query(&self) -> &str {
        match self {
            RewriteError::ParseFailure { query, .. } | RewriteError::WalkPanic { query, .. } => query,
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            RewriteError::ParseFailure { detail, .. } | RewriteError::WalkPanic { detail, .. } => detail,
        }
    }
}

impl Display for RewriteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SQL parse failed: {}", self.query())
    }
}

impl std::error::Error for RewriteError {}

/// Configuration that could not be read into options.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigError {
    pub message: String,
}

impl ConfigError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ConfigError: {}", self.message)
    }
}

impl std::error::Error for ConfigError {}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::new(err.to_string())
    }
}
