//! Unified, `miette`-based diagnostics for treebeam.
//!
//! Every failure raised by the evaluator, the beam search, the configuration
//! layer or the CLI is a [`DecodeError`]. Simple errors are built with the
//! [`err_msg!`](crate::err_msg) macro; grammar violations use
//! [`DecodeError::invalid_action`], which carries the offending action.
//!
//! ```rust
//! use treebeam::{err_msg, DecodeError, ErrorType};
//! let err = err_msg!(Oracle, "batch_update returned {} results for {} hypotheses", 1, 2);
//! assert_eq!(err.error_type(), ErrorType::Oracle);
//! ```

use miette::Diagnostic;
use thiserror::Error;

use crate::grammar::Action;

type BoxedSource = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Type-safe error classification that corresponds to `DecodeError` variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// An action inconsistent with the current head constraint
    InvalidAction,
    /// AST reconstruction requested on an open or empty derivation
    Incomplete,
    /// The scoring oracle failed or broke its contract
    Oracle,
    /// Malformed grammar data or AST shape
    Grammar,
    /// Bad configuration values or unreadable configuration documents
    Config,
    /// Filesystem failures
    Io,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::InvalidAction => "InvalidAction",
            ErrorType::Incomplete => "Incomplete",
            ErrorType::Oracle => "Oracle",
            ErrorType::Grammar => "Grammar",
            ErrorType::Config => "Config",
            ErrorType::Io => "Io",
        }
    }
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Minimal context attached to an error.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ErrorContext {
    /// Position in the action sequence the error refers to, if any.
    pub action_index: Option<usize>,
    /// An optional help message.
    pub help: Option<String>,
}

impl ErrorContext {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn at_action(action_index: usize) -> Self {
        Self {
            action_index: Some(action_index),
            help: None,
        }
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

/// Unified error type for all treebeam failure modes.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Invalid action: {actual} (expected: {expected})")]
    InvalidAction {
        expected: String,
        actual: Box<Action>,
        ctx: ErrorContext,
    },
    #[error("Incomplete derivation: {message}")]
    Incomplete {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<BoxedSource>,
    },
    #[error("Oracle error: {message}")]
    Oracle {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<BoxedSource>,
    },
    #[error("Grammar error: {message}")]
    Grammar {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<BoxedSource>,
    },
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<BoxedSource>,
    },
    #[error("I/O error: {message}")]
    Io {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<BoxedSource>,
    },
}

impl DecodeError {
    /// Builds the error raised when `actual` does not fit the open head.
    pub fn invalid_action(expected: impl Into<String>, actual: &Action, index: usize) -> Self {
        DecodeError::InvalidAction {
            expected: expected.into(),
            actual: Box::new(actual.clone()),
            ctx: ErrorContext::at_action(index),
        }
    }

    fn get_ctx(&self) -> &ErrorContext {
        match self {
            DecodeError::InvalidAction { ctx, .. } => ctx,
            DecodeError::Incomplete { ctx, .. } => ctx,
            DecodeError::Oracle { ctx, .. } => ctx,
            DecodeError::Grammar { ctx, .. } => ctx,
            DecodeError::Config { ctx, .. } => ctx,
            DecodeError::Io { ctx, .. } => ctx,
        }
    }

    /// Returns the type-safe classification for this error.
    pub fn error_type(&self) -> ErrorType {
        match self {
            DecodeError::InvalidAction { .. } => ErrorType::InvalidAction,
            DecodeError::Incomplete { .. } => ErrorType::Incomplete,
            DecodeError::Oracle { .. } => ErrorType::Oracle,
            DecodeError::Grammar { .. } => ErrorType::Grammar,
            DecodeError::Config { .. } => ErrorType::Config,
            DecodeError::Io { .. } => ErrorType::Io,
        }
    }

    /// Index in the action sequence the error refers to, if known.
    pub fn action_index(&self) -> Option<usize> {
        self.get_ctx().action_index
    }

    /// Attaches a help message shown by `miette` reports.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        let help = Some(help.into());
        match &mut self {
            DecodeError::InvalidAction { ctx, .. }
            | DecodeError::Incomplete { ctx, .. }
            | DecodeError::Oracle { ctx, .. }
            | DecodeError::Grammar { ctx, .. }
            | DecodeError::Config { ctx, .. }
            | DecodeError::Io { ctx, .. } => ctx.help = help,
        }
        self
    }
}

impl Diagnostic for DecodeError {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        Some(Box::new(format!("treebeam::{}", self.error_type())))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        self.get_ctx()
            .help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn std::fmt::Display + 'a>)
    }
}

impl From<std::io::Error> for DecodeError {
    fn from(err: std::io::Error) -> Self {
        DecodeError::Io {
            message: err.to_string(),
            ctx: ErrorContext::none(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        DecodeError::Config {
            message: format!("invalid JSON: {err}"),
            ctx: ErrorContext::none(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<serde_yaml::Error> for DecodeError {
    fn from(err: serde_yaml::Error) -> Self {
        DecodeError::Config {
            message: format!("invalid YAML: {err}"),
            ctx: ErrorContext::none(),
            source: Some(Box::new(err)),
        }
    }
}

/// Constructs a message-only `DecodeError` variant with `format!` arguments.
///
/// Works for every variant except `InvalidAction`, which carries the action
/// itself and is built with [`DecodeError::invalid_action`].
#[macro_export]
macro_rules! err_msg {
    ($variant:ident, $msg:literal $(, $arg:expr)* $(,)?) => {
        $crate::DecodeError::$variant {
            message: format!($msg $(, $arg)*),
            ctx: $crate::ErrorContext::none(),
            source: None,
        }
    };
    ($variant:ident, $msg:expr) => {
        $crate::DecodeError::$variant {
            message: format!("{}", $msg),
            ctx: $crate::ErrorContext::none(),
            source: None,
        }
    };
}
