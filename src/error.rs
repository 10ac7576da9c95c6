//! Domain errors reported to callers of the review core.
//!
//! Plumbing failures (I/O, config parsing) travel as `anyhow::Error` with
//! context attached. The variants below are the ones a caller is expected to
//! match on: they describe a rejected operation, not a broken environment.

use crate::model::FunctionStatus;
use std::fmt;
use std::path::PathBuf;

/// Categorized errors produced by scope, transition and persistence operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditError {
    /// A path resolved to a location outside the workspace root
    PathOutsideWorkspace {
        /// The resolved path
        path: PathBuf,
        /// The workspace root it escaped from
        root: PathBuf,
    },
    /// A path does not exist on disk
    PathNotFound(PathBuf),
    /// A status change the review state machine does not allow
    InvalidTransition {
        /// Display name of the function
        function: String,
        /// Current status
        from: FunctionStatus,
        /// Requested status
        to: FunctionStatus,
    },
    /// The file is not tracked in the current state
    FileNotTracked(String),
    /// No function with this name or id exists in the file
    FunctionNotFound {
        /// Tracked file that was searched
        file: String,
        /// Name or id that was looked up
        function: String,
    },
    /// Writing the state snapshot failed
    Persistence(String),
}

impl AuditError {
    /// Get a short description of the error type
    #[must_use]
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::PathOutsideWorkspace { .. } => "Path Outside Workspace",
            Self::PathNotFound(_) => "Path Not Found",
            Self::InvalidTransition { .. } => "Invalid Transition",
            Self::FileNotTracked(_) => "File Not Tracked",
            Self::FunctionNotFound { .. } => "Function Not Found",
            Self::Persistence(_) => "Persistence Error",
        }
    }

    /// Whether the error leaves in-memory state untouched
    ///
    /// Every variant except `Persistence` is raised before any mutation. A
    /// persistence failure happens after the in-memory mutation was applied,
    /// which stays in place.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        !matches!(self, Self::Persistence(_))
    }
}

impl fmt::Display for AuditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PathOutsideWorkspace { path, root } => write!(
                f,
                "{} is outside the workspace root {}",
                path.display(),
                root.display()
            ),
            Self::PathNotFound(path) => write!(f, "path does not exist: {}", path.display()),
            Self::InvalidTransition { function, from, to } => write!(
                f,
                "cannot mark '{function}' as {to} while it is {from}{}",
                if *to == FunctionStatus::Reviewed {
                    " (mark it read first)"
                } else {
                    ""
                }
            ),
            Self::FileNotTracked(path) => write!(f, "file is not tracked: {path}"),
            Self::FunctionNotFound { file, function } => {
                write!(f, "no function '{function}' in {file}")
            }
            Self::Persistence(msg) => write!(f, "failed to save review state: {msg}"),
        }
    }
}

impl std::error::Error for AuditError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_transition_message_hints_read_first() {
        let err = AuditError::InvalidTransition {
            function: "withdraw".to_string(),
            from: FunctionStatus::Unread,
            to: FunctionStatus::Reviewed,
        };
        let msg = err.to_string();
        assert!(msg.contains("withdraw"));
        assert!(msg.contains("mark it read first"));
        assert!(err.is_rejection());
    }

    #[test]
    fn test_persistence_is_not_rejection() {
        let err = AuditError::Persistence("disk full".to_string());
        assert!(!err.is_rejection());
        assert_eq!(err.error_type(), "Persistence Error");
    }

    #[test]
    fn test_converts_into_anyhow() {
        let err: anyhow::Error = AuditError::FileNotTracked("/repo/a.sol".to_string()).into();
        assert!(matches!(
            err.downcast_ref::<AuditError>(),
            Some(AuditError::FileNotTracked(_))
        ));
    }
}
