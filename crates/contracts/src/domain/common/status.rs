//! Status rules shared by document-like aggregates.
//!
//! `completed` is terminal and reachable only through an explicit complete
//! action. `cancelled` orders cannot be completed.

use std::fmt;

/// Status enum of a document with a completion state
pub trait DocumentStatus: Copy + Eq + fmt::Debug {
    fn initial() -> Self;
    fn completed() -> Self;
    fn cancelled() -> Self;
    fn as_str(&self) -> &'static str;

    fn is_completed(&self) -> bool {
        *self == Self::completed()
    }

    fn is_cancelled(&self) -> bool {
        *self == Self::cancelled()
    }

    /// Neither completed nor cancelled
    fn is_open(&self) -> bool {
        !self.is_completed() && !self.is_cancelled()
    }
}

/// Rejected status change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionError {
    /// The completed state was requested through a generic update
    CompletionRequiresAction,
    /// The document is already completed and cannot change status
    AlreadyCompleted,
    /// A cancelled document cannot be completed
    CancelledCannotComplete,
}

impl fmt::Display for TransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionError::CompletionRequiresAction => {
                write!(f, "status can only become completed through the complete action")
            }
            TransitionError::AlreadyCompleted => {
                write!(f, "completed records cannot change status")
            }
            TransitionError::CancelledCannotComplete => {
                write!(f, "cancelled records cannot be completed")
            }
        }
    }
}

impl std::error::Error for TransitionError {}

/// Validate a status change requested by a generic update
pub fn check_transition<S: DocumentStatus>(current: S, requested: S) -> Result<(), TransitionError> {
    if requested == current {
        return Ok(());
    }
    if requested.is_completed() {
        return Err(TransitionError::CompletionRequiresAction);
    }
    if current.is_completed() {
        return Err(TransitionError::AlreadyCompleted);
    }
    Ok(())
}

/// Validate the complete action. Returns `false` when already completed (no-op).
pub fn check_completion<S: DocumentStatus>(current: S) -> Result<bool, TransitionError> {
    if current.is_completed() {
        return Ok(false);
    }
    if current.is_cancelled() {
        return Err(TransitionError::CancelledCannotComplete);
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum S {
        New,
        Busy,
        Done,
        Dropped,
    }

    impl DocumentStatus for S {
        fn initial() -> Self {
            S::New
        }
        fn completed() -> Self {
            S::Done
        }
        fn cancelled() -> Self {
            S::Dropped
        }
        fn as_str(&self) -> &'static str {
            "s"
        }
    }

    #[test]
    fn generic_update_cannot_complete() {
        assert_eq!(check_transition(S::New, S::Busy), Ok(()));
        assert_eq!(
            check_transition(S::Busy, S::Done),
            Err(TransitionError::CompletionRequiresAction)
        );
        assert_eq!(
            check_transition(S::Done, S::Busy),
            Err(TransitionError::AlreadyCompleted)
        );
        assert_eq!(check_transition(S::Done, S::Done), Ok(()));
        assert_eq!(check_transition(S::Dropped, S::New), Ok(()));
    }

    #[test]
    fn completion_is_idempotent() {
        assert_eq!(check_completion(S::Busy), Ok(true));
        assert_eq!(check_completion(S::Done), Ok(false));
        assert_eq!(
            check_completion(S::Dropped),
            Err(TransitionError::CancelledCannotComplete)
        );
        assert!(S::initial().is_open());
    }
}
