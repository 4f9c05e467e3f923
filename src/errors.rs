//! Typed error hierarchy for the pipeline engine.
//!
//! Two enums split the taxonomy:
//! - `RemoteError`: the deal-board backend failed or was unreachable. Board
//!   mutations recover from these by refetching; they rarely escape as `Err`.
//! - `BoardError`: local state is not what the caller assumed. These are
//!   never recovered locally and always propagate.

use dealboard_common::Stage;
use thiserror::Error;

/// Failures talking to the deal-board backend.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned {status}: {message}")]
    Status {
        endpoint: String,
        status: u16,
        message: String,
    },

    #[error("Unexpected response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    #[error("Remote rejected the request: {0}")]
    Rejected(String),
}

impl RemoteError {
    /// HTTP status code, when the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            RemoteError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Local invariant violations and remote failures the engine cannot absorb.
#[derive(Debug, Error)]
pub enum BoardError {
    #[error("Deal {deal_id} not found in column {stage}")]
    DealNotInColumn { deal_id: i64, stage: Stage },

    #[error("Deal {deal_id} not found on the board")]
    DealNotFound { deal_id: i64 },

    #[error("Board invariant violated: {0}")]
    Invariant(String),

    #[error("Drop received without an active drag")]
    NotDragging,

    #[error("Unknown column '{column}': {message}")]
    UnknownColumn { column: String, message: String },

    #[error("Board lock poisoned")]
    LockPoisoned,

    #[error(transparent)]
    Remote(#[from] RemoteError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deal_not_in_column_names_stage() {
        let err = BoardError::DealNotInColumn {
            deal_id: 4,
            stage: Stage::QualifiedCso,
        };
        assert_eq!(err.to_string(), "Deal 4 not found in column qualified_cso");
    }

    #[test]
    fn remote_error_converts_into_board_error() {
        let err: BoardError = RemoteError::Rejected("conflict".into()).into();
        match &err {
            BoardError::Remote(RemoteError::Rejected(msg)) => assert_eq!(msg, "conflict"),
            other => panic!("Expected Remote variant, got {:?}", other),
        }
        assert!(err.to_string().contains("conflict"));
    }

    #[test]
    fn remote_status_exposes_code() {
        let err = RemoteError::Status {
            endpoint: "/api/sprint/board".into(),
            status: 500,
            message: "Error loading sprint board".into(),
        };
        assert_eq!(err.status(), Some(500));
        assert!(RemoteError::Rejected("x".into()).status().is_none());
    }
}
