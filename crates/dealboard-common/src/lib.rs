//! Shared domain types for the deal pipeline board.
//!
//! Everything here is plain data: the six-stage pipeline, deals, comments,
//! and the request/response shapes exchanged with the deal-board backend.

pub mod models;

pub use models::*;
