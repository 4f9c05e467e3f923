//! Pipeline board engine.
//!
//! ## Overview
//!
//! The board is the client's belief about the backend's deal pipeline: six
//! ordered stage columns. User gestures change it optimistically, the
//! backend confirms or refuses, and a refusal is repaired by refetching the
//! whole board.
//!
//! ## Module Map
//!
//! ```text
//!  drag gesture          stage menu
//!       │                     │
//!       v                     v
//!  drag.rs              transition.rs
//!  (DragController)     (TransitionController)
//!       │  MoveIntent         │
//!       └─────────┬───────────┘
//!                 v
//!  reconcile.rs  (Reconciler) ── DealBoardService ──> backend
//!                 │
//!                 │ move_deal / replace_all
//!                 v
//!  store.rs  (BoardHandle -> BoardStore -> Board)
//! ```
//!
//! ## Side Channels
//!
//! | Module     | Responsibility                                           |
//! |------------|----------------------------------------------------------|
//! | `insight`  | Per-card AI insight jobs, latest trigger wins            |
//! | `comments` | Comment list for one deal, confirmed-only mutations      |
//! | `notice`   | `Notice` enum + `publish()` broadcast helper             |
//!
//! Neither side channel ever changes which column a deal is in.

pub mod comments;
pub mod drag;
pub mod insight;
pub mod notice;
pub mod reconcile;
pub mod store;
pub mod transition;

#[cfg(test)]
pub(crate) mod testing;

pub use comments::{AssumeYes, CommentThread, Commenter, Confirm, DeleteOutcome, PostOutcome};
pub use drag::{DragController, DragState, DropDecision, DropResult, Location};
pub use insight::{CardInsight, InsightCoordinator, InsightPanel, TriggerOutcome};
pub use notice::{Notice, NoticeSender};
pub use reconcile::{MoveIntent, MoveOutcome, Reconciler};
pub use store::{Board, BoardHandle, BoardStore, ColumnSummary};
pub use transition::{MenuEntry, TransitionController, TransitionOutcome, stage_menu};
