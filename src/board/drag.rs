use std::sync::Arc;

use dealboard_common::Stage;

use super::reconcile::{MoveIntent, MoveOutcome, Reconciler};
use crate::errors::BoardError;

/// A slot on the board as reported by the drop surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub stage: Stage,
    pub index: usize,
}

impl Location {
    pub fn new(stage: Stage, index: usize) -> Self {
        Self { stage, index }
    }

    /// Column ids on the drop surface are stage wire names.
    pub fn parse(column_id: &str, index: usize) -> Result<Self, BoardError> {
        let stage = column_id
            .parse::<Stage>()
            .map_err(|message| BoardError::UnknownColumn {
                column: column_id.to_string(),
                message,
            })?;
        Ok(Self { stage, index })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DragState {
    Idle,
    Dragging { deal_id: i64, source: Location },
}

/// What a drop amounts to, before anything is mutated.
#[derive(Debug, Clone, PartialEq)]
pub enum DropDecision {
    Valid(MoveIntent),
    /// Dropped back where it started.
    NoOp,
    /// Dropped outside every column.
    Cancelled,
}

#[derive(Debug)]
pub enum DropResult {
    Moved(MoveOutcome),
    NoOp,
    Cancelled,
}

pub fn drag_change_reason(from: Stage, to: Stage) -> String {
    if from == to {
        format!("Reordered within {} via drag and drop", from.title())
    } else {
        format!("Moved from {} to {} via drag and drop", from.title(), to.title())
    }
}

/// The destination index is used exactly as the drop surface reports it.
pub fn decide_drop(deal_id: i64, source: Location, destination: Option<Location>) -> DropDecision {
    match destination {
        None => DropDecision::Cancelled,
        Some(dest) if dest == source => DropDecision::NoOp,
        Some(dest) => DropDecision::Valid(MoveIntent {
            deal_id,
            from: source.stage,
            to: dest.stage,
            to_index: dest.index,
            change_reason: drag_change_reason(source.stage, dest.stage),
        }),
    }
}

/// Tracks a single drag gesture: `Idle -> Dragging -> (drop) -> Idle`.
pub struct DragController {
    state: DragState,
    reconciler: Arc<Reconciler>,
}

impl DragController {
    pub fn new(reconciler: Arc<Reconciler>) -> Self {
        Self {
            state: DragState::Idle,
            reconciler,
        }
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn on_drag_start(&mut self, deal_id: i64, source: Location) {
        if let DragState::Dragging { deal_id: stale, .. } = self.state {
            tracing::debug!(stale, deal_id, "Drag started over an unfinished gesture");
        }
        self.state = DragState::Dragging { deal_id, source };
    }

    /// Finish the gesture and decide what it means. Always returns the
    /// controller to `Idle`; nothing is mutated here.
    pub fn on_drag_end(&mut self, destination: Option<Location>) -> Result<DropDecision, BoardError> {
        match std::mem::replace(&mut self.state, DragState::Idle) {
            DragState::Idle => Err(BoardError::NotDragging),
            DragState::Dragging { deal_id, source } => {
                let decision = decide_drop(deal_id, source, destination);
                if !matches!(decision, DropDecision::Valid(_)) {
                    tracing::debug!(deal_id, ?decision, "Drop needs no move");
                }
                Ok(decision)
            }
        }
    }

    /// End the gesture and, for a valid drop, run the move through the
    /// reconciler.
    pub async fn drop_on(&mut self, destination: Option<Location>) -> Result<DropResult, BoardError> {
        match self.on_drag_end(destination)? {
            DropDecision::Valid(intent) => {
                let outcome = self.reconciler.apply_move(intent).await?;
                Ok(DropResult::Moved(outcome))
            }
            DropDecision::NoOp => Ok(DropResult::NoOp),
            DropDecision::Cancelled => Ok(DropResult::Cancelled),
        }
    }
}
