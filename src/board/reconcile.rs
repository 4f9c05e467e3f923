use std::sync::Arc;

use dealboard_common::{Stage, StatusUpdate};
use tokio_util::sync::CancellationToken;

use super::notice::{Notice, NoticeSender, publish};
use super::store::{Board, BoardHandle};
use crate::errors::{BoardError, RemoteError};
use crate::remote::DealBoardService;

/// A fully resolved request to move one deal.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveIntent {
    pub deal_id: i64,
    pub from: Stage,
    pub to: Stage,
    pub to_index: usize,
    pub change_reason: String,
}

#[derive(Debug)]
pub enum MoveOutcome {
    /// The backend accepted the move; the optimistic board is authoritative.
    Confirmed,
    /// The backend refused the move. The board was replaced by a fresh
    /// fetch, or, when that fetch failed too, flagged as needing a refresh.
    Reverted { error: RemoteError, refreshed: bool },
    /// The board was unmounted before the backend answered.
    Discarded,
}

/// Runs every board mutation optimistically and reconciles with the
/// backend afterwards.
///
/// Moves are not queued: concurrent moves race and the backend decides.
/// Any refusal is followed by a full refetch that replaces the board
/// wholesale, since the server may have diverged by more than one move.
pub struct Reconciler {
    board: BoardHandle,
    service: Arc<dyn DealBoardService>,
    notices: NoticeSender,
    mounted: CancellationToken,
}

impl Reconciler {
    pub fn new(board: BoardHandle, service: Arc<dyn DealBoardService>, notices: NoticeSender) -> Self {
        Self {
            board,
            service,
            notices,
            mounted: CancellationToken::new(),
        }
    }

    pub fn board(&self) -> &BoardHandle {
        &self.board
    }

    pub fn service(&self) -> &Arc<dyn DealBoardService> {
        &self.service
    }

    pub fn notices(&self) -> &NoticeSender {
        &self.notices
    }

    /// Stop applying responses. Calls still in flight run to completion but
    /// their results are dropped.
    pub fn unmount(&self) {
        self.mounted.cancel();
    }

    pub fn is_mounted(&self) -> bool {
        !self.mounted.is_cancelled()
    }

    /// Initial fetch when the board comes up.
    pub async fn load(&self) -> Result<(), BoardError> {
        let deals = self.service.fetch_board().await?;
        if !self.is_mounted() {
            return Ok(());
        }
        tracing::info!(deals = deals.len(), "Loaded pipeline board");
        self.board.replace_all(Board::from_deals(deals))
    }

    /// Refetch and replace the board. Returns `false` when unmounted.
    pub async fn refresh(&self) -> Result<bool, BoardError> {
        let deals = self.service.fetch_board().await?;
        if !self.is_mounted() {
            return Ok(false);
        }
        self.board.replace_all(Board::from_deals(deals))?;
        Ok(true)
    }

    pub async fn apply_move(&self, intent: MoveIntent) -> Result<MoveOutcome, BoardError> {
        let previous = self
            .board
            .move_deal(intent.deal_id, intent.from, intent.to, intent.to_index)?;
        let board_position = landed_index(&previous, &intent) as i32;

        let update = StatusUpdate {
            deal_id: intent.deal_id,
            new_status: intent.to,
            board_position,
            change_reason: intent.change_reason.clone(),
        };

        match self.service.update_deal_status(&update).await {
            Ok(()) => {
                if !self.is_mounted() {
                    tracing::debug!(deal_id = intent.deal_id, "Discarding move confirmation after unmount");
                    return Ok(MoveOutcome::Discarded);
                }
                tracing::info!(
                    deal_id = intent.deal_id,
                    from = %intent.from,
                    to = %intent.to,
                    board_position,
                    "Deal move confirmed"
                );
                publish(
                    &self.notices,
                    Notice::success(format!("Deal moved to {}", intent.to.title())),
                );
                Ok(MoveOutcome::Confirmed)
            }
            Err(error) => {
                tracing::warn!(
                    deal_id = intent.deal_id,
                    from = %intent.from,
                    to = %intent.to,
                    board_position,
                    error = %error,
                    "Deal move rejected, refetching board"
                );
                if !self.is_mounted() {
                    return Ok(MoveOutcome::Discarded);
                }
                publish(
                    &self.notices,
                    Notice::failure(format!("Failed to move deal: {}", error)),
                );
                let refreshed = self.resync().await?;
                Ok(MoveOutcome::Reverted { error, refreshed })
            }
        }
    }

    /// Post-failure refetch. A failed fetch leaves the board flagged so the
    /// next successful fetch is known to be required.
    async fn resync(&self) -> Result<bool, BoardError> {
        match self.service.fetch_board().await {
            Ok(deals) => {
                if !self.is_mounted() {
                    return Ok(false);
                }
                self.board.replace_all(Board::from_deals(deals))?;
                Ok(true)
            }
            Err(e) => {
                tracing::error!(error = %e, "Board refetch after failed move also failed");
                self.board.mark_needs_refresh()?;
                Ok(false)
            }
        }
    }
}

/// Index the deal actually landed at, after clamping to the destination's
/// length with the deal itself removed.
fn landed_index(previous: &Board, intent: &MoveIntent) -> usize {
    let dest_len = previous.column(intent.to).len() - usize::from(intent.from == intent.to);
    intent.to_index.min(dest_len)
}
