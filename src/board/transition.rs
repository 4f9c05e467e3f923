use std::sync::Arc;

use dealboard_common::Stage;

use super::reconcile::{MoveIntent, MoveOutcome, Reconciler};
use crate::errors::BoardError;

/// One row of a card's "move to stage" menu.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuEntry {
    pub stage: Stage,
    pub label: &'static str,
    pub enabled: bool,
}

/// Menu for a card currently in `current`: all six stages, the current
/// one disabled.
pub fn stage_menu(current: Stage) -> Vec<MenuEntry> {
    Stage::ALL
        .into_iter()
        .map(|stage| MenuEntry {
            stage,
            label: stage.title(),
            enabled: stage != current,
        })
        .collect()
}

pub fn manual_change_reason(from: Stage, to: Stage) -> String {
    format!("Moved from {} to {} via stage menu", from.title(), to.title())
}

#[derive(Debug)]
pub enum TransitionOutcome {
    Moved(MoveOutcome),
    /// Target equals the current stage; nothing was attempted.
    Unchanged,
}

/// Menu-driven stage change. The deal always lands at the end of the
/// target column.
pub struct TransitionController {
    reconciler: Arc<Reconciler>,
}

impl TransitionController {
    pub fn new(reconciler: Arc<Reconciler>) -> Self {
        Self { reconciler }
    }

    pub async fn transition(
        &self,
        deal_id: i64,
        current: Stage,
        target: Stage,
    ) -> Result<TransitionOutcome, BoardError> {
        if current == target {
            tracing::debug!(deal_id, stage = %current, "Ignoring transition to current stage");
            return Ok(TransitionOutcome::Unchanged);
        }

        let to_index = self.reconciler.board().read(|store| {
            let board = store.board();
            board
                .column(current)
                .iter()
                .any(|d| d.id == deal_id)
                .then(|| board.column(target).len())
        })?;
        let to_index = to_index.ok_or(BoardError::DealNotInColumn {
            deal_id,
            stage: current,
        })?;

        let outcome = self
            .reconciler
            .apply_move(MoveIntent {
                deal_id,
                from: current,
                to: target,
                to_index,
                change_reason: manual_change_reason(current, target),
            })
            .await?;
        Ok(TransitionOutcome::Moved(outcome))
    }

    /// Same as [`transition`](Self::transition), taking the current stage
    /// from the board.
    pub async fn transition_deal(
        &self,
        deal_id: i64,
        target: Stage,
    ) -> Result<TransitionOutcome, BoardError> {
        let (current, _) = self
            .reconciler
            .board()
            .read(|store| store.board().locate(deal_id))?
            .ok_or(BoardError::DealNotFound { deal_id })?;
        self.transition(deal_id, current, target).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::notice;
    use crate::board::store::BoardHandle;
    use crate::board::testing::{FakeService, sample_deals};
    use std::sync::atomic::Ordering;

    async fn controller() -> (TransitionController, Arc<Reconciler>, Arc<FakeService>) {
        let svc = Arc::new(FakeService::with_deals(sample_deals()));
        let (tx, _rx) = notice::channel();
        let reconciler = Arc::new(Reconciler::new(BoardHandle::default(), svc.clone(), tx));
        reconciler.load().await.unwrap();
        (TransitionController::new(reconciler.clone()), reconciler, svc)
    }

    #[test]
    fn test_stage_menu_disables_current_stage() {
        let menu = stage_menu(Stage::QualifiedDelivery);
        assert_eq!(menu.len(), Stage::COUNT);
        let disabled: Vec<Stage> = menu.iter().filter(|e| !e.enabled).map(|e| e.stage).collect();
        assert_eq!(disabled, vec![Stage::QualifiedDelivery]);
        assert_eq!(menu[1].label, "Qualified Solution");
    }

    #[tokio::test]
    async fn test_transition_to_current_stage_is_rejected_before_mutation() {
        let (ctl, reconciler, svc) = controller().await;
        let revision = reconciler.board().read(|s| s.revision()).unwrap();

        let outcome = ctl.transition(1, Stage::Lead, Stage::Lead).await.unwrap();
        assert!(matches!(outcome, TransitionOutcome::Unchanged));
        assert!(svc.status_updates().is_empty());
        assert_eq!(reconciler.board().read(|s| s.revision()).unwrap(), revision);
    }

    #[tokio::test]
    async fn test_transition_appends_to_target_column() {
        let (ctl, reconciler, svc) = controller().await;

        let outcome = ctl
            .transition(2, Stage::Lead, Stage::QualifiedSolution)
            .await
            .unwrap();
        assert!(matches!(
            outcome,
            TransitionOutcome::Moved(MoveOutcome::Confirmed)
        ));

        let column: Vec<i64> = reconciler
            .board()
            .read(|s| {
                s.board()
                    .column(Stage::QualifiedSolution)
                    .iter()
                    .map(|d| d.id)
                    .collect()
            })
            .unwrap();
        assert_eq!(column, vec![4, 2]);

        let update = &svc.status_updates()[0];
        assert_eq!(update.board_position, 1);
        assert_eq!(
            update.change_reason,
            "Moved from Lead to Qualified Solution via stage menu"
        );
    }

    #[tokio::test]
    async fn test_transition_with_wrong_column_is_hard_error() {
        let (ctl, _reconciler, svc) = controller().await;
        let err = ctl
            .transition(4, Stage::Lead, Stage::Deal)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            BoardError::DealNotInColumn {
                deal_id: 4,
                stage: Stage::Lead
            }
        ));
        assert!(svc.status_updates().is_empty());
    }

    #[tokio::test]
    async fn test_transition_failure_refetches() {
        let (ctl, reconciler, svc) = controller().await;
        svc.fail_updates.store(true, Ordering::SeqCst);

        let outcome = ctl.transition_deal(3, Stage::Project).await.unwrap();
        assert!(matches!(
            outcome,
            TransitionOutcome::Moved(MoveOutcome::Reverted { refreshed: true, .. })
        ));
        assert_eq!(
            reconciler.board().read(|s| s.board().locate(3)).unwrap(),
            Some((Stage::Lead, 2))
        );
    }

    #[tokio::test]
    async fn test_transition_unknown_deal() {
        let (ctl, _reconciler, _svc) = controller().await;
        assert!(matches!(
            ctl.transition_deal(99, Stage::Deal).await,
            Err(BoardError::DealNotFound { deal_id: 99 })
        ));
    }
}
