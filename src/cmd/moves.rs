//! Stage change commands: `dealboard move` and `dealboard drag`.

use anyhow::{Result, bail};

use dealboard::board::{
    DragController, DropResult, Location, MoveOutcome, TransitionController, TransitionOutcome,
};
use dealboard::config::DealboardConfig;
use dealboard::errors::BoardError;
use dealboard::models::Stage;

use super::Session;

pub async fn cmd_move(config: &DealboardConfig, deal_id: i64, stage: Stage) -> Result<()> {
    let mut session = Session::connect(config)?;
    let reconciler = session.load_board().await?;
    let controller = TransitionController::new(reconciler);

    let outcome = controller.transition_deal(deal_id, stage).await?;
    session.flush_notices();

    match outcome {
        TransitionOutcome::Unchanged => {
            println!("Deal {} is already in {}", deal_id, stage.title());
            Ok(())
        }
        TransitionOutcome::Moved(outcome) => report(outcome),
    }
}

pub async fn cmd_drag(
    config: &DealboardConfig,
    deal_id: i64,
    to: Stage,
    index: usize,
) -> Result<()> {
    let mut session = Session::connect(config)?;
    let reconciler = session.load_board().await?;

    let (stage, position) = reconciler
        .board()
        .read(|store| store.board().locate(deal_id))?
        .ok_or(BoardError::DealNotFound { deal_id })?;

    let mut drag = DragController::new(reconciler);
    drag.on_drag_start(deal_id, Location::new(stage, position));
    let result = drag.drop_on(Some(Location::new(to, index))).await?;
    session.flush_notices();

    match result {
        DropResult::Moved(outcome) => report(outcome),
        DropResult::NoOp => {
            println!("Deal {} is already at {} #{}", deal_id, stage.title(), position);
            Ok(())
        }
        DropResult::Cancelled => Ok(()),
    }
}

fn report(outcome: MoveOutcome) -> Result<()> {
    match outcome {
        MoveOutcome::Confirmed | MoveOutcome::Discarded => Ok(()),
        MoveOutcome::Reverted { error, refreshed } => {
            if !refreshed {
                eprintln!(
                    "{}",
                    console::style("Board could not be refreshed and may be out of date").yellow()
                );
            }
            bail!("Move was not applied: {}", error)
        }
    }
}
