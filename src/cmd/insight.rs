//! `dealboard insight`.

use anyhow::{Context, Result, bail};

use dealboard::board::{InsightCoordinator, InsightPanel};
use dealboard::config::DealboardConfig;
use dealboard::errors::BoardError;

use super::Session;

pub async fn cmd_insight(config: &DealboardConfig, deal_id: i64) -> Result<()> {
    let mut session = Session::connect(config)?;
    let reconciler = session.load_board().await?;
    let (stage, _) = reconciler
        .board()
        .read(|store| store.board().locate(deal_id))?
        .ok_or(BoardError::DealNotFound { deal_id })?;

    let analysis = stage
        .insight_kind()
        .map(|kind| kind.label())
        .unwrap_or("No analysis");
    println!(
        "{} {} ({})",
        console::style("Running").dim(),
        analysis,
        stage.title()
    );

    let insights = InsightCoordinator::new(session.service.clone(), session.notices.clone());
    insights.trigger(deal_id, stage).await?;
    session.flush_notices();

    match insights.panel(deal_id)? {
        InsightPanel::Attached(insight) => {
            if let Some(message) = insight.payload.message() {
                println!("{}", message);
            } else {
                let pretty = serde_json::to_string_pretty(&insight.payload)
                    .context("Failed to format insight")?;
                println!("{}", pretty);
            }
            Ok(())
        }
        InsightPanel::Failed { .. } => bail!("No insight for deal {}", deal_id),
        InsightPanel::Idle | InsightPanel::Loading { .. } => Ok(()),
    }
}
