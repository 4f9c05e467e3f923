//! Board overview commands: `dealboard board` and `dealboard stages`.

use anyhow::Result;

use dealboard::config::DealboardConfig;
use dealboard::models::{Deal, Stage};

use super::Session;

pub async fn cmd_board(config: &DealboardConfig) -> Result<()> {
    let session = Session::connect(config)?;
    let reconciler = session.load_board().await?;
    let board = reconciler.board().snapshot()?;

    println!();
    println!(
        "{}",
        console::style(format!(
            "Pipeline: {} deals, total value {:.2}",
            board.total_deals(),
            board.total_value()
        ))
        .bold()
        .cyan()
    );

    for (stage, deals) in board.columns() {
        let summary = board.summary(stage);
        println!();
        println!(
            "{} {}",
            console::style(stage.title()).bold(),
            console::style(format!("({} · {:.2})", summary.count, summary.total_value)).dim()
        );
        if deals.is_empty() {
            println!("  {}", console::style("no deals").dim());
        }
        for deal in deals {
            println!("  {}", deal_line(deal));
        }
    }
    println!();
    Ok(())
}

fn deal_line(deal: &Deal) -> String {
    let mut line = format!("#{:<5} {}", deal.id, deal.title);
    if let Some(customer) = &deal.customer_name {
        line.push_str(&format!(" ({})", customer));
    }
    line.push_str(&format!(" [{}]", deal.priority.as_str()));
    if let Some(value) = deal.estimated_value {
        line.push_str(&format!(" {:.2}", value));
    }
    if let Some(person) = &deal.assigned_person {
        line.push_str(&format!(" @{}", person.name));
    }
    line
}

pub fn cmd_stages() {
    println!();
    for stage in Stage::ALL {
        let analysis = stage
            .insight_kind()
            .map(|kind| kind.label())
            .unwrap_or("-");
        println!(
            "  {:<20} {:<20} {}",
            console::style(stage.as_str()).cyan(),
            stage.title(),
            console::style(analysis).dim()
        );
    }
    println!();
}
