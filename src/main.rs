use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dealboard::config::DealboardConfig;
use dealboard::models::Stage;
use std::path::PathBuf;

mod cmd;

#[derive(Parser)]
#[command(name = "dealboard")]
#[command(version, about = "Sales pipeline board client")]
pub struct Cli {
    /// Config file (default: ./dealboard.toml, then the user config dir)
    #[arg(long, global = true, env = "DEALBOARD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Backend base URL. Overrides config and DEALBOARD_API_URL.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Skip confirmation prompts
    #[arg(long, global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the six pipeline columns
    Board,
    /// List pipeline stages and their AI analyses
    Stages,
    /// Move a deal to another stage (lands at the end of the column)
    Move {
        deal_id: i64,
        /// Target stage, e.g. qualified_solution
        stage: Stage,
    },
    /// Move a deal to an exact slot, as a drag and drop would
    Drag {
        deal_id: i64,
        #[arg(long)]
        to: Stage,
        #[arg(long, default_value = "0")]
        index: usize,
    },
    /// Run the stage-specific AI analysis for a deal
    Insight { deal_id: i64 },
    /// List comments on a deal, newest first
    Comments { deal_id: i64 },
    /// Add or delete a comment
    Comment {
        #[command(subcommand)]
        command: CommentCommands,
    },
    /// View or validate configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum CommentCommands {
    /// Post a comment as the configured commenter
    Add { deal_id: i64, text: String },
    /// Delete a comment (asks for confirmation unless --yes)
    Delete { deal_id: i64, comment_id: i64 },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show effective configuration
    Show,
    /// Validate configuration and show any warnings
    Validate,
    /// Write a default dealboard.toml in the current directory
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = DealboardConfig::load(cli.config.as_deref())?.with_cli_args(
        cli.api_url.clone(),
        cli.verbose,
        cli.yes,
    );
    dealboard::telemetry::init_tracing(config.log_level(), config.log_format())
        .context("Failed to initialise logging")?;

    match &cli.command {
        Commands::Board => cmd::cmd_board(&config).await?,
        Commands::Stages => cmd::cmd_stages(),
        Commands::Move { deal_id, stage } => cmd::cmd_move(&config, *deal_id, *stage).await?,
        Commands::Drag { deal_id, to, index } => {
            cmd::cmd_drag(&config, *deal_id, *to, *index).await?
        }
        Commands::Insight { deal_id } => cmd::cmd_insight(&config, *deal_id).await?,
        Commands::Comments { deal_id } => cmd::cmd_comments(&config, *deal_id).await?,
        Commands::Comment { command } => match command {
            CommentCommands::Add { deal_id, text } => {
                cmd::cmd_comment_add(&config, *deal_id, text).await?
            }
            CommentCommands::Delete {
                deal_id,
                comment_id,
            } => cmd::cmd_comment_delete(&config, *deal_id, *comment_id).await?,
        },
        Commands::Config { command } => cmd::cmd_config(&config, command.clone())?,
    }

    Ok(())
}
