//! CLI command implementations.
//!
//! Each submodule owns one or more related `Commands` variants:
//!
//! | Module      | Commands handled                          |
//! |-------------|-------------------------------------------|
//! | `board`     | `Board`, `Stages`                         |
//! | `moves`     | `Move`, `Drag`                            |
//! | `insight`   | `Insight`                                 |
//! | `comments`  | `Comments`, `Comment`                     |
//! | `config`    | `Config`                                  |

pub mod board;
pub mod comments;
pub mod config;
pub mod insight;
pub mod moves;

pub use board::{cmd_board, cmd_stages};
pub use comments::{cmd_comment_add, cmd_comment_delete, cmd_comments};
pub use config::cmd_config;
pub use insight::cmd_insight;
pub use moves::{cmd_drag, cmd_move};

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::broadcast;

use dealboard::board::{BoardHandle, Notice, Reconciler, notice};
use dealboard::config::DealboardConfig;
use dealboard::remote::{DealBoardService, HttpDealBoardService};

/// Backend client plus a notice channel, shared by every networked command.
pub struct Session {
    pub service: Arc<dyn DealBoardService>,
    pub notices: notice::NoticeSender,
    pub rx: broadcast::Receiver<Notice>,
}

impl Session {
    pub fn connect(config: &DealboardConfig) -> Result<Self> {
        let service = HttpDealBoardService::new(config.base_url(), config.timeout())
            .with_context(|| format!("Failed to create client for {}", config.base_url()))?;
        let (notices, rx) = notice::channel();
        Ok(Self {
            service: Arc::new(service),
            notices,
            rx,
        })
    }

    /// Reconciler over a freshly loaded board.
    pub async fn load_board(&self) -> Result<Arc<Reconciler>> {
        let reconciler = Arc::new(Reconciler::new(
            BoardHandle::default(),
            self.service.clone(),
            self.notices.clone(),
        ));
        reconciler
            .load()
            .await
            .context("Failed to load the pipeline board")?;
        Ok(reconciler)
    }

    /// Print every notice published so far.
    pub fn flush_notices(&mut self) {
        while let Ok(notice) = self.rx.try_recv() {
            print_notice(&notice);
        }
    }
}

pub fn print_notice(notice: &Notice) {
    match notice {
        Notice::Success { message } => {
            println!("{} {}", console::style("✓").green().bold(), message)
        }
        Notice::Failure { message } => {
            eprintln!("{} {}", console::style("✗").red().bold(), message)
        }
    }
}
