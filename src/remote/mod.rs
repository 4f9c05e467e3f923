//! The deal-board backend, as seen by the engine.
//!
//! `DealBoardService` is the only way the engine reaches the source of
//! truth. The real implementation is [`http::HttpDealBoardService`]; tests
//! use the scriptable fake in `board::testing`.

pub mod http;

use async_trait::async_trait;
use dealboard_common::{Comment, Deal, InsightPayload, NewComment, Stage, StatusUpdate};

use crate::errors::RemoteError;

pub use http::HttpDealBoardService;

#[async_trait]
pub trait DealBoardService: Send + Sync {
    /// All deals, partitioned and ordered by stage.
    async fn fetch_board(&self) -> Result<Vec<Deal>, RemoteError>;

    async fn update_deal_status(&self, update: &StatusUpdate) -> Result<(), RemoteError>;

    /// Run the stage-appropriate analysis for one deal.
    async fn trigger_ai_insight(
        &self,
        deal_id: i64,
        current_stage: Stage,
    ) -> Result<InsightPayload, RemoteError>;

    /// Comments on one deal, newest first.
    async fn fetch_comments(&self, deal_id: i64) -> Result<Vec<Comment>, RemoteError>;

    async fn create_comment(&self, comment: &NewComment) -> Result<Comment, RemoteError>;

    async fn delete_comment(&self, comment_id: i64) -> Result<(), RemoteError>;
}
