//! Scriptable in-memory `DealBoardService` for engine tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use async_trait::async_trait;
use dealboard_common::{Comment, Deal, InsightPayload, NewComment, Stage, StatusUpdate};
use tokio::sync::oneshot;

use crate::errors::RemoteError;
use crate::remote::DealBoardService;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    FetchBoard,
    UpdateStatus(StatusUpdate),
    TriggerInsight { deal_id: i64, stage: Stage },
    FetchComments(i64),
    CreateComment(NewComment),
    DeleteComment(i64),
}

type Gate<T> = oneshot::Receiver<Result<T, RemoteError>>;

/// Holds the "server side" rows. Successful status updates are applied to
/// them, so a refetch reflects whatever the fake server believes.
#[derive(Default)]
pub struct FakeService {
    pub deals: Mutex<Vec<Deal>>,
    pub comments: Mutex<Vec<Comment>>,
    calls: Mutex<Vec<Call>>,
    next_comment_id: AtomicI64,
    pub fail_updates: AtomicBool,
    pub fail_fetch: AtomicBool,
    pub fail_insight: AtomicBool,
    pub fail_create_comment: AtomicBool,
    pub fail_delete_comment: AtomicBool,
    update_gates: Mutex<VecDeque<Gate<()>>>,
    insight_gates: Mutex<VecDeque<Gate<InsightPayload>>>,
}

impl FakeService {
    pub fn with_deals(deals: Vec<Deal>) -> Self {
        let svc = Self::default();
        *svc.deals.lock().unwrap() = deals;
        svc.next_comment_id.store(100, Ordering::SeqCst);
        svc
    }

    pub fn with_comments(self, comments: Vec<Comment>) -> Self {
        *self.comments.lock().unwrap() = comments;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn status_updates(&self) -> Vec<StatusUpdate> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::UpdateStatus(u) => Some(u),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    pub fn set_server_deals(&self, deals: Vec<Deal>) {
        *self.deals.lock().unwrap() = deals;
    }

    /// The next status update waits until the returned sender resolves it.
    pub fn gate_update(&self) -> oneshot::Sender<Result<(), RemoteError>> {
        let (tx, rx) = oneshot::channel();
        self.update_gates.lock().unwrap().push_back(rx);
        tx
    }

    /// The next insight trigger waits until the returned sender resolves it.
    pub fn gate_insight(&self) -> oneshot::Sender<Result<InsightPayload, RemoteError>> {
        let (tx, rx) = oneshot::channel();
        self.insight_gates.lock().unwrap().push_back(rx);
        tx
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

fn closed_gate() -> RemoteError {
    RemoteError::Rejected("gate dropped".into())
}

#[async_trait]
impl DealBoardService for FakeService {
    async fn fetch_board(&self) -> Result<Vec<Deal>, RemoteError> {
        self.record(Call::FetchBoard);
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(RemoteError::Rejected("board unavailable".into()));
        }
        Ok(self.deals.lock().unwrap().clone())
    }

    async fn update_deal_status(&self, update: &StatusUpdate) -> Result<(), RemoteError> {
        self.record(Call::UpdateStatus(update.clone()));
        let gate = self.update_gates.lock().unwrap().pop_front();
        if let Some(gate) = gate {
            gate.await.map_err(|_| closed_gate())??;
        }
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(RemoteError::Rejected("status update refused".into()));
        }
        let mut deals = self.deals.lock().unwrap();
        if let Some(deal) = deals.iter_mut().find(|d| d.id == update.deal_id) {
            deal.stage = update.new_status;
            deal.board_position = update.board_position;
        }
        Ok(())
    }

    async fn trigger_ai_insight(
        &self,
        deal_id: i64,
        current_stage: Stage,
    ) -> Result<InsightPayload, RemoteError> {
        self.record(Call::TriggerInsight {
            deal_id,
            stage: current_stage,
        });
        let gate = self.insight_gates.lock().unwrap().pop_front();
        if let Some(gate) = gate {
            return gate.await.map_err(|_| closed_gate())?;
        }
        if self.fail_insight.load(Ordering::SeqCst) {
            return Err(RemoteError::Rejected("agent unavailable".into()));
        }
        Ok(InsightPayload(serde_json::json!({
            "deal_id": deal_id,
            "stage": current_stage.as_str(),
        })))
    }

    async fn fetch_comments(&self, deal_id: i64) -> Result<Vec<Comment>, RemoteError> {
        self.record(Call::FetchComments(deal_id));
        Ok(self
            .comments
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.deal_id == deal_id)
            .cloned()
            .collect())
    }

    async fn create_comment(&self, comment: &NewComment) -> Result<Comment, RemoteError> {
        self.record(Call::CreateComment(comment.clone()));
        if self.fail_create_comment.load(Ordering::SeqCst) {
            return Err(RemoteError::Rejected("comment refused".into()));
        }
        let created = Comment {
            id: self.next_comment_id.fetch_add(1, Ordering::SeqCst),
            deal_id: comment.deal_id,
            commenter_name: comment.commenter_name.clone(),
            commenter_role: comment.commenter_role.clone(),
            comment_text: comment.comment_text.clone(),
            created_at: "2026-01-01T09:00:00".into(),
        };
        self.comments.lock().unwrap().insert(0, created.clone());
        Ok(created)
    }

    async fn delete_comment(&self, comment_id: i64) -> Result<(), RemoteError> {
        self.record(Call::DeleteComment(comment_id));
        if self.fail_delete_comment.load(Ordering::SeqCst) {
            return Err(RemoteError::Rejected("delete refused".into()));
        }
        self.comments.lock().unwrap().retain(|c| c.id != comment_id);
        Ok(())
    }
}

/// D1..D3 in `lead`, D4 in `qualified_solution`.
pub fn sample_deals() -> Vec<Deal> {
    vec![
        Deal::new(1, "D1", Stage::Lead).with_position(0),
        Deal::new(2, "D2", Stage::Lead).with_position(1),
        Deal::new(3, "D3", Stage::Lead).with_position(2),
        Deal::new(4, "D4", Stage::QualifiedSolution).with_position(0),
    ]
}
