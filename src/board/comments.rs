use std::sync::Arc;

use dealboard_common::{Comment, NewComment};

use super::notice::{Notice, NoticeSender, publish};
use crate::errors::RemoteError;
use crate::remote::DealBoardService;

/// Asks the user to approve a destructive action.
///
/// Real implementation: `cmd::comments::DialoguerConfirm`.
/// Test double: `Scripted` in this module's tests.
pub trait Confirm: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Approves everything. Used for `--yes`.
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

/// Author attached to every new comment.
#[derive(Debug, Clone, PartialEq)]
pub struct Commenter {
    pub name: String,
    pub role: Option<String>,
}

#[derive(Debug)]
pub enum PostOutcome {
    Posted(Comment),
    Failed(RemoteError),
    /// Blank text; nothing was sent.
    Ignored,
}

#[derive(Debug)]
pub enum DeleteOutcome {
    Deleted,
    Declined,
    Failed(RemoteError),
    /// No comment with that id in the thread; nothing was sent.
    NotFound,
}

/// The comments of one deal, newest first.
///
/// Nothing here is optimistic: the list changes only after the remote
/// confirms.
pub struct CommentThread {
    deal_id: i64,
    comments: Vec<Comment>,
    commenter: Commenter,
    service: Arc<dyn DealBoardService>,
    notices: NoticeSender,
}

impl CommentThread {
    pub fn new(
        deal_id: i64,
        mut comments: Vec<Comment>,
        commenter: Commenter,
        service: Arc<dyn DealBoardService>,
        notices: NoticeSender,
    ) -> Self {
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Self {
            deal_id,
            comments,
            commenter,
            service,
            notices,
        }
    }

    pub async fn load(
        deal_id: i64,
        commenter: Commenter,
        service: Arc<dyn DealBoardService>,
        notices: NoticeSender,
    ) -> Result<Self, RemoteError> {
        let comments = service.fetch_comments(deal_id).await?;
        tracing::debug!(deal_id, count = comments.len(), "Loaded comments");
        Ok(Self::new(deal_id, comments, commenter, service, notices))
    }

    pub fn deal_id(&self) -> i64 {
        self.deal_id
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub async fn post_comment(&mut self, text: &str) -> PostOutcome {
        let text = text.trim();
        if text.is_empty() {
            tracing::debug!(deal_id = self.deal_id, "Ignoring blank comment");
            return PostOutcome::Ignored;
        }

        let request = NewComment {
            deal_id: self.deal_id,
            commenter_name: self.commenter.name.clone(),
            commenter_role: self.commenter.role.clone(),
            comment_text: text.to_string(),
        };
        match self.service.create_comment(&request).await {
            Ok(comment) => {
                tracing::info!(deal_id = self.deal_id, comment_id = comment.id, "Comment added");
                self.comments.insert(0, comment.clone());
                publish(&self.notices, Notice::success("Comment added"));
                PostOutcome::Posted(comment)
            }
            Err(e) => {
                tracing::warn!(deal_id = self.deal_id, error = %e, "Failed to add comment");
                publish(
                    &self.notices,
                    Notice::failure(format!("Failed to add comment: {}", e)),
                );
                PostOutcome::Failed(e)
            }
        }
    }

    pub async fn delete_comment(&mut self, comment_id: i64, confirm: &dyn Confirm) -> DeleteOutcome {
        if !self.comments.iter().any(|c| c.id == comment_id) {
            tracing::debug!(deal_id = self.deal_id, comment_id, "Ignoring delete of unknown comment");
            return DeleteOutcome::NotFound;
        }
        if !confirm.confirm("Are you sure you want to delete this comment?") {
            return DeleteOutcome::Declined;
        }

        match self.service.delete_comment(comment_id).await {
            Ok(()) => {
                tracing::info!(deal_id = self.deal_id, comment_id, "Comment deleted");
                self.comments.retain(|c| c.id != comment_id);
                publish(&self.notices, Notice::success("Comment deleted"));
                DeleteOutcome::Deleted
            }
            Err(e) => {
                tracing::warn!(deal_id = self.deal_id, comment_id, error = %e, "Failed to delete comment");
                publish(
                    &self.notices,
                    Notice::failure(format!("Failed to delete comment: {}", e)),
                );
                DeleteOutcome::Failed(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::notice;
    use crate::board::testing::{Call, FakeService, sample_deals};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::broadcast;

    struct Scripted {
        answer: bool,
        asked: AtomicUsize,
    }

    impl Scripted {
        fn new(answer: bool) -> Self {
            Self {
                answer,
                asked: AtomicUsize::new(0),
            }
        }
    }

    impl Confirm for Scripted {
        fn confirm(&self, _prompt: &str) -> bool {
            self.asked.fetch_add(1, Ordering::SeqCst);
            self.answer
        }
    }

    fn comment(id: i64, created_at: &str) -> Comment {
        Comment {
            id,
            deal_id: 1,
            commenter_name: "Ana".into(),
            commenter_role: Some("sales".into()),
            comment_text: format!("note {}", id),
            created_at: created_at.into(),
        }
    }

    fn commenter() -> Commenter {
        Commenter {
            name: "Sales Team".into(),
            role: Some("sales".into()),
        }
    }

    async fn thread() -> (CommentThread, Arc<FakeService>, broadcast::Receiver<Notice>) {
        let svc = Arc::new(FakeService::with_deals(sample_deals()).with_comments(vec![
            comment(1, "2026-01-01T08:00:00"),
            comment(2, "2026-01-02T08:00:00"),
        ]));
        let (tx, rx) = notice::channel();
        let thread = CommentThread::load(1, commenter(), svc.clone(), tx)
            .await
            .unwrap();
        (thread, svc, rx)
    }

    fn ids(thread: &CommentThread) -> Vec<i64> {
        thread.comments().iter().map(|c| c.id).collect()
    }

    #[tokio::test]
    async fn test_load_orders_newest_first() {
        let (thread, svc, _rx) = thread().await;
        assert_eq!(ids(&thread), vec![2, 1]);
        assert_eq!(svc.calls(), vec![Call::FetchComments(1)]);
    }

    #[tokio::test]
    async fn test_post_prepends_server_comment() {
        let (mut thread, svc, mut rx) = thread().await;

        let created = match thread.post_comment("  Call scheduled  ").await {
            PostOutcome::Posted(comment) => comment,
            other => panic!("Expected Posted, got {:?}", other),
        };
        assert_eq!(created.id, 100);
        assert_eq!(ids(&thread), vec![100, 2, 1]);

        match &svc.calls()[1] {
            Call::CreateComment(req) => {
                assert_eq!(req.comment_text, "Call scheduled");
                assert_eq!(req.commenter_name, "Sales Team");
                assert_eq!(req.commenter_role.as_deref(), Some("sales"));
            }
            other => panic!("Expected CreateComment, got {:?}", other),
        }
        assert_eq!(rx.recv().await.unwrap(), Notice::success("Comment added"));
    }

    #[tokio::test]
    async fn test_failed_post_never_appears() {
        let (mut thread, svc, mut rx) = thread().await;
        svc.fail_create_comment.store(true, Ordering::SeqCst);

        assert!(matches!(
            thread.post_comment("lost").await,
            PostOutcome::Failed(_)
        ));
        assert_eq!(ids(&thread), vec![2, 1]);
        assert!(rx.recv().await.unwrap().is_failure());
    }

    #[tokio::test]
    async fn test_blank_post_is_ignored() {
        let (mut thread, svc, _rx) = thread().await;
        assert!(matches!(thread.post_comment("   ").await, PostOutcome::Ignored));
        assert_eq!(svc.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_removes_after_confirmation() {
        let (mut thread, svc, _rx) = thread().await;
        let confirm = Scripted::new(true);

        assert!(matches!(
            thread.delete_comment(2, &confirm).await,
            DeleteOutcome::Deleted
        ));
        assert_eq!(ids(&thread), vec![1]);
        assert_eq!(confirm.asked.load(Ordering::SeqCst), 1);
        assert_eq!(svc.calls()[1], Call::DeleteComment(2));
    }

    #[tokio::test]
    async fn test_declined_delete_makes_no_call() {
        let (mut thread, svc, mut rx) = thread().await;
        let confirm = Scripted::new(false);

        assert!(matches!(
            thread.delete_comment(1, &confirm).await,
            DeleteOutcome::Declined
        ));
        assert_eq!(ids(&thread), vec![2, 1]);
        assert_eq!(svc.calls().len(), 1);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_comment() {
        let (mut thread, svc, mut rx) = thread().await;
        svc.fail_delete_comment.store(true, Ordering::SeqCst);

        assert!(matches!(
            thread.delete_comment(1, &AssumeYes).await,
            DeleteOutcome::Failed(_)
        ));
        assert_eq!(ids(&thread), vec![2, 1]);
        assert!(rx.recv().await.unwrap().is_failure());
    }

    #[tokio::test]
    async fn test_delete_unknown_id_skips_confirmation() {
        let (mut thread, svc, _rx) = thread().await;
        let confirm = Scripted::new(true);

        assert!(matches!(
            thread.delete_comment(42, &confirm).await,
            DeleteOutcome::NotFound
        ));
        assert_eq!(confirm.asked.load(Ordering::SeqCst), 0);
        assert_eq!(svc.calls().len(), 1);
    }
}
