use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Capacity used by [`channel`]. Slow subscribers lag rather than block.
pub const NOTICE_CAPACITY: usize = 64;

/// Transient user-visible notification raised by a board action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notice {
    Success { message: String },
    Failure { message: String },
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Notice::Success {
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Notice::Failure {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Notice::Success { message } | Notice::Failure { message } => message,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Notice::Failure { .. })
    }
}

pub type NoticeSender = broadcast::Sender<Notice>;

pub fn channel() -> (NoticeSender, broadcast::Receiver<Notice>) {
    broadcast::channel(NOTICE_CAPACITY)
}

pub fn publish(tx: &NoticeSender, notice: Notice) {
    // No receivers just means nobody is showing notices right now.
    let _ = tx.send(notice);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_serializes_with_type_tag() {
        let json = serde_json::to_value(Notice::failure("Failed to move deal")).unwrap();
        assert_eq!(json["type"], "failure");
        assert_eq!(json["message"], "Failed to move deal");
    }

    #[test]
    fn test_publish_without_receivers_is_silent() {
        let (tx, rx) = channel();
        drop(rx);
        publish(&tx, Notice::success("ok"));
    }

    #[tokio::test]
    async fn test_publish_reaches_subscribers() {
        let (tx, mut rx) = channel();
        publish(&tx, Notice::success("Deal moved"));
        let got = rx.recv().await.unwrap();
        assert_eq!(got.message(), "Deal moved");
        assert!(!got.is_failure());
    }
}
