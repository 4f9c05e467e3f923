use std::time::Duration;

use async_trait::async_trait;
use dealboard_common::{
    BoardResponse, Comment, Deal, DealDetail, InsightPayload, NewComment, Stage, StatusUpdate,
};
use serde::de::DeserializeOwned;

use super::DealBoardService;
use crate::errors::RemoteError;

/// Every deal-board route lives under this prefix.
const API_PREFIX: &str = "/api/sprint";

/// Longest slice of a non-JSON error body carried into an error message.
const MAX_ERROR_BODY: usize = 200;

/// `DealBoardService` over the backend's REST API.
#[derive(Debug, Clone)]
pub struct HttpDealBoardService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpDealBoardService {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| RemoteError::Transport {
                endpoint: base_url.to_string(),
                source,
            })?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_PREFIX, path)
    }

    async fn send(
        &self,
        endpoint: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, RemoteError> {
        tracing::debug!(endpoint, "Sending deal-board request");
        let resp = request
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|source| RemoteError::Transport {
                endpoint: endpoint.to_string(),
                source,
            })?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(RemoteError::Status {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
            message: error_message(&body),
        })
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<T, RemoteError> {
        let resp = self.send(endpoint, request).await?;
        resp.json::<T>().await.map_err(|e| RemoteError::Decode {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })
    }
}

/// Pull a readable message out of an error body: FastAPI's `detail`, an
/// `error` field, or the raw text.
fn error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["detail", "error", "message"] {
            match value.get(key) {
                Some(serde_json::Value::String(s)) => return s.clone(),
                Some(other) if !other.is_null() => return other.to_string(),
                _ => {}
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "empty response body".to_string();
    }
    trimmed.chars().take(MAX_ERROR_BODY).collect()
}

#[async_trait]
impl DealBoardService for HttpDealBoardService {
    async fn fetch_board(&self) -> Result<Vec<Deal>, RemoteError> {
        let endpoint = "GET /board";
        let board: BoardResponse = self
            .send_json(endpoint, self.client.get(self.url("/board")))
            .await?;
        Ok(board.into_deals())
    }

    async fn update_deal_status(&self, update: &StatusUpdate) -> Result<(), RemoteError> {
        let path = format!("/deals/{}/status", update.deal_id);
        let endpoint = format!("PUT {}", path);
        self.send(&endpoint, self.client.put(self.url(&path)).json(update))
            .await?;
        Ok(())
    }

    async fn trigger_ai_insight(
        &self,
        deal_id: i64,
        current_stage: Stage,
    ) -> Result<InsightPayload, RemoteError> {
        let path = format!("/ai/insight/{}", deal_id);
        let endpoint = format!("POST {}", path);
        let body = serde_json::json!({ "current_status": current_stage.as_str() });
        self.send_json(&endpoint, self.client.post(self.url(&path)).json(&body))
            .await
    }

    async fn fetch_comments(&self, deal_id: i64) -> Result<Vec<Comment>, RemoteError> {
        let path = format!("/deals/{}/detailed", deal_id);
        let endpoint = format!("GET {}", path);
        let detail: DealDetail = self
            .send_json(&endpoint, self.client.get(self.url(&path)))
            .await?;
        Ok(detail.comments)
    }

    async fn create_comment(&self, comment: &NewComment) -> Result<Comment, RemoteError> {
        let path = format!("/deals/{}/comments", comment.deal_id);
        let endpoint = format!("POST {}", path);
        self.send_json(&endpoint, self.client.post(self.url(&path)).json(comment))
            .await
    }

    async fn delete_comment(&self, comment_id: i64) -> Result<(), RemoteError> {
        let path = format!("/comments/{}", comment_id);
        let endpoint = format!("DELETE {}", path);
        self.send(&endpoint, self.client.delete(self.url(&path)))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_prefix_without_double_slash() {
        let svc = HttpDealBoardService::new("http://localhost:8000/", Duration::from_secs(5)).unwrap();
        assert_eq!(svc.base_url(), "http://localhost:8000");
        assert_eq!(svc.url("/board"), "http://localhost:8000/api/sprint/board");
    }

    #[test]
    fn test_error_message_prefers_detail() {
        assert_eq!(
            error_message(r#"{"detail": "Deal not found"}"#),
            "Deal not found"
        );
        assert_eq!(error_message(r#"{"error": "Lock poisoned"}"#), "Lock poisoned");
    }

    #[test]
    fn test_error_message_serializes_structured_detail() {
        let msg = error_message(r#"{"detail": [{"loc": ["body", "new_status"], "msg": "field required"}]}"#);
        assert!(msg.contains("field required"));
    }

    #[test]
    fn test_error_message_falls_back_to_text() {
        assert_eq!(error_message("Bad Gateway\n"), "Bad Gateway");
        assert_eq!(error_message(""), "empty response body");
        assert_eq!(error_message(&"x".repeat(500)).len(), MAX_ERROR_BODY);
    }
}
