//! Remote record service contract and its HTTP client.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use zbalo_core::RecordId;
use zbalo_records::{
    ChatReply, ChatRequest, ChatTurn, DashboardStats, EntityKind, ReceiptScanRequest,
    ReceiptScanResponse, VocabularyKey,
};

use crate::error::{ServiceError, ServiceResult};

/// Everything the console asks of the remote service.
///
/// Record bodies travel as JSON values; typing happens on the console side so
/// that one implementation serves every kind.
#[async_trait]
pub trait RecordService: Send + Sync {
    /// Full collection for one kind.
    async fn list(&self, kind: EntityKind) -> ServiceResult<Value>;

    /// Create a record; returns the confirmed row.
    async fn create(&self, kind: EntityKind, body: Value) -> ServiceResult<Value>;

    /// Replace a record; returns the confirmed row.
    async fn update(&self, kind: EntityKind, id: RecordId, body: Value) -> ServiceResult<Value>;

    /// Delete by key: the record id, or the name for plots.
    async fn remove(&self, kind: EntityKind, key: &str) -> ServiceResult<()>;

    async fn complete_reminder(&self, id: RecordId) -> ServiceResult<()>;

    async fn put_vocabulary(&self, key: VocabularyKey, values: &[String]) -> ServiceResult<()>;

    async fn stats(&self) -> ServiceResult<DashboardStats>;

    async fn scan_receipt(&self, request: &ReceiptScanRequest) -> ServiceResult<ReceiptScanResponse>;

    async fn chat(&self, transcript: &[ChatTurn]) -> ServiceResult<ChatReply>;
}

/// `reqwest` client for the service's `/api` routes.
#[derive(Debug, Clone)]
pub struct HttpRecordService {
    client: reqwest::Client,
    base: Url,
    token: Option<String>,
}

impl HttpRecordService {
    pub fn new(api_url: &str) -> ServiceResult<Self> {
        let base = Url::parse(api_url)
            .map_err(|e| ServiceError::Config(format!("invalid API url {api_url}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(ServiceError::Config(format!("API url cannot be a base: {api_url}")));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            base,
            token: None,
        })
    }

    pub fn with_token(api_url: &str, token: impl Into<String>) -> ServiceResult<Self> {
        let mut service = Self::new(api_url)?;
        service.token = Some(token.into());
        Ok(service)
    }

    /// `{base}/api/{segments...}`, each segment percent-encoded.
    fn url(&self, segments: &[&str]) -> ServiceResult<Url> {
        let mut url = self.base.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ServiceError::Config(format!("API url cannot be a base: {}", self.base)))?;
            path.pop_if_empty().push("api");
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        tracing::debug!(%method, %url, "outbound request");
        let req = self.client.request(method, url);
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn send(&self, req: RequestBuilder) -> ServiceResult<Response> {
        let resp = req.send().await.map_err(|e| {
            tracing::warn!(error = %e, "request failed");
            ServiceError::Network(e.to_string())
        })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = error_message(&body);
            tracing::warn!(status = status.as_u16(), %message, "service returned an error");
            return Err(ServiceError::Api(status.as_u16(), message));
        }
        Ok(resp)
    }

    async fn json<T: DeserializeOwned>(&self, req: RequestBuilder) -> ServiceResult<T> {
        let resp = self.send(req).await?;
        resp.json::<T>()
            .await
            .map_err(|e| ServiceError::Parse(e.to_string()))
    }

    async fn json_with_body<B, T>(&self, method: Method, url: Url, body: &B) -> ServiceResult<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        self.json(self.request(method, url).json(body)).await
    }
}

/// The service reports failures as `{"error": "..."}`; fall back to the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

#[async_trait]
impl RecordService for HttpRecordService {
    async fn list(&self, kind: EntityKind) -> ServiceResult<Value> {
        let url = self.url(&[kind.collection_path()])?;
        self.json(self.request(Method::GET, url)).await
    }

    async fn create(&self, kind: EntityKind, body: Value) -> ServiceResult<Value> {
        let url = self.url(&[kind.collection_path()])?;
        self.json_with_body(Method::POST, url, &body).await
    }

    async fn update(&self, kind: EntityKind, id: RecordId, body: Value) -> ServiceResult<Value> {
        let id = id.to_string();
        let url = self.url(&[kind.collection_path(), &id])?;
        self.json_with_body(Method::PUT, url, &body).await
    }

    async fn remove(&self, kind: EntityKind, key: &str) -> ServiceResult<()> {
        let url = self.url(&[kind.collection_path(), key])?;
        self.send(self.request(Method::DELETE, url)).await?;
        Ok(())
    }

    async fn complete_reminder(&self, id: RecordId) -> ServiceResult<()> {
        let id = id.to_string();
        let url = self.url(&[EntityKind::Reminder.collection_path(), &id, "done"])?;
        self.send(self.request(Method::POST, url)).await?;
        Ok(())
    }

    async fn put_vocabulary(&self, key: VocabularyKey, values: &[String]) -> ServiceResult<()> {
        let url = self.url(&[EntityKind::Settings.collection_path(), key.as_str()])?;
        let body = serde_json::json!({ "value": values });
        self.send(self.request(Method::PUT, url).json(&body)).await?;
        Ok(())
    }

    async fn stats(&self) -> ServiceResult<DashboardStats> {
        let url = self.url(&["stats"])?;
        self.json(self.request(Method::GET, url)).await
    }

    async fn scan_receipt(&self, request: &ReceiptScanRequest) -> ServiceResult<ReceiptScanResponse> {
        let url = self.url(&["scan-ticket"])?;
        match self.json_with_body(Method::POST, url, request).await {
            // Recognition failures come back with an error status and a message.
            Err(ServiceError::Api(_, message)) if !message.is_empty() => {
                Err(ServiceError::Rejected(message))
            }
            other => other,
        }
    }

    async fn chat(&self, transcript: &[ChatTurn]) -> ServiceResult<ChatReply> {
        let url = self.url(&["chat"])?;
        let body = ChatRequest { messages: transcript };
        self.json_with_body(Method::POST, url, &body).await
    }
}
