use reqwest::{Client, Method};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid method '{0}'")]
    Method(String),

    #[error("service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("response is not JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Decoded response from a dispatched endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerResponse {
    pub status: u16,
    /// `Value::Null` when the body was empty.
    pub body: Value,
}

impl LedgerResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The `error` field of a rejection body, if present.
    pub fn error(&self) -> Option<&str> {
        self.body.get("error").and_then(Value::as_str)
    }
}

pub struct LedgerClient {
    client: Client,
    base_url: String,
    spec_path: String,
}

impl LedgerClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Reuse a configured `reqwest` client (timeouts, proxies).
    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            spec_path: "/openapi.json".to_string(),
        }
    }

    /// Where the service publishes its document, if not `/openapi.json`.
    pub fn spec_path(mut self, path: &str) -> Self {
        self.spec_path = path.to_string();
        self
    }

    /// Fetch the synthesized API document.
    pub async fn fetch_document(&self) -> Result<Value, ClientError> {
        let resp = self
            .client
            .get(format!("{}{}", self.base_url, self.spec_path))
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                body: text,
            });
        }
        Ok(serde_json::from_str(&text)?)
    }

    /// `(method, path)` of every operation in the document, sorted by path.
    pub async fn list_operations(&self) -> Result<Vec<(String, String)>, ClientError> {
        let document = self.fetch_document().await?;
        let mut operations = Vec::new();
        if let Some(paths) = document.get("paths").and_then(Value::as_object) {
            for (path, methods) in paths {
                if let Some(methods) = methods.as_object() {
                    for method in methods.keys() {
                        operations.push((method.to_uppercase(), path.clone()));
                    }
                }
            }
        }
        Ok(operations)
    }

    /// Call an endpoint. Non-2xx answers are returned, not raised, so
    /// rejection bodies can be inspected.
    pub async fn invoke(
        &self,
        method: &str,
        path: &str,
        body: Option<&Value>,
    ) -> Result<LedgerResponse, ClientError> {
        let method = Method::from_bytes(method.to_uppercase().as_bytes())
            .map_err(|_| ClientError::Method(method.to_string()))?;

        let mut req = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req.send().await?;
        let status = resp.status().as_u16();
        let text = resp.text().await?;
        let body = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text)?
        };

        Ok(LedgerResponse { status, body })
    }
}
