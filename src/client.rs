//! Thin qTest manager API client: one authenticated POST per invocation,
//! no retry, no client-side policy beyond reqwest defaults.

use crate::error::UploadError;
use crate::request::AutomationRequest;

pub struct QtestClient {
    http: reqwest::Client,
    host: String,
    token: String,
}

impl QtestClient {
    pub fn new(host: &str, token: &str) -> Self {
        QtestClient {
            http: reqwest::Client::new(),
            host: host.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    /// Submit an automation request for `project_id` and return the queue
    /// job id qTest hands back for the asynchronous import.
    pub async fn submit(
        &self,
        project_id: u64,
        request: &AutomationRequest,
    ) -> Result<i64, UploadError> {
        let url = format!(
            "{}/api/v3/projects/{}/auto-test-logs?type=automation",
            self.host, project_id
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(request)
            .send()
            .await
            .map_err(|e| UploadError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UploadError::Transport(format!(
                "qTest returned {status}: {body}"
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| UploadError::Transport(e.to_string()))?;

        body.get("id")
            .and_then(serde_json::Value::as_i64)
            .ok_or_else(|| {
                UploadError::Transport(format!("no queue job id in qTest response: {body}"))
            })
    }
}
