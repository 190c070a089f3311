//! 远程遥测（Firebase Realtime Database REST 推送）
//!
//! 遥测只是旁路：`push` 不返回 `Result`，而是返回 `TelemetryOutcome`，
//! 调用方只记录结果，不向上传播，也不影响本地 CSV 写入。

use serde::Serialize;
use uuid::Uuid;

use super::LogRecord;
use crate::config::TelemetryConfig;

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("telemetry request timed out")]
    Timeout,
    #[error("telemetry network error: {0}")]
    Network(String),
    #[error("telemetry api error: status={status}, message={message}")]
    ApiError { status: u16, message: String },
}

impl From<reqwest::Error> for TelemetryError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else {
            Self::Network(e.to_string())
        }
    }
}

/// 一次推送的结果
#[derive(Debug)]
pub enum TelemetryOutcome {
    Delivered,
    /// 遥测未启用
    Skipped,
    Failed(TelemetryError),
}

#[derive(Serialize)]
struct TelemetryPayload<'a> {
    session_id: Uuid,
    #[serde(flatten)]
    record: &'a LogRecord,
}

#[derive(Debug, Clone)]
pub struct TelemetryClient {
    client: reqwest::Client,
    endpoint: Option<String>,
    auth_token: Option<String>,
    session_id: Uuid,
}

impl TelemetryClient {
    pub fn new(config: &TelemetryConfig, session_id: Uuid) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        let url = config.url.trim();
        let endpoint = if !config.enabled {
            None
        } else if url.is_empty() {
            tracing::warn!("Telemetry enabled without TELEMETRY_URL, running without telemetry");
            None
        } else {
            Some(format!("{}/health_logs.json", url.trim_end_matches('/')))
        };
        let auth_token = Some(config.auth_token.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        Self {
            client,
            endpoint,
            auth_token,
            session_id,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.endpoint.is_some()
    }

    pub async fn push(&self, record: &LogRecord) -> TelemetryOutcome {
        let Some(endpoint) = self.endpoint.as_deref() else {
            return TelemetryOutcome::Skipped;
        };
        match self.send(endpoint, record).await {
            Ok(()) => TelemetryOutcome::Delivered,
            Err(e) => TelemetryOutcome::Failed(e),
        }
    }

    async fn send(&self, endpoint: &str, record: &LogRecord) -> Result<(), TelemetryError> {
        let payload = TelemetryPayload {
            session_id: self.session_id,
            record,
        };
        let mut request = self.client.post(endpoint).json(&payload);
        if let Some(token) = &self.auth_token {
            request = request.query(&[("auth", token)]);
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let message = response.text().await.unwrap_or_default();
        Err(TelemetryError::ApiError {
            status: status.as_u16(),
            message,
        })
    }
}
