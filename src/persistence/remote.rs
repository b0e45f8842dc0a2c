use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use tokio_retry::{strategy::ExponentialBackoff, RetryIf};

use super::{SaveReceipt, SimulationRecord, SinkError};
use crate::profile::Profile;
use crate::scoring::Projection;

/// Environment variable holding an optional bearer token for the document store
pub const ENV_TOKEN_VAR: &str = "CREDIT_PROJECTOR_SINK_TOKEN";

/// Read the sink token from the environment. Empty values count as unset.
pub fn get_token_from_env() -> Option<String> {
    std::env::var(ENV_TOKEN_VAR)
        .ok()
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}

/// Body sent to the store. The timestamp is left to the server.
#[derive(Serialize)]
struct Document<'a> {
    user_id: &'a str,
    profile: &'a Profile,
    projection: &'a Projection,
}

/// Writes simulations to a document store over HTTP.
#[derive(Debug, Clone)]
pub struct RemoteSink {
    client: reqwest::Client,
    url: String,
    token: Option<String>,
    retries: usize,
}

impl RemoteSink {
    pub fn new(
        endpoint: &str,
        collection: &str,
        timeout: Duration,
        retries: usize,
        token: Option<String>,
    ) -> Result<Self, SinkError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("credit-projector/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SinkError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: collection_url(endpoint, collection),
            token,
            retries,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn save(&self, record: &SimulationRecord) -> Result<SaveReceipt, SinkError> {
        let document = Document {
            user_id: &record.user_id,
            profile: &record.profile,
            projection: &record.projection,
        };
        let body = serde_json::to_vec(&document).map_err(|e| SinkError::Serialize(e.to_string()))?;

        // Exponential backoff, only for failures that may go away on their own
        let retry_strategy = ExponentialBackoff::from_millis(10)
            .factor(10)
            .max_delay(Duration::from_secs(5))
            .take(self.retries);

        RetryIf::spawn(
            retry_strategy,
            || self.post_once(body.clone()),
            SinkError::is_transient,
        )
        .await
    }

    async fn post_once(&self, body: Vec<u8>) -> Result<SaveReceipt, SinkError> {
        let mut request = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .body(body);
        if let Some(ref token) = self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SinkError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| SinkError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(SinkError::Rejected {
                status: status.as_u16(),
                body: text.chars().take(200).collect(),
            });
        }

        Ok(parse_receipt(&text))
    }
}

/// Join endpoint and collection with exactly one slash.
pub fn collection_url(endpoint: &str, collection: &str) -> String {
    format!(
        "{}/{}",
        endpoint.trim_end_matches('/'),
        collection.trim_matches('/')
    )
}

/// Pull the server-assigned id and timestamp out of a response body, if present.
fn parse_receipt(body: &str) -> SaveReceipt {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return SaveReceipt::default();
    };

    let id = value
        .get("id")
        .or_else(|| value.get("name"))
        .and_then(|v| v.as_str())
        .map(str::to_string);

    let saved_at = value
        .get("saved_at")
        .or_else(|| value.get("createTime"))
        .and_then(|v| v.as_str())
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc));

    SaveReceipt { id, saved_at }
}
