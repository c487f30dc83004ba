//! Client side of the API: saving and listing entries, and asking the generation endpoint for
//! text. [EntryApi] and [SummaryApi] are the seams the tracking session is written against.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use reqwest::Response;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::{
    server::{error::ErrorBody, storage::entities::TimeEntryDocument},
    tracker::entry::TimeEntry,
};

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3000";
pub const DEFAULT_MODEL: &str = "llama2";

#[cfg_attr(test, automock)]
#[async_trait]
pub trait EntryApi: Send + Sync {
    async fn save_entry(&self, entry: &TimeEntry) -> Result<TimeEntryDocument>;

    async fn list_entries(&self) -> Result<Vec<TimeEntryDocument>>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait SummaryApi: Send + Sync {
    /// Returns the generated text for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub model: Arc<str>,
    pub prompt: String,
    pub stream: bool,
}

/// The generation service sends more fields than this; only the text is used.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GenerateResponse {
    pub response: String,
}

/// Talks to a running `tracktime serve`.
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: Arc<str>,
    model: Arc<str>,
}

impl ApiClient {
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').into(),
            model: model.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

/// Decodes a success body, or turns the `{error}` payload of a failed request into an error.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let text = response.text().await?;
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.error)
        .unwrap_or(text);
    Err(anyhow!("Request failed with {status}: {message}"))
}

#[async_trait]
impl EntryApi for ApiClient {
    #[instrument(skip_all, fields(entry = %entry.id))]
    async fn save_entry(&self, entry: &TimeEntry) -> Result<TimeEntryDocument> {
        let response = self
            .client
            .post(self.url("/api/timeEntries"))
            .json(entry)
            .send()
            .await?;
        let document: TimeEntryDocument = decode(response).await?;
        debug!("Entry stored as {}", document.document_id);
        Ok(document)
    }

    async fn list_entries(&self) -> Result<Vec<TimeEntryDocument>> {
        let response = self.client.get(self.url("/api/timeEntries")).send().await?;
        decode(response).await
    }
}

#[async_trait]
impl SummaryApi for ApiClient {
    #[instrument(skip_all, fields(model = %self.model))]
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            model: self.model.clone(),
            prompt: prompt.to_owned(),
            stream: false,
        };
        let response = self
            .client
            .post(self.url("/api/ollama/generate"))
            .json(&request)
            .send()
            .await?;
        let generated: GenerateResponse = decode(response).await?;
        Ok(generated.response)
    }
}
