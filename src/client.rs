use std::future::Future;

use reqwest::{Client, Response, StatusCode};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::models::{ChartData, EntryList, EntryPayload, ErrorBody};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ClientError {
    /// Transport failure or a non-success status without a usable message.
    #[error("network error: {0}")]
    Network(String),

    /// Rejected input, either locally or by the server.
    #[error("{0}")]
    Validation(String),
}

impl ClientError {
    /// The message worth showing to the user verbatim, if any.
    pub fn user_message(&self) -> Option<&str> {
        match self {
            ClientError::Validation(message) if !message.trim().is_empty() => Some(message),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Network(err.to_string())
    }
}

/// The remote entry surface the tracker talks to.
pub trait EntryApi {
    /// Lists entries. A `page_size` of 0 asks for every entry.
    fn list_entries(&self, page: u64, page_size: u64) -> impl Future<Output = Result<EntryList, ClientError>> + Send;

    /// Creates or replaces the entry for `payload.date`.
    fn create_entry(&self, payload: &EntryPayload) -> impl Future<Output = Result<(), ClientError>> + Send;

    fn chart_data(&self) -> impl Future<Output = Result<ChartData, ClientError>> + Send;
}

#[derive(Debug, Clone)]
pub struct HttpEntryClient {
    client: Client,
    base_url: String,
}

impl HttpEntryClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

impl EntryApi for HttpEntryClient {
    async fn list_entries(&self, page: u64, page_size: u64) -> Result<EntryList, ClientError> {
        let url = self.url("/api/entries");
        debug!(%url, page, page_size, "listing entries");

        let response = self
            .client
            .get(&url)
            .query(&[("page", page), ("limit", page_size)])
            .send()
            .await?;

        if !response.status().is_success() {
            warn!(status = %response.status(), "listing entries failed");
            return Err(ClientError::Network(format!(
                "listing entries failed with status {}",
                response.status()
            )));
        }

        Ok(response.json::<EntryList>().await?)
    }

    async fn create_entry(&self, payload: &EntryPayload) -> Result<(), ClientError> {
        let url = self.url("/api/entries");
        debug!(%url, date = %payload.date, "saving entry");

        let response = self.client.post(&url).json(payload).send().await?;
        if response.status().is_success() {
            return Ok(());
        }

        Err(rejection(response).await)
    }

    async fn chart_data(&self) -> Result<ChartData, ClientError> {
        let response = self.client.get(self.url("/api/chart/data")).send().await?;
        if !response.status().is_success() {
            return Err(ClientError::Network(format!(
                "loading chart data failed with status {}",
                response.status()
            )));
        }
        Ok(response.json::<ChartData>().await?)
    }
}

/// Turns a failed save into an error, preferring the server's `error` field.
async fn rejection(response: Response) -> ClientError {
    let status = response.status();
    let body = response.json::<ErrorBody>().await.unwrap_or_default();

    match body.error.filter(|message| !message.trim().is_empty()) {
        Some(message) => {
            warn!(%status, %message, "server rejected entry");
            ClientError::Validation(message)
        }
        None => {
            warn!(%status, "saving entry failed");
            ClientError::Network(status_text(status))
        }
    }
}

fn status_text(status: StatusCode) -> String {
    format!("saving entry failed with status {status}")
}
