//! Remote store client
//!
//! [`RemoteStore`] is the network boundary consumed by the importers;
//! [`HttpRemoteStore`] maps it onto the dashboard server's REST API.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::document::{DrawingPayload, DrawingRecord};
use crate::errors::{ImportError, ImportResult, SnapshotError, SnapshotResult};

#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Persist one drawing; the id of the returned record is assigned
    /// remotely.
    async fn create_drawing(&self, payload: &DrawingPayload) -> ImportResult<DrawingRecord>;

    /// Fetch the current library item collection. A non-success status is
    /// reported as an empty collection, not an error.
    async fn fetch_library(&self) -> ImportResult<Vec<Value>>;

    /// Replace the remote library with the given full item collection.
    async fn save_library(&self, items: &[Value]) -> ImportResult<()>;

    /// Read-only check of a snapshot; performs no mutation of the store.
    async fn verify_snapshot(&self, snapshot: &[u8]) -> SnapshotResult<()>;

    /// Replace the entire store contents with the snapshot.
    async fn commit_snapshot(&self, snapshot: &[u8]) -> SnapshotResult<()>;
}

#[derive(Debug, Deserialize)]
struct LibraryEnvelope {
    #[serde(rename = "libraryItems", default)]
    library_items: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// HTTP implementation of the remote store contract.
#[derive(Debug, Clone)]
pub struct HttpRemoteStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRemoteStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.api_url.clone())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Whole-store export is a server-side hand-off; the client only builds
    /// the download URLs.
    pub fn export_url(&self) -> String {
        self.url("/export")
    }

    pub fn export_json_url(&self) -> String {
        self.url("/export/json")
    }

    fn snapshot_form(snapshot: &[u8]) -> reqwest::multipart::Form {
        let part = reqwest::multipart::Part::bytes(snapshot.to_vec()).file_name("database.sqlite");
        reqwest::multipart::Form::new().part("db", part)
    }

    async fn rejection_message(response: reqwest::Response, fallback: &str) -> String {
        response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.error)
            .unwrap_or_else(|| fallback.to_string())
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn create_drawing(&self, payload: &DrawingPayload) -> ImportResult<DrawingRecord> {
        let response = self
            .client
            .post(self.url("/drawings"))
            .json(payload)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ImportError::RemoteRejection(format!(
                "API error: {}",
                response.status()
            )));
        }
        let record: DrawingRecord = response.json().await?;
        debug!(id = %record.id, name = %record.name, "created drawing");
        Ok(record)
    }

    async fn fetch_library(&self) -> ImportResult<Vec<Value>> {
        let response = self.client.get(self.url("/library")).send().await?;
        if !response.status().is_success() {
            warn!(status = %response.status(), "library fetch returned non-success, treating as empty");
            return Ok(Vec::new());
        }
        let envelope: LibraryEnvelope = response.json().await?;
        Ok(envelope.library_items)
    }

    async fn save_library(&self, items: &[Value]) -> ImportResult<()> {
        let response = self
            .client
            .post(self.url("/library"))
            .json(&json!({ "libraryItems": items }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ImportError::RemoteRejection(
                "Failed to save library".to_string(),
            ));
        }
        Ok(())
    }

    async fn verify_snapshot(&self, snapshot: &[u8]) -> SnapshotResult<()> {
        let response = self
            .client
            .post(self.url("/import/sqlite/verify"))
            .multipart(Self::snapshot_form(snapshot))
            .send()
            .await?;
        if response.status().is_success() {
            return Ok(());
        }
        let message = Self::rejection_message(response, "Invalid database file.").await;
        Err(SnapshotError::Rejected(message))
    }

    async fn commit_snapshot(&self, snapshot: &[u8]) -> SnapshotResult<()> {
        let response = self
            .client
            .post(self.url("/import/sqlite"))
            .multipart(Self::snapshot_form(snapshot))
            .send()
            .await?;
        if response.status().is_success() {
            return Ok(());
        }
        let message = Self::rejection_message(response, "Import failed").await;
        Err(SnapshotError::Rejected(message))
    }
}
