//! HTTP client for the remote record store.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{
    DeletePayload, FetchQuery, FetchResponse, MutationResponse, RecordResponse, RecordStore,
    RecordsPayload,
};
use crate::config::Config;
use crate::errors::AppError;

/// Header carrying the project id.
pub const PROJECT_ID_HEADER: &str = "x-project-id";
/// Header carrying the public key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Record store reached over HTTP with JSON envelopes.
#[derive(Clone)]
pub struct HttpRecordStore {
    client: Client,
    base_url: String,
}

impl HttpRecordStore {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let mut headers = HeaderMap::new();
        headers.insert(PROJECT_ID_HEADER, header_value(&config.project_id)?);
        headers.insert(API_KEY_HEADER, header_value(&config.public_key)?);

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| AppError::Config(format!("Cannot build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.store_url.trim_end_matches('/').to_string(),
        })
    }

    fn records_url(&self, table: &str) -> String {
        format!("{}/tables/{}/records", self.base_url, table)
    }
}

fn header_value(value: &str) -> Result<HeaderValue, AppError> {
    HeaderValue::from_str(value)
        .map_err(|_| AppError::Config("Credential contains invalid header characters".to_string()))
}

/// Read a JSON envelope, turning HTTP-level failures into errors.
async fn read_envelope<T: DeserializeOwned>(response: Response) -> Result<T, AppError> {
    let status = response.status();
    let text = response.text().await?;

    if status == StatusCode::NOT_FOUND {
        return Err(AppError::NotFound(remote_message(&text, status)));
    }
    if !status.is_success() {
        return Err(AppError::Remote(remote_message(&text, status)));
    }

    Ok(serde_json::from_str(&text)?)
}

fn remote_message(body: &str, status: StatusCode) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| format!("Record store returned {}", status))
}

#[async_trait]
impl RecordStore for HttpRecordStore {
    async fn fetch_records(
        &self,
        table: &str,
        query: &FetchQuery,
    ) -> Result<FetchResponse, AppError> {
        tracing::debug!(table, conditions = query.conditions.len(), "fetch_records");
        let response = self
            .client
            .post(format!("{}/query", self.records_url(table)))
            .json(query)
            .send()
            .await?;
        read_envelope(response).await
    }

    async fn get_record_by_id(
        &self,
        table: &str,
        id: i64,
        fields: &[&str],
    ) -> Result<RecordResponse, AppError> {
        tracing::debug!(table, id, "get_record_by_id");
        let response = self
            .client
            .get(format!("{}/{}", self.records_url(table), id))
            .query(&[("fields", fields.join(","))])
            .send()
            .await?;
        read_envelope(response).await
    }

    async fn create_records(
        &self,
        table: &str,
        records: Vec<Value>,
    ) -> Result<MutationResponse, AppError> {
        tracing::debug!(table, count = records.len(), "create_records");
        let response = self
            .client
            .post(self.records_url(table))
            .json(&RecordsPayload { records })
            .send()
            .await?;
        read_envelope(response).await
    }

    async fn update_records(
        &self,
        table: &str,
        records: Vec<Value>,
    ) -> Result<MutationResponse, AppError> {
        tracing::debug!(table, count = records.len(), "update_records");
        let response = self
            .client
            .put(self.records_url(table))
            .json(&RecordsPayload { records })
            .send()
            .await?;
        read_envelope(response).await
    }

    async fn delete_records(
        &self,
        table: &str,
        ids: &[i64],
    ) -> Result<MutationResponse, AppError> {
        tracing::debug!(table, ?ids, "delete_records");
        let response = self
            .client
            .delete(self.records_url(table))
            .json(&DeletePayload {
                record_ids: ids.to_vec(),
            })
            .send()
            .await?;
        read_envelope(response).await
    }
}
