//! Patient directory feeding the appointment form's patient picker.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::Config;
use crate::errors::AppError;
use crate::models::PatientSummary;
use crate::store::{FetchQuery, RecordStore, SortDirection};

/// Source of the patients an appointment can be booked for.
#[async_trait]
pub trait PatientDirectory: Send + Sync {
    /// All patients, or an empty list if they cannot be loaded.
    async fn list_all(&self) -> Vec<PatientSummary>;
}

/// Patient directory backed by the record store's patient table.
pub struct RecordPatientDirectory {
    store: Arc<dyn RecordStore>,
    table: String,
}

impl RecordPatientDirectory {
    pub fn new(store: Arc<dyn RecordStore>, config: &Config) -> Self {
        Self::with_table(store, config.patient_table.clone())
    }

    pub fn with_table(store: Arc<dyn RecordStore>, table: impl Into<String>) -> Self {
        Self {
            store,
            table: table.into(),
        }
    }

    async fn try_list(&self) -> Result<Vec<PatientSummary>, AppError> {
        let query = FetchQuery::new()
            .fields(&["Name"])
            .order_by("Name", SortDirection::Ascending);
        let response = self.store.fetch_records(&self.table, &query).await?;
        if !response.success {
            return Err(AppError::Remote(
                response.message.unwrap_or_else(|| "fetch failed".to_string()),
            ));
        }
        response
            .data
            .unwrap_or_default()
            .into_iter()
            .map(|row| serde_json::from_value(row).map_err(AppError::from))
            .collect()
    }
}

#[async_trait]
impl PatientDirectory for RecordPatientDirectory {
    async fn list_all(&self) -> Vec<PatientSummary> {
        match self.try_list().await {
            Ok(patients) => patients,
            Err(e) => {
                tracing::error!("Failed to load patients: {}", e);
                Vec::new()
            }
        }
    }
}
