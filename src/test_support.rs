//! In-process record store used by unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::store::{
    FetchQuery, FetchResponse, MutationResponse, RecordResponse, RecordResult, RecordStore,
};

/// Tables of JSON rows with store-assigned ids.
#[derive(Default)]
pub struct MemoryRecordStore {
    tables: Mutex<HashMap<String, Vec<Value>>>,
    next_id: AtomicUsize,
    calls: AtomicUsize,
    failing: Mutex<Option<String>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self {
            next_id: AtomicUsize::new(1),
            ..Self::default()
        }
    }

    /// Insert a row as-is and return its id.
    pub fn seed(&self, table: &str, mut row: Value) -> i64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) as i64;
        row["Id"] = json!(id);
        self.tables
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .push(row);
        id
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    /// Every later call answers `success: false` with `message`.
    pub fn fail_with(&self, message: &str) {
        *self.failing.lock().unwrap() = Some(message.to_string());
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn begin(&self) -> Option<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.failing.lock().unwrap().clone()
    }
}

fn failed_mutation(message: String) -> MutationResponse {
    MutationResponse {
        success: false,
        results: None,
        message: Some(message),
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn fetch_records(
        &self,
        table: &str,
        query: &FetchQuery,
    ) -> Result<FetchResponse, AppError> {
        if let Some(message) = self.begin() {
            return Ok(FetchResponse {
                success: false,
                data: None,
                message: Some(message),
            });
        }
        Ok(FetchResponse {
            success: true,
            data: Some(query.evaluate(&self.rows(table))),
            message: None,
        })
    }

    async fn get_record_by_id(
        &self,
        table: &str,
        id: i64,
        _fields: &[&str],
    ) -> Result<RecordResponse, AppError> {
        if let Some(message) = self.begin() {
            return Ok(RecordResponse {
                success: false,
                data: None,
                message: Some(message),
            });
        }
        let row = self
            .rows(table)
            .into_iter()
            .find(|row| row["Id"] == json!(id));
        Ok(RecordResponse {
            success: true,
            data: row,
            message: None,
        })
    }

    async fn create_records(
        &self,
        table: &str,
        records: Vec<Value>,
    ) -> Result<MutationResponse, AppError> {
        if let Some(message) = self.begin() {
            return Ok(failed_mutation(message));
        }
        let results = records
            .into_iter()
            .map(|record| {
                let id = self.seed(table, record);
                RecordResult {
                    success: true,
                    data: self.rows(table).into_iter().find(|row| row["Id"] == json!(id)),
                    message: None,
                }
            })
            .collect();
        Ok(MutationResponse {
            success: true,
            results: Some(results),
            message: None,
        })
    }

    async fn update_records(
        &self,
        table: &str,
        records: Vec<Value>,
    ) -> Result<MutationResponse, AppError> {
        if let Some(message) = self.begin() {
            return Ok(failed_mutation(message));
        }
        let mut tables = self.tables.lock().unwrap();
        let rows = tables.entry(table.to_string()).or_default();
        let results = records
            .into_iter()
            .map(|record| match rows.iter_mut().find(|row| row["Id"] == record["Id"]) {
                Some(row) => {
                    *row = record.clone();
                    RecordResult {
                        success: true,
                        data: Some(record),
                        message: None,
                    }
                }
                None => RecordResult {
                    success: false,
                    data: None,
                    message: Some("Record does not exist".to_string()),
                },
            })
            .collect();
        Ok(MutationResponse {
            success: true,
            results: Some(results),
            message: None,
        })
    }

    async fn delete_records(
        &self,
        table: &str,
        ids: &[i64],
    ) -> Result<MutationResponse, AppError> {
        if let Some(message) = self.begin() {
            return Ok(failed_mutation(message));
        }
        let mut tables = self.tables.lock().unwrap();
        let rows = tables.entry(table.to_string()).or_default();
        let results = ids
            .iter()
            .map(|id| {
                let before = rows.len();
                rows.retain(|row| row["Id"] != json!(id));
                RecordResult {
                    success: rows.len() < before,
                    data: None,
                    message: (rows.len() == before).then(|| "Record does not exist".to_string()),
                }
            })
            .collect();
        Ok(MutationResponse {
            success: true,
            results: Some(results),
            message: None,
        })
    }
}
