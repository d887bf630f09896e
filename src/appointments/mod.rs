//! Appointment access on top of the shared activity table.
//!
//! Appointments are activity rows whose `type` is `appointment`. Every call
//! goes to the record store; nothing is cached. Remote failures are logged and
//! turned into empty or absent results so screens can always render.

mod conflict;

pub use conflict::*;

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use chrono_tz::Tz;
use serde_json::Value;

use crate::calendar::{day_bounds, local_day};
use crate::config::Config;
use crate::errors::AppError;
use crate::models::{
    ActivityKind, ActivityRecord, Appointment, AppointmentDraft, ACTIVITY_FIELDS,
};
use crate::store::{Condition, FetchQuery, MutationResponse, Operator, RecordStore, SortDirection};

/// Appointment accessor for one activity table.
#[derive(Clone)]
pub struct AppointmentStore {
    store: Arc<dyn RecordStore>,
    table: String,
    timezone: Tz,
}

impl AppointmentStore {
    pub fn new(store: Arc<dyn RecordStore>, config: &Config) -> Self {
        Self::with_table(store, config.activity_table.clone(), config.timezone)
    }

    pub fn with_table(store: Arc<dyn RecordStore>, table: impl Into<String>, timezone: Tz) -> Self {
        Self {
            store,
            table: table.into(),
            timezone,
        }
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// List appointments ordered by start time, optionally bounded
    /// (inclusive) on either side. Returns an empty list on any failure.
    pub async fn list_all(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Vec<Appointment> {
        match self.try_list(start, end).await {
            Ok(appointments) => appointments,
            Err(e) => {
                tracing::error!("Error fetching appointments: {}", e);
                Vec::new()
            }
        }
    }

    async fn try_list(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Vec<Appointment>, AppError> {
        let mut query = FetchQuery::new()
            .fields(&ACTIVITY_FIELDS)
            .filter(Condition::equal_to("type", ActivityKind::Appointment.as_str()))
            .order_by("timestamp", SortDirection::Ascending);
        if let Some(start) = start {
            query = query.filter(Condition::new(
                "timestamp",
                Operator::GreaterThanOrEqualTo,
                iso(start),
            ));
        }
        if let Some(end) = end {
            query = query.filter(Condition::new(
                "timestamp",
                Operator::LessThanOrEqualTo,
                iso(end),
            ));
        }

        let response = self.store.fetch_records(&self.table, &query).await?;
        if !response.success {
            return Err(AppError::Remote(
                response.message.unwrap_or_else(|| "fetch failed".to_string()),
            ));
        }

        Ok(response
            .data
            .unwrap_or_default()
            .into_iter()
            .filter_map(|row| match decode(row) {
                Ok(appointment) => Some(appointment),
                Err(e) => {
                    tracing::warn!("Skipping unreadable appointment row: {}", e);
                    None
                }
            })
            .collect())
    }

    /// Appointments starting on `date` in the configured timezone.
    pub async fn list_by_day(&self, date: NaiveDate) -> Vec<Appointment> {
        let (start, end) = day_bounds(date, &self.timezone);
        self.list_all(Some(start), Some(end)).await
    }

    /// Fetch one appointment; `None` when missing, not an appointment, or on failure.
    pub async fn get_by_id(&self, id: i64) -> Option<Appointment> {
        let response = match self
            .store
            .get_record_by_id(&self.table, id, &ACTIVITY_FIELDS)
            .await
        {
            Ok(response) => response,
            Err(AppError::NotFound(_)) => return None,
            Err(e) => {
                tracing::error!("Error fetching appointment with ID {}: {}", id, e);
                return None;
            }
        };

        if !response.success {
            tracing::error!(
                "Error fetching appointment with ID {}: {}",
                id,
                response.message.as_deref().unwrap_or("unknown error")
            );
            return None;
        }
        match decode(response.data?) {
            Ok(appointment) => Some(appointment),
            Err(e) => {
                tracing::warn!("Record {} is not a readable appointment: {}", id, e);
                None
            }
        }
    }

    /// Create an appointment; `None` if the store rejects it.
    pub async fn create(&self, draft: &AppointmentDraft) -> Option<Appointment> {
        let record = match encode(draft.to_record(None)) {
            Ok(record) => record,
            Err(e) => {
                tracing::error!("Error creating appointment: {}", e);
                return None;
            }
        };
        let response = self.store.create_records(&self.table, vec![record]).await;
        written(response, "create")
    }

    /// Replace appointment `id` with `draft`; `None` if the store rejects it.
    pub async fn update(&self, id: i64, draft: &AppointmentDraft) -> Option<Appointment> {
        let record = match encode(draft.to_record(Some(id))) {
            Ok(record) => record,
            Err(e) => {
                tracing::error!("Error updating appointment: {}", e);
                return None;
            }
        };
        let response = self.store.update_records(&self.table, vec![record]).await;
        written(response, "update")
    }

    /// Delete appointment `id`; `true` only if the store confirms it.
    pub async fn delete(&self, id: i64) -> bool {
        let response = match self.store.delete_records(&self.table, &[id]).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Error deleting appointment: {}", e);
                return false;
            }
        };
        if !response.success {
            tracing::error!(
                "Failed to delete appointment {}: {}",
                id,
                response.message.as_deref().unwrap_or("unknown error")
            );
            return false;
        }

        let (succeeded, failed) = response.partition();
        if !failed.is_empty() {
            tracing::error!(
                "Failed to delete appointment {} records: {:?}",
                failed.len(),
                failed
            );
            return false;
        }
        !succeeded.is_empty()
    }

    /// Whether `[timestamp, timestamp + duration_minutes)` overlaps an
    /// appointment on the same calendar day, ignoring `exclude_id`.
    ///
    /// Advisory only: nothing stops another client from booking the slot
    /// between this check and the write that follows it.
    pub async fn has_conflict(
        &self,
        timestamp: DateTime<Utc>,
        duration_minutes: i64,
        exclude_id: Option<i64>,
    ) -> bool {
        let candidate = ConflictWindow::from_minutes(timestamp, duration_minutes);
        let booked = self
            .list_by_day(local_day(timestamp, &self.timezone))
            .await;
        let conflicts = find_conflicts(&candidate, &booked, exclude_id);
        if let Some(first) = conflicts.first() {
            tracing::debug!(
                "Slot {} conflicts with appointment {} ({} total)",
                timestamp,
                first.id,
                conflicts.len()
            );
        }
        !conflicts.is_empty()
    }
}

/// Timestamp in the store's filter format, e.g. `2026-10-19T22:00:00.000Z`.
fn iso(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn decode(row: Value) -> Result<Appointment, AppError> {
    let record: ActivityRecord = serde_json::from_value(row)?;
    Appointment::try_from(record)
}

fn encode(record: ActivityRecord) -> Result<Value, AppError> {
    Ok(serde_json::to_value(record)?)
}

/// Pull the written appointment out of a create or update reply.
fn written(response: Result<MutationResponse, AppError>, action: &str) -> Option<Appointment> {
    let response = match response {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("Error on appointment {}: {}", action, e);
            return None;
        }
    };
    if !response.success {
        tracing::error!(
            "Appointment {} rejected: {}",
            action,
            response.message.as_deref().unwrap_or("unknown error")
        );
        return None;
    }

    let (succeeded, failed) = response.partition();
    if !failed.is_empty() {
        tracing::error!(
            "Failed to {} appointment {} records: {:?}",
            action,
            failed.len(),
            failed
        );
        return None;
    }

    let row = succeeded.first()?.data.clone()?;
    match decode(row) {
        Ok(appointment) => Some(appointment),
        Err(e) => {
            tracing::error!("Store returned an unreadable appointment after {}: {}", action, e);
            None
        }
    }
}
