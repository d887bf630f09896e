//! Appointment model: the typed view of an activity row of kind `appointment`.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{ActivityKind, ActivityRecord, PatientRef};
use crate::errors::AppError;

/// Duration used when the caller does not pick one.
pub const DEFAULT_DURATION_MINUTES: i64 = 30;

/// A scheduled appointment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: i64,
    pub title: String,
    pub patient: Option<PatientRef>,
    pub doctor: String,
    pub timestamp: DateTime<Utc>,
    pub notes: String,
}

impl Appointment {
    /// Name of the patient if the store expanded the lookup.
    pub fn patient_name(&self) -> Option<&str> {
        self.patient.as_ref().and_then(PatientRef::name)
    }
}

impl TryFrom<ActivityRecord> for Appointment {
    type Error = AppError;

    fn try_from(record: ActivityRecord) -> Result<Self, Self::Error> {
        if record.kind != ActivityKind::Appointment {
            return Err(AppError::Decode(format!(
                "Activity {:?} is a {} record, not an appointment",
                record.id,
                record.kind.as_str()
            )));
        }
        let id = record
            .id
            .ok_or_else(|| AppError::Decode("Appointment record without Id".to_string()))?;
        let timestamp = record.timestamp.ok_or_else(|| {
            AppError::Decode(format!("Appointment {} has no timestamp", id))
        })?;

        Ok(Appointment {
            id,
            title: record.name,
            patient: record.patient_id,
            doctor: record.user.unwrap_or_default(),
            timestamp,
            notes: record.description.unwrap_or_default(),
        })
    }
}

/// Caller input for creating or replacing an appointment.
#[derive(Debug, Clone, PartialEq)]
pub struct AppointmentDraft {
    pub title: String,
    pub patient_id: Option<i64>,
    pub doctor: String,
    pub timestamp: DateTime<Utc>,
    pub notes: String,
    /// Only used for the conflict window; the store keeps no duration.
    pub duration_minutes: i64,
}

impl AppointmentDraft {
    pub fn new(
        title: impl Into<String>,
        doctor: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            title: title.into(),
            patient_id: None,
            doctor: doctor.into(),
            timestamp,
            notes: String::new(),
            duration_minutes: DEFAULT_DURATION_MINUTES,
        }
    }

    pub fn with_patient(mut self, patient_id: i64) -> Self {
        self.patient_id = Some(patient_id);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// `None` when the minute count is outside what a `Duration` can hold.
    pub fn duration(&self) -> Option<Duration> {
        Duration::try_minutes(self.duration_minutes)
    }

    /// Map onto the activity row shape (`title` to `Name`, `notes` to
    /// `description`, `doctor` to `user`). `id` is set for full-record replaces.
    pub fn to_record(&self, id: Option<i64>) -> ActivityRecord {
        ActivityRecord {
            id,
            name: self.title.clone(),
            kind: ActivityKind::Appointment,
            description: Some(self.notes.clone()),
            timestamp: Some(self.timestamp),
            user: Some(self.doctor.clone()),
            patient_id: self.patient_id.map(PatientRef::Id),
        }
    }
}
