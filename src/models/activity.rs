//! Activity record model matching the shared activity table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Discriminator of the shared activity table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Admission,
    Discharge,
    Appointment,
    Treatment,
    Prescription,
    #[serde(other)]
    Other,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::Admission => "admission",
            ActivityKind::Discharge => "discharge",
            ActivityKind::Appointment => "appointment",
            ActivityKind::Treatment => "treatment",
            ActivityKind::Prescription => "prescription",
            ActivityKind::Other => "other",
        }
    }
}

/// Reference from an activity to a patient.
///
/// The store returns lookup fields expanded (`{"Id": 4, "Name": "Ada"}`) on
/// reads but accepts a bare id on writes, so both spellings are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PatientRef {
    Id(i64),
    Lookup {
        #[serde(rename = "Id")]
        id: i64,
        #[serde(rename = "Name", default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
}

impl PatientRef {
    pub fn id(&self) -> i64 {
        match self {
            PatientRef::Id(id) => *id,
            PatientRef::Lookup { id, .. } => *id,
        }
    }

    /// Display name, only known when the store expanded the lookup.
    pub fn name(&self) -> Option<&str> {
        match self {
            PatientRef::Id(_) => None,
            PatientRef::Lookup { name, .. } => name.as_deref(),
        }
    }
}

/// A raw row of the activity table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActivityRecord {
    #[serde(rename = "Id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(rename = "patientId", default)]
    pub patient_id: Option<PatientRef>,
}

/// Field projection requested for activity rows.
pub const ACTIVITY_FIELDS: [&str; 6] = [
    "Name",
    "type",
    "description",
    "timestamp",
    "user",
    "patientId",
];

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_patient_ref_accepts_lookup_and_bare_id() {
        let expanded: ActivityRecord = serde_json::from_value(json!({
            "Id": 9,
            "Name": "Checkup",
            "type": "appointment",
            "timestamp": "2026-10-20T09:00:00.000Z",
            "patientId": { "Id": 4, "Name": "Ada Lovelace" }
        }))
        .unwrap();
        let patient = expanded.patient_id.unwrap();
        assert_eq!(patient.id(), 4);
        assert_eq!(patient.name(), Some("Ada Lovelace"));

        let bare: ActivityRecord = serde_json::from_value(json!({
            "Id": 10,
            "Name": "Follow-up",
            "type": "appointment",
            "patientId": 4
        }))
        .unwrap();
        assert_eq!(bare.patient_id, Some(PatientRef::Id(4)));
        assert!(bare.timestamp.is_none());
    }

    #[test]
    fn test_unknown_kind_is_other() {
        let record: ActivityRecord = serde_json::from_value(json!({
            "Id": 1,
            "Name": "Lab result",
            "type": "lab"
        }))
        .unwrap();
        assert_eq!(record.kind, ActivityKind::Other);
    }

    #[test]
    fn test_new_record_omits_id_but_keeps_null_patient() {
        let record = ActivityRecord {
            id: None,
            name: "Consult".to_string(),
            kind: ActivityKind::Appointment,
            description: Some(String::new()),
            timestamp: None,
            user: Some("Dr. Grey".to_string()),
            patient_id: None,
        };
        let value = serde_json::to_value(&record).unwrap();
        assert!(value.get("Id").is_none());
        assert_eq!(value["type"], "appointment");
        assert!(value["patientId"].is_null());
    }
}
