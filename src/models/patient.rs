//! Patient summary used to populate the appointment form's patient picker.

use serde::{Deserialize, Serialize};

/// The slice of a patient record the scheduling screens need.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientSummary {
    #[serde(rename = "Id")]
    pub id: i64,
    #[serde(rename = "Name", default)]
    pub name: String,
}
