//! Appointment form controller.
//!
//! Backs the schedule/edit modal: holds the entered values, validates them,
//! checks the slot for conflicts and writes through the appointment store.
//! `submit` borrows the controller mutably for the whole round trip, so a
//! second submission cannot start while one is pending.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};

use crate::appointments::AppointmentStore;
use crate::calendar::local_to_utc;
use crate::errors::{FieldErrors, FormError, FormField};
use crate::models::{
    Appointment, AppointmentDraft, PatientSummary, DEFAULT_DURATION_MINUTES,
};
use crate::patients::PatientDirectory;

/// Time a new appointment defaults to when opened from a calendar day.
pub fn default_start() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN)
}

/// Whether the form creates a new appointment or edits an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit { id: i64 },
}

/// Values currently entered in the form.
#[derive(Debug, Clone, PartialEq)]
pub struct AppointmentForm {
    pub title: String,
    pub patient_id: Option<i64>,
    pub doctor: String,
    /// Wall-clock time in the clinic's timezone, minute precision.
    pub date_time: Option<NaiveDateTime>,
    pub duration_minutes: i64,
    pub notes: String,
}

impl Default for AppointmentForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            patient_id: None,
            doctor: String::new(),
            date_time: None,
            duration_minutes: DEFAULT_DURATION_MINUTES,
            notes: String::new(),
        }
    }
}

/// A write the store accepted.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Created(Appointment),
    Updated(Appointment),
}

impl SubmitOutcome {
    pub fn appointment(&self) -> &Appointment {
        match self {
            SubmitOutcome::Created(a) | SubmitOutcome::Updated(a) => a,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            SubmitOutcome::Created(_) => "Appointment scheduled successfully",
            SubmitOutcome::Updated(_) => "Appointment updated successfully",
        }
    }
}

pub struct AppointmentFormController {
    appointments: Arc<AppointmentStore>,
    mode: FormMode,
    form: AppointmentForm,
    errors: FieldErrors,
    patients: Vec<PatientSummary>,
}

impl AppointmentFormController {
    /// Open the form for a new appointment. A selected calendar day pre-fills
    /// the date at 09:00.
    pub fn create(appointments: Arc<AppointmentStore>, selected_date: Option<NaiveDate>) -> Self {
        let form = AppointmentForm {
            date_time: selected_date.map(|date| date.and_time(default_start())),
            ..AppointmentForm::default()
        };
        Self {
            appointments,
            mode: FormMode::Create,
            form,
            errors: FieldErrors::new(),
            patients: Vec::new(),
        }
    }

    /// Open the form pre-filled from an existing appointment.
    pub fn edit(appointments: Arc<AppointmentStore>, appointment: &Appointment) -> Self {
        let local = appointment
            .timestamp
            .with_timezone(&appointments.timezone())
            .naive_local();
        let form = AppointmentForm {
            title: appointment.title.clone(),
            patient_id: appointment.patient.as_ref().map(|p| p.id()),
            doctor: appointment.doctor.clone(),
            date_time: Some(truncate_to_minute(local)),
            duration_minutes: DEFAULT_DURATION_MINUTES,
            notes: appointment.notes.clone(),
        };
        Self {
            appointments,
            mode: FormMode::Edit { id: appointment.id },
            form,
            errors: FieldErrors::new(),
            patients: Vec::new(),
        }
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn form(&self) -> &AppointmentForm {
        &self.form
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn patients(&self) -> &[PatientSummary] {
        &self.patients
    }

    pub fn heading(&self) -> &'static str {
        match self.mode {
            FormMode::Create => "Schedule Appointment",
            FormMode::Edit { .. } => "Edit Appointment",
        }
    }

    /// Populate the patient picker.
    pub async fn load_patients(&mut self, directory: &dyn PatientDirectory) {
        self.patients = directory.list_all().await;
        if self.patients.is_empty() {
            tracing::warn!("No patients available for the appointment form");
        }
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.form.title = title.into();
        self.errors.remove(&FormField::Title);
    }

    pub fn set_patient(&mut self, patient_id: Option<i64>) {
        self.form.patient_id = patient_id;
        self.errors.remove(&FormField::Patient);
    }

    pub fn set_doctor(&mut self, doctor: impl Into<String>) {
        self.form.doctor = doctor.into();
        self.errors.remove(&FormField::Doctor);
    }

    pub fn set_date_time(&mut self, date_time: Option<NaiveDateTime>) {
        self.form.date_time = date_time.map(truncate_to_minute);
        self.errors.remove(&FormField::DateTime);
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.form.notes = notes.into();
    }

    /// Check every field, replacing the stored errors. Returns `true` when clean.
    pub fn validate(&mut self, now: DateTime<Utc>) -> bool {
        let mut errors = FieldErrors::new();

        if self.form.title.trim().is_empty() {
            errors.insert(FormField::Title, "Appointment title is required".to_string());
        }

        let known_patient = self
            .form
            .patient_id
            .is_some_and(|id| self.patients.iter().any(|p| p.id == id));
        if !known_patient {
            errors.insert(FormField::Patient, "Please select a patient".to_string());
        }

        if self.form.doctor.trim().is_empty() {
            errors.insert(FormField::Doctor, "Doctor name is required".to_string());
        }

        match self.form.date_time {
            None => {
                errors.insert(FormField::DateTime, "Date and time are required".to_string());
            }
            Some(local) if self.to_instant(local) < now => {
                errors.insert(
                    FormField::DateTime,
                    "Appointment cannot be scheduled in the past".to_string(),
                );
            }
            Some(_) => {}
        }

        self.errors = errors;
        self.errors.is_empty()
    }

    /// Validate, check for conflicts, then create or update.
    ///
    /// On success the form is reset. On any error the entered values stay.
    pub async fn submit(&mut self, now: DateTime<Utc>) -> Result<SubmitOutcome, FormError> {
        if !self.validate(now) {
            tracing::debug!("Appointment form rejected: {:?}", self.errors);
            return Err(FormError::Validation(self.errors.clone()));
        }
        let Some(local) = self.form.date_time else {
            return Err(FormError::Validation(self.errors.clone()));
        };
        let timestamp = self.to_instant(local);

        let exclude_id = match self.mode {
            FormMode::Create => None,
            FormMode::Edit { id } => Some(id),
        };
        if self
            .appointments
            .has_conflict(timestamp, self.form.duration_minutes, exclude_id)
            .await
        {
            tracing::warn!("Appointment slot {} conflicts with a booking", timestamp);
            return Err(FormError::Conflict);
        }

        let draft = AppointmentDraft {
            title: self.form.title.trim().to_string(),
            patient_id: self.form.patient_id,
            doctor: self.form.doctor.trim().to_string(),
            timestamp,
            notes: self.form.notes.clone(),
            duration_minutes: self.form.duration_minutes,
        };

        let outcome = match self.mode {
            FormMode::Create => self
                .appointments
                .create(&draft)
                .await
                .map(SubmitOutcome::Created)
                .ok_or_else(|| FormError::Store("Failed to schedule appointment".to_string())),
            FormMode::Edit { id } => self
                .appointments
                .update(id, &draft)
                .await
                .map(SubmitOutcome::Updated)
                .ok_or_else(|| FormError::Store("Failed to update appointment".to_string())),
        }?;

        tracing::info!("{} (id {})", outcome.message(), outcome.appointment().id);
        self.reset();
        Ok(outcome)
    }

    /// Clear every field and error, as on cancel or after a successful save.
    pub fn reset(&mut self) {
        self.form = AppointmentForm::default();
        self.errors.clear();
    }

    fn to_instant(&self, local: NaiveDateTime) -> DateTime<Utc> {
        local_to_utc(local, &self.appointments.timezone())
    }
}

fn truncate_to_minute(value: NaiveDateTime) -> NaiveDateTime {
    value
        .with_second(0)
        .and_then(|v| v.with_nanosecond(0))
        .unwrap_or(value)
}
