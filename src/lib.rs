//! Hospital dashboard scheduling
//!
//! Appointment storage, conflict detection, calendar views and the appointment
//! form, on top of the dashboard's remote record store.

pub mod appointments;
pub mod calendar;
pub mod config;
pub mod errors;
pub mod form;
pub mod models;
pub mod patients;
pub mod store;

#[cfg(test)]
mod test_support;
