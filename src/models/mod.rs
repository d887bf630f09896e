//! Data models for the hospital scheduling library.
//!
//! Record shapes follow the field spellings of the remote record store so they
//! serialize straight into its request and response envelopes.

mod activity;
mod appointment;
mod patient;

pub use activity::*;
pub use appointment::*;
pub use patient::*;
