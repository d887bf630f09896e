//! Hospital agenda
//!
//! Prints the day's appointments from the record store. Takes an optional
//! `YYYY-MM-DD` argument, defaulting to today in the configured timezone.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use hospital_scheduling::appointments::AppointmentStore;
use hospital_scheduling::calendar::{local_day, CalendarView, ViewMode};
use hospital_scheduling::config::Config;
use hospital_scheduling::store::{HttpRecordStore, RecordStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let json_layer = config
        .log_json
        .then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr));
    let text_layer = (!config.log_json)
        .then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();

    tracing::info!("Record store: {}", config.store_url);
    tracing::info!("Activity table: {}", config.activity_table);
    tracing::info!("Timezone: {}", config.timezone);

    let store: Arc<dyn RecordStore> = Arc::new(HttpRecordStore::new(&config)?);
    let appointments = AppointmentStore::new(store, &config);

    let today = local_day(Utc::now(), &config.timezone);
    let date = match std::env::args().nth(1) {
        Some(arg) => NaiveDate::parse_from_str(&arg, "%Y-%m-%d")?,
        None => today,
    };

    let mut view = CalendarView::new(date, config.week_start, config.timezone);
    view.set_mode(ViewMode::Day);

    let listed = appointments.list_by_day(date).await;
    let agenda = view.day_agenda(&listed, today);

    println!("{}", view.title());
    if agenda.appointments.is_empty() {
        println!("No appointments scheduled for this day");
    }
    for appointment in &agenda.appointments {
        let time = appointment.timestamp.with_timezone(&config.timezone);
        let mut line = format!("{}  {}", time.format("%H:%M"), appointment.title);
        if let Some(patient) = appointment.patient_name() {
            line.push_str(&format!("  patient: {}", patient));
        }
        if !appointment.doctor.is_empty() {
            line.push_str(&format!("  doctor: {}", appointment.doctor));
        }
        println!("{}", line);
        if !appointment.notes.is_empty() {
            println!("       {}", appointment.notes);
        }
    }

    Ok(())
}
