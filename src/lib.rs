pub mod backend;
pub mod calendar;
pub mod config;
pub mod form;
pub mod models;
pub mod schedule;
pub mod session;

pub use calendar::MedicationCalendar;
pub use schedule::{expand, medications_on, ExpandedMarks, MedicationSchedule, RecurrenceRule};

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber. Safe to call more than once;
/// later calls are ignored.
pub fn init_tracing() {
    let initialised = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init()
        .is_ok();

    if initialised {
        tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
    }
}
