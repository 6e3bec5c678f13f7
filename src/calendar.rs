//! Medication calendar: the fetched medication list together with its
//! expanded marks, rebuilt on every load.

use chrono::NaiveDate;

use crate::backend::{BackendError, MedicationBackend};
use crate::models::MedicationRecord;
use crate::schedule::{expand_with, medications_on, ExpandedMarks, MarkerStyle};
use crate::session::Session;

#[derive(Debug, Clone, Default)]
pub struct MedicationCalendar {
    medications: Vec<MedicationRecord>,
    marks: ExpandedMarks,
}

impl MedicationCalendar {
    pub fn from_records(medications: Vec<MedicationRecord>) -> Self {
        Self::from_records_with(medications, &MarkerStyle::default())
    }

    pub fn from_records_with(medications: Vec<MedicationRecord>, style: &MarkerStyle) -> Self {
        let marks = expand_with(&medications, style);
        Self { medications, marks }
    }

    /// Fetch the session's medications and expand them.
    pub fn load(backend: &dyn MedicationBackend, session: &Session) -> Result<Self, BackendError> {
        let medications = backend.fetch_medications(session)?;
        let calendar = Self::from_records(medications);
        tracing::info!(
            medications = calendar.medications.len(),
            marked_days = calendar.marks.len(),
            "Medication calendar loaded"
        );
        Ok(calendar)
    }

    pub fn medications(&self) -> &[MedicationRecord] {
        &self.medications
    }

    pub fn marks(&self) -> &ExpandedMarks {
        &self.marks
    }

    /// Dates with at least one medication due, ascending.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.marks.dates().collect()
    }

    /// Medications due on a tapped date.
    pub fn due_on(&self, date: NaiveDate) -> Vec<&MedicationRecord> {
        medications_on(date, &self.medications)
    }
}
