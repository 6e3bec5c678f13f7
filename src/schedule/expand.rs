use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;

use super::dose::parse_dose_table;
use super::rule::RecurrenceRule;
use super::ScheduleError;
use crate::models::{DoseEntry, MedicationRecord};

/// Ranges longer than this (about ten years) are still expanded but logged.
pub const LONG_SPAN_DAYS: i64 = 3660;

/// A medication record with its dates and rule parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct MedicationSchedule {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub rule: RecurrenceRule,
    pub doses: Vec<DoseEntry>,
}

impl MedicationSchedule {
    /// Parse a backend record. Fails only when a date is missing or invalid.
    pub fn from_record(record: &MedicationRecord) -> Result<Self, ScheduleError> {
        let start_date = parse_record_date("start_date", record.start_date.as_deref())?;
        let end_date = parse_record_date("end_date", record.end_date.as_deref())?;

        let rule = RecurrenceRule::from_parts(
            record.frequency.as_deref(),
            record.selected_days.as_ref(),
            record.selected_dates.as_ref(),
            record.count.as_ref(),
        );

        Ok(Self {
            name: record.medication_name.clone(),
            start_date,
            end_date,
            rule,
            doses: parse_dose_table(record.schedule.as_deref()),
        })
    }

    /// Is a dose due on `date`?
    pub fn occurs_on(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date && self.rule.matches(self.start_date, date)
    }

    /// Days covered by the range, inclusive. Zero when inverted.
    pub fn span_days(&self) -> i64 {
        ((self.end_date - self.start_date).num_days() + 1).max(0)
    }

    /// Every due date, ascending. Empty when the range is inverted.
    pub fn occurrences(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start_date
            .iter_days()
            .take_while(move |d| *d <= self.end_date)
            .filter(move |d| self.rule.matches(self.start_date, *d))
    }
}

/// Accepts `YYYY-MM-DD`, an RFC 3339 timestamp, or a naive ISO timestamp.
/// Timestamps keep the calendar date they were written with.
pub fn parse_record_date(
    field: &'static str,
    raw: Option<&str>,
) -> Result<NaiveDate, ScheduleError> {
    let value = raw
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(ScheduleError::MissingDate { field })?;

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|dt| dt.date())
        })
        .ok_or_else(|| ScheduleError::InvalidDate {
            field,
            value: value.to_string(),
        })
}

/// One calendar dot: which medication it stands for and how to draw it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub key: String,
    pub medication_index: usize,
    pub medication_name: String,
    pub color: String,
    pub selected_dot_color: String,
}

/// Markers for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayMarks {
    pub dots: Vec<Marker>,
    pub selected: bool,
}

impl Default for DayMarks {
    fn default() -> Self {
        Self {
            dots: Vec::new(),
            selected: true,
        }
    }
}

/// Due dates for a medication list, keyed by date. Serialises with
/// `YYYY-MM-DD` keys in the shape a multi-dot calendar expects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ExpandedMarks {
    days: BTreeMap<NaiveDate, DayMarks>,
}

impl ExpandedMarks {
    pub fn get(&self, date: NaiveDate) -> Option<&DayMarks> {
        self.days.get(&date)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.days.contains_key(&date)
    }

    /// Marked dates, ascending.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, &DayMarks)> + '_ {
        self.days.iter().map(|(date, marks)| (*date, marks))
    }

    /// Number of marked dates.
    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Total markers across all dates.
    pub fn marker_count(&self) -> usize {
        self.days.values().map(|day| day.dots.len()).sum()
    }

    fn push(&mut self, date: NaiveDate, marker: Marker) {
        self.days.entry(date).or_default().dots.push(marker);
    }
}

/// Marker colours, assigned by medication position in the input list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerStyle {
    pub palette: Vec<String>,
}

const FALLBACK_COLOR: &str = "red";

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            palette: ["red", "blue", "green", "orange", "purple", "teal"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl MarkerStyle {
    pub fn color_for(&self, index: usize) -> &str {
        if self.palette.is_empty() {
            return FALLBACK_COLOR;
        }
        &self.palette[index % self.palette.len()]
    }
}

/// Expand every medication into calendar markers with the default colours.
pub fn expand(records: &[MedicationRecord]) -> ExpandedMarks {
    expand_with(records, &MarkerStyle::default())
}

/// Expand every medication into calendar markers.
///
/// Records whose dates cannot be parsed are logged and skipped; the rest of
/// the batch is unaffected. Markers accumulate per date, one per due
/// medication, in input order.
pub fn expand_with(records: &[MedicationRecord], style: &MarkerStyle) -> ExpandedMarks {
    let mut marks = ExpandedMarks::default();

    for (index, record) in records.iter().enumerate() {
        let schedule = match MedicationSchedule::from_record(record) {
            Ok(schedule) => schedule,
            Err(e) => {
                tracing::warn!(
                    index,
                    medication = %record.medication_name,
                    "Skipping medication: {e}"
                );
                continue;
            }
        };

        let span = schedule.span_days();
        if span > LONG_SPAN_DAYS {
            tracing::warn!(index, span, "Medication range is unusually long");
        }

        let color = style.color_for(index);
        let marker = Marker {
            key: format!("{index}-{}", schedule.name),
            medication_index: index,
            medication_name: schedule.name.clone(),
            color: color.to_string(),
            selected_dot_color: color.to_string(),
        };

        let mut contributed = 0usize;
        for date in schedule.occurrences() {
            marks.push(date, marker.clone());
            contributed += 1;
        }
        tracing::debug!(index, contributed, "Expanded medication");
    }

    marks
}

/// Medications due on `date`, in input order.
///
/// Applies the same parsing and rule test as [`expand`], so a date is marked
/// by `expand` exactly when this returns a non-empty list.
pub fn medications_on(date: NaiveDate, records: &[MedicationRecord]) -> Vec<&MedicationRecord> {
    records
        .iter()
        .filter(|record| {
            MedicationSchedule::from_record(record)
                .map(|schedule| schedule.occurs_on(date))
                .unwrap_or(false)
        })
        .collect()
}
