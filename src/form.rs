//! Medication entry form.
//!
//! Holds the typed values the user picks (name, rule, dose table, date range)
//! and encodes them into the string fields the backend stores.

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

use crate::models::{DoseEntry, NewMedication};
use crate::schedule::{is_valid_dosage, normalize_dose_time, RecurrenceRule};
use crate::session::Session;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("Medication name is required")]
    EmptyName,

    #[error("At least one dose is required")]
    NoDoses,

    #[error("Invalid dose time: {0}")]
    InvalidDoseTime(String),

    #[error("Invalid dosage: {0}")]
    InvalidDosage(String),

    #[error("Select at least one day for \"{0}\"")]
    EmptySelection(&'static str),

    #[error("End date {end} is before start date {start}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },

    #[error("Cannot encode dose table: {0}")]
    Encoding(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MedicationForm {
    pub name: String,
    pub rule: RecurrenceRule,
    pub doses: Vec<DoseEntry>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl MedicationForm {
    /// A daily form with the standard three-dose table.
    pub fn new(name: impl Into<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            rule: RecurrenceRule::Daily,
            doses: Self::default_doses(),
            start_date,
            end_date,
        }
    }

    /// 07:00, 13:00 and 19:00, one unit each.
    pub fn default_doses() -> Vec<DoseEntry> {
        ["07:00", "13:00", "19:00"]
            .into_iter()
            .map(|time| DoseEntry {
                time: time.to_string(),
                dosage: "1.0".to_string(),
            })
            .collect()
    }

    pub fn validate(&self) -> Result<(), FormError> {
        if self.name.trim().is_empty() {
            return Err(FormError::EmptyName);
        }
        if self.doses.is_empty() {
            return Err(FormError::NoDoses);
        }
        for dose in &self.doses {
            if normalize_dose_time(&dose.time).is_none() {
                return Err(FormError::InvalidDoseTime(dose.time.clone()));
            }
            if !is_valid_dosage(&dose.dosage) {
                return Err(FormError::InvalidDosage(dose.dosage.clone()));
            }
        }
        match &self.rule {
            RecurrenceRule::DaysOfWeek(days) if days.is_empty() => {
                return Err(FormError::EmptySelection(self.rule.label().as_str()));
            }
            RecurrenceRule::DaysOfMonth(days) if days.is_empty() => {
                return Err(FormError::EmptySelection(self.rule.label().as_str()));
            }
            _ => {}
        }
        if self.end_date < self.start_date {
            return Err(FormError::InvertedRange {
                start: self.start_date,
                end: self.end_date,
            });
        }
        Ok(())
    }

    /// Validate and encode the form as a `POST /medications_wrt_userId` body.
    pub fn into_request(
        self,
        session: &Session,
        created_at: DateTime<Utc>,
    ) -> Result<NewMedication, FormError> {
        self.validate()?;

        let doses: Vec<DoseEntry> = self
            .doses
            .into_iter()
            .map(|dose| DoseEntry {
                time: normalize_dose_time(&dose.time).unwrap_or(dose.time),
                dosage: dose.dosage.trim().to_string(),
            })
            .collect();
        let schedule =
            serde_json::to_string(&doses).map_err(|e| FormError::Encoding(e.to_string()))?;

        let (count, selected_days, selected_dates) = match &self.rule {
            RecurrenceRule::Daily => (None, None, None),
            RecurrenceRule::EveryNDays(n) => (Some(n.to_string()), None, None),
            RecurrenceRule::DaysOfWeek(days) => {
                let joined = days
                    .iter()
                    .map(|d| d.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                (None, Some(joined), None)
            }
            RecurrenceRule::DaysOfMonth(days) => {
                let joined = days
                    .iter()
                    .map(|d| d.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                (None, None, Some(joined))
            }
        };

        Ok(NewMedication {
            user_id: session.user_id.clone(),
            image_urls: Vec::new(),
            medication_name: self.name.trim().to_string(),
            frequency: self.rule.label().as_str().to_string(),
            date_time: created_at.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            schedule,
            start_date: self.start_date.format("%Y-%m-%d").to_string(),
            end_date: self.end_date.format("%Y-%m-%d").to_string(),
            count,
            selected_days,
            selected_dates,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MedicationRecord;
    use crate::schedule::{MedicationSchedule, MonthDaySet, WeekdaySet};
    use chrono::{TimeZone, Weekday};
    use std::num::NonZeroU32;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn created() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 9, 30, 0).unwrap()
    }

    fn form() -> MedicationForm {
        MedicationForm::new("Ibuprofen", date("2024-01-01"), date("2024-01-31"))
    }

    #[test]
    fn default_form_is_valid() {
        assert_eq!(form().validate(), Ok(()));
        assert_eq!(form().doses.len(), 3);
    }

    #[test]
    fn rejects_blank_name() {
        let f = MedicationForm {
            name: "  ".into(),
            ..form()
        };
        assert_eq!(f.validate(), Err(FormError::EmptyName));
    }

    #[test]
    fn rejects_empty_dose_table() {
        let f = MedicationForm {
            doses: vec![],
            ..form()
        };
        assert_eq!(f.validate(), Err(FormError::NoDoses));
    }

    #[test]
    fn rejects_bad_dose_values() {
        let f = MedicationForm {
            doses: vec![DoseEntry { time: "7:99".into(), dosage: "1.0".into() }],
            ..form()
        };
        assert_eq!(f.validate(), Err(FormError::InvalidDoseTime("7:99".into())));

        let f = MedicationForm {
            doses: vec![DoseEntry { time: "07:00".into(), dosage: "lots".into() }],
            ..form()
        };
        assert_eq!(f.validate(), Err(FormError::InvalidDosage("lots".into())));
    }

    #[test]
    fn rejects_empty_day_selection() {
        let f = MedicationForm {
            rule: RecurrenceRule::DaysOfWeek(WeekdaySet::default()),
            ..form()
        };
        assert_eq!(f.validate(), Err(FormError::EmptySelection("Day of the week")));

        let f = MedicationForm {
            rule: RecurrenceRule::DaysOfMonth(MonthDaySet::default()),
            ..form()
        };
        assert_eq!(f.validate(), Err(FormError::EmptySelection("Day of the month")));
    }

    #[test]
    fn rejects_inverted_range() {
        let f = MedicationForm {
            end_date: date("2023-12-31"),
            ..form()
        };
        assert!(matches!(f.validate(), Err(FormError::InvertedRange { .. })));
    }

    #[test]
    fn encodes_daily_request() {
        let session = Session::new("u-9");
        let req = form().into_request(&session, created()).unwrap();
        assert_eq!(req.user_id, "u-9");
        assert_eq!(req.frequency, "Every day");
        assert_eq!(req.start_date, "2024-01-01");
        assert_eq!(req.end_date, "2024-01-31");
        assert_eq!(req.date_time, "2024-01-01T09:30:00.000Z");
        assert!(req.image_urls.is_empty());
        assert_eq!(req.count, None);
        assert_eq!(req.selected_days, None);
        assert_eq!(req.selected_dates, None);

        let doses: Vec<DoseEntry> = serde_json::from_str(&req.schedule).unwrap();
        assert_eq!(doses, MedicationForm::default_doses());
    }

    #[test]
    fn encodes_weekday_selection_in_week_order() {
        let days: WeekdaySet = [Weekday::Fri, Weekday::Mon, Weekday::Wed].into_iter().collect();
        let f = MedicationForm {
            rule: RecurrenceRule::DaysOfWeek(days),
            ..form()
        };
        let req = f.into_request(&Session::new("u"), created()).unwrap();
        assert_eq!(req.frequency, "Day of the week");
        assert_eq!(req.selected_days.as_deref(), Some("Mon, Wed, Fri"));
        assert_eq!(req.selected_dates, None);
    }

    #[test]
    fn encodes_month_days_and_interval() {
        let f = MedicationForm {
            rule: RecurrenceRule::DaysOfMonth([15, 1].into_iter().collect()),
            ..form()
        };
        let req = f.into_request(&Session::new("u"), created()).unwrap();
        assert_eq!(req.selected_dates.as_deref(), Some("1, 15"));

        let f = MedicationForm {
            rule: RecurrenceRule::EveryNDays(NonZeroU32::new(3).unwrap()),
            ..form()
        };
        let req = f.into_request(&Session::new("u"), created()).unwrap();
        assert_eq!(req.frequency, "Every x days");
        assert_eq!(req.count.as_deref(), Some("3"));
    }

    #[test]
    fn interval_reads_back_unchanged() {
        for n in [1, 2, 14] {
            let f = MedicationForm {
                rule: RecurrenceRule::EveryNDays(NonZeroU32::new(n).unwrap()),
                ..form()
            };
            let req = f.clone().into_request(&Session::new("u"), created()).unwrap();
            assert_eq!(req.count, Some(n.to_string()));

            let record: MedicationRecord =
                serde_json::from_value(serde_json::to_value(&req).unwrap()).unwrap();
            let schedule = MedicationSchedule::from_record(&record).unwrap();
            assert_eq!(schedule.rule, f.rule, "interval {n}");
        }
    }

    #[test]
    fn pads_dose_times_on_encode() {
        let f = MedicationForm {
            doses: vec![DoseEntry { time: "7:00".into(), dosage: " 0.5 ".into() }],
            ..form()
        };
        let req = f.into_request(&Session::new("u"), created()).unwrap();
        assert_eq!(req.schedule, r#"[{"time":"07:00","dosage":"0.5"}]"#);
    }

    #[test]
    fn encoded_request_reads_back_as_same_rule() {
        let days: WeekdaySet = [Weekday::Tue, Weekday::Sat].into_iter().collect();
        let f = MedicationForm {
            rule: RecurrenceRule::DaysOfWeek(days),
            ..form()
        };
        let req = f.clone().into_request(&Session::new("u"), created()).unwrap();

        let record: MedicationRecord =
            serde_json::from_value(serde_json::to_value(&req).unwrap()).unwrap();
        let schedule = MedicationSchedule::from_record(&record).unwrap();
        assert_eq!(schedule.rule, f.rule);
        assert_eq!(schedule.start_date, f.start_date);
        assert_eq!(schedule.doses, f.doses);
    }
}
