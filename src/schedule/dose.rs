use chrono::NaiveTime;

use crate::models::DoseEntry;

/// Normalise a dose time to `HH:MM` (`"7:00"` becomes `"07:00"`).
/// Returns `None` when the text is not a valid time of day.
pub fn normalize_dose_time(raw: &str) -> Option<String> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .ok()
        .map(|t| t.format("%H:%M").to_string())
}

/// Is `raw` a non-negative decimal amount such as `"1.0"` or `"0.5"`?
pub fn is_valid_dosage(raw: &str) -> bool {
    let trimmed = raw.trim();
    !trimmed.is_empty()
        && trimmed.chars().all(|c| c.is_ascii_digit() || c == '.')
        && trimmed.parse::<f64>().is_ok_and(|v| v.is_finite())
}

/// Decode the JSON-encoded dose table stored on a medication.
///
/// The dose table does not affect which days are due, so a broken table
/// yields no entries rather than an error. Entries with an invalid time are
/// dropped; the rest keep their order.
pub fn parse_dose_table(raw: Option<&str>) -> Vec<DoseEntry> {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return Vec::new();
    };

    let entries: Vec<DoseEntry> = match serde_json::from_str(raw) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("Ignoring malformed dose schedule: {e}");
            return Vec::new();
        }
    };

    entries
        .into_iter()
        .filter_map(|entry| match normalize_dose_time(&entry.time) {
            Some(time) => Some(DoseEntry {
                time,
                dosage: entry.dosage.trim().to_string(),
            }),
            None => {
                tracing::debug!(time = %entry.time, "Dropping dose with invalid time");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_single_digit_hour() {
        assert_eq!(normalize_dose_time("7:00").as_deref(), Some("07:00"));
        assert_eq!(normalize_dose_time("19:30").as_deref(), Some("19:30"));
    }

    #[test]
    fn rejects_invalid_times() {
        assert!(normalize_dose_time("25:00").is_none());
        assert!(normalize_dose_time("noon").is_none());
        assert!(normalize_dose_time("").is_none());
    }

    #[test]
    fn dosage_must_be_decimal() {
        assert!(is_valid_dosage("1.0"));
        assert!(is_valid_dosage("0.5"));
        assert!(is_valid_dosage("2"));
        assert!(!is_valid_dosage(""));
        assert!(!is_valid_dosage("-1"));
        assert!(!is_valid_dosage("two"));
        assert!(!is_valid_dosage("1.2.3"));
    }

    #[test]
    fn parses_dose_table_in_order() {
        let raw = r#"[{"time":"7:00","dosage":"1.0"},{"time":"13:00","dosage":"0.5"}]"#;
        let doses = parse_dose_table(Some(raw));
        assert_eq!(
            doses,
            vec![
                DoseEntry { time: "07:00".into(), dosage: "1.0".into() },
                DoseEntry { time: "13:00".into(), dosage: "0.5".into() },
            ]
        );
    }

    #[test]
    fn drops_entries_with_bad_time() {
        let raw = r#"[{"time":"xx","dosage":"1.0"},{"time":"19:00","dosage":"1.0"}]"#;
        let doses = parse_dose_table(Some(raw));
        assert_eq!(doses.len(), 1);
        assert_eq!(doses[0].time, "19:00");
    }

    #[test]
    fn malformed_or_missing_table_is_empty() {
        assert!(parse_dose_table(None).is_empty());
        assert!(parse_dose_table(Some("")).is_empty());
        assert!(parse_dose_table(Some("not json")).is_empty());
    }
}
