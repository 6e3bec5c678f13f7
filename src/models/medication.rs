use std::num::NonZeroU32;

use serde::{Deserialize, Deserializer, Serialize};

/// A medication as returned by `get_medications_wrt_userId`.
///
/// Every field is optional on the wire. Validation happens when the record
/// is turned into a `MedicationSchedule`, so one bad record never fails the
/// whole list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MedicationRecord {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub medication_name: String,
    pub frequency: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub selected_days: Option<RawSelection>,
    pub selected_dates: Option<RawSelection>,
    pub count: Option<RawCount>,
    /// JSON-encoded `[{time, dosage}]` array, as stored by the entry form.
    pub schedule: Option<String>,
}

/// `null` and a missing name both read as an empty name.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// One intra-day dose: a wall-clock time and a dosage amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoseEntry {
    pub time: String,
    pub dosage: String,
}

/// `selected_days` / `selected_dates` arrive either as a free-form string
/// (`"Mon, Wed"`, `"1,15"`) or as a JSON array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawSelection {
    Text(String),
    Items(Vec<RawItem>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawItem {
    Number(i64),
    Text(String),
}

impl RawSelection {
    /// Split into alphanumeric tokens, whatever separators were used.
    pub fn tokens(&self) -> Vec<String> {
        match self {
            Self::Text(text) => split_tokens(text),
            Self::Items(items) => items
                .iter()
                .flat_map(|item| match item {
                    RawItem::Number(n) => vec![n.to_string()],
                    RawItem::Text(text) => split_tokens(text),
                })
                .collect(),
        }
    }
}

fn split_tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// The `count` field of an "Every x days" medication: a number or a numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawCount {
    Number(i64),
    Text(String),
}

impl RawCount {
    /// The interval in days, if it is a positive integer.
    pub fn interval(&self) -> Option<NonZeroU32> {
        let value = match self {
            Self::Number(n) => *n,
            Self::Text(text) => text.trim().parse::<i64>().ok()?,
        };
        u32::try_from(value).ok().and_then(NonZeroU32::new)
    }
}

/// Request body for `POST /medications_wrt_userId`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMedication {
    pub user_id: String,
    pub image_urls: Vec<String>,
    pub medication_name: String,
    pub frequency: String,
    /// Creation timestamp, RFC 3339.
    pub date_time: String,
    pub schedule: String,
    pub start_date: String,
    pub end_date: String,
    pub count: Option<String>,
    pub selected_days: Option<String>,
    pub selected_dates: Option<String>,
}
