use serde::{Deserialize, Serialize};

use super::BackendError;
use crate::models::{MedicationRecord, NewMedication};
use crate::session::Session;

/// Message the backend uses for a duplicate registration.
pub const EMAIL_ALREADY_REGISTERED: &str = "Email already registered.";

/// Remote health-record backend.
pub trait MedicationBackend {
    fn login(&self, email: &str, password: &str) -> Result<Session, BackendError>;

    fn register(&self, name: &str, email: &str, password: &str) -> Result<(), BackendError>;

    fn fetch_medications(&self, session: &Session) -> Result<Vec<MedicationRecord>, BackendError>;

    fn add_medication(
        &self,
        session: &Session,
        medication: &NewMedication,
    ) -> Result<(), BackendError>;
}

#[derive(Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Serialize)]
pub(crate) struct RegisterRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Serialize)]
pub(crate) struct UserIdRequest<'a> {
    pub user_id: &'a str,
}

/// Common response shape: `{success, message, user?, medications?}`.
#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    success: bool,
    message: Option<String>,
    user: Option<Session>,
    medications: Option<Vec<serde_json::Value>>,
}

fn rejected(status: u16, message: Option<String>, body: &str) -> BackendError {
    let message = message.unwrap_or_else(|| {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            "no message".to_string()
        } else {
            trimmed.chars().take(200).collect()
        }
    });
    BackendError::Rejected { status, message }
}

fn decode(status: u16, body: &str) -> Result<Envelope, BackendError> {
    match serde_json::from_str::<Envelope>(body) {
        Ok(envelope) => Ok(envelope),
        Err(_) if !(200..300).contains(&status) => Err(rejected(status, None, body)),
        Err(e) => Err(BackendError::ResponseParsing(e.to_string())),
    }
}

/// `/login` succeeds with HTTP 200, `success: true` and a `user` object.
pub fn parse_login_response(status: u16, body: &str) -> Result<Session, BackendError> {
    let envelope = decode(status, body)?;
    if status != 200 || !envelope.success {
        return Err(rejected(status, envelope.message, body));
    }
    envelope
        .user
        .ok_or_else(|| BackendError::ResponseParsing("login response has no user".into()))
}

/// `/register` succeeds with HTTP 201 and `success: true`.
pub fn parse_register_response(status: u16, body: &str) -> Result<(), BackendError> {
    let envelope = decode(status, body)?;
    if status == 201 && envelope.success {
        return Ok(());
    }
    if status == 400 && envelope.message.as_deref() == Some(EMAIL_ALREADY_REGISTERED) {
        return Err(BackendError::EmailAlreadyRegistered);
    }
    Err(rejected(status, envelope.message, body))
}

/// Medication list. A missing `medications` field is an empty list, and
/// elements that do not decode as a medication are skipped.
pub fn parse_medications_response(
    status: u16,
    body: &str,
) -> Result<Vec<MedicationRecord>, BackendError> {
    let envelope = decode(status, body)?;
    if !(200..300).contains(&status) {
        return Err(rejected(status, envelope.message, body));
    }

    let raw = envelope.medications.unwrap_or_default();
    let mut records = Vec::with_capacity(raw.len());
    for (index, value) in raw.into_iter().enumerate() {
        match serde_json::from_value::<MedicationRecord>(value) {
            Ok(record) => records.push(record),
            Err(e) => tracing::warn!(index, "Skipping undecodable medication: {e}"),
        }
    }
    Ok(records)
}

/// Acknowledgement for writes: 2xx and `success: true`.
pub fn parse_ack_response(status: u16, body: &str) -> Result<(), BackendError> {
    let envelope = decode(status, body)?;
    if (200..300).contains(&status) && envelope.success {
        Ok(())
    } else {
        Err(rejected(status, envelope.message, body))
    }
}
