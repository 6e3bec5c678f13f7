use std::cell::RefCell;
use std::time::Duration;

use serde::Serialize;

use super::types::*;
use super::BackendError;
use crate::config::BackendConfig;
use crate::models::{MedicationRecord, NewMedication};
use crate::session::Session;

/// Blocking HTTP client for the health-record backend.
pub struct HttpBackend {
    base_url: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BackendError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs: config.timeout_secs,
        })
    }

    /// Client configured from `MEDTRACK_*` environment variables.
    pub fn from_env() -> Result<Self, BackendError> {
        Self::new(&BackendConfig::from_env())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST a JSON body; returns status and raw body for the caller to interpret.
    fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<(u16, String), BackendError> {
        let url = format!("{}/{}", self.base_url, path);
        tracing::info!(%url, "Backend request");

        let response = self.client.post(&url).json(body).send().map_err(|e| {
            if e.is_connect() {
                BackendError::Connection(self.base_url.clone())
            } else if e.is_timeout() {
                BackendError::Timeout(self.timeout_secs)
            } else {
                BackendError::HttpClient(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .map_err(|e| BackendError::ResponseParsing(e.to_string()))?;
        tracing::debug!(status, bytes = text.len(), "Backend response");
        Ok((status, text))
    }
}

impl MedicationBackend for HttpBackend {
    fn login(&self, email: &str, password: &str) -> Result<Session, BackendError> {
        let (status, body) = self.post("login", &LoginRequest { email, password })?;
        parse_login_response(status, &body)
    }

    fn register(&self, name: &str, email: &str, password: &str) -> Result<(), BackendError> {
        let (status, body) = self.post(
            "register",
            &RegisterRequest {
                name,
                email,
                password,
            },
        )?;
        parse_register_response(status, &body)
    }

    fn fetch_medications(&self, session: &Session) -> Result<Vec<MedicationRecord>, BackendError> {
        let (status, body) = self.post(
            "get_medications_wrt_userId",
            &UserIdRequest {
                user_id: &session.user_id,
            },
        )?;
        parse_medications_response(status, &body)
    }

    fn add_medication(
        &self,
        session: &Session,
        medication: &NewMedication,
    ) -> Result<(), BackendError> {
        if medication.user_id != session.user_id {
            tracing::warn!("Medication user_id differs from session; using session user");
        }
        let body = NewMedication {
            user_id: session.user_id.clone(),
            ..medication.clone()
        };
        let (status, body) = self.post("medications_wrt_userId", &body)?;
        parse_ack_response(status, &body)
    }
}

/// Mock backend for testing — returns configured medications and records adds.
pub struct MockBackend {
    user: Session,
    password: String,
    medications: Vec<MedicationRecord>,
    fetch_error: Option<BackendError>,
    added: RefCell<Vec<NewMedication>>,
}

impl MockBackend {
    pub fn new(user: Session, password: &str) -> Self {
        Self {
            user,
            password: password.to_string(),
            medications: Vec::new(),
            fetch_error: None,
            added: RefCell::new(Vec::new()),
        }
    }

    pub fn with_medications(mut self, medications: Vec<MedicationRecord>) -> Self {
        self.medications = medications;
        self
    }

    pub fn failing_fetch(mut self, error: BackendError) -> Self {
        self.fetch_error = Some(error);
        self
    }

    /// Medications received through `add_medication`, in call order.
    pub fn added(&self) -> Vec<NewMedication> {
        self.added.borrow().clone()
    }
}

impl MedicationBackend for MockBackend {
    fn login(&self, email: &str, password: &str) -> Result<Session, BackendError> {
        let email_matches = self.user.email.as_deref().map_or(true, |e| e == email);
        if email_matches && password == self.password {
            Ok(self.user.clone())
        } else {
            Err(BackendError::Rejected {
                status: 401,
                message: "Invalid credentials".into(),
            })
        }
    }

    fn register(&self, _name: &str, email: &str, _password: &str) -> Result<(), BackendError> {
        if self.user.email.as_deref() == Some(email) {
            Err(BackendError::EmailAlreadyRegistered)
        } else {
            Ok(())
        }
    }

    fn fetch_medications(&self, session: &Session) -> Result<Vec<MedicationRecord>, BackendError> {
        if let Some(err) = &self.fetch_error {
            return Err(err.clone());
        }
        if session.user_id != self.user.user_id {
            return Ok(Vec::new());
        }
        Ok(self.medications.clone())
    }

    fn add_medication(
        &self,
        _session: &Session,
        medication: &NewMedication,
    ) -> Result<(), BackendError> {
        self.added.borrow_mut().push(medication.clone());
        Ok(())
    }
}
