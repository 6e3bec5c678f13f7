pub mod http;
pub mod types;

pub use http::*;
pub use types::*;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("Backend is not reachable at {0}")]
    Connection(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Backend rejected the request (status {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Email already registered")]
    EmailAlreadyRegistered,

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),
}
