//! Views for errors.

use rocket::http::Status;

use serde::Serialize;

/// The body of a response to a request that failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorView {
    /// The HTTP status code.
    pub status: u16,
    /// The reason phrase for the status code.
    pub reason: String,
    /// What went wrong.
    pub message: String,
}

impl ErrorView {
    pub fn new<S>(status: Status, message: S) -> ErrorView
    where
        S: Into<String>,
    {
        ErrorView {
            status: status.code,
            reason: status.reason().unwrap_or("Unknown").to_string(),
            message: message.into(),
        }
    }
}
