//! Error types for playlist-import.
//!
//! Network failures never leave the component that detected them: a
//! [`FetchError`] ends up rendered in the entry list, a [`CreationError`] ends
//! up in the log for one entry, and a [`ValidationError`] is printed next to
//! the offending form field. Only [`AppError`] reaches `main`.

use std::collections::BTreeMap;
use std::io;
use thiserror::Error;

/// Failure to retrieve a playlist from the metadata provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The user submitted an empty playlist URL; no request was sent.
    #[error("playlist URL is empty")]
    EmptyUrl,
    /// Transport failure (connection refused, timeout, TLS...).
    #[error("network error: {0}")]
    Network(String),
    /// The provider answered with a non-success status.
    #[error("provider returned {status}: {payload}")]
    Status { status: u16, payload: String },
    /// The provider answered with success but the body is not a playlist.
    #[error("malformed provider response: {payload}")]
    Malformed { payload: String },
}

/// Failure to create one episode. Scoped to a single entry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreationError {
    #[error("network error: {0}")]
    Network(String),
    #[error("backend returned {status}: {payload}")]
    Status { status: u16, payload: String },
}

/// Server-side validation failure of a submitted form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Field name to error message.
    #[error("invalid fields: {}", field_names(.0))]
    Fields(BTreeMap<String, String>),
    /// Error not tied to a field; shown as a banner.
    #[error("{0}")]
    Page(String),
}

fn field_names(fields: &BTreeMap<String, String>) -> String {
    fields.keys().cloned().collect::<Vec<_>>().join(", ")
}

/// Outcome of a failed form submission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("network error: {0}")]
    Network(String),
}

/// Errors that abort startup or the terminal session.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for AppError {
    fn from(err: toml::ser::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

/// Result type alias using AppError.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_display() {
        let err = FetchError::Status {
            status: 400,
            payload: "It seems like incorrect playlist".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "provider returned 400: It seems like incorrect playlist"
        );
    }

    #[test]
    fn test_validation_error_lists_fields() {
        let mut fields = BTreeMap::new();
        fields.insert("youtube_link".to_string(), "min length is 6".to_string());
        fields.insert("email".to_string(), "required".to_string());
        let err = ValidationError::Fields(fields);
        assert_eq!(err.to_string(), "invalid fields: email, youtube_link");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let app_err: AppError = io_err.into();
        assert!(matches!(app_err, AppError::Io(_)));
    }

    #[test]
    fn test_form_error_wraps_validation() {
        let err: FormError = ValidationError::Page("Input data is invalid".to_string()).into();
        assert_eq!(err.to_string(), "Input data is invalid");
    }
}
