//! Error model shared by the authentication core, the voter layer and the data-access seam.
//! Expected "no match" outcomes are not errors: they travel as failed `AuthResult`s or `None`
//! sessions. Only the variants below cross component boundaries.

use thiserror::Error;

/// Errors surfaced to request handlers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// No valid session, or the login chain failed at some stage. Deliberately carries no detail.
    #[error("auth failed")]
    AuthFailed,
    /// Authenticated, but the voters did not grant the requested attributes.
    #[error("forbidden access")]
    AccessDenied,
    /// Wiring or configuration problem. Fatal, meant to surface at startup.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Unexpected data-access fault outside the sentinel paths.
    #[error("backend error: {0}")]
    Backend(String),
}

impl AuthError {
    pub fn configuration<S: Into<String>>(msg: S) -> Self { AuthError::Configuration(msg.into()) }
    pub fn backend<S: Into<String>>(msg: S) -> Self { AuthError::Backend(msg.into()) }

    pub fn code_str(&self) -> &'static str {
        match self {
            AuthError::AuthFailed => "auth_failed",
            AuthError::AccessDenied => "access_denied",
            AuthError::Configuration(_) => "configuration_error",
            AuthError::Backend(_) => "backend_error",
        }
    }

    /// Map to HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            AuthError::AuthFailed => 401,
            AuthError::AccessDenied => 403,
            AuthError::Configuration(_) => 500,
            AuthError::Backend(_) => 503,
        }
    }

    /// Message safe to hand to an unauthenticated client: internal causes are never echoed.
    pub fn public_message(&self) -> &'static str {
        match self {
            AuthError::AuthFailed => "Auth failed",
            AuthError::AccessDenied => "Forbidden access",
            AuthError::Configuration(_) | AuthError::Backend(_) => "Internal error",
        }
    }
}

/// Failures reported by the data-access collaborator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DataError {
    #[error("no entity matches {0}")]
    NotFound(String),
    #[error("{count} entities match {criteria}")]
    Ambiguous { criteria: String, count: usize },
    /// The criteria name a field the entity does not have. Configuration class.
    #[error("unknown field '{0}'")]
    UnknownField(String),
    #[error("no repository for {bundle}/{model}")]
    UnknownModel { bundle: String, model: String },
    #[error("backend: {0}")]
    Backend(String),
}

impl DataError {
    /// True for errors caused by wiring rather than by data.
    pub fn is_configuration(&self) -> bool {
        matches!(self, DataError::UnknownField(_) | DataError::UnknownModel { .. })
    }
}

impl From<DataError> for AuthError {
    fn from(err: DataError) -> Self {
        if err.is_configuration() {
            AuthError::Configuration(err.to_string())
        } else {
            AuthError::Backend(err.to_string())
        }
    }
}

/// A login field that failed form validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("field '{field}': {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn mandatory<S: Into<String>>(field: S) -> Self {
        ValidationError { field: field.into(), message: "mandatory field is missing or empty".into() }
    }
}
