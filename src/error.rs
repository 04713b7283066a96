//! Error types for CardioPix
//!
//! One taxonomy shared by the server, the dashboard client and the login
//! client. Validation errors carry the user-facing message as their display
//! text so callers can surface them directly.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for CardioPix operations
#[derive(Error, Debug)]
pub enum ClinicError {
    /// Exam creation without a patient name
    #[error("Nome do paciente é obrigatório.")]
    MissingPatientName,

    /// Login attempted with an empty email, password or profile
    #[error("Preencha todos os campos para continuar.")]
    MissingCredentials,

    /// The remote side could not be reached
    #[error("Network error talking to '{endpoint}': {message}")]
    Network {
        /// URL or socket that failed
        endpoint: String,
        /// Transport error text
        message: String,
    },

    /// The remote side answered with a non-2xx status
    #[error("Server responded {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Server {
        /// HTTP status code
        status: u16,
        /// `message` field of the error body, when present
        message: Option<String>,
    },

    /// The remote auth endpoint rejected the credentials
    #[error("Credenciais inválidas.")]
    InvalidCredentials,

    /// I/O error with path context
    #[error("I/O error at '{path}': {source}")]
    Io {
        /// File the operation touched
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Malformed HTTP request
    #[error("Malformed request: {0}")]
    Http(String),

    /// Session store failure
    #[error("Session store error: {0}")]
    Session(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// JSON encoding or decoding error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ClinicError {
    /// Create an I/O error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a network error
    pub fn network(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Network {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Create a server error from a status code and optional message
    pub fn server(status: u16, message: Option<String>) -> Self {
        Self::Server { status, message }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError(message.into())
    }

    /// Validation errors are recovered locally and shown to the user as-is
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::MissingPatientName | Self::MissingCredentials)
    }

    /// Errors that a client may answer with a fallback instead of failing
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Network { .. } | Self::Server { .. } | Self::InvalidCredentials
        )
    }

    /// Message a server attached to a non-2xx response, if any
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Server { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

/// Result type alias for CardioPix operations
pub type Result<T> = std::result::Result<T, ClinicError>;

impl From<std::io::Error> for ClinicError {
    fn from(err: std::io::Error) -> Self {
        ClinicError::Io {
            path: PathBuf::new(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for ClinicError {
    fn from(err: serde_json::Error) -> Self {
        ClinicError::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for ClinicError {
    fn from(err: reqwest::Error) -> Self {
        let endpoint = err
            .url()
            .map(|u| u.to_string())
            .unwrap_or_else(|| "unknown".to_string());

        match err.status() {
            Some(status) => ClinicError::server(status.as_u16(), None),
            None if err.is_decode() => ClinicError::Serialization(err.to_string()),
            None => ClinicError::network(endpoint, err.to_string()),
        }
    }
}

/// Extension trait for adding path context to std::io::Result
pub trait IoResultExt<T> {
    /// Add path context to an I/O error
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|e| ClinicError::io(path, e))
    }
}
