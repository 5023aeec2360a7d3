use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a captured frame was not accepted for submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RejectReason {
    /// The service found no enrolled face in the frame
    NoMatch,
    /// The face matched someone other than the session holder
    IdentityMismatch { expected: i64, matched: Option<i64> },
    LowConfidence { score: f64, required: f64 },
    /// The verification call itself failed
    ServiceFailure(String),
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::NoMatch => write!(f, "face not recognized"),
            RejectReason::IdentityMismatch { expected, matched } => match matched {
                Some(id) => write!(f, "face belongs to employee {} instead of {}", id, expected),
                None => write!(f, "face does not belong to employee {}", expected),
            },
            RejectReason::LowConfidence { score, required } => {
                write!(f, "confidence {:.2} below required {:.2}", score, required)
            }
            RejectReason::ServiceFailure(msg) => write!(f, "verification failed: {}", msg),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("Verification rejected: {0}")]
    VerificationRejected(RejectReason),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Server returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type AppResult<T> = Result<T, AppError>;

/// The four classes the UI distinguishes when reacting to a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    DeviceUnavailable,
    VerificationRejected,
    Transport,
    Validation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// User-facing notification produced from an outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

impl AppError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AppError::DeviceUnavailable(_) => ErrorCategory::DeviceUnavailable,
            AppError::VerificationRejected(_) => ErrorCategory::VerificationRejected,
            AppError::Validation(_) | AppError::PermissionDenied(_) | AppError::Config(_) => {
                ErrorCategory::Validation
            }
            AppError::Transport(_)
            | AppError::Timeout(_)
            | AppError::Api { .. }
            | AppError::NotFound(_)
            | AppError::InvalidTransition(_) => ErrorCategory::Transport,
        }
    }

    /// Every runtime failure leaves the workflow interactive; only a broken
    /// configuration stops the client from starting.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, AppError::Config(_))
    }

    pub fn notice(&self) -> Notice {
        match self {
            AppError::VerificationRejected(_) => {
                Notice::warning(format!("{}. Please retake the photo.", self))
            }
            AppError::Validation(msg) => Notice::warning(msg.clone()),
            AppError::Api { message, .. } => Notice::error(message.clone()),
            _ => Notice::error(self.to_string()),
        }
    }

    pub fn api(status: u16, message: impl Into<String>) -> Self {
        AppError::Api {
            status,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        log::error!("HTTP error: {}", error);

        if error.is_timeout() {
            return AppError::Timeout(error.to_string());
        }

        if let Some(status) = error.status() {
            return AppError::api(status.as_u16(), error.to_string());
        }

        AppError::Transport(error.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        log::error!("Malformed response body: {}", error);
        AppError::Transport(format!("malformed response: {}", error))
    }
}

impl From<tokio::time::error::Elapsed> for AppError {
    fn from(error: tokio::time::error::Elapsed) -> Self {
        log::warn!("Operation exceeded its deadline: {}", error);
        AppError::Timeout(error.to_string())
    }
}
