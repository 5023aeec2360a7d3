use serde::{Deserialize, Serialize};

/// Envelope used by the backend for every JSON endpoint except face
/// verification and attendance submission, which answer with bare bodies.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub success: Option<bool>,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    /// The backend omits `success` on plain fetches; only an explicit
    /// `false` marks a failed call.
    pub fn is_failure(&self) -> bool {
        self.success == Some(false)
    }

    pub fn message_or(&self, fallback: &str) -> String {
        self.message
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(fallback)
            .to_string()
    }
}
