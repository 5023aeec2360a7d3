use serde::{Deserialize, Serialize};

/// Raw body returned by `POST /face/verify`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceVerifyResponse {
    pub success: bool,
    #[serde(rename = "pegawai_id", alias = "matched_identity", default)]
    pub matched_identity: Option<i64>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Outcome of one verification attempt. Never persisted; it only gates
/// submission of the photo it was computed for.
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationResult {
    pub success: bool,
    pub matched_identity: Option<i64>,
    pub score: f64,
    /// `success` and the matched identity equals the session employee
    pub verified: bool,
}

impl VerificationResult {
    pub fn evaluate(raw: &FaceVerifyResponse, session_employee_id: i64) -> Self {
        let verified = raw.success && raw.matched_identity == Some(session_employee_id);
        Self {
            success: raw.success,
            matched_identity: raw.matched_identity,
            score: raw.score.unwrap_or(0.0),
            verified,
        }
    }
}
