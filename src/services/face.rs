use std::sync::Arc;
use std::time::Duration;

use crate::client::AttendanceApi;
use crate::device::CapturedPhoto;
use crate::error::{AppError, AppResult, RejectReason};
use crate::models::VerificationResult;
use crate::session::SessionContext;

/// A photo whose latest verification matched the session employee.
///
/// Only [`FaceVerifier`] can build one, so holding a `VerifiedPhoto` is the
/// proof the submitter asks for.
#[derive(Debug, Clone)]
pub struct VerifiedPhoto {
    photo: CapturedPhoto,
    result: VerificationResult,
}

impl VerifiedPhoto {
    pub fn photo(&self) -> &CapturedPhoto {
        &self.photo
    }

    pub fn result(&self) -> &VerificationResult {
        &self.result
    }

    /// Whether this verification still authorizes `employee_id`
    pub fn authorizes(&self, employee_id: i64) -> bool {
        self.result.verified && self.result.matched_identity == Some(employee_id)
    }
}

/// Checks a captured frame against the session holder's enrolled face
pub struct FaceVerifier {
    api: Arc<dyn AttendanceApi>,
    session: SessionContext,
    min_score: f64,
    timeout: Duration,
}

impl FaceVerifier {
    pub fn new(
        api: Arc<dyn AttendanceApi>,
        session: SessionContext,
        min_score: f64,
        timeout: Duration,
    ) -> Self {
        Self {
            api,
            session,
            min_score,
            timeout,
        }
    }

    /// Verify `photo`. The photo is consumed: on any rejection it is dropped
    /// and the caller has to capture a new one.
    ///
    /// A server `success` alone is not enough; the matched identity must be
    /// the session employee. Transport failures are rejections too.
    pub async fn verify(&self, photo: CapturedPhoto) -> AppResult<VerifiedPhoto> {
        let expected = self.session.employee_id;

        let raw = match tokio::time::timeout(self.timeout, self.api.verify_face(photo.jpeg())).await
        {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => return Err(self.reject(&photo, RejectReason::ServiceFailure(e.to_string()))),
            Err(_) => {
                return Err(self.reject(
                    &photo,
                    RejectReason::ServiceFailure(format!(
                        "no answer within {}s",
                        self.timeout.as_secs()
                    )),
                ));
            }
        };

        let result = VerificationResult::evaluate(&raw, expected);

        if !result.success {
            return Err(self.reject(&photo, RejectReason::NoMatch));
        }

        if !result.verified {
            return Err(self.reject(
                &photo,
                RejectReason::IdentityMismatch {
                    expected,
                    matched: result.matched_identity,
                },
            ));
        }

        if result.score < self.min_score {
            return Err(self.reject(
                &photo,
                RejectReason::LowConfidence {
                    score: result.score,
                    required: self.min_score,
                },
            ));
        }

        log::info!(
            "Face verified for employee {} (photo {}, score {:.2})",
            expected,
            photo.id(),
            result.score
        );
        Ok(VerifiedPhoto { photo, result })
    }

    fn reject(&self, photo: &CapturedPhoto, reason: RejectReason) -> AppError {
        log::warn!(
            "Face verification rejected for employee {} (photo {}): {}",
            self.session.employee_id,
            photo.id(),
            reason
        );
        AppError::VerificationRejected(reason)
    }
}

#[cfg(test)]
impl VerifiedPhoto {
    /// Build a verified photo without a verification round trip
    pub(crate) fn for_tests(photo: CapturedPhoto, result: VerificationResult) -> Self {
        Self { photo, result }
    }
}
