use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;

use crate::client::AttendanceApi;
use crate::error::{AppError, AppResult};
use crate::models::{GeolocationSample, SubmissionForm, SubmissionKind, SubmitOutcome};
use crate::services::face::VerifiedPhoto;
use crate::services::state::AttendanceState;
use crate::session::SessionContext;

/// Inputs of one clock-in/clock-out submission
#[derive(Debug, Clone)]
pub struct Submission<'a> {
    pub kind: SubmissionKind,
    pub employee_id: i64,
    pub shift_id: Option<i64>,
    pub date: NaiveDate,
    pub location: Option<&'a GeolocationSample>,
    pub photo: Option<&'a VerifiedPhoto>,
    /// State the screen was in when the user pressed submit
    pub current: &'a AttendanceState,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubmitReceipt {
    pub message: String,
    pub outcome: SubmitOutcome,
    pub next_state: AttendanceState,
}

pub struct AttendanceSubmitter {
    api: Arc<dyn AttendanceApi>,
    session: SessionContext,
    timeout: Duration,
}

impl AttendanceSubmitter {
    pub fn new(api: Arc<dyn AttendanceApi>, session: SessionContext, timeout: Duration) -> Self {
        Self {
            api,
            session,
            timeout,
        }
    }

    /// Check everything that can be checked without the network
    pub fn validate(&self, submission: &Submission<'_>) -> AppResult<SubmissionForm> {
        if !submission.current.allows_capture() {
            return Err(AppError::Validation(format!(
                "Attendance cannot be submitted now: {}",
                submission.current.label()
            )));
        }

        if submission.employee_id != self.session.employee_id {
            return Err(AppError::Validation(
                "Attendance can only be submitted for the logged-in employee".to_string(),
            ));
        }

        let photo = submission.photo.ok_or_else(|| {
            AppError::Validation("Take and verify a photo before submitting".to_string())
        })?;

        if !photo.authorizes(self.session.employee_id) {
            return Err(AppError::Validation(
                "The photo has not been verified for this employee".to_string(),
            ));
        }

        let location = submission.location.ok_or_else(|| {
            AppError::Validation("Location is not available yet".to_string())
        })?;

        let shift_id = submission.shift_id.ok_or_else(|| {
            AppError::Validation("No shift is assigned for this date".to_string())
        })?;

        Ok(SubmissionForm {
            kind: submission.kind,
            employee_id: submission.employee_id,
            shift_id,
            date: submission.date,
            location: location.to_form_value(),
            note: submission.note.clone(),
        })
    }

    /// Send the attendance event. Nothing reaches the network unless
    /// [`validate`](Self::validate) passes; the returned next state is only
    /// known after the server has answered.
    pub async fn submit(&self, submission: Submission<'_>) -> AppResult<SubmitReceipt> {
        let form = self.validate(&submission).inspect_err(|e| {
            log::debug!("Submission blocked locally: {}", e);
        })?;
        let Some(photo) = submission.photo else {
            return Err(AppError::Validation("Take and verify a photo before submitting".to_string()));
        };

        log::info!(
            "Submitting {} for employee {} on {} (shift {})",
            form.kind,
            form.employee_id,
            form.date,
            form.shift_id
        );

        let response = tokio::time::timeout(
            self.timeout,
            self.api.submit_attendance(&form, photo.photo().jpeg()),
        )
        .await??;

        let outcome = response.outcome();
        let next_state = match outcome {
            SubmitOutcome::ClockedIn => AttendanceState::Pulang,
            SubmitOutcome::ClockedOut => AttendanceState::Selesai,
            SubmitOutcome::Unrecognized => {
                log::warn!(
                    "Could not tell clock-in from clock-out in {:?}, assuming the next step",
                    response.message
                );
                submission.current.next().unwrap_or(AttendanceState::Selesai)
            }
        };

        // The server has already recorded the event; a contradicting answer
        // must not move the screen backwards
        let next_state = submission
            .current
            .advance(next_state)
            .unwrap_or_else(|e| {
                log::warn!("{}; staying in current state", e);
                submission.current.clone()
            });
        log::info!("Attendance recorded: {}", response.message);

        Ok(SubmitReceipt {
            message: response.message,
            outcome,
            next_state,
        })
    }
}
