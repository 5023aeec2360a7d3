use chrono::{Datelike, NaiveDate};
use std::sync::Arc;

use crate::client::AttendanceApi;
use crate::clock::Clock;
use crate::config::Config;
use crate::device::{CameraCapture, CameraDevice, CapturedPhoto, LocationProbe, LocationProvider};
use crate::error::{AppError, AppResult};
use crate::models::{GeolocationSample, StatusMap, SubmissionKind};
use crate::services::absence;
use crate::services::face::{FaceVerifier, VerifiedPhoto};
use crate::services::shift_resolver::{AttendanceContext, ShiftResolver};
use crate::services::state::AttendanceState;
use crate::services::status::AttendanceStatusTracker;
use crate::services::submit::{AttendanceSubmitter, Submission, SubmitReceipt};
use crate::session::SessionContext;

/// The photo currently owned by the capture session
#[derive(Debug)]
enum HeldPhoto {
    Captured(CapturedPhoto),
    Verifying(CapturedPhoto),
    Verified(VerifiedPhoto),
}

/// Claim on the held photo for one verification round trip.
///
/// Carries the capture generation it was issued for; a retake in the
/// meantime makes its result stale.
#[derive(Debug)]
pub struct VerificationTicket {
    generation: u64,
    photo: CapturedPhoto,
}

impl VerificationTicket {
    pub fn photo(&self) -> &CapturedPhoto {
        &self.photo
    }

    pub fn into_photo(self) -> CapturedPhoto {
        self.photo
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug)]
pub struct StartOutcome {
    pub context: AttendanceContext,
    /// Location failure to alert about; `None` when a sample was obtained or
    /// capture is suppressed anyway
    pub location_error: Option<AppError>,
}

/// Capture screen state machine:
/// resolve context → acquire camera → capture → verify → submit.
pub struct AttendanceWorkflow {
    session: SessionContext,
    clock: Arc<dyn Clock>,
    kind: SubmissionKind,
    note: Option<String>,
    resolver: ShiftResolver,
    tracker: AttendanceStatusTracker,
    verifier: FaceVerifier,
    submitter: AttendanceSubmitter,
    camera: CameraCapture,
    location: LocationProbe,
    context: Option<AttendanceContext>,
    state: AttendanceState,
    held: Option<HeldPhoto>,
    generation: u64,
}

impl AttendanceWorkflow {
    pub fn new(
        config: &Config,
        session: SessionContext,
        api: Arc<dyn AttendanceApi>,
        camera: Arc<dyn CameraDevice>,
        location: Arc<dyn LocationProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            resolver: ShiftResolver::new(api.clone(), session.clone(), clock.clone()),
            tracker: AttendanceStatusTracker::new(api.clone(), session.clone()),
            verifier: FaceVerifier::new(
                api.clone(),
                session.clone(),
                config.min_face_score,
                config.verify_timeout(),
            ),
            submitter: AttendanceSubmitter::new(api, session.clone(), config.submit_timeout()),
            camera: CameraCapture::new(camera, config.jpeg_quality),
            location: LocationProbe::new(location),
            session,
            clock,
            kind: SubmissionKind::Regular,
            note: None,
            context: None,
            state: AttendanceState::Loading,
            held: None,
            generation: 0,
        }
    }

    /// Use the off-site duty flow instead of regular attendance
    pub fn with_kind(mut self, kind: SubmissionKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn set_note(&mut self, note: Option<String>) {
        self.note = note.filter(|n| !n.trim().is_empty());
    }

    pub fn kind(&self) -> SubmissionKind {
        self.kind
    }

    pub fn state(&self) -> &AttendanceState {
        &self.state
    }

    pub fn context(&self) -> Option<&AttendanceContext> {
        self.context.as_ref()
    }

    pub fn status_label(&self) -> String {
        self.state.label()
    }

    pub fn location(&self) -> Option<&GeolocationSample> {
        self.location.sample()
    }

    pub fn camera_active(&self) -> bool {
        self.camera.is_active()
    }

    pub fn status_map(&self) -> &StatusMap {
        self.tracker.status_map()
    }

    /// Alpha classification against the current status map. Dates outside
    /// the loaded month are unknown and never reported as alpha.
    pub fn is_alpha(&self, date: NaiveDate) -> bool {
        let covered = self
            .tracker
            .loaded_month()
            .is_some_and(|m| m.year() == date.year() && m.month() == date.month());
        covered && absence::is_alpha(date, self.clock.today(), self.tracker.status_map())
    }

    pub fn held_photo(&self) -> Option<&CapturedPhoto> {
        self.held.as_ref().map(|held| match held {
            HeldPhoto::Captured(photo) | HeldPhoto::Verifying(photo) => photo,
            HeldPhoto::Verified(verified) => verified.photo(),
        })
    }

    pub fn is_verified(&self) -> bool {
        matches!(self.held, Some(HeldPhoto::Verified(_)))
    }

    pub fn is_verifying(&self) -> bool {
        matches!(self.held, Some(HeldPhoto::Verifying(_)))
    }

    /// Resolve the attendance context and probe location concurrently
    pub async fn start(&mut self, requested_date: Option<NaiveDate>) -> StartOutcome {
        // a photo verified for the previous context must not carry into this one
        self.discard_photo();
        self.state = AttendanceState::Loading;
        let employee_id = self.session.employee_id;

        let (context, location) = tokio::join!(
            self.resolver
                .resolve_context(&mut self.tracker, employee_id, requested_date),
            self.location.probe(),
        );

        log::info!(
            "Attendance context for employee {}: {} on {}{}",
            employee_id,
            context.state.label(),
            context.date,
            if context.carried_over { " (carried over)" } else { "" }
        );

        self.state = context.state.clone();
        self.context = Some(context.clone());

        if self.state.is_terminal() {
            self.close_capture();
        }

        let location_error = match location {
            Err(e) if self.state.allows_capture() => Some(e),
            _ => None,
        };

        StartOutcome {
            context,
            location_error,
        }
    }

    pub async fn refresh_location(&mut self) -> AppResult<GeolocationSample> {
        self.ensure_capture_allowed()?;
        self.location.reprobe().await
    }

    pub async fn refresh_status_map(&mut self, month: NaiveDate) -> AppResult<&StatusMap> {
        let employee_id = self.session.employee_id;
        self.tracker.refresh_status_map(employee_id, month).await
    }

    pub async fn start_camera(&mut self) -> AppResult<()> {
        self.ensure_capture_allowed()?;
        self.camera.acquire().await
    }

    pub fn stop_camera(&mut self) -> usize {
        self.camera.release()
    }

    /// Snapshot the live frame, replacing any held photo and invalidating
    /// its verification
    pub fn capture(&mut self) -> AppResult<&CapturedPhoto> {
        self.ensure_capture_allowed()?;
        let photo = self.camera.capture_frame()?;

        self.discard_photo();
        self.held = Some(HeldPhoto::Captured(photo));
        match &self.held {
            Some(HeldPhoto::Captured(photo)) => Ok(photo),
            _ => Err(AppError::DeviceUnavailable("captured photo was lost".to_string())),
        }
    }

    /// Drop the held photo so a new one has to be captured
    pub fn retake(&mut self) {
        self.discard_photo();
    }

    /// Hand the held photo out for verification
    pub fn begin_verification(&mut self) -> AppResult<VerificationTicket> {
        self.ensure_capture_allowed()?;

        let photo = match self.held.take() {
            Some(HeldPhoto::Captured(photo)) => photo,
            Some(other) => {
                let message = match &other {
                    HeldPhoto::Verifying(_) => "Verification is already in progress",
                    _ => "The photo is already verified",
                };
                self.held = Some(other);
                return Err(AppError::Validation(message.to_string()));
            }
            None => {
                return Err(AppError::Validation(
                    "Take a photo before verifying".to_string(),
                ));
            }
        };

        self.held = Some(HeldPhoto::Verifying(photo.clone()));
        Ok(VerificationTicket {
            generation: self.generation,
            photo,
        })
    }

    /// Record the answer for `ticket`.
    ///
    /// Returns `Ok(false)` when the ticket is stale (a retake or new capture
    /// happened meanwhile) and the result was ignored. A rejection discards
    /// the held photo. A verification of any photo other than the one being
    /// verified is refused and leaves the held photo untouched.
    pub fn complete_verification(
        &mut self,
        ticket_generation: u64,
        result: AppResult<VerifiedPhoto>,
    ) -> AppResult<bool> {
        if ticket_generation != self.generation || !self.is_verifying() {
            log::debug!(
                "Ignoring verification result for capture generation {} (current {})",
                ticket_generation,
                self.generation
            );
            return Ok(false);
        }

        match result {
            Ok(verified) => {
                let expected = self.held_photo().map(|p| p.id());
                if expected != Some(verified.photo().id()) {
                    log::warn!(
                        "Verification for photo {} does not match the photo being verified",
                        verified.photo().id()
                    );
                    return Err(AppError::Validation(
                        "The verification belongs to a different photo".to_string(),
                    ));
                }
                self.held = Some(HeldPhoto::Verified(verified));
                Ok(true)
            }
            Err(e) => {
                self.discard_photo();
                Err(e)
            }
        }
    }

    /// Verify the held photo in one step
    pub async fn verify(&mut self) -> AppResult<bool> {
        let ticket = self.begin_verification()?;
        let generation = ticket.generation();
        let result = self.verifier.verify(ticket.into_photo()).await;
        self.complete_verification(generation, result)
    }

    /// Submission is possible only with a verified photo, a location and a
    /// shift, in a state that accepts capture
    pub fn can_submit(&self) -> bool {
        self.state.allows_capture()
            && self.is_verified()
            && self.location.sample().is_some()
            && self.context.as_ref().and_then(|c| c.shift_id).is_some()
    }

    /// Submit the verified photo. On success the state advances, the photo is
    /// dropped and the camera released once the cycle is finished. Dropping
    /// the future before it resolves leaves the workflow as it was.
    pub async fn submit(&mut self) -> AppResult<SubmitReceipt> {
        let verified = match &self.held {
            Some(HeldPhoto::Verified(verified)) => Some(verified),
            _ => None,
        };
        let (shift_id, date) = match &self.context {
            Some(context) => (context.shift_id, context.date),
            None => (None, self.clock.today()),
        };

        let submission = Submission {
            kind: self.kind,
            employee_id: self.session.employee_id,
            shift_id,
            date,
            location: self.location.sample(),
            photo: verified,
            current: &self.state,
            note: self.note.clone(),
        };

        self.submitter.validate(&submission)?;

        let receipt = self.submitter.submit(submission).await?;
        self.state = receipt.next_state.clone();
        if let Some(context) = self.context.as_mut() {
            context.state = self.state.clone();
        }
        self.discard_photo();
        if self.state.is_terminal() {
            self.close_capture();
        }

        Ok(receipt)
    }

    fn ensure_capture_allowed(&self) -> AppResult<()> {
        if self.state.allows_capture() {
            Ok(())
        } else {
            Err(AppError::Validation(format!(
                "Capture is not available: {}",
                self.state.label()
            )))
        }
    }

    fn discard_photo(&mut self) {
        if self.held.take().is_some() {
            log::debug!("Discarded held photo (generation {})", self.generation);
        }
        self.generation += 1;
    }

    fn close_capture(&mut self) {
        self.discard_photo();
        self.camera.release();
    }
}
