use crate::error::{AppError, AppResult};
use crate::models::{AttendanceStatus, LeaveRecord};

/// What the capture screen is currently offering
#[derive(Debug, Clone, PartialEq)]
pub enum AttendanceState {
    Loading,
    /// No shift applies, or the context could not be fetched
    NoShift,
    /// Ready to clock in
    Masuk,
    /// Clocked in, ready to clock out
    Pulang,
    /// Today's cycle is finished
    Selesai,
    /// Suppressed by same-day leave
    Cuti(LeaveRecord),
}

impl AttendanceState {
    /// State that follows a record in the given status
    pub fn from_status(status: Option<AttendanceStatus>) -> Self {
        match status {
            None | Some(AttendanceStatus::BelumMasuk) => AttendanceState::Masuk,
            Some(AttendanceStatus::SudahMasuk) => AttendanceState::Pulang,
            Some(AttendanceStatus::SudahPulang) => AttendanceState::Selesai,
        }
    }

    /// Position along masuk → pulang → selesai
    fn stage(&self) -> Option<u8> {
        match self {
            AttendanceState::Masuk => Some(1),
            AttendanceState::Pulang => Some(2),
            AttendanceState::Selesai => Some(3),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AttendanceState::Selesai | AttendanceState::Cuti(_))
    }

    pub fn allows_capture(&self) -> bool {
        matches!(self, AttendanceState::Masuk | AttendanceState::Pulang)
    }

    /// The state after one successful submission from this state
    pub fn next(&self) -> Option<AttendanceState> {
        match self {
            AttendanceState::Masuk => Some(AttendanceState::Pulang),
            AttendanceState::Pulang => Some(AttendanceState::Selesai),
            _ => None,
        }
    }

    /// Move forward along the cycle. Staying put is allowed; going back is not.
    pub fn advance(&self, target: AttendanceState) -> AppResult<AttendanceState> {
        match (self.stage(), target.stage()) {
            (Some(from), Some(to)) if to >= from => Ok(target),
            _ => Err(AppError::InvalidTransition(format!(
                "cannot move attendance state from {} to {}",
                self.label(),
                target.label()
            ))),
        }
    }

    pub fn label(&self) -> String {
        match self {
            AttendanceState::Loading => "Memuat data absensi...".to_string(),
            AttendanceState::NoShift => "Tidak ada shift untuk hari ini".to_string(),
            AttendanceState::Masuk => "Absen Masuk".to_string(),
            AttendanceState::Pulang => "Absen Pulang".to_string(),
            AttendanceState::Selesai => "Absensi hari ini sudah selesai".to_string(),
            AttendanceState::Cuti(leave) => leave.label(),
        }
    }
}
