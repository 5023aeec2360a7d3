use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use super::attendance::AttendanceStatus;
use super::macros::string_enum;

string_enum! {
    /// Which attendance flow a capture belongs to
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub enum SubmissionKind {
        #[default]
        Regular => "absensi",
        DinasLuar => "dinas_luar",
    }
}

impl SubmissionKind {
    pub fn endpoint(&self) -> &'static str {
        match self {
            SubmissionKind::Regular => "absensi/auto",
            SubmissionKind::DinasLuar => "dinas-luar/auto",
        }
    }
}

/// Everything the attendance endpoint needs besides the photo bytes
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionForm {
    pub kind: SubmissionKind,
    pub employee_id: i64,
    pub shift_id: i64,
    pub date: NaiveDate,
    /// `"lat,lon"`
    pub location: String,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitResponse {
    #[serde(default)]
    pub message: String,
    /// Resulting record status, when the backend reports it
    #[serde(default)]
    pub status: Option<AttendanceStatus>,
}

/// What the server recorded for a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    ClockedIn,
    ClockedOut,
    /// Neither the status field nor the message says which
    Unrecognized,
}

fn clock_out_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(pulang|clock[- ]?out|check[- ]?out)\b").unwrap())
}

fn clock_in_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(masuk|clock[- ]?in|check[- ]?in)\b").unwrap())
}

impl SubmitResponse {
    /// The structured status wins; the message text is only a fallback.
    ///
    /// A message naming both steps ("Absen masuk berhasil, jangan lupa absen
    /// pulang") is `Unrecognized`, so the caller advances one stage from the
    /// state it submitted in.
    pub fn outcome(&self) -> SubmitOutcome {
        match self.status {
            Some(AttendanceStatus::SudahMasuk) => return SubmitOutcome::ClockedIn,
            Some(AttendanceStatus::SudahPulang) => return SubmitOutcome::ClockedOut,
            Some(AttendanceStatus::BelumMasuk) | None => {}
        }

        match (
            clock_in_marker().is_match(&self.message),
            clock_out_marker().is_match(&self.message),
        ) {
            (true, false) => SubmitOutcome::ClockedIn,
            (false, true) => SubmitOutcome::ClockedOut,
            _ => SubmitOutcome::Unrecognized,
        }
    }
}
