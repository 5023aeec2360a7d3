use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::macros::string_enum;

string_enum! {
    /// Progress of one (employee, date) attendance cycle. Ordered so that a
    /// later status always compares greater.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub enum AttendanceStatus {
        BelumMasuk => "belum_masuk",
        SudahMasuk => "sudah_masuk",
        SudahPulang => "sudah_pulang",
    }
}

impl AttendanceStatus {
    /// A cycle is open once clocked in and until clocked out
    pub fn is_open(&self) -> bool {
        matches!(self, AttendanceStatus::SudahMasuk)
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, AttendanceStatus::SudahPulang)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(rename = "pegawai_id", alias = "employee_id")]
    pub employee_id: i64,
    #[serde(rename = "tanggal", alias = "date")]
    pub date: NaiveDate,
    #[serde(default)]
    pub shift_id: Option<i64>,
    pub status: AttendanceStatus,
    #[serde(rename = "lokasi", alias = "location", default)]
    pub location: Option<String>,
    #[serde(rename = "foto", alias = "photo", default)]
    pub photo: Option<String>,
}

/// One row of the per-date status listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEntry {
    #[serde(rename = "tanggal", alias = "date")]
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

/// Per-date attendance status for one employee.
///
/// Dates without an entry have no attendance record at all.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusMap {
    entries: BTreeMap<NaiveDate, AttendanceStatus>,
}

impl StatusMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a listing; when a date repeats the most advanced status wins
    pub fn from_entries(entries: impl IntoIterator<Item = StatusEntry>) -> Self {
        let mut map = Self::new();
        for entry in entries {
            map.insert(entry.date, entry.status);
        }
        map
    }

    pub fn insert(&mut self, date: NaiveDate, status: AttendanceStatus) {
        self.entries
            .entry(date)
            .and_modify(|existing| {
                if status > *existing {
                    *existing = status;
                }
            })
            .or_insert(status);
    }

    pub fn get(&self, date: NaiveDate) -> Option<AttendanceStatus> {
        self.entries.get(&date).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, AttendanceStatus)> + '_ {
        self.entries.iter().map(|(d, s)| (*d, *s))
    }
}
