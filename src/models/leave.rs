use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Approved leave (cuti) covering the current day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveRecord {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(rename = "jenis_cuti", alias = "leave_type")]
    pub leave_type: String,
    #[serde(default)]
    pub tanggal_mulai: Option<NaiveDate>,
    #[serde(default)]
    pub tanggal_selesai: Option<NaiveDate>,
    #[serde(default)]
    pub keterangan: Option<String>,
}

impl LeaveRecord {
    /// Read-only banner shown instead of the capture controls
    pub fn label(&self) -> String {
        format!("Hari ini Anda {}", self.leave_type.trim())
    }
}
