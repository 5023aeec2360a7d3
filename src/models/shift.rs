use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::macros::string_enum;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftDefinition {
    pub id: i64,
    #[serde(rename = "nama_shift", alias = "name")]
    pub name: String,
    #[serde(rename = "jam_masuk", alias = "clock_in")]
    pub clock_in: NaiveTime,
    #[serde(rename = "jam_pulang", alias = "clock_out")]
    pub clock_out: NaiveTime,
}

impl ShiftDefinition {
    /// Night shifts end on the calendar day after they start
    pub fn crosses_midnight(&self) -> bool {
        self.clock_out <= self.clock_in
    }
}

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum ShiftMappingStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
    }
}

impl ShiftMappingStatus {
    /// Approved and rejected mappings can no longer change
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ShiftMappingStatus::Pending)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftMapping {
    pub id: i64,
    #[serde(rename = "pegawai_id", alias = "employee_id")]
    pub employee_id: i64,
    #[serde(rename = "tanggal", alias = "date")]
    pub date: NaiveDate,
    pub shift: ShiftDefinition,
    pub status: ShiftMappingStatus,
    #[serde(default)]
    pub requested_by: Option<i64>,
    #[serde(default)]
    pub approved_by: Option<i64>,
}

/// Body of `POST /shift-mapping/request/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftChangeInput {
    pub shift_id: i64,
    pub tanggal_mulai: NaiveDate,
    pub tanggal_selesai: NaiveDate,
}

/// Body of the approve and reject calls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalInput {
    pub approved_by: i64,
}
