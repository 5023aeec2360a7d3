use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::AppResult;
use crate::models::{
    ApprovalInput, AttendanceRecord, FaceVerifyResponse, LeaveRecord, ShiftChangeInput,
    ShiftMapping, StatusEntry, SubmissionForm, SubmitResponse,
};

/// The backend calls this core depends on.
///
/// `HttpAttendanceApi` is the production implementation; the services only
/// ever see this trait so tests and alternate transports can stand in.
#[async_trait]
pub trait AttendanceApi: Send + Sync {
    /// `GET /absensi/aktif/{employee_id}`: the not-yet-clocked-out record, any date
    async fn active_attendance(&self, employee_id: i64) -> AppResult<Option<AttendanceRecord>>;

    /// `GET /shift-mapping/by-date/{employee_id}?tanggal=`
    async fn shift_for_date(
        &self,
        employee_id: i64,
        date: NaiveDate,
    ) -> AppResult<Option<ShiftMapping>>;

    /// `GET /cuti/check-today/{employee_id}`
    async fn leave_today(&self, employee_id: i64) -> AppResult<Option<LeaveRecord>>;

    /// `GET /absensi/status/{employee_id}?bulan=YYYY-MM`
    async fn status_entries(&self, employee_id: i64, month: NaiveDate)
    -> AppResult<Vec<StatusEntry>>;

    /// `POST /face/verify`
    async fn verify_face(&self, jpeg: &[u8]) -> AppResult<FaceVerifyResponse>;

    /// `POST /absensi/auto` or `POST /dinas-luar/auto`
    async fn submit_attendance(&self, form: &SubmissionForm, jpeg: &[u8])
    -> AppResult<SubmitResponse>;

    /// `GET /shift-mapping/pegawai/{employee_id}`
    async fn shift_mappings(&self, employee_id: i64) -> AppResult<Vec<ShiftMapping>>;

    /// Returns the server's confirmation message
    async fn request_shift_change(
        &self,
        mapping_id: i64,
        input: &ShiftChangeInput,
    ) -> AppResult<String>;

    async fn approve_shift_mapping(&self, mapping_id: i64, input: &ApprovalInput)
    -> AppResult<String>;

    async fn reject_shift_mapping(&self, mapping_id: i64, input: &ApprovalInput)
    -> AppResult<String>;

    async fn delete_shift_mapping(&self, mapping_id: i64) -> AppResult<String>;
}
