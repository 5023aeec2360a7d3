#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveTime};
use fake::Fake;
use fake::faker::name::en::Name;
use std::collections::HashMap;
use std::env;
use std::sync::{Arc, Mutex};

use absensi_client::client::AttendanceApi;
use absensi_client::device::{CameraDevice, LocationProvider, StreamHandle};
use absensi_client::models::*;
use absensi_client::{
    AppError, AppResult, AttendanceWorkflow, Clock, Config, FixedClock, Role, SessionContext,
};

pub fn setup_test_env() {
    unsafe {
        env::set_var("RUST_LOG", "debug");
    }
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

pub fn days_ago(n: i64) -> NaiveDate {
    today() - Duration::days(n)
}

pub fn clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock::on(today()))
}

// Mock data generators
pub struct MockData;

impl MockData {
    pub fn employee(id: i64) -> SessionContext {
        SessionContext::new(id, Name().fake::<String>(), Role::Employee).with_company(1)
    }

    pub fn admin(id: i64) -> SessionContext {
        SessionContext::new(id, Name().fake::<String>(), Role::Admin).with_company(1)
    }

    pub fn pagi() -> ShiftDefinition {
        ShiftDefinition {
            id: 1,
            name: "Pagi".to_string(),
            clock_in: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            clock_out: NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
        }
    }

    pub fn malam() -> ShiftDefinition {
        ShiftDefinition {
            id: 2,
            name: "Malam".to_string(),
            clock_in: NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
            clock_out: NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
        }
    }

    pub fn mapping(
        id: i64,
        employee_id: i64,
        date: NaiveDate,
        shift: ShiftDefinition,
        status: ShiftMappingStatus,
    ) -> ShiftMapping {
        ShiftMapping {
            id,
            employee_id,
            date,
            shift,
            status,
            requested_by: None,
            approved_by: None,
        }
    }

    pub fn open_record(employee_id: i64, date: NaiveDate, shift_id: i64) -> AttendanceRecord {
        AttendanceRecord {
            id: Some(100),
            employee_id,
            date,
            shift_id: Some(shift_id),
            status: AttendanceStatus::SudahMasuk,
            location: Some("-6.2,106.8".to_string()),
            photo: None,
        }
    }

    pub fn leave(kind: &str) -> LeaveRecord {
        LeaveRecord {
            id: Some(3),
            leave_type: kind.to_string(),
            tanggal_mulai: Some(today()),
            tanggal_selesai: Some(today()),
            keterangan: None,
        }
    }

    pub fn verify_match(identity: i64) -> FaceVerifyResponse {
        FaceVerifyResponse {
            success: true,
            matched_identity: Some(identity),
            score: Some(0.93),
            message: None,
        }
    }

    pub fn jpeg() -> Vec<u8> {
        vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0xFF, 0xD9]
    }
}

#[derive(Default)]
struct BackendState {
    active: HashMap<i64, AttendanceRecord>,
    leave: Option<LeaveRecord>,
    mappings: Vec<ShiftMapping>,
    shifts: Vec<ShiftDefinition>,
    status: Vec<StatusEntry>,
    verify: Vec<AppResult<FaceVerifyResponse>>,
    submit_status_field: bool,
    stall_next_submit: bool,
    replies: Vec<SubmitResponse>,
    submissions: Vec<SubmissionForm>,
    calls: HashMap<&'static str, usize>,
    failing: Vec<&'static str>,
}

/// In-memory stand-in for the attendance backend.
///
/// Mirrors the server rules the client relies on: clock-in vs clock-out is
/// inferred from the open record, and mapping decisions are pending-only.
#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<BackendState>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        let backend = Self::default();
        backend.state.lock().unwrap().shifts = vec![MockData::pagi(), MockData::malam()];
        Arc::new(backend)
    }

    pub fn with_mapping(self: Arc<Self>, mapping: ShiftMapping) -> Arc<Self> {
        self.state.lock().unwrap().mappings.push(mapping);
        self
    }

    pub fn with_open_record(self: Arc<Self>, record: AttendanceRecord) -> Arc<Self> {
        self.state
            .lock()
            .unwrap()
            .active
            .insert(record.employee_id, record);
        self
    }

    pub fn with_leave(self: Arc<Self>, leave: LeaveRecord) -> Arc<Self> {
        self.state.lock().unwrap().leave = Some(leave);
        self
    }

    pub fn with_status(self: Arc<Self>, date: NaiveDate, status: AttendanceStatus) -> Arc<Self> {
        self.state
            .lock()
            .unwrap()
            .status
            .push(StatusEntry { date, status });
        self
    }

    /// Queue verification answers, consumed in order; when the queue is
    /// empty the backend matches whoever is asking for employee 42
    pub fn with_verify(self: Arc<Self>, answer: AppResult<FaceVerifyResponse>) -> Arc<Self> {
        self.state.lock().unwrap().verify.push(answer);
        self
    }

    /// Report the resulting status as a structured field
    pub fn with_structured_status(self: Arc<Self>) -> Arc<Self> {
        self.state.lock().unwrap().submit_status_field = true;
        self
    }

    /// The next submission hangs until the caller gives up on it
    pub fn stalling_submit(self: Arc<Self>) -> Arc<Self> {
        self.state.lock().unwrap().stall_next_submit = true;
        self
    }

    /// Answer the next submission with `reply` instead of the default
    /// message; the record is still opened or closed as usual
    pub fn with_submit_reply(self: Arc<Self>, reply: SubmitResponse) -> Arc<Self> {
        self.state.lock().unwrap().replies.push(reply);
        self
    }

    /// Make the named endpoint fail with a transport error
    pub fn failing(self: Arc<Self>, endpoint: &'static str) -> Arc<Self> {
        self.state.lock().unwrap().failing.push(endpoint);
        self
    }

    pub fn calls(&self, endpoint: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .get(endpoint)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.state.lock().unwrap().calls.values().sum()
    }

    pub fn submissions(&self) -> Vec<SubmissionForm> {
        self.state.lock().unwrap().submissions.clone()
    }

    pub fn mapping(&self, id: i64) -> Option<ShiftMapping> {
        self.state
            .lock()
            .unwrap()
            .mappings
            .iter()
            .find(|m| m.id == id)
            .cloned()
    }

    fn hit(&self, endpoint: &'static str) -> AppResult<()> {
        let mut state = self.state.lock().unwrap();
        *state.calls.entry(endpoint).or_insert(0) += 1;
        if state.failing.contains(&endpoint) {
            return Err(AppError::Transport(format!("{} unreachable", endpoint)));
        }
        Ok(())
    }

    fn decide(&self, mapping_id: i64, input: &ApprovalInput, to: ShiftMappingStatus) -> AppResult<String> {
        let mut state = self.state.lock().unwrap();
        let mapping = state
            .mappings
            .iter_mut()
            .find(|m| m.id == mapping_id)
            .ok_or_else(|| AppError::NotFound("Shift mapping tidak ditemukan".to_string()))?;

        if mapping.status != ShiftMappingStatus::Pending {
            return Err(AppError::api(422, "Shift mapping sudah diproses"));
        }

        mapping.status = to;
        mapping.approved_by = Some(input.approved_by);
        Ok(format!("Shift mapping {}", to))
    }
}

#[async_trait]
impl AttendanceApi for FakeBackend {
    async fn active_attendance(&self, employee_id: i64) -> AppResult<Option<AttendanceRecord>> {
        self.hit("active")?;
        Ok(self.state.lock().unwrap().active.get(&employee_id).cloned())
    }

    async fn shift_for_date(
        &self,
        employee_id: i64,
        date: NaiveDate,
    ) -> AppResult<Option<ShiftMapping>> {
        self.hit("shift_by_date")?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .mappings
            .iter()
            .find(|m| m.employee_id == employee_id && m.date == date)
            .cloned())
    }

    async fn leave_today(&self, _employee_id: i64) -> AppResult<Option<LeaveRecord>> {
        self.hit("leave")?;
        Ok(self.state.lock().unwrap().leave.clone())
    }

    async fn status_entries(
        &self,
        _employee_id: i64,
        _month: NaiveDate,
    ) -> AppResult<Vec<StatusEntry>> {
        self.hit("status")?;
        Ok(self.state.lock().unwrap().status.clone())
    }

    async fn verify_face(&self, jpeg: &[u8]) -> AppResult<FaceVerifyResponse> {
        self.hit("verify")?;
        assert!(jpeg.starts_with(&[0xFF, 0xD8]), "verify called without a JPEG");
        let mut state = self.state.lock().unwrap();
        if state.verify.is_empty() {
            return Ok(MockData::verify_match(42));
        }
        state.verify.remove(0)
    }

    async fn submit_attendance(
        &self,
        form: &SubmissionForm,
        _jpeg: &[u8],
    ) -> AppResult<SubmitResponse> {
        self.hit("submit")?;
        let stall = std::mem::take(&mut self.state.lock().unwrap().stall_next_submit);
        if stall {
            tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
        }

        let mut state = self.state.lock().unwrap();
        state.submissions.push(form.clone());
        let reply = (!state.replies.is_empty()).then(|| state.replies.remove(0));

        let structured = state.submit_status_field;
        let open = state.active.remove(&form.employee_id);
        let (message, status) = match open {
            Some(_) => ("Absen pulang berhasil", AttendanceStatus::SudahPulang),
            None => {
                state.active.insert(
                    form.employee_id,
                    AttendanceRecord {
                        id: Some(200),
                        employee_id: form.employee_id,
                        date: form.date,
                        shift_id: Some(form.shift_id),
                        status: AttendanceStatus::SudahMasuk,
                        location: Some(form.location.clone()),
                        photo: Some("foto/absen.jpg".to_string()),
                    },
                );
                ("Absen masuk berhasil", AttendanceStatus::SudahMasuk)
            }
        };

        if let Some(reply) = reply {
            return Ok(reply);
        }

        Ok(SubmitResponse {
            message: if structured { "Berhasil".to_string() } else { message.to_string() },
            status: structured.then_some(status),
        })
    }

    async fn shift_mappings(&self, employee_id: i64) -> AppResult<Vec<ShiftMapping>> {
        self.hit("mappings")?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .mappings
            .iter()
            .filter(|m| m.employee_id == employee_id)
            .cloned()
            .collect())
    }

    async fn request_shift_change(
        &self,
        mapping_id: i64,
        input: &ShiftChangeInput,
    ) -> AppResult<String> {
        self.hit("request")?;
        let mut state = self.state.lock().unwrap();
        let shift = state
            .shifts
            .iter()
            .find(|s| s.id == input.shift_id)
            .cloned()
            .ok_or_else(|| AppError::api(422, "Shift tidak valid"))?;
        let mapping = state
            .mappings
            .iter_mut()
            .find(|m| m.id == mapping_id)
            .ok_or_else(|| AppError::NotFound("Shift mapping tidak ditemukan".to_string()))?;

        mapping.shift = shift;
        mapping.date = input.tanggal_mulai;
        mapping.status = ShiftMappingStatus::Pending;
        mapping.requested_by = Some(mapping.employee_id);
        mapping.approved_by = None;
        Ok("Permintaan perubahan shift dikirim".to_string())
    }

    async fn approve_shift_mapping(
        &self,
        mapping_id: i64,
        input: &ApprovalInput,
    ) -> AppResult<String> {
        self.hit("approve")?;
        self.decide(mapping_id, input, ShiftMappingStatus::Approved)
    }

    async fn reject_shift_mapping(
        &self,
        mapping_id: i64,
        input: &ApprovalInput,
    ) -> AppResult<String> {
        self.hit("reject")?;
        self.decide(mapping_id, input, ShiftMappingStatus::Rejected)
    }

    async fn delete_shift_mapping(&self, mapping_id: i64) -> AppResult<String> {
        self.hit("delete")?;
        let mut state = self.state.lock().unwrap();
        let before = state.mappings.len();
        state.mappings.retain(|m| m.id != mapping_id);
        if state.mappings.len() == before {
            return Err(AppError::NotFound("Shift mapping tidak ditemukan".to_string()));
        }
        Ok(String::new())
    }
}

/// Camera that tracks which tracks are still live
#[derive(Default)]
pub struct FakeCamera {
    opened: Mutex<u64>,
    live: Mutex<Vec<(u64, u32)>>,
    pub deny: bool,
}

impl FakeCamera {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn denied() -> Arc<Self> {
        Arc::new(Self {
            deny: true,
            ..Self::default()
        })
    }

    pub fn live_tracks(&self) -> usize {
        self.live.lock().unwrap().len()
    }

    pub fn times_opened(&self) -> u64 {
        *self.opened.lock().unwrap()
    }
}

#[async_trait]
impl CameraDevice for FakeCamera {
    async fn open(&self) -> AppResult<StreamHandle> {
        if self.deny {
            return Err(AppError::DeviceUnavailable("camera permission denied".to_string()));
        }
        let mut opened = self.opened.lock().unwrap();
        *opened += 1;
        let handle = StreamHandle {
            stream_id: *opened,
            track_ids: vec![1],
        };
        self.live.lock().unwrap().push((handle.stream_id, 1));
        Ok(handle)
    }

    fn grab_jpeg(&self, _stream: &StreamHandle, _quality: u8) -> AppResult<Vec<u8>> {
        Ok(MockData::jpeg())
    }

    fn stop_track(&self, stream: &StreamHandle, track_id: u32) {
        self.live
            .lock()
            .unwrap()
            .retain(|t| *t != (stream.stream_id, track_id));
    }
}

pub struct FakeLocation {
    sample: Option<GeolocationSample>,
}

impl FakeLocation {
    pub fn at(latitude: f64, longitude: f64) -> Arc<Self> {
        Arc::new(Self {
            sample: Some(GeolocationSample::new(latitude, longitude)),
        })
    }

    pub fn denied() -> Arc<Self> {
        Arc::new(Self { sample: None })
    }
}

#[async_trait]
impl LocationProvider for FakeLocation {
    async fn current_position(&self) -> AppResult<GeolocationSample> {
        self.sample
            .clone()
            .ok_or_else(|| AppError::DeviceUnavailable("location permission denied".to_string()))
    }
}

pub fn workflow(
    session: SessionContext,
    backend: Arc<FakeBackend>,
    camera: Arc<FakeCamera>,
    location: Arc<FakeLocation>,
) -> AttendanceWorkflow {
    AttendanceWorkflow::new(&Config::default(), session, backend, camera, location, clock())
}
