use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use uuid::Uuid;

use crate::client::api::AttendanceApi;
use crate::client::response::ApiResponse;
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{
    ApprovalInput, AttendanceRecord, FaceVerifyResponse, LeaveRecord, ShiftChangeInput,
    ShiftMapping, StatusEntry, SubmissionForm, SubmitResponse,
};

const USER_AGENT: &str = concat!("absensi-client/", env!("CARGO_PKG_VERSION"));
const CORRELATION_HEADER: &str = "X-Correlation-ID";
const PHOTO_FILE_NAME: &str = "absen.jpg";

/// reqwest-backed implementation of [`AttendanceApi`]
#[derive(Clone)]
pub struct HttpAttendanceApi {
    http_client: reqwest::Client,
    base_url: String,
    verify_timeout: Duration,
    submit_timeout: Duration,
}

impl HttpAttendanceApi {
    pub fn new(config: &Config) -> AppResult<Self> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &config.api_token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| AppError::Config(format!("invalid API_TOKEN: {}", e)))?;
            headers.insert(AUTHORIZATION, value);
        }

        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| AppError::Config(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: config.api_base_url.clone(),
            verify_timeout: config.verify_timeout(),
            submit_timeout: config.submit_timeout(),
        })
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    fn tagged(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header(CORRELATION_HEADER, Uuid::new_v4().to_string())
    }

    async fn get_data<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> AppResult<Option<T>> {
        log::debug!("GET {}", path);

        let response = self
            .tagged(self.http_client.get(self.url(path)).query(query))
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        Ok(decode_envelope::<T>(status, &body)?.data)
    }

    async fn send_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> AppResult<String> {
        log::debug!("POST {}", path);

        let response = self
            .tagged(self.http_client.post(self.url(path)).json(body))
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;

        Ok(decode_envelope::<serde_json::Value>(status, &text)?.message_or(""))
    }
}

pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Decode an enveloped body, turning HTTP and envelope failures into errors
pub(crate) fn decode_envelope<T: DeserializeOwned>(
    status: StatusCode,
    body: &str,
) -> AppResult<ApiResponse<T>> {
    if !status.is_success() {
        return Err(error_from_body(status, body));
    }

    if body.trim().is_empty() {
        return Ok(ApiResponse {
            success: None,
            data: None,
            message: None,
        });
    }

    let envelope: ApiResponse<T> = serde_json::from_str(body)?;
    if envelope.is_failure() {
        return Err(AppError::api(
            status.as_u16(),
            envelope.message_or("Request was rejected"),
        ));
    }

    Ok(envelope)
}

/// Decode a bare (non-enveloped) body
pub(crate) fn decode_bare<T: DeserializeOwned>(status: StatusCode, body: &str) -> AppResult<T> {
    if !status.is_success() {
        return Err(error_from_body(status, body));
    }
    Ok(serde_json::from_str(body)?)
}

fn error_from_body(status: StatusCode, body: &str) -> AppError {
    let message = serde_json::from_str::<ApiResponse<serde_json::Value>>(body)
        .ok()
        .and_then(|envelope| envelope.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        });

    log::warn!("Request failed with status {}: {}", status, message);

    if status == StatusCode::NOT_FOUND {
        AppError::NotFound(message)
    } else if status == StatusCode::FORBIDDEN || status == StatusCode::UNAUTHORIZED {
        AppError::PermissionDenied(message)
    } else {
        AppError::api(status.as_u16(), message)
    }
}

fn photo_part(jpeg: &[u8]) -> AppResult<Part> {
    Ok(Part::bytes(jpeg.to_vec())
        .file_name(PHOTO_FILE_NAME)
        .mime_str("image/jpeg")?)
}

#[async_trait]
impl AttendanceApi for HttpAttendanceApi {
    async fn active_attendance(&self, employee_id: i64) -> AppResult<Option<AttendanceRecord>> {
        self.get_data(&format!("absensi/aktif/{}", employee_id), &[])
            .await
    }

    async fn shift_for_date(
        &self,
        employee_id: i64,
        date: NaiveDate,
    ) -> AppResult<Option<ShiftMapping>> {
        self.get_data(
            &format!("shift-mapping/by-date/{}", employee_id),
            &[("tanggal", date.format("%Y-%m-%d").to_string())],
        )
        .await
    }

    async fn leave_today(&self, employee_id: i64) -> AppResult<Option<LeaveRecord>> {
        self.get_data(&format!("cuti/check-today/{}", employee_id), &[])
            .await
    }

    async fn status_entries(
        &self,
        employee_id: i64,
        month: NaiveDate,
    ) -> AppResult<Vec<StatusEntry>> {
        let entries = self
            .get_data::<Vec<StatusEntry>>(
                &format!("absensi/status/{}", employee_id),
                &[("bulan", month.format("%Y-%m").to_string())],
            )
            .await?;
        Ok(entries.unwrap_or_default())
    }

    async fn verify_face(&self, jpeg: &[u8]) -> AppResult<FaceVerifyResponse> {
        log::debug!("POST face/verify ({} bytes)", jpeg.len());

        let form = Form::new().part("file", photo_part(jpeg)?);
        let response = self
            .tagged(self.http_client.post(self.url("face/verify")))
            .timeout(self.verify_timeout)
            .multipart(form)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        decode_bare(status, &body)
    }

    async fn submit_attendance(
        &self,
        form: &SubmissionForm,
        jpeg: &[u8],
    ) -> AppResult<SubmitResponse> {
        let path = form.kind.endpoint();
        log::debug!("POST {} ({} bytes)", path, jpeg.len());

        let mut multipart = Form::new()
            .text("pegawai_id", form.employee_id.to_string())
            .text("shift_id", form.shift_id.to_string())
            .text("tanggal", form.date.format("%Y-%m-%d").to_string())
            .text("lokasi", form.location.clone());
        if let Some(note) = &form.note {
            multipart = multipart.text("keterangan", note.clone());
        }
        let multipart = multipart.part("foto", photo_part(jpeg)?);

        let response = self
            .tagged(self.http_client.post(self.url(path)))
            .timeout(self.submit_timeout)
            .multipart(multipart)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        decode_bare(status, &body)
    }

    async fn shift_mappings(&self, employee_id: i64) -> AppResult<Vec<ShiftMapping>> {
        let mappings = self
            .get_data::<Vec<ShiftMapping>>(&format!("shift-mapping/pegawai/{}", employee_id), &[])
            .await?;
        Ok(mappings.unwrap_or_default())
    }

    async fn request_shift_change(
        &self,
        mapping_id: i64,
        input: &ShiftChangeInput,
    ) -> AppResult<String> {
        self.send_json(&format!("shift-mapping/request/{}", mapping_id), input)
            .await
    }

    async fn approve_shift_mapping(
        &self,
        mapping_id: i64,
        input: &ApprovalInput,
    ) -> AppResult<String> {
        self.send_json(&format!("shift-mapping/approve/{}", mapping_id), input)
            .await
    }

    async fn reject_shift_mapping(
        &self,
        mapping_id: i64,
        input: &ApprovalInput,
    ) -> AppResult<String> {
        self.send_json(&format!("shift-mapping/reject/{}", mapping_id), input)
            .await
    }

    async fn delete_shift_mapping(&self, mapping_id: i64) -> AppResult<String> {
        let path = format!("shift-mapping/{}", mapping_id);
        log::debug!("DELETE {}", path);

        let response = self
            .tagged(self.http_client.delete(self.url(&path)))
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        Ok(decode_envelope::<serde_json::Value>(status, &body)?.message_or(""))
    }
}
