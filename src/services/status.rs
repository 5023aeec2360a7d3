use chrono::NaiveDate;
use std::sync::Arc;

use crate::client::AttendanceApi;
use crate::error::{AppError, AppResult};
use crate::models::{AttendanceRecord, LeaveRecord, StatusMap};
use crate::session::SessionContext;

/// Fetches open-attendance state, same-day leave, and the per-date status map.
///
/// The status map is owned here and replaced only by a successful
/// [`refresh_status_map`](Self::refresh_status_map).
pub struct AttendanceStatusTracker {
    api: Arc<dyn AttendanceApi>,
    session: SessionContext,
    status_map: StatusMap,
    loaded_month: Option<NaiveDate>,
}

impl AttendanceStatusTracker {
    pub fn new(api: Arc<dyn AttendanceApi>, session: SessionContext) -> Self {
        Self {
            api,
            session,
            status_map: StatusMap::new(),
            loaded_month: None,
        }
    }

    /// The not-yet-clocked-out record for `employee_id`, whatever its date.
    /// A record the server returns that is not actually open is ignored.
    pub async fn open_attendance(&self, employee_id: i64) -> AppResult<Option<AttendanceRecord>> {
        let record = self.api.active_attendance(employee_id).await?;
        Ok(record.filter(|r| {
            let open = r.status.is_open();
            if !open {
                log::debug!(
                    "Ignoring active-attendance record for {} with status {}",
                    r.date,
                    r.status
                );
            }
            open
        }))
    }

    pub async fn leave_today(&self, employee_id: i64) -> AppResult<Option<LeaveRecord>> {
        self.api.leave_today(employee_id).await
    }

    /// Fetch the status map for the month containing `month` without
    /// touching the one held here
    pub async fn fetch_status_map(&self, employee_id: i64, month: NaiveDate) -> AppResult<StatusMap> {
        if !self.session.can_act_for(employee_id) {
            return Err(AppError::PermissionDenied(
                "Cannot view another employee's attendance history".to_string(),
            ));
        }
        let entries = self.api.status_entries(employee_id, month).await?;
        Ok(StatusMap::from_entries(entries))
    }

    /// Install a freshly fetched map
    pub fn apply_status_map(&mut self, employee_id: i64, month: NaiveDate, map: StatusMap) {
        log::debug!(
            "Status map refreshed for employee {} ({} dates)",
            employee_id,
            map.len()
        );
        self.status_map = map;
        self.loaded_month = Some(month);
    }

    /// Reload the status map for the month containing `month`.
    /// On failure the previous map is kept untouched.
    pub async fn refresh_status_map(
        &mut self,
        employee_id: i64,
        month: NaiveDate,
    ) -> AppResult<&StatusMap> {
        let map = self
            .fetch_status_map(employee_id, month)
            .await
            .inspect_err(|e| log::warn!("Status map refresh failed: {}", e))?;

        self.apply_status_map(employee_id, month, map);
        Ok(&self.status_map)
    }

    pub fn status_map(&self) -> &StatusMap {
        &self.status_map
    }

    pub fn loaded_month(&self) -> Option<NaiveDate> {
        self.loaded_month
    }
}
