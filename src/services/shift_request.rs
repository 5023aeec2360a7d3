use chrono::NaiveDate;
use std::sync::Arc;

use crate::client::AttendanceApi;
use crate::clock::Clock;
use crate::error::{AppError, AppResult, Notice};
use crate::models::{
    ApprovalInput, ShiftChangeInput, ShiftMapping, ShiftMappingStatus, StatusMap,
};
use crate::session::SessionContext;

/// Requests, approvals, rejections and deletions of shift mappings.
///
/// Holds the mapping list for one employee. The list is replaced only by a
/// successful [`refresh`](Self::refresh); mutations go to the server and are
/// followed by a refresh instead of being applied locally.
pub struct ShiftRequestManager {
    api: Arc<dyn AttendanceApi>,
    session: SessionContext,
    clock: Arc<dyn Clock>,
    mappings: Vec<ShiftMapping>,
    owner: Option<i64>,
}

impl ShiftRequestManager {
    pub fn new(api: Arc<dyn AttendanceApi>, session: SessionContext, clock: Arc<dyn Clock>) -> Self {
        Self {
            api,
            session,
            clock,
            mappings: Vec::new(),
            owner: None,
        }
    }

    pub fn mappings(&self) -> &[ShiftMapping] {
        &self.mappings
    }

    pub fn find(&self, mapping_id: i64) -> Option<&ShiftMapping> {
        self.mappings.iter().find(|m| m.id == mapping_id)
    }

    pub fn pending(&self) -> impl Iterator<Item = &ShiftMapping> {
        self.mappings
            .iter()
            .filter(|m| m.status == ShiftMappingStatus::Pending)
    }

    pub async fn refresh(&mut self, employee_id: i64) -> AppResult<&[ShiftMapping]> {
        if !self.session.can_act_for(employee_id) {
            return Err(AppError::PermissionDenied(
                "Cannot view another employee's shift mappings".to_string(),
            ));
        }

        let mut mappings = self.api.shift_mappings(employee_id).await.inspect_err(|e| {
            log::warn!("Shift mapping refresh for {} failed: {}", employee_id, e);
        })?;
        mappings.sort_by_key(|m| (m.date, m.id));

        self.mappings = mappings;
        self.owner = Some(employee_id);
        Ok(&self.mappings)
    }

    /// Ask for a different shift on `date`. Past dates and dates already
    /// clocked out are refused before contacting the server.
    pub async fn request_change(
        &mut self,
        mapping_id: i64,
        new_shift_id: i64,
        date: NaiveDate,
        status_map: &StatusMap,
    ) -> AppResult<Notice> {
        let today = self.clock.today();
        if date < today {
            return Err(AppError::Validation(format!(
                "Cannot change the shift of a past date ({})",
                date
            )));
        }

        if status_map.get(date).is_some_and(|s| s.is_complete()) {
            return Err(AppError::Validation(format!(
                "Attendance on {} is already complete",
                date
            )));
        }

        if let Some(mapping) = self.find(mapping_id) {
            if !self.session.can_act_for(mapping.employee_id) {
                return Err(AppError::PermissionDenied(
                    "Cannot request a shift change for another employee".to_string(),
                ));
            }
            if mapping.shift.id == new_shift_id && mapping.date == date {
                return Err(AppError::Validation(
                    "The requested shift is already assigned".to_string(),
                ));
            }
        }

        let input = ShiftChangeInput {
            shift_id: new_shift_id,
            tanggal_mulai: date,
            tanggal_selesai: date,
        };

        log::info!(
            "Employee {} requests shift {} on {} for mapping {}",
            self.session.employee_id,
            new_shift_id,
            date,
            mapping_id
        );
        let message = self.api.request_shift_change(mapping_id, &input).await?;
        self.reload().await;

        Ok(Notice::success(non_empty(message, "Shift change requested")))
    }

    pub async fn approve(&mut self, mapping_id: i64) -> AppResult<Notice> {
        self.decide(mapping_id, ShiftMappingStatus::Approved).await
    }

    pub async fn reject(&mut self, mapping_id: i64) -> AppResult<Notice> {
        self.decide(mapping_id, ShiftMappingStatus::Rejected).await
    }

    /// Hard delete, admins only
    pub async fn delete(&mut self, mapping_id: i64) -> AppResult<Notice> {
        self.session.require_privileged("Deleting a shift mapping")?;

        log::info!(
            "Employee {} deletes shift mapping {}",
            self.session.employee_id,
            mapping_id
        );
        let message = self.api.delete_shift_mapping(mapping_id).await?;
        self.reload().await;

        Ok(Notice::success(non_empty(message, "Shift mapping deleted")))
    }

    async fn decide(&mut self, mapping_id: i64, decision: ShiftMappingStatus) -> AppResult<Notice> {
        let action = match decision {
            ShiftMappingStatus::Approved => "Approving a shift mapping",
            _ => "Rejecting a shift mapping",
        };
        self.session.require_privileged(action)?;

        // The server enforces pending-only as well; a known terminal mapping
        // is refused here without a round trip
        if let Some(mapping) = self.find(mapping_id) {
            if mapping.status.is_terminal() {
                return Err(AppError::InvalidTransition(format!(
                    "Shift mapping {} is already {}",
                    mapping_id, mapping.status
                )));
            }
        }

        let input = ApprovalInput {
            approved_by: self.session.employee_id,
        };

        log::info!(
            "Employee {} marks shift mapping {} as {}",
            self.session.employee_id,
            mapping_id,
            decision
        );
        let result = match decision {
            ShiftMappingStatus::Approved => self.api.approve_shift_mapping(mapping_id, &input).await,
            _ => self.api.reject_shift_mapping(mapping_id, &input).await,
        };

        let message = match result {
            Ok(message) => message,
            Err(e) => {
                log::warn!("Shift mapping {} could not be {}: {}", mapping_id, decision, e);
                // Someone else may have decided it first
                self.reload().await;
                return Err(e);
            }
        };
        self.reload().await;

        Ok(Notice::success(non_empty(
            message,
            &format!("Shift mapping {}", decision),
        )))
    }

    /// Refresh the owned list after a mutation; failure only leaves it stale
    async fn reload(&mut self) {
        if let Some(owner) = self.owner {
            if let Err(e) = self.refresh(owner).await {
                log::warn!("Shift mapping list may be stale: {}", e);
            }
        }
    }
}

fn non_empty(message: String, fallback: &str) -> String {
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}
