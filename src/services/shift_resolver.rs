use chrono::NaiveDate;
use std::sync::Arc;

use crate::client::AttendanceApi;
use crate::clock::Clock;
use crate::models::{AttendanceRecord, AttendanceStatus, ShiftMapping, ShiftMappingStatus};
use crate::services::state::AttendanceState;
use crate::services::status::AttendanceStatusTracker;
use crate::session::SessionContext;

/// Result of [`ShiftResolver::resolve_context`]
#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceContext {
    pub state: AttendanceState,
    /// Date of the cycle being worked on; earlier than the requested date
    /// when an unfinished cycle was carried over
    pub date: NaiveDate,
    pub shift: Option<ShiftMapping>,
    /// Shift to submit against; falls back to the open record's shift when
    /// the mapping lookup failed
    pub shift_id: Option<i64>,
    pub open_record: Option<AttendanceRecord>,
    pub carried_over: bool,
}

impl AttendanceContext {
    fn no_shift(date: NaiveDate) -> Self {
        Self {
            state: AttendanceState::NoShift,
            date,
            shift: None,
            shift_id: None,
            open_record: None,
            carried_over: false,
        }
    }
}

pub struct ShiftResolver {
    api: Arc<dyn AttendanceApi>,
    session: SessionContext,
    clock: Arc<dyn Clock>,
}

impl ShiftResolver {
    pub fn new(api: Arc<dyn AttendanceApi>, session: SessionContext, clock: Arc<dyn Clock>) -> Self {
        Self {
            api,
            session,
            clock,
        }
    }

    /// Shift mapped to `employee_id` on `date`. Lookup failures and rejected
    /// mappings both resolve to no shift.
    pub async fn shift_for_date(&self, employee_id: i64, date: NaiveDate) -> Option<ShiftMapping> {
        match self.api.shift_for_date(employee_id, date).await {
            Ok(Some(mapping)) if mapping.status == ShiftMappingStatus::Rejected => {
                log::debug!("Shift mapping {} for {} was rejected", mapping.id, date);
                None
            }
            Ok(mapping) => mapping,
            Err(e) => {
                log::warn!("Shift lookup for employee {} on {} failed: {}", employee_id, date, e);
                None
            }
        }
    }

    /// Work out which cycle the employee is in and what the screen offers.
    ///
    /// Leave, open-record and status lookups run concurrently. Same-day leave
    /// wins over everything. An open record from any date forces clock-out
    /// for that record's date. Otherwise the requested date (default today)
    /// is offered for clock-in. Fetch failures degrade to `NoShift`.
    pub async fn resolve_context(
        &self,
        tracker: &mut AttendanceStatusTracker,
        employee_id: i64,
        requested_date: Option<NaiveDate>,
    ) -> AttendanceContext {
        let requested = requested_date.unwrap_or_else(|| self.clock.today());

        if !self.session.can_act_for(employee_id) {
            log::warn!(
                "Employee {} may not resolve attendance for employee {}",
                self.session.employee_id,
                employee_id
            );
            return AttendanceContext::no_shift(requested);
        }

        let (open, leave, statuses) = tokio::join!(
            tracker.open_attendance(employee_id),
            tracker.leave_today(employee_id),
            tracker.fetch_status_map(employee_id, requested),
        );

        match statuses {
            Ok(map) => tracker.apply_status_map(employee_id, requested, map),
            Err(e) => log::warn!("Status map fetch failed, keeping previous: {}", e),
        }

        match leave {
            Ok(Some(leave)) => {
                log::info!(
                    "Employee {} is on leave today ({}), capture suppressed",
                    employee_id,
                    leave.leave_type
                );
                return AttendanceContext {
                    state: AttendanceState::Cuti(leave),
                    ..AttendanceContext::no_shift(requested)
                };
            }
            Ok(None) => {}
            Err(e) => log::warn!("Leave check failed, continuing without it: {}", e),
        }

        let open = match open {
            Ok(open) => open,
            Err(e) => {
                log::warn!("Open attendance lookup failed: {}", e);
                return AttendanceContext::no_shift(requested);
            }
        };

        match open {
            Some(record) => self.carry_over(employee_id, requested, record).await,
            None => {
                let shift = self.shift_for_date(employee_id, requested).await;
                let Some(mapping) = shift else {
                    return AttendanceContext::no_shift(requested);
                };

                let state = match tracker.status_map().get(requested) {
                    Some(AttendanceStatus::SudahPulang) => AttendanceState::Selesai,
                    _ => AttendanceState::Masuk,
                };

                AttendanceContext {
                    state,
                    date: requested,
                    shift_id: Some(mapping.shift.id),
                    shift: Some(mapping),
                    open_record: None,
                    carried_over: false,
                }
            }
        }
    }

    /// An unfinished cycle must be closed before a new one can start, so the
    /// open record's own date decides the shift, not the requested date.
    async fn carry_over(
        &self,
        employee_id: i64,
        requested: NaiveDate,
        record: AttendanceRecord,
    ) -> AttendanceContext {
        let carried_over = record.date != requested;
        if carried_over {
            log::info!(
                "Employee {} has an unfinished cycle from {}, offering clock-out for it",
                employee_id,
                record.date
            );
        }

        let shift = self.shift_for_date(employee_id, record.date).await;
        let shift_id = shift.as_ref().map(|m| m.shift.id).or(record.shift_id);
        let state = if shift_id.is_some() {
            AttendanceState::Pulang
        } else {
            AttendanceState::NoShift
        };

        AttendanceContext {
            state,
            date: record.date,
            shift,
            shift_id,
            open_record: Some(record),
            carried_over,
        }
    }
}
