use pretty_assertions::assert_eq;
use std::sync::Arc;

use absensi_client::models::{AttendanceStatus, ShiftMappingStatus, StatusMap};
use absensi_client::{AppError, ErrorCategory, NoticeLevel, SessionContext, ShiftRequestManager};

mod common;
use common::{FakeBackend, MockData, clock, days_ago, today};

fn manager(session: SessionContext, backend: &Arc<FakeBackend>) -> ShiftRequestManager {
    ShiftRequestManager::new(backend.clone(), session, clock())
}

fn tomorrow() -> chrono::NaiveDate {
    today().succ_opt().unwrap()
}

fn backend_with_pending() -> Arc<FakeBackend> {
    FakeBackend::new().with_mapping(MockData::mapping(
        5,
        42,
        tomorrow(),
        MockData::pagi(),
        ShiftMappingStatus::Pending,
    ))
}

#[tokio::test]
async fn test_second_approval_is_refused_locally() {
    common::setup_test_env();
    let backend = backend_with_pending();
    let mut admin = manager(MockData::admin(1), &backend);
    admin.refresh(42).await.unwrap();

    let notice = admin.approve(5).await.unwrap();
    assert_eq!(notice.level, NoticeLevel::Success);
    assert_eq!(
        admin.find(5).map(|m| m.status),
        Some(ShiftMappingStatus::Approved)
    );
    assert_eq!(admin.find(5).and_then(|m| m.approved_by), Some(1));

    let err = admin.approve(5).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition(_)));
    assert!(err.is_recoverable());
    assert_eq!(backend.calls("approve"), 1);
    assert_eq!(
        backend.mapping(5).map(|m| m.status),
        Some(ShiftMappingStatus::Approved)
    );
}

#[tokio::test]
async fn test_second_approval_from_stale_list_fails_on_server() {
    common::setup_test_env();
    let backend = backend_with_pending();
    let mut first = manager(MockData::admin(1), &backend);
    let mut second = manager(MockData::admin(2), &backend);
    first.refresh(42).await.unwrap();
    second.refresh(42).await.unwrap();

    first.approve(5).await.unwrap();
    let err = second.approve(5).await.unwrap_err();

    assert!(matches!(err, AppError::Api { status: 422, .. }));
    assert_eq!(err.category(), ErrorCategory::Transport);
    assert_eq!(err.notice().message, "Shift mapping sudah diproses");
    // the failed attempt reloads, so the list now shows who won
    assert_eq!(
        second.find(5).map(|m| m.status),
        Some(ShiftMappingStatus::Approved)
    );
    assert_eq!(backend.mapping(5).and_then(|m| m.approved_by), Some(1));
}

#[tokio::test]
async fn test_reject_then_approve_is_refused() {
    common::setup_test_env();
    let backend = backend_with_pending();
    let mut admin = manager(MockData::admin(1), &backend);
    admin.refresh(42).await.unwrap();

    admin.reject(5).await.unwrap();

    assert!(admin.approve(5).await.is_err());
    assert_eq!(
        backend.mapping(5).map(|m| m.status),
        Some(ShiftMappingStatus::Rejected)
    );
}

#[tokio::test]
async fn test_employee_cannot_decide_or_delete() {
    common::setup_test_env();
    let backend = backend_with_pending();
    let mut employee = manager(MockData::employee(42), &backend);
    employee.refresh(42).await.unwrap();

    assert!(matches!(
        employee.approve(5).await.unwrap_err(),
        AppError::PermissionDenied(_)
    ));
    assert!(matches!(
        employee.reject(5).await.unwrap_err(),
        AppError::PermissionDenied(_)
    ));
    assert!(matches!(
        employee.delete(5).await.unwrap_err(),
        AppError::PermissionDenied(_)
    ));
    assert_eq!(backend.calls("approve") + backend.calls("reject"), 0);
    assert_eq!(backend.calls("delete"), 0);
}

#[tokio::test]
async fn test_employee_cannot_list_someone_else() {
    common::setup_test_env();
    let backend = backend_with_pending();
    let mut employee = manager(MockData::employee(7), &backend);

    assert!(matches!(
        employee.refresh(42).await.unwrap_err(),
        AppError::PermissionDenied(_)
    ));
    assert_eq!(backend.calls("mappings"), 0);
}

#[tokio::test]
async fn test_request_change_reloads_list() {
    common::setup_test_env();
    let backend = FakeBackend::new().with_mapping(MockData::mapping(
        5,
        42,
        tomorrow(),
        MockData::pagi(),
        ShiftMappingStatus::Approved,
    ));
    let mut employee = manager(MockData::employee(42), &backend);
    employee.refresh(42).await.unwrap();

    let notice = employee
        .request_change(5, 2, tomorrow(), &StatusMap::new())
        .await
        .unwrap();

    assert_eq!(notice.level, NoticeLevel::Success);
    let mapping = employee.find(5).unwrap();
    assert_eq!(mapping.shift.name, "Malam");
    assert_eq!(mapping.status, ShiftMappingStatus::Pending);
    assert_eq!(employee.pending().count(), 1);
}

#[tokio::test]
async fn test_request_change_for_past_date_is_refused() {
    common::setup_test_env();
    let backend = backend_with_pending();
    let mut employee = manager(MockData::employee(42), &backend);

    let err = employee
        .request_change(5, 2, days_ago(1), &StatusMap::new())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(backend.calls("request"), 0);
}

#[tokio::test]
async fn test_request_change_for_completed_day_is_refused() {
    common::setup_test_env();
    let backend = backend_with_pending();
    let mut employee = manager(MockData::employee(42), &backend);
    let mut status_map = StatusMap::new();
    status_map.insert(today(), AttendanceStatus::SudahPulang);

    let err = employee
        .request_change(5, 2, today(), &status_map)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(backend.calls("request"), 0);
}

#[tokio::test]
async fn test_request_for_same_shift_is_refused() {
    common::setup_test_env();
    let backend = backend_with_pending();
    let mut employee = manager(MockData::employee(42), &backend);
    employee.refresh(42).await.unwrap();

    let err = employee
        .request_change(5, 1, tomorrow(), &StatusMap::new())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(backend.calls("request"), 0);
}

#[tokio::test]
async fn test_admin_delete_removes_mapping() {
    common::setup_test_env();
    let backend = backend_with_pending();
    let mut admin = manager(MockData::admin(1), &backend);
    admin.refresh(42).await.unwrap();

    let notice = admin.delete(5).await.unwrap();

    assert_eq!(notice.message, "Shift mapping deleted");
    assert!(admin.mappings().is_empty());
    assert!(matches!(
        admin.delete(5).await.unwrap_err(),
        AppError::NotFound(_)
    ));
}

#[tokio::test]
async fn test_failed_refresh_keeps_previous_list() {
    common::setup_test_env();
    let backend = backend_with_pending();
    let mut admin = manager(MockData::admin(1), &backend);
    admin.refresh(42).await.unwrap();

    backend.clone().failing("mappings");

    assert!(admin.refresh(42).await.is_err());
    assert_eq!(admin.mappings().len(), 1);
}
