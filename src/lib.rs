pub mod client;
pub mod clock;
pub mod config;
pub mod device;
pub mod error;
pub mod models;
pub mod services;
pub mod session;

pub use client::{AttendanceApi, HttpAttendanceApi};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use error::{AppError, AppResult, ErrorCategory, Notice, NoticeLevel, RejectReason};
pub use services::{
    AttendanceState, AttendanceWorkflow, FaceVerifier, ShiftRequestManager, ShiftResolver,
};
pub use session::{Role, SessionContext};
