pub mod absence;
pub mod face;
pub mod shift_request;
pub mod shift_resolver;
pub mod state;
pub mod status;
pub mod submit;
pub mod workflow;

pub use face::{FaceVerifier, VerifiedPhoto};
pub use shift_request::ShiftRequestManager;
pub use shift_resolver::{AttendanceContext, ShiftResolver};
pub use state::AttendanceState;
pub use status::AttendanceStatusTracker;
pub use submit::{AttendanceSubmitter, Submission, SubmitReceipt};
pub use workflow::{AttendanceWorkflow, StartOutcome, VerificationTicket};
