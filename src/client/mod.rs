pub mod api;
pub mod http;
pub mod response;

pub use api::AttendanceApi;
pub use http::HttpAttendanceApi;
pub use response::ApiResponse;
