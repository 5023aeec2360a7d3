pub mod attendance;
pub mod leave;
pub mod location;
pub mod macros;
pub mod shift;
pub mod submission;
pub mod verification;

// Re-export all models for easy importing
pub use attendance::*;
pub use leave::*;
pub use location::*;
pub use shift::*;
pub use submission::*;
pub use verification::*;
