pub mod camera;
pub mod location;

pub use camera::{CameraCapture, CameraDevice, CapturedPhoto, StreamHandle};
pub use location::{LocationProbe, LocationProvider};
