//! Request / response models

pub mod inspection;
pub mod alert;

pub use inspection::{FrameSize, InspectImageRequest, InspectVideoRequest};
pub use alert::{ClassifyRequest, ClassifyResponse};
