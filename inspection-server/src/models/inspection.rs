//! Inspection request models

use serde::Deserialize;
use validator::Validate;

use damage_core::logic::video::ReplayFrame;
use damage_core::{FrameGeometry, ImageInspection, RawDetection, VideoInspection};

#[derive(Debug, Clone, Copy, Deserialize, Validate)]
pub struct FrameSize {
    #[validate(range(min = 1, message = "frame width must be positive"))]
    pub width: u32,
    #[validate(range(min = 1, message = "frame height must be positive"))]
    pub height: u32,
}

impl From<FrameSize> for FrameGeometry {
    fn from(size: FrameSize) -> Self {
        FrameGeometry::new(size.width, size.height)
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct InspectImageRequest {
    #[validate(length(min = 1, max = 128))]
    pub shipment_id: String,
    #[validate(length(min = 1, max = 512))]
    pub image_name: String,
    #[validate(nested)]
    pub frame: FrameSize,
    #[serde(default)]
    pub detections: Vec<RawDetection>,
}

impl From<InspectImageRequest> for ImageInspection {
    fn from(req: InspectImageRequest) -> Self {
        ImageInspection {
            shipment_id: req.shipment_id,
            image_name: req.image_name,
            frame: req.frame.into(),
            detections: req.detections,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct InspectVideoRequest {
    #[validate(length(min = 1, max = 128))]
    pub shipment_id: String,
    #[validate(length(min = 1, max = 512))]
    pub video_name: String,
    #[validate(nested)]
    pub frame: FrameSize,
    #[serde(default)]
    pub frames: Vec<ReplayFrame>,
}

impl From<InspectVideoRequest> for VideoInspection {
    fn from(req: InspectVideoRequest) -> Self {
        VideoInspection {
            shipment_id: req.shipment_id,
            video_name: req.video_name,
            frame: req.frame.into(),
            frames: req.frames,
        }
    }
}
