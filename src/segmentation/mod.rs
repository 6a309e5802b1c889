mod rasterize;
mod remote;
pub mod types;

pub use rasterize::{MaskRasterizer, RasterizedMask, FILL_COLOR, OUTLINE_COLOR, OUTLINE_WIDTH};
pub use remote::RemoteService;
pub use types::{Mask, MaskRequest, SegmentationService, UploadedVideo};

use crate::error::SmartcropResult;

/// Create the default service client (HTTP)
pub fn create_default_service(base_url: &str) -> SmartcropResult<Box<dyn SegmentationService>> {
    let service = RemoteService::new(base_url)?;
    Ok(Box::new(service))
}
