//! Frame-synchronized click-to-mask pipeline.
//!
//! A click over a scaled video element is mapped to native pixel coordinates,
//! paired with the frame the playback clock settled on, and sent to a remote
//! segmentation service. The returned mask is rasterized and composited as an
//! overlay registered with the displayed video.

pub mod capture;
pub mod config;
pub mod error;
pub mod geometry;
pub mod output;
pub mod overlay;
pub mod playback;
pub mod segmentation;
pub mod session;
