mod clock;

pub use clock::{format_time, frame_to_time, time_to_frame, FrameClock, PlaybackState};

/// Sampling rate used to turn playback time into frame indices
pub const DEFAULT_FPS: u32 = 30;

/// Discrete frame number, derived from playback time
pub type FrameIndex = u64;
