use super::FrameIndex;

/// `floor(t * fps)`, clamped to `total_frames - 1` when the frame count is known
///
/// Negative and NaN times count as 0.
pub fn time_to_frame(t: f64, fps: u32, total_frames: Option<u64>) -> FrameIndex {
    let raw = (t.max(0.0) * fps as f64).floor();
    let frame = raw as u64;
    match total_frames {
        Some(total) => frame.min(total.saturating_sub(1)),
        None => frame,
    }
}

/// Start time of `frame` in seconds
pub fn frame_to_time(frame: FrameIndex, fps: u32) -> f64 {
    if fps == 0 {
        return 0.0;
    }
    frame as f64 / fps as f64
}

/// Format seconds as `m:ss.SSS`
pub fn format_time(seconds: f64) -> String {
    let seconds = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
    let minutes = (seconds / 60.0).floor() as u64;
    let secs = (seconds % 60.0).floor() as u64;
    let millis = ((seconds % 1.0) * 1000.0).floor() as u64;
    format!("{minutes}:{secs:02}.{millis:03}")
}

/// Playback position as reported by the video element
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlaybackState {
    pub current_time: f64,
    /// 0 until metadata is loaded
    pub duration: f64,
    pub is_playing: bool,
}

impl PlaybackState {
    pub fn duration_known(&self) -> bool {
        self.duration > 0.0
    }

    fn clamp_time(&self, t: f64) -> f64 {
        let t = if t.is_finite() { t.max(0.0) } else { 0.0 };
        if self.duration_known() {
            t.min(self.duration)
        } else {
            t
        }
    }
}

/// Keeps continuous playback time and the discrete active frame in step
///
/// Time follows every playback tick. The frame is only recomputed when the
/// position comes to rest (pause) or jumps (seek), which is when a click
/// can select a pixel of a stationary frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameClock {
    fps: u32,
    total_frames: Option<u64>,
    state: PlaybackState,
    frame: FrameIndex,
}

impl FrameClock {
    pub fn new(fps: u32) -> Self {
        Self {
            fps,
            total_frames: None,
            state: PlaybackState::default(),
            frame: 0,
        }
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn total_frames(&self) -> Option<u64> {
        self.total_frames
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn frame(&self) -> FrameIndex {
        self.frame
    }

    /// Forget position, duration and frame count for a new asset
    pub fn reset(&mut self, total_frames: Option<u64>) {
        self.total_frames = total_frames;
        self.state = PlaybackState::default();
        self.frame = 0;
    }

    pub fn play(&mut self) {
        self.state.is_playing = true;
    }

    pub fn pause(&mut self) {
        self.state.is_playing = false;
        self.recompute();
        tracing::debug!(
            "Paused at {} (frame {})",
            format_time(self.state.current_time),
            self.frame
        );
    }

    /// Flip between playing and paused, returning the new `is_playing`
    pub fn toggle(&mut self) -> bool {
        if self.state.is_playing {
            self.pause();
        } else {
            self.play();
        }
        self.state.is_playing
    }

    pub fn seek(&mut self, t: f64) {
        self.state.current_time = self.state.clamp_time(t);
        self.recompute();
    }

    /// Continuous tick during playback; the active frame is left alone
    pub fn time_update(&mut self, t: f64) {
        self.state.current_time = self.state.clamp_time(t);
    }

    pub fn metadata_loaded(&mut self, duration: f64) {
        self.state.duration = if duration.is_finite() {
            duration.max(0.0)
        } else {
            0.0
        };
    }

    fn recompute(&mut self) {
        self.frame = time_to_frame(self.state.current_time, self.fps, self.total_frames);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::DEFAULT_FPS;

    #[test]
    fn pause_frame_is_floor_of_time_times_fps() {
        assert_eq!(time_to_frame(2.033, DEFAULT_FPS, None), 60);
    }

    #[test]
    fn known_frame_count_clamps() {
        assert_eq!(time_to_frame(3.5, DEFAULT_FPS, Some(90)), 89);
        for i in 0..1000 {
            let t = i as f64 * 0.173;
            assert!(time_to_frame(t, DEFAULT_FPS, Some(90)) <= 89);
        }
    }

    #[test]
    fn monotonic_in_time() {
        let mut last = 0;
        for i in 0..2000 {
            let t = i as f64 * 0.0037;
            let f = time_to_frame(t, DEFAULT_FPS, Some(120));
            assert!(f >= last);
            last = f;
        }
    }

    #[test]
    fn negative_time_is_frame_zero() {
        assert_eq!(time_to_frame(-1.0, DEFAULT_FPS, None), 0);
        assert_eq!(time_to_frame(f64::NAN, DEFAULT_FPS, None), 0);
    }

    #[test]
    fn frame_to_time_is_start_of_frame() {
        assert_eq!(frame_to_time(60, 30), 2.0);
        assert_eq!(frame_to_time(45, 30), 1.5);
        assert_eq!(frame_to_time(5, 0), 0.0);
    }

    #[test]
    fn formats_minutes_seconds_millis() {
        assert_eq!(format_time(0.0), "0:00.000");
        assert_eq!(format_time(75.25), "1:15.250");
        assert_eq!(format_time(-3.0), "0:00.000");
    }

    #[test]
    fn time_update_does_not_move_frame() {
        let mut clock = FrameClock::new(DEFAULT_FPS);
        clock.metadata_loaded(10.0);
        clock.play();
        clock.time_update(1.0);
        clock.time_update(2.0);
        assert_eq!(clock.state().current_time, 2.0);
        assert_eq!(clock.frame(), 0);

        clock.pause();
        assert!(!clock.state().is_playing);
        assert_eq!(clock.frame(), 60);
    }

    #[test]
    fn seek_recomputes_immediately() {
        let mut clock = FrameClock::new(DEFAULT_FPS);
        clock.reset(Some(90));
        clock.metadata_loaded(3.0);
        clock.seek(1.5);
        assert_eq!(clock.frame(), 45);

        clock.seek(3.5);
        assert_eq!(clock.state().current_time, 3.0);
        assert_eq!(clock.frame(), 89);
    }

    #[test]
    fn seek_before_metadata_is_unclamped_in_time() {
        let mut clock = FrameClock::new(DEFAULT_FPS);
        clock.seek(3.5);
        assert_eq!(clock.state().current_time, 3.5);
        assert_eq!(clock.frame(), 105);
    }

    #[test]
    fn metadata_keeps_time_and_frame() {
        let mut clock = FrameClock::new(DEFAULT_FPS);
        clock.seek(1.0);
        clock.metadata_loaded(12.0);
        assert_eq!(clock.state().current_time, 1.0);
        assert_eq!(clock.frame(), 30);
        assert_eq!(clock.state().duration, 12.0);
    }

    #[test]
    fn toggle_flips_playing() {
        let mut clock = FrameClock::new(DEFAULT_FPS);
        assert!(clock.toggle());
        clock.time_update(0.5);
        assert!(!clock.toggle());
        assert_eq!(clock.frame(), 15);
    }

    #[test]
    fn reset_clears_position() {
        let mut clock = FrameClock::new(DEFAULT_FPS);
        clock.metadata_loaded(5.0);
        clock.seek(2.0);
        clock.reset(Some(10));
        assert_eq!(clock.state(), PlaybackState::default());
        assert_eq!(clock.frame(), 0);
        assert_eq!(clock.total_frames(), Some(10));
    }
}
