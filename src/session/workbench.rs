use super::state::{MaskTicket, Session};
use crate::config::WorkbenchConfig;
use crate::error::{SmartcropError, SmartcropResult};
use crate::geometry::{map_click, DisplayBox, NativeSize, PixelPoint, ViewportPoint};
use crate::overlay::{OverlayCompositor, OverlayFrame, SizeObserver};
use crate::playback::{format_time, frame_to_time};
use crate::segmentation::SegmentationService;

/// Event-loop glue between the view, the session and the remote service
///
/// Each method is one discrete task that runs to completion. The remote calls
/// are the only points that wait; the session is only written once a call
/// has returned.
pub struct Workbench {
    config: WorkbenchConfig,
    service: Box<dyn SegmentationService>,
    session: Session,
    compositor: OverlayCompositor,
}

impl Workbench {
    pub fn new(config: WorkbenchConfig, service: Box<dyn SegmentationService>) -> Self {
        let session = Session::new(config.fps, config.response_policy);
        Self {
            config,
            service,
            session,
            compositor: OverlayCompositor::default(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &WorkbenchConfig {
        &self.config
    }

    /// Register `video_url` with the service and make it the current asset
    ///
    /// On failure the previous asset stays in place and the error is kept as
    /// the session notice as well as returned.
    pub fn load_asset(&mut self, video_url: &str) -> SmartcropResult<()> {
        if !self.session.asset_requested() {
            return Err(SmartcropError::service("an upload is already in progress"));
        }

        tracing::info!("Registering {}", video_url);
        match self.service.upload_video(video_url) {
            Ok(video) => {
                tracing::info!(
                    "Registered as {} ({} frames)",
                    video.video_id,
                    video.total_frames
                );
                self.session.asset_loaded(video_url, video);
                self.compositor.clear();
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Upload failed: {}", e);
                self.session.asset_failed("Video processing failed");
                Err(e)
            }
        }
    }

    /// Start from nothing, as when the user picks a different video
    pub fn change_video(&mut self) {
        self.session = Session::new(self.config.fps, self.config.response_policy);
        self.compositor.clear();
    }

    pub fn metadata_loaded(&mut self, duration: f64, native: Option<NativeSize>) {
        self.session.metadata_loaded(duration, native);
    }

    pub fn play(&mut self) {
        self.session.play();
    }

    pub fn pause(&mut self) {
        self.session.pause();
    }

    pub fn toggle_playback(&mut self) -> bool {
        self.session.toggle_playback()
    }

    pub fn seek(&mut self, t: f64) {
        self.session.seek(t);
    }

    pub fn time_update(&mut self, t: f64) {
        self.session.time_update(t);
    }

    /// Native pixel under `pointer`, clamped into the grid once the size is known
    pub fn map_pointer(&self, pointer: ViewportPoint, display: DisplayBox) -> Option<PixelPoint> {
        if !display.contains(pointer) {
            tracing::debug!("Click at ({}, {}) is outside the video", pointer.x, pointer.y);
            return None;
        }

        let native = self.session.native();
        let point = map_click(pointer, display, native);
        let point = match native {
            Some(native) => point.clamp_to(native),
            None => point,
        };
        tracing::debug!(
            "Click ({:.1}, {:.1}) -> pixel ({}, {}) at frame {}",
            pointer.x,
            pointer.y,
            point.x,
            point.y,
            self.session.frame()
        );
        Some(point)
    }

    /// Synchronous half of a click: map, record and issue the request
    pub fn select(&mut self, pointer: ViewportPoint, display: DisplayBox) -> Option<MaskTicket> {
        let point = self.map_pointer(pointer, display)?;
        self.session.point_selected(point)
    }

    /// Waiting half of a click: fetch the mask and apply it
    ///
    /// Failures are not reported; the mask is simply cleared.
    pub fn fetch_mask(&mut self, ticket: &MaskTicket) -> bool {
        let rows = match self.service.get_mask(&ticket.request) {
            Ok(rows) => Some(rows),
            Err(e) => {
                tracing::debug!("Mask request {} failed: {}", ticket.seq, e);
                None
            }
        };
        self.session.mask_received(ticket, rows)
    }

    /// Full click: select a pixel and fetch its mask
    pub fn click(&mut self, pointer: ViewportPoint, display: DisplayBox) -> Option<PixelPoint> {
        let point = self.map_pointer(pointer, display)?;
        if let Some(ticket) = self.session.point_selected(point) {
            self.fetch_mask(&ticket);
        }
        Some(point)
    }

    /// Request a smart crop of the selected object
    ///
    /// On success the cropped video becomes the current asset and is
    /// registered so it can be masked in turn. Returns the new URL.
    pub fn track_object(&mut self) -> Option<String> {
        let ticket = self.session.crop_requested()?;
        tracing::info!("Requesting smart crop for {}", ticket.video_id);

        let result = self
            .service
            .get_smartcrop(&ticket.video_id)
            .map_err(|e| e.to_string());
        if let Err(e) = &result {
            tracing::warn!("Smart crop failed: {}", e);
        }

        let url = result.as_ref().ok().cloned();
        if !self.session.crop_received(&ticket, result) {
            return None;
        }
        self.compositor.clear();

        let url = url?;
        tracing::info!("Smart crop ready at {}", url);
        if let Err(e) = self.load_asset(&url) {
            tracing::warn!("Could not register cropped video: {}", e);
        }
        Some(url)
    }

    pub fn start_over(&mut self) {
        self.session.start_over();
    }

    /// Current overlay surface, absent when there is nothing to draw
    pub fn render_overlay(&mut self, observer: &dyn SizeObserver) -> Option<&OverlayFrame> {
        self.compositor.update(
            observer,
            self.session.mask(),
            self.session.mask_generation(),
            self.session.native(),
        )
    }

    /// Human-readable line describing the current selection
    pub fn selection_report(&self) -> Option<String> {
        let point = self.session.point()?;
        let frame = self.session.frame();
        let position = format!(
            "Frame ID: {} (starts {}) | Time: {}",
            frame,
            format_time(frame_to_time(frame, self.config.fps)),
            format_time(self.session.playback().current_time)
        );
        Some(format!(
            "Clicked coordinates (top-left origin): X: {}, Y: {} | {}",
            point.x, point.y, position
        ))
    }
}
