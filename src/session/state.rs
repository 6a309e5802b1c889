use crate::config::ResponsePolicy;
use crate::geometry::{NativeSize, PixelPoint};
use crate::playback::{FrameClock, FrameIndex, PlaybackState};
use crate::segmentation::{Mask, MaskRequest, UploadedVideo};

/// The asset currently on screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub source_url: String,
    /// Service registration, absent until the upload succeeds
    pub video: Option<UploadedVideo>,
}

impl Asset {
    pub fn video_id(&self) -> Option<&str> {
        self.video.as_ref().map(|v| v.video_id.as_str())
    }
}

/// A mask request issued at click time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskTicket {
    pub seq: u64,
    pub request: MaskRequest,
}

/// A crop request issued for the current selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CropTicket {
    pub seq: u64,
    pub video_id: String,
}

/// Sequence bookkeeping for one kind of remote request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Sequence {
    issued: u64,
    applied: u64,
    /// Responses at or below this were issued before a reset
    floor: u64,
}

impl Sequence {
    fn next(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    fn accepts(&self, seq: u64, policy: ResponsePolicy) -> bool {
        if seq <= self.floor {
            return false;
        }
        match policy {
            ResponsePolicy::LastArrivalWins => true,
            ResponsePolicy::DiscardStale => seq > self.applied,
        }
    }

    fn invalidate(&mut self) {
        self.floor = self.issued;
    }
}

/// Everything the view shows, mutated only by completed event handlers
#[derive(Debug, Clone)]
pub struct Session {
    policy: ResponsePolicy,
    asset: Option<Asset>,
    native: Option<NativeSize>,
    clock: FrameClock,
    point: Option<PixelPoint>,
    mask: Option<Mask>,
    /// Rows that arrived before the native size was known
    pending_rows: Option<Vec<Vec<u8>>>,
    mask_generation: u64,
    asset_pending: bool,
    mask_pending: bool,
    crop_pending: bool,
    notice: Option<String>,
    mask_seq: Sequence,
    crop_seq: Sequence,
}

impl Session {
    pub fn new(fps: u32, policy: ResponsePolicy) -> Self {
        Self {
            policy,
            asset: None,
            native: None,
            clock: FrameClock::new(fps),
            point: None,
            mask: None,
            pending_rows: None,
            mask_generation: 0,
            asset_pending: false,
            mask_pending: false,
            crop_pending: false,
            notice: None,
            mask_seq: Sequence::default(),
            crop_seq: Sequence::default(),
        }
    }

    pub fn asset(&self) -> Option<&Asset> {
        self.asset.as_ref()
    }

    pub fn native(&self) -> Option<NativeSize> {
        self.native
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    pub fn playback(&self) -> PlaybackState {
        self.clock.state()
    }

    pub fn frame(&self) -> FrameIndex {
        self.clock.frame()
    }

    pub fn point(&self) -> Option<PixelPoint> {
        self.point
    }

    pub fn mask(&self) -> Option<&Mask> {
        self.mask.as_ref()
    }

    /// Bumped every time the active mask is replaced or cleared
    pub fn mask_generation(&self) -> u64 {
        self.mask_generation
    }

    pub fn is_asset_pending(&self) -> bool {
        self.asset_pending
    }

    pub fn is_mask_pending(&self) -> bool {
        self.mask_pending
    }

    pub fn is_crop_pending(&self) -> bool {
        self.crop_pending
    }

    /// User-visible message from the last failed action
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// "Track object" is available once a mask exists and no crop is in flight
    pub fn can_track(&self) -> bool {
        self.mask.is_some() && !self.crop_pending && self.video_id().is_some()
    }

    fn video_id(&self) -> Option<&str> {
        self.asset.as_ref().and_then(Asset::video_id)
    }

    fn set_mask(&mut self, mask: Option<Mask>) {
        self.pending_rows = None;
        if self.mask.is_none() && mask.is_none() {
            return;
        }
        self.mask = mask;
        self.mask_generation += 1;
    }

    fn clear_selection(&mut self) {
        self.point = None;
        self.set_mask(None);
        self.mask_pending = false;
        self.mask_seq.invalidate();
    }

    /// Mark an upload as in flight; `false` if one already is
    pub fn asset_requested(&mut self) -> bool {
        if self.asset_pending {
            return false;
        }
        self.asset_pending = true;
        true
    }

    /// A new asset is registered: start a fresh session against it
    pub fn asset_loaded(&mut self, source_url: impl Into<String>, video: UploadedVideo) {
        self.clock.reset(Some(video.total_frames));
        self.asset = Some(Asset {
            source_url: source_url.into(),
            video: Some(video),
        });
        self.native = None;
        self.clear_selection();
        self.crop_seq.invalidate();
        self.crop_pending = false;
        self.asset_pending = false;
        self.notice = None;
    }

    /// Upload failed; everything stays as it was before the request
    pub fn asset_failed(&mut self, message: impl Into<String>) {
        self.asset_pending = false;
        self.notice = Some(message.into());
    }

    /// Native size and duration are known
    ///
    /// Rows held back for want of a native size become the mask now. A mask
    /// of a different size can no longer apply and is dropped.
    pub fn metadata_loaded(&mut self, duration: f64, native: Option<NativeSize>) {
        self.clock.metadata_loaded(duration);
        if native.is_some() {
            self.native = native;
        }
        if let (Some(native), Some(rows)) = (self.native, self.pending_rows.take()) {
            let mask = Mask::from_rows(&rows, native)
                .map_err(|e| tracing::debug!("Discarding held mask: {}", e))
                .ok();
            self.set_mask(mask);
        }
        let stale = match (self.mask.as_ref(), self.native) {
            (Some(mask), Some(native)) => mask.size() != native,
            _ => false,
        };
        if stale {
            tracing::debug!("Dropping mask computed for different dimensions");
            self.set_mask(None);
        }
    }

    pub fn play(&mut self) {
        self.clock.play();
    }

    pub fn pause(&mut self) {
        self.clock.pause();
    }

    pub fn toggle_playback(&mut self) -> bool {
        self.clock.toggle()
    }

    pub fn seek(&mut self, t: f64) {
        self.clock.seek(t);
    }

    pub fn time_update(&mut self, t: f64) {
        self.clock.time_update(t);
    }

    /// Record a clicked point and, when an asset is registered, issue a mask request
    ///
    /// The ticket captures the video, frame and point at this instant.
    pub fn point_selected(&mut self, point: PixelPoint) -> Option<MaskTicket> {
        self.point = Some(point);
        let video_id = self.video_id()?.to_owned();

        self.mask_pending = true;
        let seq = self.mask_seq.next();
        Some(MaskTicket {
            seq,
            request: MaskRequest {
                video_id,
                frame: self.clock.frame(),
                point,
            },
        })
    }

    /// Apply a mask response; `None` rows mean the request failed
    ///
    /// Returns whether the session changed. Failures clear the mask silently.
    pub fn mask_received(&mut self, ticket: &MaskTicket, rows: Option<Vec<Vec<u8>>>) -> bool {
        if self.video_id() != Some(ticket.request.video_id.as_str()) {
            tracing::debug!("Ignoring mask {} for a video no longer loaded", ticket.seq);
            return false;
        }
        if !self.mask_seq.accepts(ticket.seq, self.policy) {
            tracing::debug!(
                "Ignoring stale mask {} (applied {})",
                ticket.seq,
                self.mask_seq.applied
            );
            return false;
        }

        if ticket.seq == self.mask_seq.issued {
            self.mask_pending = false;
        }
        self.mask_seq.applied = self.mask_seq.applied.max(ticket.seq);

        let mask = match (rows, self.native) {
            (Some(rows), Some(native)) => match Mask::from_rows(&rows, native) {
                Ok(mask) => {
                    if mask.is_blank() {
                        tracing::debug!("Mask {} has no foreground", ticket.seq);
                    }
                    Some(mask)
                }
                Err(e) => {
                    tracing::debug!("Discarding mask {}: {}", ticket.seq, e);
                    None
                }
            },
            (Some(rows), None) => {
                tracing::debug!("Holding mask {} until the native size is known", ticket.seq);
                self.set_mask(None);
                self.pending_rows = Some(rows);
                return true;
            }
            (None, _) => None,
        };

        self.set_mask(mask);
        true
    }

    /// Issue a crop request for the current selection
    ///
    /// `None` while a crop is already in flight or there is nothing to track.
    pub fn crop_requested(&mut self) -> Option<CropTicket> {
        if !self.can_track() {
            return None;
        }
        let video_id = self.video_id()?.to_owned();
        self.crop_pending = true;
        let seq = self.crop_seq.next();
        Some(CropTicket { seq, video_id })
    }

    /// Apply a crop response
    ///
    /// Success swaps in the cropped asset (not yet registered) and starts a
    /// fresh selection against it. The pending flag is cleared on every path.
    pub fn crop_received(&mut self, ticket: &CropTicket, result: Result<String, String>) -> bool {
        if ticket.seq == self.crop_seq.issued {
            self.crop_pending = false;
        }
        if self.video_id() != Some(ticket.video_id.as_str())
            || !self.crop_seq.accepts(ticket.seq, self.policy)
        {
            tracing::debug!("Ignoring stale crop {}", ticket.seq);
            return false;
        }
        self.crop_seq.applied = self.crop_seq.applied.max(ticket.seq);

        match result {
            Ok(url) => {
                self.clock.reset(None);
                self.asset = Some(Asset {
                    source_url: url,
                    video: None,
                });
                self.native = None;
                self.clear_selection();
                self.notice = None;
            }
            Err(message) => {
                self.notice = Some(format!("Smart crop failed: {message}"));
            }
        }
        true
    }

    /// Drop the selection, keeping the asset and playback position
    pub fn start_over(&mut self) {
        self.clear_selection();
    }
}
