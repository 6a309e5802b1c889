use crate::error::{SmartcropError, SmartcropResult};
use crate::geometry::{NativeSize, PixelPoint};
use crate::playback::FrameIndex;
use ndarray::Array2;

/// Binary segmentation of one frame: 1 = selected object, 0 = background
///
/// Stored as a `(height, width)` grid at the video's native resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    grid: Array2<u8>,
}

impl Mask {
    /// Build a mask of exactly `native` size from service rows
    ///
    /// Ragged or short input is tolerated: missing cells are background and
    /// cells beyond the native size are dropped. Any non-zero value counts as
    /// foreground.
    pub fn from_rows(rows: &[Vec<u8>], native: NativeSize) -> SmartcropResult<Self> {
        if native.is_empty() {
            return Err(SmartcropError::mask(format!(
                "cannot build a {}x{} mask",
                native.width, native.height
            )));
        }

        let (w, h) = (native.width as usize, native.height as usize);
        let ragged = rows.len() != h || rows.iter().any(|r| r.len() != w);
        if ragged {
            tracing::warn!(
                "Mask rows do not match native size {}x{} ({} rows received), filling gaps with background",
                w,
                h,
                rows.len()
            );
        }

        let grid = Array2::from_shape_fn((h, w), |(y, x)| {
            let v = rows.get(y).and_then(|row| row.get(x)).copied().unwrap_or(0);
            u8::from(v != 0)
        });

        Ok(Self { grid })
    }

    pub fn size(&self) -> NativeSize {
        let (h, w) = self.grid.dim();
        NativeSize::new(w as u32, h as u32)
    }

    /// Foreground test that treats anything outside the grid as background
    pub fn is_foreground(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 {
            return false;
        }
        self.grid
            .get((y as usize, x as usize))
            .is_some_and(|&v| v != 0)
    }

    pub fn foreground_count(&self) -> usize {
        self.grid.iter().filter(|&&v| v != 0).count()
    }

    pub fn is_blank(&self) -> bool {
        self.foreground_count() == 0
    }
}

/// A registered source video on the remote service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedVideo {
    pub video_id: String,
    pub total_frames: u64,
}

/// Everything a mask request needs, captured at click time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskRequest {
    pub video_id: String,
    pub frame: FrameIndex,
    pub point: PixelPoint,
}

/// Remote segmentation / smart crop collaborator
///
/// Mask computation and crop tracking happen out of process; implementors
/// only move requests and responses. Every call is terminal for that request:
/// failures are returned, never retried.
pub trait SegmentationService {
    /// Register a source video by URL
    fn upload_video(&self, video_url: &str) -> SmartcropResult<UploadedVideo>;

    /// Compute the mask rows for one frame from a single foreground point
    fn get_mask(&self, request: &MaskRequest) -> SmartcropResult<Vec<Vec<u8>>>;

    /// Produce a cropped asset that tracks the previously selected object
    fn get_smartcrop(&self, video_id: &str) -> SmartcropResult<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_and_ragged_rows_become_background() {
        let rows = vec![vec![1, 1, 1], vec![1]];
        let mask = Mask::from_rows(&rows, NativeSize::new(3, 3)).unwrap();
        assert_eq!(mask.size(), NativeSize::new(3, 3));
        assert!(mask.is_foreground(2, 0));
        assert!(mask.is_foreground(0, 1));
        assert!(!mask.is_foreground(1, 1));
        assert!(!mask.is_foreground(0, 2));
        assert_eq!(mask.foreground_count(), 4);
    }

    #[test]
    fn extra_cells_are_dropped() {
        let rows = vec![vec![0, 0, 1], vec![0, 0, 1], vec![1, 1, 1]];
        let mask = Mask::from_rows(&rows, NativeSize::new(2, 2)).unwrap();
        assert!(mask.is_blank());
    }

    #[test]
    fn out_of_grid_is_background() {
        let mask = Mask::from_rows(&[vec![1]], NativeSize::new(1, 1)).unwrap();
        assert!(mask.is_foreground(0, 0));
        assert!(!mask.is_foreground(-1, 0));
        assert!(!mask.is_foreground(1, 0));
        assert!(!mask.is_foreground(0, 1));
    }

    #[test]
    fn nonzero_values_are_foreground() {
        let mask = Mask::from_rows(&[vec![0, 7]], NativeSize::new(2, 1)).unwrap();
        assert!(mask.is_foreground(1, 0));
        assert_eq!(mask.foreground_count(), 1);
    }

    #[test]
    fn empty_native_size_is_an_error() {
        assert!(Mask::from_rows(&[], NativeSize::new(0, 4)).is_err());
    }
}
