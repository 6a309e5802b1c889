use super::SizeObserver;
use crate::geometry::NativeSize;
use crate::segmentation::{Mask, MaskRasterizer};
use image::RgbaImage;

/// Overlay surface registered with the video element
///
/// Same top-left corner and displayed width as the video; height follows
/// from the native aspect ratio.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayFrame {
    pub left: f64,
    pub top: f64,
    pub image: RgbaImage,
}

impl OverlayFrame {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RenderKey {
    mask_generation: u64,
    native: NativeSize,
    width: u32,
    height: u32,
}

/// Keeps the overlay surface in step with the mask and the displayed box
///
/// Re-renders when the mask generation, the native size or the displayed size
/// changes; otherwise the previous surface is reused and only moved.
pub struct OverlayCompositor {
    rasterizer: MaskRasterizer,
    key: Option<RenderKey>,
    current: Option<OverlayFrame>,
    renders: u64,
}

impl Default for OverlayCompositor {
    fn default() -> Self {
        Self::new(MaskRasterizer::default())
    }
}

impl OverlayCompositor {
    pub fn new(rasterizer: MaskRasterizer) -> Self {
        Self {
            rasterizer,
            key: None,
            current: None,
            renders: 0,
        }
    }

    /// Number of times the surface was actually rebuilt
    pub fn renders(&self) -> u64 {
        self.renders
    }

    /// Drop the surface so nothing sits over the video
    pub fn clear(&mut self) {
        self.key = None;
        self.current = None;
    }

    /// Bring the overlay up to date and return it
    ///
    /// Returns `None` (no surface at all) when there is no mask, the native
    /// size is unknown, the element is not laid out, or the mask was computed
    /// for a different native size than the video on screen.
    pub fn update(
        &mut self,
        observer: &dyn SizeObserver,
        mask: Option<&Mask>,
        mask_generation: u64,
        native: Option<NativeSize>,
    ) -> Option<&OverlayFrame> {
        let (Some(mask), Some(native), Some(display)) = (mask, native, observer.observe()) else {
            self.clear();
            return None;
        };

        if mask.size() != native {
            tracing::warn!(
                "Mask is {}x{} but the video is {}x{}, not compositing",
                mask.size().width,
                mask.size().height,
                native.width,
                native.height
            );
            self.clear();
            return None;
        }

        let width = display.width.round().max(0.0) as u32;
        if width == 0 || native.is_empty() {
            self.clear();
            return None;
        }
        let height =
            ((width as f64 * native.height as f64 / native.width as f64).round() as u32).max(1);

        let observed = display.height.round().max(0.0) as u32;
        if observed.abs_diff(height) > 1 {
            tracing::warn!(
                "Displayed height {} disagrees with aspect-derived height {} for width {}",
                observed,
                height,
                width
            );
        }

        let key = RenderKey {
            mask_generation,
            native,
            width,
            height,
        };

        if self.key != Some(key) || self.current.is_none() {
            let _span = tracing::debug_span!("composite").entered();
            let raster = self.rasterizer.rasterize(mask);
            let image = self.rasterizer.render_scaled(mask, &raster, width, height);
            tracing::debug!(
                "Overlay rebuilt at {}x{} ({} outline cells)",
                width,
                height,
                raster.outline.len()
            );
            self.key = Some(key);
            self.renders += 1;
            self.current = Some(OverlayFrame {
                left: display.left,
                top: display.top,
                image,
            });
        }

        let frame = self.current.as_mut()?;
        frame.left = display.left;
        frame.top = display.top;
        Some(&*frame)
    }
}
