use super::types::Mask;
use crate::geometry::PixelPoint;
use image::{imageops, Rgba, RgbaImage};

/// Translucent highlight for foreground cells
pub const FILL_COLOR: Rgba<u8> = Rgba([0, 200, 255, 100]);

/// Outline stroke color (#2196f3)
pub const OUTLINE_COLOR: Rgba<u8> = Rgba([0x21, 0x96, 0xf3, 255]);

/// Outline stroke width in native pixels
pub const OUTLINE_WIDTH: u32 = 2;

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

const NEIGHBORS: [(i64, i64); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Fill bitmap and traced boundary of one mask, both at native resolution
#[derive(Debug, Clone, PartialEq)]
pub struct RasterizedMask {
    pub fill: RgbaImage,
    /// Boundary cells in row-major order
    pub outline: Vec<PixelPoint>,
}

/// Converts a binary mask into overlay pixels
pub struct MaskRasterizer {
    fill_color: Rgba<u8>,
    outline_color: Rgba<u8>,
}

impl Default for MaskRasterizer {
    fn default() -> Self {
        Self::new(FILL_COLOR, OUTLINE_COLOR)
    }
}

impl MaskRasterizer {
    pub fn new(fill_color: Rgba<u8>, outline_color: Rgba<u8>) -> Self {
        Self {
            fill_color,
            outline_color,
        }
    }

    /// Produce the fill bitmap and the boundary cells
    ///
    /// A foreground cell is on the boundary when any of its four axis-aligned
    /// neighbours is background or outside the grid.
    pub fn rasterize(&self, mask: &Mask) -> RasterizedMask {
        let _span = tracing::debug_span!("rasterize").entered();

        let size = mask.size();
        let mut outline = Vec::new();
        let fill = RgbaImage::from_fn(size.width, size.height, |x, y| {
            let (xi, yi) = (x as i64, y as i64);
            if !mask.is_foreground(xi, yi) {
                return TRANSPARENT;
            }
            if is_boundary(mask, xi, yi) {
                outline.push(PixelPoint::new(x, y));
            }
            self.fill_color
        });

        RasterizedMask { fill, outline }
    }

    /// Fill with a [`OUTLINE_WIDTH`] px stroke drawn over every boundary cell
    ///
    /// The stroke covers the boundary cell itself and grows outward onto the
    /// adjacent background, so interior cells keep the fill color.
    pub fn render(&self, mask: &Mask, raster: &RasterizedMask) -> RgbaImage {
        let (w, h) = raster.fill.dimensions();
        self.render_scaled(mask, raster, w, h)
    }

    /// Like [`render`](Self::render) but at a displayed size
    ///
    /// The fill is resampled; the stroke is drawn after scaling, each stroke
    /// cell painting every display pixel its area touches (at least one), so
    /// no boundary cell falls between samples when shrinking.
    pub fn render_scaled(
        &self,
        mask: &Mask,
        raster: &RasterizedMask,
        width: u32,
        height: u32,
    ) -> RgbaImage {
        let (nw, nh) = raster.fill.dimensions();
        let mut image = if (width, height) == (nw, nh) {
            raster.fill.clone()
        } else {
            imageops::resize(&raster.fill, width, height, imageops::FilterType::Nearest)
        };
        if nw == 0 || nh == 0 || width == 0 || height == 0 {
            return image;
        }

        for (x, y) in stroke_cells(mask, raster) {
            let (x0, x1) = cell_span(x, nw, width);
            let (y0, y1) = cell_span(y, nh, height);
            for py in y0..y1 {
                for px in x0..x1 {
                    image.put_pixel(px, py, self.outline_color);
                }
            }
        }

        image
    }
}

/// Boundary cells plus their in-grid background neighbours
fn stroke_cells<'a>(
    mask: &'a Mask,
    raster: &'a RasterizedMask,
) -> impl Iterator<Item = (u32, u32)> + 'a {
    let size = mask.size();
    raster.outline.iter().flat_map(move |p| {
        let outward = NEIGHBORS.iter().filter_map(move |(dx, dy)| {
            let (nx, ny) = (p.x as i64 + dx, p.y as i64 + dy);
            let inside = nx >= 0 && ny >= 0 && nx < size.width as i64 && ny < size.height as i64;
            (inside && !mask.is_foreground(nx, ny)).then_some((nx as u32, ny as u32))
        });
        std::iter::once((p.x, p.y)).chain(outward)
    })
}

/// Display pixels `[start, end)` covered by native cell `i` along one axis
fn cell_span(i: u32, native: u32, display: u32) -> (u32, u32) {
    let (i, native, display) = (i as u64, native as u64, display as u64);
    let start = i * display / native;
    let end = ((i + 1) * display).div_ceil(native).max(start + 1);
    (start as u32, end.min(display) as u32)
}

fn is_boundary(mask: &Mask, x: i64, y: i64) -> bool {
    NEIGHBORS
        .iter()
        .any(|(dx, dy)| !mask.is_foreground(x + dx, y + dy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::NativeSize;

    fn mask(rows: &[&[u8]]) -> Mask {
        let h = rows.len() as u32;
        let w = rows.first().map_or(0, |r| r.len()) as u32;
        let rows: Vec<Vec<u8>> = rows.iter().map(|r| r.to_vec()).collect();
        Mask::from_rows(&rows, NativeSize::new(w, h)).unwrap()
    }

    #[test]
    fn blank_mask_is_fully_transparent() {
        let m = mask(&[&[0, 0, 0], &[0, 0, 0]]);
        let raster = MaskRasterizer::default().rasterize(&m);
        assert_eq!(raster.fill.dimensions(), (3, 2));
        assert!(raster.fill.pixels().all(|p| p[3] == 0));
        assert!(raster.outline.is_empty());
    }

    #[test]
    fn isolated_cell_is_boundary() {
        let m = mask(&[&[0, 0, 0], &[0, 1, 0], &[0, 0, 0]]);
        let raster = MaskRasterizer::default().rasterize(&m);
        assert_eq!(raster.outline, vec![PixelPoint::new(1, 1)]);
        assert_eq!(*raster.fill.get_pixel(1, 1), FILL_COLOR);
    }

    #[test]
    fn interior_cells_are_not_outlined() {
        let m = mask(&[
            &[1, 1, 1, 1],
            &[1, 1, 1, 1],
            &[1, 1, 1, 1],
            &[1, 1, 1, 1],
        ]);
        let raster = MaskRasterizer::default().rasterize(&m);
        // grid edges count as background, so only the 2x2 core is interior
        assert_eq!(raster.outline.len(), 12);
        assert!(!raster.outline.contains(&PixelPoint::new(1, 1)));
        assert!(!raster.outline.contains(&PixelPoint::new(2, 2)));
        assert!(raster.outline.contains(&PixelPoint::new(0, 0)));

        let image = MaskRasterizer::default().render(&m, &raster);
        assert_eq!(*image.get_pixel(1, 1), FILL_COLOR);
        assert_eq!(*image.get_pixel(0, 3), OUTLINE_COLOR);
    }

    #[test]
    fn fill_matches_cells() {
        let m = mask(&[&[1, 0], &[0, 1]]);
        let raster = MaskRasterizer::default().rasterize(&m);
        assert_eq!(*raster.fill.get_pixel(0, 0), FILL_COLOR);
        assert_eq!(raster.fill.get_pixel(1, 0)[3], 0);
        assert_eq!(raster.fill.get_pixel(0, 1)[3], 0);
        assert_eq!(*raster.fill.get_pixel(1, 1), FILL_COLOR);
    }

    #[test]
    fn stroke_grows_onto_background() {
        let m = mask(&[&[0, 0, 0], &[0, 1, 0], &[0, 0, 0]]);
        let rasterizer = MaskRasterizer::default();
        let raster = rasterizer.rasterize(&m);
        let image = rasterizer.render(&m, &raster);

        assert_eq!(*image.get_pixel(1, 1), OUTLINE_COLOR);
        assert_eq!(*image.get_pixel(0, 1), OUTLINE_COLOR);
        assert_eq!(*image.get_pixel(1, 2), OUTLINE_COLOR);
        assert_eq!(image.get_pixel(0, 0)[3], 0);
    }

    #[test]
    fn rasterizing_twice_is_identical() {
        let m = mask(&[&[0, 1, 1], &[1, 1, 0], &[0, 1, 0]]);
        let rasterizer = MaskRasterizer::default();
        assert_eq!(rasterizer.rasterize(&m), rasterizer.rasterize(&m));
    }

    #[test]
    fn cell_spans_tile_the_display_axis() {
        let mut next = 0;
        for i in 0..1920 {
            let (start, end) = cell_span(i, 1920, 840);
            assert!(start <= next && end > start && end <= 840);
            next = next.max(end);
        }
        assert_eq!(next, 840);
        assert_eq!(cell_span(3, 4, 8), (6, 8));
    }

    #[test]
    fn left_edge_survives_downscale() {
        let native = NativeSize::new(1920, 1080);
        let rasterizer = MaskRasterizer::default();
        for left in [400u32, 401, 407, 416, 423, 432, 439] {
            let rows: Vec<Vec<u8>> = (0..1080)
                .map(|y| {
                    (0..1920u32)
                        .map(|x| u8::from((200..900).contains(&y) && (left..1500).contains(&x)))
                        .collect()
                })
                .collect();
            let m = Mask::from_rows(&rows, native).unwrap();
            let raster = rasterizer.rasterize(&m);
            let image = rasterizer.render_scaled(&m, &raster, 840, 473);

            let edge = left * 840 / 1920;
            let lo = edge.saturating_sub(1);
            let marked = (lo..=edge + 1).any(|x| *image.get_pixel(x, 236) == OUTLINE_COLOR);
            assert!(marked, "left edge {left} has no outline on row 236");
        }
    }
}
