// Software rasterizer used for PNG export.

use std::io::Cursor;

use image::{ImageFormat, Rgba, RgbaImage};
use tracing::{debug, trace};

use crate::{Color, Point, Stroke, Surface, SurfaceError};

/// Largest accepted export scale factor.
pub const MAX_EXPORT_SCALE: f32 = 8.0;

/// Render the surface at `scale` times its display size.
pub fn rasterize(surface: &Surface, scale: f32) -> RgbaImage {
    let width = ((surface.width() as f32 * scale).round() as u32).max(1);
    let height = ((surface.height() as f32 * scale).round() as u32).max(1);
    debug!(
        "Rasterizing {} stroke(s) into {}x{} at scale {}",
        surface.strokes().len(),
        width,
        height,
        scale
    );

    let mut image = RgbaImage::from_pixel(width, height, to_rgba(surface.background()));
    for stroke in surface.strokes() {
        draw_stroke(&mut image, stroke, scale);
    }
    image
}

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, SurfaceError> {
    let mut bytes = Cursor::new(Vec::new());
    image.write_to(&mut bytes, ImageFormat::Png)?;
    let bytes = bytes.into_inner();
    trace!("Encoded PNG of {} bytes", bytes.len());
    Ok(bytes)
}

fn to_rgba(color: Color) -> Rgba<u8> {
    Rgba([color.r, color.g, color.b, color.a])
}

fn draw_stroke(image: &mut RgbaImage, stroke: &Stroke, scale: f32) {
    let radius = (stroke.width * scale / 2.0).max(0.5);
    let points: Vec<Point> = stroke
        .points
        .iter()
        .map(|p| Point::new(p.x * scale, p.y * scale))
        .collect();

    let Some(region) = Region::around(&points, radius, image.width(), image.height()) else {
        trace!("Stroke lies outside the image");
        return;
    };

    // Pixels are painted once per stroke so overlapping segments
    // don't darken translucent colors.
    let mut covered = vec![false; region.width * region.height];
    if let [only] = points.as_slice() {
        region.cover_segment(&mut covered, *only, *only, radius);
    }
    for pair in points.windows(2) {
        region.cover_segment(&mut covered, pair[0], pair[1], radius);
    }

    for (index, hit) in covered.iter().enumerate() {
        if *hit {
            let x = region.x + index % region.width;
            let y = region.y + index / region.width;
            blend(image.get_pixel_mut(x as u32, y as u32), stroke.color);
        }
    }
}

/// Pixel rectangle a stroke can touch, clipped to the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Region {
    x: usize,
    y: usize,
    width: usize,
    height: usize,
}

impl Region {
    fn around(points: &[Point], radius: f32, image_width: u32, image_height: u32) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut max_x, mut min_y, mut max_y) = (first.x, first.x, first.y, first.y);
        for p in points {
            min_x = min_x.min(p.x);
            max_x = max_x.max(p.x);
            min_y = min_y.min(p.y);
            max_y = max_y.max(p.y);
        }

        let (x0, x1) = clip(min_x - radius, max_x + radius, image_width);
        let (y0, y1) = clip(min_y - radius, max_y + radius, image_height);
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some(Self {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        })
    }

    // Marks every pixel whose center lies within `radius` of the segment (round caps).
    fn cover_segment(&self, covered: &mut [bool], a: Point, b: Point, radius: f32) {
        let (x0, x1) = clip(a.x.min(b.x) - radius, a.x.max(b.x) + radius, u32::MAX);
        let (y0, y1) = clip(a.y.min(b.y) - radius, a.y.max(b.y) + radius, u32::MAX);
        let (x0, x1) = (x0.max(self.x), x1.min(self.x + self.width));
        let (y0, y1) = (y0.max(self.y), y1.min(self.y + self.height));

        for y in y0..y1 {
            for x in x0..x1 {
                let center = Point::new(x as f32 + 0.5, y as f32 + 0.5);
                if distance_to_segment(center, a, b) <= radius {
                    covered[(y - self.y) * self.width + (x - self.x)] = true;
                }
            }
        }
    }
}

// Pixel span [start, end) covering `low..high`, clamped to `0..limit`.
// Float-to-int casts saturate, so huge or infinite bounds are safe.
fn clip(low: f32, high: f32, limit: u32) -> (usize, usize) {
    let limit = limit as usize;
    let start = (low.floor().max(0.0) as usize).min(limit);
    let end = (high.ceil().max(0.0) as usize).min(limit);
    (start, end)
}

fn distance_to_segment(p: Point, a: Point, b: Point) -> f32 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let length_sq = dx * dx + dy * dy;
    let t = if length_sq == 0.0 {
        0.0
    } else {
        (((p.x - a.x) * dx + (p.y - a.y) * dy) / length_sq).clamp(0.0, 1.0)
    };
    let (cx, cy) = (a.x + t * dx, a.y + t * dy);
    ((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt()
}

// Source-over compositing in straight alpha.
fn blend(dest: &mut Rgba<u8>, src: Color) {
    if src.is_opaque() {
        *dest = to_rgba(src);
        return;
    }
    let sa = f32::from(src.a) / 255.0;
    let da = f32::from(dest[3]) / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        *dest = Rgba([0, 0, 0, 0]);
        return;
    }
    let mix = |s: u8, d: u8| {
        ((f32::from(s) * sa + f32::from(d) * da * (1.0 - sa)) / out_a).round() as u8
    };
    *dest = Rgba([
        mix(src.r, dest[0]),
        mix(src.g, dest[1]),
        mix(src.b, dest[2]),
        (out_a * 255.0).round() as u8,
    ]);
}
