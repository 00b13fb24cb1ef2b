use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_polygon_mut;
use imageproc::point::Point;
use rand::Rng;
use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::processing::blur::{gaussian_blur, odd_kernel_size};
use crate::processing::resize::{Filter, resize_rgba};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackgroundMode {
    #[default]
    None,
    Blur,
    Geometric,
}

const GRID_SIZE: usize = 12;

/// Jittered grid vertices, `(GRID_SIZE + 1)` squared, indexed by row and
/// column.
#[derive(Debug, Clone)]
pub struct VertexGrid {
    size: usize,
    points: Vec<[i64; 2]>,
}

impl VertexGrid {
    /// Lays vertices out one cell beyond the top-left edge, each jittered by
    /// up to half a cell.
    pub fn jittered(cell_w: i64, cell_h: i64, rng: &mut impl Rng) -> Self {
        let size = GRID_SIZE + 1;
        let mut points = Vec::with_capacity(size * size);
        for row in 0..size as i64 {
            for col in 0..size as i64 {
                let x = col * cell_w - cell_w + rng.random_range(half_range(cell_w));
                let y = row * cell_h - cell_h + rng.random_range(half_range(cell_h));
                points.push([x, y]);
            }
        }
        Self { size, points }
    }

    pub fn get(&self, row: usize, col: usize) -> Option<[i64; 2]> {
        if row >= self.size || col >= self.size {
            return None;
        }
        self.points.get(row * self.size + col).copied()
    }

    /// The quad whose top-left vertex is `(row, col)`, wound clockwise.
    pub fn quad(&self, row: usize, col: usize) -> Option<[[i64; 2]; 4]> {
        Some([
            self.get(row, col)?,
            self.get(row, col + 1)?,
            self.get(row + 1, col + 1)?,
            self.get(row + 1, col)?,
        ])
    }
}

// Floor division for the lower bound, matching `-n // 2`.
fn half_range(cell: i64) -> std::ops::RangeInclusive<i64> {
    (-cell).div_euclid(2)..=cell / 2
}

/// Color for a quad centered at normalized `(cx, cy)`: a bilinear-looking mix
/// of the two endpoints with their average on the off-diagonal corners.
pub fn gradient_color(c1: [u8; 3], c2: [u8; 3], cx: f64, cy: f64) -> [u8; 3] {
    [0, 1, 2].map(|i| {
        let (a, b) = (f64::from(c1[i]), f64::from(c2[i]));
        let value = a * (1.0 - cx) * (1.0 - cy)
            + b * cx * cy
            + ((a + b) / 2.0) * (cx * (1.0 - cy) + (1.0 - cx) * cy);
        value.trunc().clamp(0.0, 255.0) as u8
    })
}

/// Procedural low-frequency backdrop of flat-colored, jittered quads.
pub fn geometric_background(width: u32, height: u32, rng: &mut impl Rng) -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255]));
    let cell_w = (i64::from(width) / (GRID_SIZE as i64 - 2)).max(1);
    let cell_h = (i64::from(height) / (GRID_SIZE as i64 - 2)).max(1);
    let grid = VertexGrid::jittered(cell_w, cell_h, rng);
    let color1: [u8; 3] = [rng.random(), rng.random(), rng.random()];
    let color2: [u8; 3] = [rng.random(), rng.random(), rng.random()];
    debug!(?color1, ?color2, cell_w, cell_h, "generated geometric backdrop");

    let (w, h) = (f64::from(width.max(1)), f64::from(height.max(1)));
    for row in 0..GRID_SIZE {
        for col in 0..GRID_SIZE {
            let Some(quad) = grid.quad(row, col) else {
                continue;
            };
            let cx = quad.iter().map(|p| p[0] as f64).sum::<f64>() / (4.0 * w);
            let cy = quad.iter().map(|p| p[1] as f64).sum::<f64>() / (4.0 * h);
            let [r, g, b] = gradient_color(color1, color2, cx, cy);
            fill_quad(&mut canvas, &quad, Rgba([r, g, b, 255]));
        }
    }
    canvas
}

/// Quad corners as drawing points, with repeated consecutive vertices
/// collapsed. The outline never closes on its own first point.
pub fn quad_outline(quad: &[[i64; 2]; 4]) -> Vec<Point<i32>> {
    let mut outline: Vec<Point<i32>> = Vec::with_capacity(4);
    for &[x, y] in quad {
        let point = Point::new(x as i32, y as i32);
        if outline.last() != Some(&point) {
            outline.push(point);
        }
    }
    while outline.len() > 1 && outline.first() == outline.last() {
        outline.pop();
    }
    outline
}

/// Fills one grid quad. Jitter can fold a quad down to a line or a point;
/// those are skipped.
pub fn fill_quad(canvas: &mut RgbaImage, quad: &[[i64; 2]; 4], color: Rgba<u8>) {
    let outline = quad_outline(quad);
    if outline.len() < 3 {
        return;
    }
    draw_polygon_mut(canvas, &outline, color);
}

/// Blurs the screenshot and stretches it over the whole canvas.
pub fn blurred_background(
    screenshot: &RgbaImage,
    width: u32,
    height: u32,
    strength: f32,
) -> Result<RgbaImage> {
    let kernel = odd_kernel_size(strength);
    debug!(kernel, "blurring screenshot for backdrop");
    let blurred = gaussian_blur(screenshot, kernel);
    resize_rgba(&blurred, width, height, Filter::Bilinear)
}

/// Builds the backdrop for `mode`, or `None` when no background is requested.
pub fn synthesize(
    mode: BackgroundMode,
    screenshot: &RgbaImage,
    width: u32,
    height: u32,
    blur_strength: f32,
    rng: &mut impl Rng,
) -> Result<Option<RgbaImage>> {
    match mode {
        BackgroundMode::None => Ok(None),
        BackgroundMode::Blur => {
            blurred_background(screenshot, width, height, blur_strength).map(Some)
        }
        BackgroundMode::Geometric => Ok(Some(geometric_background(width, height, rng))),
    }
}

/// Places `backdrop` behind `device`, weighting every channel by the device's
/// own alpha. The backdrop is treated as fully opaque.
pub fn blend_behind(device: &RgbaImage, backdrop: &RgbaImage) -> Result<RgbaImage> {
    if device.dimensions() != backdrop.dimensions() {
        return Err(Error::Resize(format!(
            "backdrop {:?} does not match mockup {:?}",
            backdrop.dimensions(),
            device.dimensions()
        )));
    }
    let mut out = device.clone();
    for (pixel, bg) in out.pixels_mut().zip(backdrop.pixels()) {
        let mask = f32::from(pixel[3]) / 255.0;
        let bg = [bg[0], bg[1], bg[2], 255];
        for c in 0..4 {
            let value = f32::from(pixel[c]) * mask + f32::from(bg[c]) * (1.0 - mask);
            pixel[c] = value.clamp(0.0, 255.0) as u8;
        }
    }
    Ok(out)
}
