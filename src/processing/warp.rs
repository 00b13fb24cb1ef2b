//! Projective warping of the shaped screenshot into the template canvas.

use image::{Rgba, RgbaImage};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};

use crate::error::{Error, Result};

/// Cross products smaller than this fraction of the quad's squared extent
/// count as collinear.
const COLLINEAR_TOLERANCE: f32 = 1e-6;

/// Corners of a `width` x `height` image in screen-point winding order:
/// top-left, bottom-left, bottom-right, top-right.
pub fn image_corners(width: u32, height: u32) -> [(f32, f32); 4] {
    let (w, h) = (width as f32, height as f32);
    [(0.0, 0.0), (0.0, h), (w, h), (w, 0.0)]
}

/// A quad admits a projective mapping from a rectangle only when no three of
/// its corners are collinear.
pub fn is_degenerate_quad(quad: &[(f32, f32); 4]) -> bool {
    if quad.iter().any(|(x, y)| !(x.is_finite() && y.is_finite())) {
        return true;
    }
    let extent = quad
        .iter()
        .flat_map(|&(x, y)| [x, y])
        .fold(0.0f32, |acc, v| acc.max(v.abs()))
        .max(1.0);
    let tolerance = COLLINEAR_TOLERANCE * extent * extent;
    (0..4).any(|skip| {
        let [a, b, c]: [(f32, f32); 3] = {
            let mut pts = quad.iter().enumerate().filter(|(i, _)| *i != skip).map(|(_, p)| *p);
            std::array::from_fn(|_| pts.next().unwrap_or_default())
        };
        let cross = (b.0 - a.0) * (c.1 - a.1) - (b.1 - a.1) * (c.0 - a.0);
        cross.abs() <= tolerance
    })
}

/// Projection taking the corners of `source` onto `quad`.
pub fn screen_projection(source: &RgbaImage, quad: &[[f32; 2]; 4]) -> Result<Projection> {
    let dst = quad.map(|[x, y]| (x, y));
    if is_degenerate_quad(&dst) {
        return Err(Error::DegenerateQuad);
    }
    Projection::from_control_points(image_corners(source.width(), source.height()), dst)
        .ok_or(Error::DegenerateQuad)
}

/// Resamples `source` through `projection` into a transparent canvas of
/// `out_w` x `out_h`, using nearest-neighbour sampling so UI edges stay sharp.
pub fn warp_perspective(
    source: &RgbaImage,
    projection: &Projection,
    out_w: u32,
    out_h: u32,
) -> RgbaImage {
    let mut out = RgbaImage::new(out_w, out_h);
    warp_into(
        source,
        projection,
        Interpolation::Nearest,
        Rgba([0, 0, 0, 0]),
        &mut out,
    );
    out
}
