use image::RgbaImage;

use crate::error::{Error, Result};
use crate::processing::layout::{scaled_size, size_for_width};
use crate::processing::resize::{Filter, resize_rgba};

/// Blends `foreground` over `background` in place, weighted by the
/// foreground's alpha. The background keeps its own alpha channel.
pub fn alpha_over(background: &mut RgbaImage, foreground: &RgbaImage) -> Result<()> {
    if background.dimensions() != foreground.dimensions() {
        return Err(Error::Resize(format!(
            "cannot composite {:?} over {:?}",
            foreground.dimensions(),
            background.dimensions()
        )));
    }
    for (dst, src) in background.pixels_mut().zip(foreground.pixels()) {
        let alpha = src[3];
        if alpha == 0 {
            continue;
        }
        let a = f32::from(alpha) / 255.0;
        for c in 0..3 {
            let value = f32::from(src[c]) * a + f32::from(dst[c]) * (1.0 - a);
            dst[c] = value.clamp(0.0, 255.0) as u8;
        }
    }
    Ok(())
}

/// Undoes the oversampling applied before warping, then fits the requested
/// output width. Both steps average areas to avoid aliasing.
pub fn downsample_canvas(
    canvas: &RgbaImage,
    oversample: f64,
    output_width: Option<u32>,
) -> Result<RgbaImage> {
    let (w, h) = scaled_size(canvas.width(), canvas.height(), 1.0 / oversample);
    let reduced = resize_rgba(canvas, w, h, Filter::Area)?;
    match output_width {
        Some(target) => {
            let (w, h) = size_for_width(reduced.width(), reduced.height(), target);
            resize_rgba(&reduced, w, h, Filter::Area)
        }
        None => Ok(reduced),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn transparent_foreground_leaves_background() {
        let base = RgbaImage::from_fn(8, 8, |x, y| Rgba([x as u8 * 30, y as u8 * 30, 7, 200]));
        let mut out = base.clone();
        let fg = RgbaImage::from_pixel(8, 8, Rgba([255, 255, 255, 0]));
        alpha_over(&mut out, &fg).unwrap();
        assert_eq!(out, base);
    }

    #[test]
    fn opaque_foreground_replaces_color_but_not_alpha() {
        let mut base = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 255, 180]));
        let fg = RgbaImage::from_pixel(2, 2, Rgba([255, 0, 0, 255]));
        alpha_over(&mut base, &fg).unwrap();
        assert!(base.pixels().all(|p| p.0 == [255, 0, 0, 180]));
    }

    #[test]
    fn partial_alpha_blends() {
        let mut base = RgbaImage::from_pixel(1, 1, Rgba([0, 100, 200, 255]));
        let fg = RgbaImage::from_pixel(1, 1, Rgba([200, 100, 0, 51]));
        alpha_over(&mut base, &fg).unwrap();
        let px = base.get_pixel(0, 0).0;
        assert!(px[0].abs_diff(40) <= 1);
        assert!(px[1].abs_diff(100) <= 1);
        assert!(px[2].abs_diff(160) <= 1);
        assert_eq!(px[3], 255);
    }

    #[test]
    fn mismatched_sizes_are_rejected() {
        let mut base = RgbaImage::new(2, 2);
        assert!(alpha_over(&mut base, &RgbaImage::new(3, 2)).is_err());
    }

    #[test]
    fn downsample_restores_size_and_fits_width() {
        let canvas = RgbaImage::from_pixel(1600, 3200, Rgba([1, 2, 3, 255]));
        let out = downsample_canvas(&canvas, 4.0, None).unwrap();
        assert_eq!(out.dimensions(), (400, 800));
        let out = downsample_canvas(&canvas, 4.0, Some(300)).unwrap();
        assert_eq!(out.dimensions(), (300, 600));
    }
}
