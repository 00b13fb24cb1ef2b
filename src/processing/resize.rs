use fast_image_resize as fir;
use image::RgbaImage;

use crate::error::{Error, Result};

/// Resampling filters used by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    /// Bicubic-equivalent, for upscaling the template photo.
    CatmullRom,
    Bilinear,
    /// Area averaging when shrinking; bilinear when enlarging.
    Area,
    /// Keeps hard edges, used for masks.
    Nearest,
}

impl Filter {
    fn algorithm(self, shrinking: bool) -> fir::ResizeAlg {
        match self {
            Self::CatmullRom => fir::ResizeAlg::Convolution(fir::FilterType::CatmullRom),
            Self::Bilinear => fir::ResizeAlg::Convolution(fir::FilterType::Bilinear),
            Self::Area if shrinking => fir::ResizeAlg::Convolution(fir::FilterType::Box),
            Self::Area => fir::ResizeAlg::Convolution(fir::FilterType::Bilinear),
            Self::Nearest => fir::ResizeAlg::Nearest,
        }
    }
}

/// Resizes RGBA8 pixels, treating all four channels independently.
pub fn resize_rgba(
    source: &RgbaImage,
    target_w: u32,
    target_h: u32,
    filter: Filter,
) -> Result<RgbaImage> {
    if target_w == 0 || target_h == 0 {
        return Err(Error::Resize(format!(
            "target dimensions must be positive, got {target_w}x{target_h}"
        )));
    }
    if source.width() == target_w && source.height() == target_h {
        return Ok(source.clone());
    }

    let src_view = fir::images::ImageRef::new(
        source.width(),
        source.height(),
        source.as_raw(),
        fir::PixelType::U8x4,
    )
    .map_err(|err| Error::Resize(format!("failed to create source view: {err}")))?;
    let mut dst_image = fir::images::Image::new(target_w, target_h, fir::PixelType::U8x4);
    let shrinking = u64::from(target_w) * u64::from(target_h)
        < u64::from(source.width()) * u64::from(source.height());
    let options = fir::ResizeOptions::new()
        .resize_alg(filter.algorithm(shrinking))
        .use_alpha(false);
    let mut resizer = fir::Resizer::new();
    resizer
        .resize(&src_view, &mut dst_image, Some(&options))
        .map_err(|err| Error::Resize(err.to_string()))?;
    RgbaImage::from_raw(target_w, target_h, dst_image.into_vec())
        .ok_or_else(|| Error::Resize("failed to construct resized RGBA image".into()))
}
