use std::io::Cursor;

use image::{DynamicImage, ImageBuffer, ImageReader, Rgb, Rgba, RgbaImage};
use tracing::debug;

use crate::asset::AssetRef;
use crate::error::{Error, Result};

/// Reads (or fetches) an asset and decodes it into normalized RGBA8.
///
/// Every image in the pipeline enters through here: screenshots, template
/// base images and masks all receive the same normalization.
pub fn load_image(asset: &AssetRef) -> Result<RgbaImage> {
    let label = asset.to_string();
    let bytes = asset
        .read_bytes()
        .map_err(|err| Error::ImageNotFound(format!("{label}: {err:#}")))?;
    let decoded = decode_bytes(&bytes, &label)?;
    let (width, height) = (decoded.width(), decoded.height());
    let rgba = normalize(decoded, &label)?;
    debug!(asset = %label, width, height, "loaded image");
    Ok(rgba)
}

pub fn decode_bytes(bytes: &[u8], label: &str) -> Result<DynamicImage> {
    let decode_err = |source: image::ImageError| Error::ImageDecode {
        path: label.to_string(),
        source,
    };
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|err| decode_err(image::ImageError::IoError(err)))?
        .decode()
        .map_err(decode_err)
}

/// Brings a decoded image to 8-bit, 4-channel form.
///
/// 16-bit samples are truncated by `v / 256`; RGB images gain an opaque alpha
/// channel. Any other layout is rejected.
pub fn normalize(image: DynamicImage, label: &str) -> Result<RgbaImage> {
    match image {
        DynamicImage::ImageRgba8(rgba) => Ok(rgba),
        DynamicImage::ImageRgb8(rgb) => Ok(add_opaque_alpha(&rgb)),
        DynamicImage::ImageRgba16(rgba) => Ok(ImageBuffer::from_fn(
            rgba.width(),
            rgba.height(),
            |x, y| {
                let px = rgba.get_pixel(x, y).0;
                Rgba(px.map(narrow_u16))
            },
        )),
        DynamicImage::ImageRgb16(rgb) => {
            let narrowed: ImageBuffer<Rgb<u8>, Vec<u8>> =
                ImageBuffer::from_fn(rgb.width(), rgb.height(), |x, y| {
                    Rgb(rgb.get_pixel(x, y).0.map(narrow_u16))
                });
            Ok(add_opaque_alpha(&narrowed))
        }
        other => Err(Error::UnsupportedImageFormat {
            path: label.to_string(),
            detail: format!("{:?} is not an 8-bit RGB or RGBA layout", other.color()),
        }),
    }
}

#[inline]
fn narrow_u16(value: u16) -> u8 {
    (value / 256) as u8
}

fn add_opaque_alpha(rgb: &ImageBuffer<Rgb<u8>, Vec<u8>>) -> RgbaImage {
    let mut rgba = Vec::with_capacity(rgb.as_raw().len() / 3 * 4);
    for chunk in rgb.as_raw().chunks_exact(3) {
        rgba.extend_from_slice(&[chunk[0], chunk[1], chunk[2], 255]);
    }
    RgbaImage::from_raw(rgb.width(), rgb.height(), rgba)
        .unwrap_or_else(|| RgbaImage::new(rgb.width(), rgb.height()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, ImageFormat, Luma, RgbImage};

    #[test]
    fn rgb_gains_opaque_alpha() {
        let rgb = RgbImage::from_pixel(3, 2, Rgb([10, 20, 30]));
        let out = normalize(DynamicImage::ImageRgb8(rgb), "rgb").unwrap();
        assert_eq!(out.dimensions(), (3, 2));
        assert!(out.pixels().all(|p| p.0 == [10, 20, 30, 255]));
    }

    #[test]
    fn sixteen_bit_is_truncated() {
        let wide: ImageBuffer<Rgba<u16>, Vec<u16>> =
            ImageBuffer::from_pixel(1, 1, Rgba([65535, 511, 255, 256]));
        let out = normalize(DynamicImage::ImageRgba16(wide), "wide").unwrap();
        assert_eq!(out.get_pixel(0, 0).0, [255, 1, 0, 1]);

        let wide_rgb: ImageBuffer<Rgb<u16>, Vec<u16>> =
            ImageBuffer::from_pixel(1, 1, Rgb([1024, 0, 65280]));
        let out = normalize(DynamicImage::ImageRgb16(wide_rgb), "wide-rgb").unwrap();
        assert_eq!(out.get_pixel(0, 0).0, [4, 0, 255, 255]);
    }

    #[test]
    fn grayscale_is_unsupported() {
        let gray = GrayImage::from_pixel(1, 1, Luma([9]));
        let err = normalize(DynamicImage::ImageLuma8(gray), "gray").unwrap_err();
        assert!(matches!(err, Error::UnsupportedImageFormat { .. }));
    }

    #[test]
    fn loads_png_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.png");
        RgbImage::from_pixel(4, 4, Rgb([1, 2, 3]))
            .save_with_format(&path, ImageFormat::Png)
            .unwrap();
        let out = load_image(&AssetRef::Local(path)).unwrap();
        assert_eq!(out.get_pixel(3, 3).0, [1, 2, 3, 255]);
    }

    #[test]
    fn missing_and_corrupt_files_are_distinguished() {
        let dir = tempfile::tempdir().unwrap();
        let missing = load_image(&AssetRef::Local(dir.path().join("nope.png"))).unwrap_err();
        assert!(matches!(missing, Error::ImageNotFound(_)));

        let corrupt = dir.path().join("corrupt.png");
        std::fs::write(&corrupt, b"definitely not an image").unwrap();
        let err = load_image(&AssetRef::Local(corrupt)).unwrap_err();
        assert!(matches!(err, Error::ImageDecode { .. }));
    }
}
