//! Naming and writing finished mockups.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, RgbaImage};
use tracing::info;

use crate::error::{Error, Result};

const JPEG_QUALITY: u8 = 100;

/// Where the mockup for `screenshot_name` is written.
///
/// Without `out` the file lands in the working directory as
/// `<stem>_mockup.png`. An `out` with an extension is used verbatim; one
/// without is treated as a prefix, `<out>_<stem>_mockup.png`.
pub fn output_path(out: Option<&Path>, screenshot_name: &str) -> PathBuf {
    let stem = Path::new(screenshot_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "screenshot".to_string());
    let default_name = format!("{stem}_mockup");
    match out {
        None => PathBuf::from(format!("{default_name}.png")),
        Some(path) if path.extension().is_some() => path.to_path_buf(),
        Some(path) => {
            let mut prefixed = path.as_os_str().to_owned();
            prefixed.push(format!("_{default_name}.png"));
            PathBuf::from(prefixed)
        }
    }
}

/// Encodes `image` according to `path`'s extension. JPEG drops the alpha
/// channel and is written at maximum quality.
///
/// # Errors
/// [`Error::Encode`] for unknown extensions or encoder failures.
pub fn save_mockup(image: &RgbaImage, path: &Path) -> Result<()> {
    let encode_err = |reason: String| Error::Encode {
        path: path.display().to_string(),
        reason,
    };
    let format = ImageFormat::from_path(path).map_err(|err| encode_err(err.to_string()))?;
    match format {
        ImageFormat::Jpeg => {
            let file = File::create(path)?;
            let rgb = DynamicImage::ImageRgba8(image.clone()).into_rgb8();
            JpegEncoder::new_with_quality(BufWriter::new(file), JPEG_QUALITY)
                .encode_image(&rgb)
                .map_err(|err| encode_err(err.to_string()))?;
        }
        other => image
            .save_with_format(path, other)
            .map_err(|err| encode_err(err.to_string()))?,
    }
    info!(path = %path.display(), "saved mockup");
    Ok(())
}
