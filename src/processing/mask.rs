use std::fmt;

use image::{RgbaImage, imageops};
use template_model::{MaskSource, MockupTemplate};
use tracing::debug;

use crate::asset::AssetRef;
use crate::error::{Error, Result};
use crate::processing::layout::{aspect_ratio, center_crop_rect, is_stretched};
use crate::processing::loader::load_image;
use crate::processing::resize::{Filter, resize_rgba};

/// Non-fatal conditions noticed while building a mockup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PipelineWarning {
    /// The screenshot's aspect ratio differs from the screen's by more than 10%
    /// and will be visibly stretched.
    Stretched { actual: f32, expected: f32 },
}

impl fmt::Display for PipelineWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stretched { actual, expected } => write!(
                f,
                "the screenshot (aspect {actual:.3}) was stretched significantly to fit the \
                 template (aspect {expected:.3}); use --crop to crop it instead"
            ),
        }
    }
}

pub fn stretch_warning(actual: f32, expected: f32) -> Option<PipelineWarning> {
    is_stretched(actual, expected).then_some(PipelineWarning::Stretched { actual, expected })
}

pub fn center_crop(image: &RgbaImage, aspect: f32) -> RgbaImage {
    let rect = center_crop_rect(image.width(), image.height(), aspect);
    imageops::crop_imm(image, rect.x, rect.y, rect.width, rect.height).to_image()
}

/// Replaces the screenshot's alpha with the mask's alpha, after resizing the
/// mask to the screenshot's dimensions. Color data is untouched.
pub fn apply_mask_alpha(image: &mut RgbaImage, mask: &RgbaImage) -> Result<()> {
    let mask = resize_rgba(mask, image.width(), image.height(), Filter::Bilinear)?;
    for (pixel, mask_px) in image.pixels_mut().zip(mask.pixels()) {
        pixel[3] = mask_px[3];
    }
    Ok(())
}

/// A screenshot whose alpha channel encodes the visible screen shape.
#[derive(Debug, Clone)]
pub struct ShapedScreen {
    pub image: RgbaImage,
    pub warning: Option<PipelineWarning>,
}

/// Crops and masks the color-adjusted screenshot according to the template.
pub fn shape_screen(
    screenshot: RgbaImage,
    template: &MockupTemplate,
    template_root: &AssetRef,
    crop: bool,
) -> Result<ShapedScreen> {
    let source = template
        .mask_source()
        .map_err(|err| Error::InvalidTemplateConfig(format!("{err:#}")))?;
    match source {
        MaskSource::Image(file) => {
            let asset = template_root.join(file);
            let mask = load_image(&asset).map_err(|err| Error::InvalidTemplateAsset {
                path: asset.to_string(),
                reason: err.to_string(),
            })?;
            let expected = aspect_ratio(mask.width(), mask.height());
            let mut image = if crop {
                center_crop(&screenshot, expected)
            } else {
                screenshot
            };
            let warning = check_stretch(&image, expected);
            apply_mask_alpha(&mut image, &mask)?;
            debug!(mask = %asset, width = image.width(), height = image.height(), "applied mask");
            Ok(ShapedScreen { image, warning })
        }
        MaskSource::AspectRatio(expected) => {
            if !(expected.is_finite() && expected > 0.0) {
                return Err(Error::InvalidTemplateConfig(format!(
                    "template {:?} has a non-positive mask_aspect_ratio",
                    template.slug
                )));
            }
            let image = if crop {
                center_crop(&screenshot, expected)
            } else {
                screenshot
            };
            let warning = check_stretch(&image, expected);
            Ok(ShapedScreen { image, warning })
        }
    }
}

fn check_stretch(image: &RgbaImage, expected: f32) -> Option<PipelineWarning> {
    let warning = stretch_warning(aspect_ratio(image.width(), image.height()), expected);
    if let Some(warning) = &warning {
        debug!(%warning, "aspect mismatch");
    }
    warning
}
