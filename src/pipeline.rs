//! Per-screenshot mockup generation.
//!
//! [`generate_mockup`] runs every stage in a fixed order: load, upscale the
//! template photo, adjust the screenshot's colors, shape it with the template's
//! mask, warp it onto the screen quadrilateral, composite, downscale and
//! optionally place a synthesized backdrop behind the device.

use image::RgbaImage;
use rand::Rng;
use template_model::MockupTemplate;
use tracing::{debug, info};

use crate::asset::AssetRef;
use crate::error::{Error, Result};
use crate::processing::background::{self, BackgroundMode};
use crate::processing::color::{apply_brightness, apply_contrast, apply_levels, rotate_quarter_turns};
use crate::processing::composite::{alpha_over, downsample_canvas};
use crate::processing::layout::scaled_size;
use crate::processing::loader::load_image;
use crate::processing::mask::shape_screen;
use crate::processing::resize::{Filter, resize_rgba};
use crate::processing::warp::{screen_projection, warp_perspective};

pub use crate::processing::mask::PipelineWarning;

/// The template photo is always enlarged by this factor before warping so the
/// final downscale hides resampling artifacts.
pub const OVERSAMPLE: f64 = 4.0;

pub const DEFAULT_BLUR_STRENGTH: f32 = 21.0;

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOptions {
    /// Final width in pixels; height follows the aspect ratio.
    pub output_width: Option<u32>,
    /// Center-crop the screenshot to the screen's aspect instead of stretching.
    pub crop: bool,
    /// Counter-clockwise quarter turns applied after color adjustment.
    pub rotate: i32,
    pub brightness: Option<f32>,
    pub contrast: Option<f32>,
    pub background: BackgroundMode,
    pub blur_strength: f32,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            output_width: None,
            crop: false,
            rotate: 0,
            brightness: None,
            contrast: None,
            background: BackgroundMode::None,
            blur_strength: DEFAULT_BLUR_STRENGTH,
        }
    }
}

/// A finished mockup plus anything worth telling the user about it.
#[derive(Debug, Clone)]
pub struct Mockup {
    pub image: RgbaImage,
    pub warnings: Vec<PipelineWarning>,
}

/// Composites `screenshot` into `template`, resolving template assets against
/// `template_root`.
///
/// # Errors
/// Fails when an image cannot be loaded or decoded, when the template is
/// inconsistent, or when its screen points do not describe a quadrilateral.
pub fn generate_mockup(
    template_root: &AssetRef,
    screenshot: &AssetRef,
    template: &MockupTemplate,
    options: &PipelineOptions,
    rng: &mut impl Rng,
) -> Result<Mockup> {
    let shot = load_image(screenshot)?;
    let base_asset = template_root.join(&template.base_file);
    let base = load_image(&base_asset)?;
    debug!(
        screenshot = %screenshot,
        base = %base_asset,
        shot_w = shot.width(),
        shot_h = shot.height(),
        base_w = base.width(),
        base_h = base.height(),
        "loaded inputs"
    );

    let (mut canvas, point_scale) = upscale_base(&base, options.output_width)?;

    let shot = adjust_screenshot(shot, template, options)?;
    let shaped = shape_screen(shot, template, template_root, options.crop)?;
    let warnings: Vec<PipelineWarning> = shaped.warning.into_iter().collect();

    let quad = template.screen_points.scaled(point_scale as f32);
    let projection = screen_projection(&shaped.image, &quad)?;
    let warped = warp_perspective(&shaped.image, &projection, canvas.width(), canvas.height());
    alpha_over(&mut canvas, &warped)?;

    let mut image = downsample_canvas(&canvas, OVERSAMPLE, options.output_width)?;
    let backdrop = background::synthesize(
        options.background,
        &shaped.image,
        image.width(),
        image.height(),
        options.blur_strength,
        rng,
    )?;
    if let Some(backdrop) = backdrop {
        image = background::blend_behind(&image, &backdrop)?;
    }

    info!(
        template = %template.slug,
        width = image.width(),
        height = image.height(),
        "generated mockup"
    );
    Ok(Mockup { image, warnings })
}

/// Enlarges the template photo for warping. Returns the canvas and the factor
/// the screen points must be scaled by to land on it.
///
/// When an output width is requested and the photo's height is below it, the
/// photo is first grown by `output_width / height`.
pub fn upscale_base(base: &RgbaImage, output_width: Option<u32>) -> Result<(RgbaImage, f64)> {
    let mut factor = 1.0;
    let mut base = match output_width {
        Some(target) if base.height() > 0 && base.height() < target => {
            factor = f64::from(target) / f64::from(base.height());
            let (w, h) = scaled_size(base.width(), base.height(), factor);
            debug!(factor, w, h, "pre-upscaling template photo");
            resize_rgba(base, w, h, Filter::CatmullRom)?
        }
        _ => base.clone(),
    };
    let (w, h) = scaled_size(base.width(), base.height(), OVERSAMPLE);
    base = resize_rgba(&base, w, h, Filter::CatmullRom)?;
    Ok((base, factor * OVERSAMPLE))
}

/// Template adjustments first (levels, contrast, brightness), then the
/// caller's contrast and brightness, then rotation.
pub fn adjust_screenshot(
    mut shot: RgbaImage,
    template: &MockupTemplate,
    options: &PipelineOptions,
) -> Result<RgbaImage> {
    let levels = template
        .levels()
        .map_err(|err| Error::InvalidTemplateConfig(format!("{err:#}")))?;
    if let Some(levels) = levels {
        apply_levels(&mut shot, &levels);
    }
    if let Some(amount) = template.contrast {
        apply_contrast(&mut shot, amount);
    }
    if let Some(amount) = template.brightness {
        apply_brightness(&mut shot, amount);
    }
    if let Some(amount) = options.contrast {
        apply_contrast(&mut shot, amount);
    }
    if let Some(amount) = options.brightness {
        apply_brightness(&mut shot, amount);
    }
    if options.rotate % 4 != 0 {
        shot = rotate_quarter_turns(&shot, options.rotate);
    }
    Ok(shot)
}
