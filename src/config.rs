//! Optional YAML run configuration.
//!
//! Every key is optional; command-line flags override whatever is loaded here.

use std::num::NonZeroUsize;
use std::path::Path;

use anyhow::{Result, ensure};
use serde::Deserialize;

use crate::error::Error;
use crate::manifest::DEFAULT_TEMPLATE_SOURCE;
use crate::pipeline::{DEFAULT_BLUR_STRENGTH, PipelineOptions};
use crate::processing::background::BackgroundMode;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Configuration {
    /// Directory or URL holding `index.json` and the template images.
    pub template_source: String,
    /// Default output width in pixels.
    pub output_width: Option<u32>,
    /// Crop screenshots to the screen aspect instead of stretching them.
    pub crop: bool,
    pub background: BackgroundMode,
    /// Gaussian kernel size for the blurred background; even values are bumped.
    pub blur_strength: f32,
    /// Maximum number of screenshots processed at once.
    pub jobs: usize,
    /// Base seed for the geometric background generator.
    pub seed: Option<u64>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            template_source: DEFAULT_TEMPLATE_SOURCE.to_string(),
            output_width: None,
            crop: false,
            background: BackgroundMode::None,
            blur_strength: DEFAULT_BLUR_STRENGTH,
            jobs: Self::default_jobs(),
            seed: None,
        }
    }
}

impl Configuration {
    fn default_jobs() -> usize {
        std::thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1)
    }

    /// Validate invariants that serde defaults cannot express.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            !self.template_source.trim().is_empty(),
            "template-source must not be empty"
        );
        ensure!(self.jobs > 0, "jobs must be greater than zero");
        ensure!(
            self.output_width != Some(0),
            "output-width must be greater than zero"
        );
        ensure!(
            self.blur_strength.is_finite() && self.blur_strength >= 1.0,
            "blur-strength must be at least 1"
        );
        Ok(())
    }

    /// Pipeline options carrying this configuration's defaults.
    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            output_width: self.output_width,
            crop: self.crop,
            background: self.background,
            blur_strength: self.blur_strength,
            ..PipelineOptions::default()
        }
    }
}

pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Configuration, Error> {
    let s = std::fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&s)?)
}
