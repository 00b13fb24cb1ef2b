pub mod asset;
pub mod config;
pub mod error;
pub mod manifest;
pub mod output;
pub mod pipeline;
pub mod scan;
pub mod processing {
    pub mod background;
    pub mod blur;
    pub mod color;
    pub mod composite;
    pub mod layout;
    pub mod loader;
    pub mod mask;
    pub mod resize;
    pub mod warp;
}
pub mod tasks {
    pub mod batch;
}

pub use error::{Error, Result};
pub use pipeline::{Mockup, PipelineOptions, PipelineWarning, generate_mockup};
pub use template_model;
