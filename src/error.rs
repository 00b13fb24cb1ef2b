use thiserror::Error;

/// Library error type for mockup generation.
///
/// Every variant is terminal for the screenshot being processed; callers
/// driving a batch should log it and move on to the next input.
#[derive(Debug, Error)]
pub enum Error {
    /// The asset does not exist or could not be fetched.
    #[error("image not found: {0}")]
    ImageNotFound(String),

    /// The asset exists but its bytes could not be decoded.
    #[error("failed to decode image {path}: {source}")]
    ImageDecode {
        path: String,
        #[source]
        source: image::ImageError,
    },

    /// Decoded pixels could not be normalized to 8-bit RGBA.
    #[error("unsupported image format for {path}: {detail}")]
    UnsupportedImageFormat { path: String, detail: String },

    /// A mask file is declared by the template but cannot be used.
    #[error("invalid template asset {path}: {reason}")]
    InvalidTemplateAsset { path: String, reason: String },

    /// The template record itself is inconsistent.
    #[error("invalid template configuration: {0}")]
    InvalidTemplateConfig(String),

    /// The screen quadrilateral collapses and has no projective mapping.
    #[error("screen points do not form a usable quadrilateral")]
    DegenerateQuad,

    /// Resampling an intermediate image failed.
    #[error("resize failed: {0}")]
    Resize(String),

    /// The template index could not be read or fetched.
    #[error("template index not found: {0}")]
    ManifestNotFound(String),

    /// The template index is not valid JSON for the expected schema.
    #[error("failed to parse template index {path}: {source}")]
    Manifest {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// No template matches the requested number, name or slug.
    #[error("unknown template selection {0:?}")]
    UnknownTemplate(String),

    /// Writing the finished mockup failed.
    #[error("failed to encode {path}: {reason}")]
    Encode { path: String, reason: String },

    /// Reading a local asset or writing an output file failed.
    #[error("filesystem error: {0}")]
    Io(#[from] std::io::Error),

    /// A settings file could not be deserialized.
    #[error("malformed settings file: {0}")]
    Config(#[from] serde_yaml::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
