use image::RgbaImage;
use image::imageops::{self, GaussianBlurParameters};
use tracing::trace;

/// Forces a blur strength onto an odd kernel size (at least 1).
pub fn odd_kernel_size(strength: f32) -> u32 {
    let size = if strength.is_finite() && strength > 0.0 {
        strength as u32
    } else {
        0
    };
    if size % 2 == 0 { size + 1 } else { size }
}

/// Sigma implied by a kernel size when no explicit sigma is given.
pub fn sigma_for_kernel(kernel_size: u32) -> f32 {
    0.3 * ((kernel_size as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Gaussian blur over all four channels with an explicit odd kernel size.
pub fn gaussian_blur(image: &RgbaImage, kernel_size: u32) -> RgbaImage {
    let kernel_size = kernel_size.max(1) | 1;
    if kernel_size == 1 || image.width() == 0 || image.height() == 0 {
        return image.clone();
    }
    trace!(kernel_size, sigma = sigma_for_kernel(kernel_size), "gaussian blur");
    imageops::blur_advanced(
        image,
        GaussianBlurParameters::new_from_kernel_size(kernel_size as f32),
    )
}
