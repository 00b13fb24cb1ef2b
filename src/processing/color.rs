use image::{RgbaImage, imageops};
use palette::{FromColor, Hsv, Srgb};
use template_model::Levels;

/// Linear levels remap: `out = clip(in * (white - black) / 255 + black)` on
/// the color channels. Alpha is untouched.
pub fn apply_levels(image: &mut RgbaImage, levels: &Levels) {
    if levels.is_identity() {
        return;
    }
    let black = levels.black.0.map(f64::from);
    let white = levels.white.0.map(f64::from);
    let scale = [0, 1, 2].map(|c| (white[c] - black[c]) / 255.0);
    for pixel in image.pixels_mut() {
        for c in 0..3 {
            let value = f64::from(pixel[c]) * scale[c] + black[c];
            pixel[c] = value.clamp(0.0, 255.0) as u8;
        }
    }
}

/// Maps a contrast multiplier (1.0 = unchanged) onto the classic
/// `131 (x + 127) / (127 (131 - x))` curve factor.
pub fn contrast_factor(amount: f32) -> f64 {
    let x = f64::from(amount) * 127.0 - 127.0;
    131.0 * (x + 127.0) / (127.0 * (131.0 - x))
}

pub fn apply_contrast(image: &mut RgbaImage, amount: f32) {
    if (amount - 1.0).abs() <= f32::EPSILON {
        return;
    }
    let factor = contrast_factor(amount);
    let bias = 127.0 * (1.0 - factor);
    for pixel in image.pixels_mut() {
        for channel in &mut pixel.0[0..3] {
            let value = f64::from(*channel) * factor + bias;
            *channel = value.round().clamp(0.0, 255.0) as u8;
        }
    }
}

/// Scales the HSV value channel by `amount`, clipping at full brightness.
pub fn apply_brightness(image: &mut RgbaImage, amount: f32) {
    if (amount - 1.0).abs() <= f32::EPSILON {
        return;
    }
    let amount = amount.max(0.0);
    for pixel in image.pixels_mut() {
        let [r, g, b, _] = pixel.0;
        let srgb = Srgb::new(r, g, b).into_format::<f32>();
        let mut hsv: Hsv = Hsv::from_color(srgb);
        hsv.value = (hsv.value * amount).clamp(0.0, 1.0);
        let rgb: Srgb = Srgb::from_color(hsv);
        for (channel, value) in pixel.0[0..3].iter_mut().zip([rgb.red, rgb.green, rgb.blue]) {
            *channel = (value * 255.0).round().clamp(0.0, 255.0) as u8;
        }
    }
}

/// Rotates counter-clockwise by `turns` quarter turns; negative values turn
/// clockwise.
pub fn rotate_quarter_turns(image: &RgbaImage, turns: i32) -> RgbaImage {
    match turns.rem_euclid(4) {
        1 => imageops::rotate270(image),
        2 => imageops::rotate180(image),
        3 => imageops::rotate90(image),
        _ => image.clone(),
    }
}
