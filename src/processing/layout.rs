/// A pixel rectangle inside an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

pub fn aspect_ratio(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}

/// Largest rectangle of `aspect` (width / height) centered inside
/// `src_w` x `src_h`. The binding dimension is kept whole.
pub fn center_crop_rect(src_w: u32, src_h: u32, aspect: f32) -> CropRect {
    let iw = src_w.max(1) as f64;
    let ih = src_h.max(1) as f64;
    let aspect = f64::from(aspect);
    if !aspect.is_finite() || aspect <= 0.0 {
        return CropRect {
            x: 0,
            y: 0,
            width: src_w,
            height: src_h,
        };
    }
    let (crop_w, crop_h) = if aspect > iw / ih {
        (iw, iw / aspect)
    } else {
        (ih * aspect, ih)
    };
    let (cx, cy) = (iw / 2.0, ih / 2.0);
    let x0 = (cx - crop_w / 2.0).max(0.0) as u32;
    let x1 = ((cx + crop_w / 2.0) as u32).min(src_w);
    let y0 = (cy - crop_h / 2.0).max(0.0) as u32;
    let y1 = ((cy + crop_h / 2.0) as u32).min(src_h);
    CropRect {
        x: x0.min(src_w.saturating_sub(1)),
        y: y0.min(src_h.saturating_sub(1)),
        width: x1.saturating_sub(x0).max(1),
        height: y1.saturating_sub(y0).max(1),
    }
}

/// Dimensions after scaling both axes by `factor`, rounded to whole pixels.
pub fn scaled_size(width: u32, height: u32, factor: f64) -> (u32, u32) {
    let w = (f64::from(width) * factor).round().max(1.0);
    let h = (f64::from(height) * factor).round().max(1.0);
    (w as u32, h as u32)
}

/// Dimensions for an exact target width, keeping the aspect ratio.
pub fn size_for_width(width: u32, height: u32, target_width: u32) -> (u32, u32) {
    let target_width = target_width.max(1);
    let h = (f64::from(height) * f64::from(target_width) / f64::from(width.max(1))) as u32;
    (target_width, h.max(1))
}

/// `true` when either ratio exceeds the other by more than 10%.
pub fn is_stretched(actual: f32, expected: f32) -> bool {
    actual / expected > 1.1 || expected / actual > 1.1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crop_keeps_width_for_wider_target() {
        let rect = center_crop_rect(100, 200, 1.0);
        assert_eq!(rect, CropRect { x: 0, y: 50, width: 100, height: 100 });
    }

    #[test]
    fn crop_keeps_height_for_narrower_target() {
        let rect = center_crop_rect(300, 100, 0.5);
        assert_eq!(rect, CropRect { x: 125, y: 0, width: 50, height: 100 });
    }

    #[test]
    fn crop_ratio_within_one_pixel() {
        for &(w, h) in &[(1170, 2532), (2532, 1170), (333, 777), (1000, 1000), (17, 5)] {
            for &aspect in &[0.4617f32, 0.75, 1.0, 1.6, 2.35] {
                let rect = center_crop_rect(w, h, aspect);
                assert!(rect.x + rect.width <= w && rect.y + rect.height <= h);
                let expected_w = rect.height as f32 * aspect;
                assert!(
                    (rect.width as f32 - expected_w).abs() <= 1.0 + aspect,
                    "{w}x{h} @ {aspect}: {rect:?}"
                );
                assert!(rect.width == w || rect.height == h);
            }
        }
    }

    #[test]
    fn sizes() {
        assert_eq!(scaled_size(400, 800, 4.0), (1600, 3200));
        assert_eq!(scaled_size(1601, 3199, 0.25), (400, 800));
        assert_eq!(size_for_width(400, 800, 300), (300, 600));
        assert_eq!(size_for_width(3, 7, 2), (2, 4));
    }

    #[test]
    fn stretch_threshold_is_ten_percent() {
        assert!(!is_stretched(1.0, 1.05));
        assert!(!is_stretched(1.05, 1.0));
        assert!(is_stretched(1.2, 1.0));
        assert!(is_stretched(0.5, 0.6));
    }
}
