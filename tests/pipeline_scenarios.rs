use std::path::Path;

use image::{Rgba, RgbaImage};
use mockupgen::asset::AssetRef;
use mockupgen::processing::background::BackgroundMode;
use mockupgen::template_model::{MockupTemplate, ScreenPoints};
use mockupgen::{Error, PipelineOptions, PipelineWarning, generate_mockup};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tempfile::tempdir;

const BLUE: Rgba<u8> = Rgba([20, 40, 220, 255]);
const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

fn phone_template() -> MockupTemplate {
    MockupTemplate {
        name: "Flat Phone".into(),
        slug: "flat-phone".into(),
        base_file: "base.png".into(),
        screen_points: ScreenPoints([[40.0, 60.0], [40.0, 740.0], [360.0, 740.0], [360.0, 60.0]]),
        mask_file: None,
        mask_aspect_ratio: Some(0.5),
        black_white_point: None,
        contrast: None,
        brightness: None,
        category: None,
        author: None,
        backlink: None,
    }
}

fn write_fixtures(dir: &Path) -> AssetRef {
    RgbaImage::from_pixel(400, 800, BLUE)
        .save(dir.join("base.png"))
        .unwrap();
    RgbaImage::from_pixel(100, 200, RED)
        .save(dir.join("shot.png"))
        .unwrap();
    AssetRef::Local(dir.join("shot.png"))
}

fn close(a: Rgba<u8>, b: Rgba<u8>) -> bool {
    a.0.iter().zip(b.0.iter()).all(|(x, y)| x.abs_diff(*y) <= 2)
}

#[test]
fn red_screenshot_fills_the_screen_quad() {
    let dir = tempdir().unwrap();
    let shot = write_fixtures(dir.path());
    let root = AssetRef::Local(dir.path().to_path_buf());
    let mut rng = StdRng::seed_from_u64(0);

    let mockup = generate_mockup(
        &root,
        &shot,
        &phone_template(),
        &PipelineOptions::default(),
        &mut rng,
    )
    .unwrap();

    assert_eq!(mockup.image.dimensions(), (400, 800));
    assert!(mockup.warnings.is_empty());
    for (x, y) in [(200, 400), (50, 70), (350, 730)] {
        let px = *mockup.image.get_pixel(x, y);
        assert!(close(px, RED), "({x},{y}) = {px:?}");
    }
    for (x, y) in [(10, 10), (20, 400), (390, 790), (200, 30), (200, 770)] {
        let px = *mockup.image.get_pixel(x, y);
        assert!(close(px, BLUE), "({x},{y}) = {px:?}");
    }
}

#[test]
fn output_width_rescales_the_result() {
    let dir = tempdir().unwrap();
    let shot = write_fixtures(dir.path());
    let root = AssetRef::Local(dir.path().to_path_buf());
    let options = PipelineOptions {
        output_width: Some(200),
        ..PipelineOptions::default()
    };
    let mockup = generate_mockup(
        &root,
        &shot,
        &phone_template(),
        &options,
        &mut StdRng::seed_from_u64(0),
    )
    .unwrap();
    assert_eq!(mockup.image.dimensions(), (200, 400));
    assert!(close(*mockup.image.get_pixel(100, 200), RED));
}

#[test]
fn mismatched_aspect_is_a_warning() {
    let dir = tempdir().unwrap();
    let _ = write_fixtures(dir.path());
    RgbaImage::from_pixel(200, 200, RED)
        .save(dir.path().join("square.png"))
        .unwrap();
    let root = AssetRef::Local(dir.path().to_path_buf());
    let shot = AssetRef::Local(dir.path().join("square.png"));
    let mockup = generate_mockup(
        &root,
        &shot,
        &phone_template(),
        &PipelineOptions::default(),
        &mut StdRng::seed_from_u64(0),
    )
    .unwrap();
    assert!(matches!(
        mockup.warnings.as_slice(),
        [PipelineWarning::Stretched { .. }]
    ));
}

#[test]
fn even_blur_strength_still_produces_an_opaque_mockup() {
    let dir = tempdir().unwrap();
    let shot = write_fixtures(dir.path());
    let root = AssetRef::Local(dir.path().to_path_buf());
    let options = PipelineOptions {
        output_width: Some(100),
        background: BackgroundMode::Blur,
        blur_strength: 20.0,
        ..PipelineOptions::default()
    };
    let mockup = generate_mockup(
        &root,
        &shot,
        &phone_template(),
        &options,
        &mut StdRng::seed_from_u64(0),
    )
    .unwrap();
    assert_eq!(mockup.image.dimensions(), (100, 200));
    assert!(mockup.image.pixels().all(|p| p[3] == 255));
}

#[test]
fn transparent_base_shows_geometric_backdrop() {
    let dir = tempdir().unwrap();
    let shot = write_fixtures(dir.path());
    RgbaImage::from_pixel(400, 800, Rgba([0, 0, 0, 0]))
        .save(dir.path().join("base.png"))
        .unwrap();
    let root = AssetRef::Local(dir.path().to_path_buf());
    let options = PipelineOptions {
        output_width: Some(120),
        background: BackgroundMode::Geometric,
        ..PipelineOptions::default()
    };
    let run = |seed| {
        generate_mockup(
            &root,
            &shot,
            &phone_template(),
            &options,
            &mut StdRng::seed_from_u64(seed),
        )
        .unwrap()
        .image
    };
    let first = run(1);
    let second = run(2);
    assert_eq!(first.dimensions(), second.dimensions());
    assert!(first.pixels().all(|p| p[3] == 255));
    assert!(second.pixels().all(|p| p[3] == 255));
    assert_ne!(first.as_raw(), second.as_raw());
}

#[test]
fn template_without_mask_configuration_fails() {
    let dir = tempdir().unwrap();
    let shot = write_fixtures(dir.path());
    let root = AssetRef::Local(dir.path().to_path_buf());
    let mut template = phone_template();
    template.mask_aspect_ratio = None;
    let err = generate_mockup(
        &root,
        &shot,
        &template,
        &PipelineOptions::default(),
        &mut StdRng::seed_from_u64(0),
    )
    .unwrap_err();
    assert!(matches!(err, Error::InvalidTemplateConfig(_)));
}

#[test]
fn missing_screenshot_is_not_found() {
    let dir = tempdir().unwrap();
    let _ = write_fixtures(dir.path());
    let root = AssetRef::Local(dir.path().to_path_buf());
    let err = generate_mockup(
        &root,
        &AssetRef::Local(dir.path().join("nope.png")),
        &phone_template(),
        &PipelineOptions::default(),
        &mut StdRng::seed_from_u64(0),
    )
    .unwrap_err();
    assert!(matches!(err, Error::ImageNotFound(_)));
}

#[test]
fn collapsed_screen_points_are_rejected() {
    let dir = tempdir().unwrap();
    let shot = write_fixtures(dir.path());
    let root = AssetRef::Local(dir.path().to_path_buf());
    let mut template = phone_template();
    template.screen_points = ScreenPoints([[10.0, 10.0]; 4]);
    let err = generate_mockup(
        &root,
        &shot,
        &template,
        &PipelineOptions::default(),
        &mut StdRng::seed_from_u64(0),
    )
    .unwrap_err();
    assert!(matches!(err, Error::DegenerateQuad));
}
