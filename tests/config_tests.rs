use mockupgen::config::{self, Configuration};
use mockupgen::manifest::DEFAULT_TEMPLATE_SOURCE;
use mockupgen::processing::background::BackgroundMode;

#[test]
fn parse_kebab_case_config() {
    let yaml = r#"
template-source: "./templates"
output-width: 1200
crop: true
background: geometric
blur-strength: 31
jobs: 2
seed: 7
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(cfg.template_source, "./templates");
    assert_eq!(cfg.output_width, Some(1200));
    assert!(cfg.crop);
    assert_eq!(cfg.background, BackgroundMode::Geometric);
    assert!((cfg.blur_strength - 31.0).abs() < f32::EPSILON);
    assert_eq!(cfg.jobs, 2);
    assert_eq!(cfg.seed, Some(7));
    cfg.validate().unwrap();
}

#[test]
fn missing_keys_fall_back_to_defaults() {
    let cfg: Configuration = serde_yaml::from_str("crop: true\n").unwrap();
    assert_eq!(cfg.template_source, DEFAULT_TEMPLATE_SOURCE);
    assert_eq!(cfg.background, BackgroundMode::None);
    assert!((cfg.blur_strength - 21.0).abs() < f32::EPSILON);
    assert!(cfg.jobs >= 1);
    assert_eq!(cfg.seed, None);

    let options = cfg.pipeline_options();
    assert!(options.crop);
    assert_eq!(options.rotate, 0);
    assert_eq!(options.brightness, None);
}

#[test]
fn unknown_background_is_rejected() {
    let err = serde_yaml::from_str::<Configuration>("background: sparkles\n");
    assert!(err.is_err());
}

#[test]
fn validation_rejects_zero_jobs_and_width() {
    let cfg = Configuration {
        jobs: 0,
        ..Configuration::default()
    };
    assert!(cfg.validate().is_err());

    let cfg = Configuration {
        output_width: Some(0),
        ..Configuration::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn loads_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mockupgen.yaml");
    std::fs::write(&path, "background: blur\nblur-strength: 9\n").unwrap();
    let cfg = config::from_yaml_file(&path).unwrap();
    assert_eq!(cfg.background, BackgroundMode::Blur);
    assert!(config::from_yaml_file(dir.path().join("absent.yaml")).is_err());
}

#[test]
fn load_failures_name_their_cause() {
    let dir = tempfile::tempdir().unwrap();
    let missing = config::from_yaml_file(dir.path().join("absent.yaml")).unwrap_err();
    assert!(matches!(missing, mockupgen::Error::Io(_)));
    assert!(missing.to_string().starts_with("filesystem error:"));

    let path = dir.path().join("broken.yaml");
    std::fs::write(&path, "jobs: [not, a, number]\n").unwrap();
    let broken = config::from_yaml_file(&path).unwrap_err();
    assert!(matches!(broken, mockupgen::Error::Config(_)));
    assert!(broken.to_string().starts_with("malformed settings file:"));
}
