//! Binary entrypoint for mockupgen.
//!
//! Resolves the template, then hands the screenshots to the batch driver.

use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser};
use tracing::{Level, debug, info};
use tracing_subscriber::{EnvFilter, fmt};

use mockupgen::asset::AssetRef;
use mockupgen::config::{self, Configuration};
use mockupgen::manifest::{self, DEFAULT_TEMPLATE_SOURCE};
use mockupgen::pipeline::PipelineOptions;
use mockupgen::processing::background::BackgroundMode;
use mockupgen::scan;
use mockupgen::tasks::batch::{self, Batch};
use mockupgen::template_model::{MockupTemplate, TemplateIndex};

/// Mock up one or more screenshots in a device frame
#[derive(Debug, Parser)]
#[command(name = "mockupgen", version, about)]
struct Cli {
    /// Screenshot files, directories or URLs
    #[arg(value_name = "SCREENSHOT", required_unless_present = "list")]
    screenshots: Vec<String>,

    /// Template number, name or slug
    #[arg(short = 't', value_name = "TEMPLATE")]
    template: Option<String>,

    /// Output file (the extension picks the format) or prefix
    #[arg(short = 'o', value_name = "OUTFILE")]
    out: Option<PathBuf>,

    /// Output width in pixels (the template is upscaled if needed)
    #[arg(short = 'w', value_name = "WIDTH", value_parser = clap::value_parser!(u32).range(1..))]
    width: Option<u32>,

    /// Crop the screenshot to the screen instead of stretching it
    #[arg(long)]
    crop: bool,

    /// Quarter turns to rotate the screenshot counter-clockwise
    #[arg(long, value_name = "R", default_value_t = 0, allow_negative_numbers = true)]
    rotate: i32,

    /// Screen brightness multiplier
    #[arg(long, value_name = "B")]
    brightness: Option<f32>,

    /// Screen contrast multiplier
    #[arg(long, value_name = "C")]
    contrast: Option<f32>,

    /// Put a blurred copy of the screenshot behind the device
    #[arg(long)]
    blur_background: bool,

    /// Background blur kernel size
    #[arg(long, value_name = "S")]
    blur_strength: Option<f32>,

    /// Put random geometric shapes behind the device
    #[arg(long)]
    geometric_background: bool,

    /// List the available templates and exit
    #[arg(long)]
    list: bool,

    /// Template directory or URL containing an index.json
    #[arg(long, value_name = "PATH/URL")]
    custom_templates: Option<String>,

    /// Path to an optional YAML config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Screenshots processed in parallel
    #[arg(short, long, value_name = "N")]
    jobs: Option<usize>,

    /// Seed for the geometric background
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbosity: u8) -> Result<()> {
    // map -v to log level
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let directive = format!("mockupgen={level}")
        .parse()
        .context("invalid log directive")?;
    let filter = EnvFilter::from_default_env().add_directive(directive);
    fmt().with_env_filter(filter).with_target(false).init();
    Ok(())
}

impl Cli {
    fn load_config(&self) -> Result<Configuration> {
        let mut cfg = match &self.config {
            Some(path) => config::from_yaml_file(path)
                .with_context(|| format!("loading config from {}", path.display()))?,
            None => Configuration::default(),
        };
        if let Some(source) = &self.custom_templates {
            cfg.template_source = source.clone();
        }
        if let Some(width) = self.width {
            cfg.output_width = Some(width);
        }
        cfg.crop |= self.crop;
        if self.geometric_background {
            cfg.background = BackgroundMode::Geometric;
        } else if self.blur_background {
            cfg.background = BackgroundMode::Blur;
        }
        if let Some(strength) = self.blur_strength {
            cfg.blur_strength = strength;
        }
        if let Some(jobs) = self.jobs {
            cfg.jobs = jobs;
        }
        if self.seed.is_some() {
            cfg.seed = self.seed;
        }
        cfg.validate().context("validating configuration")?;
        Ok(cfg)
    }

    fn pipeline_options(&self, cfg: &Configuration) -> PipelineOptions {
        PipelineOptions {
            rotate: self.rotate,
            brightness: self.brightness,
            contrast: self.contrast,
            ..cfg.pipeline_options()
        }
    }
}

/// Uses `-t` when it names a template; otherwise asks on the terminal until a
/// valid choice is made.
fn choose_template(index: &TemplateIndex, requested: Option<&str>) -> Result<MockupTemplate> {
    if let Some(query) = requested {
        match manifest::select(index, query) {
            Ok(template) => return Ok(template.clone()),
            Err(err) => eprintln!("{err}"),
        }
    }
    let stdin = io::stdin();
    if !stdin.is_terminal() {
        bail!("no valid template selected; pass one with -t");
    }
    let mut lines = stdin.lock().lines();
    loop {
        print!("{}", manifest::render_listing(index));
        print!("Select one: ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            bail!("no template selected");
        };
        match manifest::select(index, &line?) {
            Ok(template) => return Ok(template.clone()),
            Err(err) => eprintln!("{err}\n"),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let cfg = cli.load_config()?;
    debug!(?cfg, "effective configuration");

    let root = AssetRef::parse(&cfg.template_source);
    let index = manifest::load_index(&root)
        .with_context(|| format!("loading templates from {root}"))?;
    if cfg.template_source == DEFAULT_TEMPLATE_SOURCE {
        println!("Using mockupgen-templates (version {})", index.version_label());
    } else {
        println!(
            "Using custom templates from {root} (version {})",
            index.version_label()
        );
    }

    if cli.list {
        print!("{}", manifest::render_listing(&index));
        return Ok(());
    }

    let screenshots = scan::expand_inputs(&cli.screenshots);
    if screenshots.is_empty() {
        bail!("no screenshots found");
    }

    let template = choose_template(&index, cli.template.as_deref())?;
    println!("\nUsing template {} - {}", template.name, template.slug);
    if let Some(author) = &template.author {
        println!("Template by {author}");
    }
    if let Some(backlink) = &template.backlink {
        println!("Original template: {backlink}");
    }
    println!();

    let batch = Arc::new(Batch {
        template_root: root,
        template: Arc::new(template),
        options: cli.pipeline_options(&cfg),
        out: cli.out.clone(),
        seed: cfg.seed,
        max_in_flight: cfg.jobs,
    });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("starting runtime")?;
    let reports = runtime.block_on(batch::run(batch, screenshots));

    let mut failed = 0;
    for report in &reports {
        match &report.outcome {
            Ok(saved) => println!("Saved mockup as {}", saved.path.display()),
            Err(err) => {
                failed += 1;
                eprintln!("Error generating mockup for {}: {err:#}", report.screenshot);
            }
        }
    }
    info!(total = reports.len(), failed, "batch complete");
    if failed == reports.len() {
        bail!("no mockups were generated");
    }
    Ok(())
}
