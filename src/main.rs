//! Command-line front end: decides the status-bar icon style for images on disk
//! or for the bundled demo backgrounds.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use image::RgbaImage;
use tracing::{Level, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use statusbar_tint::chrome::SystemUiFlags;
use statusbar_tint::Region;
use statusbar_tint::config::Configuration;
use statusbar_tint::processing::color::to_hex;
use statusbar_tint::samples::DemoImage;
use statusbar_tint::scan::{ScanOptions, collect_images};
use statusbar_tint::selector::{Analysis, StyleSelector};
use statusbar_tint::tasks::analyzer;

#[derive(Debug, Parser)]
#[command(
    name = "statusbar-tint",
    about = "Pick light or dark status-bar icons from the image behind the status bar"
)]
struct Cli {
    /// Images or directories of images to analyze
    #[arg(value_name = "PATH")]
    paths: Vec<PathBuf>,

    /// Path to YAML config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Analyze the dark, light and split demo backgrounds
    #[arg(long)]
    demo: bool,

    /// Override the screen width (px)
    #[arg(long, value_name = "PX")]
    screen_width: Option<u32>,

    /// Override the status bar height (px)
    #[arg(long, value_name = "PX")]
    status_bar_height: Option<u32>,

    /// Override the luminance threshold in [0, 1]
    #[arg(long, value_name = "F")]
    threshold: Option<f64>,

    /// Override the maximum number of swatches
    #[arg(long, value_name = "N")]
    max_swatches: Option<usize>,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbosity: u8) -> Result<()> {
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::from_default_env().add_directive(
        format!("statusbar_tint={level}")
            .parse()
            .context("invalid log directive")?,
    );
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn load_config(cli: &Cli) -> Result<Configuration> {
    let mut cfg = match &cli.config {
        Some(path) => Configuration::from_yaml_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Configuration::default(),
    };
    if let Some(w) = cli.screen_width {
        cfg.display.screen_width = w;
    }
    if let Some(h) = cli.status_bar_height {
        cfg.display.status_bar_height = h;
    }
    if let Some(t) = cli.threshold {
        cfg.analysis.luminance_threshold = t;
    }
    if let Some(n) = cli.max_swatches {
        cfg.analysis.max_swatches = n;
    }
    cfg.validated().context("validating configuration")
}

fn report(name: &str, analysis: Option<&Analysis>, flags: SystemUiFlags) {
    match analysis {
        Some(a) => println!(
            "{name}: {} luminance={:.4} swatch={} population={} flags={:#06x}",
            a.decision,
            a.luminance,
            to_hex(a.dominant.rgb),
            a.dominant.population,
            flags.bits()
        ),
        None => println!("{name}: unchanged flags={:#06x}", flags.bits()),
    }
}

/// Analyze one image and update `flags`. A failed analysis is logged and the
/// previous style is kept.
async fn analyze_and_report(
    selector: &Arc<StyleSelector>,
    name: &str,
    image: Arc<RgbaImage>,
    region: Region,
    flags: &mut SystemUiFlags,
) {
    match analyzer::analyze_into(Arc::clone(selector), image, region, &mut *flags).await {
        Ok(outcome) => report(name, outcome.as_ref(), *flags),
        Err(err) => {
            warn!(image = %name, error = %err, "analysis failed");
            report(name, None, *flags);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let cfg = load_config(&cli)?;
    let selector = Arc::new(StyleSelector::from_options(&cfg.analysis)?);
    let region = cfg.display.status_bar_region();
    info!(?region, threshold = selector.luminance_threshold(), "analysis configured");

    let mut images: Vec<(String, Arc<RgbaImage>)> = Vec::new();
    if cli.demo || cli.paths.is_empty() {
        let w = cfg.display.screen_width;
        let h = w.saturating_mul(16) / 9;
        for demo in DemoImage::ALL {
            images.push((demo.to_string(), Arc::new(demo.render(w, h))));
        }
    }

    let files = collect_images(&cli.paths, &ScanOptions::default())?;
    info!(count = files.len(), "collected images");

    let mut flags = SystemUiFlags::default();
    for (name, image) in images {
        analyze_and_report(&selector, &name, image, region, &mut flags).await;
    }

    for path in files {
        let name = path.display().to_string();
        let image = match image::open(&path) {
            Ok(img) => Arc::new(img.to_rgba8()),
            Err(err) => {
                // keep the previous style, as with any failed analysis
                warn!(path = %name, error = %err, "failed to decode image");
                report(&name, None, flags);
                continue;
            }
        };
        analyze_and_report(&selector, &name, image, region, &mut flags).await;
    }

    Ok(())
}
