use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "scrollreel", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse and validate a timeline document.
    Validate(ValidateArgs),
    /// Render the frame shown at one scroll offset as a PNG.
    Frame(FrameArgs),
    /// Sweep the whole scroll range, writing one PNG per step.
    Scrub(ScrubArgs),
}

#[derive(Parser, Debug)]
struct ValidateArgs {
    /// Timeline JSON.
    #[arg(long)]
    timeline: PathBuf,
}

#[derive(Parser, Debug)]
struct SourceArgs {
    /// Timeline JSON.
    #[arg(long)]
    timeline: PathBuf,

    /// Directory frame locators are resolved against. Without it, locators are fetched over
    /// HTTP (requires the `http` feature).
    #[arg(long)]
    root: Option<PathBuf>,

    /// Viewport width in pixels.
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Viewport height in pixels.
    #[arg(long, default_value_t = 720)]
    height: u32,

    /// Sampling filter.
    #[arg(long, value_enum, default_value_t = FilterChoice::Bilinear)]
    filter: FilterChoice,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Scroll offset in pixels.
    #[arg(long)]
    scroll: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct ScrubArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Scroll distance between captured frames, in pixels.
    #[arg(long, default_value_t = 400.0)]
    step: f64,

    /// Directory receiving `scrub_#####.png` files.
    #[arg(long)]
    out_dir: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FilterChoice {
    Nearest,
    Bilinear,
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Validate(args) => cmd_validate(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Scrub(args) => cmd_scrub(args),
    }
}

fn read_timeline(path: &Path) -> anyhow::Result<scrollreel::TimelineFile> {
    scrollreel::TimelineFile::from_path(path)
        .with_context(|| format!("load timeline '{}'", path.display()))
}

fn make_source(root: Option<&Path>) -> anyhow::Result<Arc<dyn scrollreel::FrameSource>> {
    if let Some(root) = root {
        return Ok(Arc::new(scrollreel::DirSource::new(root)));
    }
    http_source()
}

#[cfg(feature = "http")]
fn http_source() -> anyhow::Result<Arc<dyn scrollreel::FrameSource>> {
    Ok(Arc::new(scrollreel::HttpSource::new(
        std::time::Duration::from_secs(10),
    )))
}

#[cfg(not(feature = "http"))]
fn http_source() -> anyhow::Result<Arc<dyn scrollreel::FrameSource>> {
    anyhow::bail!("no --root given and scrollreel was built without the `http` feature")
}

fn make_driver(args: &SourceArgs) -> anyhow::Result<scrollreel::PlaybackDriver> {
    let file = read_timeline(&args.timeline)?;
    let source = make_source(args.root.as_deref())?;
    let filter = match args.filter {
        FilterChoice::Nearest => scrollreel::SampleFilter::Nearest,
        FilterChoice::Bilinear => scrollreel::SampleFilter::Bilinear,
    };
    let driver = scrollreel::PlaybackDriver::new(file.sequences, file.player, source)?
        .with_renderer(scrollreel::Renderer::new(filter));
    Ok(driver)
}

fn viewport(args: &SourceArgs) -> anyhow::Result<scrollreel::Viewport> {
    Ok(scrollreel::Viewport::non_empty(args.width, args.height)?)
}

/// Tick at `scroll_offset`, waiting for the active sequence to load first.
fn settle_and_tick(
    driver: &mut scrollreel::PlaybackDriver,
    sample: scrollreel::ScrollSample,
) -> scrollreel::TickReport {
    let report = driver.tick(sample);
    let Some(pos) = report.position else {
        return report;
    };
    if driver.load_state(pos.sequence_index).is_ready() && report.draw.is_some() {
        return report;
    }
    let wait = driver.config().initial_wait();
    if !driver.wait_ready(pos.sequence_index, wait) {
        tracing::warn!(sequence = pos.sequence_index, "sequence not ready; drawing what is loaded");
    }
    driver.tick(sample)
}

fn cmd_validate(args: ValidateArgs) -> anyhow::Result<()> {
    let file = read_timeline(&args.timeline)?;
    let t = &file.sequences;
    eprintln!(
        "ok: {} sequences, {} frames, scroll_factor {}",
        t.len(),
        t.total_frames(),
        file.player.scroll_factor
    );
    for (i, s) in t.sequences().iter().enumerate() {
        eprintln!(
            "  [{i}] {} ({} frames) {} -> {}",
            s.id,
            s.total_frames,
            s.label,
            s.frame_url(0)
        );
    }
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let viewport = viewport(&args.source)?;
    let mut driver = make_driver(&args.source)?;

    let report = settle_and_tick(
        &mut driver,
        scrollreel::ScrollSample {
            scroll_offset: args.scroll,
            viewport,
        },
    );
    if let Some(pos) = report.position {
        eprintln!(
            "sequence {} frame {} (progress {:.3})",
            pos.sequence_index, pos.frame_index, pos.progress
        );
    }
    if let Some(text) = driver.overlay_text() {
        eprintln!("overlay: {}", text.label);
    }

    driver.surface().save_png(&args.out)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_scrub(args: ScrubArgs) -> anyhow::Result<()> {
    if !args.step.is_finite() || args.step <= 0.0 {
        anyhow::bail!("--step must be finite and > 0");
    }
    let viewport = viewport(&args.source)?;
    let mut driver = make_driver(&args.source)?;
    driver.start();

    let extent = driver
        .timeline()
        .scroll_extent(f64::from(viewport.height), driver.config().scroll_factor);

    let mut n = 0u32;
    let mut offset = 0.0;
    while offset < extent {
        settle_and_tick(
            &mut driver,
            scrollreel::ScrollSample {
                scroll_offset: offset,
                viewport,
            },
        );
        let out = args.out_dir.join(format!("scrub_{n:05}.png"));
        driver.surface().save_png(&out)?;
        n += 1;
        offset += args.step;
    }

    eprintln!("wrote {n} frames to {}", args.out_dir.display());
    Ok(())
}
