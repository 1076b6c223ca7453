use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use rayon::prelude::*;

// 60 Hz tick cadence; with synchronous loads the default fade settles in
// well under a second of simulated time.
const TICK_SECS: f64 = 1.0 / 60.0;
const MAX_TICKS: u32 = 600;

#[derive(Parser, Debug)]
#[command(name = "vitrine", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the settled selection as a single PNG.
    Render(RenderArgs),
    /// Render every tick of the transition as numbered PNGs.
    Sequence(SequenceArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Product color, e.g. `red`.
    #[arg(long)]
    color: String,

    /// Handle material, e.g. `wood`.
    #[arg(long)]
    material: String,

    /// Optional cushion pattern, e.g. `plaid`.
    #[arg(long)]
    cushion: Option<String>,

    /// Directory the `assets/` tree lives under.
    #[arg(long, default_value = ".")]
    assets_root: PathBuf,

    /// Optional visualizer settings JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Transition style, overriding the settings file.
    #[arg(long, value_enum)]
    style: Option<StyleChoice>,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct SequenceArgs {
    /// Product color, e.g. `red`.
    #[arg(long)]
    color: String,

    /// Handle material, e.g. `wood`.
    #[arg(long)]
    material: String,

    /// Optional cushion pattern, e.g. `plaid`.
    #[arg(long)]
    cushion: Option<String>,

    /// Directory the `assets/` tree lives under.
    #[arg(long, default_value = ".")]
    assets_root: PathBuf,

    /// Optional visualizer settings JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Transition style, overriding the settings file.
    #[arg(long, value_enum)]
    style: Option<StyleChoice>,

    /// Output directory for frame_NNN.png files.
    #[arg(long)]
    out_dir: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StyleChoice {
    Instant,
    FadeIn,
}

impl From<StyleChoice> for vitrine::TransitionStyle {
    fn from(choice: StyleChoice) -> Self {
        match choice {
            StyleChoice::Instant => Self::Instant,
            StyleChoice::FadeIn => Self::FadeIn,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Sequence(args) => cmd_sequence(args),
    }
}

fn read_config(path: Option<&Path>) -> anyhow::Result<vitrine::VisualizerConfig> {
    let Some(path) = path else {
        return Ok(vitrine::VisualizerConfig::default());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("read config '{}'", path.display()))?;
    Ok(vitrine::VisualizerConfig::from_json(&json)?)
}

fn make_selection(color: &str, material: &str, cushion: Option<&str>) -> vitrine::Selection {
    let selection = vitrine::Selection::new(color, material);
    match cushion {
        Some(cushion) => selection.with_cushion(cushion),
        None => selection,
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut config = read_config(args.config.as_deref())?;
    if let Some(style) = args.style {
        config.style = style.into();
    }
    let mut compositor = vitrine::Compositor::new(&config)?;
    let mut store = vitrine::FsTextureStore::new(&args.assets_root);

    let selection = make_selection(&args.color, &args.material, args.cushion.as_deref());
    compositor.refresh(&mut store, &selection)?;

    if !compositor.settle(&mut store, TICK_SECS, MAX_TICKS) {
        anyhow::bail!("refresh did not settle within {MAX_TICKS} ticks");
    }
    if compositor.display().base.is_none() {
        anyhow::bail!("no layers committed; see the logged texture errors");
    }

    let frame = vitrine::render_stage(compositor.stage())?;
    write_png(&args.out, &frame)?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_sequence(args: SequenceArgs) -> anyhow::Result<()> {
    let mut config = read_config(args.config.as_deref())?;
    if let Some(style) = args.style {
        config.style = style.into();
    }
    let mut compositor = vitrine::Compositor::new(&config)?;
    let mut store = vitrine::FsTextureStore::new(&args.assets_root);

    let selection = make_selection(&args.color, &args.material, args.cushion.as_deref());
    compositor.refresh(&mut store, &selection)?;

    let mut frames = Vec::new();
    for _ in 0..MAX_TICKS {
        compositor.tick(&mut store, TICK_SECS);
        frames.push(vitrine::render_stage(compositor.stage())?);
        if !compositor.in_flight() {
            break;
        }
    }
    if compositor.in_flight() {
        anyhow::bail!("refresh did not settle within {MAX_TICKS} ticks");
    }
    if compositor.display().base.is_none() {
        anyhow::bail!("no layers committed; see the logged texture errors");
    }

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;

    frames
        .par_iter()
        .enumerate()
        .try_for_each(|(index, frame)| {
            write_png(&args.out_dir.join(format!("frame_{index:03}.png")), frame)
        })?;

    eprintln!("wrote {} frames to {}", frames.len(), args.out_dir.display());
    Ok(())
}

fn write_png(path: &Path, frame: &vitrine::FrameRGBA) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        path,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}
