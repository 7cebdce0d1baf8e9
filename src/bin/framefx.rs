use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use framefx::{
    CancelToken, EffectDescriptor, EffectKind, EffectStack, EngineConfig, ExportFrame,
    ExportOutcome, ExportSampler, ExportSettings, Fps, FrameRenderer, FrameSource,
    JsonFilePresetStore, LoopShape, ManualClock, ManualScheduler, OutputFormat, PreviewDriver,
    PreviewState, Preset, PresetStore, Quality, RenderSettings, SinkConfig, SourceImage, Surface,
    builtin_presets, foundation::core::unpremultiply_rgba8_in_place, preview_progress,
    sink_for_path,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "framefx", version, about = "Animate stills with layered frame effects")]
struct Cli {
    /// Engine config JSON (render and preview settings).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one composited frame as a PNG.
    Frame(FrameArgs),
    /// Render every frame of an export to a PNG directory, a GIF, or an MP4/WebM (needs
    /// `ffmpeg`).
    Export(ExportArgs),
    /// Record a looping preview as the display would show it, tick by tick.
    Preview(PreviewArgs),
    /// List or save effect presets.
    #[command(subcommand)]
    Presets(PresetsCommand),
}

#[derive(Parser, Debug)]
struct EffectArgs {
    /// JSON file with one effect descriptor or an array of them.
    #[arg(long, conflicts_with = "preset")]
    effects: Option<PathBuf>,

    /// Id of a built-in preset to use instead of `--effects`.
    #[arg(long)]
    preset: Option<String>,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input image.
    #[arg(long = "in")]
    in_path: PathBuf,

    #[command(flatten)]
    effects: EffectArgs,

    /// Effect progress in `[0, 1]`.
    #[arg(long, default_value_t = 0.5)]
    progress: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Input images; frames cycle through them in order.
    #[arg(long = "in", required = true, num_args = 1..)]
    in_paths: Vec<PathBuf>,

    #[command(flatten)]
    effects: EffectArgs,

    /// Duration in seconds. Unreadable values fall back to 5, or the preset's duration.
    #[arg(long)]
    duration: Option<String>,

    /// Frames per second.
    #[arg(long, default_value_t = 24)]
    fps: u32,

    #[arg(long, value_enum, default_value_t = QualityChoice::Medium)]
    quality: QualityChoice,

    /// Resample the inputs to fit the quality tier's resolution before rendering.
    #[arg(long)]
    fit_quality: bool,

    /// Output directory for PNG frames, or a `.gif`, `.mp4` or `.webm` file.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    /// Input image.
    #[arg(long = "in")]
    in_path: PathBuf,

    #[command(flatten)]
    effects: EffectArgs,

    /// Loop period in seconds. Unreadable values fall back to 5, or the preset's duration.
    #[arg(long)]
    duration: Option<String>,

    /// Display refresh rate the preview is ticked at.
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// How many loop periods to record.
    #[arg(long, default_value_t = 1)]
    loops: u32,

    /// Overrides the config's preview loop shape.
    #[arg(long, value_enum)]
    loop_shape: Option<LoopShapeChoice>,

    /// Output directory for PNG frames, or a `.gif`, `.mp4` or `.webm` file.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LoopShapeChoice {
    Sawtooth,
    PingPong,
}

impl From<LoopShapeChoice> for LoopShape {
    fn from(s: LoopShapeChoice) -> Self {
        match s {
            LoopShapeChoice::Sawtooth => LoopShape::Sawtooth,
            LoopShapeChoice::PingPong => LoopShape::PingPong,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum QualityChoice {
    Low,
    Medium,
    High,
    Ultra,
}

impl From<QualityChoice> for Quality {
    fn from(q: QualityChoice) -> Self {
        match q {
            QualityChoice::Low => Quality::Low,
            QualityChoice::Medium => Quality::Medium,
            QualityChoice::High => Quality::High,
            QualityChoice::Ultra => Quality::Ultra,
        }
    }
}

#[derive(Subcommand, Debug)]
enum PresetsCommand {
    /// Print built-in presets, plus the ones in `--store`.
    List {
        #[arg(long)]
        store: Option<PathBuf>,
    },
    /// Validate a preset JSON file and save it into a store.
    Save {
        #[arg(long)]
        store: PathBuf,
        #[arg(long)]
        preset: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args, &config),
        Command::Export(args) => cmd_export(args, &config),
        Command::Preview(args) => cmd_preview(args, &config),
        Command::Presets(cmd) => cmd_presets(cmd),
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

/// Config file (if any) with `FRAMEFX_*` environment overrides applied to render settings.
fn load_config(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig {
            render: RenderSettings::from_env(),
            ..EngineConfig::default()
        });
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("read config '{}'", path.display()))?;
    let mut config = EngineConfig::from_json(&json)
        .with_context(|| format!("parse config '{}'", path.display()))?;
    config.render = config.render.with_env_overrides();
    Ok(config)
}

fn resolve_duration(text: Option<&str>, preset_secs: Option<f64>) -> f64 {
    match (text, preset_secs) {
        (Some(text), _) => ExportSettings::parse_duration(text),
        (None, Some(secs)) => secs,
        (None, None) => ExportSettings::default().duration_secs,
    }
}

/// Effects from `--effects` or `--preset`, plus the preset's duration if one was used.
fn resolve_effects(args: &EffectArgs) -> anyhow::Result<(Vec<EffectDescriptor>, Option<f64>)> {
    if let Some(id) = args.preset.as_deref() {
        let preset = builtin_presets()
            .into_iter()
            .find(|p| p.id == id)
            .with_context(|| format!("unknown preset '{id}'"))?;
        return Ok((vec![preset.effect], Some(preset.duration_secs)));
    }
    let Some(path) = args.effects.as_deref() else {
        return Ok((Vec::new(), None));
    };

    let json = std::fs::read_to_string(path)
        .with_context(|| format!("read effects '{}'", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&json).context("parse effects JSON")?;
    let effects: Vec<EffectDescriptor> = if value.is_array() {
        serde_json::from_value(value)?
    } else {
        vec![serde_json::from_value(value)?]
    };
    for effect in &effects {
        if effect.kind == EffectKind::Unsupported {
            tracing::warn!("unsupported effect type; it will render the source unchanged");
        } else if let Err(err) = effect.validate() {
            tracing::warn!(kind = effect.kind.as_str(), %err, "effect will use fallbacks");
        }
    }
    Ok((effects, None))
}

fn cmd_frame(args: FrameArgs, config: &EngineConfig) -> anyhow::Result<()> {
    let source = SourceImage::open(&args.in_path)?;
    let (effects, _) = resolve_effects(&args.effects)?;

    let stack = EffectStack::new(FrameRenderer::new(config.render.clone()));
    let mut surface = Surface::for_source(&source)?;
    stack.render_all(&mut surface, &source, &effects, args.progress)?;

    let frame = surface.to_frame();
    let mut rgba = frame.data;
    unpremultiply_rgba8_in_place(&mut rgba);
    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        &args.out,
        &rgba,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    tracing::info!(out = %args.out.display(), "frame written");
    Ok(())
}

fn cmd_export(args: ExportArgs, config: &EngineConfig) -> anyhow::Result<()> {
    let mut sources = args
        .in_paths
        .iter()
        .map(SourceImage::open)
        .collect::<Result<Vec<_>, _>>()?;
    let (effects, preset_secs) = resolve_effects(&args.effects)?;

    let duration_secs = resolve_duration(args.duration.as_deref(), preset_secs);
    let settings =
        ExportSettings::new(duration_secs, Fps::whole(args.fps)?).with_quality(args.quality.into());

    if args.fit_quality
        && let Some(first) = sources.first()
    {
        let (w, h) = settings.fit_to_quality(first.width(), first.height())?;
        tracing::info!(width = w, height = h, "resampling inputs to the quality resolution");
        sources = sources
            .iter()
            .map(|s| s.resized(w, h))
            .collect::<Result<Vec<_>, _>>()?;
    }

    let format = OutputFormat::from_path(&args.out);
    tracing::debug!(format = format.as_str(), "export output");
    let mut sink = sink_for_path(&args.out);

    let sampler = ExportSampler::new(EffectStack::new(FrameRenderer::new(config.render.clone())));
    let cancel = CancelToken::new();
    let mut last_percent = None;
    let outcome = sampler.run(
        sources.as_slice(),
        &effects,
        &settings,
        sink.as_mut(),
        &cancel,
        |progress| {
            let percent = progress.percent();
            if last_percent != Some(percent) && percent % 10 == 0 {
                tracing::info!(percent, "exporting");
            }
            last_percent = Some(percent);
        },
    )?;

    match outcome {
        ExportOutcome::Completed { frames } => {
            tracing::info!(frames, out = %args.out.display(), "export finished");
        }
        ExportOutcome::Cancelled { frames_done } => {
            tracing::warn!(frames_done, "export cancelled");
        }
    }
    Ok(())
}

fn cmd_preview(args: PreviewArgs, config: &EngineConfig) -> anyhow::Result<()> {
    let source = Arc::new(SourceImage::open(&args.in_path)?);
    let (effects, preset_secs) = resolve_effects(&args.effects)?;
    let period_secs = resolve_duration(args.duration.as_deref(), preset_secs);
    let period = Duration::try_from_secs_f64(period_secs)
        .with_context(|| format!("preview period of {period_secs}s"))?;
    let fps = Fps::whole(args.fps)?;
    let loop_shape = args
        .loop_shape
        .map_or(config.preview.loop_shape, LoopShape::from);
    let ticks = fps
        .secs_to_frames_round(period.as_secs_f64() * f64::from(args.loops))
        .max(1);

    let scheduler = Arc::new(ManualScheduler::new());
    let clock = Arc::new(ManualClock::new());
    let mut driver =
        PreviewDriver::with_clock(Surface::for_source(&*source)?, scheduler.clone(), clock.clone());
    driver.set_stack(EffectStack::new(FrameRenderer::new(config.render.clone())));
    driver.set_loop_shape(loop_shape);
    driver.start(source.clone(), effects, period)?;

    let mut sink = sink_for_path(&args.out);
    sink.begin(SinkConfig {
        width: source.width(),
        height: source.height(),
        fps,
        total_frames: ticks,
        quality: Quality::default(),
    })?;

    let surface = driver.surface();
    for i in 0..ticks {
        let elapsed = Duration::from_micros(fps.frame_timestamp_us(i));
        clock.set(elapsed);
        scheduler.run_pending();
        if driver.state() != PreviewState::Running {
            sink.abort();
            return Err(match driver.take_error() {
                Some(err) => anyhow::Error::from(err).context(format!("preview tick {i}")),
                None => anyhow::anyhow!("preview stopped at tick {i}"),
            });
        }

        let frame = ExportFrame {
            index: i,
            timestamp_us: elapsed.as_micros() as u64,
            duration_us: fps.frame_duration_us(),
            progress: preview_progress(elapsed, period, loop_shape),
        };
        let pixels = surface
            .lock()
            .map_err(|_| anyhow::anyhow!("preview surface lock poisoned"))?
            .to_frame();
        if let Err(err) = sink.push_frame(frame, &pixels) {
            sink.abort();
            return Err(err.into());
        }
    }
    driver.stop();
    sink.end()?;

    tracing::info!(ticks, loop_shape = ?loop_shape, out = %args.out.display(), "preview recorded");
    Ok(())
}

fn cmd_presets(cmd: PresetsCommand) -> anyhow::Result<()> {
    match cmd {
        PresetsCommand::List { store } => {
            let mut presets = builtin_presets();
            if let Some(path) = store {
                presets.extend(JsonFilePresetStore::new(path).list()?);
            }
            for p in presets {
                println!(
                    "{:<20} {:<10} {:>4}s  {}",
                    p.id,
                    p.effect.kind.as_str(),
                    p.duration_secs,
                    p.name
                );
            }
        }
        PresetsCommand::Save { store, preset } => {
            let json = std::fs::read_to_string(&preset)
                .with_context(|| format!("read preset '{}'", preset.display()))?;
            let preset: Preset = serde_json::from_str(&json).context("parse preset JSON")?;
            let id = preset.id.clone();
            JsonFilePresetStore::new(&store).save(preset)?;
            tracing::info!(%id, store = %store.display(), "preset saved");
        }
    }
    Ok(())
}
