use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use scenereel::{
    Compositor, CpuSurface, FsResolver, MediaCache, PlaybackState, Player, PreviewConfig,
    Quality, RecordingSurface, SceneGraph, VirtualScheduler,
};

#[derive(Parser, Debug)]
#[command(name = "scenereel", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the preview frame at one instant as a PNG.
    Frame(FrameArgs),
    /// Simulate playback on a virtual clock and log timeline events.
    Play(PlayArgs),
    /// Check a project file and print its scene layout.
    Validate(ValidateArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Timeline time in seconds.
    #[arg(long, default_value_t = 0.0)]
    time: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[arg(long, value_enum, default_value_t = QualityChoice::Medium)]
    quality: QualityChoice,

    /// Font file used for text elements. Without one, text is laid out but not drawn.
    #[arg(long)]
    font: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct PlayArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Playback speed, clamped to [0.25, 4].
    #[arg(long, default_value_t = 1.0)]
    speed: f64,

    /// Wrap at the end instead of stopping.
    #[arg(long = "loop")]
    looping: bool,

    /// Stop the simulation after this many seconds of virtual time.
    #[arg(long, default_value_t = 600.0)]
    max_seconds: f64,
}

#[derive(Parser, Debug)]
struct ValidateArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
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

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Play(args) => cmd_play(args),
        Command::Validate(args) => cmd_validate(args),
    }
}

fn read_project(path: &Path) -> anyhow::Result<SceneGraph> {
    let graph = SceneGraph::from_path(path)
        .with_context(|| format!("read project '{}'", path.display()))?;
    graph.validate()?;
    Ok(graph)
}

fn media_cache(project: &Path) -> MediaCache {
    let root = project.parent().unwrap_or_else(|| Path::new("."));
    MediaCache::new(FsResolver::new(root))
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let graph = read_project(&args.in_path)?;
    let mut config = PreviewConfig::from_env();
    config.quality = args.quality.into();
    config.validate()?;

    let mut surface = CpuSurface::new(config.quality.resolution())?;
    if let Some(font) = &args.font {
        let bytes =
            std::fs::read(font).with_context(|| format!("read font '{}'", font.display()))?;
        surface = surface.with_font(bytes)?;
    }

    let compositor = Compositor::new(media_cache(&args.in_path), config.quality)
        .with_clear_color(config.clear_rgba());
    let mut player = Player::new(compositor, surface, VirtualScheduler::new(), &config);
    player.seek(&graph, args.time);
    for err in &player.last_report().errors {
        eprintln!("warning: {}: {}", err.scene_id, err.error);
    }

    let frame = player.surface().frame();
    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        &args.out,
        &frame.to_straight(),
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_play(args: PlayArgs) -> anyhow::Result<()> {
    let graph = read_project(&args.in_path)?;
    let mut config = PreviewConfig::from_env();
    config.speed = args.speed;
    config.loop_playback = args.looping;
    config.validate()?;

    let compositor = Compositor::new(media_cache(&args.in_path), Quality::Low);
    let surface = RecordingSurface::new(Quality::Low.resolution());
    let mut player = Player::new(compositor, surface, VirtualScheduler::new(), &config);

    let names: Vec<String> = graph.scenes.iter().map(|s| s.name.clone()).collect();
    player.on_scene_change(move |c| {
        let name = names.get(c.to).map(String::as_str).unwrap_or("");
        tracing::info!(from = c.from, to = c.to, name, "scene");
    });
    player.on_state_change(|c| tracing::info!(from = ?c.from, to = ?c.to, "state"));
    player.on_error(|e| {
        tracing::warn!(scene = %e.scene_id, element = ?e.element_id, error = %e.error, "media");
    });

    player.play(&graph);
    let step = player.tick_interval();
    let limit = Duration::from_secs_f64(args.max_seconds.max(0.0));
    while player.state() == PlaybackState::Playing && player.scheduler().now() < limit {
        player.scheduler_mut().advance(step);
        player.pump(&graph);
    }
    player.stop(&graph);

    eprintln!(
        "played {:.2}s of virtual time over {} scene(s), {:.2}s total",
        player.scheduler().now().as_secs_f64(),
        graph.len(),
        graph.total_duration()
    );
    Ok(())
}

fn cmd_validate(args: ValidateArgs) -> anyhow::Result<()> {
    let graph = read_project(&args.in_path)?;
    for (scene, start) in graph.scenes.iter().zip(graph.boundaries()) {
        println!(
            "{start:>8.2}s  {:<24} {:>6.2}s  {} element(s)",
            scene.id,
            scene.duration,
            scene.elements.len()
        );
    }
    println!("total {:.2}s", graph.total_duration());
    Ok(())
}
