use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use image_carousel::config::Configuration;
use image_carousel::events::{CarouselCommand, SlideChange};
use image_carousel::presentation::TerminalSurface;
use image_carousel::tasks::{controller, input};
use image_carousel::Carousel;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "carousel",
    version,
    about = "Interactive image carousel driven from stdin"
)]
struct Args {
    /// Path to YAML config
    #[arg(value_name = "CONFIG")]
    config: PathBuf,
    /// Override the autoplay interval (e.g. "6s", "1500ms")
    #[arg(long, value_name = "DURATION", value_parser = humantime::parse_duration)]
    autoplay_interval: Option<Duration>,
    /// Override the navigation lock duration (e.g. "900ms")
    #[arg(long, value_name = "DURATION", value_parser = humantime::parse_duration)]
    transition_delay: Option<Duration>,
    /// Start with autoplay disabled
    #[arg(long)]
    no_autoplay: bool,
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
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"))
        .add_directive(
            format!("image_carousel={level}")
                .parse()
                .context("invalid log directive")?,
        );
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose)?;

    // Built by hand so shutdown can abandon the stdin reader, which stays
    // parked in a blocking read until the next line arrives.
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;
    let result = runtime.block_on(run(args));
    input::shutdown(runtime);
    result
}

async fn run(args: Args) -> Result<()> {
    let mut cfg = Configuration::from_yaml_file(&args.config)
        .with_context(|| format!("failed to load configuration from {}", args.config.display()))?;
    if let Some(interval) = args.autoplay_interval {
        cfg.timing.autoplay_interval = interval;
    }
    if let Some(delay) = args.transition_delay {
        cfg.timing.transition_delay = delay;
    }
    if args.no_autoplay {
        cfg.timing.autoplay = false;
    }
    let cfg = cfg.validated().context("invalid configuration values")?;
    tracing::info!(
        slides = cfg.slides.len(),
        transition_delay = %humantime::format_duration(cfg.timing.transition_delay),
        autoplay_interval = %humantime::format_duration(cfg.timing.autoplay_interval),
        "loaded configuration from {}",
        args.config.display()
    );

    let surface = TerminalSurface::new(cfg.slides.clone());
    let carousel = Carousel::initialize(surface, cfg.timing.clone(), Instant::now())
        .context("failed to initialize carousel")?;
    tracing::debug!(
        slides = carousel.slide_count(),
        marker_property = %carousel.timing().marker_property,
        autoplay = carousel.is_autoplaying(),
        "carousel ready"
    );

    let (command_tx, command_rx) = mpsc::channel::<CarouselCommand>(32); // stdin -> controller
    let (change_tx, mut change_rx) = mpsc::channel::<SlideChange>(64); // controller -> log

    let cancel = CancellationToken::new();

    // One command per stdin line; EOF ends the show.
    tokio::task::spawn_blocking({
        let cancel = cancel.clone();
        move || input::read_commands(io::stdin().lock(), command_tx, cancel)
    });

    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::warn!("ctrl-c handler failed: {err}");
                return;
            }
            tracing::info!("ctrl-c received; initiating shutdown");
            cancel.cancel();
        });
    }

    let mut tasks = JoinSet::new();

    tasks.spawn({
        let cancel = cancel.clone();
        async move {
            controller::run(carousel, command_rx, change_tx, cancel)
                .await
                .map(|carousel| {
                    tracing::info!(
                        index = carousel.index(),
                        slide = carousel.surface().visible_label().unwrap_or("-"),
                        "carousel stopped"
                    );
                })
                .context("carousel task failed")
        }
    });

    tasks.spawn({
        let cancel = cancel.clone();
        async move {
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    maybe_change = change_rx.recv() => {
                        let Some(change) = maybe_change else { break };
                        tracing::debug!(
                            from = change.from,
                            to = change.to,
                            cause = ?change.cause,
                            "slide changed"
                        );
                    }
                }
            }
            Ok::<(), anyhow::Error>(())
        }
    });

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                cancel.cancel();
                return Err(err);
            }
            Err(err) => {
                cancel.cancel();
                return Err(err).context("task panicked");
            }
        }
    }

    Ok(())
}
