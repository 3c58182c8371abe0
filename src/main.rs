//! Binary entrypoint for the headless image slider.
//!
//! Delegates all logic to the library crate; no local modules here.

use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use image_slider::catalog::ImageCatalog;
use image_slider::config::Configuration;
use image_slider::driver::{self, ScriptCommand};
use image_slider::events::{BatchFetched, FetchBatch, SliderFrame, SliderInput};
use image_slider::tasks;
use image_slider::view::ViewSettings;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{Level, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Debug, Parser)]
#[command(
    name = "image-slider",
    version,
    about = "Headless draggable image carousel"
)]
struct Cli {
    /// Path to YAML config (built-in defaults when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Deterministic seed for batch order and image ids
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Read driver commands from FILE instead of stdin
    #[arg(long, value_name = "FILE")]
    script: Option<PathBuf>,

    /// Print the given number of shuffled batches without running the carousel
    #[arg(long = "catalog-dry-run", value_name = "BATCHES")]
    catalog_dry_run: Option<usize>,

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
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"))
        .add_directive(format!("image_slider={level}").parse()?);
    fmt().with_env_filter(filter).with_target(true).compact().init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let cfg = match &cli.config {
        Some(path) => Configuration::from_yaml_file(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => Configuration::default(),
    }
    .validated()
    .context("invalid configuration values")?;
    info!("configuration:\n{cfg:#?}");

    let seed = cli.seed.or(cfg.shuffle_seed);
    let mut catalog = match seed {
        Some(seed) => ImageCatalog::seeded(cfg.assets.clone(), seed),
        None => ImageCatalog::new(cfg.assets.clone()),
    };

    if let Some(batches) = cli.catalog_dry_run {
        run_catalog_dry_run(&mut catalog, batches, seed);
        return Ok(());
    }

    let script = load_script(cli.script.as_deref())?;

    // Channels (small/bounded)
    let (input_tx, input_rx) = mpsc::channel::<SliderInput>(64); // Host -> Carousel
    let (fetch_tx, fetch_rx) = mpsc::channel::<FetchBatch>(4); // Carousel -> Fetcher
    let (fetched_tx, fetched_rx) = mpsc::channel::<BatchFetched>(4); // Fetcher -> Carousel
    let (frame_tx, mut frame_rx) = mpsc::channel::<SliderFrame>(64); // Carousel -> Host

    let cancel = CancellationToken::new();

    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!("ctrl-c handler failed: {err}");
                return;
            }
            info!("ctrl-c received; initiating shutdown");
            cancel.cancel();
        });
    }

    let initial = catalog.create_batch();

    let fetcher = tokio::spawn({
        let cancel = cancel.clone();
        let delay = cfg.fetch_delay;
        async move {
            tasks::fetcher::run(catalog, fetch_rx, fetched_tx, delay, cancel)
                .await
                .context("fetcher task failed")
        }
    });

    let carousel = tokio::spawn({
        let cancel = cancel.clone();
        let settings = ViewSettings::from(&cfg);
        async move {
            tasks::carousel::run(
                settings, initial, input_rx, fetched_rx, fetch_tx, frame_tx, cancel,
            )
            .await
            .context("carousel task failed")
        }
    });

    let frames = tokio::spawn(async move {
        while let Some(frame) = frame_rx.recv().await {
            info!(
                offset = frame.scroll_offset,
                scroll = ?frame.scroll,
                can_swipe_left = frame.affordances.can_swipe_left,
                can_swipe_right = frame.affordances.can_swipe_right,
                images = frame.image_count,
                phase = ?frame.phase,
                "frame"
            );
        }
    });

    for command in script {
        match command {
            ScriptCommand::Input(input) => {
                if input_tx.send(input).await.is_err() {
                    warn!("carousel stopped before the script finished");
                    break;
                }
            }
            ScriptCommand::Wait(duration) => {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(duration) => {}
                }
            }
        }
    }

    // Closing the input channel lets the carousel drain what was queued.
    drop(input_tx);
    match carousel.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::error!("task error: {e:?}"),
        Err(e) => tracing::error!("join error: {e}"),
    }
    cancel.cancel();
    match fetcher.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::error!("task error: {e:?}"),
        Err(e) => tracing::error!("join error: {e}"),
    }
    if let Err(e) = frames.await {
        tracing::error!("join error: {e}");
    }

    Ok(())
}

fn load_script(path: Option<&Path>) -> Result<Vec<ScriptCommand>> {
    let text = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read script {}", path.display()))?,
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("failed to read script from stdin")?;
            text
        }
    };
    let mut commands = Vec::new();
    for (number, line) in text.lines().enumerate() {
        if let Some(command) =
            driver::parse_line(line).with_context(|| format!("script line {}", number + 1))?
        {
            commands.push(command);
        }
    }
    Ok(commands)
}

fn run_catalog_dry_run(catalog: &mut ImageCatalog, batches: usize, seed: Option<u64>) {
    println!(
        "# catalog dry run\n# assets: {}\n# batches: {}\n# seed: {}\n",
        catalog.pool().len(),
        batches,
        seed.map_or_else(|| "(random)".to_string(), |s| s.to_string())
    );
    for n in 0..batches {
        println!("# batch {}", n + 1);
        for (pos, image) in catalog.create_batch().iter().enumerate() {
            println!("  {:>2}  {}  {}", pos, image.id, image.source.display());
        }
    }
}
