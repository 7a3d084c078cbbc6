use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::Result;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::widgets::Widget;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use labeeb::application::services::{
    OnLoadCallback, Preloader, ProbeOutcome, RenderedImage, SmartImage, SmartImageProps,
};
use labeeb::domain::ImageFetcherPort;
use labeeb::infrastructure::config::OutputFormat;
use labeeb::infrastructure::{AppConfig, CliArgs, HttpImageFetcher, StorageManager};
use labeeb::presentation::SmartImageView;

const BLOCK_WIDTH: u16 = 80;

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    if let Some(log_path) = &config.log_path {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();

        info!(path = %log_path.display(), "Logging initialized");
    } else {
        let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);
        tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .init();
    }

    Ok(())
}

fn load_config(args: &CliArgs) -> Result<AppConfig> {
    let storage = StorageManager::locate(args.config.as_deref())?;
    let mut config = storage.load()?;
    config.merge_with_args(args);
    Ok(config)
}

/// Mounts the first source, requests the rest in order and returns the final surface.
async fn run(args: CliArgs, config: &AppConfig) -> Result<RenderedImage> {
    let fetcher = Arc::new(HttpImageFetcher::new(&config.images)?);
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let preloader = Preloader::new(fetcher.clone(), &event_tx);

    let mut sources: VecDeque<String> = args.sources.into();
    let Some(first) = sources.pop_front() else {
        return Err(color_eyre::eyre::eyre!("no image source given"));
    };

    let props = SmartImageProps {
        source: first.clone(),
        alt_text: args.alt,
        attributes: args.attributes.into_iter().collect(),
    };
    let on_load: OnLoadCallback = Box::new(|event| {
        info!(
            source = %event.source,
            width = event.width,
            height = event.height,
            "Image loaded"
        );
    });
    let mut image = SmartImage::mount(props, Some(on_load), preloader);

    // The terminal surface shows the first source as soon as it is retrieved.
    match fetcher.fetch(&first).await {
        Ok(loaded) => {
            image.handle_surface_load(&loaded.to_load_event());
        }
        Err(e) => warn!(source = %first, error = %e, "Initial source did not load"),
    }

    let mut ticker = tokio::time::interval(Duration::from_millis(args.interval_ms));
    let settle = tokio::time::sleep(Duration::from_secs(args.settle_secs));
    tokio::pin!(settle);

    loop {
        if sources.is_empty() && !image.is_preloading() {
            break;
        }

        tokio::select! {
            _ = ticker.tick(), if !sources.is_empty() => {
                if let Some(next) = sources.pop_front() {
                    let request = image.set_source(next);
                    debug!(?request, "Requested source");
                }
            }
            Some(event) = event_rx.recv() => {
                let load_event = event.load_event();
                match image.handle_probe_event(event) {
                    ProbeOutcome::Swapped { to, .. } => {
                        info!(source = %to, "Surface rebound");
                        if let Some(load_event) = load_event {
                            image.handle_surface_load(&load_event);
                        }
                    }
                    outcome => debug!(?outcome, "Probe event handled"),
                }
            }
            () = &mut settle => {
                if let Some(pending) = image.pending_source() {
                    debug!(source = %pending, "Settle window elapsed with probe outstanding");
                }
                break;
            }
        }
    }

    let rendered = image.render();
    debug!(stats = %fetcher.cache_stats(), "Image cache");
    image.unmount();

    Ok(rendered)
}

fn print_block(rendered: &RenderedImage) {
    let view = SmartImageView::new(rendered);
    let area = Rect::new(0, 0, BLOCK_WIDTH, view.height());
    let mut buf = Buffer::empty(area);
    view.render(area, &mut buf);

    for y in 0..area.height {
        let line: String = (0..area.width).map(|x| buf[(x, y)].symbol()).collect();
        println!("{}", line.trim_end());
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = CliArgs::parse();
    let config = load_config(&args)?;
    init_logging(&config)?;

    info!(version = labeeb::VERSION, "Starting {}", labeeb::NAME);

    let format = args.format;
    let rendered = run(args, &config).await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rendered)?),
        OutputFormat::Block => print_block(&rendered),
    }

    Ok(())
}
