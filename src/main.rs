use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use color_eyre::Result;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::App;
use crate::config::KeyResolver;
use crate::log_ring::LogRing;
use crate::registry::ManagerOptions;

mod app;
mod backend;
mod cli;
mod config;
mod dashboard;
mod dialog;
mod effect;
mod executor;
mod focus;
mod log_ring;
mod message;
mod model;
mod pane;
mod registry;
mod theme;
mod tui;
mod ui;

pub use theme::Theme;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;

    let args = cli::Args::parse();
    let config = config::load()?;

    let ring = LogRing::new(args.log_capacity.unwrap_or(config.log.capacity));
    let _guard = initialize_logging(ring.clone())?;
    info!("Starting lazypkg");

    let options = ManagerOptions::new(&config, &args);
    let managers = match registry::build_managers(&options).await {
        Ok(managers) => managers,
        Err(err) => {
            println!("{err}");
            return Ok(err.exit_code());
        }
    };

    let dry_run = args.dry_run || config.dry_run;
    if dry_run {
        info!("Dry run: nothing will be changed");
    }

    let resolver = Arc::new(KeyResolver::new(Arc::new(config.keybindings.clone())));
    let theme = theme::theme_from_name(&config.theme.name);

    let mut app = App::new(&managers, ring, resolver, theme, dry_run);
    app.run().await?;

    Ok(ExitCode::SUCCESS)
}

/// Everything goes to a daily log file; INFO and above also feeds the output pane.
fn initialize_logging(ring: LogRing) -> Result<WorkerGuard> {
    let directory = dirs::data_local_dir().map_or_else(
        || std::path::PathBuf::from("logs"),
        |path| path.join("lazypkg").join("logs"),
    );
    std::fs::create_dir_all(&directory)?;

    let file_appender = tracing_appender::rolling::daily(&directory, "lazypkg.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(true)
                .with_filter(EnvFilter::from_default_env()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(ring)
                .with_ansi(false)
                .without_time()
                .with_target(false)
                .compact()
                .with_filter(LevelFilter::INFO),
        )
        .init();

    Ok(guard)
}
