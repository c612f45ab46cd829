mod app;
mod commands;
mod config;
mod effects;
mod render;

use anyhow::Context;
use clap::Parser;
use sync_logging::{sync_info, LogDestination};

fn main() -> anyhow::Result<()> {
    let cli = config::Cli::parse();
    let config = config::load(cli.config.as_deref(), cli.base_url.as_deref())
        .context("failed to load configuration")?;

    let destination = if config.log_to_terminal {
        LogDestination::Both
    } else {
        LogDestination::File
    };
    sync_logging::initialize(destination, &config.log_file, config.level_filter()?);
    sync_info!(
        "taskdeck starting: base_url={} reconnect={}ms debounce={}ms",
        config.base_url,
        config.reconnect_interval_ms,
        config.refresh_debounce_ms
    );

    app::run(config)
}
