mod config;
mod display;
mod models;
mod poller;
mod source;
mod utils;

use log::{error, info, warn};
use time::OffsetDateTime;
use tokio::time::Duration;

use config::DisplayConfig;
use display::{FileTarget, RenderOptions};
use poller::Poller;
use source::HttpSource;
use utils::format_datetime;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .format_timestamp_secs()
        .init();

    // Load configuration
    let config = match DisplayConfig::new() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e);
        }
    };

    let source = HttpSource::new(&config.server_url, config.http_timeout_secs)?;
    info!("Fetching sensor data from {}", source.thdata_url());

    let target = FileTarget::new(&config.output_path, config.server_url.clone());
    info!("Rendering to {}", target.path().display());
    match target.remove_stale_temp_files().await {
        Ok(0) => {}
        Ok(n) => info!("Removed {} stale temporary page(s)", n),
        Err(e) => warn!("Could not clean up temporary pages: {}", e),
    }

    let options = RenderOptions {
        mode: config.render_mode,
        escape: config.escape_markup,
    };
    let poller = Poller::new(source, target, options);

    info!(
        "Starting garden display at: {}",
        format_datetime(&OffsetDateTime::now_utc())
    );

    // Handle Ctrl+C gracefully
    let (tx, mut rx) = tokio::sync::oneshot::channel();
    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to listen for Ctrl+C");
        let _ = tx.send(());
    });

    // Run the polling loop until a shutdown signal arrives
    tokio::select! {
        _ = poller.run(Duration::from_millis(config.poll_interval_ms)) => {}
        _ = &mut rx => {
            info!("Program terminated by user. Exiting gracefully.");
        }
    }

    Ok(())
}
