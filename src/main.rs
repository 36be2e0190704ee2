use std::sync::Arc;

use tracing::info;

use courtside::clock::SystemClock;
use courtside::config::Settings;
use courtside::engine::Engine;
use courtside::notify::NotifyHub;
use courtside::sweeper;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let settings = Settings::from_env();
    courtside::observability::init(settings.metrics_port);

    let catalog = Arc::new(settings.load_catalog()?);
    let clock = Arc::new(SystemClock::with_offset_hours(settings.utc_offset_hours));
    let engine = Arc::new(Engine::new(catalog.clone(), clock, Arc::new(NotifyHub::new())));

    info!("courtside started");
    info!(
        "  catalog: {}",
        settings
            .catalog_path
            .as_ref()
            .map_or("none".to_string(), |p| p.display().to_string())
    );
    info!("  facilities: {}", catalog.facilities().len());
    info!("  utc offset: {:+}h", settings.utc_offset_hours);
    info!("  sweep period: {}s", settings.sweep_period.as_secs());
    info!(
        "  metrics: {}",
        settings
            .metrics_port
            .map_or("disabled".to_string(), |p| format!("http://0.0.0.0:{p}/metrics"))
    );

    let sweeper = tokio::spawn(sweeper::run_status_sweeper(engine.clone(), settings.sweep_period));

    // Run until SIGTERM/ctrl-c
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
        tokio::select! {
            _ = ctrl_c => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
    }

    info!("shutdown signal received, running final sweep");
    sweeper.abort();
    sweeper::sweep_once(&engine).await;

    info!("courtside stopped");
    Ok(())
}
