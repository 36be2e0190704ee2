use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::engine::Engine;
use crate::model::SweepReport;
use crate::observability::SWEEP_DURATION_SECONDS;

/// Background task that periodically moves finished bookings to ENDED.
pub async fn run_status_sweeper(engine: Arc<Engine>, period: Duration) {
    let mut interval = tokio::time::interval(period);
    loop {
        interval.tick().await;
        sweep_once(&engine).await;
    }
}

/// One sweep pass, timed and logged.
pub async fn sweep_once(engine: &Engine) -> SweepReport {
    let started = Instant::now();
    let report = engine.update_status_sweep().await;
    metrics::histogram!(SWEEP_DURATION_SECONDS).record(started.elapsed().as_secs_f64());

    if report.total() == 0 {
        debug!("status sweep: nothing ended");
    } else {
        info!(
            facility = report.facility.len(),
            equipment = report.equipment.len(),
            "status sweep ended {} bookings",
            report.total()
        );
    }
    report
}
