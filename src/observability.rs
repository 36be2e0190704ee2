use std::net::SocketAddr;

// ── Booking lifecycle ───────────────────────────────────────────

/// Counter: bookings created. Labels: kind.
pub const BOOKINGS_CREATED_TOTAL: &str = "courtside_bookings_created_total";

/// Counter: bookings moved PENDING → CONFIRMED.
pub const BOOKINGS_CONFIRMED_TOTAL: &str = "courtside_bookings_confirmed_total";

/// Counter: successful reschedules and facility reassignments. Labels: kind.
pub const BOOKINGS_UPDATED_TOTAL: &str = "courtside_bookings_updated_total";

/// Counter: cancelled bookings. Labels: kind.
pub const BOOKINGS_CANCELLED_TOTAL: &str = "courtside_bookings_cancelled_total";

/// Counter: bookings marked ENDED by the status sweep.
pub const BOOKINGS_ENDED_TOTAL: &str = "courtside_bookings_ended_total";

/// Counter: rejected operations. Labels: reason.
pub const BOOKINGS_REJECTED_TOTAL: &str = "courtside_bookings_rejected_total";

// ── Sweeper ─────────────────────────────────────────────────────

/// Histogram: status sweep duration in seconds.
pub const SWEEP_DURATION_SECONDS: &str = "courtside_sweep_duration_seconds";

/// Gauge: active (PENDING or CONFIRMED) bookings after the last sweep.
pub const ACTIVE_BOOKINGS: &str = "courtside_active_bookings";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) {
    let Some(port) = port else { return };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .expect("failed to install Prometheus metrics exporter");
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
}
