use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use ulid::Ulid;

use courtside::clock::FixedClock;
use courtside::engine::{compute_gaps, pool_gaps, Catalog, Engine};
use courtside::limits::{CLOSING_HOUR, OPENING_HOUR};
use courtside::model::*;
use courtside::notify::NotifyHub;

const POOL_SIZE: usize = 200;
const ITERATIONS: usize = 2_000;

/// Latency samples for one measured operation, reported in microseconds.
struct Samples {
    label: String,
    micros: Vec<f64>,
}

impl Samples {
    fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            micros: Vec::with_capacity(ITERATIONS),
        }
    }

    fn record(&mut self, elapsed: Duration) {
        self.micros.push(elapsed.as_secs_f64() * 1e6);
    }

    /// Nearest-rank percentile. Expects `micros` to be sorted.
    fn rank(&self, p: f64) -> f64 {
        let n = self.micros.len();
        let idx = ((p / 100.0) * n as f64).ceil() as usize;
        self.micros[idx.clamp(1, n) - 1]
    }

    fn report(mut self) {
        if self.micros.is_empty() {
            println!("  {}: no samples", self.label);
            return;
        }
        self.micros.sort_by(f64::total_cmp);
        let mean = self.micros.iter().sum::<f64>() / self.micros.len() as f64;
        println!(
            "  {:<32} n={:<5} mean={mean:>8.1}us p50={:>8.1}us p99={:>8.1}us max={:>8.1}us",
            self.label,
            self.micros.len(),
            self.rank(50.0),
            self.rank(99.0),
            self.rank(100.0),
        );
    }
}

/// Free intervals for a synthetic pool: unit `i` is busy for a short window
/// that walks across the day.
fn synthetic_pool() -> Vec<(Ulid, Vec<HourSpan>)> {
    (0..POOL_SIZE)
        .map(|i| {
            let start = OPENING_HOUR + (i % 10) as Hour;
            let len = 1 + (i % 3) as Hour;
            let busy = [HourSpan::new(start, (start + len).min(CLOSING_HOUR))];
            (Ulid::new(), compute_gaps(&busy, OPENING_HOUR, CLOSING_HOUR))
        })
        .collect()
}

fn bench_pool_gaps() {
    println!("pool_gaps ({POOL_SIZE} units)");
    let pool = synthetic_pool();
    for quantity in [1, POOL_SIZE / 2, POOL_SIZE - 20] {
        let mut samples = Samples::new(format!("pool_gaps quantity={quantity}"));
        for _ in 0..ITERATIONS {
            let t = Instant::now();
            let gaps = pool_gaps(&pool, quantity);
            samples.record(t.elapsed());
            std::hint::black_box(gaps);
        }
        samples.report();
    }
}

async fn bench_engine() {
    println!("engine ({POOL_SIZE}-unit pool, borrow then query)");
    let catalog = Catalog::new();
    let balls = catalog
        .add_equipment_type(EquipmentType {
            id: Ulid::new(),
            code: "ET-001".into(),
            name: "Basketball Brand A".into(),
            short_name: "BASKA".into(),
            sport: "Basketball".into(),
            price: 15.0,
            category: EquipmentCategory::Borrowable,
        })
        .expect("equipment type");
    for _ in 0..POOL_SIZE {
        catalog.add_unit(balls).expect("unit");
    }
    let today = NaiveDate::from_ymd_opt(2026, 1, 1).expect("date");
    let date = today.succ_opt().expect("date");
    let clock = Arc::new(FixedClock::new(today, 0));
    let engine = Engine::new(Arc::new(catalog), clock, Arc::new(NotifyHub::new()));

    let mut borrow = Samples::new("borrow_equipment");
    for i in 0..POOL_SIZE {
        let start = OPENING_HOUR + (i % 11) as Hour;
        let t = Instant::now();
        let _ = engine
            .borrow_equipment(Ulid::new(), balls, 1, date, start, start + 1)
            .await;
        borrow.record(t.elapsed());
    }
    borrow.report();

    let mut query = Samples::new("available_gap_slots_for_type");
    for i in 0..ITERATIONS {
        let quantity = 1 + (i % 50) as u32;
        let t = Instant::now();
        let gaps = engine.available_gap_slots_for_type(balls, quantity, date).await;
        query.record(t.elapsed());
        let _ = std::hint::black_box(gaps);
    }
    query.report();
}

fn main() {
    println!("=== courtside pool benchmark ===");
    bench_pool_gaps();
    let rt = tokio::runtime::Runtime::new().expect("tokio runtime");
    rt.block_on(bench_engine());
}
