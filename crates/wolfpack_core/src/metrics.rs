//! Run metrics and structured logging setup.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

pub const KILLS: &str = "kills";
pub const HOWLS: &str = "howls";
pub const SCENT_MARKS: &str = "scent_marks";
pub const SIEGES_STARTED: &str = "sieges_started";
pub const SIEGES_ENDED: &str = "sieges_ended";
pub const COLLABORATOR_FAILURES: &str = "collaborator_failures";

/// Counters collected over a run.
pub struct Metrics {
    tick_count: AtomicU64,
    wolf_count: AtomicU64,
    prey_count: AtomicU64,
    counters: Mutex<HashMap<String, AtomicU64>>,
    start_time: Instant,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tick_count: AtomicU64::new(0),
            wolf_count: AtomicU64::new(0),
            prey_count: AtomicU64::new(0),
            counters: Mutex::new(HashMap::new()),
            start_time: Instant::now(),
        }
    }

    /// Records a completed tick with its duration.
    pub fn record_tick(&self, duration: Duration, wolves: usize, prey: usize) {
        self.tick_count.fetch_add(1, Ordering::Relaxed);
        self.wolf_count.store(wolves as u64, Ordering::Relaxed);
        self.prey_count.store(prey as u64, Ordering::Relaxed);

        let tick = self.tick_count.load(Ordering::Relaxed);
        if tick % 1000 == 0 {
            tracing::info!(
                tick = tick,
                wolves = wolves,
                prey = prey,
                kills = self.counter(KILLS),
                duration_us = duration.as_micros() as u64,
                "Pack tick"
            );
        }
    }

    pub fn increment_counter(&self, name: &str) {
        self.add_to_counter(name, 1);
    }

    pub fn add_to_counter(&self, name: &str, amount: u64) {
        let mut counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        counters
            .entry(name.to_string())
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(amount, Ordering::Relaxed);
    }

    #[must_use]
    pub fn counter(&self, name: &str) -> u64 {
        let counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        counters
            .get(name)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn wolf_count(&self) -> u64 {
        self.wolf_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn prey_count(&self) -> u64 {
        self.prey_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Initialize tracing subscriber for logging.
pub fn init_logging() {
    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_max_level(tracing::Level::INFO)
            .finish(),
    )
    .ok();
}
