//! Metrics collection
//!
//! In-process counters and histograms keyed by name. Lock poisoning is
//! ignored: a panicking writer cannot leave a counter or histogram in an
//! inconsistent state.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

/// Monotonic counter
#[derive(Debug)]
pub struct Counter {
    name: String,
    value: AtomicU64,
}

impl Counter {
    /// Create a new counter
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: AtomicU64::new(0),
        }
    }

    /// Counter name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Increment the counter
    pub fn inc(&self) {
        self.add(1);
    }

    /// Add a value to the counter
    pub fn add(&self, value: u64) {
        self.value.fetch_add(value, Ordering::Relaxed);
    }

    /// Get the current value
    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }

    /// Reset the counter
    pub fn reset(&self) {
        self.value.store(0, Ordering::Relaxed);
    }
}

/// Histogram of observed samples
///
/// Count, sum, min and max cover every observation. Percentiles are computed
/// over the most recent `window` samples only, so memory stays bounded.
#[derive(Debug)]
pub struct Histogram {
    name: String,
    window: usize,
    state: RwLock<HistogramState>,
}

#[derive(Debug, Default)]
struct HistogramState {
    count: u64,
    sum: f64,
    min: Option<f64>,
    max: Option<f64>,
    recent: VecDeque<f64>,
}

impl Histogram {
    /// Samples kept for percentiles by [`Histogram::new`]
    pub const DEFAULT_WINDOW: usize = 1024;

    /// Create a new histogram
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_window(name, Self::DEFAULT_WINDOW)
    }

    /// Create a histogram keeping at most `window` samples for percentiles
    pub fn with_window(name: impl Into<String>, window: usize) -> Self {
        let window = window.max(1);
        Self {
            name: name.into(),
            window,
            state: RwLock::new(HistogramState {
                recent: VecDeque::with_capacity(window.min(Self::DEFAULT_WINDOW)),
                ..HistogramState::default()
            }),
        }
    }

    /// Histogram name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Observe a value
    pub fn observe(&self, value: f64) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.count += 1;
        state.sum += value;
        state.min = Some(state.min.map_or(value, |min| min.min(value)));
        state.max = Some(state.max.map_or(value, |max| max.max(value)));
        if state.recent.len() == self.window {
            state.recent.pop_front();
        }
        state.recent.push_back(value);
    }

    /// Observe a duration in seconds
    pub fn observe_duration(&self, duration: Duration) {
        self.observe(duration.as_secs_f64());
    }

    /// Number of observations
    pub fn count(&self) -> u64 {
        self.read().count
    }

    /// Sum of all observations
    pub fn sum(&self) -> f64 {
        self.read().sum
    }

    /// Smallest observation, `None` when empty
    pub fn min(&self) -> Option<f64> {
        self.read().min
    }

    /// Largest observation, `None` when empty
    pub fn max(&self) -> Option<f64> {
        self.read().max
    }

    /// Mean observation, `0.0` when empty
    pub fn avg(&self) -> f64 {
        let state = self.read();
        if state.count == 0 {
            0.0
        } else {
            state.sum / state.count as f64
        }
    }

    /// Number of samples currently retained for percentiles
    pub fn retained(&self) -> usize {
        self.read().recent.len()
    }

    /// Nearest-rank percentile (0-100) over the retained samples, `0.0` when empty
    pub fn percentile(&self, p: f64) -> f64 {
        let mut values: Vec<f64> = self.read().recent.iter().copied().collect();
        if values.is_empty() {
            return 0.0;
        }

        values.sort_by(f64::total_cmp);
        let index = ((p.clamp(0.0, 100.0) / 100.0) * (values.len() - 1) as f64).round() as usize;
        values[index]
    }

    /// Drop all observations
    pub fn reset(&self) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        *state = HistogramState::default();
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HistogramState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Metrics registry
pub trait Metrics: Send + Sync {
    /// Get or create a counter
    fn counter(&self, name: &str) -> Arc<Counter>;

    /// Get or create a histogram
    fn histogram(&self, name: &str) -> Arc<Histogram>;

    /// Record the duration of an operation under `<operation>_duration`
    fn record_execution_time(&self, operation: &str, duration: Duration) {
        self.histogram(&format!("{}_duration", operation))
            .observe_duration(duration);
    }

    /// Count an error under `errors_<error_type>`
    fn record_error(&self, error_type: &str) {
        self.counter(&format!("errors_{}", error_type)).inc();
    }
}

/// Default in-memory metrics registry
#[derive(Debug, Default)]
pub struct MetricsCollector {
    counters: RwLock<HashMap<String, Arc<Counter>>>,
    histograms: RwLock<HashMap<String, Arc<Histogram>>>,
}

impl MetricsCollector {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of all registered counters, sorted
    pub fn counter_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .counters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Names of all registered histograms, sorted
    pub fn histogram_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .histograms
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Reset every counter and histogram, keeping registrations
    pub fn reset_all(&self) {
        for counter in self
            .counters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
        {
            counter.reset();
        }
        for histogram in self
            .histograms
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
        {
            histogram.reset();
        }
    }
}

impl Metrics for MetricsCollector {
    fn counter(&self, name: &str) -> Arc<Counter> {
        self.counters
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Counter::new(name)))
            .clone()
    }

    fn histogram(&self, name: &str) -> Arc<Histogram> {
        self.histograms
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Histogram::new(name)))
            .clone()
    }
}
