//! Synthetic CPU load. None of this computes anything meaningful; the loops
//! exist to burn time so the measured latency and frame rate move. The
//! `intensity` knob scales every iteration count, with 0 collapsing each
//! workload to a no-op so tests can run the core deterministically.

use std::hint::black_box;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::error::BenchError;

/// Default workload intensity; heavy enough to visibly dent the frame rate
pub const DEFAULT_INTENSITY: u32 = 100;

/// Cadence of the load generator thread
const ROUND_INTERVAL: Duration = Duration::from_millis(16);

/// Trigonometric number-crunching
pub fn trig_crunch(intensity: u32) -> f64 {
    let iterations = u64::from(intensity) * 20_000;
    let mut total = 0.0f64;
    for i in 0..iterations {
        let x = i as f64 * std::f64::consts::PI;
        total += x.sin() * x.cos() * (x % 180.0).tan();
        total += (i as f64).sqrt() * ((i + 1) as f64).ln();
        for j in 0..10u64 {
            total += (i as f64).atan2(j as f64 + 1.0) * ((i % 1000) as f64 / 1000.0).exp();
        }
    }
    black_box(total)
}

/// Allocate-fill-discard memory stress
pub fn memory_stress(intensity: u32) {
    let blocks = intensity / 2;
    for _ in 0..blocks {
        let mut large = vec![0.0f64; 50_000];
        for (j, slot) in large.iter_mut().enumerate() {
            *slot = (j as f64).sin() * std::f64::consts::E;
        }
        black_box(&large);
        // Dropped here; the allocator churn is the point
    }
}

/// Fake physics accumulation
pub fn physics_crunch(intensity: u32) -> f64 {
    let particles = u64::from(intensity) * 20;
    let mut energy = 0.0f64;
    for i in 0..particles {
        let velocity = (i % 20) as f64;
        let mass = (i % 10) as f64 + 1.0;
        let acceleration = (i % 5) as f64;

        energy += 0.5 * mass * velocity * velocity;
        energy += mass * acceleration * velocity;

        for _ in 0..5 {
            energy += velocity.sin() * acceleration.cos() * mass;
            energy += (velocity % 180.0).tan() * (mass + 1.0).ln();
        }
    }
    black_box(energy)
}

/// Runs all three workloads back to back and reports the wall-clock cost in ms
pub fn run_round(intensity: u32) -> f64 {
    let start = Instant::now();
    trig_crunch(intensity);
    memory_stress(intensity);
    physics_crunch(intensity);
    start.elapsed().as_secs_f64() * 1000.0
}

/// Background thread running workload rounds on a ~16ms cadence and reporting
/// each round's duration
pub struct LoadGenerator {
    results: mpsc::Receiver<f64>,
    shutdown: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl LoadGenerator {
    pub fn spawn(intensity: u32) -> Result<Self, BenchError> {
        let (tx, rx) = mpsc::channel();
        let shutdown = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&shutdown);

        let handle = thread::Builder::new()
            .name("load-gen".into())
            .spawn(move || {
                while !flag.load(Ordering::Relaxed) {
                    let start = Instant::now();
                    let round_ms = run_round(intensity);
                    if tx.send(round_ms).is_err() {
                        break;
                    }
                    thread::sleep(ROUND_INTERVAL.saturating_sub(start.elapsed()));
                }
            })
            .map_err(|source| BenchError::Spawn {
                role: "load generator",
                source,
            })?;

        Ok(Self {
            results: rx,
            shutdown,
            handle: Some(handle),
        })
    }

    /// Most recent round duration, if any arrived since the last call
    pub fn latest(&self) -> Option<f64> {
        self.results.try_iter().last()
    }

    /// Stops the generator thread. Idempotent.
    pub fn stop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for LoadGenerator {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_intensity_is_free() {
        let start = Instant::now();
        let ms = run_round(0);
        assert!(ms >= 0.0);
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[test]
    fn round_cost_is_measured_in_ms() {
        let ms = run_round(1);
        assert!(ms.is_finite());
        assert!(ms >= 0.0);
    }

    #[test]
    fn generator_reports_rounds_and_stops() {
        let mut generator = LoadGenerator::spawn(0).unwrap();
        let deadline = Instant::now() + Duration::from_secs(2);
        let mut got = None;
        while got.is_none() && Instant::now() < deadline {
            got = generator.latest();
            thread::sleep(Duration::from_millis(5));
        }
        assert!(got.is_some(), "no round report within 2s");
        generator.stop();
        generator.stop(); // idempotent
    }
}
