//! Background compute workers. Each worker owns its loop state and talks to
//! the coordinator only through channels: an inbound trigger, an outbound
//! latency report. Fire-and-forget in both directions; no ordering guarantee
//! between workers.

use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crate::error::BenchError;

/// Trigger cadence in ms
pub const TRIGGER_INTERVAL_MS: f64 = 50.0;

/// One completed compute round
#[derive(Debug, Clone, Copy)]
pub struct WorkerReport {
    pub id: usize,
    pub latency_ms: f64,
    /// Rounds this worker has completed so far
    pub rounds: u64,
}

struct Worker {
    trigger: Option<mpsc::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

/// Pool of compute workers plus the 50ms trigger schedule
pub struct WorkerPool {
    workers: Vec<Worker>,
    reports: mpsc::Receiver<WorkerReport>,
    last_trigger: Option<f64>,
}

impl WorkerPool {
    /// Spawns `count` workers. A spawn failure tears down nothing and
    /// propagates; the caller treats it as fatal.
    pub fn spawn(count: usize, intensity: u32) -> Result<Self, BenchError> {
        let (report_tx, report_rx) = mpsc::channel();
        let mut workers = Vec::with_capacity(count);

        for id in 0..count {
            let (trigger_tx, trigger_rx) = mpsc::channel::<()>();
            let reports = report_tx.clone();

            let handle = thread::Builder::new()
                .name(format!("bench-worker-{id}"))
                .spawn(move || {
                    let mut rounds = 0u64;
                    while trigger_rx.recv().is_ok() {
                        let start = Instant::now();
                        worker_crunch(intensity);
                        rounds += 1;
                        let report = WorkerReport {
                            id,
                            latency_ms: start.elapsed().as_secs_f64() * 1000.0,
                            rounds,
                        };
                        if reports.send(report).is_err() {
                            break;
                        }
                    }
                })
                .map_err(|source| BenchError::Spawn {
                    role: "compute worker",
                    source,
                })?;

            workers.push(Worker {
                trigger: Some(trigger_tx),
                handle: Some(handle),
            });
        }

        Ok(Self {
            workers,
            reports: report_rx,
            last_trigger: None,
        })
    }

    /// Sends a compute trigger to every worker if 50ms have passed since the
    /// previous one
    pub fn maybe_trigger(&mut self, now_ms: f64) {
        let due = match self.last_trigger {
            Some(last) => now_ms - last >= TRIGGER_INTERVAL_MS,
            None => true,
        };
        if due {
            self.trigger_all();
            self.last_trigger = Some(now_ms);
        }
    }

    /// Sends a compute trigger to every worker immediately
    pub fn trigger_all(&mut self) {
        for worker in &self.workers {
            if let Some(trigger) = &worker.trigger {
                let _ = trigger.send(());
            }
        }
    }

    /// Drains whatever reports have arrived, in no particular order
    pub fn poll(&mut self) -> Vec<WorkerReport> {
        self.reports.try_iter().collect()
    }

    /// Terminates all workers: drops the trigger channels so each loop exits,
    /// then joins. Idempotent.
    pub fn stop(&mut self) {
        for worker in &mut self.workers {
            worker.trigger = None;
        }
        for worker in &mut self.workers {
            if let Some(handle) = worker.handle.take() {
                let _ = handle.join();
            }
        }
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Per-worker busy loop, same flavor as the main-thread crunch
fn worker_crunch(intensity: u32) -> f64 {
    let iterations = u64::from(intensity) * 5_000;
    let mut result = 0.0f64;
    for i in 0..iterations {
        let x = i as f64;
        result += x.sin() * x.cos() * x.sqrt();
        result += (x + 1.0).ln() * ((i % 1000) as f64 / 1000.0).exp();
        result += x.atan2((i % 100) as f64 + 1.0);
        for j in 0..3u64 {
            result += (x % 180.0).tan() * (j as f64).cos() * (x + j as f64).sin();
        }
    }
    std::hint::black_box(result)
}
