//! The benchmark coordinator: one instance per session, owning the
//! measurement and animation state, the synthetic load thread, the worker
//! pool and the particle backdrop. All render targets are injected so the
//! whole thing runs headless in tests.

use crate::error::BenchError;
use crate::load::LoadGenerator;
use crate::particles::ParticleField;
use crate::render::{self, CellBuffer};
use crate::state::{AnimationState, PerformanceState};
use crate::workers::WorkerPool;

/// Session configuration, filled in from the CLI
pub struct BenchConfig {
    /// Workload intensity; 0 disables the synthetic load entirely
    pub intensity: u32,
    /// Number of background compute workers
    pub workers: usize,
    /// Particle count for the backdrop
    pub particles: usize,
    /// Terminal size in cells
    pub width: u16,
    pub height: u16,
    /// Seed for particle randomness
    pub seed: u64,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            intensity: crate::load::DEFAULT_INTENSITY,
            workers: 4,
            particles: 500,
            width: 80,
            height: 24,
            seed: 0xC0BE_BE11,
        }
    }
}

/// The running benchmark
pub struct Benchmark {
    pub perf: PerformanceState,
    pub anim: AnimationState,
    particles: ParticleField,
    load: LoadGenerator,
    workers: WorkerPool,
    last_tick: f64,
    pause_started: Option<f64>,
    stopped: bool,
}

impl Benchmark {
    /// Starts the load generator and worker threads. Spawn failures are
    /// fatal; nothing is retried.
    pub fn new(config: &BenchConfig, now_ms: f64) -> Result<Self, BenchError> {
        Ok(Self {
            perf: PerformanceState::new(now_ms),
            anim: AnimationState::new(now_ms),
            particles: ParticleField::new(
                config.particles,
                config.width,
                config.height,
                config.seed,
            ),
            load: LoadGenerator::spawn(config.intensity)?,
            workers: WorkerPool::spawn(config.workers, config.intensity)?,
            last_tick: now_ms,
            pause_started: None,
            stopped: false,
        })
    }

    /// One tick of the render loop. Folds in whatever latency reports have
    /// arrived, keeps the worker trigger schedule going, advances the frame
    /// clock, animation and particles. Returns `true` when the FPS sampler
    /// closed a window and the HUD numbers changed.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        if self.stopped {
            return false;
        }

        self.workers.maybe_trigger(now_ms);

        if self.pause_started.is_some() {
            // Keep the channels drained, freeze everything else
            let _ = self.load.latest();
            self.workers.poll();
            return false;
        }

        if let Some(round_ms) = self.load.latest() {
            self.perf.record_calc_time(round_ms);
        }
        for report in self.workers.poll() {
            self.perf.fold_worker_time(report.latency_ms);
        }

        let dt = ((now_ms - self.last_tick) / 1000.0).max(0.0);
        self.last_tick = now_ms;

        let refreshed = self.perf.on_frame(now_ms);
        self.anim.advance(now_ms);
        self.particles.update(dt);
        refreshed
    }

    /// Pauses or resumes. Resuming shifts the sampler and phase windows past
    /// the paused span so neither sees a spurious multi-second gap.
    pub fn toggle_pause(&mut self, now_ms: f64) {
        match self.pause_started.take() {
            Some(started) => {
                let paused_for = now_ms - started;
                self.perf.last_sample_time += paused_for;
                self.anim.phase_start_time += paused_for;
                self.last_tick = now_ms;
            }
            None => self.pause_started = Some(now_ms),
        }
    }

    pub fn paused(&self) -> bool {
        self.pause_started.is_some()
    }

    /// Stops everything: the load thread and all workers. Idempotent and
    /// safe to call before the first tick. Ticks after this are no-ops.
    pub fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        self.load.stop();
        self.workers.stop();
    }

    pub fn stopped(&self) -> bool {
        self.stopped
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.particles.resize(width, height);
    }

    /// Paints the whole frame: particle backdrop, cube, HUD, overlays
    pub fn draw(&self, buf: &mut CellBuffer, now_ms: f64, wireframe: bool, debug: bool) {
        buf.clear();
        self.particles.draw(buf);
        render::draw_cube(buf, &self.anim, now_ms * 0.001, wireframe);

        let hud = (255, 255, 255);
        buf.put_str(1, 0, &format!("FPS: {}", self.perf.fps), hud);
        buf.put_str(1, 1, &format!("SCORE: {}", self.perf.score.round() as i64), hud);
        buf.put_str(1, 2, self.perf.tier(), hud);

        if debug {
            let gray = (160, 160, 160);
            let bottom = i32::from(buf.height()) - 3;
            buf.put_str(
                1,
                bottom,
                &format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
                gray,
            );
            buf.put_str(
                1,
                bottom + 1,
                &format!(
                    "rot: {:.1} {:.1} {:.1}  scale: {:.2} {:.2} {:.2}",
                    self.anim.rotation_x,
                    self.anim.rotation_y,
                    self.anim.rotation_z,
                    self.anim.scale_x,
                    self.anim.scale_y,
                    self.anim.scale_z
                ),
                gray,
            );
            buf.put_str(
                1,
                bottom + 2,
                &format!(
                    "phase: {}  calc: {:.2}ms  workers: {}  particles: {}",
                    self.anim.phase,
                    self.perf.calc_time_ms,
                    self.workers.len(),
                    self.particles.len()
                ),
                gray,
            );
        }

        if self.paused() {
            let text = "PAUSED";
            let x = (i32::from(buf.width()) - text.len() as i32) / 2;
            let y = i32::from(buf.height()) / 2;
            buf.put_str(x, y, text, (255, 255, 255));
        }
    }
}

impl Drop for Benchmark {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_config() -> BenchConfig {
        BenchConfig {
            intensity: 0,
            workers: 1,
            particles: 10,
            width: 40,
            height: 16,
            ..BenchConfig::default()
        }
    }

    #[test]
    fn ticks_advance_rotation() {
        let mut bench = Benchmark::new(&quiet_config(), 0.0).unwrap();
        bench.tick(16.0);
        bench.tick(32.0);
        assert!((bench.anim.rotation_y - 18.0).abs() < 1e-9);
        bench.stop();
    }

    #[test]
    fn stop_freezes_all_state() {
        let mut bench = Benchmark::new(&quiet_config(), 0.0).unwrap();
        bench.tick(16.0);
        bench.stop();

        let rotation = bench.anim.rotation_y;
        let scale = bench.anim.scale_x;
        let frames = bench.perf.frame_count;
        let score = bench.perf.score;
        let calc = bench.perf.calc_time_ms;

        for i in 0..50 {
            assert!(!bench.tick(1_000.0 + f64::from(i) * 16.0));
        }

        assert_eq!(bench.anim.rotation_y, rotation);
        assert_eq!(bench.anim.scale_x, scale);
        assert_eq!(bench.perf.frame_count, frames);
        assert_eq!(bench.perf.score, score);
        assert_eq!(bench.perf.calc_time_ms, calc);
    }

    #[test]
    fn stop_is_idempotent_even_before_ticking() {
        let mut bench = Benchmark::new(&quiet_config(), 0.0).unwrap();
        bench.stop();
        bench.stop();
        assert!(bench.stopped());
    }

    #[test]
    fn pause_freezes_animation_and_sampling() {
        let mut bench = Benchmark::new(&quiet_config(), 0.0).unwrap();
        bench.tick(16.0);
        bench.toggle_pause(16.0);

        let rotation = bench.anim.rotation_y;
        let frames = bench.perf.frame_count;
        for i in 0..10 {
            assert!(!bench.tick(32.0 + f64::from(i) * 16.0));
        }
        assert_eq!(bench.anim.rotation_y, rotation);
        assert_eq!(bench.perf.frame_count, frames);

        // Resume shifts the windows instead of replaying the gap
        bench.toggle_pause(5_016.0);
        bench.tick(5_032.0);
        assert!(bench.anim.rotation_y > rotation);
        assert!((bench.anim.phase_start_time - 5_000.0).abs() < 1e-9);
        bench.stop();
    }

    #[test]
    fn draw_renders_hud_and_cube() {
        let mut bench = Benchmark::new(&quiet_config(), 0.0).unwrap();
        bench.tick(16.0);
        let mut buf = CellBuffer::new(40, 16);
        bench.draw(&mut buf, 16.0, false, false);
        assert_eq!(buf.glyph_at(1, 0), 'F');
        assert!(buf.populated() > 30);
        bench.stop();
    }
}
