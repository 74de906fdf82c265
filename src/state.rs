//! Benchmark state: the frame clock / FPS sampler / score smoother on one
//! side, and the cyclic animation phase machine on the other. Both take
//! injected millisecond timestamps so they can be driven without real time.

/// Discrete performance tier for a smoothed score
pub fn score_tier(score: f64) -> &'static str {
    if score >= 950.0 {
        "EXTREME PERFORMANCE"
    } else if score >= 850.0 {
        "MAXIMUM POWER"
    } else if score >= 700.0 {
        "HIGH PERFORMANCE"
    } else if score >= 550.0 {
        "GOOD PERFORMANCE"
    } else if score >= 400.0 {
        "AVERAGE PERFORMANCE"
    } else if score >= 250.0 {
        "LOW PERFORMANCE"
    } else {
        "MINIMAL PERFORMANCE"
    }
}

/// Performance measurement state
pub struct PerformanceState {
    /// Last sampled frames per second
    pub fps: u32,
    /// Frames counted since the last sample
    pub frame_count: u32,
    /// Timestamp (ms) of the last FPS sample
    pub last_sample_time: f64,
    /// Smoothed score in [0, 1000]
    pub score: f64,
    /// Latest synthetic calculation latency in ms
    pub calc_time_ms: f64,
}

impl PerformanceState {
    pub fn new(now_ms: f64) -> Self {
        Self {
            fps: 0,
            frame_count: 0,
            last_sample_time: now_ms,
            score: 0.0,
            calc_time_ms: 0.0,
        }
    }

    /// Counts one frame. When a full one-second window has elapsed, samples
    /// FPS, folds it into the smoothed score, and returns `true` to request a
    /// display refresh.
    pub fn on_frame(&mut self, now_ms: f64) -> bool {
        self.frame_count += 1;
        let elapsed = now_ms - self.last_sample_time;
        if elapsed < 1000.0 {
            return false;
        }
        self.fps = (f64::from(self.frame_count) * 1000.0 / elapsed).round() as u32;
        self.frame_count = 0;
        self.last_sample_time = now_ms;
        self.smooth_score();
        true
    }

    /// One exponential smoothing step toward the score the current FPS and
    /// calculation latency would earn (factor 0.1, applied once per sample)
    fn smooth_score(&mut self) {
        let target =
            (f64::from(self.fps) * 8.0 + (200.0 - self.calc_time_ms).max(0.0) * 2.0).min(1000.0);
        self.score += (target - self.score) * 0.1;
    }

    /// Records a synthetic-load round duration, replacing the previous figure
    pub fn record_calc_time(&mut self, ms: f64) {
        self.calc_time_ms = ms;
    }

    /// Folds a worker latency report in via running minimum
    pub fn fold_worker_time(&mut self, ms: f64) {
        self.calc_time_ms = self.calc_time_ms.min(ms);
    }

    /// Tier label for the current smoothed score
    pub fn tier(&self) -> &'static str {
        score_tier(self.score)
    }
}

/// Animation state for the cube
///
/// Rotations are degrees and accumulate without wrapping. Scales carry over
/// between outer-phase cycles without being reset; the resulting drift is the
/// contract, not an accident.
pub struct AnimationState {
    pub rotation_x: f64,
    pub rotation_y: f64,
    pub rotation_z: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub scale_z: f64,
    /// Outer phase in {0, 1, 2}, advanced every 15 seconds
    pub phase: u8,
    /// Timestamp (ms) the current outer phase started
    pub phase_start_time: f64,
}

impl AnimationState {
    pub fn new(now_ms: f64) -> Self {
        Self {
            rotation_x: 15.0,
            rotation_y: 15.0,
            rotation_z: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            scale_z: 1.0,
            phase: 0,
            phase_start_time: now_ms,
        }
    }

    /// Advances the animation by one tick.
    ///
    /// Past the 15-second window the outer phase wraps and the tick ends
    /// there; otherwise one of the three scale axes interpolates depending on
    /// which 5-second sub-phase the window is in, and the rotations
    /// accumulate their fixed per-tick increments.
    pub fn advance(&mut self, now_ms: f64) {
        let phase_time = (now_ms - self.phase_start_time) / 1000.0;
        if phase_time > 15.0 {
            self.phase = (self.phase + 1) % 3;
            self.phase_start_time = now_ms;
            return;
        }

        let progress = phase_time / 5.0;
        match (phase_time / 5.0).floor() as u8 {
            0 => self.scale_x = 0.5 + progress * 1.5,
            1 => self.scale_y = 0.5 + (progress - 1.0) * 1.5,
            2 => self.scale_z = 0.5 + (progress - 2.0) * 1.5,
            // phase_time of exactly 15.0 lands here; nothing scales
            _ => {}
        }

        self.rotation_y += 1.5;
        self.rotation_x += 0.8;
        self.rotation_z += 0.3;
    }
}
