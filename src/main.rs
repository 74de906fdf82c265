// Allow unused code for test-facing accessors
#![allow(dead_code)]

mod app;
mod effects;
mod error;
mod load;
mod math;
mod particles;
mod render;
mod state;
mod util;
mod vertex;
mod workers;

use std::io;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};

use app::{BenchConfig, Benchmark};
use render::CellBuffer;

/// A console-based 3D cube stress benchmark
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Workload intensity; 0 disables the synthetic CPU load
    #[arg(long, default_value_t = load::DEFAULT_INTENSITY)]
    intensity: u32,

    /// Number of background compute workers
    #[arg(long, default_value_t = 4)]
    workers: usize,

    /// Particle count for the backdrop
    #[arg(long, default_value_t = 500)]
    particles: usize,

    /// Run for this many seconds, then exit (0 runs until 'q')
    #[arg(long, default_value_t = 0)]
    duration: u64,

    /// Start in wireframe mode
    #[arg(long)]
    wireframe: bool,
}

/// Nominal tick interval
const TICK: Duration = Duration::from_millis(16);

/// Restores the terminal exactly once, even when the main loop bails early
struct TerminalGuard {
    restored: bool,
}

impl TerminalGuard {
    fn activate() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen, cursor::Hide)?;
        Ok(Self { restored: false })
    }

    fn restore(&mut self) -> io::Result<()> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;
        execute!(io::stdout(), cursor::Show, LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}

fn terminal_dims() -> (u16, u16) {
    termsize::get().map_or((80, 24), |size| (size.cols, size.rows))
}

fn main() -> Result<()> {
    let args = Args::parse();
    let (width, height) = terminal_dims();

    let config = BenchConfig {
        intensity: args.intensity,
        workers: args.workers,
        particles: args.particles,
        width,
        height,
        ..BenchConfig::default()
    };

    let mut guard = TerminalGuard::activate()?;
    let start = Instant::now();
    let mut bench = Benchmark::new(&config, 0.0)?;
    let mut buf = CellBuffer::new(width, height);
    let mut out = io::stdout();
    let mut wireframe = args.wireframe;
    let mut debug = false;

    'run: loop {
        let frame_start = Instant::now();
        let now_ms = start.elapsed().as_secs_f64() * 1000.0;

        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => break 'run,
                    KeyCode::Char('p') | KeyCode::Char('P') => bench.toggle_pause(now_ms),
                    KeyCode::Char('d') | KeyCode::Char('D') => debug = !debug,
                    KeyCode::Char('w') | KeyCode::Char('W') => wireframe = !wireframe,
                    _ => {}
                },
                Event::Resize(w, h) => {
                    buf = CellBuffer::new(w, h);
                    bench.resize(w, h);
                }
                _ => {}
            }
        }

        bench.tick(now_ms);
        bench.draw(&mut buf, now_ms, wireframe, debug);
        buf.flush(&mut out)?;

        if args.duration > 0 && start.elapsed() >= Duration::from_secs(args.duration) {
            break;
        }

        std::thread::sleep(TICK.saturating_sub(frame_start.elapsed()));
    }

    let score = bench.perf.score.round() as i64;
    let tier = bench.perf.tier();
    let fps = bench.perf.fps;
    bench.stop();
    guard.restore()?;

    println!("final score {score} ({tier}), last sample {fps} fps");
    Ok(())
}
