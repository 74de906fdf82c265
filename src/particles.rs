//! Rising particle backdrop. Purely decorative: particles drift up the
//! screen, die past the top edge, and immediately respawn below the bottom.
//! Nothing in the benchmark core reads particle state.

use crate::render::CellBuffer;
use crate::util::Rng;

const GLYPHS: [char; 4] = ['.', ':', '*', 'o'];

/// A single background particle
#[derive(Clone)]
pub struct Particle {
    col: f64,
    row: f64,
    /// Rows per second, upward
    speed: f64,
    glyph: char,
    brightness: u8,
}

/// Fixed-size pool of self-replenishing particles
pub struct ParticleField {
    particles: Vec<Particle>,
    rng: Rng,
    width: u16,
    height: u16,
}

impl ParticleField {
    pub fn new(count: usize, width: u16, height: u16, seed: u64) -> Self {
        let mut field = Self {
            particles: Vec::with_capacity(count),
            rng: Rng::new(seed),
            width,
            height,
        };
        for _ in 0..count {
            let particle = field.spawn();
            field.particles.push(particle);
        }
        field
    }

    /// Fresh particle just below the bottom edge with randomized column,
    /// glyph weight, travel duration and brightness
    fn spawn(&mut self) -> Particle {
        let height = f64::from(self.height);
        let travel = height + 2.0;
        let duration = self.rng.range_f64(4.0, 12.0);
        let size = self.rng.range_f64(0.0, GLYPHS.len() as f64) as usize;
        Particle {
            col: self.rng.range_f64(0.0, f64::from(self.width)),
            row: self.rng.range_f64(height, height + 2.0),
            speed: travel / duration,
            glyph: GLYPHS[size.min(GLYPHS.len() - 1)],
            brightness: (self.rng.range_f64(0.2, 1.0) * 255.0) as u8,
        }
    }

    /// Advances every particle by `dt` seconds, respawning the ones that
    /// left through the top
    pub fn update(&mut self, dt: f64) {
        for i in 0..self.particles.len() {
            self.particles[i].row -= self.particles[i].speed * dt;
            if self.particles[i].row < -1.0 {
                let fresh = self.spawn();
                self.particles[i] = fresh;
            }
        }
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
    }

    pub fn draw(&self, buf: &mut CellBuffer) {
        for p in &self.particles {
            let b = p.brightness;
            buf.put(p.col as i32, p.row as i32, p.glyph, (b, b, b));
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_size_is_constant() {
        let mut field = ParticleField::new(50, 80, 24, 1);
        for _ in 0..1_000 {
            field.update(0.5);
        }
        assert_eq!(field.len(), 50);
    }

    #[test]
    fn particles_respawn_below_the_bottom() {
        let mut field = ParticleField::new(20, 80, 24, 2);
        // Enough time for every particle to cross the whole screen
        field.update(60.0);
        for p in &field.particles {
            assert!(p.row >= 24.0, "particle at row {} was not respawned", p.row);
        }
    }

    #[test]
    fn same_seed_gives_same_field() {
        let a = ParticleField::new(10, 80, 24, 9);
        let b = ParticleField::new(10, 80, 24, 9);
        for (pa, pb) in a.particles.iter().zip(&b.particles) {
            assert_eq!(pa.col, pb.col);
            assert_eq!(pa.row, pb.row);
            assert_eq!(pa.glyph, pb.glyph);
        }
    }

    #[test]
    fn zero_count_is_fine() {
        let mut field = ParticleField::new(0, 80, 24, 1);
        field.update(1.0);
        assert!(field.is_empty());
    }
}
