/// Cosmetic per-face effect values, a pure function of elapsed time and face
/// index. Recomputed from scratch every tick; holds no state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceEffect {
    /// Opacity pulse in [0.6, 1.0]
    pub opacity: f64,
    /// Depth offset in [-2.0, 2.0], pushes the face along its z-axis
    pub distortion: f64,
    /// Blur amount in [0.0, 1.0]
    pub blur: f64,
    /// Contrast boost in [1.18, 1.3]
    pub contrast: f64,
}

impl FaceEffect {
    /// Effect values for face `index` at `t` seconds of elapsed time
    pub fn at(t: f64, index: usize) -> Self {
        let i = index as f64;
        let pulse = (t * 3.0 + i).sin() * 0.2 + 0.8;
        Self {
            opacity: pulse,
            distortion: (t * 5.0 + i).sin() * 2.0,
            blur: (t * 2.0 + i).sin().abs(),
            contrast: 1.0 + pulse * 0.3,
        }
    }

    /// Combined brightness factor the renderer applies to a face's shade
    pub fn shade_factor(&self) -> f64 {
        (self.opacity * self.contrast * (1.0 - self.blur * 0.2)).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effect_is_pure() {
        assert_eq!(FaceEffect::at(12.375, 3), FaceEffect::at(12.375, 3));
    }

    #[test]
    fn values_stay_in_range() {
        for step in 0..2_000 {
            let t = step as f64 * 0.037;
            for index in 0..6 {
                let fx = FaceEffect::at(t, index);
                assert!((0.6..=1.0).contains(&fx.opacity));
                assert!((-2.0..=2.0).contains(&fx.distortion));
                assert!((0.0..=1.0).contains(&fx.blur));
                assert!((1.18..=1.3).contains(&fx.contrast));
                assert!((0.0..=1.0).contains(&fx.shade_factor()));
            }
        }
    }

    #[test]
    fn faces_are_phase_shifted() {
        let a = FaceEffect::at(1.0, 0);
        let b = FaceEffect::at(1.0, 1);
        assert_ne!(a, b);
    }
}
