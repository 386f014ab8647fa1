//! Deterministic gradient noise for terrain generation.
//!
//! Each integer lattice point gets one of eight unit gradients picked by hashing
//! `(ix, iy, seed)`. Samples blend the four surrounding gradients with a quintic
//! fade and sum five octaves, so the field is a pure function of `(seed, x, y)`.

use glam::DVec2;
use std::cell::RefCell;
use std::collections::HashMap;
use std::f64::consts::FRAC_1_SQRT_2;

/// Number of octaves summed per sample.
pub const OCTAVES: u32 = 5;

/// Frequency multiplier between octaves.
const LACUNARITY: f64 = 2.0;

/// Amplitude multiplier between octaves.
const PERSISTENCE: f64 = 0.5;

/// The eight lattice gradient directions.
const GRADIENTS: [DVec2; 8] = [
    DVec2::new(1.0, 0.0),
    DVec2::new(-1.0, 0.0),
    DVec2::new(0.0, 1.0),
    DVec2::new(0.0, -1.0),
    DVec2::new(FRAC_1_SQRT_2, FRAC_1_SQRT_2),
    DVec2::new(-FRAC_1_SQRT_2, FRAC_1_SQRT_2),
    DVec2::new(FRAC_1_SQRT_2, -FRAC_1_SQRT_2),
    DVec2::new(-FRAC_1_SQRT_2, -FRAC_1_SQRT_2),
];

/// Seeded 2-D gradient noise field.
///
/// Gradients are memoized per lattice point. The cache is append-only: the gradient
/// for a point depends only on the point and the seed, so entries never go stale.
#[derive(Debug)]
pub struct NoiseField {
    seed: u32,
    amplitude: f64,
    gradients: RefCell<HashMap<(i32, i32), DVec2>>,
}

impl NoiseField {
    /// Create a field with unit base amplitude.
    pub fn new(seed: u32) -> Self {
        Self::with_amplitude(seed, 1.0)
    }

    /// Create a field whose first octave has amplitude `amplitude`.
    ///
    /// The sum is normalized by the total amplitude, so this only changes the
    /// relative weighting inside the sum, never the output range.
    pub fn with_amplitude(seed: u32, amplitude: f64) -> Self {
        debug_assert!(amplitude > 0.0);
        Self {
            seed,
            amplitude,
            gradients: RefCell::new(HashMap::new()),
        }
    }

    /// Seed this field was created with.
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Multi-octave sample. Returns a value in `[-1.0, 1.0]`.
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let mut total = 0.0;
        let mut amplitude = self.amplitude;
        let mut frequency = 1.0;
        let mut max_value = 0.0;

        for _ in 0..OCTAVES {
            total += self.raw_noise(x * frequency, y * frequency) * amplitude;
            max_value += amplitude;

            amplitude *= PERSISTENCE;
            frequency *= LACUNARITY;
        }

        total / max_value
    }

    /// Single-octave gradient noise.
    pub fn raw_noise(&self, x: f64, y: f64) -> f64 {
        let x0 = x.floor();
        let y0 = y.floor();
        let ix = x0 as i32;
        let iy = y0 as i32;
        let fx = x - x0;
        let fy = y - y0;

        let n00 = self.gradient(ix, iy).dot(DVec2::new(fx, fy));
        let n10 = self.gradient(ix + 1, iy).dot(DVec2::new(fx - 1.0, fy));
        let n01 = self.gradient(ix, iy + 1).dot(DVec2::new(fx, fy - 1.0));
        let n11 = self.gradient(ix + 1, iy + 1).dot(DVec2::new(fx - 1.0, fy - 1.0));

        let u = fade(fx);
        let v = fade(fy);
        lerp(lerp(n00, n10, u), lerp(n01, n11, u), v)
    }

    /// Number of lattice gradients computed so far.
    pub fn cached_gradients(&self) -> usize {
        self.gradients.borrow().len()
    }

    fn gradient(&self, ix: i32, iy: i32) -> DVec2 {
        *self
            .gradients
            .borrow_mut()
            .entry((ix, iy))
            .or_insert_with(|| GRADIENTS[gradient_index(ix, iy, self.seed)])
    }
}

/// Hash a lattice point into the gradient table.
fn gradient_index(ix: i32, iy: i32, seed: u32) -> usize {
    let mut h = (ix as u32).wrapping_mul(0x8da6_b343)
        ^ (iy as u32).wrapping_mul(0xd816_3841)
        ^ seed.wrapping_mul(0xcb1a_b31f);
    // Fold high bits down; the low bits of the raw products only see the low bits
    // of the inputs.
    h ^= h >> 16;
    h = h.wrapping_mul(0x7feb_352d);
    h ^= h >> 15;
    (h % GRADIENTS.len() as u32) as usize
}

/// Quintic smoothstep `6t^5 - 15t^4 + 10t^3`.
#[inline]
fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + t * (b - a)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noise_determinism() {
        let field1 = NoiseField::new(12345);
        let field2 = NoiseField::new(12345);

        // Same seed should produce same values
        for x in 0..10 {
            for y in 0..10 {
                let val1 = field1.sample(x as f64 * 0.37, y as f64 * 0.61);
                let val2 = field2.sample(x as f64 * 0.37, y as f64 * 0.61);
                assert_eq!(val1, val2, "Noise not deterministic at ({}, {})", x, y);
            }
        }
    }

    #[test]
    fn test_repeated_sample_is_stable() {
        let field = NoiseField::new(42);
        let first = field.sample(4.0, 12.0);
        let second = field.sample(4.0, 12.0);
        assert_eq!(first.to_bits(), second.to_bits());
    }

    #[test]
    fn test_noise_range() {
        let field = NoiseField::new(7);

        for x in 0..100 {
            for y in 0..100 {
                let val = field.sample(x as f64 * 0.1 - 5.0, y as f64 * 0.1 - 5.0);
                assert!(
                    (-1.0..=1.0).contains(&val),
                    "Noise value {} out of range at ({}, {})",
                    val,
                    x,
                    y
                );
            }
        }
    }

    #[test]
    fn test_different_seeds_produce_different_noise() {
        let field1 = NoiseField::new(1);
        let field2 = NoiseField::new(2);

        let any_different = (0..20).any(|x| {
            (0..20).any(|y| {
                let val1 = field1.sample(x as f64 * 0.5 + 0.25, y as f64 * 0.5 + 0.25);
                let val2 = field2.sample(x as f64 * 0.5 + 0.25, y as f64 * 0.5 + 0.25);
                (val1 - val2).abs() > 0.001
            })
        });

        assert!(
            any_different,
            "Different seeds should produce different noise"
        );
    }

    #[test]
    fn test_raw_noise_vanishes_on_lattice_points() {
        let field = NoiseField::new(99);
        for x in -3..3 {
            for y in -3..3 {
                assert_eq!(field.raw_noise(x as f64, y as f64), 0.0);
            }
        }
    }

    #[test]
    fn test_noise_is_smooth() {
        let field = NoiseField::new(2024);
        for i in 0..200 {
            let x = i as f64 * 0.173 - 17.0;
            let y = i as f64 * 0.291 - 29.0;
            let delta = (field.sample(x, y) - field.sample(x + 0.01, y)).abs();
            assert!(delta < 0.5, "jump of {} at ({}, {})", delta, x, y);
        }
    }

    #[test]
    fn test_gradient_cache_is_reused() {
        let field = NoiseField::new(5);
        field.raw_noise(0.5, 0.5);
        assert_eq!(field.cached_gradients(), 4);

        // Same cell: no new lattice points.
        field.raw_noise(0.25, 0.75);
        assert_eq!(field.cached_gradients(), 4);

        // Neighbouring cell shares an edge.
        field.raw_noise(1.5, 0.5);
        assert_eq!(field.cached_gradients(), 6);
    }

    #[test]
    fn test_gradient_index_in_table() {
        for x in -50..50 {
            for y in -50..50 {
                assert!(gradient_index(x, y, 17) < GRADIENTS.len());
            }
        }
    }

    #[test]
    fn test_gradient_index_does_not_repeat_every_eight_cells() {
        for seed in [0, 42, 12345] {
            let shifted_x =
                (-16..16).any(|x| gradient_index(x, 3, seed) != gradient_index(x + 8, 3, seed));
            let shifted_y =
                (-16..16).any(|y| gradient_index(3, y, seed) != gradient_index(3, y + 8, seed));
            assert!(shifted_x && shifted_y, "seed {seed} repeats with period 8");
        }
    }

    #[test]
    fn test_gradients_are_unit_length() {
        for gradient in GRADIENTS {
            assert!((gradient.length() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_fade_endpoints() {
        assert_eq!(fade(0.0), 0.0);
        assert_eq!(fade(1.0), 1.0);
        assert!((fade(0.5) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_amplitude_does_not_change_range() {
        let field = NoiseField::with_amplitude(3, 40.0);
        for x in 0..50 {
            let val = field.sample(x as f64 * 0.33, 1.7);
            assert!((-1.0..=1.0).contains(&val));
        }
    }
}
