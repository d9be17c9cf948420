// Procedural rock terrain.
//
// Generates the fixed rock mask once, at world creation, by thresholding a
// fractal gradient-noise field (Perlin-style): each octave is a lattice of
// pseudo-random gradients, interpolated with the quintic fade curve, summed
// with decreasing amplitude (`persistence`) and increasing frequency
// (`lacunarity`), and normalized back into [-1, 1]. A cell is rock where the
// field exceeds `rock_threshold`.
//
// The field tiles across the torus. Each octave's lattice has an integer
// period that divides the grid exactly, and lattice indices are reduced modulo
// that period before hashing, so rock blobs that touch one edge continue
// seamlessly on the opposite edge.
//
// See also: `config.rs` for `TerrainParams`, `grid.rs` which turns the mask
// into cell terrain, `engine.rs` which calls `generate_rock_mask()`.
//
// **Critical constraint: determinism.** The permutation table and the octave
// offsets come from a `SimRng` stream derived from the run seed; identical
// inputs always produce the identical mask.

use crate::config::TerrainParams;
use crate::error::{ConfigError, Violations};
use crate::prng::SimRng;
use serde::{Deserialize, Serialize};

/// Stream id separating terrain randomness from the engine's own stream.
pub const TERRAIN_STREAM: u64 = 0x7e77_a1a5;

/// One bit per cell, `true` = rock, row-major.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RockMask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl RockMask {
    /// Build a mask from explicit bits. Panics if the length does not match.
    pub fn from_bits(width: u32, height: u32, bits: Vec<bool>) -> Self {
        assert_eq!(
            bits.len(),
            width as usize * height as usize,
            "rock mask size does not match its dimensions"
        );
        Self {
            width,
            height,
            bits,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    /// Rock at `(x, y)`. Panics outside the mask.
    pub fn is_rock(&self, x: u32, y: u32) -> bool {
        assert!(x < self.width && y < self.height, "mask lookup out of range");
        self.bits[x as usize + y as usize * self.width as usize]
    }

    pub fn rock_count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }
}

/// Generate the rock mask for a `width × height` torus.
///
/// Fails if a dimension is zero or any terrain parameter is out of range;
/// every problem is listed in the returned error.
pub fn generate_rock_mask(
    width: u32,
    height: u32,
    params: &TerrainParams,
    seed: u64,
) -> Result<RockMask, ConfigError> {
    let mut v = Violations::default();
    v.check(width > 0, "grid_width", "must be at least 1");
    v.check(height > 0, "grid_height", "must be at least 1");
    v.extend(params.validate());
    v.into_result()?;

    let mut rng = SimRng::with_stream(seed, TERRAIN_STREAM);
    let noise = FractalNoise::new(width, height, params, &mut rng);
    let mut bits = Vec::with_capacity(width as usize * height as usize);
    for y in 0..height {
        for x in 0..width {
            bits.push(noise.sample(x as f64, y as f64) > params.rock_threshold);
        }
    }
    Ok(RockMask::from_bits(width, height, bits))
}

// ---------------------------------------------------------------------------
// Gradient noise
// ---------------------------------------------------------------------------

/// Single-octave 2D gradient noise over a periodic lattice.
struct GradientNoise {
    perm: [u8; 512],
}

impl GradientNoise {
    fn new(rng: &mut SimRng) -> Self {
        let mut p: Vec<u8> = (0..=255).collect();
        rng.shuffle(&mut p);
        let mut perm = [0u8; 512];
        for (i, slot) in perm.iter_mut().enumerate() {
            *slot = p[i & 255];
        }
        Self { perm }
    }

    fn hash(&self, ix: i64, iy: i64) -> u8 {
        let a = self.perm[(ix & 255) as usize] as usize;
        self.perm[a + (iy & 255) as usize]
    }

    /// Noise at `(u, v)` in lattice units, repeating every `period_x` /
    /// `period_y` lattice cells. Roughly in [-1, 1].
    fn sample(&self, u: f64, v: f64, period_x: i64, period_y: i64) -> f64 {
        let u0 = u.floor();
        let v0 = v.floor();
        let fu = u - u0;
        let fv = v - v0;

        let x0 = (u0 as i64).rem_euclid(period_x);
        let y0 = (v0 as i64).rem_euclid(period_y);
        let x1 = (x0 + 1) % period_x;
        let y1 = (y0 + 1) % period_y;

        let n00 = grad(self.hash(x0, y0), fu, fv);
        let n10 = grad(self.hash(x1, y0), fu - 1.0, fv);
        let n01 = grad(self.hash(x0, y1), fu, fv - 1.0);
        let n11 = grad(self.hash(x1, y1), fu - 1.0, fv - 1.0);

        let a = fade(fu);
        let b = fade(fv);
        lerp(lerp(n00, n10, a), lerp(n01, n11, a), b)
    }
}

fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + t * (b - a)
}

/// Dot product with one of four diagonal gradients.
fn grad(hash: u8, x: f64, y: f64) -> f64 {
    match hash & 3 {
        0 => x + y,
        1 => -x + y,
        2 => x - y,
        _ => -x - y,
    }
}

/// One octave: its lattice period and a random shift of the sample origin.
struct Octave {
    period_x: i64,
    period_y: i64,
    shift_x: f64,
    shift_y: f64,
    amplitude: f64,
}

/// Sum of octaves, tiling over a `width × height` grid.
struct FractalNoise {
    base: GradientNoise,
    octaves: Vec<Octave>,
    width: f64,
    height: f64,
    total_amplitude: f64,
}

impl FractalNoise {
    fn new(width: u32, height: u32, params: &TerrainParams, rng: &mut SimRng) -> Self {
        let base = GradientNoise::new(rng);
        let base_px = (width as f64 / params.noise_scale).round().max(1.0);
        let base_py = (height as f64 / params.noise_scale).round().max(1.0);

        let mut octaves = Vec::with_capacity(params.octaves as usize);
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut total_amplitude = 0.0;
        for _ in 0..params.octaves {
            let period_x = (base_px * frequency).round().max(1.0) as i64;
            let period_y = (base_py * frequency).round().max(1.0) as i64;
            octaves.push(Octave {
                period_x,
                period_y,
                shift_x: rng.next_f64() * period_x as f64,
                shift_y: rng.next_f64() * period_y as f64,
                amplitude,
            });
            total_amplitude += amplitude;
            amplitude *= params.persistence;
            frequency *= params.lacunarity;
        }

        Self {
            base,
            octaves,
            width: width as f64,
            height: height as f64,
            total_amplitude,
        }
    }

    /// Field value at the center of cell `(x, y)`, in [-1, 1].
    fn sample(&self, x: f64, y: f64) -> f64 {
        let mut sum = 0.0;
        for o in &self.octaves {
            let u = (x + 0.5) / self.width * o.period_x as f64 + o.shift_x;
            let v = (y + 0.5) / self.height * o.period_y as f64 + o.shift_y;
            sum += o.amplitude * self.base.sample(u, v, o.period_x, o.period_y);
        }
        (sum / self.total_amplitude).clamp(-1.0, 1.0)
    }
}
