use std::sync::atomic::{AtomicU64, Ordering};

use crate::render::composite;

static CALL_COUNTER: AtomicU64 = AtomicU64::new(0x5EED_F00D);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Glint {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub strength: f32,
}

/// Small splitmix64 stream; good enough for scattering glints.
#[derive(Clone, Debug)]
pub struct GlintRng(u64);

impl GlintRng {
    pub fn new(seed: u64) -> Self {
        Self(seed)
    }

    /// A fresh seed per call, so unseeded sparkles scatter differently every frame.
    pub fn unseeded() -> Self {
        Self(mix64(CALL_COUNTER.fetch_add(0x9E37_79B9_7F4A_7C15, Ordering::Relaxed)))
    }

    pub fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        mix64(self.0)
    }

    /// Uniform in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}

fn mix64(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Place `count` glints on a `width x height` surface.
///
/// Each glint twinkles: its size and strength follow a sine of `progress` phase-shifted by
/// its index, so neighbouring glints peak at different times.
pub fn scatter_glints(
    rng: &mut GlintRng,
    count: u32,
    width: u32,
    height: u32,
    progress: f64,
) -> Vec<Glint> {
    let base_radius = (f64::from(width.min(height)) * 0.02).max(2.0);
    let p = progress.clamp(0.0, 1.0);

    (0..count)
        .map(|i| {
            let x = rng.next_f64() * f64::from(width);
            let y = rng.next_f64() * f64::from(height);
            let size_jitter = 0.6 + rng.next_f64() * 0.8;
            let phase = f64::from(i) * 1.7;
            let twinkle = 0.5 + 0.5 * (p * std::f64::consts::TAU * 2.0 + phase).sin();
            Glint {
                x,
                y,
                radius: base_radius * size_jitter * (0.5 + 0.5 * twinkle),
                strength: twinkle as f32,
            }
        })
        .collect()
}

/// Paint one radial glint: bright core, quadratic falloff to zero at `radius`.
pub fn draw_glint(dst: &mut [u8], width: u32, height: u32, glint: &Glint) {
    if glint.radius <= 0.0 || glint.strength <= 0.0 {
        return;
    }
    let w = i64::from(width);
    let h = i64::from(height);
    let x0 = ((glint.x - glint.radius).floor() as i64).max(0);
    let x1 = ((glint.x + glint.radius).ceil() as i64).min(w - 1);
    let y0 = ((glint.y - glint.radius).floor() as i64).max(0);
    let y1 = ((glint.y + glint.radius).ceil() as i64).min(h - 1);

    for py in y0..=y1 {
        for px in x0..=x1 {
            let dx = (px as f64 + 0.5) - glint.x;
            let dy = (py as f64 + 0.5) - glint.y;
            let d = (dx * dx + dy * dy).sqrt() / glint.radius;
            if d >= 1.0 {
                continue;
            }
            let falloff = (1.0 - d) * (1.0 - d);
            let idx = ((py * w + px) * 4) as usize;
            composite::add_light(&mut dst[idx..idx + 4], glint.strength * falloff as f32);
        }
    }
}
