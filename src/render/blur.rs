use crate::{
    foundation::{core::Affine, error::FramefxResult},
    render::surface::{FrameSource, Surface},
};

/// Rings of taps laid around the center draw; each ring adds [`TAPS_PER_RING`] draws.
pub const MAX_RINGS: u32 = 4;
pub const TAPS_PER_RING: u32 = 8;

/// One offset draw of the source.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlurTap {
    pub dx: i64,
    pub dy: i64,
    /// Gaussian weight relative to the center draw (weight 1).
    pub weight: f32,
}

/// Blur radius in pixels at `amount` (0..=1) of `max_radius_px`. Zero means no blur.
pub fn blur_radius(amount: f64, max_radius_px: u32) -> u32 {
    let amount = if amount.is_finite() { amount.clamp(0.0, 1.0) } else { 0.0 };
    (amount * f64::from(max_radius_px)).round() as u32
}

/// Taps for a blur of `radius` pixels, innermost ring first.
///
/// Rings are evenly spaced out to `radius`, each holding taps in eight directions, so every
/// tap has a mirrored partner. Weights follow a gaussian with `sigma = radius / 2`. Taps that
/// round onto the same pixel offset are merged.
pub fn blur_taps(radius: u32) -> Vec<BlurTap> {
    if radius == 0 {
        return Vec::new();
    }
    let rings = radius.min(MAX_RINGS);
    let sigma = f64::from(radius) / 2.0;
    let mut taps: Vec<BlurTap> = Vec::with_capacity((rings * TAPS_PER_RING) as usize);

    for ring in 1..=rings {
        let r = f64::from(radius) * f64::from(ring) / f64::from(rings);
        let weight = (-(r * r) / (2.0 * sigma * sigma)).exp() as f32;
        for step in 0..TAPS_PER_RING {
            let angle = std::f64::consts::TAU * f64::from(step) / f64::from(TAPS_PER_RING);
            let dx = (r * angle.cos()).round() as i64;
            let dy = (r * angle.sin()).round() as i64;
            if (dx, dy) == (0, 0) || taps.iter().any(|t| (t.dx, t.dy) == (dx, dy)) {
                continue;
            }
            taps.push(BlurTap { dx, dy, weight });
        }
    }
    taps
}

/// Draw `source` blurred by `radius` pixels onto `surface`.
///
/// The source is drawn once unshifted, then once per tap with the opacity that keeps a
/// running weighted mean of every draw so far. Pixels a shifted draw doesn't reach keep the
/// earlier draws, so opaque sources stay opaque up to the edges.
pub fn draw_blurred(
    surface: &mut Surface,
    source: &dyn FrameSource,
    radius: u32,
) -> FramefxResult<()> {
    surface.draw_source(source, Affine::IDENTITY, 1.0)?;

    let mut total = 1.0f32;
    for tap in blur_taps(radius) {
        total += tap.weight;
        let offset = Affine::translate((tap.dx as f64, tap.dy as f64));
        surface.draw_source(source, offset, tap.weight / total)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/blur.rs"]
mod tests;
