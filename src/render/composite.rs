use crate::foundation::error::{FramefxError, FramefxResult};

pub type PremulRgba8 = [u8; 4];

pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = add_sat_u8(sa, mul_div255(u16::from(dst[3]), inv));

    for i in 0..3 {
        let sc = mul_div255(u16::from(src[i]), op);
        let dc = mul_div255(u16::from(dst[i]), inv);
        out[i] = add_sat_u8(sc, dc);
    }
    out
}

pub fn over_in_place(dst: &mut [u8], src: &[u8], opacity: f32) -> FramefxResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(FramefxError::render(
            "over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], opacity);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Tint `dst` toward `tint` using the overlay blend, weighted by `alpha`.
///
/// Only covered pixels are touched and their alpha is preserved (source-atop), so
/// transparent regions stay transparent and the underlying image stays recognizable.
pub fn overlay_tint_in_place(dst: &mut [u8], tint_rgb: [u8; 3], alpha: f32) -> FramefxResult<()> {
    if !dst.len().is_multiple_of(4) {
        return Err(FramefxError::render("overlay_tint expects an rgba8 buffer"));
    }
    let alpha = alpha.clamp(0.0, 1.0);
    if alpha <= 0.0 {
        return Ok(());
    }

    let tint = tint_rgb.map(|c| f32::from(c) / 255.0);
    for px in dst.chunks_exact_mut(4) {
        let a = px[3];
        if a == 0 {
            continue;
        }
        let af = f32::from(a) / 255.0;
        for i in 0..3 {
            let base = (f32::from(px[i]) / 255.0 / af).min(1.0);
            let blended = overlay(base, tint[i]);
            let mixed = base + (blended - base) * alpha;
            px[i] = ((mixed * af * 255.0).round()).clamp(0.0, f32::from(a)) as u8;
        }
    }
    Ok(())
}

/// Additively light one pixel with white at `strength` (0..=1), saturating at opaque white.
pub fn add_light(px: &mut [u8], strength: f32) {
    let s = ((strength.clamp(0.0, 1.0) * 255.0).round()) as u8;
    if s == 0 {
        return;
    }
    for c in px.iter_mut().take(4) {
        *c = c.saturating_add(s);
    }
}

fn overlay(base: f32, blend: f32) -> f32 {
    if base < 0.5 {
        2.0 * base * blend
    } else {
        1.0 - 2.0 * (1.0 - base) * (1.0 - blend)
    }
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

fn add_sat_u8(a: u8, b: u8) -> u8 {
    a.saturating_add(b)
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
