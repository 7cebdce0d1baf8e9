use crate::foundation::error::{FramefxError, FramefxResult};

pub use kurbo::{Affine, Point, Rect, Vec2};

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    pub num: u32,
    pub den: u32, // must be > 0
}

impl Fps {
    pub fn new(num: u32, den: u32) -> FramefxResult<Self> {
        if den == 0 {
            return Err(FramefxError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(FramefxError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    pub fn whole(fps: u32) -> FramefxResult<Self> {
        Self::new(fps, 1)
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    /// Presentation timestamp of frame `index`, in microseconds.
    pub fn frame_timestamp_us(self, index: u64) -> u64 {
        let us = (index as u128) * 1_000_000u128 * u128::from(self.den) / u128::from(self.num);
        us.min(u128::from(u64::MAX)) as u64
    }

    pub fn frame_duration_us(self) -> u64 {
        self.frame_timestamp_us(1)
    }

    /// `round(secs * fps)`, saturating at zero for negative or non-finite input.
    pub fn secs_to_frames_round(self, secs: f64) -> u64 {
        let frames = secs * self.as_f64();
        if !frames.is_finite() || frames <= 0.0 {
            return 0;
        }
        frames.round() as u64
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8Premul {
    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Premultiply a straight-alpha RGBA8 buffer in place.
pub fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

/// Inverse of [`premultiply_rgba8_in_place`], used when handing pixels to image encoders.
pub fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u32;
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u32::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
