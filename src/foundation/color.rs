use crate::foundation::{
    core::Rgba8Premul,
    error::{FramefxError, FramefxResult},
};

/// Straight-alpha color parsed from a CSS-ish color string.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColorRgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl ColorRgba8 {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn to_premul(self) -> Rgba8Premul {
        Rgba8Premul::from_straight_rgba(self.r, self.g, self.b, self.a)
    }

    /// Parse `#rgb`, `#rrggbb`, `#rrggbbaa` (leading `#` optional) or a basic CSS color name.
    pub fn parse(s: &str) -> FramefxResult<Self> {
        let s = s.trim();
        if let Some(named) = named_color(&s.to_ascii_lowercase()) {
            return Ok(named);
        }
        parse_hex(s).map_err(FramefxError::validation)
    }
}

fn parse_hex(s: &str) -> Result<ColorRgba8, String> {
    let hex = s.strip_prefix('#').unwrap_or(s);
    if !hex.is_ascii() {
        return Err(format!("invalid color \"{s}\""));
    }

    fn hex_byte(pair: &str) -> Result<u8, String> {
        u8::from_str_radix(pair, 16).map_err(|_| format!("invalid hex byte \"{pair}\""))
    }

    fn hex_nibble(c: &str) -> Result<u8, String> {
        let v = u8::from_str_radix(c, 16).map_err(|_| format!("invalid hex digit \"{c}\""))?;
        Ok(v * 17)
    }

    let (r, g, b, a) = match hex.len() {
        3 => (
            hex_nibble(&hex[0..1])?,
            hex_nibble(&hex[1..2])?,
            hex_nibble(&hex[2..3])?,
            255,
        ),
        6 => (
            hex_byte(&hex[0..2])?,
            hex_byte(&hex[2..4])?,
            hex_byte(&hex[4..6])?,
            255,
        ),
        8 => (
            hex_byte(&hex[0..2])?,
            hex_byte(&hex[2..4])?,
            hex_byte(&hex[4..6])?,
            hex_byte(&hex[6..8])?,
        ),
        _ => {
            return Err(format!(
                "color \"{s}\" must be #RGB, #RRGGBB, #RRGGBBAA or a named color"
            ));
        }
    };

    Ok(ColorRgba8 { r, g, b, a })
}

fn named_color(name: &str) -> Option<ColorRgba8> {
    let c = match name {
        "black" => ColorRgba8::rgb(0, 0, 0),
        "white" => ColorRgba8::rgb(255, 255, 255),
        "red" => ColorRgba8::rgb(255, 0, 0),
        "green" => ColorRgba8::rgb(0, 128, 0),
        "lime" => ColorRgba8::rgb(0, 255, 0),
        "blue" => ColorRgba8::rgb(0, 0, 255),
        "yellow" => ColorRgba8::rgb(255, 255, 0),
        "cyan" | "aqua" => ColorRgba8::rgb(0, 255, 255),
        "magenta" | "fuchsia" => ColorRgba8::rgb(255, 0, 255),
        "orange" => ColorRgba8::rgb(255, 165, 0),
        "purple" => ColorRgba8::rgb(128, 0, 128),
        "pink" => ColorRgba8::rgb(255, 192, 203),
        "gray" | "grey" => ColorRgba8::rgb(128, 128, 128),
        "transparent" => ColorRgba8 {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        },
        _ => return None,
    };
    Some(c)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/color.rs"]
mod tests;
