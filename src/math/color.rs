//! RGB color with float channels.
//!
//! Channels are nominally in `[0, 1]`; conversion to bytes clamps. Colors can be
//! built from a packed `0xRRGGBB` integer, from floats, or parsed from CSS-style
//! strings (`#rgb`, `#rrggbb`, `rgb(...)`, `rgba(...)`, a few names).

use std::str::FromStr;

use approx::{AbsDiffEq, RelativeEq};

use crate::error::RenderError;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

const NAMED: [(&str, u32); 12] = [
    ("black", 0x000000),
    ("white", 0xffffff),
    ("red", 0xff0000),
    ("green", 0x008000),
    ("lime", 0x00ff00),
    ("blue", 0x0000ff),
    ("yellow", 0xffff00),
    ("cyan", 0x00ffff),
    ("magenta", 0xff00ff),
    ("gray", 0x808080),
    ("grey", 0x808080),
    ("orange", 0xffa500),
];

impl Color {
    pub const BLACK: Self = Self::from_rgb(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::from_rgb(1.0, 1.0, 1.0);

    pub const fn from_rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// From a packed `0xRRGGBB` value; higher bits are ignored.
    pub fn from_hex(hex: u32) -> Self {
        Self::from_rgb(
            ((hex >> 16) & 0xff) as f32 / 255.0,
            ((hex >> 8) & 0xff) as f32 / 255.0,
            (hex & 0xff) as f32 / 255.0,
        )
    }

    pub fn from_rgba8(rgba: [u8; 4]) -> Self {
        Self::from_rgb(
            rgba[0] as f32 / 255.0,
            rgba[1] as f32 / 255.0,
            rgba[2] as f32 / 255.0,
        )
    }

    pub fn set(&mut self, r: f32, g: f32, b: f32) -> &mut Self {
        self.r = r;
        self.g = g;
        self.b = b;
        self
    }

    /// Packed `0xRRGGBB`.
    pub fn hex(&self) -> u32 {
        let [r, g, b, _] = self.to_rgba8();
        (r as u32) << 16 | (g as u32) << 8 | b as u32
    }

    /// Opaque RGBA bytes, channels clamped to `[0, 1]` and rounded.
    pub fn to_rgba8(&self) -> [u8; 4] {
        let to_byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [to_byte(self.r), to_byte(self.g), to_byte(self.b), 255]
    }

    pub fn multiply_scalar(&mut self, s: f32) -> &mut Self {
        self.r *= s;
        self.g *= s;
        self.b *= s;
        self
    }

    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self::from_rgb(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
        )
    }
}

impl From<u32> for Color {
    fn from(hex: u32) -> Self {
        Self::from_hex(hex)
    }
}

/// Parses one `rgb()` channel: `0..=255` or a percentage.
fn parse_channel(raw: &str, input: &str) -> Result<f32, RenderError> {
    let invalid = || RenderError::InvalidColor(input.to_string());
    let raw = raw.trim();
    let value = if let Some(percent) = raw.strip_suffix('%') {
        percent.trim().parse::<f32>().map_err(|_| invalid())? / 100.0
    } else {
        raw.parse::<f32>().map_err(|_| invalid())? / 255.0
    };
    if !value.is_finite() {
        return Err(invalid());
    }
    Ok(value.clamp(0.0, 1.0))
}

fn parse_hex_digits(digits: &str, input: &str) -> Result<Color, RenderError> {
    let invalid = || RenderError::InvalidColor(input.to_string());
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    let expanded = match digits.len() {
        3 => digits.chars().flat_map(|c| [c, c]).collect::<String>(),
        6 => digits.to_string(),
        _ => return Err(invalid()),
    };
    let hex = u32::from_str_radix(&expanded, 16).map_err(|_| invalid())?;
    Ok(Color::from_hex(hex))
}

impl FromStr for Color {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        let lower = input.to_ascii_lowercase();

        if let Some(digits) = lower.strip_prefix('#') {
            return parse_hex_digits(digits, s);
        }

        let functional = lower
            .strip_prefix("rgba(")
            .map(|rest| (rest, 4))
            .or_else(|| lower.strip_prefix("rgb(").map(|rest| (rest, 3)));

        if let Some((rest, arity)) = functional {
            let body = rest
                .strip_suffix(')')
                .ok_or_else(|| RenderError::InvalidColor(s.to_string()))?;
            let parts: Vec<&str> = body.split(',').collect();
            if parts.len() != arity {
                return Err(RenderError::InvalidColor(s.to_string()));
            }
            // Alpha is validated but not stored.
            if arity == 4 {
                parts[3]
                    .trim()
                    .parse::<f32>()
                    .map_err(|_| RenderError::InvalidColor(s.to_string()))?;
            }
            return Ok(Color::from_rgb(
                parse_channel(parts[0], s)?,
                parse_channel(parts[1], s)?,
                parse_channel(parts[2], s)?,
            ));
        }

        NAMED
            .iter()
            .find(|(name, _)| *name == lower)
            .map(|(_, hex)| Color::from_hex(*hex))
            .ok_or_else(|| RenderError::InvalidColor(s.to_string()))
    }
}

impl AbsDiffEq for Color {
    type Epsilon = f32;

    fn default_epsilon() -> f32 {
        f32::EPSILON
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.r.abs_diff_eq(&other.r, epsilon)
            && self.g.abs_diff_eq(&other.g, epsilon)
            && self.b.abs_diff_eq(&other.b, epsilon)
    }
}

impl RelativeEq for Color {
    fn default_max_relative() -> f32 {
        f32::EPSILON
    }

    fn relative_eq(&self, other: &Self, epsilon: f32, max_relative: f32) -> bool {
        self.r.relative_eq(&other.r, epsilon, max_relative)
            && self.g.relative_eq(&other.g, epsilon, max_relative)
            && self.b.relative_eq(&other.b, epsilon, max_relative)
    }
}
