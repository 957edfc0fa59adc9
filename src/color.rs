//! Straight-alpha RGBA colors and the literal forms accepted in config files.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// Realistic firework colors based on chemical compounds
const PALETTE: [(u8, u8, u8); 10] = [
    (255, 30, 30),   // Strontium (intense red)
    (220, 50, 50),   // Lithium (medium red)
    (255, 140, 0),   // Calcium (orange)
    (255, 220, 0),   // Sodium (yellow)
    (0, 255, 100),   // Barium (green)
    (60, 120, 255),  // Copper halides (blue)
    (100, 100, 255), // Caesium (indigo)
    (180, 50, 255),  // Potassium/Rubidium (violet)
    (255, 200, 50),  // Charcoal/Iron (gold)
    (255, 255, 255), // Titanium/Magnesium (white)
];

/// Alpha of the halo color every particle derives from its base color.
pub const SHADOW_ALPHA: f32 = 0.1;

/// An RGBA color with straight (non-premultiplied) channels in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgba8(r, g, b, 1.0)
    }

    pub fn rgba8(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a: a.clamp(0.0, 1.0),
        }
    }

    /// Hue in degrees, saturation and lightness in `0.0..=1.0`.
    pub fn hsla(hue: f32, saturation: f32, lightness: f32, alpha: f32) -> Self {
        let h = hue.rem_euclid(360.0) / 60.0;
        let s = saturation.clamp(0.0, 1.0);
        let l = lightness.clamp(0.0, 1.0);

        let chroma = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let x = chroma * (1.0 - (h % 2.0 - 1.0).abs());
        let (r, g, b) = match h as u32 {
            0 => (chroma, x, 0.0),
            1 => (x, chroma, 0.0),
            2 => (0.0, chroma, x),
            3 => (0.0, x, chroma),
            4 => (x, 0.0, chroma),
            _ => (chroma, 0.0, x),
        };
        let m = l - chroma / 2.0;
        Self::rgba(r + m, g + m, b + m, alpha.clamp(0.0, 1.0))
    }

    /// Same hue, different opacity. Used to derive the translucent particle halo.
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            a: alpha.clamp(0.0, 1.0),
            ..self
        }
    }

    pub fn premultiplied(self) -> [f32; 4] {
        [self.r * self.a, self.g * self.a, self.b * self.a, self.a]
    }

    pub fn to_rgb8(self) -> (u8, u8, u8) {
        (
            (self.r.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.g.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.b.clamp(0.0, 1.0) * 255.0).round() as u8,
        )
    }
}

pub fn default_palette() -> Vec<Color> {
    PALETTE.iter().map(|&(r, g, b)| Color::rgb8(r, g, b)).collect()
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !matches!(hex.len(), 6 | 8) || !hex.is_ascii() {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    let a = if hex.len() == 8 {
        u8::from_str_radix(&hex[6..8], 16).ok()? as f32 / 255.0
    } else {
        1.0
    };

    Some(Color::rgba8(r, g, b, a))
}

fn parse_functional(name: &str, args: &str) -> Option<Color> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    let number = |s: &str| s.trim_end_matches('%').trim().parse::<f32>().ok();
    let alpha = match (name, parts.len()) {
        ("rgb" | "hsl", 3) => 1.0,
        ("rgba" | "hsla", 4) => number(parts[3])?,
        _ => return None,
    };

    match name {
        "rgb" | "rgba" => {
            let channel = |s: &str| number(s).map(|v| v.clamp(0.0, 255.0) as u8);
            Some(Color::rgba8(
                channel(parts[0])?,
                channel(parts[1])?,
                channel(parts[2])?,
                alpha,
            ))
        }
        _ => Some(Color::hsla(
            number(parts[0])?,
            number(parts[1])? / 100.0,
            number(parts[2])? / 100.0,
            alpha,
        )),
    }
}

impl FromStr for Color {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let literal = s.trim();
        let parsed = if let Some(open) = literal.find('(') {
            literal
                .strip_suffix(')')
                .and_then(|body| parse_functional(literal[..open].trim(), &body[open + 1..]))
        } else {
            parse_hex(literal.trim_start_matches('#'))
        };
        parsed.ok_or_else(|| Error::InvalidColor(s.to_string()))
    }
}

impl TryFrom<String> for Color {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (r, g, b) = self.to_rgb8();
        write!(f, "#{r:02x}{g:02x}{b:02x}")?;
        if self.a < 1.0 {
            write!(f, "{:02x}", (self.a * 255.0).round() as u8)?;
        }
        Ok(())
    }
}
