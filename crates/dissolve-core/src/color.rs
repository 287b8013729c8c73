//! RGB colors parsed from CSS-style strings.

use std::fmt;
use std::str::FromStr;

use glam::Vec3;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::DissolveError;

/// CSS named colors accepted by [`Rgb::from_str`], as 0xRRGGBB.
const NAMED_COLORS: &[(&str, u32)] = &[
    ("black", 0x00_0000),
    ("white", 0xff_ffff),
    ("red", 0xff_0000),
    ("lime", 0x00_ff00),
    ("green", 0x00_8000),
    ("blue", 0x00_00ff),
    ("yellow", 0xff_ff00),
    ("cyan", 0x00_ffff),
    ("aqua", 0x00_ffff),
    ("magenta", 0xff_00ff),
    ("fuchsia", 0xff_00ff),
    ("silver", 0xc0_c0c0),
    ("gray", 0x80_8080),
    ("grey", 0x80_8080),
    ("maroon", 0x80_0000),
    ("olive", 0x80_8000),
    ("purple", 0x80_0080),
    ("teal", 0x00_8080),
    ("navy", 0x00_0080),
    ("orange", 0xff_a500),
    ("pink", 0xff_c0cb),
    ("hotpink", 0xff_69b4),
    ("deeppink", 0xff_1493),
    ("violet", 0xee_82ee),
    ("indigo", 0x4b_0082),
    ("gold", 0xff_d700),
    ("coral", 0xff_7f50),
    ("crimson", 0xdc_143c),
    ("turquoise", 0x40_e0d0),
    ("skyblue", 0x87_ceeb),
];

/// An RGB color with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rgb(pub Vec3);

impl Rgb {
    pub const BLACK: Self = Self(Vec3::ZERO);
    pub const WHITE: Self = Self(Vec3::ONE);

    /// Creates a color from float components.
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self(Vec3::new(r, g, b))
    }

    /// Creates a color from a packed 0xRRGGBB value.
    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| ((hex >> shift) & 0xff) as f32 / 255.0;
        Self::new(channel(16), channel(8), channel(0))
    }

    /// Packs the color into 0xRRGGBB, rounding each channel.
    pub fn to_hex(self) -> u32 {
        let c = (self.0.clamp(Vec3::ZERO, Vec3::ONE) * 255.0).round();
        ((c.x as u32) << 16) | ((c.y as u32) << 8) | c.z as u32
    }

    /// Returns the components as a vector.
    pub fn to_vec3(self) -> Vec3 {
        self.0
    }

    /// Returns `[r, g, b]`.
    pub fn to_array(self) -> [f32; 3] {
        self.0.to_array()
    }
}

impl From<Vec3> for Rgb {
    fn from(v: Vec3) -> Self {
        Self(v)
    }
}

impl From<Rgb> for Vec3 {
    fn from(c: Rgb) -> Self {
        c.0
    }
}

impl FromStr for Rgb {
    type Err = DissolveError;

    /// Parses `#rgb`, `#rrggbb`, or a CSS color name (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || DissolveError::InvalidColor(s.to_string());

        if let Some(hex) = trimmed.strip_prefix('#') {
            if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(invalid());
            }
            let value = u32::from_str_radix(hex, 16).map_err(|_| invalid())?;
            return match hex.len() {
                6 => Ok(Self::from_hex(value)),
                3 => {
                    let (r, g, b) = ((value >> 8) & 0xf, (value >> 4) & 0xf, value & 0xf);
                    Ok(Self::from_hex((r * 0x11) << 16 | (g * 0x11) << 8 | b * 0x11))
                }
                _ => Err(invalid()),
            };
        }

        let name = trimmed.to_ascii_lowercase();
        NAMED_COLORS
            .iter()
            .find(|(n, _)| *n == name)
            .map(|&(_, hex)| Self::from_hex(hex))
            .ok_or_else(invalid)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.to_hex())
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
