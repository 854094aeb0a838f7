//! RGBA tint color with components in [0, 1].

use serde::{Deserialize, Serialize};

use crate::error::LoadError;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl Color {
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_array(c: [f32; 4]) -> Self {
        Self::new(c[0], c[1], c[2], c[3])
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Parse an `rrggbbaa` hex string as exported by the authoring tool.
    pub fn from_hex(s: &str) -> Result<Self, LoadError> {
        if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(LoadError::InvalidColor(s.to_string()));
        }
        let channel = |i: usize| -> Result<f32, LoadError> {
            u8::from_str_radix(&s[i * 2..i * 2 + 2], 16)
                .map(|v| v as f32 / 255.0)
                .map_err(|_| LoadError::InvalidColor(s.to_string()))
        };
        Ok(Self::new(channel(0)?, channel(1)?, channel(2)?, channel(3)?))
    }

    /// Component-wise product (tinting).
    pub fn tint(self, other: Color) -> Color {
        Color::new(
            self.r * other.r,
            self.g * other.g,
            self.b * other.b,
            self.a * other.a,
        )
    }
}
