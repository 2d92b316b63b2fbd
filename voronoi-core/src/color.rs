//! Packed colors and the packed-coordinate encoding.

use crate::{Point, Result, VoronoiError};

/// RGB color tuple
pub type Rgb = [u8; 3];

/// Display color packed as `0xAABBGGRR`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Color(pub u32);

impl Color {
    pub const WHITE: Color = Color(0xFFFFFFFF);
    pub const BLACK: Color = Color(0xFF000000);
    pub const MAGENTA: Color = Color(0xFFFF00FF);
    pub const RED: Color = Color(0xFF0000FF);
    pub const GREEN: Color = Color(0xFF00FF00);
    pub const BLUE: Color = Color(0xFFFF0000);
    pub const BACKGROUND: Color = Color(0xFF181818);

    pub const fn from_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self((a as u32) << 24 | (b as u32) << 16 | (g as u32) << 8 | r as u32)
    }

    pub const fn r(self) -> u8 {
        self.0 as u8
    }

    pub const fn g(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn b(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn a(self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Drops the alpha channel.
    pub const fn to_rgb(self) -> Rgb {
        [self.r(), self.g(), self.b()]
    }
}

/// A point small enough to round-trip through a 32-bit color value:
/// `x` in the low 16 bits, `y` in the high 16 bits.
///
/// Kept separate from [`Color`] so a coordinate is never mistaken for a
/// display color. Use [`PackedPoint::to_color`] only where a buffer holds
/// nothing but packed coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PackedPoint {
    pub x: u16,
    pub y: u16,
}

impl PackedPoint {
    /// Exclusive upper bound for either coordinate (`u16::MAX` itself is rejected).
    pub const LIMIT: i32 = u16::MAX as i32;

    pub fn from_point(p: Point) -> Result<Self> {
        let in_range = |v: i32| (0..Self::LIMIT).contains(&v);
        if !in_range(p.x) || !in_range(p.y) {
            return Err(VoronoiError::Range { x: p.x, y: p.y });
        }
        Ok(Self {
            x: p.x as u16,
            y: p.y as u16,
        })
    }

    pub fn to_point(self) -> Point {
        Point::new(self.x as i32, self.y as i32)
    }

    pub const fn from_bits(bits: u32) -> Self {
        Self {
            x: (bits & 0x0000FFFF) as u16,
            y: (bits >> 16) as u16,
        }
    }

    pub const fn to_bits(self) -> u32 {
        (self.y as u32) << 16 | self.x as u32
    }

    /// Decodes any color value; every 32-bit pattern is a valid packed point.
    pub const fn from_color(c: Color) -> Self {
        Self::from_bits(c.0)
    }

    pub const fn to_color(self) -> Color {
        Color(self.to_bits())
    }
}

/// Named colors for the default nine-cell palette.
pub mod palette {
    use super::Color;

    pub const WILD_STRAWBERRY: Color = Color(0xFF943DFF);
    pub const MEDIUM_RED_VIOLET: Color = Color(0xFF7E30B5);
    pub const DAISY_BUSH: Color = Color(0xFF982A6A);
    pub const METEORITE: Color = Color(0xFF6D1C3F);
    pub const VIOLET: Color = Color(0xFF4B0B21);
    pub const SAFFRON_MANGO: Color = Color(0xFF4EC5F9);
    pub const PERSIAN_GREEN: Color = Color(0xFFA1B300);
    pub const TEAL: Color = Color(0xFF807F00);
    pub const ORIENT: Color = Color(0xFF805B00);

    pub const CYBERPUNK: [Color; 9] = [
        WILD_STRAWBERRY,
        MEDIUM_RED_VIOLET,
        DAISY_BUSH,
        METEORITE,
        VIOLET,
        SAFFRON_MANGO,
        PERSIAN_GREEN,
        TEAL,
        ORIENT,
    ];
}
