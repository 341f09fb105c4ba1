//! sRGB color math used by the classifier and synthesizer.
//!
//! Colors are parsed into an [`Rgb`] triple of 8-bit channels. From there the
//! module derives the descriptors the theme heuristics work with:
//!
//! | Descriptor | Range | Notes |
//! |------------|-------|-------|
//! | [`Rgb::brightness`] | 0–255 | weighted luma `0.299R + 0.587G + 0.114B` |
//! | [`Rgb::saturation`] | 0–1 | HSL saturation, 0 when achromatic |
//! | [`Rgb::hue`] | 0–360 | HSL hue in degrees, 0 when achromatic |
//! | [`Rgb::to_oklch`] | — | approximate perceptual encoding, see below |
//!
//! # The `oklch()` approximation
//!
//! [`Rgb::to_oklch`] goes sRGB → linear RGB → CIE XYZ (D65) → CIE Lab and then
//! *reinterprets* Lab as an OKLCH-style triple: `L = Lab.L / 100`,
//! `C = sqrt(a² + b²) / 150`, `H = atan2(b, a)`. This is not OKLab. The preset
//! themes that consume these strings are calibrated against exactly this
//! arithmetic, so it must stay as is.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

/// Colors with HSL saturation below this are treated as neutral (greys,
/// off-whites, near-blacks) and never chosen as an accent.
pub const NEUTRAL_SATURATION: f64 = 0.15;

/// D65 reference white used by the XYZ → Lab step.
const WHITE_X: f64 = 0.95047;
const WHITE_Y: f64 = 1.0;
const WHITE_Z: f64 = 1.08883;

/// Lab `f(t)` switches from the cube root to its linear segment below this.
const LAB_EPSILON: f64 = 0.008856;

/// Divisor mapping Lab chroma onto the 0–0.4 range used by `oklch()` tokens.
const CHROMA_SCALE: f64 = 150.0;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorError {
    #[error("invalid color: {0:?}")]
    InvalidColor(String),
}

/// An opaque sRGB color with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#rgb` or `#rrggbb` (the `#` is optional, digits are
    /// case-insensitive). Shorthand is expanded by doubling each digit.
    pub fn from_hex(input: &str) -> Result<Self, ColorError> {
        let invalid = || ColorError::InvalidColor(input.to_string());
        let digits = input.trim().strip_prefix('#').unwrap_or(input.trim());
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let expanded = match digits.len() {
            3 => expand_shorthand(digits),
            6 => digits.to_string(),
            _ => return Err(invalid()),
        };
        let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).map_err(|_| invalid());
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Builds a color from the integer channels of `rgb()` notation. Values
    /// above 255 are clamped.
    pub fn from_rgb_channels(r: u32, g: u32, b: u32) -> Self {
        let clamp = |c: u32| c.min(255) as u8;
        Self::new(clamp(r), clamp(g), clamp(b))
    }

    /// Lowercase `#rrggbb`.
    pub fn to_hex(&self) -> String {
        self.to_string()
    }

    fn unit_channels(&self) -> (f64, f64, f64) {
        (
            f64::from(self.r) / 255.0,
            f64::from(self.g) / 255.0,
            f64::from(self.b) / 255.0,
        )
    }

    /// Weighted luma over the 8-bit channels, in `[0, 255]`.
    pub fn brightness(&self) -> f64 {
        let weighted = u32::from(self.r) * 299 + u32::from(self.g) * 587 + u32::from(self.b) * 114;
        f64::from(weighted) / 1000.0
    }

    /// HSL saturation in `[0, 1]`.
    pub fn saturation(&self) -> f64 {
        let (r, g, b) = self.unit_channels();
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        if max == min {
            return 0.0;
        }
        let d = max - min;
        let l = (max + min) / 2.0;
        if l > 0.5 {
            d / (2.0 - max - min)
        } else {
            d / (max + min)
        }
    }

    /// HSL hue in degrees, `[0, 360)`. Achromatic colors report 0.
    pub fn hue(&self) -> f64 {
        let (r, g, b) = self.unit_channels();
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        if max == min {
            return 0.0;
        }
        let d = max - min;
        let sector = if max == r {
            ((g - b) / d).rem_euclid(6.0)
        } else if max == g {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        };
        (sector * 60.0).rem_euclid(360.0)
    }

    pub fn is_neutral(&self) -> bool {
        self.saturation() < NEUTRAL_SATURATION
    }

    /// Approximate perceptual encoding, see the module docs.
    pub fn to_oklch(&self) -> Oklch {
        let (r, g, b) = self.unit_channels();
        let (lr, lg, lb) = (srgb_to_linear(r), srgb_to_linear(g), srgb_to_linear(b));

        let x = 0.4124564 * lr + 0.3575761 * lg + 0.1804375 * lb;
        let y = 0.2126729 * lr + 0.7151522 * lg + 0.0721750 * lb;
        let z = 0.0193339 * lr + 0.1191920 * lg + 0.9503041 * lb;

        let fx = lab_f(x / WHITE_X);
        let fy = lab_f(y / WHITE_Y);
        let fz = lab_f(z / WHITE_Z);

        let lab_l = 116.0 * fy - 16.0;
        let lab_a = 500.0 * (fx - fy);
        let lab_b = 200.0 * (fy - fz);

        Oklch {
            l: (lab_l / 100.0).clamp(0.0, 1.0),
            c: (lab_a * lab_a + lab_b * lab_b).sqrt() / CHROMA_SCALE,
            h: lab_b.atan2(lab_a).to_degrees().rem_euclid(360.0),
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Lightness / chroma / hue triple produced by [`Rgb::to_oklch`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Oklch {
    pub l: f64,
    pub c: f64,
    pub h: f64,
}

impl fmt::Display for Oklch {
    /// `oklch(<L 2dp> <C 2dp> <H integer>)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 359.6 rounds to 360, which is the same angle as 0.
        let hue = (self.h.round() as u32) % 360;
        write!(f, "oklch({:.2} {:.2} {})", self.l, self.c, hue)
    }
}

fn srgb_to_linear(c: f64) -> f64 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn lab_f(t: f64) -> f64 {
    if t > LAB_EPSILON {
        t.cbrt()
    } else {
        7.787 * t + 16.0 / 116.0
    }
}

/// Doubles each digit of a 3-digit hex body: `"f60"` → `"ff6600"`.
pub fn expand_shorthand(digits: &str) -> String {
    digits.chars().flat_map(|c| [c, c]).collect()
}

/// Normalizes any accepted hex spelling to lowercase `#rrggbb`.
pub fn normalize(hex: &str) -> Result<String, ColorError> {
    Rgb::from_hex(hex).map(|c| c.to_hex())
}

pub fn brightness(hex: &str) -> Result<f64, ColorError> {
    Ok(Rgb::from_hex(hex)?.brightness())
}

pub fn saturation(hex: &str) -> Result<f64, ColorError> {
    Ok(Rgb::from_hex(hex)?.saturation())
}

pub fn hue(hex: &str) -> Result<f64, ColorError> {
    Ok(Rgb::from_hex(hex)?.hue())
}

pub fn is_neutral(hex: &str) -> Result<bool, ColorError> {
    Ok(Rgb::from_hex(hex)?.is_neutral())
}

/// Formatted `oklch(L C H)` string for a hex color.
pub fn to_oklch(hex: &str) -> Result<String, ColorError> {
    Ok(Rgb::from_hex(hex)?.to_oklch().to_string())
}
