use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PageError, PageResult};

/// RGBA color in normalized 0..=1 channel values.
///
/// Serialized as CSS hex notation: `#RRGGBB` when opaque, `#RRGGBBAA`
/// otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

impl Color {
    #[must_use]
    pub const fn rgba(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    #[must_use]
    pub const fn rgb(red: f64, green: f64, blue: f64) -> Self {
        Self::rgba(red, green, blue, 1.0)
    }

    /// Builds a color from 8-bit channels.
    #[must_use]
    pub fn from_rgba8(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self::rgba(
            f64::from(red) / 255.0,
            f64::from(green) / 255.0,
            f64::from(blue) / 255.0,
            f64::from(alpha) / 255.0,
        )
    }

    /// Same hue with a replaced alpha given as an 8-bit value, the way CSS
    /// appends a two-digit alpha to a six-digit hex color.
    #[must_use]
    pub fn with_alpha8(self, alpha: u8) -> Self {
        Self {
            alpha: f64::from(alpha) / 255.0,
            ..self
        }
    }

    pub fn validate(self) -> PageResult<()> {
        for (channel, value) in [
            ("red", self.red),
            ("green", self.green),
            ("blue", self.blue),
            ("alpha", self.alpha),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(PageError::InvalidColor(format!(
                    "color channel `{channel}` must be finite and in [0, 1]"
                )));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn to_rgba8(self) -> [u8; 4] {
        let quantize = |value: f64| (value.clamp(0.0, 1.0) * 255.0).round() as u8;
        [
            quantize(self.red),
            quantize(self.green),
            quantize(self.blue),
            quantize(self.alpha),
        ]
    }

    /// CSS hex notation.
    #[must_use]
    pub fn to_css(self) -> String {
        let [r, g, b, a] = self.to_rgba8();
        if a == u8::MAX {
            format!("#{r:02X}{g:02X}{b:02X}")
        } else {
            format!("#{r:02X}{g:02X}{b:02X}{a:02X}")
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

impl FromStr for Color {
    type Err = PageError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        let hex = trimmed
            .strip_prefix('#')
            .ok_or_else(|| PageError::InvalidColor(format!("`{trimmed}` must start with `#`")))?;
        if !hex.is_ascii() || !matches!(hex.len(), 6 | 8) {
            return Err(PageError::InvalidColor(format!(
                "`{trimmed}` must have 6 or 8 hex digits"
            )));
        }

        let channel = |offset: usize| {
            u8::from_str_radix(&hex[offset..offset + 2], 16)
                .map_err(|_| PageError::InvalidColor(format!("`{trimmed}` is not hexadecimal")))
        };
        let alpha = if hex.len() == 8 { channel(6)? } else { u8::MAX };
        Ok(Self::from_rgba8(channel(0)?, channel(2)?, channel(4)?, alpha))
    }
}

impl TryFrom<String> for Color {
    type Error = PageError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_css()
    }
}

/// Semantic color names used across the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Swatch {
    PureWhite,
    LightGray,
    MediumLightGray,
    MediumGray,
    DarkGray,
    Charcoal,
    NearBlack,
    BlueAccent,
    LightBlue,
}

impl Swatch {
    pub const ALL: [Swatch; 9] = [
        Swatch::PureWhite,
        Swatch::LightGray,
        Swatch::MediumLightGray,
        Swatch::MediumGray,
        Swatch::DarkGray,
        Swatch::Charcoal,
        Swatch::NearBlack,
        Swatch::BlueAccent,
        Swatch::LightBlue,
    ];
}

/// Named palette. Every swatch is always present, so lookups are total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    pub pure_white: Color,
    pub light_gray: Color,
    pub medium_light_gray: Color,
    pub medium_gray: Color,
    pub dark_gray: Color,
    pub charcoal: Color,
    pub near_black: Color,
    pub blue_accent: Color,
    pub light_blue: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            pure_white: Color::from_rgba8(0xFF, 0xFF, 0xFF, 0xFF),
            light_gray: Color::from_rgba8(0xF8, 0xF9, 0xFA, 0xFF),
            medium_light_gray: Color::from_rgba8(0xE9, 0xEC, 0xEF, 0xFF),
            medium_gray: Color::from_rgba8(0x6C, 0x75, 0x7D, 0xFF),
            dark_gray: Color::from_rgba8(0x49, 0x50, 0x57, 0xFF),
            charcoal: Color::from_rgba8(0x34, 0x3A, 0x40, 0xFF),
            near_black: Color::from_rgba8(0x21, 0x25, 0x29, 0xFF),
            blue_accent: Color::from_rgba8(0x00, 0x66, 0xCC, 0xFF),
            light_blue: Color::from_rgba8(0xE3, 0xF2, 0xFD, 0xFF),
        }
    }
}

impl Palette {
    #[must_use]
    pub fn get(&self, swatch: Swatch) -> Color {
        match swatch {
            Swatch::PureWhite => self.pure_white,
            Swatch::LightGray => self.light_gray,
            Swatch::MediumLightGray => self.medium_light_gray,
            Swatch::MediumGray => self.medium_gray,
            Swatch::DarkGray => self.dark_gray,
            Swatch::Charcoal => self.charcoal,
            Swatch::NearBlack => self.near_black,
            Swatch::BlueAccent => self.blue_accent,
            Swatch::LightBlue => self.light_blue,
        }
    }

    /// Assigns one color per position by cycling through `cycle`.
    ///
    /// Position `i` receives `cycle[i % cycle.len()]`. An empty cycle cannot
    /// color anything and is rejected.
    pub fn cycle(&self, cycle: &[Swatch], count: usize) -> PageResult<Vec<Color>> {
        if cycle.is_empty() {
            return Err(PageError::InvalidContent(
                "color cycle must name at least one swatch".to_owned(),
            ));
        }
        Ok((0..count)
            .map(|index| self.get(cycle[index % cycle.len()]))
            .collect())
    }

    pub fn validate(&self) -> PageResult<()> {
        for swatch in Swatch::ALL {
            self.get(swatch).validate()?;
        }
        Ok(())
    }
}
