use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::PageError;
use crate::host::{Rect, ViewportMetrics};

/// One side of a root margin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MarginLength {
    Px(f64),
    /// Percentage of the viewport dimension along the same axis.
    Percent(f64),
}

impl MarginLength {
    #[must_use]
    pub fn resolve(self, axis_length: f64) -> f64 {
        match self {
            Self::Px(px) => px,
            Self::Percent(percent) => axis_length * percent / 100.0,
        }
    }
}

impl fmt::Display for MarginLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Px(px) => write!(f, "{px}px"),
            Self::Percent(percent) => write!(f, "{percent}%"),
        }
    }
}

impl FromStr for MarginLength {
    type Err = PageError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let parse = |number: &str| {
            number
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .ok_or_else(|| PageError::InvalidMargin(format!("`{input}` is not a length")))
        };
        if let Some(number) = input.strip_suffix("px") {
            return Ok(Self::Px(parse(number)?));
        }
        if let Some(number) = input.strip_suffix('%') {
            return Ok(Self::Percent(parse(number)?));
        }
        // CSS allows a bare zero.
        if parse(input)? == 0.0 {
            return Ok(Self::Px(0.0));
        }
        Err(PageError::InvalidMargin(format!(
            "`{input}` needs a `px` or `%` unit"
        )))
    }
}

/// Grows (positive) or shrinks (negative) the viewport before visibility is
/// measured, with CSS `margin` shorthand semantics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RootMargin {
    pub top: MarginLength,
    pub right: MarginLength,
    pub bottom: MarginLength,
    pub left: MarginLength,
}

impl Default for RootMargin {
    fn default() -> Self {
        Self::uniform(MarginLength::Px(0.0))
    }
}

impl RootMargin {
    #[must_use]
    pub const fn uniform(length: MarginLength) -> Self {
        Self {
            top: length,
            right: length,
            bottom: length,
            left: length,
        }
    }

    /// Applies the margin to the viewport's client rectangle.
    #[must_use]
    pub fn apply(self, viewport: ViewportMetrics) -> Rect {
        let top = self.top.resolve(viewport.height);
        let right = self.right.resolve(viewport.width);
        let bottom = self.bottom.resolve(viewport.height);
        let left = self.left.resolve(viewport.width);
        Rect::new(
            -left,
            -top,
            viewport.width + left + right,
            viewport.height + top + bottom,
        )
    }
}

impl fmt::Display for RootMargin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.top, self.right, self.bottom, self.left)
    }
}

impl FromStr for RootMargin {
    type Err = PageError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let values = input
            .split_whitespace()
            .map(str::parse::<MarginLength>)
            .collect::<Result<SmallVec<[MarginLength; 4]>, _>>()?;
        match values.as_slice() {
            [all] => Ok(Self::uniform(*all)),
            [vertical, horizontal] => Ok(Self {
                top: *vertical,
                right: *horizontal,
                bottom: *vertical,
                left: *horizontal,
            }),
            [top, horizontal, bottom] => Ok(Self {
                top: *top,
                right: *horizontal,
                bottom: *bottom,
                left: *horizontal,
            }),
            [top, right, bottom, left] => Ok(Self {
                top: *top,
                right: *right,
                bottom: *bottom,
                left: *left,
            }),
            _ => Err(PageError::InvalidMargin(format!(
                "`{input}` must have between one and four lengths"
            ))),
        }
    }
}

impl TryFrom<String> for RootMargin {
    type Error = PageError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RootMargin> for String {
    fn from(margin: RootMargin) -> Self {
        margin.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_css_shorthand() {
        let margin: RootMargin = "-80px 0px -50% 0px".parse().expect("valid margin");
        assert_eq!(margin.top, MarginLength::Px(-80.0));
        assert_eq!(margin.bottom, MarginLength::Percent(-50.0));

        let pair: RootMargin = "10px 5%".parse().expect("valid margin");
        assert_eq!(pair.left, MarginLength::Percent(5.0));
        assert_eq!(pair.bottom, MarginLength::Px(10.0));

        assert_eq!("0".parse::<RootMargin>().expect("bare zero"), RootMargin::default());
    }

    #[test]
    fn rejects_bad_lengths() {
        assert!("".parse::<RootMargin>().is_err());
        assert!("10".parse::<RootMargin>().is_err());
        assert!("1px 2px 3px 4px 5px".parse::<RootMargin>().is_err());
        assert!("wide".parse::<RootMargin>().is_err());
    }

    #[test]
    fn negative_margin_shrinks_the_root() {
        let margin: RootMargin = "-80px 0px -50% 0px".parse().expect("valid margin");
        let root = margin.apply(ViewportMetrics::new(1000.0, 800.0, 0.0));
        assert_eq!(root, Rect::new(0.0, 80.0, 1000.0, 320.0));
    }
}
