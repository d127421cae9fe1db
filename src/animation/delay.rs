use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PageError, PageResult};
use crate::host::{ElementId, Host};

/// How long an element waits before its reveal, measured from the moment
/// the reveal is scheduled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DelayPolicy {
    /// `index * step_ms`, where `index` is the element's position in its
    /// collection.
    LinearByIndex { step_ms: f64 },
    /// `attribute * step_ms`, where the attribute holds an integer. Missing
    /// or malformed values count as 0.
    Attribute { name: String, step_ms: f64 },
}

impl DelayPolicy {
    #[must_use]
    pub fn linear(step_ms: f64) -> Self {
        Self::LinearByIndex { step_ms }
    }

    #[must_use]
    pub fn attribute(name: impl Into<String>, step_ms: f64) -> Self {
        Self::Attribute {
            name: name.into(),
            step_ms,
        }
    }

    #[must_use]
    pub fn delay_ms<H: Host + ?Sized>(&self, host: &H, element: ElementId, index: usize) -> f64 {
        match self {
            Self::LinearByIndex { step_ms } => index as f64 * step_ms,
            Self::Attribute { name, step_ms } => {
                let key = match attribute_order_key(host, element, name) {
                    Ok(key) => key,
                    Err(error) => {
                        debug!(?element, %error, "delay attribute defaults to 0");
                        0
                    }
                };
                key as f64 * step_ms
            }
        }
    }
}

fn attribute_order_key<H: Host + ?Sized>(
    host: &H,
    element: ElementId,
    name: &str,
) -> PageResult<i64> {
    let value = host.attribute(element, name).unwrap_or_default();
    parse_leading_int(&value).ok_or_else(|| PageError::MalformedAttribute {
        name: name.to_owned(),
        value,
    })
}

/// Integer prefix parsing: leading whitespace, optional sign, then at least
/// one decimal digit. Trailing characters are ignored (`"3px"` is 3).
#[must_use]
pub fn parse_leading_int(input: &str) -> Option<i64> {
    let trimmed = input.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = digits
        .find(|ch: char| !ch.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let magnitude: i64 = digits[..end].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}
