use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::error::{PageError, PageResult};

pub fn decimal_to_f64(value: Decimal, field_name: &str) -> PageResult<f64> {
    value.to_f64().ok_or_else(|| {
        PageError::InvalidContent(format!("{field_name} cannot be represented as f64"))
    })
}

/// Returns the first day of `year` when it is a representable calendar year.
#[must_use]
pub fn period_start(year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, 1, 1)
}
