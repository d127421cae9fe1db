use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::palette::Palette;
use crate::core::primitives::period_start;
use crate::error::{PageError, PageResult};

/// Headline investment figures, already formatted for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricSet {
    pub capital_required: String,
    pub timeline: String,
    pub projected_roi: String,
    pub return_multiple: String,
    pub total_revenue: String,
}

impl MetricSet {
    /// Display label and value pairs in page order.
    #[must_use]
    pub fn labeled(&self) -> [(&'static str, &str); 5] {
        [
            ("Capital Required", &self.capital_required),
            ("Timeline", &self.timeline),
            ("Projected ROI", &self.projected_roi),
            ("Return Multiple", &self.return_multiple),
            ("Total Revenue", &self.total_revenue),
        ]
    }
}

/// One market-size observation. `value` is in billions of dollars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesPoint {
    #[serde(alias = "year")]
    pub period: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,
}

impl SeriesPoint {
    #[must_use]
    pub fn new(period: i32, value: Decimal) -> Self {
        Self { period, value }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevenueEntry {
    pub name: String,
    /// Percentage of total revenue, `0..=100`.
    #[serde(alias = "percentage", with = "rust_decimal::serde::float")]
    pub share: Decimal,
    pub amount: String,
    pub description: String,
}

impl RevenueEntry {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        share: Decimal,
        amount: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            share,
            amount: amount.into(),
            description: description.into(),
        }
    }
}

/// Static, read-only page content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentModel {
    #[serde(alias = "investment_metrics")]
    pub metrics: MetricSet,
    #[serde(alias = "market_growth_data")]
    pub market_growth: Vec<SeriesPoint>,
    pub revenue_streams: Vec<RevenueEntry>,
    #[serde(alias = "color_palette", default)]
    pub palette: Palette,
}

impl ContentModel {
    /// Content of the vertical-series licensing investor page.
    #[must_use]
    pub fn investor_deck() -> Self {
        let market_growth = [
            (2024, 654),
            (2025, 723),
            (2026, 799),
            (2027, 882),
            (2028, 975),
            (2029, 1077),
            (2030, 1191),
        ]
        .into_iter()
        .map(|(year, cents)| SeriesPoint::new(year, Decimal::new(cents, 2)))
        .collect();

        Self {
            metrics: MetricSet {
                capital_required: "$5,000,000".to_owned(),
                timeline: "36 months".to_owned(),
                projected_roi: "168.9%".to_owned(),
                return_multiple: "2.7x".to_owned(),
                total_revenue: "$13,406,250".to_owned(),
            },
            market_growth,
            revenue_streams: vec![
                RevenueEntry::new(
                    "US Platform Licensing",
                    Decimal::new(35, 0),
                    "$5.6M",
                    "Direct licensing agreements with major platforms",
                ),
                RevenueEntry::new(
                    "Revenue Share Agreements",
                    Decimal::new(272, 1),
                    "$4.4M",
                    "Ongoing participation in content performance",
                ),
                RevenueEntry::new(
                    "International Distribution",
                    Decimal::new(21, 0),
                    "$3.4M",
                    "Global licensing across multiple territories",
                ),
                RevenueEntry::new(
                    "Franchise Development",
                    Decimal::new(168, 1),
                    "$2.7M",
                    "Sequel and adaptation rights monetization",
                ),
            ],
            palette: Palette::default(),
        }
    }

    pub fn from_json_str(input: &str) -> PageResult<Self> {
        let content: Self = serde_json::from_str(input).map_err(|e| {
            PageError::InvalidContent(format!("failed to parse content json payload: {e}"))
        })?;
        content.validate()?;
        Ok(content)
    }

    pub fn to_json_pretty(&self) -> PageResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            PageError::InvalidContent(format!("failed to serialize content json payload: {e}"))
        })
    }

    pub fn validate(&self) -> PageResult<()> {
        if self.market_growth.is_empty() {
            return Err(PageError::InvalidContent(
                "market growth series must not be empty".to_owned(),
            ));
        }
        for point in &self.market_growth {
            if period_start(point.period).is_none() {
                return Err(PageError::InvalidContent(format!(
                    "period {} is not a calendar year",
                    point.period
                )));
            }
        }
        if let Some(pair) = self
            .market_growth
            .windows(2)
            .find(|pair| pair[0].period >= pair[1].period)
        {
            return Err(PageError::InvalidContent(format!(
                "market growth periods must be strictly ascending ({} then {})",
                pair[0].period, pair[1].period
            )));
        }

        let hundred = Decimal::ONE_HUNDRED;
        for entry in &self.revenue_streams {
            if entry.name.trim().is_empty() {
                return Err(PageError::InvalidContent(
                    "revenue entry name must not be empty".to_owned(),
                ));
            }
            if entry.share < Decimal::ZERO || entry.share > hundred {
                return Err(PageError::InvalidContent(format!(
                    "revenue share of `{}` must be in [0, 100]",
                    entry.name
                )));
            }
        }

        self.palette.validate()
    }

    /// Sum of revenue shares. Informational only; not required to be 100.
    #[must_use]
    pub fn total_share(&self) -> Decimal {
        self.revenue_streams.iter().map(|entry| entry.share).sum()
    }
}

impl Default for ContentModel {
    fn default() -> Self {
        Self::investor_deck()
    }
}
