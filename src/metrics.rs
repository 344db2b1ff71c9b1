//! Metric vocabulary and record resolution.
//!
//! A [`MetricRecord`] exists only in a fully resolved state: every required
//! ratio present and numeric. Anything less degrades the whole record to a
//! [`FetchError`] during resolution, so downstream scoring never sees a
//! half-populated record and never has to fake a financial value.

use serde::Serialize;

use crate::error::FetchError;
use crate::parser::parse_ratio;
use crate::source::RawFields;

/// Named financial fields the source is expected to expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Pbr,
    Roe,
    EquityRatio,
    RevenueGrowth,
    DividendPayout,
    CurrentRatio,
    LiquidationValue,
    MarketCap,
}

impl Metric {
    pub const ALL: [Metric; 8] = [
        Metric::Pbr,
        Metric::Roe,
        Metric::EquityRatio,
        Metric::RevenueGrowth,
        Metric::DividendPayout,
        Metric::CurrentRatio,
        Metric::LiquidationValue,
        Metric::MarketCap,
    ];

    /// Fields that must resolve for a record to be scorable.
    pub const REQUIRED: [Metric; 5] = [
        Metric::Pbr,
        Metric::Roe,
        Metric::EquityRatio,
        Metric::RevenueGrowth,
        Metric::DividendPayout,
    ];

    /// Label under which the field appears on the finance page.
    pub fn label(self) -> &'static str {
        match self {
            Metric::Pbr => "PBR",
            Metric::Roe => "ROE",
            Metric::EquityRatio => "自己資本比率",
            Metric::RevenueGrowth => "売上成長率",
            Metric::DividendPayout => "配当性向",
            Metric::CurrentRatio => "流動比率",
            Metric::LiquidationValue => "清算価値",
            Metric::MarketCap => "時価総額",
        }
    }
}

/// Fully resolved financial ratios for one instrument.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricRecord {
    /// Instrument display name as shown by the source.
    pub name: String,
    /// Price-to-book ratio.
    pub pbr: f64,
    /// Return on equity, percent.
    pub roe: f64,
    /// Equity ratio, percent.
    pub equity_ratio: f64,
    /// Year-over-year revenue growth, percent.
    pub revenue_growth: f64,
    /// Dividend payout ratio, percent.
    pub dividend_payout: f64,

    // Informational only; absence never fails a record or moves a grade.
    pub current_ratio: Option<f64>,
    pub liquidation_value: Option<f64>,
    pub market_cap: Option<f64>,
}

/// Resolves raw field text into a [`MetricRecord`].
///
/// Required fields fail loudly: a missing or unparsable value names the field
/// in the error so a failed row tells the user what the page did not yield.
pub fn resolve(raw: &RawFields) -> Result<MetricRecord, FetchError> {
    let required = |metric: Metric| -> Result<f64, FetchError> {
        let text = raw
            .values
            .get(&metric)
            .ok_or_else(|| FetchError::parse(format!("{} missing from document", metric.label())))?;
        parse_ratio(text)
            .map_err(|e| FetchError::parse(format!("{}: {}", metric.label(), e.cause())))
    };
    let optional = |metric: Metric| -> Option<f64> {
        raw.values.get(&metric).and_then(|text| parse_ratio(text).ok())
    };

    Ok(MetricRecord {
        name: raw.name.clone(),
        pbr: required(Metric::Pbr)?,
        roe: required(Metric::Roe)?,
        equity_ratio: required(Metric::EquityRatio)?,
        revenue_growth: required(Metric::RevenueGrowth)?,
        dividend_payout: required(Metric::DividendPayout)?,
        current_ratio: optional(Metric::CurrentRatio),
        liquidation_value: optional(Metric::LiquidationValue),
        market_cap: optional(Metric::MarketCap),
    })
}
