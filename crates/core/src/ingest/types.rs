//! Response shapes of the Alpha Vantage-style market data API. Every number arrives as a
//! string (and `"None"` or `"-"` when unknown), so all numeric fields are lenient.

use crate::domain::contract::{lenient_f64, parse_lenient_number};
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Deserialize)]
pub struct GlobalQuoteResponse {
    #[serde(rename = "Global Quote", default)]
    pub quote: Option<GlobalQuote>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GlobalQuote {
    #[serde(rename = "01. symbol", default)]
    pub symbol: Option<String>,
    #[serde(rename = "05. price", default, deserialize_with = "lenient_f64")]
    pub price: Option<f64>,
    #[serde(rename = "06. volume", default, deserialize_with = "lenient_f64")]
    pub volume: Option<f64>,
    #[serde(rename = "08. previous close", default, deserialize_with = "lenient_f64")]
    pub previous_close: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompanyOverview {
    #[serde(rename = "Symbol", default)]
    pub symbol: Option<String>,
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    #[serde(rename = "Sector", default)]
    pub sector: Option<String>,
    #[serde(rename = "MarketCapitalization", default, deserialize_with = "lenient_f64")]
    pub market_capitalization: Option<f64>,
    #[serde(rename = "PERatio", default, deserialize_with = "lenient_f64")]
    pub pe_ratio: Option<f64>,
    #[serde(rename = "52WeekHigh", default, deserialize_with = "lenient_f64")]
    pub week_52_high: Option<f64>,
    #[serde(rename = "52WeekLow", default, deserialize_with = "lenient_f64")]
    pub week_52_low: Option<f64>,
    #[serde(rename = "Beta", default, deserialize_with = "lenient_f64")]
    pub beta: Option<f64>,
    #[serde(rename = "AnalystTargetPrice", default, deserialize_with = "lenient_f64")]
    pub analyst_target_price: Option<f64>,
    /// Fraction, e.g. `"0.265"` for 26.5%.
    #[serde(rename = "QuarterlyRevenueGrowthYOY", default, deserialize_with = "lenient_f64")]
    pub quarterly_revenue_growth_yoy: Option<f64>,
}

/// `{"Technical Analysis: RSI": {"2024-03-20": {"RSI": "55.1"}, ...}}` and friends. Dates
/// are ISO so the map's last key is the latest reading.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndicatorSeries(pub BTreeMap<String, BTreeMap<String, String>>);

impl IndicatorSeries {
    pub fn latest(&self, field: &str) -> Option<f64> {
        self.0
            .values()
            .rev()
            .find_map(|row| row.get(field).and_then(|v| parse_lenient_number(v)))
    }
}
