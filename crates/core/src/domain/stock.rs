use crate::domain::recommendation::{BuyingOpportunity, Recommendation, RiskLevel};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One scored row of the dashboard, keyed by `symbol`.
///
/// Market fields the upstream source did not report are `None` rather than zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockRecord {
    pub symbol: String,
    pub name: String,
    pub sector: Option<String>,
    pub price: f64,
    pub previous_close: Option<f64>,
    pub market_cap: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub year_high: Option<f64>,
    pub year_low: Option<f64>,
    pub volume: u64,
    pub ai_score: f64,
    pub growth_score: f64,
    pub risk_score: f64,
    pub recommendation: Recommendation,
    pub predicted_price: f64,
    #[serde(default)]
    pub historical_prices: Vec<PricePoint>,
    #[serde(default)]
    pub ai_metrics: AiMetrics,
    #[serde(default)]
    pub market_signals: Option<MarketSignals>,
    #[serde(default)]
    pub technical_indicators: Option<TechnicalIndicators>,
    /// Free-text view from an analyst or LLM, kept for display only.
    #[serde(default)]
    pub analyst_view: Option<String>,
}

impl StockRecord {
    pub fn price_change(&self) -> Option<f64> {
        self.previous_close.map(|prev| self.price - prev)
    }

    /// Percent change against the previous close; `None` without a usable close.
    pub fn price_change_percent(&self) -> Option<f64> {
        let prev = self.previous_close.filter(|p| *p != 0.0)?;
        Some((self.price - prev) / prev * 100.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
    pub volume: u64,
}

/// AI-business metrics. R&D is in millions USD, market share and revenue
/// growth are percentages, adoption is already in [0, 1].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiMetrics {
    pub rnd_investment: Option<f64>,
    pub patent_count: Option<f64>,
    pub market_share: Option<f64>,
    pub revenue_growth: Option<f64>,
    pub ai_adoption: Option<f64>,
}

/// Market-behaviour signals. Sentiment is in [-1, 1]; momentum and volatility in [0, 1].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSignals {
    pub sentiment: Option<f64>,
    pub momentum: Option<f64>,
    pub volatility: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeverageMetrics {
    pub beta: Option<f64>,
    pub volatility: Option<f64>,
    pub debt_to_equity: Option<f64>,
}

/// Counts taken from a SWOT-style qualitative analysis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwotCounts {
    pub strengths: usize,
    pub weaknesses: usize,
    pub opportunities: usize,
    pub threats: usize,
}

// Display values only: nothing checks upper >= middle >= lower.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalIndicators {
    pub rsi: f64,
    pub macd: f64,
    pub moving_average_50: f64,
    pub moving_average_200: f64,
    pub bollinger_bands: BollingerBands,
    pub volume: VolumeStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerBands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeStats {
    pub current: f64,
    pub average: f64,
    /// Percent change of current over average.
    pub change: f64,
}

impl VolumeStats {
    pub fn from_current_and_average(current: f64, average: f64) -> Self {
        let change = if average > 0.0 {
            (current - average) / average * 100.0
        } else {
            0.0
        };
        Self {
            current,
            average,
            change,
        }
    }
}

/// The technical detail panel for one selected stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockAnalysis {
    pub symbol: String,
    pub technical_indicators: TechnicalSnapshot,
    /// 0..=100.
    pub sentiment_score: f64,
    pub buying_opportunity: BuyingOpportunity,
    pub risk_level: RiskLevel,
    pub price_targets: PriceTargets,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalSnapshot {
    pub rsi: f64,
    pub macd: f64,
    pub moving_average_50: f64,
    pub moving_average_200: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceTargets {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}
