//! Shapes an LLM is prompted to return, and their conversion into domain records.
//!
//! Models tend to answer numeric fields as strings (`"175.50"`, `"$1,234"`, `"25%"`), so
//! every number is parsed leniently. A field that can't be parsed is treated as missing
//! rather than failing the whole response. The same goes for lists and nested objects: an
//! explicit `null` or a value of the wrong type falls back to empty or neutral.

use crate::domain::recommendation::{BuyingOpportunity, RiskLevel};
use crate::domain::stock::{
    AiMetrics, PriceTargets, StockAnalysis, StockRecord, SwotCounts, TechnicalSnapshot,
};
use crate::scoring;
use anyhow::ensure;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmCompanyAnalysis {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub current_price: Option<f64>,
    /// Billions USD.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub market_cap: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub pe_ratio: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub year_high: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub year_low: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub volume: Option<f64>,
    #[serde(default, deserialize_with = "lenient_optional_object")]
    pub ai_metrics: Option<LlmAiMetrics>,
    #[serde(default, deserialize_with = "lenient_optional_object")]
    pub analysis: Option<LlmSwot>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub recommendation: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmAiMetrics {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub rnd_investment: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub patent_count: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub market_share: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub revenue_growth: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub ai_adoption: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmSwot {
    #[serde(default, deserialize_with = "lenient_strings")]
    pub strengths: Vec<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub weaknesses: Vec<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub opportunities: Vec<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub threats: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmStockAnalysis {
    #[serde(default, deserialize_with = "lenient_object")]
    pub technical_indicators: LlmTechnicals,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub sentiment_score: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub buying_opportunity: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub risk_level: Option<String>,
    #[serde(default, deserialize_with = "lenient_object")]
    pub price_targets: LlmPriceTargets,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmTechnicals {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub rsi: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub macd: Option<f64>,
    #[serde(default, rename = "movingAverage50", deserialize_with = "lenient_f64")]
    pub moving_average_50: Option<f64>,
    #[serde(default, rename = "movingAverage200", deserialize_with = "lenient_f64")]
    pub moving_average_200: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmPriceTargets {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub low: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub medium: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub high: Option<f64>,
}

impl LlmSwot {
    pub fn counts(&self) -> SwotCounts {
        let non_empty = |v: &[String]| v.iter().filter(|s| !s.trim().is_empty()).count();
        SwotCounts {
            strengths: non_empty(&self.strengths),
            weaknesses: non_empty(&self.weaknesses),
            opportunities: non_empty(&self.opportunities),
            threats: non_empty(&self.threats),
        }
    }
}

impl From<LlmAiMetrics> for AiMetrics {
    fn from(m: LlmAiMetrics) -> Self {
        Self {
            rnd_investment: m.rnd_investment,
            patent_count: m.patent_count.map(f64::trunc),
            market_share: m.market_share,
            revenue_growth: m.revenue_growth,
            ai_adoption: m.ai_adoption,
        }
    }
}

impl LlmCompanyAnalysis {
    /// Scores the analysis into a record. Only the symbol is validated; every other field
    /// degrades to `None` or a neutral score when missing.
    pub fn validate_and_into_record(self, symbol: &str) -> anyhow::Result<StockRecord> {
        let symbol = symbol.trim().to_ascii_uppercase();
        ensure!(!symbol.is_empty(), "symbol must be non-empty");

        let name = self
            .name
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| symbol.clone());

        let ai_metrics: Option<AiMetrics> = self.ai_metrics.map(Into::into);
        let ai_score = scoring::ai_score(ai_metrics.as_ref());
        let growth_score = scoring::growth_score(ai_metrics.as_ref());
        let risk_score = scoring::swot_risk_score(self.analysis.as_ref().map(LlmSwot::counts).as_ref());
        let predicted_price = scoring::predict_price_from_growth_percent(
            self.current_price,
            ai_metrics.as_ref().and_then(|m| m.revenue_growth),
        );

        let analyst_view = self
            .recommendation
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Ok(StockRecord {
            symbol,
            name,
            sector: None,
            price: self.current_price.filter(|p| *p >= 0.0).unwrap_or(0.0),
            previous_close: None,
            market_cap: self.market_cap.map(|b| b * 1e9),
            pe_ratio: self.pe_ratio,
            year_high: self.year_high,
            year_low: self.year_low,
            volume: self.volume.filter(|v| *v >= 0.0).map_or(0, |v| v as u64),
            ai_score,
            growth_score,
            risk_score,
            recommendation: scoring::recommend(ai_score, growth_score, risk_score),
            predicted_price,
            historical_prices: Vec::new(),
            ai_metrics: ai_metrics.unwrap_or_default(),
            market_signals: None,
            technical_indicators: None,
            analyst_view,
        })
    }
}

impl LlmStockAnalysis {
    /// Labels the model stated win when they parse; otherwise they are derived from the
    /// indicators with the same ladders every other source uses.
    pub fn validate_and_into_analysis(self, symbol: &str) -> anyhow::Result<StockAnalysis> {
        let symbol = symbol.trim().to_ascii_uppercase();
        ensure!(!symbol.is_empty(), "symbol must be non-empty");

        let t = &self.technical_indicators;
        let rsi = t.rsi.unwrap_or(50.0).clamp(0.0, 100.0);
        let macd = t.macd.unwrap_or(0.0);
        let technical_indicators = TechnicalSnapshot {
            rsi,
            macd,
            moving_average_50: t.moving_average_50.unwrap_or(0.0),
            moving_average_200: t.moving_average_200.unwrap_or(0.0),
        };

        let buying_opportunity = self
            .buying_opportunity
            .as_deref()
            .and_then(BuyingOpportunity::parse_label)
            .unwrap_or_else(|| scoring::buying_opportunity(rsi, macd));
        let risk_level = self
            .risk_level
            .as_deref()
            .and_then(RiskLevel::parse_label)
            .unwrap_or(RiskLevel::Medium);

        let p = &self.price_targets;
        let medium = p.medium.or(p.low).or(p.high).unwrap_or(0.0);
        let price_targets = PriceTargets {
            low: p.low.unwrap_or(medium),
            medium,
            high: p.high.unwrap_or(medium),
        };

        Ok(StockAnalysis {
            symbol,
            technical_indicators,
            sentiment_score: self.sentiment_score.unwrap_or(50.0).clamp(0.0, 100.0),
            buying_opportunity,
            risk_level,
            price_targets,
        })
    }
}

/// Number-or-string field; anything unparseable becomes `None`.
pub fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(v.as_ref().and_then(value_to_f64))
}

/// String field; numbers are kept as their text, anything else becomes `None`.
pub fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match v {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// List of strings. `null` or a non-list becomes empty; a single delimited string is split
/// on `,`, `;` or newlines.
pub fn lenient_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match v {
        Some(serde_json::Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                serde_json::Value::String(s) => Some(s),
                serde_json::Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        Some(serde_json::Value::String(s)) => s
            .split([',', ';', '\n'])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    })
}

/// Nested object that defaults when it is `null`, not an object, or fails to decode.
pub fn lenient_object<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(lenient_optional_object(deserializer)?.unwrap_or_default())
}

pub fn lenient_optional_object<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let v = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match v {
        Some(v @ serde_json::Value::Object(_)) => serde_json::from_value(v).ok(),
        _ => None,
    })
}

pub fn value_to_f64(v: &serde_json::Value) -> Option<f64> {
    match v {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => parse_lenient_number(s),
        _ => None,
    }
}

/// Leading numeric prefix after stripping `$`, `,` and whitespace: `"$1,234.5 M"` -> 1234.5.
pub fn parse_lenient_number(s: &str) -> Option<f64> {
    let cleaned: String = s
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    let end = cleaned
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || ((c == '-' || c == '+') && i == 0)))
        .map_or(cleaned.len(), |(i, _)| i);
    cleaned[..end].parse::<f64>().ok().filter(|n| n.is_finite())
}
