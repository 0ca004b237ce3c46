use crate::domain::enhanced::Sector;
use crate::domain::stock::StockRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChartMetric {
    AiScore,
    GrowthScore,
    RiskScore,
    Price,
    MarketCap,
    Volume,
}

/// Colour band of a bar: good, fair or poor for the metric's direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    Good,
    Fair,
    Poor,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub symbol: String,
    pub value: f64,
    pub band: Band,
}

impl ChartMetric {
    pub fn label(self) -> &'static str {
        match self {
            Self::AiScore => "AI Score",
            Self::GrowthScore => "Growth Score",
            Self::RiskScore => "Risk Score",
            Self::Price => "Price ($)",
            Self::MarketCap => "Market Cap ($B)",
            Self::Volume => "Volume (M)",
        }
    }

    fn raw(self, s: &StockRecord) -> f64 {
        match self {
            Self::AiScore => s.ai_score,
            Self::GrowthScore => s.growth_score,
            Self::RiskScore => s.risk_score,
            Self::Price => s.price,
            Self::MarketCap => s.market_cap.unwrap_or(0.0),
            Self::Volume => s.volume as f64,
        }
    }

    /// Value in display units (billions for market cap, millions for volume).
    pub fn display_value(self, s: &StockRecord) -> f64 {
        let raw = self.raw(s);
        match self {
            Self::MarketCap => raw / 1e9,
            Self::Volume => raw / 1e6,
            _ => raw,
        }
    }

    // Bands compare the unscaled value, so only score metrics land outside Poor.
    pub fn band(self, s: &StockRecord) -> Band {
        let v = self.raw(s);
        match self {
            Self::RiskScore if v > 7.0 => Band::Poor,
            Self::RiskScore if v > 4.0 => Band::Fair,
            Self::RiskScore => Band::Good,
            _ if v > 8.0 => Band::Good,
            _ if v > 6.0 => Band::Fair,
            _ => Band::Poor,
        }
    }
}

impl FromStr for ChartMetric {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "aiscore" | "ai" => Ok(Self::AiScore),
            "growthscore" | "growth" => Ok(Self::GrowthScore),
            "riskscore" | "risk" => Ok(Self::RiskScore),
            "price" => Ok(Self::Price),
            "marketcap" => Ok(Self::MarketCap),
            "volume" => Ok(Self::Volume),
            other => anyhow::bail!("unknown chart metric: {other}"),
        }
    }
}

pub fn chart_series<'a>(
    stocks: impl IntoIterator<Item = &'a StockRecord>,
    metric: ChartMetric,
) -> Vec<ChartPoint> {
    stocks
        .into_iter()
        .map(|s| ChartPoint {
            symbol: s.symbol.clone(),
            value: metric.display_value(s),
            band: metric.band(s),
        })
        .collect()
}

/// Stock count per sector; stocks without a sector are grouped under "Other".
pub fn sector_counts<'a>(stocks: impl IntoIterator<Item = &'a StockRecord>) -> BTreeMap<String, usize> {
    let mut out = BTreeMap::new();
    for s in stocks {
        let sector = s.sector.clone().unwrap_or_else(|| "Other".to_string());
        *out.entry(sector).or_insert(0) += 1;
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PerformanceTier {
    StrongGain,
    Gain,
    Loss,
    StrongLoss,
}

pub fn performance_tier(performance: f64) -> PerformanceTier {
    if performance >= 2.0 {
        PerformanceTier::StrongGain
    } else if performance >= 0.0 {
        PerformanceTier::Gain
    } else if performance >= -2.0 {
        PerformanceTier::Loss
    } else {
        PerformanceTier::StrongLoss
    }
}

/// Sectors ordered best to worst.
pub fn rank_sectors(sectors: &[Sector]) -> Vec<(&Sector, PerformanceTier)> {
    let mut out: Vec<_> = sectors
        .iter()
        .map(|s| (s, performance_tier(s.performance)))
        .collect();
    out.sort_by(|a, b| {
        b.0.performance
            .partial_cmp(&a.0.performance)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.name.cmp(&b.0.name))
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::recommendation::Recommendation;
    use crate::domain::stock::AiMetrics;

    fn stock(symbol: &str, sector: Option<&str>, ai: f64, risk: f64) -> StockRecord {
        StockRecord {
            symbol: symbol.to_string(),
            name: symbol.to_string(),
            sector: sector.map(str::to_string),
            price: 10.0,
            previous_close: None,
            market_cap: Some(2.5e12),
            pe_ratio: None,
            year_high: None,
            year_low: None,
            volume: 30_000_000,
            ai_score: ai,
            growth_score: 5.0,
            risk_score: risk,
            recommendation: Recommendation::Hold,
            predicted_price: 10.0,
            historical_prices: Vec::new(),
            ai_metrics: AiMetrics::default(),
            market_signals: None,
            technical_indicators: None,
            analyst_view: None,
        }
    }

    #[test]
    fn parses_metric_names() {
        assert_eq!("aiScore".parse::<ChartMetric>().unwrap(), ChartMetric::AiScore);
        assert_eq!("market-cap".parse::<ChartMetric>().unwrap(), ChartMetric::MarketCap);
        assert!("beta".parse::<ChartMetric>().is_err());
    }

    #[test]
    fn scales_display_units() {
        let s = stock("NVDA", None, 9.0, 5.0);
        assert_eq!(ChartMetric::MarketCap.display_value(&s), 2500.0);
        assert_eq!(ChartMetric::Volume.display_value(&s), 30.0);
    }

    #[test]
    fn risk_bands_are_inverted() {
        let stocks = vec![stock("A", None, 9.0, 8.0), stock("B", None, 7.0, 5.0), stock("C", None, 3.0, 2.0)];
        let risk: Vec<_> = chart_series(&stocks, ChartMetric::RiskScore).into_iter().map(|p| p.band).collect();
        assert_eq!(risk, vec![Band::Poor, Band::Fair, Band::Good]);
        let ai: Vec<_> = chart_series(&stocks, ChartMetric::AiScore).into_iter().map(|p| p.band).collect();
        assert_eq!(ai, vec![Band::Good, Band::Fair, Band::Poor]);
    }

    #[test]
    fn counts_sectors() {
        let stocks = vec![
            stock("A", Some("Technology"), 5.0, 5.0),
            stock("B", Some("Technology"), 5.0, 5.0),
            stock("C", None, 5.0, 5.0),
        ];
        let counts = sector_counts(&stocks);
        assert_eq!(counts.get("Technology"), Some(&2));
        assert_eq!(counts.get("Other"), Some(&1));
    }

    #[test]
    fn ranks_sectors_by_performance() {
        let sectors = vec![
            Sector { name: "Energy".into(), performance: -1.5, top_stocks: vec![] },
            Sector { name: "Technology".into(), performance: 2.5, top_stocks: vec![] },
            Sector { name: "Finance".into(), performance: -2.8, top_stocks: vec![] },
        ];
        let ranked = rank_sectors(&sectors);
        assert_eq!(ranked[0].0.name, "Technology");
        assert_eq!(ranked[0].1, PerformanceTier::StrongGain);
        assert_eq!(ranked[1].1, PerformanceTier::Loss);
        assert_eq!(ranked[2].1, PerformanceTier::StrongLoss);
        assert_eq!(performance_tier(0.0), PerformanceTier::Gain);
    }
}
