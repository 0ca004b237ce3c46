use crate::domain::stock::TechnicalIndicators;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewsSentiment {
    Positive,
    Negative,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub source: String,
    pub date: DateTime<Utc>,
    pub url: String,
    pub sentiment: NewsSentiment,
}

/// Sentiment in [-1, 1] plus mention volume for one platform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlatformSentiment {
    pub sentiment: f64,
    pub volume: u64,
    pub trending: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SocialSentiment {
    pub twitter: PlatformSentiment,
    pub reddit: PlatformSentiment,
    pub overall: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsAndSocial {
    pub news: Vec<NewsItem>,
    pub social_sentiment: SocialSentiment,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreComparison {
    pub ai_score: f64,
    pub growth_score: f64,
    pub risk_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Competitor {
    pub symbol: String,
    pub name: String,
    pub market_share: f64,
    pub comparison: ScoreComparison,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DividendInfo {
    #[serde(rename = "yield")]
    pub dividend_yield: f64,
    pub payout_ratio: f64,
    pub next_dividend_date: DateTime<Utc>,
    pub annual_dividend: f64,
    pub dividend_growth: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holder {
    pub name: String,
    pub shares: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstitutionalOwnership {
    pub total_shares: u64,
    pub percentage: f64,
    pub top_holders: Vec<Holder>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarningsInfo {
    pub next_earnings_date: DateTime<Utc>,
    #[serde(rename = "estimatedEPS")]
    pub estimated_eps: f64,
    #[serde(rename = "actualEPS")]
    pub actual_eps: Option<f64>,
    /// Percent surprise of actual over estimate, when reported.
    pub surprise: Option<f64>,
    pub year_ahead_estimate: f64,
}

/// Everything behind the tabbed detail view of one stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockMetrics {
    pub technical_indicators: TechnicalIndicators,
    pub dividend_info: DividendInfo,
    pub institutional_ownership: InstitutionalOwnership,
    pub earnings_info: EarningsInfo,
    pub news: Vec<NewsItem>,
    pub social_sentiment: SocialSentiment,
    pub competitors: Vec<Competitor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sector {
    pub name: String,
    /// Daily percent performance.
    pub performance: f64,
    pub top_stocks: Vec<String>,
}
