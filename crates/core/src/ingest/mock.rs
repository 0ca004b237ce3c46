//! Built-in fixtures for the AI watchlist.
//!
//! Fixtures carry raw metrics only; scores and labels are computed by `crate::scoring` when
//! a record is built. The enhanced tabs (dividends, ownership, earnings) are generated from a
//! generator seeded by the symbol, so the same symbol always renders the same numbers.

use crate::config::Settings;
use crate::domain::enhanced::{
    Competitor, DividendInfo, EarningsInfo, Holder, InstitutionalOwnership, NewsAndSocial,
    NewsItem, NewsSentiment, PlatformSentiment, ScoreComparison, Sector, SocialSentiment,
    StockMetrics,
};
use crate::domain::stock::{
    AiMetrics, BollingerBands, LeverageMetrics, MarketSignals, PricePoint, PriceTargets,
    StockAnalysis, StockRecord, TechnicalIndicators, TechnicalSnapshot, VolumeStats,
};
use crate::ingest::StockSource;
use crate::scoring;
use crate::scoring::normalize::Metric;
use crate::session::normalize_symbol;
use anyhow::Result;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

const HISTORY_DAYS: i64 = 30;

struct Fixture {
    symbol: &'static str,
    name: &'static str,
    sector: &'static str,
    price: f64,
    previous_close: f64,
    market_cap: f64,
    pe_ratio: Option<f64>,
    year_high: f64,
    year_low: f64,
    volume: u64,
    average_volume: u64,
    ai: AiMetrics,
    leverage: LeverageMetrics,
    sentiment: f64,
    momentum: f64,
    rsi: f64,
    macd: f64,
    moving_average_50: f64,
    moving_average_200: f64,
    targets: PriceTargets,
}

const fn ai(rnd: f64, patents: f64, share: f64, growth: f64, adoption: f64) -> AiMetrics {
    AiMetrics {
        rnd_investment: Some(rnd),
        patent_count: Some(patents),
        market_share: Some(share),
        revenue_growth: Some(growth),
        ai_adoption: Some(adoption),
    }
}

const fn leverage(beta: f64, volatility: f64, debt_to_equity: f64) -> LeverageMetrics {
    LeverageMetrics {
        beta: Some(beta),
        volatility: Some(volatility),
        debt_to_equity: Some(debt_to_equity),
    }
}

const fn targets(low: f64, medium: f64, high: f64) -> PriceTargets {
    PriceTargets { low, medium, high }
}

static FIXTURES: [Fixture; 10] = [
    Fixture {
        symbol: "NVDA",
        name: "NVIDIA Corporation",
        sector: "Technology",
        price: 875.28,
        previous_close: 860.10,
        market_cap: 2.16e12,
        pe_ratio: Some(72.5),
        year_high: 974.0,
        year_low: 410.0,
        volume: 45_000_000,
        average_volume: 42_000_000,
        ai: ai(8_675.0, 850.0, 80.0, 126.0, 0.95),
        leverage: leverage(1.7, 0.45, 0.4),
        sentiment: 0.9,
        momentum: 0.85,
        rsi: 68.0,
        macd: 12.4,
        moving_average_50: 820.0,
        moving_average_200: 640.0,
        targets: targets(800.0, 1_000.0, 1_200.0),
    },
    Fixture {
        symbol: "GOOGL",
        name: "Alphabet Inc.",
        sector: "Technology",
        price: 152.30,
        previous_close: 150.90,
        market_cap: 1.89e12,
        pe_ratio: Some(25.3),
        year_high: 155.2,
        year_low: 115.8,
        volume: 28_000_000,
        average_volume: 30_000_000,
        ai: ai(45_000.0, 980.0, 25.0, 13.0, 0.9),
        leverage: leverage(1.05, 0.28, 0.1),
        sentiment: 0.6,
        momentum: 0.55,
        rsi: 58.0,
        macd: 1.8,
        moving_average_50: 145.0,
        moving_average_200: 135.0,
        targets: targets(140.0, 170.0, 190.0),
    },
    Fixture {
        symbol: "MSFT",
        name: "Microsoft Corporation",
        sector: "Technology",
        price: 415.50,
        previous_close: 411.20,
        market_cap: 3.09e12,
        pe_ratio: Some(36.2),
        year_high: 430.8,
        year_low: 309.4,
        volume: 22_000_000,
        average_volume: 21_000_000,
        ai: ai(27_000.0, 750.0, 30.0, 17.0, 0.92),
        leverage: leverage(0.9, 0.22, 0.3),
        sentiment: 0.7,
        momentum: 0.6,
        rsi: 62.0,
        macd: 3.5,
        moving_average_50: 405.0,
        moving_average_200: 370.0,
        targets: targets(390.0, 460.0, 500.0),
    },
    Fixture {
        symbol: "AMD",
        name: "Advanced Micro Devices, Inc.",
        sector: "Technology",
        price: 178.60,
        previous_close: 182.30,
        market_cap: 2.89e11,
        pe_ratio: Some(320.5),
        year_high: 227.3,
        year_low: 93.1,
        volume: 60_000_000,
        average_volume: 55_000_000,
        ai: ai(5_870.0, 420.0, 12.0, 10.0, 0.8),
        leverage: leverage(1.9, 0.52, 0.05),
        sentiment: 0.5,
        momentum: 0.4,
        rsi: 45.0,
        macd: -1.2,
        moving_average_50: 185.0,
        moving_average_200: 150.0,
        targets: targets(150.0, 210.0, 250.0),
    },
    Fixture {
        symbol: "AI",
        name: "C3.ai, Inc.",
        sector: "Technology",
        price: 26.40,
        previous_close: 27.10,
        market_cap: 3.2e9,
        pe_ratio: None,
        year_high: 48.9,
        year_low: 18.8,
        volume: 7_500_000,
        average_volume: 8_000_000,
        ai: ai(210.0, 25.0, 1.0, 16.0, 0.98),
        leverage: leverage(2.1, 0.65, 0.0),
        sentiment: 0.1,
        momentum: 0.3,
        rsi: 28.0,
        macd: 0.3,
        moving_average_50: 28.5,
        moving_average_200: 29.0,
        targets: targets(18.0, 30.0, 45.0),
    },
    Fixture {
        symbol: "PLTR",
        name: "Palantir Technologies Inc.",
        sector: "Technology",
        price: 24.10,
        previous_close: 23.50,
        market_cap: 5.2e10,
        pe_ratio: Some(240.0),
        year_high: 27.5,
        year_low: 13.7,
        volume: 45_000_000,
        average_volume: 50_000_000,
        ai: ai(400.0, 120.0, 3.0, 17.0, 0.9),
        leverage: leverage(2.6, 0.6, 0.08),
        sentiment: 0.6,
        momentum: 0.7,
        rsi: 72.0,
        macd: 0.8,
        moving_average_50: 22.8,
        moving_average_200: 19.4,
        targets: targets(16.0, 25.0, 32.0),
    },
    Fixture {
        symbol: "META",
        name: "Meta Platforms, Inc.",
        sector: "Communication Services",
        price: 498.20,
        previous_close: 495.00,
        market_cap: 1.27e12,
        pe_ratio: Some(33.4),
        year_high: 523.6,
        year_low: 274.4,
        volume: 15_000_000,
        average_volume: 16_000_000,
        ai: ai(38_000.0, 600.0, 15.0, 25.0, 0.88),
        leverage: leverage(1.2, 0.35, 0.15),
        sentiment: 0.5,
        momentum: 0.65,
        rsi: 60.0,
        macd: 4.2,
        moving_average_50: 480.0,
        moving_average_200: 390.0,
        targets: targets(450.0, 550.0, 600.0),
    },
    Fixture {
        symbol: "CRM",
        name: "Salesforce, Inc.",
        sector: "Technology",
        price: 302.10,
        previous_close: 299.70,
        market_cap: 2.93e11,
        pe_ratio: Some(72.0),
        year_high: 318.7,
        year_low: 193.7,
        volume: 6_000_000,
        average_volume: 5_500_000,
        ai: ai(4_900.0, 180.0, 20.0, 11.0, 0.75),
        leverage: leverage(1.3, 0.3, 0.2),
        sentiment: 0.3,
        momentum: 0.45,
        rsi: 55.0,
        macd: -0.6,
        moving_average_50: 295.0,
        moving_average_200: 260.0,
        targets: targets(270.0, 330.0, 360.0),
    },
    Fixture {
        symbol: "TSLA",
        name: "Tesla, Inc.",
        sector: "Consumer Cyclical",
        price: 175.30,
        previous_close: 180.80,
        market_cap: 5.58e11,
        pe_ratio: Some(40.8),
        year_high: 299.3,
        year_low: 152.4,
        volume: 95_000_000,
        average_volume: 100_000_000,
        ai: ai(3_970.0, 200.0, 5.0, 3.0, 0.85),
        leverage: leverage(2.3, 0.6, 0.1),
        sentiment: -0.3,
        momentum: 0.2,
        rsi: 74.0,
        macd: -3.1,
        moving_average_50: 185.0,
        moving_average_200: 220.0,
        targets: targets(140.0, 190.0, 260.0),
    },
    Fixture {
        symbol: "IBM",
        name: "International Business Machines Corporation",
        sector: "Technology",
        price: 191.40,
        previous_close: 190.10,
        market_cap: 1.75e11,
        pe_ratio: Some(23.5),
        year_high: 199.2,
        year_low: 128.6,
        volume: 4_000_000,
        average_volume: 4_500_000,
        ai: ai(6_500.0, 1_000.0, 10.0, 2.0, 0.7),
        leverage: leverage(0.7, 0.18, 2.6),
        sentiment: 0.2,
        momentum: 0.35,
        rsi: 50.0,
        macd: 0.0,
        moving_average_50: 188.0,
        moving_average_200: 165.0,
        targets: targets(175.0, 200.0, 215.0),
    },
];

fn fixture(symbol: &str) -> Option<&'static Fixture> {
    let symbol = normalize_symbol(symbol);
    FIXTURES.iter().find(|f| f.symbol == symbol)
}

pub fn fixture_sector(symbol: &str) -> Option<&'static str> {
    fixture(symbol).map(|f| f.sector)
}

/// Symbols with a fixture, in watchlist order.
pub fn fixture_symbols() -> impl Iterator<Item = &'static str> {
    FIXTURES.iter().map(|f| f.symbol)
}

impl Fixture {
    fn technical_indicators(&self) -> TechnicalIndicators {
        let band = (self.year_high - self.year_low) * 0.1;
        TechnicalIndicators {
            rsi: self.rsi,
            macd: self.macd,
            moving_average_50: self.moving_average_50,
            moving_average_200: self.moving_average_200,
            bollinger_bands: BollingerBands {
                upper: self.moving_average_50 + band,
                middle: self.moving_average_50,
                lower: self.moving_average_50 - band,
            },
            volume: VolumeStats::from_current_and_average(
                self.volume as f64,
                self.average_volume as f64,
            ),
        }
    }

    fn market_signals(&self) -> MarketSignals {
        MarketSignals {
            sentiment: Some(self.sentiment),
            momentum: Some(self.momentum),
            volatility: self.leverage.volatility,
        }
    }

    fn record(&self, now: DateTime<Utc>) -> StockRecord {
        let ai_score = scoring::ai_score(Some(&self.ai));
        let growth_score = scoring::growth_score(Some(&self.ai));
        let risk_score = scoring::leverage_risk_score(Some(&self.leverage));

        StockRecord {
            symbol: self.symbol.to_string(),
            name: self.name.to_string(),
            sector: Some(self.sector.to_string()),
            price: self.price,
            previous_close: Some(self.previous_close),
            market_cap: Some(self.market_cap),
            pe_ratio: self.pe_ratio,
            year_high: Some(self.year_high),
            year_low: Some(self.year_low),
            volume: self.volume,
            ai_score,
            growth_score,
            risk_score,
            recommendation: scoring::recommend(ai_score, growth_score, risk_score),
            predicted_price: scoring::predict_price_from_growth_percent(
                Some(self.price),
                self.ai.revenue_growth,
            ),
            historical_prices: historical_prices(self, now),
            ai_metrics: self.ai.clone(),
            market_signals: Some(self.market_signals()),
            technical_indicators: Some(self.technical_indicators()),
            analyst_view: None,
        }
    }

    fn analysis(&self) -> StockAnalysis {
        StockAnalysis {
            symbol: self.symbol.to_string(),
            technical_indicators: TechnicalSnapshot {
                rsi: self.rsi,
                macd: self.macd,
                moving_average_50: self.moving_average_50,
                moving_average_200: self.moving_average_200,
            },
            sentiment_score: round2(Metric::Sentiment.normalize(Some(self.sentiment)) * 100.0),
            buying_opportunity: scoring::buying_opportunity(self.rsi, self.macd),
            risk_level: scoring::risk_level_from_market(
                self.leverage.volatility,
                self.leverage.beta,
            ),
            price_targets: self.targets,
        }
    }
}

// FNV-1a, so seeds are stable across runs and platforms.
fn seed_for(symbol: &str) -> u64 {
    normalize_symbol(symbol)
        .bytes()
        .fold(0xcbf2_9ce4_8422_2325, |h, b| {
            (h ^ u64::from(b)).wrapping_mul(0x0100_0000_01b3)
        })
}

fn rng_for(symbol: &str, salt: u64) -> StdRng {
    StdRng::seed_from_u64(seed_for(symbol) ^ salt)
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Daily closes for the last 30 days, ending at the current price.
fn historical_prices(f: &Fixture, now: DateTime<Utc>) -> Vec<PricePoint> {
    let mut rng = rng_for(f.symbol, 0x4849_5354);
    let today = now.date_naive();
    (0..HISTORY_DAYS)
        .rev()
        .map(|days_ago| {
            let price = if days_ago == 0 {
                f.price
            } else {
                let drift = 1.0 - 0.002 * days_ago as f64;
                round2(f.price * (drift + rng.gen_range(-0.015..0.015)))
            };
            PricePoint {
                date: today - ChronoDuration::days(days_ago),
                price,
                volume: (f.average_volume as f64 * rng.gen_range(0.8..1.2)) as u64,
            }
        })
        .collect()
}

fn generated_technicals(symbol: &str) -> TechnicalIndicators {
    let mut rng = rng_for(symbol, 0x5445_4348);
    let middle = round2(rng.gen_range(10.0..1_000.0));
    let width = middle * rng.gen_range(0.03..0.1);
    TechnicalIndicators {
        rsi: round2(rng.gen_range(0.0..100.0)),
        macd: round2(rng.gen_range(-5.0..5.0)),
        moving_average_50: round2(middle * rng.gen_range(0.95..1.05)),
        moving_average_200: round2(middle * rng.gen_range(0.85..1.15)),
        bollinger_bands: BollingerBands {
            upper: round2(middle + width),
            middle,
            lower: round2(middle - width),
        },
        volume: VolumeStats::from_current_and_average(
            rng.gen_range(0..10_000_000u64) as f64,
            rng.gen_range(1..10_000_000u64) as f64,
        ),
    }
}

pub fn news(symbol: &str, now: DateTime<Utc>) -> Vec<NewsItem> {
    let symbol = normalize_symbol(symbol);
    let items: [(&str, String, &str, &str, NewsSentiment); 4] = [
        (
            "1",
            format!("{symbol} Announces Strong Q4 Earnings"),
            "The company reported better-than-expected earnings, driven by strong growth in their AI division.",
            "Financial Times",
            NewsSentiment::Positive,
        ),
        (
            "2",
            format!("{symbol} Partners with Tech Giant for AI Innovation"),
            "A new strategic partnership aims to accelerate AI development and market expansion.",
            "TechCrunch",
            NewsSentiment::Positive,
        ),
        (
            "3",
            format!("Analysts Raise Price Target for {symbol}"),
            "Multiple analysts have increased their price targets following recent positive developments.",
            "Bloomberg",
            NewsSentiment::Positive,
        ),
        (
            "4",
            format!("{symbol} Faces Regulatory Scrutiny"),
            "The company is under review for compliance with new industry regulations.",
            "Reuters",
            NewsSentiment::Negative,
        ),
    ];

    items
        .into_iter()
        .enumerate()
        .map(|(days_ago, (id, title, summary, source, sentiment))| NewsItem {
            id: id.to_string(),
            title,
            summary: summary.to_string(),
            source: source.to_string(),
            date: now - ChronoDuration::days(days_ago as i64),
            url: format!("https://example.com/news/{id}"),
            sentiment,
        })
        .collect()
}

pub fn social_sentiment() -> SocialSentiment {
    SocialSentiment {
        twitter: PlatformSentiment {
            sentiment: 0.75,
            volume: 12_500,
            trending: true,
        },
        reddit: PlatformSentiment {
            sentiment: 0.65,
            volume: 8_500,
            trending: true,
        },
        overall: 0.70,
    }
}

pub fn news_and_social(symbol: &str, now: DateTime<Utc>) -> NewsAndSocial {
    NewsAndSocial {
        news: news(symbol, now),
        social_sentiment: social_sentiment(),
    }
}

fn competitors() -> Vec<Competitor> {
    [
        ("COMP1", "Competitor One", 25.5, 8.5, 7.8, 6.2),
        ("COMP2", "Competitor Two", 18.3, 7.2, 8.1, 7.5),
        ("COMP3", "Competitor Three", 15.7, 6.8, 6.5, 8.2),
    ]
    .into_iter()
    .map(|(symbol, name, market_share, ai, growth, risk)| Competitor {
        symbol: symbol.to_string(),
        name: name.to_string(),
        market_share,
        comparison: ScoreComparison {
            ai_score: ai,
            growth_score: growth,
            risk_score: risk,
        },
    })
    .collect()
}

/// The enhanced detail tabs. Fixture symbols reuse their fixture technicals; any other
/// symbol gets generated ones.
pub fn enhanced_metrics(symbol: &str, now: DateTime<Utc>) -> StockMetrics {
    let mut rng = rng_for(symbol, 0x454e_4843);

    let technical_indicators = fixture(symbol)
        .map(Fixture::technical_indicators)
        .unwrap_or_else(|| generated_technicals(symbol));

    let dividend_info = DividendInfo {
        dividend_yield: round2(rng.gen_range(0.0..5.0)),
        payout_ratio: round2(rng.gen_range(0.0..100.0)),
        next_dividend_date: now + ChronoDuration::days(15),
        annual_dividend: round2(rng.gen_range(0.0..10.0)),
        dividend_growth: round2(rng.gen_range(0.0..20.0)),
    };

    let top_holders = ["Vanguard Group", "BlackRock", "State Street"]
        .into_iter()
        .map(|name| Holder {
            name: name.to_string(),
            shares: rng.gen_range(0..10_000_000),
            percentage: round2(rng.gen_range(0.0..10.0)),
        })
        .collect();
    let institutional_ownership = InstitutionalOwnership {
        total_shares: rng.gen_range(0..1_000_000_000),
        percentage: round2(rng.gen_range(0.0..100.0)),
        top_holders,
    };

    let estimated_eps = round2(rng.gen_range(0.0..5.0));
    let actual_eps = rng.gen_bool(0.5).then(|| round2(rng.gen_range(0.0..5.0)));
    // Surprise only makes sense once actuals are in.
    let surprise = actual_eps
        .filter(|_| estimated_eps > 0.0)
        .map(|actual| round2((actual - estimated_eps) / estimated_eps * 100.0));
    let earnings_info = EarningsInfo {
        next_earnings_date: now + ChronoDuration::days(30),
        estimated_eps,
        actual_eps,
        surprise,
        year_ahead_estimate: round2(rng.gen_range(0.0..6.0)),
    };

    StockMetrics {
        technical_indicators,
        dividend_info,
        institutional_ownership,
        earnings_info,
        news: news(symbol, now),
        social_sentiment: social_sentiment(),
        competitors: competitors(),
    }
}

pub fn sectors() -> Vec<Sector> {
    [
        ("Technology", 2.5, ["NVDA", "MSFT", "GOOGL"]),
        ("Healthcare", 1.2, ["JNJ", "PFE", "UNH"]),
        ("Finance", -0.8, ["JPM", "BAC", "WFC"]),
        ("Energy", -1.5, ["XOM", "CVX", "COP"]),
    ]
    .into_iter()
    .map(|(name, performance, top)| Sector {
        name: name.to_string(),
        performance,
        top_stocks: top.iter().map(|s| s.to_string()).collect(),
    })
    .collect()
}

#[derive(Debug, Clone, Default)]
pub struct MockStockSource {
    delay: Duration,
}

impl MockStockSource {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(Duration::from_millis(settings.mock_delay_ms))
    }

    async fn simulate_latency(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

#[async_trait::async_trait]
impl StockSource for MockStockSource {
    fn source_name(&self) -> &'static str {
        "mock"
    }

    async fn fetch_stock(&self, symbol: &str) -> Result<StockRecord> {
        self.simulate_latency().await;
        let f = fixture(symbol)
            .ok_or_else(|| anyhow::anyhow!("no fixture for symbol {symbol}"))?;
        Ok(f.record(Utc::now()))
    }

    async fn fetch_analysis(&self, symbol: &str) -> Result<StockAnalysis> {
        self.simulate_latency().await;
        let f = fixture(symbol)
            .ok_or_else(|| anyhow::anyhow!("no fixture for symbol {symbol}"))?;
        Ok(f.analysis())
    }

    async fn fetch_news_and_social(&self, symbol: &str) -> Result<NewsAndSocial> {
        self.simulate_latency().await;
        Ok(news_and_social(symbol, Utc::now()))
    }
}
