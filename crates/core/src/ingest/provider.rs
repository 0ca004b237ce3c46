use crate::config::Settings;
use crate::domain::stock::{
    AiMetrics, LeverageMetrics, PriceTargets, StockAnalysis, StockRecord, TechnicalSnapshot,
};
use crate::ingest::types::{CompanyOverview, GlobalQuote, GlobalQuoteResponse, IndicatorSeries};
use crate::ingest::StockSource;
use crate::scoring;
use crate::session::normalize_symbol;
use anyhow::{Context, Result};
use serde_json::Value;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const NEUTRAL_SENTIMENT: f64 = 50.0;

/// Keys the API uses in a 200 response to report a failure instead of data.
const API_ERROR_KEYS: [&str; 3] = ["Error Message", "Note", "Information"];

/// Alpha Vantage-style REST client. One attempt per call: a failure is surfaced, not retried.
#[derive(Debug, Clone)]
pub struct HttpMarketDataProvider {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpMarketDataProvider {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let base_url = settings.require_market_data_base_url()?.to_string();
        let api_key = settings.require_market_data_api_key()?.to_string();

        let timeout_secs = std::env::var("MARKET_DATA_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build market data http client")?;

        Ok(Self {
            http,
            base_url,
            api_key,
        })
    }

    async fn query(&self, function: &str, symbol: &str, extra: &[(&str, &str)]) -> Result<Value> {
        let mut params: Vec<(&str, &str)> = vec![
            ("function", function),
            ("symbol", symbol),
            ("apikey", self.api_key.as_str()),
        ];
        params.extend_from_slice(extra);

        let res = self
            .http
            .get(&self.base_url)
            .query(&params)
            .send()
            .await
            .with_context(|| format!("market data request failed: function={function}"))?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read market data response")?;
        if !status.is_success() {
            anyhow::bail!("market data HTTP {status} for {function} {symbol}: {text}");
        }
        let raw_json = serde_json::from_str::<Value>(&text)
            .with_context(|| format!("market data response is not valid JSON: {text}"))?;
        check_api_error(&raw_json)?;
        Ok(raw_json)
    }

    async fn quote(&self, symbol: &str) -> Result<GlobalQuote> {
        let raw = self.query("GLOBAL_QUOTE", symbol, &[]).await?;
        let parsed = serde_json::from_value::<GlobalQuoteResponse>(raw)
            .context("failed to parse GLOBAL_QUOTE response")?;
        parsed
            .quote
            .filter(|q| q.price.is_some())
            .with_context(|| format!("no quote returned for {symbol}"))
    }

    async fn overview(&self, symbol: &str) -> Result<CompanyOverview> {
        let raw = self.query("OVERVIEW", symbol, &[]).await?;
        serde_json::from_value::<CompanyOverview>(raw).context("failed to parse OVERVIEW response")
    }

    async fn indicator(
        &self,
        function: &str,
        symbol: &str,
        extra: &[(&str, &str)],
    ) -> Result<IndicatorSeries> {
        let mut raw = self.query(function, symbol, extra).await?;
        let key = format!("Technical Analysis: {function}");
        let series = raw
            .get_mut(&key)
            .map(Value::take)
            .with_context(|| format!("no {function} data for {symbol}"))?;
        serde_json::from_value::<IndicatorSeries>(series)
            .with_context(|| format!("failed to parse {function} series"))
    }
}

fn check_api_error(raw: &Value) -> Result<()> {
    for key in API_ERROR_KEYS {
        if let Some(msg) = raw.get(key).and_then(Value::as_str) {
            anyhow::bail!("market data API {key}: {msg}");
        }
    }
    Ok(())
}

pub fn build_record(symbol: &str, quote: &GlobalQuote, overview: &CompanyOverview) -> StockRecord {
    let symbol = normalize_symbol(symbol);
    let price = quote.price.filter(|p| *p >= 0.0).unwrap_or(0.0);

    // The overview reports growth as a fraction; AI metrics use percent.
    let ai_metrics = AiMetrics {
        revenue_growth: overview.quarterly_revenue_growth_yoy.map(|g| g * 100.0),
        ..AiMetrics::default()
    };
    let leverage = LeverageMetrics {
        beta: overview.beta,
        ..LeverageMetrics::default()
    };

    let ai_score = scoring::ai_score(Some(&ai_metrics));
    let growth_score = scoring::growth_score(Some(&ai_metrics));
    let risk_score = scoring::leverage_risk_score(Some(&leverage));

    StockRecord {
        name: overview
            .name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| symbol.clone()),
        sector: overview.sector.clone().filter(|s| !s.trim().is_empty()),
        price,
        previous_close: quote.previous_close,
        market_cap: overview.market_capitalization,
        pe_ratio: overview.pe_ratio,
        year_high: overview.week_52_high,
        year_low: overview.week_52_low,
        volume: quote.volume.filter(|v| *v >= 0.0).map_or(0, |v| v as u64),
        ai_score,
        growth_score,
        risk_score,
        recommendation: scoring::recommend(ai_score, growth_score, risk_score),
        predicted_price: scoring::predict_price_from_growth_percent(
            quote.price,
            ai_metrics.revenue_growth,
        ),
        historical_prices: Vec::new(),
        ai_metrics,
        market_signals: None,
        technical_indicators: None,
        analyst_view: None,
        symbol,
    }
}

pub struct IndicatorReadings {
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub sma_50: Option<f64>,
    pub sma_200: Option<f64>,
}

pub fn build_analysis(
    symbol: &str,
    quote: &GlobalQuote,
    overview: &CompanyOverview,
    readings: &IndicatorReadings,
) -> StockAnalysis {
    let rsi = readings.rsi.unwrap_or(50.0).clamp(0.0, 100.0);
    let macd = readings.macd.unwrap_or(0.0);
    let price = quote.price.unwrap_or(0.0);

    let low = overview.week_52_low.unwrap_or(price);
    let high = overview.week_52_high.unwrap_or(price);
    let medium = overview.analyst_target_price.unwrap_or(price);

    StockAnalysis {
        symbol: normalize_symbol(symbol),
        technical_indicators: TechnicalSnapshot {
            rsi,
            macd,
            moving_average_50: readings.sma_50.unwrap_or(0.0),
            moving_average_200: readings.sma_200.unwrap_or(0.0),
        },
        // The API has no sentiment feed.
        sentiment_score: NEUTRAL_SENTIMENT,
        buying_opportunity: scoring::buying_opportunity(rsi, macd),
        risk_level: scoring::risk_level_from_market(None, overview.beta),
        price_targets: PriceTargets { low, medium, high },
    }
}

#[async_trait::async_trait]
impl StockSource for HttpMarketDataProvider {
    fn source_name(&self) -> &'static str {
        "market_data_http"
    }

    async fn fetch_stock(&self, symbol: &str) -> Result<StockRecord> {
        let symbol = normalize_symbol(symbol);
        let (quote, overview) = tokio::try_join!(self.quote(&symbol), self.overview(&symbol))?;
        Ok(build_record(&symbol, &quote, &overview))
    }

    async fn fetch_analysis(&self, symbol: &str) -> Result<StockAnalysis> {
        let symbol = normalize_symbol(symbol);
        let daily = [("interval", "daily"), ("series_type", "close")];
        let rsi_params = [daily[0], daily[1], ("time_period", "14")];
        let sma_50_params = [daily[0], daily[1], ("time_period", "50")];
        let sma_200_params = [daily[0], daily[1], ("time_period", "200")];
        let (quote, overview, rsi, macd, sma_50, sma_200) = tokio::try_join!(
            self.quote(&symbol),
            self.overview(&symbol),
            self.indicator("RSI", &symbol, &rsi_params),
            self.indicator("MACD", &symbol, &daily),
            self.indicator("SMA", &symbol, &sma_50_params),
            self.indicator("SMA", &symbol, &sma_200_params),
        )?;

        let readings = IndicatorReadings {
            rsi: rsi.latest("RSI"),
            macd: macd.latest("MACD"),
            sma_50: sma_50.latest("SMA"),
            sma_200: sma_200.latest("SMA"),
        };
        Ok(build_analysis(&symbol, &quote, &overview, &readings))
    }
}
