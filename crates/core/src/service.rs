//! Fetches the AI watchlist through a [`StockSource`] and turns each outcome into a
//! [`SessionAction`]. Callers that share session state apply the actions themselves so no
//! lock has to be held while a fetch is in flight.

use crate::config::{DataSource, Settings};
use crate::domain::stock::StockRecord;
use crate::ingest::analyst::LlmAnalystSource;
use crate::ingest::mock::MockStockSource;
use crate::ingest::provider::HttpMarketDataProvider;
use crate::ingest::StockSource;
use crate::llm;
use crate::session::{normalize_symbol, reduce, SessionAction, SessionState};
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::task::JoinSet;

pub const AI_WATCHLIST: [&str; 10] = [
    "NVDA", "GOOGL", "MSFT", "AMD", "AI", "PLTR", "META", "CRM", "TSLA", "IBM",
];

pub fn source_from_settings(settings: &Settings) -> Result<Arc<dyn StockSource>> {
    Ok(match settings.data_source {
        DataSource::Mock => Arc::new(MockStockSource::from_settings(settings)),
        DataSource::Market => Arc::new(HttpMarketDataProvider::from_settings(settings)?),
        DataSource::Llm => Arc::new(LlmAnalystSource::new(llm::client_from_settings(settings)?)),
    })
}

#[derive(Clone)]
pub struct Dashboard {
    source: Arc<dyn StockSource>,
}

impl Dashboard {
    pub fn new(source: Arc<dyn StockSource>) -> Self {
        Self { source }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self::new(source_from_settings(settings)?))
    }

    pub fn source(&self) -> &dyn StockSource {
        self.source.as_ref()
    }

    /// Every watchlist symbol, fetched concurrently and returned in watchlist order. One
    /// failed symbol fails the whole load.
    pub async fn load_stocks(&self) -> Result<Vec<StockRecord>> {
        let mut set = JoinSet::new();
        for (idx, symbol) in AI_WATCHLIST.iter().copied().enumerate() {
            let source = Arc::clone(&self.source);
            set.spawn(async move { (idx, symbol, source.fetch_stock(symbol).await) });
        }

        let mut slots: Vec<Option<StockRecord>> = vec![None; AI_WATCHLIST.len()];
        while let Some(joined) = set.join_next().await {
            let (idx, symbol, res) = joined.context("stock fetch task failed")?;
            let record = res.with_context(|| format!("failed to fetch {symbol}"))?;
            slots[idx] = Some(record);
        }
        Ok(slots.into_iter().flatten().collect())
    }

    pub async fn load_outcome(&self) -> SessionAction {
        match self.load_stocks().await {
            Ok(stocks) => {
                tracing::info!(source = self.source.source_name(), count = stocks.len(), "stocks loaded");
                SessionAction::FetchSucceeded(stocks)
            }
            Err(err) => {
                tracing::error!(source = self.source.source_name(), error = %format!("{err:#}"), "error fetching stock data");
                SessionAction::FetchFailed
            }
        }
    }

    pub async fn analysis_outcome(&self, symbol: &str) -> SessionAction {
        let symbol = normalize_symbol(symbol);
        match self.source.fetch_analysis(&symbol).await {
            Ok(analysis) => SessionAction::AnalysisLoaded(analysis),
            Err(err) => {
                tracing::error!(%symbol, error = %format!("{err:#}"), "error fetching stock analysis");
                SessionAction::AnalysisFailed
            }
        }
    }

    pub async fn refresh(&self, state: SessionState) -> SessionState {
        let state = reduce(state, SessionAction::FetchStarted);
        reduce(state, self.load_outcome().await)
    }

    pub async fn select(&self, state: SessionState, symbol: &str) -> SessionState {
        let state = reduce(state, SessionAction::Select(symbol.to_string()));
        reduce(state, self.analysis_outcome(symbol).await)
    }
}
