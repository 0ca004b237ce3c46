//! Data sources. Each one reshapes its upstream into [`StockRecord`] and [`StockAnalysis`];
//! scoring always goes through `crate::scoring` so every source lands on the same scale.

pub mod analyst;
pub mod mock;
pub mod provider;
pub mod types;

use crate::domain::enhanced::{NewsAndSocial, StockMetrics};
use crate::domain::stock::{StockAnalysis, StockRecord};
use anyhow::Result;

#[async_trait::async_trait]
pub trait StockSource: Send + Sync {
    fn source_name(&self) -> &'static str;

    async fn fetch_stock(&self, symbol: &str) -> Result<StockRecord>;

    async fn fetch_analysis(&self, symbol: &str) -> Result<StockAnalysis>;

    /// No upstream reports the enhanced tabs, so every source serves the generated ones.
    async fn fetch_metrics(&self, symbol: &str) -> Result<StockMetrics> {
        Ok(mock::enhanced_metrics(symbol, chrono::Utc::now()))
    }

    async fn fetch_news_and_social(&self, symbol: &str) -> Result<NewsAndSocial> {
        Ok(mock::news_and_social(symbol, chrono::Utc::now()))
    }
}
