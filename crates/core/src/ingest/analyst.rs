use crate::domain::stock::{StockAnalysis, StockRecord};
use crate::ingest::{mock, StockSource};
use crate::llm::LlmClient;
use anyhow::Result;
use std::sync::Arc;

/// Asks a model for company and technical analysis, then scores it like any other source.
pub struct LlmAnalystSource {
    client: Arc<dyn LlmClient>,
}

impl LlmAnalystSource {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl StockSource for LlmAnalystSource {
    fn source_name(&self) -> &'static str {
        "llm_analyst"
    }

    async fn fetch_stock(&self, symbol: &str) -> Result<StockRecord> {
        let analysis = self.client.analyze_company(symbol).await?;
        tracing::debug!(symbol, provider = ?self.client.provider(), "company analysis received");
        let mut record = analysis.validate_and_into_record(symbol)?;
        // The model has no notion of our sector taxonomy; borrow it from the fixtures when known.
        if record.sector.is_none() {
            record.sector = mock::fixture_sector(&record.symbol).map(str::to_string);
        }
        Ok(record)
    }

    async fn fetch_analysis(&self, symbol: &str) -> Result<StockAnalysis> {
        let analysis = self.client.analyze_technicals(symbol).await?;
        analysis.validate_and_into_analysis(symbol)
    }
}
