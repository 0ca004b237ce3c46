//! Per-session dashboard state and the pure reducer that advances it.
//!
//! `reduce` never performs I/O; callers fetch data and feed the outcome back in as an
//! action. Nothing here is persisted: a session starts empty and is dropped with its owner.

use crate::domain::stock::{StockAnalysis, StockRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const FETCH_STOCKS_ERROR: &str = "Failed to fetch stock data";
pub const FETCH_ANALYSIS_ERROR: &str = "Failed to fetch stock analysis";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub stocks: Vec<StockRecord>,
    pub loading: bool,
    pub error: Option<String>,
    pub selected_stock: Option<String>,
    pub stock_analysis: Option<StockAnalysis>,
    pub watchlist: BTreeSet<String>,
    pub sector_filter: Option<String>,
    /// Fetches started but not yet resolved; `loading` holds while this is non-zero.
    #[serde(skip)]
    pub in_flight_fetches: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionAction {
    FetchStarted,
    FetchSucceeded(Vec<StockRecord>),
    FetchFailed,
    Select(String),
    AnalysisLoaded(StockAnalysis),
    AnalysisFailed,
    AddToWatchlist(String),
    RemoveFromWatchlist(String),
    ToggleWatchlist(String),
    /// `None` clears the filter.
    FilterSector(Option<String>),
    /// Selects the sector, or clears the filter when it is already active.
    ToggleSector(String),
}

pub fn reduce(mut state: SessionState, action: SessionAction) -> SessionState {
    match action {
        SessionAction::FetchStarted => {
            state.in_flight_fetches += 1;
            state.loading = true;
        }
        SessionAction::FetchSucceeded(stocks) => {
            state.settle_fetch();
            state.stocks = stocks;
            state.error = None;
        }
        SessionAction::FetchFailed => {
            state.settle_fetch();
            state.error = Some(FETCH_STOCKS_ERROR.to_string());
        }
        SessionAction::Select(symbol) => {
            let symbol = normalize_symbol(&symbol);
            if state.selected_stock.as_deref() != Some(symbol.as_str()) {
                state.stock_analysis = None;
            }
            state.selected_stock = Some(symbol);
        }
        SessionAction::AnalysisLoaded(analysis) => {
            // A late response for a stock that is no longer selected is dropped.
            if state.selected_stock.as_deref() == Some(analysis.symbol.as_str()) {
                state.stock_analysis = Some(analysis);
                state.error = None;
            }
        }
        SessionAction::AnalysisFailed => {
            state.error = Some(FETCH_ANALYSIS_ERROR.to_string());
        }
        SessionAction::AddToWatchlist(symbol) => {
            state.watchlist.insert(normalize_symbol(&symbol));
        }
        SessionAction::RemoveFromWatchlist(symbol) => {
            state.watchlist.remove(&normalize_symbol(&symbol));
        }
        SessionAction::ToggleWatchlist(symbol) => {
            let symbol = normalize_symbol(&symbol);
            if !state.watchlist.remove(&symbol) {
                state.watchlist.insert(symbol);
            }
        }
        SessionAction::FilterSector(sector) => {
            state.sector_filter = sector.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        }
        SessionAction::ToggleSector(sector) => {
            let sector = sector.trim().to_string();
            let active = state
                .sector_filter
                .as_deref()
                .is_some_and(|f| f.eq_ignore_ascii_case(&sector));
            state.sector_filter = (!active && !sector.is_empty()).then_some(sector);
        }
    }
    state
}

pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_ascii_uppercase()
}

impl SessionState {
    fn settle_fetch(&mut self) {
        self.in_flight_fetches = self.in_flight_fetches.saturating_sub(1);
        self.loading = self.in_flight_fetches > 0;
    }

    pub fn is_watched(&self, symbol: &str) -> bool {
        self.watchlist.contains(&normalize_symbol(symbol))
    }

    pub fn selected_record(&self) -> Option<&StockRecord> {
        let selected = self.selected_stock.as_deref()?;
        self.stocks.iter().find(|s| s.symbol == selected)
    }

    /// Stocks in the watchlist, in dashboard order.
    pub fn watched_stocks(&self) -> Vec<&StockRecord> {
        self.stocks
            .iter()
            .filter(|s| self.watchlist.contains(&s.symbol))
            .collect()
    }

    /// Stocks passing the active sector filter.
    pub fn visible_stocks(&self) -> Vec<&StockRecord> {
        self.stocks
            .iter()
            .filter(|s| match &self.sector_filter {
                None => true,
                Some(f) => s.sector.as_deref().is_some_and(|sec| sec.eq_ignore_ascii_case(f)),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::recommendation::{BuyingOpportunity, Recommendation, RiskLevel};
    use crate::domain::stock::{AiMetrics, PriceTargets, TechnicalSnapshot};

    fn stock(symbol: &str, sector: &str) -> StockRecord {
        StockRecord {
            symbol: symbol.to_string(),
            name: symbol.to_string(),
            sector: Some(sector.to_string()),
            price: 100.0,
            previous_close: Some(99.0),
            market_cap: None,
            pe_ratio: None,
            year_high: None,
            year_low: None,
            volume: 0,
            ai_score: 5.0,
            growth_score: 5.0,
            risk_score: 5.0,
            recommendation: Recommendation::Watch,
            predicted_price: 100.0,
            historical_prices: Vec::new(),
            ai_metrics: AiMetrics::default(),
            market_signals: None,
            technical_indicators: None,
            analyst_view: None,
        }
    }

    fn analysis(symbol: &str) -> StockAnalysis {
        StockAnalysis {
            symbol: symbol.to_string(),
            technical_indicators: TechnicalSnapshot {
                rsi: 50.0,
                macd: 0.0,
                moving_average_50: 0.0,
                moving_average_200: 0.0,
            },
            sentiment_score: 50.0,
            buying_opportunity: BuyingOpportunity::Hold,
            risk_level: RiskLevel::Medium,
            price_targets: PriceTargets {
                low: 1.0,
                medium: 2.0,
                high: 3.0,
            },
        }
    }

    #[test]
    fn new_session_is_empty() {
        let s = SessionState::default();
        assert!(s.watchlist.is_empty());
        assert!(s.stocks.is_empty());
        assert!(!s.loading);
        assert_eq!(s.error, None);
    }

    #[test]
    fn fetch_lifecycle() {
        let s = reduce(SessionState::default(), SessionAction::FetchStarted);
        assert!(s.loading);
        let failed = reduce(s.clone(), SessionAction::FetchFailed);
        assert!(!failed.loading);
        assert_eq!(failed.error.as_deref(), Some(FETCH_STOCKS_ERROR));

        let ok = reduce(failed, SessionAction::FetchSucceeded(vec![stock("NVDA", "Technology")]));
        assert!(!ok.loading);
        assert_eq!(ok.error, None);
        assert_eq!(ok.stocks.len(), 1);
    }

    #[test]
    fn overlapping_fetches_stay_loading_until_the_last_resolves() {
        let s = reduce(SessionState::default(), SessionAction::FetchStarted);
        let s = reduce(s, SessionAction::FetchStarted);
        let s = reduce(s, SessionAction::FetchSucceeded(vec![stock("NVDA", "Technology")]));
        assert!(s.loading);
        assert_eq!(s.stocks.len(), 1);

        let s = reduce(s, SessionAction::FetchFailed);
        assert!(!s.loading);
        assert_eq!(s.in_flight_fetches, 0);

        // An outcome with nothing in flight does not underflow.
        let s = reduce(s, SessionAction::FetchSucceeded(Vec::new()));
        assert!(!s.loading);
        assert_eq!(s.in_flight_fetches, 0);
    }

    #[test]
    fn watchlist_add_is_idempotent_and_remove_is_noop_when_absent() {
        let s = reduce(SessionState::default(), SessionAction::AddToWatchlist("nvda".into()));
        let s = reduce(s, SessionAction::AddToWatchlist("NVDA".into()));
        assert_eq!(s.watchlist.len(), 1);
        assert!(s.is_watched("nvda"));

        let s = reduce(s, SessionAction::RemoveFromWatchlist("MSFT".into()));
        assert_eq!(s.watchlist.len(), 1);
        let s = reduce(s, SessionAction::RemoveFromWatchlist("NVDA".into()));
        assert!(s.watchlist.is_empty());
    }

    #[test]
    fn toggle_flips_membership() {
        let s = reduce(SessionState::default(), SessionAction::ToggleWatchlist("AMD".into()));
        assert!(s.is_watched("AMD"));
        let s = reduce(s, SessionAction::ToggleWatchlist("AMD".into()));
        assert!(!s.is_watched("AMD"));
    }

    #[test]
    fn selecting_another_stock_clears_stale_analysis() {
        let s = reduce(SessionState::default(), SessionAction::Select("NVDA".into()));
        let s = reduce(s, SessionAction::AnalysisLoaded(analysis("NVDA")));
        assert!(s.stock_analysis.is_some());

        let same = reduce(s.clone(), SessionAction::Select("nvda".into()));
        assert!(same.stock_analysis.is_some());

        let other = reduce(s, SessionAction::Select("MSFT".into()));
        assert_eq!(other.selected_stock.as_deref(), Some("MSFT"));
        assert!(other.stock_analysis.is_none());
    }

    #[test]
    fn late_analysis_for_unselected_stock_is_dropped() {
        let s = reduce(SessionState::default(), SessionAction::Select("MSFT".into()));
        let s = reduce(s, SessionAction::AnalysisLoaded(analysis("NVDA")));
        assert!(s.stock_analysis.is_none());
    }

    #[test]
    fn analysis_failure_sets_error() {
        let s = reduce(SessionState::default(), SessionAction::AnalysisFailed);
        assert_eq!(s.error.as_deref(), Some(FETCH_ANALYSIS_ERROR));
    }

    #[test]
    fn sector_filter_and_watched_views() {
        let s = reduce(
            SessionState::default(),
            SessionAction::FetchSucceeded(vec![
                stock("NVDA", "Technology"),
                stock("TSLA", "Automotive"),
                stock("MSFT", "Technology"),
            ]),
        );
        let s = reduce(s, SessionAction::FilterSector(Some("technology".into())));
        let visible: Vec<_> = s.visible_stocks().iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(visible, vec!["NVDA", "MSFT"]);

        let s = reduce(s, SessionAction::FilterSector(Some("  ".into())));
        assert_eq!(s.visible_stocks().len(), 3);

        let s = reduce(s, SessionAction::ToggleSector("Automotive".into()));
        assert_eq!(s.visible_stocks().len(), 1);
        let s = reduce(s, SessionAction::ToggleSector("automotive".into()));
        assert_eq!(s.sector_filter, None);

        let s = reduce(s, SessionAction::AddToWatchlist("TSLA".into()));
        let s = reduce(s, SessionAction::Select("tsla".into()));
        assert_eq!(s.watched_stocks().len(), 1);
        assert_eq!(s.selected_record().map(|r| r.symbol.as_str()), Some("TSLA"));
    }
}
