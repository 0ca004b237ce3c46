//! Derived view data for dashboard panels: formatting, portfolio aggregates, the purchase
//! calculator and chart series.

pub mod chart;
pub mod format;
pub mod portfolio;

pub use chart::{chart_series, sector_counts, ChartMetric};
pub use portfolio::{portfolio_metrics, purchase_plan, PortfolioMetrics, PurchasePlan};
