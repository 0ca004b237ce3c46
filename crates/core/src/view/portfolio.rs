use crate::domain::recommendation::RiskLevel;
use crate::domain::stock::StockRecord;
use crate::scoring;
use serde::Serialize;

/// Aggregates over a set of stocks; averages are `None` for an empty set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioMetrics {
    pub total_value: f64,
    pub average_risk: Option<f64>,
    pub average_growth: Option<f64>,
    pub average_ai: Option<f64>,
    pub risk_level: Option<RiskLevel>,
    pub count: usize,
}

pub fn portfolio_metrics<'a>(stocks: impl IntoIterator<Item = &'a StockRecord>) -> PortfolioMetrics {
    let mut total_value = 0.0;
    let (mut risk, mut growth, mut ai) = (0.0, 0.0, 0.0);
    let mut count = 0usize;
    for s in stocks {
        total_value += s.price;
        risk += s.risk_score;
        growth += s.growth_score;
        ai += s.ai_score;
        count += 1;
    }

    let avg = |sum: f64| (count > 0).then(|| sum / count as f64);
    let average_risk = avg(risk);
    PortfolioMetrics {
        total_value,
        average_risk,
        average_growth: avg(growth),
        average_ai: avg(ai),
        risk_level: average_risk.map(scoring::risk_level_from_score),
        count,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRow {
    pub symbol: String,
    pub name: String,
    pub price: f64,
    pub ai_score: f64,
    pub shares: u64,
    pub value: f64,
    pub remaining: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchasePlan {
    pub amount: f64,
    pub rows: Vec<PurchaseRow>,
    pub total_value: f64,
    pub total_remaining: f64,
}

/// Whole shares affordable with `amount` at `price`, the value spent, and the change left.
/// Fees and taxes are not modelled.
pub fn calculate_purchase(price: f64, amount: f64) -> (u64, f64, f64) {
    if !(price.is_finite() && price > 0.0) || !(amount.is_finite() && amount > 0.0) {
        return (0, 0.0, amount.max(0.0));
    }
    let shares = (amount / price).floor();
    let value = shares * price;
    (shares as u64, value, amount - value)
}

/// Each row answers "what if the whole amount went into this stock".
pub fn purchase_plan<'a>(
    stocks: impl IntoIterator<Item = &'a StockRecord>,
    amount: f64,
) -> PurchasePlan {
    let rows: Vec<PurchaseRow> = stocks
        .into_iter()
        .map(|s| {
            let (shares, value, remaining) = calculate_purchase(s.price, amount);
            PurchaseRow {
                symbol: s.symbol.clone(),
                name: s.name.clone(),
                price: s.price,
                ai_score: s.ai_score,
                shares,
                value,
                remaining,
            }
        })
        .collect();

    PurchasePlan {
        amount,
        total_value: rows.iter().map(|r| r.value).sum(),
        total_remaining: rows.iter().map(|r| r.remaining).sum(),
        rows,
    }
}

/// Accepts only digits with at most one decimal point; an empty string is zero.
pub fn parse_amount(input: &str) -> Option<f64> {
    let s = input.trim();
    let valid = s.chars().all(|c| c.is_ascii_digit() || c == '.')
        && s.chars().filter(|c| *c == '.').count() <= 1;
    if !valid {
        return None;
    }
    if s.is_empty() || s == "." {
        return Some(0.0);
    }
    s.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::recommendation::Recommendation;
    use crate::domain::stock::AiMetrics;

    fn stock(symbol: &str, price: f64, ai: f64, growth: f64, risk: f64) -> StockRecord {
        StockRecord {
            symbol: symbol.to_string(),
            name: format!("{symbol} Inc."),
            sector: None,
            price,
            previous_close: None,
            market_cap: None,
            pe_ratio: None,
            year_high: None,
            year_low: None,
            volume: 0,
            ai_score: ai,
            growth_score: growth,
            risk_score: risk,
            recommendation: Recommendation::Hold,
            predicted_price: price,
            historical_prices: Vec::new(),
            ai_metrics: AiMetrics::default(),
            market_signals: None,
            technical_indicators: None,
            analyst_view: None,
        }
    }

    #[test]
    fn averages_scores() {
        let stocks = vec![stock("A", 100.0, 8.0, 6.0, 4.0), stock("B", 50.0, 6.0, 8.0, 8.0)];
        let m = portfolio_metrics(&stocks);
        assert_eq!(m.total_value, 150.0);
        assert_eq!(m.average_ai, Some(7.0));
        assert_eq!(m.average_growth, Some(7.0));
        assert_eq!(m.average_risk, Some(6.0));
        assert_eq!(m.risk_level, Some(RiskLevel::Medium));
        assert_eq!(m.count, 2);
    }

    #[test]
    fn empty_portfolio_has_no_averages() {
        let m = portfolio_metrics(&[]);
        assert_eq!(m.total_value, 0.0);
        assert_eq!(m.average_risk, None);
        assert_eq!(m.risk_level, None);
    }

    #[test]
    fn purchase_floors_shares() {
        let (shares, value, remaining) = calculate_purchase(175.5, 10_000.0);
        assert_eq!(shares, 56);
        assert_eq!(value, 56.0 * 175.5);
        assert!((value + remaining - 10_000.0).abs() < 1e-9);
    }

    #[test]
    fn purchase_with_unusable_price_spends_nothing() {
        assert_eq!(calculate_purchase(0.0, 500.0), (0, 0.0, 500.0));
        assert_eq!(calculate_purchase(10.0, 0.0), (0, 0.0, 0.0));
    }

    #[test]
    fn plan_totals() {
        let stocks = vec![stock("A", 300.0, 5.0, 5.0, 5.0), stock("B", 400.0, 5.0, 5.0, 5.0)];
        let plan = purchase_plan(&stocks, 1_000.0);
        assert_eq!(plan.rows[0].shares, 3);
        assert_eq!(plan.rows[1].shares, 2);
        assert_eq!(plan.total_value, 1_700.0);
        assert_eq!(plan.total_remaining, 300.0);
    }

    #[test]
    fn parses_amount_input() {
        assert_eq!(parse_amount("10000"), Some(10_000.0));
        assert_eq!(parse_amount("12.5"), Some(12.5));
        assert_eq!(parse_amount(""), Some(0.0));
        assert_eq!(parse_amount("1.2.3"), None);
        assert_eq!(parse_amount("-5"), None);
        assert_eq!(parse_amount("1e3"), None);
    }
}
