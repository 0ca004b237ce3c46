use crate::domain::stock::{AiMetrics, LeverageMetrics, MarketSignals, SwotCounts};
use crate::scoring::normalize::Metric;

/// All composite scores live on `0.0..=SCORE_SCALE`.
pub const SCORE_SCALE: f64 = 10.0;

/// Returned when a metrics object is absent altogether.
pub const NEUTRAL_SCORE: f64 = 5.0;

// Weights per score type; each table sums to 1.0.
const AI_WEIGHTS: [(Metric, f64); 5] = [
    (Metric::RndInvestment, 0.3),
    (Metric::PatentCount, 0.2),
    (Metric::MarketShare, 0.2),
    (Metric::RevenueGrowth, 0.2),
    (Metric::AiAdoption, 0.1),
];

const SIGNAL_GROWTH_MOMENTUM: f64 = 0.5;
const SIGNAL_GROWTH_SENTIMENT: f64 = 0.3;
const SIGNAL_GROWTH_STABILITY: f64 = 0.2;

const LEVERAGE_RISK_WEIGHTS: [(Metric, f64); 3] = [
    (Metric::Beta, 0.4),
    (Metric::Volatility, 0.4),
    (Metric::DebtToEquity, 0.2),
];

const SWOT_BASE_RISK: f64 = 5.0;
const SWOT_THREAT_PENALTY: f64 = 0.5;
const SWOT_STRENGTH_CREDIT: f64 = 0.3;

/// `Σ weight * normalized * 10`, clamped to the score interval.
fn compose(parts: impl IntoIterator<Item = (f64, f64)>) -> f64 {
    let sum: f64 = parts.into_iter().map(|(w, n)| w * n).sum();
    clamp_score(sum * SCORE_SCALE)
}

pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        return NEUTRAL_SCORE;
    }
    score.clamp(0.0, SCORE_SCALE)
}

pub fn ai_score(metrics: Option<&AiMetrics>) -> f64 {
    let Some(m) = metrics else {
        return NEUTRAL_SCORE;
    };
    compose(AI_WEIGHTS.iter().map(|(metric, w)| {
        let raw = match metric {
            Metric::RndInvestment => m.rnd_investment,
            Metric::PatentCount => m.patent_count,
            Metric::MarketShare => m.market_share,
            Metric::RevenueGrowth => m.revenue_growth,
            _ => m.ai_adoption,
        };
        (*w, metric.normalize(raw))
    }))
}

/// Revenue growth alone: 100% YoY or more scores 10, shrinking revenue scores 0.
pub fn growth_score(metrics: Option<&AiMetrics>) -> f64 {
    let Some(m) = metrics else {
        return NEUTRAL_SCORE;
    };
    compose([(1.0, Metric::RevenueGrowth.normalize(m.revenue_growth))])
}

/// Growth outlook from market behaviour; calmer price action counts in favour.
pub fn signal_growth_score(signals: Option<&MarketSignals>) -> f64 {
    let Some(s) = signals else {
        return NEUTRAL_SCORE;
    };
    compose([
        (SIGNAL_GROWTH_MOMENTUM, Metric::Momentum.normalize(s.momentum)),
        (SIGNAL_GROWTH_SENTIMENT, Metric::Sentiment.normalize(s.sentiment)),
        (
            SIGNAL_GROWTH_STABILITY,
            1.0 - Metric::Volatility.normalize(s.volatility),
        ),
    ])
}

pub fn leverage_risk_score(metrics: Option<&LeverageMetrics>) -> f64 {
    let Some(m) = metrics else {
        return NEUTRAL_SCORE;
    };
    compose(LEVERAGE_RISK_WEIGHTS.iter().map(|(metric, w)| {
        let raw = match metric {
            Metric::Beta => m.beta,
            Metric::Volatility => m.volatility,
            _ => m.debt_to_equity,
        };
        (*w, metric.normalize(raw))
    }))
}

/// Heuristic, not a statistical model: start at mid-scale, add 0.5 per threat and
/// subtract 0.3 per strength.
pub fn swot_risk_score(swot: Option<&SwotCounts>) -> f64 {
    let Some(s) = swot else {
        return SWOT_BASE_RISK;
    };
    let raw = SWOT_BASE_RISK + (s.threats as f64) * SWOT_THREAT_PENALTY
        - (s.strengths as f64) * SWOT_STRENGTH_CREDIT;
    clamp_score(raw)
}

/// `current * (1 + growth_rate)` with the rate as a fraction. Unbounded on purpose: a
/// large growth figure produces a large projection.
pub fn predict_price(current_price: f64, growth_rate: f64) -> f64 {
    current_price * (1.0 + growth_rate)
}

/// Projection from a percent growth figure. No usable price means nothing to project (0).
pub fn predict_price_from_growth_percent(
    current_price: Option<f64>,
    growth_percent: Option<f64>,
) -> f64 {
    let Some(price) = current_price.filter(|p| p.is_finite() && *p > 0.0) else {
        return 0.0;
    };
    let growth = growth_percent.filter(|g| g.is_finite()).unwrap_or(0.0);
    predict_price(price, growth / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    fn full_metrics() -> AiMetrics {
        AiMetrics {
            rnd_investment: Some(8_000.0),
            patent_count: Some(500.0),
            market_share: Some(80.0),
            revenue_growth: Some(120.0),
            ai_adoption: Some(0.9),
        }
    }

    #[test]
    fn missing_metrics_yield_neutral_default() {
        assert_eq!(ai_score(None), NEUTRAL_SCORE);
        assert_eq!(growth_score(None), NEUTRAL_SCORE);
        assert_eq!(signal_growth_score(None), NEUTRAL_SCORE);
        assert_eq!(leverage_risk_score(None), NEUTRAL_SCORE);
        assert_eq!(swot_risk_score(None), 5.0);
    }

    #[test]
    fn ai_score_is_weighted_sum() {
        // 0.8*0.3 + 0.5*0.2 + 0.8*0.2 + 1.0*0.2 + 0.9*0.1 = 0.79
        assert_close(ai_score(Some(&full_metrics())), 7.9);
    }

    #[test]
    fn empty_metrics_object_scores_at_midpoint() {
        assert_close(ai_score(Some(&AiMetrics::default())), 5.0);
        assert_close(growth_score(Some(&AiMetrics::default())), 5.0);
    }

    #[test]
    fn scores_stay_in_range_for_extreme_inputs() {
        let extremes = [-1e12, -1.0, 0.0, 1e12, f64::NAN, f64::INFINITY, f64::NEG_INFINITY];
        for &v in &extremes {
            let m = AiMetrics {
                rnd_investment: Some(v),
                patent_count: Some(v),
                market_share: Some(v),
                revenue_growth: Some(v),
                ai_adoption: Some(v),
            };
            let s = MarketSignals {
                sentiment: Some(v),
                momentum: Some(v),
                volatility: Some(v),
            };
            let l = LeverageMetrics {
                beta: Some(v),
                volatility: Some(v),
                debt_to_equity: Some(v),
            };
            for score in [
                ai_score(Some(&m)),
                growth_score(Some(&m)),
                signal_growth_score(Some(&s)),
                leverage_risk_score(Some(&l)),
            ] {
                assert!((0.0..=SCORE_SCALE).contains(&score), "{v} -> {score}");
            }
        }
    }

    #[test]
    fn growth_score_tracks_revenue_growth() {
        let m = |g| AiMetrics {
            revenue_growth: Some(g),
            ..AiMetrics::default()
        };
        assert_close(growth_score(Some(&m(25.0))), 2.5);
        assert_eq!(growth_score(Some(&m(-30.0))), 0.0);
        assert_eq!(growth_score(Some(&m(400.0))), 10.0);
    }

    #[test]
    fn signal_growth_rewards_momentum_and_calm() {
        let s = MarketSignals {
            sentiment: Some(1.0),
            momentum: Some(1.0),
            volatility: Some(0.0),
        };
        assert_close(signal_growth_score(Some(&s)), 10.0);
        let s = MarketSignals {
            sentiment: Some(-1.0),
            momentum: Some(0.0),
            volatility: Some(1.0),
        };
        assert_close(signal_growth_score(Some(&s)), 0.0);
    }

    #[test]
    fn leverage_risk_is_weighted() {
        let l = LeverageMetrics {
            beta: Some(1.5),
            volatility: Some(0.25),
            debt_to_equity: Some(0.0),
        };
        // 0.5*0.4 + 0.25*0.4 + 0 = 0.3
        assert_close(leverage_risk_score(Some(&l)), 3.0);
    }

    #[test]
    fn swot_risk_adjusts_from_base() {
        assert_eq!(swot_risk_score(Some(&SwotCounts::default())), 5.0);
        let s = SwotCounts {
            strengths: 2,
            threats: 4,
            ..SwotCounts::default()
        };
        assert_close(swot_risk_score(Some(&s)), 6.4);
        let many_threats = SwotCounts {
            threats: 40,
            ..SwotCounts::default()
        };
        assert_eq!(swot_risk_score(Some(&many_threats)), 10.0);
        let many_strengths = SwotCounts {
            strengths: 40,
            ..SwotCounts::default()
        };
        assert_eq!(swot_risk_score(Some(&many_strengths)), 0.0);
    }

    #[test]
    fn price_prediction() {
        assert_eq!(predict_price(100.0, 0.0), 100.0);
        assert_close(predict_price(100.0, 0.2), 120.0);
        assert_close(predict_price(10.0, 50.0), 510.0);
        assert_close(predict_price_from_growth_percent(Some(200.0), Some(25.0)), 250.0);
        assert_eq!(predict_price_from_growth_percent(Some(200.0), None), 200.0);
        assert_eq!(predict_price_from_growth_percent(None, Some(25.0)), 0.0);
        assert_eq!(predict_price_from_growth_percent(Some(0.0), Some(25.0)), 0.0);
    }
}
