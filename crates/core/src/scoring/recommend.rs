use crate::domain::recommendation::{BuyingOpportunity, Recommendation, RiskLevel};

struct Tier {
    label: Recommendation,
    min_ai: f64,
    min_growth: f64,
    max_risk: f64,
}

// Evaluated top-down; thresholds are inclusive so boundary values land in the higher tier.
const LADDER: [Tier; 3] = [
    Tier {
        label: Recommendation::StrongBuy,
        min_ai: 8.0,
        min_growth: 7.0,
        max_risk: 5.0,
    },
    Tier {
        label: Recommendation::Buy,
        min_ai: 7.0,
        min_growth: 6.0,
        max_risk: 6.0,
    },
    Tier {
        label: Recommendation::Hold,
        min_ai: 6.0,
        min_growth: 5.0,
        max_risk: 7.0,
    },
];

pub fn recommend(ai_score: f64, growth_score: f64, risk_score: f64) -> Recommendation {
    LADDER
        .iter()
        .find(|t| ai_score >= t.min_ai && growth_score >= t.min_growth && risk_score <= t.max_risk)
        .map_or(Recommendation::Watch, |t| t.label)
}

pub const RSI_OVERSOLD: f64 = 30.0;
pub const RSI_OVERBOUGHT: f64 = 70.0;

pub fn buying_opportunity(rsi: f64, macd: f64) -> BuyingOpportunity {
    if rsi <= RSI_OVERSOLD && macd >= 0.0 {
        BuyingOpportunity::StrongBuy
    } else if rsi >= RSI_OVERBOUGHT && macd <= 0.0 {
        BuyingOpportunity::StrongSell
    } else if macd > 0.0 && rsi < RSI_OVERBOUGHT {
        BuyingOpportunity::Buy
    } else if macd < 0.0 && rsi > RSI_OVERSOLD {
        BuyingOpportunity::Sell
    } else {
        BuyingOpportunity::Hold
    }
}

/// Risk level from volatility (fraction) and beta. Missing inputs cannot raise the level;
/// with neither available the result is the midpoint.
pub fn risk_level_from_market(volatility: Option<f64>, beta: Option<f64>) -> RiskLevel {
    let volatility = volatility.filter(|v| v.is_finite());
    let beta = beta.filter(|b| b.is_finite());
    if volatility.is_none() && beta.is_none() {
        return RiskLevel::Medium;
    }
    let vol = volatility.unwrap_or(f64::NEG_INFINITY);
    let beta = beta.unwrap_or(f64::NEG_INFINITY);
    if vol >= 0.5 || beta >= 1.5 {
        RiskLevel::High
    } else if vol >= 0.3 || beta >= 1.0 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

pub fn risk_level_from_score(risk_score: f64) -> RiskLevel {
    if risk_score >= 7.0 {
        RiskLevel::High
    } else if risk_score >= 4.0 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documented_examples() {
        assert_eq!(recommend(9.0, 8.0, 4.0), Recommendation::StrongBuy);
        assert_eq!(recommend(5.0, 5.0, 6.0), Recommendation::Watch);
    }

    #[test]
    fn boundaries_land_in_higher_tier() {
        assert_eq!(recommend(8.0, 7.0, 5.0), Recommendation::StrongBuy);
        assert_eq!(recommend(7.0, 6.0, 6.0), Recommendation::Buy);
        assert_eq!(recommend(6.0, 5.0, 7.0), Recommendation::Hold);
        assert_eq!(recommend(5.999, 5.0, 7.0), Recommendation::Watch);
    }

    #[test]
    fn first_matching_tier_wins() {
        // Strong Buy scores blocked by risk fall to the next tier that admits them.
        assert_eq!(recommend(9.5, 9.5, 5.5), Recommendation::Buy);
        assert_eq!(recommend(9.5, 9.5, 6.5), Recommendation::Hold);
        assert_eq!(recommend(9.5, 9.5, 7.5), Recommendation::Watch);
    }

    #[test]
    fn recommendation_is_deterministic() {
        for _ in 0..3 {
            assert_eq!(recommend(7.2, 6.1, 5.9), Recommendation::Buy);
        }
    }

    #[test]
    fn nan_scores_fall_to_lowest_tier() {
        assert_eq!(recommend(f64::NAN, 9.0, 1.0), Recommendation::Watch);
    }

    #[test]
    fn buying_opportunity_ladder() {
        assert_eq!(buying_opportunity(25.0, 0.5), BuyingOpportunity::StrongBuy);
        assert_eq!(buying_opportunity(30.0, 0.0), BuyingOpportunity::StrongBuy);
        assert_eq!(buying_opportunity(75.0, -1.0), BuyingOpportunity::StrongSell);
        assert_eq!(buying_opportunity(55.0, 2.5), BuyingOpportunity::Buy);
        assert_eq!(buying_opportunity(55.0, -2.5), BuyingOpportunity::Sell);
        assert_eq!(buying_opportunity(75.0, 1.0), BuyingOpportunity::Hold);
        assert_eq!(buying_opportunity(25.0, -1.0), BuyingOpportunity::Hold);
        assert_eq!(buying_opportunity(50.0, 0.0), BuyingOpportunity::Hold);
    }

    #[test]
    fn risk_level_from_market_thresholds() {
        assert_eq!(risk_level_from_market(Some(0.2), Some(0.8)), RiskLevel::Low);
        assert_eq!(risk_level_from_market(Some(0.3), Some(0.8)), RiskLevel::Medium);
        assert_eq!(risk_level_from_market(Some(0.1), Some(1.6)), RiskLevel::High);
        assert_eq!(risk_level_from_market(Some(0.5), None), RiskLevel::High);
        assert_eq!(risk_level_from_market(None, Some(0.5)), RiskLevel::Low);
        assert_eq!(risk_level_from_market(None, None), RiskLevel::Medium);
    }

    #[test]
    fn risk_level_from_score_thresholds() {
        assert_eq!(risk_level_from_score(3.9), RiskLevel::Low);
        assert_eq!(risk_level_from_score(4.0), RiskLevel::Medium);
        assert_eq!(risk_level_from_score(7.0), RiskLevel::High);
    }
}
