//! Raw metric to [0, 1] normalization.
//!
//! Every metric has an assumed upper bound. Values are divided by that bound and clamped on
//! both ends, so out-of-range inputs (negative growth, R&D above the bound) can never push a
//! composite score outside its interval. Missing or non-finite inputs fall back to the
//! metric's neutral midpoint instead of zero.

/// Neutral normalized value used for any metric the source did not report.
pub const NEUTRAL: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    /// Millions USD.
    RndInvestment,
    PatentCount,
    /// Percent.
    MarketShare,
    /// Percent year over year.
    RevenueGrowth,
    AiAdoption,
    /// [-1, 1], rescaled before normalizing.
    Sentiment,
    Momentum,
    Volatility,
    Beta,
    DebtToEquity,
}

impl Metric {
    pub const fn bound(self) -> f64 {
        match self {
            Self::RndInvestment => 10_000.0,
            Self::PatentCount => 1_000.0,
            Self::MarketShare | Self::RevenueGrowth => 100.0,
            Self::AiAdoption | Self::Sentiment | Self::Momentum | Self::Volatility => 1.0,
            Self::Beta | Self::DebtToEquity => 3.0,
        }
    }

    pub const fn neutral(self) -> f64 {
        NEUTRAL
    }

    pub fn normalize(self, raw: Option<f64>) -> f64 {
        let Some(value) = raw.filter(|v| v.is_finite()) else {
            return self.neutral();
        };
        match self {
            Self::Sentiment => unit_clamp((value + 1.0) / 2.0),
            _ => normalize(value, self.bound()),
        }
    }
}

/// `clamp(value / bound, 0, 1)`. A non-positive bound or NaN input yields [`NEUTRAL`].
pub fn normalize(value: f64, bound: f64) -> f64 {
    if bound.is_nan() || bound <= 0.0 || value.is_nan() {
        return NEUTRAL;
    }
    unit_clamp(value / bound)
}

pub fn unit_clamp(value: f64) -> f64 {
    if value.is_nan() {
        return NEUTRAL;
    }
    value.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn divides_by_bound_and_clamps_both_ends() {
        assert_eq!(normalize(5_000.0, 10_000.0), 0.5);
        assert_eq!(normalize(50_000.0, 10_000.0), 1.0);
        assert_eq!(normalize(-10.0, 100.0), 0.0);
    }

    #[test]
    fn missing_and_non_finite_inputs_are_neutral() {
        assert_eq!(Metric::AiAdoption.normalize(None), 0.5);
        assert_eq!(Metric::PatentCount.normalize(Some(f64::NAN)), 0.5);
        assert_eq!(Metric::RndInvestment.normalize(Some(f64::INFINITY)), 0.5);
        assert_eq!(normalize(1.0, 0.0), NEUTRAL);
    }

    #[test]
    fn sentiment_is_rescaled_from_signed_range() {
        assert_eq!(Metric::Sentiment.normalize(Some(-1.0)), 0.0);
        assert_eq!(Metric::Sentiment.normalize(Some(0.0)), 0.5);
        assert_eq!(Metric::Sentiment.normalize(Some(1.0)), 1.0);
        assert_eq!(Metric::Sentiment.normalize(Some(3.0)), 1.0);
    }

    #[test]
    fn beta_uses_its_own_bound() {
        assert_eq!(Metric::Beta.normalize(Some(1.5)), 0.5);
        assert_eq!(Metric::DebtToEquity.normalize(Some(9.0)), 1.0);
    }
}
