//! Composite scores and label ladders. Everything here is pure and on a 0–10 scale.

pub mod normalize;
pub mod recommend;
pub mod score;

pub use recommend::{buying_opportunity, recommend, risk_level_from_market, risk_level_from_score};
pub use score::{
    ai_score, growth_score, leverage_risk_score, predict_price, predict_price_from_growth_percent,
    signal_growth_score, swot_risk_score, NEUTRAL_SCORE, SCORE_SCALE,
};
