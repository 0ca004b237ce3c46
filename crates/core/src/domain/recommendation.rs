use serde::{Deserialize, Serialize};
use std::fmt;

/// Watchlist verdict derived from the three composite scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Recommendation {
    #[serde(rename = "Strong Buy")]
    StrongBuy,
    Buy,
    Hold,
    Watch,
}

/// Short-term signal derived from RSI and MACD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuyingOpportunity {
    #[serde(rename = "Strong Buy")]
    StrongBuy,
    Buy,
    Hold,
    Sell,
    #[serde(rename = "Strong Sell")]
    StrongSell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl Recommendation {
    pub fn label(self) -> &'static str {
        match self {
            Self::StrongBuy => "Strong Buy",
            Self::Buy => "Buy",
            Self::Hold => "Hold",
            Self::Watch => "Watch",
        }
    }

    /// Accepts labels with trailing prose such as `"Buy - strong AI momentum"`.
    pub fn parse_label(s: &str) -> Option<Self> {
        match leading_label(s)?.as_str() {
            "strong buy" => Some(Self::StrongBuy),
            "buy" => Some(Self::Buy),
            "hold" => Some(Self::Hold),
            "watch" => Some(Self::Watch),
            _ => None,
        }
    }
}

impl BuyingOpportunity {
    pub fn label(self) -> &'static str {
        match self {
            Self::StrongBuy => "Strong Buy",
            Self::Buy => "Buy",
            Self::Hold => "Hold",
            Self::Sell => "Sell",
            Self::StrongSell => "Strong Sell",
        }
    }

    pub fn parse_label(s: &str) -> Option<Self> {
        match leading_label(s)?.as_str() {
            "strong buy" => Some(Self::StrongBuy),
            "buy" => Some(Self::Buy),
            "hold" => Some(Self::Hold),
            "sell" => Some(Self::Sell),
            "strong sell" => Some(Self::StrongSell),
            _ => None,
        }
    }
}

impl RiskLevel {
    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }

    pub fn parse_label(s: &str) -> Option<Self> {
        match leading_label(s)?.as_str() {
            "low" => Some(Self::Low),
            "medium" | "moderate" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for BuyingOpportunity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// Lowercased first one or two words, e.g. "Strong Buy: ..." -> "strong buy".
fn leading_label(s: &str) -> Option<String> {
    let head: String = s
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_alphabetic() || *c == ' ' || *c == '_' || *c == '-')
        .collect::<String>()
        .replace(['_', '-'], " ")
        .to_ascii_lowercase();
    let mut words = head.split_whitespace();
    let first = words.next()?;
    if first == "strong" {
        let second = words.next()?;
        return Some(format!("strong {second}"));
    }
    Some(first.to_string())
}
