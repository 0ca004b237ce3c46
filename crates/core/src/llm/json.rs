use anyhow::Context;
use serde::de::DeserializeOwned;

pub fn extract_json(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.starts_with("```") {
        // ```json ... ``` or ``` ... ```
        let mut inner = trimmed;
        if let Some(after_first) = inner.split_once('\n').map(|(_, rest)| rest) {
            inner = after_first;
        }
        if let Some(end) = inner.rfind("```") {
            inner = &inner[..end];
        }
        return Some(inner.trim().to_string());
    }

    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(trimmed[start..=end].trim().to_string())
}

/// Decodes a model reply into `T`, tolerating fences and surrounding prose.
pub fn parse_json<T: DeserializeOwned>(text: &str) -> anyhow::Result<T> {
    let json_str = extract_json(text).unwrap_or_else(|| text.trim().to_string());
    serde_json::from_str::<T>(&json_str)
        .with_context(|| format!("LLM output is not valid JSON: {json_str}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::contract::{LlmCompanyAnalysis, LlmStockAnalysis};
    use crate::domain::recommendation::{BuyingOpportunity, RiskLevel};

    #[test]
    fn extract_json_handles_fenced_blocks() {
        let body = "{\"a\":1}";
        let fenced = format!("```json\n{body}\n```\n");
        assert_eq!(extract_json(&fenced), Some(body.to_string()));
    }

    #[test]
    fn extract_json_falls_back_to_braces() {
        let s = "Here you go: {\"a\":1} hope it helps";
        assert_eq!(extract_json(s), Some("{\"a\":1}".to_string()));
        assert_eq!(extract_json("no json here"), None);
    }

    #[test]
    fn parses_company_analysis_with_string_numbers() {
        let text = r#"```json
{
  "name": "NVIDIA Corporation",
  "currentPrice": "$875.28",
  "marketCap": "2150",
  "peRatio": 72.5,
  "aiMetrics": {"rndInvestment": "7,339", "patentCount": 850, "marketShare": "80%", "revenueGrowth": 126, "aiAdoption": 0.95},
  "analysis": {"strengths": ["a", "b"], "weaknesses": ["c"], "opportunities": [], "threats": ["d"]},
  "recommendation": "Buy - dominant position"
}
```"#;
        let parsed: LlmCompanyAnalysis = parse_json(text).unwrap();
        assert_eq!(parsed.current_price, Some(875.28));
        let record = parsed.validate_and_into_record("nvda").unwrap();
        assert_eq!(record.symbol, "NVDA");
        assert_eq!(record.market_cap, Some(2150.0 * 1e9));
        assert_eq!(record.ai_metrics.rnd_investment, Some(7339.0));
        assert_eq!(record.analyst_view.as_deref(), Some("Buy - dominant position"));
    }

    #[test]
    fn parses_stock_analysis() {
        let text = r#"{"technicalIndicators": {"rsi": 25, "macd": 1.2, "movingAverage50": 100, "movingAverage200": 90},
            "sentimentScore": 82, "buyingOpportunity": "Strong Buy", "riskLevel": "High",
            "priceTargets": {"low": 90, "medium": 110, "high": 130}}"#;
        let parsed: LlmStockAnalysis = parse_json(text).unwrap();
        let analysis = parsed.validate_and_into_analysis("AMD").unwrap();
        assert_eq!(analysis.buying_opportunity, BuyingOpportunity::StrongBuy);
        assert_eq!(analysis.risk_level, RiskLevel::High);
        assert_eq!(analysis.price_targets.medium, 110.0);
    }

    #[test]
    fn rejects_truncated_output() {
        assert!(parse_json::<LlmStockAnalysis>("{\"technicalIndicators\": {").is_err());
    }
}
