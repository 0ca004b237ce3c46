pub mod anthropic;
pub mod error;
pub mod json;
pub mod openai;

use crate::config::Settings;
use crate::domain::contract::{LlmCompanyAnalysis, LlmStockAnalysis};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Anthropic,
    OpenAI,
}

impl std::str::FromStr for Provider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "openai" => Ok(Self::OpenAI),
            "anthropic" | "claude" => Ok(Self::Anthropic),
            other => anyhow::bail!("unknown LLM_PROVIDER: {other}"),
        }
    }
}

/// The two analyses the dashboard asks a model for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisKind {
    Company,
    Technical,
}

#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    fn provider(&self) -> Provider;

    async fn analyze_company(&self, symbol: &str) -> anyhow::Result<LlmCompanyAnalysis>;

    async fn analyze_technicals(&self, symbol: &str) -> anyhow::Result<LlmStockAnalysis>;
}

pub fn client_from_settings(settings: &Settings) -> anyhow::Result<Arc<dyn LlmClient>> {
    let provider = settings
        .llm_provider
        .as_deref()
        .unwrap_or_default()
        .parse::<Provider>()?;
    Ok(match provider {
        Provider::OpenAI => Arc::new(openai::OpenAiClient::from_settings(settings)?),
        Provider::Anthropic => Arc::new(anthropic::AnthropicClient::from_settings(settings)?),
    })
}

pub mod prompt {
    use super::AnalysisKind;

    pub fn system_prompt(kind: AnalysisKind) -> String {
        let role = match kind {
            AnalysisKind::Company => {
                "You are a financial analyst specializing in AI companies. Provide detailed, accurate analysis based on public information and market trends."
            }
            AnalysisKind::Technical => {
                "You are a technical analyst specializing in AI companies. Provide detailed technical analysis based on current market conditions."
            }
        };
        [
            role,
            "Return ONLY valid JSON. Do not wrap in markdown. Do not include any extra keys.",
            "Use plain numbers for numeric fields.",
        ]
        .join("\n")
    }

    pub fn company_schema() -> &'static str {
        r#"{
  "name": "Full company name",
  "currentPrice": "Approximate current stock price",
  "marketCap": "Approximate market cap in billions",
  "peRatio": "Approximate P/E ratio",
  "yearHigh": "52-week high price",
  "yearLow": "52-week low price",
  "volume": "Average daily volume",
  "aiMetrics": {
    "rndInvestment": "Approximate R&D investment in millions",
    "patentCount": "Number of AI-related patents",
    "marketShare": "AI market share percentage",
    "revenueGrowth": "YoY revenue growth percentage",
    "aiAdoption": "AI adoption score (0-1)"
  },
  "analysis": {
    "strengths": ["List of key strengths"],
    "weaknesses": ["List of key weaknesses"],
    "opportunities": ["List of opportunities"],
    "threats": ["List of threats"]
  },
  "recommendation": "Buy/Hold/Sell recommendation with brief explanation"
}"#
    }

    pub fn technical_schema() -> &'static str {
        r#"{
  "technicalIndicators": {
    "rsi": "Relative Strength Index value",
    "macd": "MACD value",
    "movingAverage50": "50-day moving average",
    "movingAverage200": "200-day moving average"
  },
  "sentimentScore": "Market sentiment score (0-100)",
  "buyingOpportunity": "Strong Buy/Buy/Hold/Sell/Strong Sell",
  "riskLevel": "Low/Medium/High",
  "priceTargets": {
    "low": "Conservative price target",
    "medium": "Average price target",
    "high": "Optimistic price target"
  }
}"#
    }

    pub fn user_prompt(kind: AnalysisKind, symbol: &str) -> String {
        match kind {
            AnalysisKind::Company => format!(
                "Analyze the AI company {symbol} and provide the following information in JSON format:\n{}",
                company_schema()
            ),
            AnalysisKind::Technical => format!(
                "Provide a detailed technical and fundamental analysis for {symbol} in JSON format:\n{}",
                technical_schema()
            ),
        }
    }

    pub fn repair_prompt(kind: AnalysisKind, previous_output: &str) -> String {
        let schema = match kind {
            AnalysisKind::Company => company_schema(),
            AnalysisKind::Technical => technical_schema(),
        };
        format!(
            "Your previous message was NOT valid JSON.\n\n\
TASK: Output ONLY a single JSON object that matches the schema.\n\
- Do NOT include any markdown, prose, or code fences.\n\
- Do NOT include trailing commas, comments, or semicolons.\n\
- Use double quotes for all JSON strings.\n\n\
SCHEMA:\n{schema}\n\n\
INVALID OUTPUT (for reference only; DO NOT copy verbatim):\n{previous_output}"
        )
    }

}
