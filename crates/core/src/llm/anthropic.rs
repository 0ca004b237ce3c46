use crate::config::Settings;
use crate::domain::contract::{LlmCompanyAnalysis, LlmStockAnalysis};
use crate::llm::error::LlmDiagnosticsError;
use crate::llm::{json, prompt, AnalysisKind, LlmClient, Provider};
use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_MODEL: &str = "claude-3-5-sonnet-latest";
const DEFAULT_MAX_TOKENS: u32 = 2048;
const DEFAULT_TIMEOUT_SECS: u64 = 60;

const TOOL_EMIT_COMPANY: &str = "emit_company_analysis";
const TOOL_EMIT_TECHNICALS: &str = "emit_stock_analysis";

#[derive(Debug, Clone)]
pub struct AnthropicClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
    repair_attempts: u32,
}

impl AnthropicClient {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let api_key = settings.require_anthropic_api_key()?.to_string();
        let base_url =
            std::env::var("ANTHROPIC_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model = std::env::var("ANTHROPIC_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let max_tokens = std::env::var("ANTHROPIC_MAX_TOKENS")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(DEFAULT_MAX_TOKENS);

        let timeout_secs = std::env::var("ANTHROPIC_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build reqwest client")?;

        Ok(Self {
            http,
            api_key,
            base_url,
            model,
            max_tokens,
            repair_attempts: settings.llm_repair_attempts,
        })
    }

    async fn create_message(
        &self,
        symbol: &str,
        req: CreateMessageRequest,
    ) -> anyhow::Result<(serde_json::Value, CreateMessageResponse)> {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", HeaderValue::from_str(&self.api_key)?);
        headers.insert(
            "anthropic-version",
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );

        let url = format!("{}/v1/messages", self.base_url.trim_end_matches('/'));
        let res = self
            .http
            .post(url)
            .headers(headers)
            .json(&req)
            .send()
            .await
            .context("Anthropic request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read Anthropic response body")?;
        if !status.is_success() {
            let raw_response_json = serde_json::from_str::<serde_json::Value>(&text).ok();
            return Err(LlmDiagnosticsError {
                provider: Provider::Anthropic,
                symbol: symbol.to_string(),
                stage: "http",
                detail: format!("status={status}"),
                raw_output: Some(text),
                raw_response_json,
            }
            .into());
        }

        let raw_json = serde_json::from_str::<serde_json::Value>(&text)
            .with_context(|| format!("failed to parse Anthropic response JSON: {text}"))?;
        let parsed = serde_json::from_value::<CreateMessageResponse>(raw_json.clone())
            .context("failed to decode Anthropic response into CreateMessageResponse")?;
        Ok((raw_json, parsed))
    }

    fn tool_name(kind: AnalysisKind) -> &'static str {
        match kind {
            AnalysisKind::Company => TOOL_EMIT_COMPANY,
            AnalysisKind::Technical => TOOL_EMIT_TECHNICALS,
        }
    }

    fn tools(kind: AnalysisKind) -> Vec<Tool> {
        // Models often quote numbers; the contract parses both.
        let num = serde_json::json!({"type": ["number", "string", "null"]});
        let strings = serde_json::json!({"type": "array", "items": {"type": "string"}});

        let (description, schema) = match kind {
            AnalysisKind::Company => (
                "Emit the AI company analysis as structured JSON",
                serde_json::json!({
                    "type": "object",
                    "required": ["name", "currentPrice", "aiMetrics", "analysis", "recommendation"],
                    "properties": {
                        "name": {"type": "string"},
                        "currentPrice": num,
                        "marketCap": num,
                        "peRatio": num,
                        "yearHigh": num,
                        "yearLow": num,
                        "volume": num,
                        "aiMetrics": {
                            "type": "object",
                            "properties": {
                                "rndInvestment": num,
                                "patentCount": num,
                                "marketShare": num,
                                "revenueGrowth": num,
                                "aiAdoption": num
                            }
                        },
                        "analysis": {
                            "type": "object",
                            "properties": {
                                "strengths": strings,
                                "weaknesses": strings,
                                "opportunities": strings,
                                "threats": strings
                            }
                        },
                        "recommendation": {"type": "string"}
                    }
                }),
            ),
            AnalysisKind::Technical => (
                "Emit the technical stock analysis as structured JSON",
                serde_json::json!({
                    "type": "object",
                    "required": ["technicalIndicators", "sentimentScore", "buyingOpportunity", "riskLevel", "priceTargets"],
                    "properties": {
                        "technicalIndicators": {
                            "type": "object",
                            "properties": {
                                "rsi": num,
                                "macd": num,
                                "movingAverage50": num,
                                "movingAverage200": num
                            }
                        },
                        "sentimentScore": num,
                        "buyingOpportunity": {
                            "type": "string",
                            "enum": ["Strong Buy", "Buy", "Hold", "Sell", "Strong Sell"]
                        },
                        "riskLevel": {"type": "string", "enum": ["Low", "Medium", "High"]},
                        "priceTargets": {
                            "type": "object",
                            "properties": {"low": num, "medium": num, "high": num}
                        }
                    }
                }),
            ),
        };

        vec![Tool {
            name: Self::tool_name(kind),
            description,
            input_schema: schema,
        }]
    }

    fn tool_choice(kind: AnalysisKind) -> ToolChoice {
        ToolChoice::Tool {
            name: Self::tool_name(kind),
        }
    }

    fn request(&self, kind: AnalysisKind, content: String, max_tokens: u32) -> CreateMessageRequest {
        CreateMessageRequest {
            model: self.model.clone(),
            max_tokens,
            system: Some(prompt::system_prompt(kind)),
            messages: vec![Message {
                role: "user",
                content,
            }],
            tools: Some(Self::tools(kind)),
            tool_choice: Some(Self::tool_choice(kind)),
        }
    }

    fn response_text(res: &CreateMessageResponse) -> String {
        let mut out = String::new();
        for block in &res.content {
            if let ContentBlock::Text { text } = block {
                if !out.is_empty() {
                    out.push('\n');
                }
                out.push_str(text);
            }
        }
        out
    }

    fn response_tool_input<T: DeserializeOwned>(
        res: &CreateMessageResponse,
        kind: AnalysisKind,
    ) -> anyhow::Result<Option<T>> {
        let wanted = Self::tool_name(kind);
        for block in &res.content {
            if let ContentBlock::ToolUse { name, input, .. } = block {
                if name == wanted {
                    let parsed = serde_json::from_value::<T>(input.clone())
                        .with_context(|| format!("failed to decode tool_use.input for {wanted}"))?;
                    return Ok(Some(parsed));
                }
            }
        }
        Ok(None)
    }

    async fn try_parse_with_repairs<T: DeserializeOwned>(
        &self,
        kind: AnalysisKind,
        symbol: &str,
        initial_text: String,
        initial_raw_json: serde_json::Value,
    ) -> anyhow::Result<T> {
        let first_err = match json::parse_json::<T>(&initial_text) {
            Ok(parsed) => return Ok(parsed),
            Err(err) => err,
        };

        let mut last_err = first_err;
        let mut last_text = initial_text;
        let mut last_raw_json = initial_raw_json;

        for attempt in 1..=self.repair_attempts {
            let req = self.request(kind, prompt::repair_prompt(kind, &last_text), self.max_tokens);
            let (repair_raw_json, repair_res) = self.create_message(symbol, req).await?;
            if let Some(parsed) = Self::response_tool_input::<T>(&repair_res, kind)? {
                return Ok(parsed);
            }
            let repair_text = Self::response_text(&repair_res);
            match json::parse_json::<T>(&repair_text) {
                Ok(parsed) => return Ok(parsed),
                Err(err) => {
                    tracing::warn!(
                        attempt,
                        symbol,
                        error = %err,
                        "LLM output still invalid after repair attempt"
                    );
                    last_err = err;
                    last_text = repair_text;
                    last_raw_json = repair_raw_json;
                }
            }
        }

        Err(LlmDiagnosticsError {
            provider: Provider::Anthropic,
            symbol: symbol.to_string(),
            stage: if self.repair_attempts == 0 {
                "parse"
            } else {
                "parse_after_repair"
            },
            detail: format!("final_error={last_err}"),
            raw_output: Some(last_text),
            raw_response_json: Some(last_raw_json),
        }
        .into())
    }

    async fn analyze<T: DeserializeOwned>(&self, kind: AnalysisKind, symbol: &str) -> anyhow::Result<T> {
        let content = prompt::user_prompt(kind, symbol);
        let (mut raw_json, mut res) = self
            .create_message(symbol, self.request(kind, content.clone(), self.max_tokens))
            .await?;

        // A truncated reply is retried once with a higher ceiling.
        if matches!(res.stop_reason.as_deref(), Some("max_tokens")) {
            let bumped = self.max_tokens.saturating_mul(2).max(4096);
            tracing::warn!(
                symbol,
                from = self.max_tokens,
                to = bumped,
                "Anthropic stop_reason=max_tokens; retrying once with higher max_tokens"
            );
            let (rj, r) = self
                .create_message(symbol, self.request(kind, content, bumped))
                .await?;
            raw_json = rj;
            res = r;
        }

        if let Some(parsed) = Self::response_tool_input::<T>(&res, kind)? {
            return Ok(parsed);
        }

        let text = Self::response_text(&res);
        self.try_parse_with_repairs(kind, symbol, text, raw_json).await
    }
}

#[async_trait::async_trait]
impl LlmClient for AnthropicClient {
    fn provider(&self) -> Provider {
        Provider::Anthropic
    }

    async fn analyze_company(&self, symbol: &str) -> anyhow::Result<LlmCompanyAnalysis> {
        self.analyze(AnalysisKind::Company, symbol).await
    }

    async fn analyze_technicals(&self, symbol: &str) -> anyhow::Result<LlmStockAnalysis> {
        self.analyze(AnalysisKind::Technical, symbol).await
    }
}

#[derive(Debug, Clone, Serialize)]
struct CreateMessageRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<Message>,

    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Tool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<ToolChoice>,
}

#[derive(Debug, Clone, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Clone, Deserialize)]
struct CreateMessageResponse {
    content: Vec<ContentBlock>,

    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
struct Tool {
    name: &'static str,
    description: &'static str,
    input_schema: serde_json::Value,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
enum ToolChoice {
    #[serde(rename = "tool")]
    Tool { name: &'static str },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },

    #[serde(rename = "tool_use")]
    ToolUse {
        #[serde(default)]
        #[allow(dead_code)]
        id: String,
        #[serde(default)]
        name: String,
        #[serde(default)]
        input: serde_json::Value,
    },

    #[serde(other)]
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::recommendation::BuyingOpportunity;
    use serde_json::json;

    #[test]
    fn parses_tool_use_company_input() {
        let res: CreateMessageResponse = serde_json::from_value(json!({
            "content": [
                {"type": "thinking", "thinking": "..."},
                {
                    "type": "tool_use",
                    "id": "toolu_1",
                    "name": TOOL_EMIT_COMPANY,
                    "input": {
                        "name": "Palantir Technologies",
                        "currentPrice": "24.10",
                        "aiMetrics": {"rndInvestment": 400, "aiAdoption": 0.9},
                        "analysis": {"strengths": ["x"], "weaknesses": [], "opportunities": [], "threats": ["y", "z"]},
                        "recommendation": "Hold"
                    }
                }
            ],
            "stop_reason": "tool_use"
        }))
        .unwrap();

        let parsed: LlmCompanyAnalysis =
            AnthropicClient::response_tool_input(&res, AnalysisKind::Company)
                .unwrap()
                .unwrap();
        let record = parsed.validate_and_into_record("PLTR").unwrap();
        assert_eq!(record.name, "Palantir Technologies");
        assert_eq!(record.price, 24.10);
        // 5 + 2 * 0.5 - 1 * 0.3
        assert!((record.risk_score - 5.7).abs() < 1e-9);
    }

    #[test]
    fn ignores_tool_use_for_other_kind() {
        let res: CreateMessageResponse = serde_json::from_value(json!({
            "content": [{"type": "tool_use", "id": "t", "name": TOOL_EMIT_COMPANY, "input": {}}]
        }))
        .unwrap();
        let parsed: Option<LlmStockAnalysis> =
            AnthropicClient::response_tool_input(&res, AnalysisKind::Technical).unwrap();
        assert!(parsed.is_none());
    }

    #[test]
    fn falls_back_to_text_blocks() {
        let res: CreateMessageResponse = serde_json::from_value(json!({
            "content": [
                {"type": "text", "text": "```json"},
                {"type": "text", "text": "{\"technicalIndicators\": {\"rsi\": 75, \"macd\": -0.4}, \"priceTargets\": {}}\n```"}
            ]
        }))
        .unwrap();
        let text = AnthropicClient::response_text(&res);
        let parsed: LlmStockAnalysis = json::parse_json(&text).unwrap();
        let analysis = parsed.validate_and_into_analysis("TSLA").unwrap();
        assert_eq!(analysis.buying_opportunity, BuyingOpportunity::StrongSell);
    }

    #[test]
    fn tool_schema_matches_kind() {
        let tools = AnthropicClient::tools(AnalysisKind::Technical);
        assert_eq!(tools[0].name, TOOL_EMIT_TECHNICALS);
        assert!(tools[0].input_schema["properties"]["priceTargets"].is_object());
        let choice = serde_json::to_value(AnthropicClient::tool_choice(AnalysisKind::Company)).unwrap();
        assert_eq!(choice, json!({"type": "tool", "name": TOOL_EMIT_COMPANY}));
    }
}
