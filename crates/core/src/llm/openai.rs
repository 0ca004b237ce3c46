use crate::config::Settings;
use crate::domain::contract::{LlmCompanyAnalysis, LlmStockAnalysis};
use crate::llm::error::LlmDiagnosticsError;
use crate::llm::{json, prompt, AnalysisKind, LlmClient, Provider};
use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_MODEL: &str = "gpt-4-turbo-preview";
const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    repair_attempts: u32,
}

impl OpenAiClient {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let api_key = settings.require_openai_api_key()?.to_string();
        let base_url =
            std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let timeout_secs = std::env::var("OPENAI_TIMEOUT_SECS")
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
            repair_attempts: settings.llm_repair_attempts,
        })
    }

    fn request(&self, kind: AnalysisKind, content: String) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: prompt::system_prompt(kind),
                },
                ChatMessage {
                    role: "user",
                    content,
                },
            ],
            temperature: DEFAULT_TEMPERATURE,
            response_format: ResponseFormat { kind: "json_object" },
        }
    }

    async fn chat(&self, symbol: &str, req: ChatRequest) -> anyhow::Result<(serde_json::Value, String)> {
        let url = format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'));
        let res = self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await
            .context("OpenAI request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read OpenAI response body")?;
        if !status.is_success() {
            let raw_response_json = serde_json::from_str::<serde_json::Value>(&text).ok();
            return Err(LlmDiagnosticsError {
                provider: Provider::OpenAI,
                symbol: symbol.to_string(),
                stage: "http",
                detail: format!("status={status}"),
                raw_output: Some(text),
                raw_response_json,
            }
            .into());
        }

        let raw_json = serde_json::from_str::<serde_json::Value>(&text)
            .with_context(|| format!("failed to parse OpenAI response JSON: {text}"))?;
        let parsed = serde_json::from_value::<ChatResponse>(raw_json.clone())
            .context("failed to decode OpenAI response into ChatResponse")?;

        match Self::message_content(&parsed) {
            Some(content) => Ok((raw_json, content)),
            None => Err(LlmDiagnosticsError {
                provider: Provider::OpenAI,
                symbol: symbol.to_string(),
                stage: "empty_response",
                detail: "no message content in first choice".to_string(),
                raw_output: None,
                raw_response_json: Some(raw_json),
            }
            .into()),
        }
    }

    fn message_content(res: &ChatResponse) -> Option<String> {
        res.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    async fn analyze<T: DeserializeOwned>(&self, kind: AnalysisKind, symbol: &str) -> anyhow::Result<T> {
        let (mut raw_json, mut text) = self
            .chat(symbol, self.request(kind, prompt::user_prompt(kind, symbol)))
            .await?;

        let mut attempt = 0u32;
        loop {
            let err = match json::parse_json::<T>(&text) {
                Ok(parsed) => return Ok(parsed),
                Err(err) => err,
            };
            if attempt >= self.repair_attempts {
                return Err(LlmDiagnosticsError {
                    provider: Provider::OpenAI,
                    symbol: symbol.to_string(),
                    stage: if attempt == 0 { "parse" } else { "parse_after_repair" },
                    detail: format!("final_error={err}"),
                    raw_output: Some(text),
                    raw_response_json: Some(raw_json),
                }
                .into());
            }
            attempt += 1;
            tracing::warn!(attempt, symbol, error = %err, "OpenAI output invalid; requesting repair");
            (raw_json, text) = self
                .chat(symbol, self.request(kind, prompt::repair_prompt(kind, &text)))
                .await?;
        }
    }
}

#[async_trait::async_trait]
impl LlmClient for OpenAiClient {
    fn provider(&self) -> Provider {
        Provider::OpenAI
    }

    async fn analyze_company(&self, symbol: &str) -> anyhow::Result<LlmCompanyAnalysis> {
        self.analyze(AnalysisKind::Company, symbol).await
    }

    async fn analyze_technicals(&self, symbol: &str) -> anyhow::Result<LlmStockAnalysis> {
        self.analyze(AnalysisKind::Technical, symbol).await
    }
}

#[derive(Debug, Clone, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Debug, Clone, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Clone, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Clone, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}
