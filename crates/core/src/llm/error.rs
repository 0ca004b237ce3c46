use crate::llm::Provider;
use serde_json::Value;
use std::fmt;

/// A model call that failed after the request left the process: a non-2xx status or a
/// body that never decoded into the expected shape. Carries the raw text for logging.
#[derive(Debug, Clone)]
pub struct LlmDiagnosticsError {
    pub provider: Provider,
    pub symbol: String,
    pub stage: &'static str,
    pub detail: String,
    pub raw_output: Option<String>,
    pub raw_response_json: Option<Value>,
}

impl fmt::Display for LlmDiagnosticsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LLM error (provider={:?}, symbol={}, stage={}): {}",
            self.provider, self.symbol, self.stage, self.detail
        )
    }
}

impl std::error::Error for LlmDiagnosticsError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_provider_and_stage() {
        let err = LlmDiagnosticsError {
            provider: Provider::OpenAI,
            symbol: "NVDA".into(),
            stage: "http",
            detail: "status=500".into(),
            raw_output: None,
            raw_response_json: None,
        };
        assert_eq!(
            err.to_string(),
            "LLM error (provider=OpenAI, symbol=NVDA, stage=http): status=500"
        );
    }

    #[test]
    fn downcasts_through_anyhow() {
        let err: anyhow::Error = LlmDiagnosticsError {
            provider: Provider::Anthropic,
            symbol: "AMD".into(),
            stage: "parse",
            detail: "eof".into(),
            raw_output: Some("{".into()),
            raw_response_json: None,
        }
        .into();
        let diag = err.downcast_ref::<LlmDiagnosticsError>().unwrap();
        assert_eq!(diag.raw_output.as_deref(), Some("{"));
    }
}
