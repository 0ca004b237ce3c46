pub mod domain;
pub mod ingest;
pub mod llm;
pub mod scoring;
pub mod service;
pub mod session;
pub mod view;

pub mod config {
    use anyhow::Context;

    /// Where stock records come from.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum DataSource {
        Mock,
        Market,
        Llm,
    }

    impl std::str::FromStr for DataSource {
        type Err = anyhow::Error;

        fn from_str(s: &str) -> anyhow::Result<Self> {
            match s.trim().to_ascii_lowercase().as_str() {
                "" | "mock" => Ok(Self::Mock),
                "market" | "http" => Ok(Self::Market),
                "llm" => Ok(Self::Llm),
                other => anyhow::bail!("unknown DATA_SOURCE: {other} (expected mock|market|llm)"),
            }
        }
    }

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub data_source: DataSource,
        pub llm_provider: Option<String>,
        pub anthropic_api_key: Option<String>,
        pub openai_api_key: Option<String>,
        pub sentry_dsn: Option<String>,
        pub market_data_base_url: Option<String>,
        pub market_data_api_key: Option<String>,
        pub mock_delay_ms: u64,
        pub llm_repair_attempts: u32,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let data_source = std::env::var("DATA_SOURCE")
                .unwrap_or_default()
                .parse::<DataSource>()?;

            Ok(Self {
                data_source,
                llm_provider: std::env::var("LLM_PROVIDER").ok(),
                anthropic_api_key: std::env::var("ANTHROPIC_API_KEY").ok(),
                openai_api_key: std::env::var("OPENAI_API_KEY").ok(),
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
                market_data_base_url: std::env::var("MARKET_DATA_BASE_URL").ok(),
                market_data_api_key: std::env::var("MARKET_DATA_API_KEY").ok(),
                mock_delay_ms: std::env::var("MOCK_DELAY_MS")
                    .ok()
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(0),
                llm_repair_attempts: std::env::var("LLM_REPAIR_ATTEMPTS")
                    .ok()
                    .and_then(|s| s.parse::<u32>().ok())
                    .unwrap_or(0),
            })
        }

        /// Settings for the fixture source with no external services configured.
        pub fn mock() -> Self {
            Self {
                data_source: DataSource::Mock,
                llm_provider: None,
                anthropic_api_key: None,
                openai_api_key: None,
                sentry_dsn: None,
                market_data_base_url: None,
                market_data_api_key: None,
                mock_delay_ms: 0,
                llm_repair_attempts: 0,
            }
        }

        pub fn require_anthropic_api_key(&self) -> anyhow::Result<&str> {
            self.anthropic_api_key
                .as_deref()
                .context("ANTHROPIC_API_KEY is required")
        }

        pub fn require_openai_api_key(&self) -> anyhow::Result<&str> {
            self.openai_api_key
                .as_deref()
                .context("OPENAI_API_KEY is required")
        }

        pub fn require_market_data_base_url(&self) -> anyhow::Result<&str> {
            self.market_data_base_url
                .as_deref()
                .context("MARKET_DATA_BASE_URL is required")
        }

        pub fn require_market_data_api_key(&self) -> anyhow::Result<&str> {
            self.market_data_api_key
                .as_deref()
                .context("MARKET_DATA_API_KEY is required")
        }
    }

}
