use aiwatch_core::config::Settings;
use aiwatch_core::ingest::mock;
use aiwatch_core::llm::error::LlmDiagnosticsError;
use aiwatch_core::service::Dashboard;
use aiwatch_core::session::{reduce, SessionAction, SessionState};
use aiwatch_core::view::chart::{chart_series, sector_counts, ChartMetric};
use aiwatch_core::view::portfolio::{parse_amount, portfolio_metrics, purchase_plan};
use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod render;

#[derive(Debug, Parser)]
#[command(name = "aiwatch", about = "AI stock watchlist dashboard")]
struct Args {
    /// Print JSON instead of text panels.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Scored watchlist table.
    List {
        #[arg(long)]
        sector: Option<String>,

        /// Symbols to add to the portfolio summary. Repeatable.
        #[arg(long = "watch")]
        watch: Vec<String>,
    },
    /// Technical analysis for one symbol.
    Analyze { symbol: String },
    /// Enhanced metrics: dividends, ownership, earnings, competitors.
    Metrics { symbol: String },
    /// News and social sentiment.
    News { symbol: String },
    /// Whole shares each stock buys for a given amount.
    Calc {
        #[arg(long)]
        amount: String,
    },
    /// Bar chart of one metric across the watchlist.
    Chart {
        #[arg(long, default_value = "aiScore")]
        metric: ChartMetric,
    },
    /// Sector performance and watchlist composition.
    Sectors,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();
    let dashboard = Dashboard::from_settings(&settings)?;
    tracing::debug!(source = dashboard.source().source_name(), "dashboard ready");

    match run(&dashboard, args).await {
        Ok(out) => {
            print!("{out}");
            Ok(())
        }
        Err(err) => {
            sentry_anyhow::capture_anyhow(&err);
            if let Some(diag) = err.downcast_ref::<LlmDiagnosticsError>() {
                tracing::debug!(
                    stage = diag.stage,
                    raw_output = diag.raw_output.as_deref().unwrap_or_default(),
                    "llm diagnostics"
                );
            }
            tracing::error!(error = %format!("{err:#}"), "command failed");
            Err(err)
        }
    }
}

async fn run(dashboard: &Dashboard, args: Args) -> anyhow::Result<String> {
    let as_json = args.json;
    match args.command {
        Command::List { sector, watch } => {
            let mut state = loaded_state(dashboard).await?;
            state = reduce(state, SessionAction::FilterSector(sector));
            for symbol in watch {
                state = reduce(state, SessionAction::AddToWatchlist(symbol));
            }
            let visible = state.visible_stocks();
            let watched = state.watched_stocks();
            let portfolio = (!watched.is_empty()).then(|| portfolio_metrics(watched.iter().copied()));

            if as_json {
                return to_json(&json!({ "stocks": visible, "portfolio": portfolio }));
            }
            let mut out = render::stock_table(&visible);
            if let Some(p) = &portfolio {
                out.push('\n');
                out.push_str(&render::portfolio_panel(p));
            }
            Ok(out)
        }
        Command::Analyze { symbol } => {
            let state = loaded_state(dashboard).await?;
            let state = dashboard.select(state, &symbol).await;
            let analysis = match &state.stock_analysis {
                Some(a) => a,
                None => anyhow::bail!(state.error.unwrap_or_else(|| format!("no analysis for {symbol}"))),
            };

            if as_json {
                return to_json(&json!({ "stock": state.selected_record(), "analysis": analysis }));
            }
            let mut out = state.selected_record().map(render::stock_detail).unwrap_or_default();
            out.push_str(&render::analysis_panel(analysis));
            Ok(out)
        }
        Command::Metrics { symbol } => {
            let metrics = dashboard
                .source()
                .fetch_metrics(&symbol)
                .await
                .with_context(|| format!("failed to fetch metrics for {symbol}"))?;
            if as_json {
                return to_json(&metrics);
            }
            Ok(render::metrics_panel(&symbol.to_ascii_uppercase(), &metrics))
        }
        Command::News { symbol } => {
            let news = dashboard
                .source()
                .fetch_news_and_social(&symbol)
                .await
                .with_context(|| format!("failed to fetch news for {symbol}"))?;
            if as_json {
                return to_json(&news);
            }
            Ok(render::news_panel(&news))
        }
        Command::Calc { amount } => {
            let amount = parse_amount(&amount).with_context(|| format!("invalid amount: {amount:?}"))?;
            let state = loaded_state(dashboard).await?;
            let plan = purchase_plan(&state.stocks, amount);
            if as_json {
                return to_json(&plan);
            }
            Ok(render::purchase_table(&plan))
        }
        Command::Chart { metric } => {
            let state = loaded_state(dashboard).await?;
            let points = chart_series(&state.stocks, metric);
            if as_json {
                return to_json(&json!({ "metric": metric, "label": metric.label(), "points": points }));
            }
            Ok(render::chart(metric, &points))
        }
        Command::Sectors => {
            let state = loaded_state(dashboard).await?;
            let sectors = mock::sectors();
            let counts = sector_counts(&state.stocks);
            if as_json {
                return to_json(&json!({ "sectors": sectors, "watchlist": counts }));
            }
            Ok(render::sectors_panel(&sectors, &counts))
        }
    }
}

/// Refreshed session, or the session's error when the load failed.
async fn loaded_state(dashboard: &Dashboard) -> anyhow::Result<SessionState> {
    let state = dashboard.refresh(SessionState::default()).await;
    if let Some(err) = state.error {
        anyhow::bail!(err);
    }
    Ok(state)
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> anyhow::Result<String> {
    let mut out = serde_json::to_string_pretty(value)?;
    out.push('\n');
    Ok(out)
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
