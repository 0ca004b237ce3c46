use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use aiwatch_core::domain::enhanced::{NewsAndSocial, StockMetrics};
use aiwatch_core::domain::stock::{StockAnalysis, StockRecord};
use aiwatch_core::ingest::mock;
use aiwatch_core::service::Dashboard;
use aiwatch_core::session::{normalize_symbol, reduce, SessionAction, SessionState};
use aiwatch_core::view::chart::{rank_sectors, PerformanceTier};
use aiwatch_core::view::portfolio::{parse_amount, portfolio_metrics, purchase_plan, PortfolioMetrics, PurchasePlan};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = aiwatch_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let dashboard = match Dashboard::from_settings(&settings) {
        Ok(d) => d,
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %e, "data source misconfigured");
            return Err(e);
        }
    };
    tracing::info!(source = dashboard.source().source_name(), "data source ready");

    let app = app(AppState::new(dashboard));

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/stocks", get(list_stocks))
        .route("/stocks/:symbol/analysis", get(get_analysis))
        .route("/stocks/:symbol/metrics", get(get_metrics))
        .route("/stocks/:symbol/news", get(get_news))
        .route("/sectors", get(list_sectors))
        .route("/calculator", get(calculator))
        .route("/sessions", post(create_session))
        .route("/sessions/:id", get(get_session).delete(delete_session))
        .route("/sessions/:id/stocks", get(get_visible_stocks))
        .route("/sessions/:id/refresh", post(refresh_session))
        .route("/sessions/:id/select/:symbol", post(select_stock))
        .route(
            "/sessions/:id/watchlist/:symbol",
            put(add_to_watchlist).delete(remove_from_watchlist),
        )
        .route("/sessions/:id/watchlist/:symbol/toggle", post(toggle_watchlist))
        .route("/sessions/:id/sector", delete(clear_sector_filter))
        .route("/sessions/:id/sector/:sector", put(filter_sector))
        .route("/sessions/:id/sector/:sector/toggle", post(toggle_sector))
        .route("/sessions/:id/portfolio", get(get_portfolio))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn healthz() -> &'static str {
    "ok"
}

/// Sessions live only in memory and are lost on restart.
#[derive(Clone)]
struct AppState {
    dashboard: Dashboard,
    sessions: Arc<Mutex<HashMap<Uuid, SessionState>>>,
}

impl AppState {
    fn new(dashboard: Dashboard) -> Self {
        Self {
            dashboard,
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Applies one action under the lock. Fetches happen before this call, never inside it.
    async fn apply(&self, id: Uuid, action: SessionAction) -> Result<SessionState, StatusCode> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
        *session = reduce(std::mem::take(session), action);
        Ok(session.clone())
    }

    async fn snapshot(&self, id: Uuid) -> Result<SessionState, StatusCode> {
        self.sessions
            .lock()
            .await
            .get(&id)
            .cloned()
            .ok_or(StatusCode::NOT_FOUND)
    }
}

fn upstream_error(e: anyhow::Error) -> StatusCode {
    sentry_anyhow::capture_anyhow(&e);
    tracing::error!(error = %format!("{e:#}"), "upstream request failed");
    StatusCode::BAD_GATEWAY
}

async fn list_stocks(State(state): State<AppState>) -> Result<Json<Vec<StockRecord>>, StatusCode> {
    let stocks = state.dashboard.load_stocks().await.map_err(upstream_error)?;
    Ok(Json(stocks))
}

async fn get_analysis(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<StockAnalysis>, StatusCode> {
    let symbol = normalize_symbol(&symbol);
    let analysis = state
        .dashboard
        .source()
        .fetch_analysis(&symbol)
        .await
        .map_err(upstream_error)?;
    Ok(Json(analysis))
}

async fn get_metrics(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<StockMetrics>, StatusCode> {
    let symbol = normalize_symbol(&symbol);
    let metrics = state
        .dashboard
        .source()
        .fetch_metrics(&symbol)
        .await
        .map_err(upstream_error)?;
    Ok(Json(metrics))
}

async fn get_news(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<NewsAndSocial>, StatusCode> {
    let symbol = normalize_symbol(&symbol);
    let news = state
        .dashboard
        .source()
        .fetch_news_and_social(&symbol)
        .await
        .map_err(upstream_error)?;
    Ok(Json(news))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiSector {
    name: String,
    performance: f64,
    top_stocks: Vec<String>,
    tier: PerformanceTier,
}

async fn list_sectors() -> Json<Vec<ApiSector>> {
    let sectors = mock::sectors();
    let ranked = rank_sectors(&sectors)
        .into_iter()
        .map(|(s, tier)| ApiSector {
            name: s.name.clone(),
            performance: s.performance,
            top_stocks: s.top_stocks.clone(),
            tier,
        })
        .collect();
    Json(ranked)
}

#[derive(Debug, Deserialize)]
struct CalculatorQuery {
    #[serde(default)]
    amount: String,
}

async fn calculator(
    State(state): State<AppState>,
    Query(q): Query<CalculatorQuery>,
) -> Result<Json<PurchasePlan>, StatusCode> {
    let amount = parse_amount(&q.amount).ok_or(StatusCode::BAD_REQUEST)?;
    let stocks = state.dashboard.load_stocks().await.map_err(upstream_error)?;
    Ok(Json(purchase_plan(&stocks, amount)))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreatedSession {
    session_id: Uuid,
}

async fn create_session(State(state): State<AppState>) -> (StatusCode, Json<CreatedSession>) {
    let session_id = Uuid::new_v4();
    state
        .sessions
        .lock()
        .await
        .insert(session_id, SessionState::default());
    tracing::debug!(%session_id, "session created");
    (StatusCode::CREATED, Json(CreatedSession { session_id }))
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionState>, StatusCode> {
    Ok(Json(state.snapshot(id).await?))
}

async fn delete_session(State(state): State<AppState>, Path(id): Path<Uuid>) -> StatusCode {
    match state.sessions.lock().await.remove(&id) {
        Some(_) => {
            tracing::debug!(session_id = %id, "session deleted");
            StatusCode::NO_CONTENT
        }
        None => StatusCode::NOT_FOUND,
    }
}

/// Session stocks narrowed by its sector filter.
async fn get_visible_stocks(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<StockRecord>>, StatusCode> {
    let session = state.snapshot(id).await?;
    Ok(Json(session.visible_stocks().into_iter().cloned().collect()))
}

async fn refresh_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionState>, StatusCode> {
    state.apply(id, SessionAction::FetchStarted).await?;
    let outcome = state.dashboard.load_outcome().await;
    Ok(Json(state.apply(id, outcome).await?))
}

async fn select_stock(
    State(state): State<AppState>,
    Path((id, symbol)): Path<(Uuid, String)>,
) -> Result<Json<SessionState>, StatusCode> {
    state.apply(id, SessionAction::Select(symbol.clone())).await?;
    let outcome = state.dashboard.analysis_outcome(&symbol).await;
    Ok(Json(state.apply(id, outcome).await?))
}

async fn add_to_watchlist(
    State(state): State<AppState>,
    Path((id, symbol)): Path<(Uuid, String)>,
) -> Result<Json<SessionState>, StatusCode> {
    Ok(Json(state.apply(id, SessionAction::AddToWatchlist(symbol)).await?))
}

async fn remove_from_watchlist(
    State(state): State<AppState>,
    Path((id, symbol)): Path<(Uuid, String)>,
) -> Result<Json<SessionState>, StatusCode> {
    Ok(Json(
        state
            .apply(id, SessionAction::RemoveFromWatchlist(symbol))
            .await?,
    ))
}

async fn toggle_watchlist(
    State(state): State<AppState>,
    Path((id, symbol)): Path<(Uuid, String)>,
) -> Result<Json<SessionState>, StatusCode> {
    Ok(Json(state.apply(id, SessionAction::ToggleWatchlist(symbol)).await?))
}

async fn filter_sector(
    State(state): State<AppState>,
    Path((id, sector)): Path<(Uuid, String)>,
) -> Result<Json<SessionState>, StatusCode> {
    Ok(Json(state.apply(id, SessionAction::FilterSector(Some(sector))).await?))
}

async fn clear_sector_filter(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionState>, StatusCode> {
    Ok(Json(state.apply(id, SessionAction::FilterSector(None)).await?))
}

async fn toggle_sector(
    State(state): State<AppState>,
    Path((id, sector)): Path<(Uuid, String)>,
) -> Result<Json<SessionState>, StatusCode> {
    Ok(Json(state.apply(id, SessionAction::ToggleSector(sector)).await?))
}

async fn get_portfolio(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PortfolioMetrics>, StatusCode> {
    let session = state.snapshot(id).await?;
    Ok(Json(portfolio_metrics(session.watched_stocks())))
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &aiwatch_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use aiwatch_core::ingest::mock::MockStockSource;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    fn test_app() -> Router {
        let dashboard = Dashboard::new(Arc::new(MockStockSource::default()));
        app(AppState::new(dashboard))
    }

    async fn call(app: &Router, method: &str, uri: &str) -> (StatusCode, Value) {
        let res = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn healthz_ok() {
        let app = test_app();
        let res = app
            .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn lists_watchlist_stocks() {
        let app = test_app();
        let (status, body) = call(&app, "GET", "/stocks").await;
        assert_eq!(status, StatusCode::OK);
        let stocks = body.as_array().unwrap();
        assert_eq!(stocks.len(), 10);
        assert_eq!(stocks[0]["symbol"], "NVDA");
        assert!(stocks[0]["aiScore"].is_number());
    }

    #[tokio::test]
    async fn unknown_symbol_is_bad_gateway() {
        let app = test_app();
        let (status, _) = call(&app, "GET", "/stocks/AAPL/analysis").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        let (status, body) = call(&app, "GET", "/stocks/nvda/analysis").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["symbol"], "NVDA");
    }

    #[tokio::test]
    async fn session_lifecycle() {
        let app = test_app();
        let (status, body) = call(&app, "POST", "/sessions").await;
        assert_eq!(status, StatusCode::CREATED);
        let id = body["sessionId"].as_str().unwrap().to_string();

        let (_, s) = call(&app, "GET", &format!("/sessions/{id}")).await;
        assert_eq!(s["watchlist"], serde_json::json!([]));
        assert_eq!(s["loading"], false);

        let (_, s) = call(&app, "POST", &format!("/sessions/{id}/refresh")).await;
        assert_eq!(s["stocks"].as_array().unwrap().len(), 10);
        assert_eq!(s["error"], Value::Null);

        call(&app, "PUT", &format!("/sessions/{id}/watchlist/nvda")).await;
        let (_, s) = call(&app, "PUT", &format!("/sessions/{id}/watchlist/NVDA")).await;
        assert_eq!(s["watchlist"], serde_json::json!(["NVDA"]));

        let (_, p) = call(&app, "GET", &format!("/sessions/{id}/portfolio")).await;
        assert_eq!(p["count"], 1);
        assert_eq!(p["totalValue"], 875.28);

        let (_, s) = call(&app, "POST", &format!("/sessions/{id}/select/amd")).await;
        assert_eq!(s["selectedStock"], "AMD");
        assert_eq!(s["stockAnalysis"]["symbol"], "AMD");

        let (_, s) = call(&app, "DELETE", &format!("/sessions/{id}/watchlist/NVDA")).await;
        assert_eq!(s["watchlist"], serde_json::json!([]));
    }

    async fn new_session(app: &Router) -> String {
        let (_, body) = call(app, "POST", "/sessions").await;
        body["sessionId"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn deleted_session_is_gone() {
        let app = test_app();
        let id = new_session(&app).await;

        let (status, _) = call(&app, "DELETE", &format!("/sessions/{id}")).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = call(&app, "GET", &format!("/sessions/{id}")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = call(&app, "DELETE", &format!("/sessions/{id}")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn watchlist_toggle_flips_membership() {
        let app = test_app();
        let id = new_session(&app).await;

        let (status, s) = call(&app, "POST", &format!("/sessions/{id}/watchlist/amd/toggle")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(s["watchlist"], serde_json::json!(["AMD"]));
        let (_, s) = call(&app, "POST", &format!("/sessions/{id}/watchlist/AMD/toggle")).await;
        assert_eq!(s["watchlist"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn sector_filter_narrows_session_stocks() {
        let app = test_app();
        let id = new_session(&app).await;
        call(&app, "POST", &format!("/sessions/{id}/refresh")).await;

        let (_, s) = call(&app, "POST", &format!("/sessions/{id}/sector/Technology/toggle")).await;
        assert_eq!(s["sectorFilter"], "Technology");
        let (_, stocks) = call(&app, "GET", &format!("/sessions/{id}/stocks")).await;
        let stocks = stocks.as_array().unwrap();
        assert_eq!(stocks.len(), 8);
        assert!(stocks.iter().all(|s| s["sector"] == "Technology"));

        let (_, s) = call(&app, "POST", &format!("/sessions/{id}/sector/technology/toggle")).await;
        assert_eq!(s["sectorFilter"], Value::Null);
        let (_, stocks) = call(&app, "GET", &format!("/sessions/{id}/stocks")).await;
        assert_eq!(stocks.as_array().unwrap().len(), 10);

        call(&app, "PUT", &format!("/sessions/{id}/sector/Technology")).await;
        let (_, s) = call(&app, "DELETE", &format!("/sessions/{id}/sector")).await;
        assert_eq!(s["sectorFilter"], Value::Null);
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let app = test_app();
        let (status, _) = call(&app, "GET", &format!("/sessions/{}", Uuid::new_v4())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = call(&app, "POST", &format!("/sessions/{}/refresh", Uuid::new_v4())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn calculator_validates_amount() {
        let app = test_app();
        let (status, _) = call(&app, "GET", "/calculator?amount=1e3").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, plan) = call(&app, "GET", "/calculator?amount=1000").await;
        assert_eq!(status, StatusCode::OK);
        // NVDA at 875.28: one share
        assert_eq!(plan["rows"][0]["shares"], 1);
    }

    #[tokio::test]
    async fn sectors_are_ranked() {
        let app = test_app();
        let (_, body) = call(&app, "GET", "/sectors").await;
        assert_eq!(body[0]["name"], "Technology");
        assert_eq!(body[0]["tier"], "strongGain");
        assert_eq!(body[3]["name"], "Energy");
    }
}
