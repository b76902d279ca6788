use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use marketmind_core::config::Settings;
use marketmind_core::dashboard::Dashboard;
use marketmind_core::domain::news::{Category, NewsItem};
use marketmind_core::domain::outlook::MarketOutlook;
use marketmind_core::domain::recommendation::StockRecommendation;
use marketmind_core::domain::stock::{normalize_symbol, StockQuote};
use marketmind_core::storage::{
    seed_from_settings, ApiKeyKind, FileKeyStore, KeyStore, MemoryKeyStore, MissingApiKey,
};

#[derive(Debug, Parser)]
#[command(name = "marketmind_api")]
struct Args {
    /// Port to listen on. Falls back to $PORT, then 3000.
    #[arg(long)]
    port: Option<u16>,

    /// JSON file that persists API keys. Overrides MARKETMIND_KEY_STORE.
    #[arg(long)]
    key_store: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let keys = open_key_store(args.key_store.or_else(|| settings.key_store_path.clone()))?;
    seed_from_settings(keys.as_ref(), &settings);

    let dashboard = Dashboard::from_settings(&settings, keys)?;
    let state = AppState {
        dashboard: Arc::new(dashboard),
        sample_analysis: settings.sample_analysis,
    };

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/stocks/popular", get(get_popular_stocks))
        .route("/stocks/:symbol", get(get_stock))
        .route("/news", get(get_news))
        .route("/analysis/market", get(get_market_outlook))
        .route("/analysis/stocks/:symbol", get(get_recommendation))
        .route("/keys", get(list_keys))
        .route("/keys/:kind", axum::routing::put(set_key).delete(clear_key))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let port: u16 = args
        .port
        .or_else(|| std::env::var("PORT").ok().and_then(|v| v.parse().ok()))
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, sample_analysis = settings.sample_analysis, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn open_key_store(path: Option<PathBuf>) -> anyhow::Result<Arc<dyn KeyStore>> {
    match path {
        Some(path) => {
            let store = FileKeyStore::open(path)?;
            tracing::info!(path = %store.path().display(), "using file key store");
            Ok(Arc::new(store))
        }
        None => {
            tracing::info!("no key store path configured; keys are kept in memory");
            Ok(Arc::new(MemoryKeyStore::new()))
        }
    }
}

#[derive(Clone)]
struct AppState {
    dashboard: Arc<Dashboard>,
    sample_analysis: bool,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, String)>;

async fn healthz() -> &'static str {
    "ok"
}

async fn get_popular_stocks(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.dashboard.stocks.fetch_popular_stocks().await)
}

async fn get_stock(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> ApiResult<StockQuote> {
    let symbol = parse_symbol(&symbol)?;
    Ok(Json(state.dashboard.stocks.fetch_stock_data(&symbol).await))
}

#[derive(Debug, Deserialize)]
struct NewsParams {
    category: Option<String>,
}

async fn get_news(
    State(state): State<AppState>,
    Query(params): Query<NewsParams>,
) -> ApiResult<Vec<NewsItem>> {
    let category = parse_category(params.category.as_deref())?;
    let items = state.dashboard.news.fetch_news().await;
    Ok(Json(marketmind_core::dashboard::news::filter_by_category(
        items, category,
    )))
}

async fn get_market_outlook(State(state): State<AppState>) -> ApiResult<MarketOutlook> {
    match state.dashboard.commentary.generate().await {
        Ok(outlook) => Ok(Json(outlook)),
        Err(e) if state.sample_analysis && e.downcast_ref::<MissingApiKey>().is_some() => {
            Ok(Json(state.dashboard.commentary.sample()))
        }
        Err(e) => Err(error_response(e)),
    }
}

async fn get_recommendation(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> ApiResult<StockRecommendation> {
    let symbol = parse_symbol(&symbol)?;
    match state.dashboard.advisor.recommend(&symbol).await {
        Ok(rec) => Ok(Json(rec)),
        Err(e) if state.sample_analysis && e.downcast_ref::<MissingApiKey>().is_some() => {
            Ok(Json(state.dashboard.advisor.sample(&symbol)))
        }
        Err(e) => Err(error_response(e)),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct KeyStatus {
    kind: ApiKeyKind,
    is_set: bool,
}

async fn list_keys(State(state): State<AppState>) -> Json<Vec<KeyStatus>> {
    let keys = &state.dashboard.keys;
    Json(
        ApiKeyKind::ALL
            .into_iter()
            .map(|kind| KeyStatus {
                kind,
                is_set: keys.is_set(kind),
            })
            .collect(),
    )
}

#[derive(Debug, Deserialize)]
struct SetKeyBody {
    value: String,
}

async fn set_key(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Json(body): Json<SetKeyBody>,
) -> Result<StatusCode, (StatusCode, String)> {
    let kind = parse_kind(&kind)?;
    state.dashboard.keys.set(kind, &body.value);
    tracing::info!(%kind, is_set = state.dashboard.keys.is_set(kind), "api key updated");
    Ok(StatusCode::NO_CONTENT)
}

async fn clear_key(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<StatusCode, (StatusCode, String)> {
    let kind = parse_kind(&kind)?;
    state.dashboard.keys.clear(kind);
    tracing::info!(%kind, "api key cleared");
    Ok(StatusCode::NO_CONTENT)
}

fn parse_symbol(raw: &str) -> Result<String, (StatusCode, String)> {
    let symbol = normalize_symbol(raw);
    let valid = !symbol.is_empty()
        && symbol.len() <= 12
        && symbol
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
    if !valid {
        return Err((StatusCode::BAD_REQUEST, format!("invalid symbol: {raw}")));
    }
    Ok(symbol)
}

/// `None` (and `all`) means no filter.
fn parse_category(raw: Option<&str>) -> Result<Option<Category>, (StatusCode, String)> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) if s.eq_ignore_ascii_case("all") => Ok(None),
        Some(s) => s
            .parse::<Category>()
            .map(Some)
            .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string())),
    }
}

fn parse_kind(raw: &str) -> Result<ApiKeyKind, (StatusCode, String)> {
    raw.parse::<ApiKeyKind>()
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))
}

/// Missing keys are a client configuration problem; everything else is an upstream failure.
fn error_response(err: anyhow::Error) -> (StatusCode, String) {
    if let Some(missing) = err.downcast_ref::<MissingApiKey>() {
        return (StatusCode::PRECONDITION_FAILED, missing.to_string());
    }

    sentry_anyhow::capture_anyhow(&err);
    tracing::error!(error = %err, "upstream request failed");
    (StatusCode::BAD_GATEWAY, format!("{err:#}"))
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_are_normalized_and_validated() {
        assert_eq!(parse_symbol(" brk.b ").unwrap(), "BRK.B");
        assert_eq!(parse_symbol("aapl").unwrap(), "AAPL");
        assert_eq!(parse_symbol("  ").unwrap_err().0, StatusCode::BAD_REQUEST);
        assert_eq!(parse_symbol("AA PL").unwrap_err().0, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn category_filter_parsing() {
        assert_eq!(parse_category(None).unwrap(), None);
        assert_eq!(parse_category(Some("all")).unwrap(), None);
        assert_eq!(parse_category(Some("energy")).unwrap(), Some(Category::Energy));
        assert_eq!(
            parse_category(Some("crypto")).unwrap_err().0,
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn key_kinds_accept_both_names() {
        assert_eq!(parse_kind("news-provider").unwrap(), ApiKeyKind::NewsProvider);
        assert_eq!(parse_kind("openai_api_key").unwrap(), ApiKeyKind::CompletionProvider);
        assert_eq!(parse_kind("other").unwrap_err().0, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn missing_key_maps_to_precondition_failed() {
        let err = anyhow::Error::new(MissingApiKey {
            kind: ApiKeyKind::CompletionProvider,
        });
        let (status, body) = error_response(err);
        assert_eq!(status, StatusCode::PRECONDITION_FAILED);
        assert_eq!(body, "completion-provider API key is not set");

        let (status, _) = error_response(anyhow::anyhow!("OpenAI HTTP 500"));
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }
}
