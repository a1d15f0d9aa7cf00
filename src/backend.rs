use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::{
    cmp::Ordering,
    path::PathBuf,
    sync::atomic::{AtomicU64, Ordering as AtomicOrdering},
    sync::Arc,
    time::{Instant, SystemTime, UNIX_EPOCH},
};
use tower_http::services::{ServeDir, ServeFile};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_SITE_DIST_DIR: &str = "dist";
const DEFAULT_STATIC_MAX_AGE_SECONDS: u64 = 3_600;
const DEFAULT_LOG_LEVEL: LogLevel = LogLevel::Info;

const STATIC_MAX_AGE_SECONDS_BOUNDS: (u64, u64) = (0, 365 * 24 * 60 * 60);
const REQUEST_ID_HEADER: &str = "x-request-id";

static REQUEST_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LogLevel {
    Debug,
    Info,
}

impl PartialOrd for LogLevel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LogLevel {
    fn cmp(&self, other: &Self) -> Ordering {
        fn rank(level: LogLevel) -> u8 {
            match level {
                LogLevel::Debug => 0,
                LogLevel::Info => 1,
            }
        }

        rank(*self).cmp(&rank(*other))
    }
}

impl LogLevel {
    fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
        }
    }
}

#[derive(Clone, Debug)]
struct SiteConfig {
    port: u16,
    dist_dir: PathBuf,
    static_max_age_seconds: u64,
    log_level: LogLevel,
}

impl SiteConfig {
    fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = parse_non_empty(lookup("PORT"))
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);
        let dist_dir = parse_non_empty(lookup("SITE_DIST_DIR"))
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SITE_DIST_DIR));
        let static_max_age_seconds = parse_u64_with_bounds(
            lookup("STATIC_MAX_AGE_SECONDS"),
            DEFAULT_STATIC_MAX_AGE_SECONDS,
            STATIC_MAX_AGE_SECONDS_BOUNDS,
        );
        let log_level = parse_log_level(lookup("LOG_LEVEL"), DEFAULT_LOG_LEVEL);

        Self {
            port,
            dist_dir,
            static_max_age_seconds,
            log_level,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    config: Arc<SiteConfig>,
}

#[derive(Serialize)]
struct HealthPayload {
    ok: bool,
}

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = SiteConfig::from_env();
    let bind_address = format!("0.0.0.0:{}", config.port);
    let state = AppState {
        config: Arc::new(config),
    };

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    log_event(
        &state.config,
        LogLevel::Info,
        "server_started",
        serde_json::json!({
            "address": bind_address,
            "dist_dir": state.config.dist_dir.display().to_string(),
        }),
    );

    axum::serve(listener, app(state)).await?;
    Ok(())
}

fn app(state: AppState) -> Router {
    let index = state.config.dist_dir.join("index.html");
    let static_service = ServeDir::new(&state.config.dist_dir).fallback(ServeFile::new(index));

    Router::new()
        .route("/healthz", get(healthz))
        .fallback_service(static_service)
        .layer(middleware::from_fn_with_state(state.clone(), serve_with_headers))
        .with_state(state)
}

async fn healthz() -> impl IntoResponse {
    let mut headers = HeaderMap::new();
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    (StatusCode::OK, headers, Json(HealthPayload { ok: true }))
}

async fn serve_with_headers(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let started = Instant::now();
    let request_id = resolve_request_id(request.headers());
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    if !headers.contains_key(header::CACHE_CONTROL) {
        headers.insert(
            header::CACHE_CONTROL,
            cache_control(&cache_policy_for_path(&path, state.config.static_max_age_seconds)),
        );
    }
    if let Ok(request_id_header) = HeaderValue::from_str(&request_id) {
        headers.insert(REQUEST_ID_HEADER, request_id_header);
    }

    log_event(
        &state.config,
        LogLevel::Debug,
        "request_served",
        serde_json::json!({
            "request_id": request_id,
            "method": method,
            "path": path,
            "status": response.status().as_u16(),
            "duration_ms": started.elapsed().as_millis() as u64,
        }),
    );

    response
}

/// HTML revalidates; everything else is a content-hashed bundle asset.
fn cache_policy_for_path(path: &str, max_age_seconds: u64) -> String {
    let file_name = path.rsplit('/').next().unwrap_or_default();
    let is_document = match file_name.rsplit_once('.') {
        Some((_, extension)) => extension.eq_ignore_ascii_case("html"),
        None => true,
    };

    if is_document {
        "no-cache".to_string()
    } else {
        format!("public, max-age={max_age_seconds}")
    }
}

fn cache_control(value: &str) -> HeaderValue {
    HeaderValue::from_str(value).unwrap_or_else(|_| HeaderValue::from_static("no-store"))
}

fn parse_non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_u64_with_bounds(value: Option<String>, default: u64, bounds: (u64, u64)) -> u64 {
    parse_non_empty(value)
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| (bounds.0..=bounds.1).contains(value))
        .unwrap_or(default)
}

fn parse_log_level(value: Option<String>, default: LogLevel) -> LogLevel {
    match parse_non_empty(value)
        .unwrap_or_else(|| default.as_str().to_string())
        .to_ascii_lowercase()
        .as_str()
    {
        "debug" => LogLevel::Debug,
        "info" => LogLevel::Info,
        _ => default,
    }
}

fn now_unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|value| value.as_millis())
        .unwrap_or(0)
}

fn now_unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|value| value.as_secs())
        .unwrap_or(0)
}

fn generate_request_id() -> String {
    let counter = REQUEST_ID_COUNTER.fetch_add(1, AtomicOrdering::Relaxed);
    format!("req-{}-{counter}", now_unix_millis())
}

fn resolve_request_id(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|raw| raw.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToString::to_string)
        .unwrap_or_else(generate_request_id)
}

fn log_event(config: &SiteConfig, level: LogLevel, event: &str, fields: serde_json::Value) {
    if level < config.log_level {
        return;
    }

    println!("{}", render_log_line(now_unix_seconds(), level, event, fields));
}

fn render_log_line(ts: u64, level: LogLevel, event: &str, fields: serde_json::Value) -> serde_json::Value {
    let mut payload = serde_json::Map::new();
    payload.insert("ts".to_string(), serde_json::Value::from(ts));
    payload.insert("level".to_string(), serde_json::Value::from(level.as_str()));
    payload.insert("event".to_string(), serde_json::Value::from(event));

    if let serde_json::Value::Object(extra) = fields {
        for (key, value) in extra {
            payload.insert(key, value);
        }
    }

    serde_json::Value::Object(payload)
}
