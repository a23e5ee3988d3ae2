use std::sync::Arc;

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use common::ServerConfig;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::{Header, Status};
use rocket::serde::json::Json;
use rocket::{get, options, routes, Build, Request, Response, Rocket, State};
use serde::Serialize;

use crate::cache::NewsCache;
use crate::model::{CycleReport, NewsItem};

/// Application state stored inside Rocket managed state.
pub struct AppState {
    pub started_at: DateTime<Utc>,
    pub cache: Arc<NewsCache>,
    pub source_count: usize,
    pub interval_seconds: u64,
}

/// Body of `/news`: `{"news": [...]}`.
#[derive(Serialize)]
struct NewsResponse {
    news: Vec<NewsItem>,
}

/// Response structure for `/api/v1/status`.
#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
    uptime_seconds: i64,
    sources: usize,
    interval_seconds: u64,
    items: usize,
    last_cycle: Option<CycleReport>,
}

/// Current snapshot; empty until the first cycle completes.
#[get("/news")]
fn news(state: &State<AppState>) -> Json<NewsResponse> {
    let snapshot = state.cache.read();
    Json(NewsResponse {
        news: snapshot.items.clone(),
    })
}

#[get("/health")]
fn health() -> &'static str {
    "OK"
}

#[get("/api/v1/status")]
fn status(state: &State<AppState>) -> Json<StatusResponse> {
    let snapshot = state.cache.read();
    Json(StatusResponse {
        status: "ok",
        uptime_seconds: (Utc::now() - state.started_at).num_seconds(),
        sources: state.source_count,
        interval_seconds: state.interval_seconds,
        items: snapshot.len(),
        last_cycle: snapshot.report.clone(),
    })
}

/// Answers CORS preflight requests for any path; the fairing adds the headers.
#[options("/<_..>")]
fn preflight() -> Status {
    Status::NoContent
}

/// Adds `Access-Control-Allow-*` headers for the configured origins.
pub struct Cors {
    allowed_origins: Vec<String>,
}

impl Cors {
    pub fn new(allowed_origins: Vec<String>) -> Self {
        Self { allowed_origins }
    }

    fn allow_origin(&self, origin: Option<&str>) -> Option<String> {
        if self.allowed_origins.iter().any(|o| o == "*") {
            return Some("*".to_string());
        }
        origin
            .filter(|o| self.allowed_origins.iter().any(|a| a == o))
            .map(str::to_string)
    }
}

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "CORS headers",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, req: &'r Request<'_>, res: &mut Response<'r>) {
        let Some(allow) = self.allow_origin(req.headers().get_one("Origin")) else {
            return;
        };
        if allow != "*" {
            res.set_header(Header::new("Vary", "Origin"));
            res.set_header(Header::new("Access-Control-Allow-Credentials", "true"));
        }
        res.set_header(Header::new("Access-Control-Allow-Origin", allow));
        res.set_header(Header::new("Access-Control-Allow-Methods", "GET, OPTIONS"));
        res.set_header(Header::new("Access-Control-Allow-Headers", "*"));
    }
}

/// Build the Rocket instance without launching it (tests use a local client).
pub fn build_rocket(state: AppState, server: &ServerConfig) -> Rocket<Build> {
    let fig = rocket::Config::figment()
        .merge(("address", server.bind.clone()))
        .merge(("port", server.port));

    rocket::custom(fig)
        .manage(state)
        .attach(Cors::new(server.cors_allowed_origins.clone()))
        .mount("/", routes![news, health, status, preflight])
}

/// Launch the HTTP server; returns when Rocket shuts down (Ctrl-C included).
pub async fn launch_rocket(state: AppState, server: &ServerConfig) -> anyhow::Result<()> {
    tracing::info!(bind = %server.bind, port = server.port, "Starting Rocket HTTP server");
    build_rocket(state, server)
        .launch()
        .await
        .map_err(|e| anyhow!("Rocket failed: {}", e))?;

    tracing::info!("Rocket HTTP server has shut down");
    Ok(())
}
