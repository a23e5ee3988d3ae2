use chrono::Utc;
use common::ServerConfig;
use headlines::model::{CycleReport, NewsItem, Snapshot};
use headlines::server::{build_rocket, AppState};
use headlines::{NewsCache, PLACEHOLDER_SUMMARY};
use rocket::http::{Header, Status};
use rocket::local::asynchronous::Client;
use serde_json::Value;
use std::sync::Arc;

fn item(headline: &str) -> NewsItem {
    NewsItem {
        headline: headline.to_string(),
        link: format!("https://news.example/{headline}"),
        cover_image: None,
        published: Utc::now(),
        content: String::new(),
        summary: PLACEHOLDER_SUMMARY.to_string(),
    }
}

async fn client_with(cache: Arc<NewsCache>, server: ServerConfig) -> Client {
    let state = AppState {
        started_at: Utc::now(),
        cache,
        source_count: 4,
        interval_seconds: 300,
    };
    Client::tracked(build_rocket(state, &server))
        .await
        .expect("valid rocket instance")
}

#[rocket::async_test]
async fn news_is_empty_until_first_publish() {
    let cache = Arc::new(NewsCache::new());
    let client = client_with(cache.clone(), ServerConfig::default()).await;

    let res = client.get("/news").dispatch().await;
    assert_eq!(res.status(), Status::Ok);
    let body: Value = res.into_json().await.unwrap();
    assert_eq!(body, serde_json::json!({ "news": [] }));

    let report = CycleReport {
        sources_total: 4,
        items: 2,
        ..CycleReport::default()
    };
    cache.publish(Snapshot::new(vec![item("first"), item("second")], report));

    let body: Value = client.get("/news").dispatch().await.into_json().await.unwrap();
    let news = body["news"].as_array().unwrap();
    assert_eq!(news.len(), 2);
    assert_eq!(news[0]["headline"], "first");
    assert_eq!(news[1]["summary"], PLACEHOLDER_SUMMARY);
    assert_eq!(news[0]["cover_image"], Value::Null);
}

#[rocket::async_test]
async fn health_and_status() {
    let cache = Arc::new(NewsCache::new());
    let client = client_with(cache.clone(), ServerConfig::default()).await;

    let res = client.get("/health").dispatch().await;
    assert_eq!(res.status(), Status::Ok);
    assert_eq!(res.into_string().await.unwrap(), "OK");

    let body: Value = client.get("/api/v1/status").dispatch().await.into_json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["sources"], 4);
    assert_eq!(body["interval_seconds"], 300);
    assert_eq!(body["last_cycle"], Value::Null);

    let report = CycleReport {
        sources_total: 4,
        sources_failed: vec!["https://broken.example/rss".to_string()],
        items: 1,
        ..CycleReport::default()
    };
    cache.publish(Snapshot::new(vec![item("only")], report));

    let body: Value = client.get("/api/v1/status").dispatch().await.into_json().await.unwrap();
    assert_eq!(body["items"], 1);
    assert_eq!(body["last_cycle"]["sources_failed"][0], "https://broken.example/rss");
}

#[rocket::async_test]
async fn wildcard_cors_allows_any_origin() {
    let client = client_with(Arc::new(NewsCache::new()), ServerConfig::default()).await;

    let res = client
        .get("/news")
        .header(Header::new("Origin", "https://reader.example"))
        .dispatch()
        .await;
    assert_eq!(res.headers().get_one("Access-Control-Allow-Origin"), Some("*"));
    assert_eq!(res.headers().get_one("Access-Control-Allow-Credentials"), None);

    let preflight = client
        .options("/news")
        .header(Header::new("Origin", "https://reader.example"))
        .header(Header::new("Access-Control-Request-Method", "GET"))
        .dispatch()
        .await;
    assert_eq!(preflight.status(), Status::NoContent);
    assert_eq!(
        preflight.headers().get_one("Access-Control-Allow-Methods"),
        Some("GET, OPTIONS")
    );
}

#[rocket::async_test]
async fn restricted_cors_echoes_only_listed_origins() {
    let server = ServerConfig {
        cors_allowed_origins: vec!["https://reader.example".to_string()],
        ..ServerConfig::default()
    };
    let client = client_with(Arc::new(NewsCache::new()), server).await;

    let allowed = client
        .get("/news")
        .header(Header::new("Origin", "https://reader.example"))
        .dispatch()
        .await;
    assert_eq!(
        allowed.headers().get_one("Access-Control-Allow-Origin"),
        Some("https://reader.example")
    );
    assert_eq!(allowed.headers().get_one("Vary"), Some("Origin"));

    let other = client
        .get("/news")
        .header(Header::new("Origin", "https://evil.example"))
        .dispatch()
        .await;
    assert_eq!(other.status(), Status::Ok);
    assert_eq!(other.headers().get_one("Access-Control-Allow-Origin"), None);
}
