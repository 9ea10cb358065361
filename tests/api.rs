use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use linkedin_insights::{
    app_state::AppState,
    config::Config,
    infrastructure::Database,
    models::{ScrapedPage, ScrapedPost, ScrapedUser},
    routes::create_router,
    services::PageFetcher,
};

struct BlockedFetcher;

#[async_trait]
impl PageFetcher for BlockedFetcher {
    async fn fetch(&self, url: &str) -> anyhow::Result<String> {
        anyhow::bail!("blocked: {}", url)
    }
}

async fn app() -> (Router, Database) {
    let db = Database::in_memory().await.unwrap();
    let state = AppState::from_parts(Config::default(), db.clone(), Arc::new(BlockedFetcher)).unwrap();
    (create_router(state), db)
}

async fn send(app: &Router, method: Method, uri: &str) -> (StatusCode, Value) {
    let response = app
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
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri).await
}

fn company(page_id: &str, name: &str, industry: &str, followers: i64) -> ScrapedPage {
    ScrapedPage {
        name: Some(name.to_string()),
        industry: Some(industry.to_string()),
        follower_count: followers,
        employee_count: 250,
        ..ScrapedPage::new(page_id)
    }
}

async fn seed(db: &Database) {
    let mut acme = company("acme", "Acme Widgets", "Technology", 25_000);
    acme.posts = (0..30)
        .map(|i| ScrapedPost {
            linkedin_post_id: Some(format!("acme_{}", i)),
            content: Some(format!("post {}", i)),
            posted_at: Some(1_700_000_000_000 - i * 1_000),
            ..Default::default()
        })
        .collect();
    acme.employees = (0..3)
        .map(|i| ScrapedUser {
            full_name: format!("Employee {}", i),
            headline: Some("Engineer".to_string()),
            ..Default::default()
        })
        .collect();
    db.save_scraped_page(&acme).await.unwrap();

    for (id, name, industry, followers) in [
        ("globex", "Globex", "Consulting", 40_000),
        ("initech", "Initech", "Software Development", 5_000),
        ("hooli", "Hooli", "Technology", 120_000),
    ] {
        db.save_scraped_page(&company(id, name, industry, followers))
            .await
            .unwrap();
    }
}

fn page_ids(body: &Value) -> Vec<String> {
    body["data"]["pages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["page_id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_health_and_index() {
    let (app, _) = app().await;

    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["message"], "LinkedIn Insights API is running");
    assert_eq!(body["database"], "ok");

    let (status, body) = get(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["app"], "LinkedIn Insights Microservice");
    assert_eq!(body["version"], "1.0.0");
    assert!(body["endpoints"]["scrape"].is_string());
}

#[tokio::test]
async fn test_empty_page_list() {
    let (app, _) = app().await;

    for uri in ["/api/pages", "/api/pages/"] {
        let (status, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        assert_eq!(body["data"]["pages"], Value::Array(vec![]));
        assert_eq!(body["data"]["pagination"]["total_items"], 0);
        assert_eq!(body["data"]["pagination"]["total_pages"], 0);
        assert_eq!(body["data"]["pagination"]["has_next"], false);
    }
}

#[tokio::test]
async fn test_list_orders_by_followers_and_filters() {
    let (app, db) = app().await;
    seed(&db).await;

    let (_, body) = get(&app, "/api/pages/").await;
    assert_eq!(page_ids(&body), vec!["hooli", "globex", "acme", "initech"]);

    let (_, body) = get(&app, "/api/pages/?follower_range=20k-40k").await;
    assert_eq!(page_ids(&body), vec!["globex", "acme"]);

    let (_, body) = get(&app, "/api/pages/?follower_range=100k-").await;
    assert_eq!(page_ids(&body), vec!["hooli"]);

    let (_, body) = get(&app, "/api/pages/?industry=technology").await;
    assert_eq!(page_ids(&body), vec!["hooli", "acme"]);

    let (_, body) = get(&app, "/api/pages/?name=WIDG").await;
    assert_eq!(page_ids(&body), vec!["acme"]);

    let (_, body) = get(&app, "/api/pages/?industry=tech&follower_range=0-50k").await;
    assert_eq!(page_ids(&body), vec!["acme"]);
}

#[tokio::test]
async fn test_list_pagination() {
    let (app, db) = app().await;
    seed(&db).await;

    let (_, body) = get(&app, "/api/pages/?page=2&per_page=3").await;
    assert_eq!(page_ids(&body), vec!["initech"]);
    let meta = &body["data"]["pagination"];
    assert_eq!(meta["page"], 2);
    assert_eq!(meta["per_page"], 3);
    assert_eq!(meta["total_items"], 4);
    assert_eq!(meta["total_pages"], 2);
    assert_eq!(meta["has_next"], false);
    assert_eq!(meta["has_prev"], true);

    let (_, body) = get(&app, "/api/pages/?per_page=500&page=0").await;
    assert_eq!(body["data"]["pagination"]["per_page"], 50);
    assert_eq!(body["data"]["pagination"]["page"], 1);
}

#[tokio::test]
async fn test_bad_query_values_are_rejected() {
    let (app, _) = app().await;

    for uri in [
        "/api/pages/?page=abc",
        "/api/pages/?per_page=ten",
        "/api/pages/?follower_range=lots",
        "/api/pages/?follower_range=40k-20k",
    ] {
        let (status, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["status"], "error");
        assert_eq!(body["data"], Value::Null);
    }
}

#[tokio::test]
async fn test_get_page_read_through() {
    let (app, db) = app().await;
    seed(&db).await;

    let (status, body) = get(&app, "/api/pages/acme").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Retrieved from database");
    assert_eq!(body["data"]["name"], "Acme Widgets");
    assert!(body["data"].get("posts").is_none());
    assert!(body["data"].get("employees").is_none());

    let (_, body) = get(&app, "/api/pages/acme").await;
    assert_eq!(body["message"], "Retrieved from cache");

    let (_, body) = get(&app, "/api/pages/acme?include_posts=true&include_employees=TRUE").await;
    assert_eq!(body["message"], "Retrieved from database");
    assert_eq!(body["data"]["posts"].as_array().unwrap().len(), 15);
    assert_eq!(body["data"]["employees"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_unknown_page_is_scraped_with_fallback() {
    let (app, _) = app().await;

    let (status, body) = get(&app, "/api/pages/deepsolv?include_posts=true").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Scraped and saved successfully");
    assert_eq!(body["data"]["name"], "DeepSolv");
    assert_eq!(body["data"]["posts"].as_array().unwrap().len(), 15);

    let (_, body) = get(&app, "/api/pages/deepsolv/followers").await;
    assert_eq!(body["data"]["pagination"]["total_items"], 8);

    let (_, body) = get(&app, "/api/pages/deepsolv?force_refresh=true").await;
    assert_eq!(body["message"], "Scraped and saved successfully");

    let (_, body) = get(&app, "/api/pages/").await;
    assert_eq!(body["data"]["pagination"]["total_items"], 1);
}

#[tokio::test]
async fn test_invalid_page_id() {
    let (app, _) = app().await;

    let (status, body) = get(&app, "/api/pages/bad@id!").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid page ID format");

    let (status, _) = send(&app, Method::POST, "/api/pages/bad@id!/scrape").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_nested_routes_need_a_known_page() {
    let (app, _) = app().await;

    for suffix in ["posts", "employees", "followers", "summary"] {
        let (status, body) = get(&app, &format!("/api/pages/nobody/{}", suffix)).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{}", suffix);
        assert_eq!(body["message"], "Page not found");
        assert_eq!(body["status"], "error");
    }
}

#[tokio::test]
async fn test_posts_endpoint() {
    let (app, db) = app().await;
    seed(&db).await;

    let (status, body) = get(&app, "/api/pages/acme/posts?per_page=100").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["page_name"], "Acme Widgets");
    assert_eq!(body["data"]["pagination"]["per_page"], 25);
    assert_eq!(body["data"]["pagination"]["total_items"], 30);
    assert_eq!(body["data"]["pagination"]["total_pages"], 2);

    let posts = body["data"]["posts"].as_array().unwrap();
    assert_eq!(posts.len(), 25);
    assert_eq!(posts[0]["linkedin_post_id"], "acme_0");
    assert!(posts[0].get("comments").is_none());

    let (_, body) = get(&app, "/api/pages/acme/posts?include_comments=true&per_page=2").await;
    let posts = body["data"]["posts"].as_array().unwrap();
    assert_eq!(posts[0]["comments"], Value::Array(vec![]));
}

#[tokio::test]
async fn test_employees_endpoint() {
    let (app, db) = app().await;
    seed(&db).await;

    let (status, body) = get(&app, "/api/pages/acme/employees?per_page=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["employees"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"]["employees"][0]["job_title"], "Engineer");
    assert_eq!(body["data"]["pagination"]["total_items"], 3);
    assert_eq!(body["data"]["pagination"]["has_next"], true);
}

#[tokio::test]
async fn test_summary_without_api_key() {
    let (app, db) = app().await;
    seed(&db).await;

    let (status, body) = get(&app, "/api/pages/acme/summary").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["page_name"], "Acme Widgets");
    let summary = &body["data"]["summary"];
    assert_eq!(summary["ai_generated"], false);
    assert_eq!(
        summary["summary"]["company_overview"],
        "Acme Widgets is a company in the Technology industry."
    );
}

#[tokio::test]
async fn test_scrape_endpoint_refreshes_cache() {
    let (app, db) = app().await;
    seed(&db).await;

    // Warm the cache with the stored record.
    let (_, body) = get(&app, "/api/pages/initech").await;
    assert_eq!(body["data"]["employee_count"], 250);

    let (status, body) = send(&app, Method::POST, "/api/pages/initech/scrape").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Page scraped and saved successfully");
    assert!(body["data"]["posts"].is_array());
    assert!(body["data"]["employees"].is_array());

    let scraped_count = body["data"]["employee_count"].clone();
    let (_, body) = get(&app, "/api/pages/initech").await;
    assert_eq!(body["message"], "Retrieved from database");
    assert_eq!(body["data"]["employee_count"], scraped_count);
}

#[tokio::test]
async fn test_failed_save_does_not_leak_database_errors() {
    // Connected but never initialised, so every statement fails.
    let db = Database::connect("sqlite::memory:", 1).await.unwrap();
    let state = AppState::from_parts(Config::default(), db, Arc::new(BlockedFetcher)).unwrap();
    let app = create_router(state);

    let (status, body) = send(&app, Method::POST, "/api/pages/acme/scrape").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "Scraping failed");
    assert!(!body.to_string().contains("no such table"));

    let (status, body) = get(&app, "/api/pages").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Internal server error");

    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "ok");
}

#[tokio::test]
async fn test_unknown_route() {
    let (app, _) = app().await;
    let (status, body) = get(&app, "/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "error");
}
