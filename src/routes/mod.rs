// HTTP surface of the insights service

pub mod pages;

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::app_state::AppState;

pub const APP_NAME: &str = "LinkedIn Insights Microservice";
pub const APP_VERSION: &str = "1.0.0";

/// Envelope shared by every `/api` response.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub status: &'static str,
    pub message: String,
    pub data: T,
}

pub fn success<T: Serialize>(data: T, message: impl Into<String>) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        status: "success",
        message: message.into(),
        data,
    })
}

pub async fn index_handler() -> Json<Value> {
    Json(json!({
        "app": APP_NAME,
        "version": APP_VERSION,
        "endpoints": {
            "health": "/health",
            "pages": "/api/pages/",
            "single_page": "/api/pages/{page_id}",
            "posts": "/api/pages/{page_id}/posts",
            "employees": "/api/pages/{page_id}/employees",
            "followers": "/api/pages/{page_id}/followers",
            "summary": "/api/pages/{page_id}/summary",
            "scrape": "/api/pages/{page_id}/scrape (POST)",
        }
    }))
}

pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let database = match state.db.health_check().await {
        Ok(()) => "ok",
        Err(e) => {
            tracing::warn!("Health check could not reach the database: {}", e);
            "unavailable"
        }
    };
    Json(json!({
        "status": "healthy",
        "message": "LinkedIn Insights API is running",
        "database": database,
    }))
}

async fn not_found_handler() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "status": "error",
            "message": "Resource not found",
            "data": null,
        })),
    )
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        // Page collection, with and without the trailing slash
        .route("/api/pages", get(pages::list_pages_handler))
        .route("/api/pages/", get(pages::list_pages_handler))
        // Single page and its relations
        .route("/api/pages/{page_id}", get(pages::get_page_handler))
        .route("/api/pages/{page_id}/posts", get(pages::get_posts_handler))
        .route("/api/pages/{page_id}/employees", get(pages::get_employees_handler))
        .route("/api/pages/{page_id}/followers", get(pages::get_followers_handler))
        .route("/api/pages/{page_id}/summary", get(pages::get_summary_handler))
        .route("/api/pages/{page_id}/scrape", post(pages::scrape_page_handler))
        .fallback(not_found_handler)
        .with_state(state)
}
