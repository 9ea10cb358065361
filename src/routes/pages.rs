// /api/pages handlers

use axum::{
    extract::{Path as AxumPath, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{success, ApiResponse};
use crate::{
    app_state::AppState,
    core::{parse_flag, validate_page_id, PageFilter, Pagination, PaginationMeta},
    error::{AppError, AppResult},
    models::{PageRow, PageView, PostView, UserView},
    services::{PageOptions, PageSummary},
};

/// The posts endpoint serves smaller pages than the global maximum.
pub const MAX_POSTS_PER_PAGE: u32 = 25;

// Query parameters stay raw strings so bad values get our 400 message.

#[derive(Debug, Default, Deserialize)]
pub struct ListPagesQuery {
    pub page: Option<String>,
    pub per_page: Option<String>,
    pub follower_range: Option<String>,
    pub name: Option<String>,
    pub industry: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub include_posts: Option<String>,
    pub include_employees: Option<String>,
    pub force_refresh: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PaginatedQuery {
    pub page: Option<String>,
    pub per_page: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PostsQuery {
    pub page: Option<String>,
    pub per_page: Option<String>,
    pub include_comments: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PageList {
    pub pages: Vec<PageView>,
    pub pagination: PaginationMeta,
}

#[derive(Debug, Serialize)]
pub struct PostList {
    pub page_name: String,
    pub posts: Vec<PostView>,
    pub pagination: PaginationMeta,
}

#[derive(Debug, Serialize)]
pub struct EmployeeList {
    pub page_name: String,
    pub employees: Vec<UserView>,
    pub pagination: PaginationMeta,
}

#[derive(Debug, Serialize)]
pub struct FollowerList {
    pub page_name: String,
    pub followers: Vec<UserView>,
    pub pagination: PaginationMeta,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub page_name: String,
    pub summary: PageSummary,
}

fn checked_page_id(page_id: &str) -> AppResult<()> {
    if validate_page_id(page_id) {
        Ok(())
    } else {
        Err(AppError::Validation("Invalid page ID format".to_string()))
    }
}

fn pagination(state: &AppState, page: Option<&str>, per_page: Option<&str>, max: u32) -> AppResult<Pagination> {
    Pagination::from_query(
        page,
        per_page,
        state.config.pagination.default_page_size,
        max,
    )
}

async fn known_page(state: &AppState, page_id: &str) -> AppResult<PageRow> {
    checked_page_id(page_id)?;
    state.pages.existing_page(page_id).await
}

// HTTP Handlers

pub async fn list_pages_handler(
    State(state): State<AppState>,
    Query(params): Query<ListPagesQuery>,
) -> AppResult<Json<ApiResponse<PageList>>> {
    let pagination = pagination(
        &state,
        params.page.as_deref(),
        params.per_page.as_deref(),
        state.config.pagination.max_page_size,
    )?;
    let filter = PageFilter::from_query(
        params.follower_range.as_deref(),
        params.name.as_deref(),
        params.industry.as_deref(),
    )?;

    let (pages, pagination) = state.pages.list_pages(&filter, pagination).await?;
    Ok(success(PageList { pages, pagination }, "Success"))
}

pub async fn get_page_handler(
    State(state): State<AppState>,
    AxumPath(page_id): AxumPath<String>,
    Query(params): Query<PageQuery>,
) -> AppResult<Json<ApiResponse<Value>>> {
    checked_page_id(&page_id)?;
    let options = PageOptions {
        include_posts: parse_flag(params.include_posts.as_deref()),
        include_employees: parse_flag(params.include_employees.as_deref()),
        force_refresh: parse_flag(params.force_refresh.as_deref()),
    };

    let (page, source) = state.pages.get_page(&page_id, options).await?;
    Ok(success(page, source.message()))
}

pub async fn get_posts_handler(
    State(state): State<AppState>,
    AxumPath(page_id): AxumPath<String>,
    Query(params): Query<PostsQuery>,
) -> AppResult<Json<ApiResponse<PostList>>> {
    let page = known_page(&state, &page_id).await?;
    let max = MAX_POSTS_PER_PAGE.min(state.config.pagination.max_page_size);
    let pagination = pagination(&state, params.page.as_deref(), params.per_page.as_deref(), max)?;
    let include_comments = parse_flag(params.include_comments.as_deref());

    let (posts, pagination) = state.pages.posts(&page, pagination, include_comments).await?;
    Ok(success(
        PostList {
            page_name: page.name,
            posts,
            pagination,
        },
        "Success",
    ))
}

pub async fn get_employees_handler(
    State(state): State<AppState>,
    AxumPath(page_id): AxumPath<String>,
    Query(params): Query<PaginatedQuery>,
) -> AppResult<Json<ApiResponse<EmployeeList>>> {
    let page = known_page(&state, &page_id).await?;
    let pagination = pagination(
        &state,
        params.page.as_deref(),
        params.per_page.as_deref(),
        state.config.pagination.max_page_size,
    )?;

    let (employees, pagination) = state.pages.employees(&page, pagination).await?;
    Ok(success(
        EmployeeList {
            page_name: page.name,
            employees,
            pagination,
        },
        "Success",
    ))
}

pub async fn get_followers_handler(
    State(state): State<AppState>,
    AxumPath(page_id): AxumPath<String>,
    Query(params): Query<PaginatedQuery>,
) -> AppResult<Json<ApiResponse<FollowerList>>> {
    let page = known_page(&state, &page_id).await?;
    let pagination = pagination(
        &state,
        params.page.as_deref(),
        params.per_page.as_deref(),
        state.config.pagination.max_page_size,
    )?;

    let (followers, pagination) = state.pages.followers(&page, pagination).await?;
    Ok(success(
        FollowerList {
            page_name: page.name,
            followers,
            pagination,
        },
        "Success",
    ))
}

pub async fn get_summary_handler(
    State(state): State<AppState>,
    AxumPath(page_id): AxumPath<String>,
) -> AppResult<Json<ApiResponse<SummaryResponse>>> {
    let page = known_page(&state, &page_id).await?;
    let summary = state.pages.summary(&page).await;
    Ok(success(
        SummaryResponse {
            page_name: page.name,
            summary,
        },
        "Success",
    ))
}

pub async fn scrape_page_handler(
    State(state): State<AppState>,
    AxumPath(page_id): AxumPath<String>,
) -> AppResult<Json<ApiResponse<PageView>>> {
    checked_page_id(&page_id)?;
    let page = state.pages.refresh_page(&page_id).await?;
    Ok(success(page, "Page scraped and saved successfully"))
}
