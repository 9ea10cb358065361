// PageService - read-through access to company pages
// Cache first, then the database, then a live scrape

use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, instrument};

use crate::{
    core::{PageFilter, Pagination, PaginationMeta},
    error::{AppError, AppResult},
    infrastructure::{Database, PageCache, PageCacheKey},
    models::{PageRow, PageView, PostView, UserView},
    services::{LinkedInScraper, PageSummary, Summarizer},
};

/// Posts nested in a single-page response.
pub const INCLUDED_POSTS: i64 = 15;
/// Employees nested in a single-page response.
pub const INCLUDED_EMPLOYEES: i64 = 20;
/// Comments nested under each post of the posts endpoint.
pub const COMMENTS_PER_POST: i64 = 10;

/// Where a single-page response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSource {
    Cache,
    Database,
    Scraped,
}

impl PageSource {
    pub fn message(&self) -> &'static str {
        match self {
            PageSource::Cache => "Retrieved from cache",
            PageSource::Database => "Retrieved from database",
            PageSource::Scraped => "Scraped and saved successfully",
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PageOptions {
    pub include_posts: bool,
    pub include_employees: bool,
    pub force_refresh: bool,
}

#[derive(Clone)]
pub struct PageService {
    db: Database,
    cache: PageCache,
    scraper: Arc<LinkedInScraper>,
    summarizer: Arc<Summarizer>,
}

impl PageService {
    pub fn new(
        db: Database,
        cache: PageCache,
        scraper: Arc<LinkedInScraper>,
        summarizer: Arc<Summarizer>,
    ) -> Self {
        Self {
            db,
            cache,
            scraper,
            summarizer,
        }
    }

    pub fn cache(&self) -> &PageCache {
        &self.cache
    }

    pub async fn list_pages(
        &self,
        filter: &PageFilter,
        pagination: Pagination,
    ) -> AppResult<(Vec<PageView>, PaginationMeta)> {
        let (rows, total) = self.db.list_pages(filter, pagination).await?;
        let pages = rows.iter().map(PageRow::to_view).collect();
        Ok((pages, pagination.meta(total)))
    }

    #[instrument(skip(self))]
    pub async fn get_page(&self, page_id: &str, options: PageOptions) -> AppResult<(Value, PageSource)> {
        let key = PageCacheKey::new(page_id, options.include_posts, options.include_employees);

        if !options.force_refresh {
            if let Some(cached) = self.cache.get(&key).await {
                return Ok((cached, PageSource::Cache));
            }

            if let Some(page) = self.db.find_page(page_id).await? {
                let view = self.render(&page, options.include_posts, options.include_employees).await?;
                let value = to_json(&view)?;
                self.cache.set(key, value.clone()).await;
                return Ok((value, PageSource::Database));
            }
        }

        let page = self.scrape_and_save(page_id).await?;
        let view = self.render(&page, options.include_posts, options.include_employees).await?;
        let value = to_json(&view)?;
        self.cache.set(key, value.clone()).await;
        Ok((value, PageSource::Scraped))
    }

    /// Forced scrape. The response always nests posts and employees.
    pub async fn refresh_page(&self, page_id: &str) -> AppResult<PageView> {
        let page = self.scrape_and_save(page_id).await?;
        self.render(&page, true, true).await
    }

    async fn scrape_and_save(&self, page_id: &str) -> AppResult<PageRow> {
        let scraped = self.scraper.scrape_page(page_id).await;
        let page = self.db.save_scraped_page(&scraped).await.map_err(|e| {
            error!(page_id, "Saving scraped page failed: {}", e);
            AppError::Internal("Scraping failed".to_string())
        })?;
        // Older renders of this page are stale now.
        self.cache.invalidate_page(page_id).await;
        info!(page_id, "page scraped and stored");
        Ok(page)
    }

    async fn render(
        &self,
        page: &PageRow,
        include_posts: bool,
        include_employees: bool,
    ) -> AppResult<PageView> {
        let mut view = page.to_view();
        if include_posts {
            let posts = self.db.recent_posts(page, INCLUDED_POSTS).await?;
            view = view.with_posts(posts.iter().map(|p| p.to_view()).collect());
        }
        if include_employees {
            let employees = self.db.recent_employees(page, INCLUDED_EMPLOYEES).await?;
            view = view.with_employees(employees.iter().map(|u| u.to_view()).collect());
        }
        Ok(view)
    }

    /// Known pages only; unknown ones are a `NotFound`.
    pub async fn existing_page(&self, page_id: &str) -> AppResult<PageRow> {
        self.db.get_page(page_id).await
    }

    pub async fn posts(
        &self,
        page: &PageRow,
        pagination: Pagination,
        include_comments: bool,
    ) -> AppResult<(Vec<PostView>, PaginationMeta)> {
        let (rows, total) = self.db.list_posts(page, pagination).await?;
        let mut posts = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut view = row.to_view();
            if include_comments {
                let comments = self.db.list_comments(row, COMMENTS_PER_POST).await?;
                view = view.with_comments(comments.iter().map(|c| c.to_view()).collect());
            }
            posts.push(view);
        }
        Ok((posts, pagination.meta(total)))
    }

    pub async fn employees(
        &self,
        page: &PageRow,
        pagination: Pagination,
    ) -> AppResult<(Vec<UserView>, PaginationMeta)> {
        let (rows, total) = self.db.list_employees(page, pagination).await?;
        Ok((rows.iter().map(|u| u.to_view()).collect(), pagination.meta(total)))
    }

    pub async fn followers(
        &self,
        page: &PageRow,
        pagination: Pagination,
    ) -> AppResult<(Vec<UserView>, PaginationMeta)> {
        let (rows, total) = self.db.list_followers(page, pagination).await?;
        Ok((rows.iter().map(|u| u.to_view()).collect(), pagination.meta(total)))
    }

    pub async fn summary(&self, page: &PageRow) -> PageSummary {
        self.summarizer.summarize(page).await
    }
}

fn to_json(view: &PageView) -> AppResult<Value> {
    serde_json::to_value(view)
        .map_err(|e| AppError::Internal(format!("Failed to serialize page: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OpenAiConfig;
    use crate::services::PageFetcher;
    use async_trait::async_trait;
    use std::time::Duration;

    struct BlockedFetcher;

    #[async_trait]
    impl PageFetcher for BlockedFetcher {
        async fn fetch(&self, url: &str) -> anyhow::Result<String> {
            anyhow::bail!("blocked: {}", url)
        }
    }

    async fn service() -> PageService {
        let db = Database::in_memory().await.unwrap();
        let summarizer = Summarizer::new(OpenAiConfig {
            api_key: None,
            base_url: "http://unused.invalid".to_string(),
            model: "gpt-3.5-turbo".to_string(),
        })
        .unwrap();
        PageService::new(
            db,
            PageCache::new(100, Duration::from_secs(300)),
            Arc::new(LinkedInScraper::new(Arc::new(BlockedFetcher), "https://blocked.local")),
            Arc::new(summarizer),
        )
    }

    #[tokio::test]
    async fn test_read_through_sources() {
        let service = service().await;
        let options = PageOptions::default();

        let (first, source) = service.get_page("acme", options).await.unwrap();
        assert_eq!(source, PageSource::Scraped);
        assert!(first.get("posts").is_none());

        let (_, source) = service.get_page("acme", options).await.unwrap();
        assert_eq!(source, PageSource::Cache);

        // A different shape is not served from the first entry.
        let with_posts = PageOptions {
            include_posts: true,
            ..Default::default()
        };
        let (value, source) = service.get_page("acme", with_posts).await.unwrap();
        assert_eq!(source, PageSource::Database);
        assert_eq!(value["posts"].as_array().unwrap().len(), INCLUDED_POSTS as usize);
    }

    #[tokio::test]
    async fn test_force_refresh_rescrapes() {
        let service = service().await;
        service.get_page("acme", PageOptions::default()).await.unwrap();

        let forced = PageOptions {
            force_refresh: true,
            ..Default::default()
        };
        let (_, source) = service.get_page("acme", forced).await.unwrap();
        assert_eq!(source, PageSource::Scraped);

        let (pages, meta) = service
            .list_pages(&PageFilter::default(), Pagination::new(1, 10, 50))
            .await
            .unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(meta.total_items, 1);
    }

    #[tokio::test]
    async fn test_refresh_page_nests_relations() {
        let service = service().await;
        let view = service.refresh_page("globex").await.unwrap();
        assert_eq!(view.posts.as_ref().map(Vec::len), Some(INCLUDED_POSTS as usize));
        assert!(view.employees.is_some());

        let page = service.existing_page("globex").await.unwrap();
        let (posts, meta) = service
            .posts(&page, Pagination::new(1, 5, 25), true)
            .await
            .unwrap();
        assert_eq!(posts.len(), 5);
        assert_eq!(meta.total_pages, 3);
        assert_eq!(posts[0].comments.as_ref().map(Vec::len), Some(3));
    }

    #[tokio::test]
    async fn test_save_failure_hides_database_details() {
        // Schema never created, so the save hits a missing table.
        let db = Database::connect("sqlite::memory:", 1).await.unwrap();
        let service = PageService {
            db,
            ..service().await
        };

        let err = service.refresh_page("acme").await.unwrap_err();
        match err {
            AppError::Internal(message) => assert_eq!(message, "Scraping failed"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unknown_page_is_not_found() {
        let service = service().await;
        let err = service.existing_page("nobody").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
