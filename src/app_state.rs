use std::sync::Arc;
use std::time::Duration;

use crate::{
    config::Config,
    error::AppResult,
    infrastructure::{Database, PageCache},
    services::{LinkedInScraper, PageFetcher, PageService, Summarizer},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: Database,
    pub pages: PageService,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        // Initialize database
        let db = Database::connect(&config.database.url, config.database.max_connections).await?;
        db.init().await?;

        let scraper = LinkedInScraper::from_config(&config.scraper)?;
        let state = Self::with_scraper(config, db, scraper)?;
        state
            .pages
            .cache()
            .start_cleanup_worker(Duration::from_secs(state.config.cache.ttl_secs.max(1)));
        Ok(state)
    }

    /// Wires the state around an existing database and a custom fetcher.
    pub fn from_parts(
        config: Config,
        db: Database,
        fetcher: Arc<dyn PageFetcher>,
    ) -> AppResult<Self> {
        let scraper = LinkedInScraper::new(fetcher, config.scraper.base_url.clone());
        Self::with_scraper(config, db, scraper)
    }

    fn with_scraper(config: Config, db: Database, scraper: LinkedInScraper) -> AppResult<Self> {
        let cache = PageCache::new(
            config.cache.capacity,
            Duration::from_secs(config.cache.ttl_secs),
        );
        let summarizer = Summarizer::new(config.openai.clone())?;
        let pages = PageService::new(db.clone(), cache, Arc::new(scraper), Arc::new(summarizer));

        Ok(Self {
            config: Arc::new(config),
            db,
            pages,
        })
    }
}
