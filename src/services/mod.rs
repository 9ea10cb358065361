// Services sit between the HTTP layer and the database

pub mod mock_data;
pub mod page_service;
pub mod scraper;
pub mod summary;

pub use page_service::{PageOptions, PageService, PageSource};
pub use scraper::{HttpFetcher, LinkedInScraper, PageFetcher};
pub use summary::{BasicSummary, PageSummary, Summarizer, SummaryText};
