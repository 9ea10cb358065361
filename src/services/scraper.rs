// LinkedIn company page scraper with a mock-data fallback

use anyhow::{bail, Context};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::config::ScraperConfig;
use crate::core::parse_compact_number;
use crate::error::{AppError, AppResult};
use crate::models::{current_time_millis, ScrapedPage, ScrapedPost, ScrapedUser};
use crate::services::mock_data;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/124.0 Safari/537.36";
const PUBLIC_COMPANY_URL: &str = "https://www.linkedin.com/company";
const DAY_MILLIS: i64 = 24 * 60 * 60 * 1000;

pub const MAX_SCRAPED_POSTS: usize = 20;
pub const MAX_SCRAPED_EMPLOYEES: usize = 15;

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid css selector")
}

static NAME: Lazy<Selector> = Lazy::new(|| selector("h1"));
static TAGLINE: Lazy<Selector> = Lazy::new(|| selector(".org-top-card-summary__tagline"));
static INFO_ITEM: Lazy<Selector> =
    Lazy::new(|| selector(".org-top-card-summary-info-list__info-item"));
static INFO_LIST: Lazy<Selector> = Lazy::new(|| selector(".org-top-card-summary-info-list"));
static WEBSITE: Lazy<Selector> = Lazy::new(|| selector(".org-top-card-primary-actions__website"));
static SPECIALITIES: Lazy<Selector> =
    Lazy::new(|| selector(".org-page-details-module__specialities span"));
static HEADQUARTERS: Lazy<Selector> = Lazy::new(|| selector(".org-location-card p"));
static LOGO: Lazy<Selector> = Lazy::new(|| selector(".org-top-card-primary-content__logo"));
static COMPANY_TYPE: Lazy<Selector> = Lazy::new(|| selector(".org-page-details__definition-text"));
static FOUNDED: Lazy<Selector> = Lazy::new(|| selector(".org-page-details__founded"));

static POST_CARD: Lazy<Selector> = Lazy::new(|| selector("div.feed-shared-update-v2"));
static POST_TEXT: Lazy<Selector> = Lazy::new(|| selector(".feed-shared-text"));
static POST_LIKES: Lazy<Selector> =
    Lazy::new(|| selector(".social-details-social-counts__reactions-count"));
static POST_COMMENTS: Lazy<Selector> =
    Lazy::new(|| selector(".social-details-social-counts__comments"));
static POST_SHARES: Lazy<Selector> =
    Lazy::new(|| selector(".social-details-social-counts__shares"));
static VIDEO: Lazy<Selector> = Lazy::new(|| selector("video"));
static IMAGE: Lazy<Selector> = Lazy::new(|| selector("img"));
static ARTICLE: Lazy<Selector> = Lazy::new(|| selector("article"));

static PEOPLE_CARD: Lazy<Selector> = Lazy::new(|| selector("div.org-people-profile-card"));
static PERSON_NAME: Lazy<Selector> =
    Lazy::new(|| selector(".org-people-profile-card__profile-title"));
static PERSON_HEADLINE: Lazy<Selector> = Lazy::new(|| selector(".lt-line-clamp"));
static PERSON_LOCATION: Lazy<Selector> =
    Lazy::new(|| selector(".org-people-profile-card__location"));
static LINK: Lazy<Selector> = Lazy::new(|| selector("a"));

static FOLLOWERS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d[\d,.]*\s*[km]?)\s*followers").expect("valid followers pattern"));
static EMPLOYEES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d[\d,.]*\s*[km]?)\+?\s*employees").expect("valid employees pattern"));
static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{4}").expect("valid year pattern"));
static COUNT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\d[\d,.]*[km]?\b").expect("valid count pattern"));

/// Fetches raw HTML. Browser automation plugs in here.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> anyhow::Result<String>;
}

/// Plain HTTP fetcher that looks like a desktop browser.
pub struct HttpFetcher {
    client: reqwest::Client,
    min_delay_ms: u64,
    max_delay_ms: u64,
}

impl HttpFetcher {
    pub fn new(config: &ScraperConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            min_delay_ms: config.min_delay_ms,
            max_delay_ms: config.max_delay_ms.max(config.min_delay_ms),
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> anyhow::Result<String> {
        let delay = rand::rng().random_range(self.min_delay_ms..=self.max_delay_ms);
        tokio::time::sleep(Duration::from_millis(delay)).await;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?;

        let final_url = response.url().as_str().to_string();
        if final_url.contains("authwall") || final_url.contains("/login") {
            bail!("Blocked by LinkedIn login wall at {}", final_url);
        }
        if !response.status().is_success() {
            bail!("LinkedIn answered {} for {}", response.status(), url);
        }

        response
            .text()
            .await
            .with_context(|| format!("Failed to read body of {}", url))
    }
}

pub struct LinkedInScraper {
    fetcher: Arc<dyn PageFetcher>,
    base_url: String,
}

impl LinkedInScraper {
    pub fn new(fetcher: Arc<dyn PageFetcher>, base_url: impl Into<String>) -> Self {
        Self {
            fetcher,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &ScraperConfig) -> AppResult<Self> {
        Ok(Self::new(Arc::new(HttpFetcher::new(config)?), config.base_url.clone()))
    }

    /// Never fails: every section that cannot be scraped is filled with mock data.
    #[instrument(skip(self))]
    pub async fn scrape_page(&self, page_id: &str) -> ScrapedPage {
        info!("Starting scrape");
        let now = current_time_millis();
        let mut rng = StdRng::from_os_rng();

        let scraped = self
            .fetch_section(page_id, "about")
            .await
            .map(|html| parse_about(&html, page_id))
            .filter(|page| page.name.is_some());

        let mut page = match scraped {
            Some(page) => page,
            None => {
                warn!("Could not scrape basic info, using mock data");
                let mut page = mock_data::mock_page(&mut rng, page_id);
                page.followers = mock_data::mock_followers(&mut rng);
                page
            }
        };

        let posts = match self.fetch_section(page_id, "posts").await {
            Some(html) => parse_posts(&html, page_id, now),
            None => Vec::new(),
        };
        page.posts = if posts.is_empty() {
            debug!("No posts scraped, using mock posts");
            mock_data::mock_posts(&mut rng, now)
        } else {
            posts
        };

        let employees = match self.fetch_section(page_id, "people").await {
            Some(html) => parse_employees(&html),
            None => Vec::new(),
        };
        page.employees = if employees.is_empty() {
            debug!("No employees scraped, using mock employees");
            mock_data::mock_employees(&mut rng)
        } else {
            employees
        };

        info!(
            posts = page.posts.len(),
            employees = page.employees.len(),
            "Scrape finished"
        );
        page
    }

    async fn fetch_section(&self, page_id: &str, section: &str) -> Option<String> {
        let url = format!("{}/{}/{}/", self.base_url, page_id, section);
        match self.fetcher.fetch(&url).await {
            Ok(html) => Some(html),
            Err(e) => {
                warn!(section, "Fetch failed: {:#}", e);
                None
            }
        }
    }
}

// HTML extraction. `Html` is not Send, so it never outlives these functions.

/// All text below `element`, whitespace runs collapsed to single spaces.
fn text_of(element: ElementRef<'_>) -> Option<String> {
    let text = element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ");
    (!text.is_empty()).then_some(text)
}

fn select_text(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    scope.select(selector).next().and_then(text_of)
}

fn select_attr(scope: ElementRef<'_>, selector: &Selector, attr: &str) -> Option<String> {
    scope
        .select(selector)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn count_from(text: Option<&str>, pattern: &Regex) -> i64 {
    text.map(str::to_lowercase)
        .and_then(|lower| {
            pattern
                .captures(&lower)
                .and_then(|caps| parse_compact_number(&caps[1].replace(' ', "")))
        })
        .unwrap_or(0)
}

fn first_count(text: Option<String>) -> i64 {
    text.and_then(|t| {
        COUNT_RE
            .find(&t)
            .and_then(|m| parse_compact_number(&m.as_str().replace(' ', "")))
    })
    .unwrap_or(0)
}

pub fn parse_about(html: &str, page_id: &str) -> ScrapedPage {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let info = select_text(root, &INFO_LIST);
    let specialities: Vec<String> = root.select(&SPECIALITIES).filter_map(text_of).collect();
    let founded_year = select_text(root, &FOUNDED)
        .and_then(|text| YEAR_RE.find(&text).and_then(|m| m.as_str().parse().ok()));

    ScrapedPage {
        page_id: page_id.to_string(),
        url: Some(format!("{}/{}", PUBLIC_COMPANY_URL, page_id)),
        name: select_text(root, &NAME),
        description: select_text(root, &TAGLINE),
        industry: select_text(root, &INFO_ITEM),
        follower_count: count_from(info.as_deref(), &FOLLOWERS_RE),
        employee_count: count_from(info.as_deref(), &EMPLOYEES_RE),
        website: select_attr(root, &WEBSITE, "href"),
        specialities: (!specialities.is_empty()).then(|| specialities.join(",")),
        headquarters: select_text(root, &HEADQUARTERS),
        profile_picture: select_attr(root, &LOGO, "src"),
        company_type: select_text(root, &COMPANY_TYPE),
        founded_year,
        ..Default::default()
    }
}

fn media_type(card: ElementRef<'_>) -> &'static str {
    if card.select(&VIDEO).next().is_some() {
        "video"
    } else if card.select(&IMAGE).next().is_some() {
        "image"
    } else if card.select(&ARTICLE).next().is_some() {
        "article"
    } else {
        "text"
    }
}

/// Post dates are not exposed, so the n-th card is dated n days back.
pub fn parse_posts(html: &str, page_id: &str, now: i64) -> Vec<ScrapedPost> {
    let document = Html::parse_document(html);

    document
        .select(&POST_CARD)
        .take(MAX_SCRAPED_POSTS)
        .enumerate()
        .map(|(idx, card)| {
            let urn = card.value().attr("data-urn").filter(|u| !u.is_empty());
            ScrapedPost {
                linkedin_post_id: Some(
                    urn.map(str::to_string)
                        .unwrap_or_else(|| format!("post_{}_{}", page_id, idx)),
                ),
                post_url: urn.map(|u| format!("https://www.linkedin.com/feed/update/{}/", u)),
                content: select_text(card, &POST_TEXT),
                like_count: first_count(select_text(card, &POST_LIKES)),
                comment_count: first_count(select_text(card, &POST_COMMENTS)),
                share_count: first_count(select_text(card, &POST_SHARES)),
                posted_at: Some(now - idx as i64 * DAY_MILLIS),
                media_type: Some(media_type(card).to_string()),
                ..Default::default()
            }
        })
        .collect()
}

/// Cards without a name are skipped.
pub fn parse_employees(html: &str) -> Vec<ScrapedUser> {
    let document = Html::parse_document(html);

    document
        .select(&PEOPLE_CARD)
        .take(MAX_SCRAPED_EMPLOYEES)
        .filter_map(|card| {
            let full_name = select_text(card, &PERSON_NAME)?;
            Some(ScrapedUser {
                full_name,
                headline: select_text(card, &PERSON_HEADLINE),
                profile_url: select_attr(card, &LINK, "href"),
                profile_picture: select_attr(card, &IMAGE, "src"),
                location: select_text(card, &PERSON_LOCATION),
                ..Default::default()
            })
        })
        .collect()
}
