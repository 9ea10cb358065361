// Scraper output, before it is persisted

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrapedPage {
    pub page_id: String,
    pub linkedin_id: Option<String>,
    pub name: Option<String>,
    pub url: Option<String>,
    pub profile_picture: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub industry: Option<String>,
    pub follower_count: i64,
    pub employee_count: i64,
    /// Comma-joined, as stored.
    pub specialities: Option<String>,
    pub headquarters: Option<String>,
    pub founded_year: Option<i64>,
    pub company_type: Option<String>,
    #[serde(default)]
    pub posts: Vec<ScrapedPost>,
    #[serde(default)]
    pub employees: Vec<ScrapedUser>,
    #[serde(default)]
    pub followers: Vec<ScrapedUser>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrapedPost {
    pub linkedin_post_id: Option<String>,
    pub content: Option<String>,
    pub post_url: Option<String>,
    pub media_url: Option<String>,
    pub media_type: Option<String>,
    pub like_count: i64,
    pub comment_count: i64,
    pub share_count: i64,
    pub posted_at: Option<i64>,
    #[serde(default)]
    pub comments: Vec<ScrapedComment>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrapedComment {
    pub author_name: Option<String>,
    pub author_profile_url: Option<String>,
    pub content: Option<String>,
    pub like_count: i64,
    pub commented_at: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrapedUser {
    pub full_name: String,
    pub username: Option<String>,
    pub headline: Option<String>,
    pub job_title: Option<String>,
    pub location: Option<String>,
    pub profile_url: Option<String>,
    pub profile_picture: Option<String>,
}

impl ScrapedPage {
    pub fn new(page_id: impl Into<String>) -> Self {
        Self {
            page_id: page_id.into(),
            ..Default::default()
        }
    }
}

impl ScrapedUser {
    /// `job_title` falls back to the headline.
    pub fn effective_job_title(&self) -> Option<String> {
        self.job_title.clone().or_else(|| self.headline.clone())
    }
}
