// Page summaries: a fixed template, optionally rewritten by an OpenAI chat model

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::{instrument, warn};

use crate::config::OpenAiConfig;
use crate::error::{AppError, AppResult};
use crate::models::PageRow;

const SYSTEM_PROMPT: &str = "You are a business analyst providing LinkedIn company insights.";
const MAX_TOKENS: u32 = 300;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicSummary {
    pub company_overview: String,
    pub size: String,
    pub presence: String,
    pub specialties: String,
    pub engagement: String,
}

impl BasicSummary {
    pub fn for_page(page: &PageRow) -> Self {
        Self {
            company_overview: format!(
                "{} is a {} in the {} industry.",
                page.name,
                page.company_type.as_deref().unwrap_or("company"),
                page.industry.as_deref().unwrap_or("business")
            ),
            size: format!(
                "The company has approximately {} employees and {} followers on LinkedIn.",
                page.employee_count, page.follower_count
            ),
            presence: format!(
                "They are headquartered in {}.",
                page.headquarters
                    .as_deref()
                    .unwrap_or("an undisclosed location")
            ),
            specialties: format!(
                "Their areas of expertise include: {}.",
                page.specialities.as_deref().unwrap_or("various fields")
            ),
            engagement: "The company maintains an active presence on LinkedIn with regular posts and updates."
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SummaryText {
    Generated(String),
    Basic(BasicSummary),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSummary {
    pub ai_generated: bool,
    pub summary: SummaryText,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub basic_stats: Option<BasicSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

pub struct Summarizer {
    client: reqwest::Client,
    config: OpenAiConfig,
}

impl Summarizer {
    pub fn new(config: OpenAiConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    /// Never fails. AI errors are reported inside the summary.
    #[instrument(skip(self, page), fields(page_id = %page.page_id))]
    pub async fn summarize(&self, page: &PageRow) -> PageSummary {
        let basic = BasicSummary::for_page(page);

        let Some(api_key) = self.config.api_key.as_deref() else {
            return PageSummary {
                ai_generated: false,
                summary: SummaryText::Basic(basic),
                basic_stats: None,
                error: None,
            };
        };

        match self.generate(api_key, page).await {
            Ok(text) => PageSummary {
                ai_generated: true,
                summary: SummaryText::Generated(text),
                basic_stats: Some(basic),
                error: None,
            },
            Err(e) => {
                warn!("AI summary failed: {:#}", e);
                PageSummary {
                    ai_generated: false,
                    summary: SummaryText::Basic(basic),
                    basic_stats: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    async fn generate(&self, api_key: &str, page: &PageRow) -> anyhow::Result<String> {
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        let body = json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": user_prompt(page) },
            ],
            "max_tokens": MAX_TOKENS,
        });

        let completion: ChatCompletion = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| anyhow::anyhow!("Model returned an empty completion"))
    }
}

fn user_prompt(page: &PageRow) -> String {
    let field = |value: &Option<String>| value.clone().unwrap_or_else(|| "Unknown".to_string());
    format!(
        "Analyze this LinkedIn company page and provide a brief professional summary:\n\n\
         Company: {}\n\
         Industry: {}\n\
         Description: {}\n\
         Followers: {}\n\
         Employees: {}\n\
         Specialties: {}\n\
         Headquarters: {}\n\n\
         Provide a concise summary covering: company overview, market position, and key insights.",
        page.name,
        field(&page.industry),
        field(&page.description),
        page.follower_count,
        page.employee_count,
        field(&page.specialities),
        field(&page.headquarters),
    )
}
