use serde::Serialize;

use super::{format_millis, PostView, UserView};

/// A row of the `pages` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PageRow {
    pub id: i64,
    pub page_id: String,
    pub linkedin_id: Option<String>,
    pub name: String,
    pub url: Option<String>,
    pub profile_picture: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub industry: Option<String>,
    pub follower_count: i64,
    pub employee_count: i64,
    pub specialities: Option<String>,
    pub headquarters: Option<String>,
    pub founded_year: Option<i64>,
    pub company_type: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PageView {
    pub id: i64,
    pub page_id: String,
    pub linkedin_id: Option<String>,
    pub name: String,
    pub url: Option<String>,
    pub profile_picture: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub industry: Option<String>,
    pub follower_count: i64,
    pub employee_count: i64,
    pub specialities: Vec<String>,
    pub headquarters: Option<String>,
    pub founded_year: Option<i64>,
    pub company_type: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub posts: Option<Vec<PostView>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employees: Option<Vec<UserView>>,
}

impl PageRow {
    /// Specialities are stored comma-joined.
    pub fn speciality_list(&self) -> Vec<String> {
        self.specialities
            .as_deref()
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn to_view(&self) -> PageView {
        PageView {
            id: self.id,
            page_id: self.page_id.clone(),
            linkedin_id: self.linkedin_id.clone(),
            name: self.name.clone(),
            url: self.url.clone(),
            profile_picture: self.profile_picture.clone(),
            description: self.description.clone(),
            website: self.website.clone(),
            industry: self.industry.clone(),
            follower_count: self.follower_count,
            employee_count: self.employee_count,
            specialities: self.speciality_list(),
            headquarters: self.headquarters.clone(),
            founded_year: self.founded_year,
            company_type: self.company_type.clone(),
            created_at: format_millis(Some(self.created_at)),
            updated_at: format_millis(Some(self.updated_at)),
            posts: None,
            employees: None,
        }
    }
}

impl PageView {
    pub fn with_posts(mut self, posts: Vec<PostView>) -> Self {
        self.posts = Some(posts);
        self
    }

    pub fn with_employees(mut self, employees: Vec<UserView>) -> Self {
        self.employees = Some(employees);
        self
    }
}
