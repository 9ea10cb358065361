use serde::Serialize;

use super::format_millis;

/// An employee or follower. Employment is `company_id`; following lives in `page_followers`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: i64,
    pub linkedin_id: Option<String>,
    pub username: Option<String>,
    pub full_name: String,
    pub profile_url: Option<String>,
    pub profile_picture: Option<String>,
    pub headline: Option<String>,
    pub location: Option<String>,
    pub company_id: Option<i64>,
    pub job_title: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub id: i64,
    pub linkedin_id: Option<String>,
    pub username: Option<String>,
    pub full_name: String,
    pub profile_url: Option<String>,
    pub profile_picture: Option<String>,
    pub headline: Option<String>,
    pub location: Option<String>,
    pub job_title: Option<String>,
    pub created_at: Option<String>,
}

impl UserRow {
    pub fn to_view(&self) -> UserView {
        UserView {
            id: self.id,
            linkedin_id: self.linkedin_id.clone(),
            username: self.username.clone(),
            full_name: self.full_name.clone(),
            profile_url: self.profile_url.clone(),
            profile_picture: self.profile_picture.clone(),
            headline: self.headline.clone(),
            location: self.location.clone(),
            job_title: self.job_title.clone(),
            created_at: format_millis(Some(self.created_at)),
        }
    }
}
