use serde::Serialize;

use super::format_millis;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostRow {
    pub id: i64,
    pub linkedin_post_id: Option<String>,
    pub page_id: i64,
    pub content: Option<String>,
    pub post_url: Option<String>,
    pub media_url: Option<String>,
    pub media_type: Option<String>,
    pub like_count: i64,
    pub comment_count: i64,
    pub share_count: i64,
    pub posted_at: Option<i64>,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub id: i64,
    pub linkedin_post_id: Option<String>,
    pub content: Option<String>,
    pub post_url: Option<String>,
    pub media_url: Option<String>,
    pub media_type: Option<String>,
    pub like_count: i64,
    pub comment_count: i64,
    pub share_count: i64,
    pub posted_at: Option<String>,
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<CommentView>>,
}

impl PostRow {
    pub fn to_view(&self) -> PostView {
        PostView {
            id: self.id,
            linkedin_post_id: self.linkedin_post_id.clone(),
            content: self.content.clone(),
            post_url: self.post_url.clone(),
            media_url: self.media_url.clone(),
            media_type: self.media_type.clone(),
            like_count: self.like_count,
            comment_count: self.comment_count,
            share_count: self.share_count,
            posted_at: format_millis(self.posted_at),
            created_at: format_millis(Some(self.created_at)),
            comments: None,
        }
    }
}

impl PostView {
    pub fn with_comments(mut self, comments: Vec<CommentView>) -> Self {
        self.comments = Some(comments);
        self
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CommentRow {
    pub id: i64,
    pub post_id: i64,
    pub author_name: Option<String>,
    pub author_profile_url: Option<String>,
    pub content: Option<String>,
    pub like_count: i64,
    pub commented_at: Option<i64>,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    pub id: i64,
    pub author_name: Option<String>,
    pub author_profile_url: Option<String>,
    pub content: Option<String>,
    pub like_count: i64,
    pub commented_at: Option<String>,
}

impl CommentRow {
    pub fn to_view(&self) -> CommentView {
        CommentView {
            id: self.id,
            author_name: self.author_name.clone(),
            author_profile_url: self.author_profile_url.clone(),
            content: self.content.clone(),
            like_count: self.like_count,
            commented_at: format_millis(self.commented_at),
        }
    }
}
