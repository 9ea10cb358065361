// Relational models for LinkedIn company pages and the JSON views served by the API

pub mod page;
pub mod post;
pub mod scraped;
pub mod user;

pub use page::{PageRow, PageView};
pub use post::{CommentRow, CommentView, PostRow, PostView};
pub use scraped::{ScrapedComment, ScrapedPage, ScrapedPost, ScrapedUser};
pub use user::{UserRow, UserView};

use chrono::{DateTime, SecondsFormat, Utc};

/// Timestamps are persisted as epoch milliseconds.
pub fn current_time_millis() -> i64 {
    Utc::now().timestamp_millis()
}

pub fn format_millis(millis: Option<i64>) -> Option<String> {
    millis
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
}
