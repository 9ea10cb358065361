// Database access for pages, posts, comments and users
// MySQL in production, in-memory SQLite for tests, each through its own typed pool

use async_trait::async_trait;
use sqlx::mysql::{MySql, MySqlPool, MySqlPoolOptions, MySqlQueryResult};
use sqlx::QueryBuilder;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::core::{PageFilter, Pagination};
use crate::error::{AppError, AppResult};
use crate::infrastructure::sqlite_database::SqliteDatabase;
use crate::models::{
    current_time_millis, CommentRow, PageRow, PostRow, ScrapedPage, ScrapedUser, UserRow,
};

pub(crate) const PAGE_COLUMNS: &str = "id, page_id, linkedin_id, name, url, profile_picture, \
    description, website, industry, follower_count, employee_count, specialities, headquarters, \
    founded_year, company_type, created_at, updated_at";

pub(crate) const POST_COLUMNS: &str = "id, linkedin_post_id, page_id, content, post_url, \
    media_url, media_type, like_count, comment_count, share_count, posted_at, created_at";

pub(crate) const COMMENT_COLUMNS: &str =
    "id, post_id, author_name, author_profile_url, content, like_count, commented_at, created_at";

pub(crate) const USER_COLUMNS: &str = "u.id, u.linkedin_id, u.username, u.full_name, \
    u.profile_url, u.profile_picture, u.headline, u.location, u.company_id, u.job_title, \
    u.created_at";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseBackend {
    MySql,
    Sqlite,
}

impl DatabaseBackend {
    pub fn from_url(url: &str) -> AppResult<Self> {
        if url.starts_with("mysql:") || url.starts_with("mariadb:") {
            Ok(DatabaseBackend::MySql)
        } else if url.starts_with("sqlite:") {
            Ok(DatabaseBackend::Sqlite)
        } else {
            Err(AppError::Configuration(format!(
                "Unsupported database URL scheme: {}",
                url.split(':').next().unwrap_or_default()
            )))
        }
    }

    fn primary_key(&self) -> &'static str {
        match self {
            DatabaseBackend::MySql => "BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY",
            DatabaseBackend::Sqlite => "INTEGER PRIMARY KEY AUTOINCREMENT",
        }
    }

    fn table_suffix(&self) -> &'static str {
        match self {
            DatabaseBackend::MySql => " ENGINE=InnoDB DEFAULT CHARSET=utf8mb4",
            DatabaseBackend::Sqlite => "",
        }
    }

    /// DDL for every table, in foreign-key order.
    pub(crate) fn schema(&self) -> Vec<String> {
        let pk = self.primary_key();
        let suffix = self.table_suffix();
        let (page_indexes, user_indexes) = match self {
            DatabaseBackend::MySql => (
                ",\n                INDEX idx_pages_follower_count (follower_count)",
                ",\n                INDEX idx_users_full_name (full_name)",
            ),
            DatabaseBackend::Sqlite => ("", ""),
        };

        let mut statements = vec![
            format!(
                r#"
            CREATE TABLE IF NOT EXISTS pages (
                id {pk},
                page_id VARCHAR(255) NOT NULL UNIQUE,
                linkedin_id VARCHAR(100),
                name VARCHAR(255) NOT NULL,
                url VARCHAR(500),
                profile_picture VARCHAR(1000),
                description TEXT,
                website VARCHAR(500),
                industry VARCHAR(255),
                follower_count BIGINT NOT NULL DEFAULT 0,
                employee_count BIGINT NOT NULL DEFAULT 0,
                specialities TEXT,
                headquarters VARCHAR(500),
                founded_year BIGINT,
                company_type VARCHAR(100),
                created_at BIGINT NOT NULL,
                updated_at BIGINT NOT NULL{page_indexes}
            ){suffix}"#
            ),
            format!(
                r#"
            CREATE TABLE IF NOT EXISTS users (
                id {pk},
                linkedin_id VARCHAR(100),
                username VARCHAR(255),
                full_name VARCHAR(255) NOT NULL,
                profile_url VARCHAR(500),
                profile_picture VARCHAR(1000),
                headline VARCHAR(500),
                location VARCHAR(255),
                company_id BIGINT,
                job_title VARCHAR(255),
                created_at BIGINT NOT NULL,
                FOREIGN KEY (company_id) REFERENCES pages(id) ON DELETE SET NULL{user_indexes}
            ){suffix}"#
            ),
            format!(
                r#"
            CREATE TABLE IF NOT EXISTS posts (
                id {pk},
                linkedin_post_id VARCHAR(100),
                page_id BIGINT NOT NULL,
                content TEXT,
                post_url VARCHAR(500),
                media_url VARCHAR(1000),
                media_type VARCHAR(50),
                like_count BIGINT NOT NULL DEFAULT 0,
                comment_count BIGINT NOT NULL DEFAULT 0,
                share_count BIGINT NOT NULL DEFAULT 0,
                posted_at BIGINT,
                created_at BIGINT NOT NULL,
                FOREIGN KEY (page_id) REFERENCES pages(id) ON DELETE CASCADE
            ){suffix}"#
            ),
            format!(
                r#"
            CREATE TABLE IF NOT EXISTS comments (
                id {pk},
                post_id BIGINT NOT NULL,
                author_name VARCHAR(255),
                author_profile_url VARCHAR(500),
                content TEXT,
                like_count BIGINT NOT NULL DEFAULT 0,
                commented_at BIGINT,
                created_at BIGINT NOT NULL,
                FOREIGN KEY (post_id) REFERENCES posts(id) ON DELETE CASCADE
            ){suffix}"#
            ),
            format!(
                r#"
            CREATE TABLE IF NOT EXISTS page_followers (
                page_id BIGINT NOT NULL,
                user_id BIGINT NOT NULL,
                followed_at BIGINT NOT NULL,
                PRIMARY KEY (page_id, user_id),
                FOREIGN KEY (page_id) REFERENCES pages(id) ON DELETE CASCADE,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            ){suffix}"#
            ),
        ];

        // InnoDB indexes foreign keys on its own; SQLite needs them spelled out.
        if *self == DatabaseBackend::Sqlite {
            statements.extend(
                [
                    "CREATE INDEX IF NOT EXISTS idx_pages_follower_count ON pages(follower_count)",
                    "CREATE INDEX IF NOT EXISTS idx_users_full_name ON users(full_name)",
                    "CREATE INDEX IF NOT EXISTS idx_users_company ON users(company_id)",
                    "CREATE INDEX IF NOT EXISTS idx_posts_page ON posts(page_id, posted_at)",
                    "CREATE INDEX IF NOT EXISTS idx_comments_post ON comments(post_id)",
                ]
                .into_iter()
                .map(str::to_string),
            );
        }

        statements
    }
}

/// Storage operations behind the page API.
#[async_trait]
pub trait PageStore: Send + Sync {
    /// Creates the tables and indexes if they are missing.
    async fn init(&self) -> AppResult<()>;

    async fn health_check(&self) -> AppResult<()>;

    /// Filtered page rows, most followed first, plus the unpaginated total.
    async fn list_pages(
        &self,
        filter: &PageFilter,
        pagination: Pagination,
    ) -> AppResult<(Vec<PageRow>, i64)>;

    async fn find_page(&self, page_id: &str) -> AppResult<Option<PageRow>>;

    /// Like `find_page`, but a missing page is a `NotFound` error.
    async fn get_page(&self, page_id: &str) -> AppResult<PageRow> {
        self.find_page(page_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Page not found".to_string()))
    }

    /// Newest first.
    async fn list_posts(
        &self,
        page: &PageRow,
        pagination: Pagination,
    ) -> AppResult<(Vec<PostRow>, i64)>;

    async fn recent_posts(&self, page: &PageRow, limit: i64) -> AppResult<Vec<PostRow>>;

    async fn list_comments(&self, post: &PostRow, limit: i64) -> AppResult<Vec<CommentRow>>;

    async fn list_employees(
        &self,
        page: &PageRow,
        pagination: Pagination,
    ) -> AppResult<(Vec<UserRow>, i64)>;

    async fn recent_employees(&self, page: &PageRow, limit: i64) -> AppResult<Vec<UserRow>>;

    async fn list_followers(
        &self,
        page: &PageRow,
        pagination: Pagination,
    ) -> AppResult<(Vec<UserRow>, i64)>;

    /// Persists one scrape in a single transaction and returns the stored page.
    ///
    /// Posts, employees and followers are only replaced when the scrape carries
    /// any, so a partial scrape never wipes existing relations.
    async fn save_scraped_page(&self, scraped: &ScrapedPage) -> AppResult<PageRow>;
}

/// Implements `PageStore` for a store with a typed `pool` field.
///
/// MySQL and SQLite accept the same statements, so only the DDL and the
/// insert-id lookup differ. The invoking module must have the row types,
/// `AppError`/`AppResult`, `QueryBuilder`, `HashSet`, `async_trait`, the
/// tracing macros and the column constants in scope.
macro_rules! impl_page_store {
    ($store:ty, $db:ty, $backend:expr, $inserted_id:ident) => {
        impl $store {
            fn push_page_filters(qb: &mut QueryBuilder<'_, $db>, filter: &PageFilter) {
                qb.push(" WHERE 1 = 1");
                if let Some(range) = filter.followers {
                    if let Some(min) = range.min {
                        qb.push(" AND follower_count >= ");
                        qb.push_bind(min);
                    }
                    if let Some(max) = range.max {
                        qb.push(" AND follower_count <= ");
                        qb.push_bind(max);
                    }
                }
                if let Some(name) = &filter.name {
                    qb.push(" AND LOWER(name) LIKE ");
                    qb.push_bind(contains_pattern(name));
                    qb.push(" ESCAPE '!'");
                }
                if let Some(industry) = &filter.industry {
                    qb.push(" AND LOWER(industry) LIKE ");
                    qb.push_bind(contains_pattern(industry));
                    qb.push(" ESCAPE '!'");
                }
            }

            async fn fetch_posts(
                &self,
                page_pk: i64,
                limit: i64,
                offset: i64,
            ) -> AppResult<Vec<PostRow>> {
                let posts = sqlx::query_as::<_, PostRow>(&format!(
                    "SELECT {} FROM posts WHERE page_id = ? \
                     ORDER BY posted_at DESC, id ASC LIMIT ? OFFSET ?",
                    POST_COLUMNS
                ))
                .bind(page_pk)
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?;
                Ok(posts)
            }

            async fn fetch_employees(
                &self,
                page_pk: i64,
                limit: i64,
                offset: i64,
            ) -> AppResult<Vec<UserRow>> {
                let employees = sqlx::query_as::<_, UserRow>(&format!(
                    "SELECT {} FROM users u WHERE u.company_id = ? \
                     ORDER BY u.id ASC LIMIT ? OFFSET ?",
                    USER_COLUMNS
                ))
                .bind(page_pk)
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?;
                Ok(employees)
            }

            /// Matches users by full name; the employer is only touched for employees.
            async fn upsert_user(
                tx: &mut sqlx::Transaction<'_, $db>,
                user: &ScrapedUser,
                company_id: Option<i64>,
                now: i64,
            ) -> AppResult<i64> {
                let existing: Option<i64> = sqlx::query_scalar(
                    "SELECT id FROM users WHERE full_name = ? ORDER BY id LIMIT 1",
                )
                .bind(user.full_name.clone())
                .fetch_optional(&mut **tx)
                .await?;

                match existing {
                    Some(id) => {
                        let mut qb = QueryBuilder::<$db>::new("UPDATE users SET headline = ");
                        qb.push_bind(user.headline.clone());
                        qb.push(", job_title = ");
                        qb.push_bind(user.effective_job_title());
                        qb.push(", profile_url = ");
                        qb.push_bind(user.profile_url.clone());
                        qb.push(", profile_picture = ");
                        qb.push_bind(user.profile_picture.clone());
                        qb.push(", location = ");
                        qb.push_bind(user.location.clone());
                        if let Some(company_id) = company_id {
                            qb.push(", company_id = ");
                            qb.push_bind(company_id);
                        }
                        qb.push(" WHERE id = ");
                        qb.push_bind(id);
                        qb.build().execute(&mut **tx).await?;
                        Ok(id)
                    }
                    None => {
                        let result = sqlx::query(
                            "INSERT INTO users (full_name, username, headline, job_title, \
                             profile_url, profile_picture, location, company_id, created_at) \
                             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
                        )
                        .bind(user.full_name.clone())
                        .bind(user.username.clone())
                        .bind(user.headline.clone())
                        .bind(user.effective_job_title())
                        .bind(user.profile_url.clone())
                        .bind(user.profile_picture.clone())
                        .bind(user.location.clone())
                        .bind(company_id)
                        .bind(now)
                        .execute(&mut **tx)
                        .await?;
                        $inserted_id(&result, "user")
                    }
                }
            }
        }

        #[async_trait]
        impl PageStore for $store {
            async fn init(&self) -> AppResult<()> {
                let backend: DatabaseBackend = $backend;
                for statement in backend.schema() {
                    sqlx::query(&statement)
                        .execute(&self.pool)
                        .await
                        .map_err(|e| {
                            AppError::DatabaseError(format!("Failed to create schema: {}", e))
                        })?;
                }
                info!(backend = ?backend, "database schema ready");
                Ok(())
            }

            async fn health_check(&self) -> AppResult<()> {
                sqlx::query("SELECT 1")
                    .execute(&self.pool)
                    .await
                    .map_err(|e| {
                        AppError::DatabaseError(format!("Database health check failed: {}", e))
                    })?;
                Ok(())
            }

            #[instrument(skip(self))]
            async fn list_pages(
                &self,
                filter: &PageFilter,
                pagination: Pagination,
            ) -> AppResult<(Vec<PageRow>, i64)> {
                let mut count_qb = QueryBuilder::<$db>::new("SELECT COUNT(*) FROM pages");
                Self::push_page_filters(&mut count_qb, filter);
                let total: i64 = count_qb
                    .build_query_scalar()
                    .fetch_one(&self.pool)
                    .await?;

                let mut qb =
                    QueryBuilder::<$db>::new(format!("SELECT {} FROM pages", PAGE_COLUMNS));
                Self::push_page_filters(&mut qb, filter);
                qb.push(" ORDER BY follower_count DESC, id ASC LIMIT ");
                qb.push_bind(pagination.limit());
                qb.push(" OFFSET ");
                qb.push_bind(pagination.offset());

                let pages = qb.build_query_as::<PageRow>().fetch_all(&self.pool).await?;
                Ok((pages, total))
            }

            async fn find_page(&self, page_id: &str) -> AppResult<Option<PageRow>> {
                let page = sqlx::query_as::<_, PageRow>(&format!(
                    "SELECT {} FROM pages WHERE page_id = ?",
                    PAGE_COLUMNS
                ))
                .bind(page_id.to_string())
                .fetch_optional(&self.pool)
                .await?;
                Ok(page)
            }

            async fn list_posts(
                &self,
                page: &PageRow,
                pagination: Pagination,
            ) -> AppResult<(Vec<PostRow>, i64)> {
                let total: i64 =
                    sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE page_id = ?")
                        .bind(page.id)
                        .fetch_one(&self.pool)
                        .await?;
                let posts = self
                    .fetch_posts(page.id, pagination.limit(), pagination.offset())
                    .await?;
                Ok((posts, total))
            }

            async fn recent_posts(&self, page: &PageRow, limit: i64) -> AppResult<Vec<PostRow>> {
                self.fetch_posts(page.id, limit, 0).await
            }

            async fn list_comments(
                &self,
                post: &PostRow,
                limit: i64,
            ) -> AppResult<Vec<CommentRow>> {
                let comments = sqlx::query_as::<_, CommentRow>(&format!(
                    "SELECT {} FROM comments WHERE post_id = ? ORDER BY id ASC LIMIT ?",
                    COMMENT_COLUMNS
                ))
                .bind(post.id)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?;
                Ok(comments)
            }

            async fn list_employees(
                &self,
                page: &PageRow,
                pagination: Pagination,
            ) -> AppResult<(Vec<UserRow>, i64)> {
                let total: i64 =
                    sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE company_id = ?")
                        .bind(page.id)
                        .fetch_one(&self.pool)
                        .await?;
                let employees = self
                    .fetch_employees(page.id, pagination.limit(), pagination.offset())
                    .await?;
                Ok((employees, total))
            }

            async fn recent_employees(
                &self,
                page: &PageRow,
                limit: i64,
            ) -> AppResult<Vec<UserRow>> {
                self.fetch_employees(page.id, limit, 0).await
            }

            async fn list_followers(
                &self,
                page: &PageRow,
                pagination: Pagination,
            ) -> AppResult<(Vec<UserRow>, i64)> {
                let total: i64 =
                    sqlx::query_scalar("SELECT COUNT(*) FROM page_followers WHERE page_id = ?")
                        .bind(page.id)
                        .fetch_one(&self.pool)
                        .await?;
                let followers = sqlx::query_as::<_, UserRow>(&format!(
                    "SELECT {} FROM users u JOIN page_followers pf ON pf.user_id = u.id \
                     WHERE pf.page_id = ? ORDER BY pf.followed_at DESC, u.id ASC \
                     LIMIT ? OFFSET ?",
                    USER_COLUMNS
                ))
                .bind(page.id)
                .bind(pagination.limit())
                .bind(pagination.offset())
                .fetch_all(&self.pool)
                .await?;
                Ok((followers, total))
            }

            #[instrument(skip(self, scraped), fields(page_id = %scraped.page_id))]
            async fn save_scraped_page(&self, scraped: &ScrapedPage) -> AppResult<PageRow> {
                let now = current_time_millis();
                let mut tx = self.pool.begin().await.map_err(|e| {
                    AppError::DatabaseError(format!("Failed to begin transaction: {}", e))
                })?;

                let existing: Option<i64> =
                    sqlx::query_scalar("SELECT id FROM pages WHERE page_id = ?")
                        .bind(scraped.page_id.clone())
                        .fetch_optional(&mut *tx)
                        .await?;

                let page_pk = match existing {
                    Some(id) => {
                        sqlx::query(
                            "UPDATE pages SET \
                             name = COALESCE(?, name), \
                             linkedin_id = COALESCE(?, linkedin_id), \
                             url = COALESCE(?, url), \
                             profile_picture = COALESCE(?, profile_picture), \
                             description = COALESCE(?, description), \
                             website = COALESCE(?, website), \
                             industry = COALESCE(?, industry), \
                             follower_count = ?, \
                             employee_count = ?, \
                             specialities = COALESCE(?, specialities), \
                             headquarters = COALESCE(?, headquarters), \
                             founded_year = COALESCE(?, founded_year), \
                             company_type = COALESCE(?, company_type), \
                             updated_at = ? \
                             WHERE id = ?",
                        )
                        .bind(scraped.name.clone())
                        .bind(scraped.linkedin_id.clone())
                        .bind(scraped.url.clone())
                        .bind(scraped.profile_picture.clone())
                        .bind(scraped.description.clone())
                        .bind(scraped.website.clone())
                        .bind(scraped.industry.clone())
                        .bind(scraped.follower_count)
                        .bind(scraped.employee_count)
                        .bind(scraped.specialities.clone())
                        .bind(scraped.headquarters.clone())
                        .bind(scraped.founded_year)
                        .bind(scraped.company_type.clone())
                        .bind(now)
                        .bind(id)
                        .execute(&mut *tx)
                        .await?;
                        id
                    }
                    None => {
                        let result = sqlx::query(
                            "INSERT INTO pages (page_id, linkedin_id, name, url, profile_picture, \
                             description, website, industry, follower_count, employee_count, \
                             specialities, headquarters, founded_year, company_type, created_at, \
                             updated_at) \
                             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                        )
                        .bind(scraped.page_id.clone())
                        .bind(scraped.linkedin_id.clone())
                        .bind(
                            scraped
                                .name
                                .clone()
                                .unwrap_or_else(|| scraped.page_id.clone()),
                        )
                        .bind(scraped.url.clone())
                        .bind(scraped.profile_picture.clone())
                        .bind(scraped.description.clone())
                        .bind(scraped.website.clone())
                        .bind(scraped.industry.clone())
                        .bind(scraped.follower_count)
                        .bind(scraped.employee_count)
                        .bind(scraped.specialities.clone())
                        .bind(scraped.headquarters.clone())
                        .bind(scraped.founded_year)
                        .bind(scraped.company_type.clone())
                        .bind(now)
                        .bind(now)
                        .execute(&mut *tx)
                        .await?;
                        $inserted_id(&result, "page")?
                    }
                };

                if !scraped.posts.is_empty() {
                    sqlx::query(
                        "DELETE FROM comments WHERE post_id IN \
                         (SELECT id FROM posts WHERE page_id = ?)",
                    )
                    .bind(page_pk)
                    .execute(&mut *tx)
                    .await?;
                    sqlx::query("DELETE FROM posts WHERE page_id = ?")
                        .bind(page_pk)
                        .execute(&mut *tx)
                        .await?;

                    for post in &scraped.posts {
                        let result = sqlx::query(
                            "INSERT INTO posts (linkedin_post_id, page_id, content, post_url, \
                             media_url, media_type, like_count, comment_count, share_count, \
                             posted_at, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                        )
                        .bind(post.linkedin_post_id.clone())
                        .bind(page_pk)
                        .bind(post.content.clone())
                        .bind(post.post_url.clone())
                        .bind(post.media_url.clone())
                        .bind(post.media_type.clone())
                        .bind(post.like_count)
                        .bind(post.comment_count)
                        .bind(post.share_count)
                        .bind(post.posted_at)
                        .bind(now)
                        .execute(&mut *tx)
                        .await?;
                        let post_pk = $inserted_id(&result, "post")?;

                        for comment in &post.comments {
                            sqlx::query(
                                "INSERT INTO comments (post_id, author_name, author_profile_url, \
                                 content, like_count, commented_at, created_at) \
                                 VALUES (?, ?, ?, ?, ?, ?, ?)",
                            )
                            .bind(post_pk)
                            .bind(comment.author_name.clone())
                            .bind(comment.author_profile_url.clone())
                            .bind(comment.content.clone())
                            .bind(comment.like_count)
                            .bind(comment.commented_at)
                            .bind(now)
                            .execute(&mut *tx)
                            .await?;
                        }
                    }
                }

                if !scraped.employees.is_empty() {
                    sqlx::query("UPDATE users SET company_id = NULL WHERE company_id = ?")
                        .bind(page_pk)
                        .execute(&mut *tx)
                        .await?;

                    for employee in &scraped.employees {
                        Self::upsert_user(&mut tx, employee, Some(page_pk), now).await?;
                    }
                }

                if !scraped.followers.is_empty() {
                    sqlx::query("DELETE FROM page_followers WHERE page_id = ?")
                        .bind(page_pk)
                        .execute(&mut *tx)
                        .await?;

                    let mut linked = HashSet::new();
                    for follower in &scraped.followers {
                        let user_pk = Self::upsert_user(&mut tx, follower, None, now).await?;
                        if linked.insert(user_pk) {
                            sqlx::query(
                                "INSERT INTO page_followers (page_id, user_id, followed_at) \
                                 VALUES (?, ?, ?)",
                            )
                            .bind(page_pk)
                            .bind(user_pk)
                            .bind(now)
                            .execute(&mut *tx)
                            .await?;
                        }
                    }
                }

                tx.commit().await.map_err(|e| {
                    AppError::DatabaseError(format!("Failed to commit transaction: {}", e))
                })?;

                info!(
                    posts = scraped.posts.len(),
                    employees = scraped.employees.len(),
                    followers = scraped.followers.len(),
                    "saved scraped page"
                );

                self.get_page(&scraped.page_id).await
            }
        }
    };
}

pub(crate) use impl_page_store;

/// MySQL store used in production.
pub struct MySqlDatabase {
    pool: MySqlPool,
}

impl MySqlDatabase {
    pub async fn connect(url: &str, max_connections: u32) -> AppResult<Self> {
        let pool = MySqlPoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect(url)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to connect to database: {}", e)))?;
        Ok(Self { pool })
    }
}

fn inserted_id(result: &MySqlQueryResult, what: &str) -> AppResult<i64> {
    i64::try_from(result.last_insert_id()).map_err(|_| {
        AppError::DatabaseError(format!("Id of the new {} is out of range", what))
    })
}

impl_page_store!(MySqlDatabase, MySql, DatabaseBackend::MySql, inserted_id);

/// Shared handle to whichever store the URL selected.
#[derive(Clone)]
pub struct Database {
    store: Arc<dyn PageStore>,
    backend: DatabaseBackend,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("backend", &self.backend)
            .finish()
    }
}

impl Database {
    pub async fn connect(url: &str, max_connections: u32) -> AppResult<Self> {
        let backend = DatabaseBackend::from_url(url)?;
        let store: Arc<dyn PageStore> = match backend {
            DatabaseBackend::MySql => Arc::new(MySqlDatabase::connect(url, max_connections).await?),
            DatabaseBackend::Sqlite => {
                Arc::new(SqliteDatabase::connect(url, max_connections).await?)
            }
        };
        Ok(Self { store, backend })
    }

    /// Connects to a fresh in-memory SQLite database with the schema applied.
    pub async fn in_memory() -> AppResult<Self> {
        let store = SqliteDatabase::new_in_memory().await?;
        Ok(Self {
            store: Arc::new(store),
            backend: DatabaseBackend::Sqlite,
        })
    }

    pub async fn init(&self) -> AppResult<()> {
        self.store.init().await
    }

    pub async fn health_check(&self) -> AppResult<()> {
        self.store.health_check().await
    }

    pub async fn list_pages(
        &self,
        filter: &PageFilter,
        pagination: Pagination,
    ) -> AppResult<(Vec<PageRow>, i64)> {
        self.store.list_pages(filter, pagination).await
    }

    pub async fn find_page(&self, page_id: &str) -> AppResult<Option<PageRow>> {
        self.store.find_page(page_id).await
    }

    pub async fn get_page(&self, page_id: &str) -> AppResult<PageRow> {
        self.store.get_page(page_id).await
    }

    pub async fn list_posts(
        &self,
        page: &PageRow,
        pagination: Pagination,
    ) -> AppResult<(Vec<PostRow>, i64)> {
        self.store.list_posts(page, pagination).await
    }

    pub async fn recent_posts(&self, page: &PageRow, limit: i64) -> AppResult<Vec<PostRow>> {
        self.store.recent_posts(page, limit).await
    }

    pub async fn list_comments(&self, post: &PostRow, limit: i64) -> AppResult<Vec<CommentRow>> {
        self.store.list_comments(post, limit).await
    }

    pub async fn list_employees(
        &self,
        page: &PageRow,
        pagination: Pagination,
    ) -> AppResult<(Vec<UserRow>, i64)> {
        self.store.list_employees(page, pagination).await
    }

    pub async fn recent_employees(&self, page: &PageRow, limit: i64) -> AppResult<Vec<UserRow>> {
        self.store.recent_employees(page, limit).await
    }

    pub async fn list_followers(
        &self,
        page: &PageRow,
        pagination: Pagination,
    ) -> AppResult<(Vec<UserRow>, i64)> {
        self.store.list_followers(page, pagination).await
    }

    pub async fn save_scraped_page(&self, scraped: &ScrapedPage) -> AppResult<PageRow> {
        self.store.save_scraped_page(scraped).await
    }

    /// Creates the configured MySQL database when it does not exist yet.
    pub async fn create_database_if_missing(url: &str) -> AppResult<()> {
        if DatabaseBackend::from_url(url)? != DatabaseBackend::MySql {
            return Ok(());
        }

        let (server_url, name) = split_database_name(url)?;
        let pool = MySqlPoolOptions::new()
            .max_connections(1)
            .connect(&server_url)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to connect to server: {}", e)))?;

        sqlx::query(&format!("CREATE DATABASE IF NOT EXISTS `{}`", name))
            .execute(&pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to create database: {}", e)))?;
        pool.close().await;

        info!(database = %name, "database created or already exists");
        Ok(())
    }
}

/// Case-insensitive substring pattern with LIKE wildcards escaped by `!`.
///
/// The column side is folded with SQL `LOWER()`. MySQL folds every letter,
/// SQLite only ASCII ones, so on SQLite non-ASCII letters match as written.
pub(crate) fn contains_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.to_lowercase().chars() {
        if matches!(c, '!' | '%' | '_') {
            escaped.push('!');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Splits `mysql://user@host/name` into the server URL and the database name.
fn split_database_name(url: &str) -> AppResult<(String, String)> {
    let (server, name) = url
        .rsplit_once('/')
        .filter(|(server, _)| server.contains("://") && !server.ends_with('/'))
        .ok_or_else(|| {
            AppError::Configuration("Database URL does not name a database".to_string())
        })?;
    let name = name.split('?').next().unwrap_or_default();

    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(AppError::Configuration(format!(
            "Invalid database name: {:?}",
            name
        )));
    }
    Ok((server.to_string(), name.to_string()))
}
