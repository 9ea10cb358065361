// Storage and caching infrastructure
pub mod cache;
pub mod database;
pub mod sqlite_database;

pub use cache::{CacheEntry, PageCache, PageCacheKey, TtlCache};
pub use database::{Database, DatabaseBackend, MySqlDatabase, PageStore};
pub use sqlite_database::SqliteDatabase;
