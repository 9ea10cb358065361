use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

use crate::error::{AppError, AppResult};

pub const DEV_SECRET_KEY: &str = "dev_key_change_in_production";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub cache: CacheConfig,
    pub pagination: PaginationConfig,
    pub scraper: ScraperConfig,
    pub openai: OpenAiConfig,
    pub secret_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub ttl_secs: u64,
    pub capacity: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    pub default_page_size: u32,
    pub max_page_size: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// Summaries fall back to the basic template when unset.
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite::memory:".to_string(),
                max_connections: 1,
            },
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            cache: CacheConfig {
                ttl_secs: 300,
                capacity: 1000,
            },
            pagination: PaginationConfig {
                default_page_size: 10,
                max_page_size: 50,
            },
            scraper: ScraperConfig {
                base_url: "https://www.linkedin.com/company".to_string(),
                timeout_secs: 20,
                min_delay_ms: 1000,
                max_delay_ms: 3000,
            },
            openai: OpenAiConfig {
                api_key: None,
                base_url: "https://api.openai.com/v1".to_string(),
                model: "gpt-3.5-turbo".to_string(),
            },
            secret_key: DEV_SECRET_KEY.to_string(),
        }
    }
}

impl Config {
    /// Reads the process environment, after loading `.env` when one exists.
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let database_url = match env::var("DATABASE_URL") {
            Ok(url) => url,
            Err(_) => mysql_url(
                &var_or("DB_HOST", "localhost"),
                &var_or("DB_USER", "root"),
                &var_or("DB_PASSWORD", ""),
                &var_or("DB_NAME", "linkedin_insights"),
            ),
        };

        Ok(Self {
            database: DatabaseConfig {
                url: database_url,
                max_connections: parse_var("DB_MAX_CONNECTIONS", 10)?,
            },
            server: ServerConfig {
                host: var_or("SERVER_HOST", &defaults.server.host),
                port: parse_var("SERVER_PORT", defaults.server.port)?,
            },
            cache: CacheConfig {
                ttl_secs: parse_var("CACHE_TTL_SECS", defaults.cache.ttl_secs)?,
                capacity: parse_var("CACHE_CAPACITY", defaults.cache.capacity)?,
            },
            pagination: PaginationConfig {
                default_page_size: parse_var(
                    "DEFAULT_PAGE_SIZE",
                    defaults.pagination.default_page_size,
                )?,
                max_page_size: parse_var("MAX_PAGE_SIZE", defaults.pagination.max_page_size)?,
            },
            scraper: ScraperConfig {
                base_url: var_or("SCRAPER_BASE_URL", &defaults.scraper.base_url),
                timeout_secs: parse_var("SCRAPER_TIMEOUT_SECS", defaults.scraper.timeout_secs)?,
                min_delay_ms: parse_var("SCRAPER_MIN_DELAY_MS", defaults.scraper.min_delay_ms)?,
                max_delay_ms: parse_var("SCRAPER_MAX_DELAY_MS", defaults.scraper.max_delay_ms)?,
            },
            openai: OpenAiConfig {
                api_key: env::var("OPENAI_API_KEY")
                    .ok()
                    .filter(|key| !key.trim().is_empty()),
                base_url: var_or("OPENAI_BASE_URL", &defaults.openai.base_url),
                model: var_or("OPENAI_MODEL", &defaults.openai.model),
            },
            secret_key: var_or("SECRET_KEY", DEV_SECRET_KEY),
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.secret_key == DEV_SECRET_KEY
    }
}

pub fn mysql_url(host: &str, user: &str, password: &str, name: &str) -> String {
    if password.is_empty() {
        format!("mysql://{}@{}/{}", user, host, name)
    } else {
        format!("mysql://{}:{}@{}/{}", user, password, host, name)
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T: FromStr>(key: &str, default: T) -> AppResult<T> {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|_| {
            AppError::Configuration(format!("{} has an invalid value: {:?}", key, raw))
        }),
        Err(_) => Ok(default),
    }
}
