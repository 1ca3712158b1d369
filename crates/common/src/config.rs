//! Application configuration.

use serde::Deserialize;
use std::path::PathBuf;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Content rules (page size, minimum text lengths, caching).
    #[serde(default)]
    pub content: ContentConfig,
    /// Uploaded media configuration.
    #[serde(default)]
    pub media: MediaConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public URL of this instance.
    pub url: String,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Content rules shared by the listing and form handlers.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentConfig {
    /// Number of posts on one listing page.
    #[serde(default = "default_posts_per_page")]
    pub posts_per_page: u64,
    /// Minimum post text length, in characters.
    #[serde(default = "default_post_min_len")]
    pub post_min_len: usize,
    /// Minimum comment text length, in characters.
    #[serde(default = "default_comment_min_len")]
    pub comment_min_len: usize,
    /// How long a rendered index page stays cached, in seconds.
    #[serde(default = "default_index_cache_secs")]
    pub index_cache_secs: u64,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            posts_per_page: default_posts_per_page(),
            post_min_len: default_post_min_len(),
            comment_min_len: default_comment_min_len(),
            index_cache_secs: default_index_cache_secs(),
        }
    }
}

/// Uploaded media configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaConfig {
    /// Directory uploaded files are written to.
    #[serde(default = "default_media_path")]
    pub path: PathBuf,
    /// URL prefix uploaded files are served under.
    #[serde(default = "default_media_url")]
    pub url: String,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            path: default_media_path(),
            url: default_media_url(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    8000
}

const fn default_max_connections() -> u32 {
    20
}

const fn default_min_connections() -> u32 {
    2
}

const fn default_posts_per_page() -> u64 {
    10
}

const fn default_post_min_len() -> usize {
    10
}

const fn default_comment_min_len() -> usize {
    3
}

// 20 minutes
const fn default_index_cache_secs() -> u64 {
    20 * 60
}

fn default_media_path() -> PathBuf {
    PathBuf::from("./media")
}

fn default_media_url() -> String {
    "/media".to_string()
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `.env` (if present, exported into the process environment)
    /// 2. `config/default.toml`
    /// 3. `config/{environment}.toml` (based on `YATUBE_ENV`)
    /// 4. Environment variables with `YATUBE__` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let env = std::env::var("YATUBE_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("YATUBE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_content_defaults() {
        let content = ContentConfig::default();
        assert_eq!(content.posts_per_page, 10);
        assert_eq!(content.index_cache_secs, 1200);
        assert!(content.post_min_len > 0);
        assert!(content.comment_min_len > 0);
    }

    #[test]
    fn test_deserialize_minimal_config() {
        let raw = config::Config::builder()
            .add_source(config::File::from_str(
                r#"
                [server]
                url = "http://localhost:8000"

                [database]
                url = "sqlite::memory:"

                [content]
                posts_per_page = 5
                "#,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();

        let config: Config = raw.try_deserialize().unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.content.posts_per_page, 5);
        assert_eq!(config.content.post_min_len, 10);
        assert_eq!(config.media.url, "/media");
    }
}
