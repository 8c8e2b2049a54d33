//! Site configuration (_config.yml / _config.toml)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Environment variable holding the key-value REST endpoint
pub const KV_URL_ENV: &str = "KV_REST_API_URL";
/// Environment variable holding the key-value REST token
pub const KV_TOKEN_ENV: &str = "KV_REST_API_TOKEN";

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub author: String,
    pub language: String,
    /// Public base URL, used for share links
    pub url: String,
    /// IANA zone used to interpret dates without an offset; local time when empty
    pub timezone: String,
    /// Date format for rendered pages (chrono syntax)
    pub date_format: String,
    /// Tags shown in the home page sidebar
    pub featured_tags: Vec<String>,

    pub content: ContentConfig,
    pub reading: ReadingConfig,
    pub server: ServerConfig,
    pub counter: CounterConfig,
    pub github: GithubConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Inkpost".to_string(),
            description: "A personal blog".to_string(),
            author: "John Doe".to_string(),
            language: "en".to_string(),
            url: "http://localhost:4000".to_string(),
            timezone: String::new(),
            date_format: "%Y-%m-%d".to_string(),
            featured_tags: Vec::new(),
            content: ContentConfig::default(),
            reading: ReadingConfig::default(),
            server: ServerConfig::default(),
            counter: CounterConfig::default(),
            github: GithubConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a YAML or TOML file, chosen by extension
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {:?}", path))?;

        let config: SiteConfig = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => toml::from_str(&content)
                .with_context(|| format!("Invalid TOML in {:?}", path))?,
            _ => serde_yaml::from_str(&content)
                .with_context(|| format!("Invalid YAML in {:?}", path))?,
        };
        Ok(config)
    }

    /// Find and load the config file in a site directory, or fall back to defaults
    pub fn discover<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref();
        for name in ["_config.yml", "_config.yaml", "_config.toml"] {
            let candidate = base_dir.join(name);
            if candidate.exists() {
                tracing::debug!("Loading config from {:?}", candidate);
                return Self::load(candidate);
            }
        }
        Ok(Self::default())
    }

    /// Apply the `KV_REST_API_*` variables on top of the file settings
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(KV_URL_ENV).filter(|v| !v.is_empty()) {
            self.counter.url = Some(url);
            if self.counter.backend == CounterBackend::None {
                self.counter.backend = CounterBackend::Upstash;
            }
        }
        if let Some(token) = lookup(KV_TOKEN_ENV).filter(|v| !v.is_empty()) {
            self.counter.token = Some(token);
        }
    }

    /// Parsed timezone, if one is configured and valid
    pub fn tz(&self) -> Option<chrono_tz::Tz> {
        if self.timezone.is_empty() {
            return None;
        }
        match self.timezone.parse::<chrono_tz::Tz>() {
            Ok(tz) => Some(tz),
            Err(e) => {
                tracing::warn!("Ignoring unknown timezone {:?}: {}", self.timezone, e);
                None
            }
        }
    }
}

/// Where posts live and how to read them
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Posts directory, relative to the site root
    pub posts_dir: String,
    /// Static files served as-is, relative to the site root
    pub public_dir: String,
    /// Markdown file rendered at `/about`, relative to the site root
    pub about_page: String,
    /// Recognized document extensions, without the dot
    pub extensions: Vec<String>,
    /// Upper bound for one index/corpus build when serving
    pub read_timeout_ms: u64,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            posts_dir: "content/posts".to_string(),
            public_dir: "public".to_string(),
            about_page: "content/about.mdx".to_string(),
            extensions: vec!["mdx".to_string(), "md".to_string(), "markdown".to_string()],
            read_timeout_ms: 5_000,
        }
    }
}

impl ContentConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

/// Reading-time estimate settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadingConfig {
    pub words_per_minute: u32,
}

impl Default for ReadingConfig {
    fn default() -> Self {
        Self {
            words_per_minute: 200,
        }
    }
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub ip: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            ip: "localhost".to_string(),
            port: 4000,
        }
    }
}

/// Which store backs the view/like counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CounterBackend {
    /// No store: counters run degraded
    None,
    /// In-process map, lost on restart
    Memory,
    /// Redis-over-REST (Upstash / Vercel KV)
    Upstash,
}

/// Counter store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterConfig {
    pub backend: CounterBackend,
    pub url: Option<String>,
    pub token: Option<String>,
    pub timeout_ms: u64,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            backend: CounterBackend::None,
            url: None,
            token: None,
            timeout_ms: 2_000,
        }
    }
}

impl CounterConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// GitHub profile card settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubConfig {
    pub username: Option<String>,
    pub api_url: String,
    pub cache_ttl_secs: u64,
    pub timeout_ms: u64,
    /// Shown when the profile cannot be fetched
    pub fallback_name: String,
    pub fallback_bio: String,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            username: None,
            api_url: "https://api.github.com".to_string(),
            cache_ttl_secs: 3600,
            timeout_ms: 3_000,
            fallback_name: "Blogger".to_string(),
            fallback_bio: "Sharing insights on Technology.".to_string(),
        }
    }
}
