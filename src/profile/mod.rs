//! GitHub profile card on the home page

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::config::GithubConfig;

/// The subset of a GitHub user the home page shows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub name: Option<String>,
    pub login: String,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub location: Option<String>,
}

impl Profile {
    /// Name if set, login otherwise
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.login)
    }
}

struct Cached {
    profile: Profile,
    fetched_at: Instant,
}

/// Fetches the configured user's profile, caches successes for a TTL and
/// answers with a fallback profile whenever GitHub can't be reached
#[derive(Clone)]
pub struct ProfileService {
    client: Client,
    config: GithubConfig,
    cache: Arc<RwLock<Option<Cached>>>,
}

impl ProfileService {
    pub fn new(config: GithubConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("inkpost/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self {
            client,
            config,
            cache: Arc::new(RwLock::new(None)),
        })
    }

    fn ttl(&self) -> Duration {
        Duration::from_secs(self.config.cache_ttl_secs)
    }

    /// Profile shown when no username is set or the fetch fails
    pub fn fallback(&self) -> Profile {
        let login = self
            .config
            .username
            .clone()
            .unwrap_or_else(|| self.config.fallback_name.to_lowercase());
        Profile {
            name: Some(self.config.fallback_name.clone()),
            html_url: format!("https://github.com/{}", login),
            login,
            avatar_url: String::new(),
            bio: Some(self.config.fallback_bio.clone()),
            location: None,
        }
    }

    pub async fn get(&self) -> Profile {
        let Some(username) = self.config.username.as_deref() else {
            return self.fallback();
        };

        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.fetched_at.elapsed() < self.ttl() {
                    return cached.profile.clone();
                }
            }
        }

        match self.fetch(username).await {
            Ok(profile) => {
                let mut cache = self.cache.write().await;
                *cache = Some(Cached {
                    profile: profile.clone(),
                    fetched_at: Instant::now(),
                });
                profile
            }
            Err(e) => {
                tracing::warn!("Failed to fetch GitHub profile for {}: {}", username, e);
                // A stale profile beats the placeholder
                match self.cache.read().await.as_ref() {
                    Some(cached) => cached.profile.clone(),
                    None => self.fallback(),
                }
            }
        }
    }

    async fn fetch(&self, username: &str) -> reqwest::Result<Profile> {
        let url = format!(
            "{}/users/{}",
            self.config.api_url.trim_end_matches('/'),
            username
        );
        tracing::debug!("GET {}", url);
        self.client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .send()
            .await?
            .error_for_status()?
            .json::<Profile>()
            .await
    }
}
