//! Configuration module

mod site;

pub use site::CounterBackend;
pub use site::CounterConfig;
pub use site::ContentConfig;
pub use site::GithubConfig;
pub use site::ReadingConfig;
pub use site::ServerConfig;
pub use site::SiteConfig;
pub use site::{KV_TOKEN_ENV, KV_URL_ENV};
