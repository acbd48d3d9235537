use serde::Deserialize;

/// A service the gateway forwards to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upstream {
    User,
    Matching,
    Messaging,
}

impl Upstream {
    pub const ALL: [Upstream; 3] = [Upstream::User, Upstream::Matching, Upstream::Messaging];

    pub fn name(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Matching => "matching",
            Self::Messaging => "messaging",
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    // Downstream service URLs
    #[serde(default = "default_user_url")]
    pub user_url: String,
    #[serde(default = "default_matching_url")]
    pub matching_url: String,
    #[serde(default = "default_messaging_url")]
    pub messaging_url: String,

    #[serde(default = "default_upstream_timeout")]
    pub upstream_timeout_secs: u64,
    /// Largest request body forwarded upstream (photo uploads included).
    #[serde(default = "default_max_body")]
    pub max_body_bytes: usize,
    /// Comma-separated list of allowed browser origins.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: String,
}

fn default_port() -> u16 { 3000 }
fn default_user_url() -> String { "http://localhost:3002".into() }
fn default_matching_url() -> String { "http://localhost:3003".into() }
fn default_messaging_url() -> String { "http://localhost:3004".into() }
fn default_upstream_timeout() -> u64 { 30 }
fn default_max_body() -> usize { 10 * 1024 * 1024 }
fn default_cors_origins() -> String { "http://localhost:5173,http://127.0.0.1:5173".into() }

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            user_url: default_user_url(),
            matching_url: default_matching_url(),
            messaging_url: default_messaging_url(),
            upstream_timeout_secs: default_upstream_timeout(),
            max_body_bytes: default_max_body(),
            cors_origins: default_cors_origins(),
        }
    }
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("VIB3_GATEWAY").separator("__"))
            .build()?;
        Ok(config.try_deserialize().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "invalid VIB3_GATEWAY configuration, using defaults");
            Self::default()
        }))
    }

    pub fn base_url(&self, upstream: Upstream) -> &str {
        let url = match upstream {
            Upstream::User => &self.user_url,
            Upstream::Matching => &self.matching_url,
            Upstream::Messaging => &self.messaging_url,
        };
        url.trim_end_matches('/')
    }

    pub fn cors_origins(&self) -> impl Iterator<Item = &str> {
        self.cors_origins.split(',').map(str::trim).filter(|o| !o.is_empty())
    }
}
