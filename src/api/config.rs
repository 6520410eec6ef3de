// API configuration shared by all commands of one API.
// Holds the host, the cache settings copied into each command and the HTTP client.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::{
    Client,
    header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT},
};

use crate::cache::{DEFAULT_CACHE_DIR, DEFAULT_LIFETIME, project_cache_dir};
use crate::error::{ApiError, Result};

use super::command::Command;
use super::types::HttpMethod;

const USER_AGENT_VALUE: &str = concat!("apicmd/", env!("CARGO_PKG_VERSION"));

/// Response cache settings. Commands take a copy at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfig {
    /// Whether GET responses are cached.
    pub enabled: bool,
    /// How long a cached response stays fresh.
    pub lifetime: Duration,
    /// Flat directory holding one file per request signature.
    pub directory: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            lifetime: DEFAULT_LIFETIME,
            directory: PathBuf::from(DEFAULT_CACHE_DIR),
        }
    }
}

impl CacheConfig {
    /// Load cache settings from environment variables over the defaults.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Override these settings from environment variables.
    ///
    /// # Environment Variables
    /// - `APICMD_CACHE` - enable caching: `1`, `true` or `yes`
    /// - `APICMD_CACHE_LIFETIME` - lifetime in seconds
    /// - `APICMD_CACHE_DIR` - cache directory
    ///
    /// Unset or unparsable variables leave the current value in place.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|name| env::var(name).ok())
    }

    fn with_overrides(self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            enabled: lookup("APICMD_CACHE")
                .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(self.enabled),
            lifetime: lookup("APICMD_CACHE_LIFETIME")
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(self.lifetime),
            directory: lookup("APICMD_CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or(self.directory),
        }
    }

    /// Cache settings rooted at the per-user cache directory, if one can be determined.
    pub fn project_dir() -> Option<Self> {
        project_cache_dir().map(|directory| Self {
            directory,
            ..Self::default()
        })
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    pub fn set_lifetime(&mut self, lifetime: Duration) {
        self.lifetime = lifetime;
    }

    pub fn set_directory(&mut self, directory: impl Into<PathBuf>) {
        self.directory = directory.into();
    }
}

/// Configuration of one remote API: where it lives and how its responses are cached.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    host: String,
    cache: CacheConfig,
    client: Client,
}

impl ApiConfig {
    /// Create a configuration for `host` with caching disabled.
    pub fn new(host: impl Into<String>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(ApiError::Transport)?;

        Ok(Self::with_client(host, client))
    }

    /// Create a configuration around an existing HTTP client.
    pub fn with_client(host: impl Into<String>, client: Client) -> Self {
        Self {
            host: host.into(),
            cache: CacheConfig::default(),
            client,
        }
    }

    /// Replace the cache settings.
    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn cache(&self) -> &CacheConfig {
        &self.cache
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn enable_cache(&mut self) {
        self.cache.enable();
    }

    pub fn disable_cache(&mut self) {
        self.cache.disable();
    }

    pub fn set_cache_lifetime(&mut self, lifetime: Duration) {
        self.cache.set_lifetime(lifetime);
    }

    pub fn set_cache_folder(&mut self, folder: impl Into<PathBuf>) {
        self.cache.set_directory(folder);
    }

    /// Validate the host.
    pub fn validate(&self) -> Result<()> {
        if !self.host.starts_with("http://") && !self.host.starts_with("https://") {
            return Err(ApiError::Configuration(format!(
                "host must start with http:// or https://, got '{}'",
                self.host
            )));
        }

        Ok(())
    }

    /// Build a command for `endpoint` carrying the current cache settings.
    pub fn command(&self, endpoint: &str, method: HttpMethod) -> Command {
        Command::new(self, endpoint, method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_defaults() {
        let cache = CacheConfig::default();
        assert!(!cache.enabled);
        assert_eq!(cache.lifetime, Duration::from_secs(300));
        assert_eq!(cache.directory, PathBuf::from("cache"));
    }

    fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |name| {
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.to_string())
        }
    }

    #[test]
    fn test_env_overrides() {
        let cache = CacheConfig::default().with_overrides(lookup(&[
            ("APICMD_CACHE", "yes"),
            ("APICMD_CACHE_LIFETIME", "60"),
            ("APICMD_CACHE_DIR", "/var/cache/apicmd"),
        ]));

        assert!(cache.enabled);
        assert_eq!(cache.lifetime, Duration::from_secs(60));
        assert_eq!(cache.directory, PathBuf::from("/var/cache/apicmd"));
    }

    #[test]
    fn test_env_overrides_fall_back() {
        let cache = CacheConfig::default().with_overrides(lookup(&[
            ("APICMD_CACHE", "off"),
            ("APICMD_CACHE_LIFETIME", "five minutes"),
        ]));

        assert!(!cache.enabled);
        assert_eq!(cache.lifetime, Duration::from_secs(300));
        assert_eq!(cache.directory, PathBuf::from("cache"));

        // Unset variables keep a non-default base
        let mut base = CacheConfig::default();
        base.set_directory("/home/user/.cache/apicmd");
        let cache = base.clone().with_overrides(lookup(&[]));
        assert_eq!(cache, base);
    }

    #[test]
    fn test_project_dir() {
        // No home directory in some build sandboxes
        if let Some(cache) = CacheConfig::project_dir() {
            assert!(cache.directory.ends_with("apicmd"));
            assert!(!cache.enabled);
            assert_eq!(cache.lifetime, DEFAULT_LIFETIME);
        }
    }

    #[test]
    fn test_cache_setters() {
        let mut config = ApiConfig::new("https://api.example.com").unwrap();
        config.enable_cache();
        config.set_cache_lifetime(Duration::from_secs(30));
        config.set_cache_folder("/tmp/apicmd-test");

        assert!(config.cache().enabled);
        assert_eq!(config.cache().lifetime, Duration::from_secs(30));
        assert_eq!(config.cache().directory, PathBuf::from("/tmp/apicmd-test"));

        config.disable_cache();
        assert!(!config.cache().enabled);
    }

    #[test]
    fn test_command_copies_cache_settings() {
        let mut config = ApiConfig::new("https://api.example.com").unwrap();
        config.enable_cache();
        let command = config.command("/v1/ticker/", HttpMethod::Get);

        // Later changes on the config do not reach an existing command
        config.disable_cache();

        assert!(command.cache().enabled);
        assert_eq!(command.route(), "https://api.example.com/v1/ticker/");
    }

    #[test]
    fn test_validate_host() {
        assert!(ApiConfig::new("https://node.example.net").unwrap().validate().is_ok());
        assert!(ApiConfig::new("http://localhost:9305").unwrap().validate().is_ok());

        let err = ApiConfig::new("node.example.net").unwrap().validate().unwrap_err();
        assert!(matches!(err, ApiError::Configuration(_)));
    }
}
