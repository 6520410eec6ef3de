//! Command-line interface for running a single API command.

use std::path::PathBuf;

use clap::Parser;

use crate::api::{CacheConfig, HttpMethod, ParamValue};

/// Execute one REST API call and print the JSON result
#[derive(Parser, Debug)]
#[command(name = "apicmd")]
#[command(about = "Run a REST API command with optional response caching")]
#[command(version)]
pub struct Cli {
    /// Full URL of the endpoint, e.g. https://api.coinmarketcap.com/v1/ticker/
    pub url: String,

    /// HTTP method: GET, POST or PUT
    #[arg(short, long, default_value = "GET", value_parser = parse_method)]
    pub method: HttpMethod,

    /// Request parameter as key=value (repeatable, order is kept)
    #[arg(short = 'p', long = "param", value_name = "KEY=VALUE", value_parser = parse_param)]
    pub params: Vec<(String, String)>,

    /// Cache GET responses on disk
    #[arg(long)]
    pub cache: bool,

    /// Cache directory (default: the per-user cache directory, e.g. ~/.cache/apicmd)
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Cache lifetime in seconds
    #[arg(long, value_name = "SECS")]
    pub cache_lifetime: Option<u64>,

    /// Print only this field of the response
    #[arg(short, long, value_name = "KEY")]
    pub field: Option<String>,
}

impl Cli {
    /// Cache settings rooted at the per-user cache directory, overridden
    /// by the environment and then by flags.
    pub fn cache_config(&self) -> CacheConfig {
        let base = CacheConfig::project_dir()
            .unwrap_or_default()
            .with_env_overrides();
        self.apply_cache_flags(base)
    }

    fn apply_cache_flags(&self, mut cache: CacheConfig) -> CacheConfig {
        if self.cache {
            cache.enable();
        }
        if let Some(dir) = &self.cache_dir {
            cache.set_directory(dir);
        }
        if let Some(secs) = self.cache_lifetime {
            cache.set_lifetime(std::time::Duration::from_secs(secs));
        }
        cache
    }

    /// Parameters with their values narrowed to numbers or booleans where
    /// that keeps the exact spelling.
    pub fn typed_params(&self) -> impl Iterator<Item = (&str, ParamValue)> {
        self.params
            .iter()
            .map(|(key, value)| (key.as_str(), ParamValue::infer(value)))
    }
}

fn parse_method(s: &str) -> Result<HttpMethod, String> {
    s.parse().map_err(|e: crate::error::ApiError| e.to_string())
}

/// Split a `key=value` argument. The value may itself contain `=`.
pub fn parse_param(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{}'", s)),
    }
}
