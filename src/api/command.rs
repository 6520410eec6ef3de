// A single API call.
// Builds the request, serves or refreshes the response cache and normalizes the response envelope.

use std::path::PathBuf;

use reqwest::Client;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::cache::CacheStore;
use crate::error::{ApiError, Result};

use super::config::{ApiConfig, CacheConfig};
use super::types::{HttpMethod, IntoParam, ParamValue, Params};

/// Envelope key holding the call status.
pub const SUCCESS_KEY: &str = "success";
/// Envelope key holding the failure reason.
pub const ERROR_KEY: &str = "error";

/// One request against an API.
///
/// Parameters are collected with [`Command::set_param`] and sent as the query
/// string for GET or as a JSON body for POST/PUT. GET responses go through the
/// file cache when the configuration enables it.
#[derive(Debug, Clone)]
pub struct Command {
    client: Client,
    route: String,
    method: HttpMethod,
    params: Params,
    cache: CacheConfig,
    data: Value,
}

impl Command {
    /// Create a command for `endpoint` on the configured host.
    pub fn new(config: &ApiConfig, endpoint: &str, method: HttpMethod) -> Self {
        Self {
            client: config.client().clone(),
            route: format!("{}{}", config.host(), endpoint),
            method,
            params: Params::new(),
            cache: config.cache().clone(),
            data: Value::Object(Map::new()),
        }
    }

    pub fn route(&self) -> &str {
        &self.route
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn cache(&self) -> &CacheConfig {
        &self.cache
    }

    pub fn is_get(&self) -> bool {
        self.method == HttpMethod::Get
    }

    pub fn is_post(&self) -> bool {
        self.method == HttpMethod::Post
    }

    pub fn is_put(&self) -> bool {
        self.method == HttpMethod::Put
    }

    /// Set a parameter. Absent values (`None`) are ignored.
    pub fn set_param(&mut self, name: impl Into<String>, value: impl IntoParam) {
        self.params.set(name, value);
    }

    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        self.params.get(name)
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Append a path segment to the route, e.g. a resource id.
    pub fn add_route_path(&mut self, suffix: &str) {
        self.route.push_str(suffix);
    }

    /// Full request URL. GET carries the parameters in the query string.
    pub fn request_uri(&self) -> String {
        if self.is_get() {
            format!("{}{}", self.route, self.params.query_string())
        } else {
            self.route.clone()
        }
    }

    /// Cache file this request reads and writes, if it is cache-eligible.
    pub fn cache_path(&self) -> Result<Option<PathBuf>> {
        if !self.is_get() || !self.cache.enabled {
            return Ok(None);
        }
        let store = CacheStore::new(&self.cache.directory);
        store.path_for(&self.route, &self.params).map(Some)
    }

    /// Run the request and return the decoded response.
    ///
    /// Every call goes through the full cycle again: cache check, network
    /// call on a miss, envelope check. On failure the data of the last
    /// successful call is left untouched.
    pub async fn execute(&mut self) -> Result<&Value> {
        let cache_path = self.cache_path()?;
        let store = CacheStore::new(&self.cache.directory);

        let cached = cache_path
            .as_deref()
            .filter(|path| store.is_fresh(path, self.cache.lifetime))
            .and_then(|path| match store.read(path) {
                Ok(bytes) => {
                    debug!(path = %path.display(), "serving response from cache");
                    Some(bytes)
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "cache read failed, falling back to network");
                    None
                }
            });

        let body = match cached {
            Some(bytes) => bytes,
            None => {
                let bytes = self.send().await?;
                if let Some(path) = &cache_path {
                    if let Err(e) = store.write(path, &bytes) {
                        warn!(path = %path.display(), error = %e, "failed to write response cache");
                    }
                }
                bytes
            }
        };

        self.data = decode_envelope(&body)?;
        Ok(&self.data)
    }

    async fn send(&self) -> Result<Vec<u8>> {
        let uri = self.request_uri();
        debug!(method = %self.method, uri = %uri, "sending request");

        let mut request = self.client.request(self.method.into(), &uri);
        if !self.is_get() {
            request = request.json(&self.params);
        }

        let response = request.send().await?.error_for_status()?;
        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }

    /// The whole decoded response of the last successful call.
    pub fn data(&self) -> &Value {
        &self.data
    }

    /// A single field of the response, or None if it is not there.
    pub fn get_data(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// The `success` field of the response.
    pub fn success(&self) -> Option<&Value> {
        self.get_data(SUCCESS_KEY)
    }

    /// The `error` field of the response.
    pub fn error(&self) -> Option<&Value> {
        self.get_data(ERROR_KEY)
    }
}

/// Decode a response body and apply the success/error envelope.
///
/// Only an explicit `"success": false` is a failure; a missing `success`
/// field means the call went through.
pub fn decode_envelope(body: &[u8]) -> Result<Value> {
    let data: Value = serde_json::from_slice(body)?;

    if let Some(false) = data.get(SUCCESS_KEY).and_then(Value::as_bool) {
        return Err(ApiError::Business(error_message(data.get(ERROR_KEY))));
    }

    Ok(data)
}

fn error_message(error: Option<&Value>) -> String {
    match error {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(message)) => message.clone(),
        Some(other) => other.to_string(),
    }
}
