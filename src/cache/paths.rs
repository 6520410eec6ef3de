// Cache key and path utilities.
// Derives a flat, content-addressed file name for each (route, params) request signature.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use sha2::{Digest, Sha256};

use crate::api::Params;
use crate::error::Result;

/// Default cache folder, relative to the working directory.
pub const DEFAULT_CACHE_DIR: &str = "cache";

/// Get the per-user cache directory (~/.cache/apicmd on Linux).
pub fn project_cache_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "apicmd").map(|dirs| dirs.cache_dir().to_path_buf())
}

/// Hex SHA-256 of the route followed by the params serialized as JSON.
///
/// Parameter insertion order takes part in the digest, so the same params
/// set in a different order map to a different key.
pub fn cache_key(route: &str, params: &Params) -> Result<String> {
    let mut hasher = Sha256::new();
    hasher.update(route.as_bytes());
    serde_json::to_writer(&mut hasher, params)?;
    Ok(format!("{:x}", hasher.finalize()))
}

/// Path of the cache entry for `key` under `dir`.
pub fn entry_path(dir: &Path, key: &str) -> PathBuf {
    dir.join(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Params {
        let mut params = Params::new();
        for (key, value) in pairs {
            params.set(*key, *value);
        }
        params
    }

    #[test]
    fn test_same_request_same_key() {
        let route = "https://wallet.example.net/api/accounts/getBalance";
        let a = cache_key(route, &params(&[("address", "123S")])).unwrap();
        let b = cache_key(route, &params(&[("address", "123S")])).unwrap();

        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_different_values_different_keys() {
        let route = "https://wallet.example.net/api/accounts/getBalance";
        let a = cache_key(route, &params(&[("address", "123S")])).unwrap();
        let b = cache_key(route, &params(&[("address", "456S")])).unwrap();

        assert_ne!(a, b);
    }

    #[test]
    fn test_different_routes_different_keys() {
        let p = params(&[("limit", "10")]);
        let a = cache_key("https://api.example.com/v1/ticker/", &p).unwrap();
        let b = cache_key("https://api.example.com/v1/global/", &p).unwrap();

        assert_ne!(a, b);
    }

    #[test]
    fn test_insertion_order_changes_key() {
        let route = "https://api.example.com/v1/ticker/";
        let a = cache_key(route, &params(&[("limit", "10"), ("convert", "EUR")])).unwrap();
        let b = cache_key(route, &params(&[("convert", "EUR"), ("limit", "10")])).unwrap();

        assert_ne!(a, b);
    }

    #[test]
    fn test_entry_path_is_flat() {
        let path = entry_path(Path::new("cache"), "abc123");
        assert_eq!(path, PathBuf::from("cache/abc123"));
    }
}
