// Cache module for raw response caching.
// Maps request signatures to flat files and decides freshness by modification time.

pub mod paths;
pub mod store;

pub use paths::{DEFAULT_CACHE_DIR, cache_key, entry_path, project_cache_dir};
pub use store::{CacheStore, DEFAULT_LIFETIME, age};
