//! HTTP command layer for REST API wrappers.
//!
//! A [`Command`] builds one request against an API host, optionally serves
//! it from a file cache, and turns the API's `success`/`error` envelope into
//! a typed [`ApiError`].

pub mod api;
pub mod cache;
pub mod cli;
pub mod error;

pub use api::{ApiConfig, CacheConfig, Command, HttpMethod, IntoParam, ParamValue, Params};
pub use cache::CacheStore;
pub use error::{ApiError, Result};
