// API command module.
// Provides the configuration, request types and the command that executes calls.

pub mod command;
pub mod config;
pub mod types;

pub use command::{Command, ERROR_KEY, SUCCESS_KEY, decode_envelope};
pub use config::{ApiConfig, CacheConfig};
pub use types::{HttpMethod, IntoParam, ParamValue, Params};
