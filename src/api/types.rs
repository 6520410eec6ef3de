// Request building blocks shared by commands.
// Defines the HTTP method set, scalar parameter values and the ordered parameter map.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer, ser::SerializeMap};

use crate::error::ApiError;

/// HTTP methods a command can be issued with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            other => Err(ApiError::Configuration(format!(
                "unsupported HTTP method: {}",
                other
            ))),
        }
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
        }
    }
}

/// A scalar request parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Str(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
}

impl ParamValue {
    /// Interpret a raw string as the narrowest scalar it spells.
    ///
    /// A number or boolean is only taken when it prints back exactly as
    /// `raw`, so `007`, `1.0` or ids wider than u64 stay strings.
    pub fn infer(raw: &str) -> Self {
        let narrowed = raw
            .parse::<i64>()
            .ok()
            .map(ParamValue::Int)
            .or_else(|| raw.parse::<u64>().ok().map(ParamValue::UInt))
            .or_else(|| {
                raw.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(ParamValue::Float)
            })
            .or_else(|| raw.parse::<bool>().ok().map(ParamValue::Bool));

        match narrowed {
            Some(value) if value.to_string() == raw => value,
            _ => ParamValue::Str(raw.to_string()),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Str(s) => f.write_str(s),
            ParamValue::Int(i) => write!(f, "{}", i),
            ParamValue::UInt(u) => write!(f, "{}", u),
            ParamValue::Float(x) => write!(f, "{}", x),
            ParamValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// Conversion into an optional parameter value.
///
/// `None` means "not set": the parameter is skipped entirely, which is
/// different from setting it to an empty string.
pub trait IntoParam {
    fn into_param(self) -> Option<ParamValue>;
}

impl IntoParam for ParamValue {
    fn into_param(self) -> Option<ParamValue> {
        Some(self)
    }
}

impl<T: IntoParam> IntoParam for Option<T> {
    fn into_param(self) -> Option<ParamValue> {
        self.and_then(IntoParam::into_param)
    }
}

impl IntoParam for &str {
    fn into_param(self) -> Option<ParamValue> {
        Some(ParamValue::Str(self.to_string()))
    }
}

impl IntoParam for String {
    fn into_param(self) -> Option<ParamValue> {
        Some(ParamValue::Str(self))
    }
}

impl IntoParam for &String {
    fn into_param(self) -> Option<ParamValue> {
        Some(ParamValue::Str(self.clone()))
    }
}

impl IntoParam for bool {
    fn into_param(self) -> Option<ParamValue> {
        Some(ParamValue::Bool(self))
    }
}

/// NaN and infinities have no JSON form and are treated as absent.
impl IntoParam for f64 {
    fn into_param(self) -> Option<ParamValue> {
        self.is_finite().then_some(ParamValue::Float(self))
    }
}

macro_rules! signed_param {
    ($($t:ty),*) => {
        $(impl IntoParam for $t {
            fn into_param(self) -> Option<ParamValue> {
                Some(ParamValue::Int(i64::from(self)))
            }
        })*
    };
}

macro_rules! unsigned_param {
    ($($t:ty),*) => {
        $(impl IntoParam for $t {
            fn into_param(self) -> Option<ParamValue> {
                Some(ParamValue::UInt(u64::from(self)))
            }
        })*
    };
}

signed_param!(i8, i16, i32, i64);
unsigned_param!(u8, u16, u32, u64);

impl IntoParam for usize {
    fn into_param(self) -> Option<ParamValue> {
        Some(ParamValue::UInt(self as u64))
    }
}

/// Request parameters in insertion order.
///
/// Setting an existing name replaces its value where it already sits.
/// Serializes as a JSON object with keys in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    entries: Vec<(String, ParamValue)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value under `name`. Returns false when the value was absent and nothing changed.
    pub fn set(&mut self, name: impl Into<String>, value: impl IntoParam) -> bool {
        let Some(value) = value.into_param() else {
            return false;
        };
        let name = name.into();

        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((name, value)),
        }
        true
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build `?k1=v1&k2=v2` with form-urlencoded keys and values.
    /// Empty when there are no parameters.
    pub fn query_string(&self) -> String {
        let mut query = String::new();
        for (i, (key, value)) in self.iter().enumerate() {
            query.push(if i == 0 { '?' } else { '&' });
            query.extend(url::form_urlencoded::byte_serialize(key.as_bytes()));
            query.push('=');
            query.extend(url::form_urlencoded::byte_serialize(
                value.to_string().as_bytes(),
            ));
        }
        query
    }
}

impl Serialize for Params {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
