//! IP geolocation lookup lens
//!
//! This module wraps a single call to the ipinfo.io API. Responses are kept as
//! an ordered field map ([`LookupRecord`]) because the set of fields returned by
//! the service varies by plan and by address.

use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::config::IpCheckConfig;
use crate::error::LookupError;

pub mod country;

// =============================================================================
// Types
// =============================================================================

/// Field carrying the country flag image; never displayed or exported.
pub const EXCLUDED_FIELD: &str = "country_flag";

/// Default geolocation API endpoint
pub const IPINFO_API: &str = "https://ipinfo.io";

/// Geolocation attributes returned for one address, in response order
///
/// The [`EXCLUDED_FIELD`] is dropped on construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct LookupRecord {
    fields: Map<String, Value>,
}

impl LookupRecord {
    /// Build a record from an ordered field map
    pub fn from_fields(fields: Map<String, Value>) -> Self {
        let fields = fields
            .into_iter()
            .filter(|(key, _)| key != EXCLUDED_FIELD)
            .collect();
        Self { fields }
    }

    /// Build a record from a raw API response body
    ///
    /// The body is passed through [`enrich_details`] first, then the
    /// [`EXCLUDED_FIELD`] is dropped.
    pub fn from_response(body: Value) -> Result<Self, LookupError> {
        let fields = match body {
            Value::Object(map) => map,
            other => {
                return Err(LookupError::InvalidResponse(format!(
                    "expected a JSON object, got {}",
                    other
                )))
            }
        };

        Ok(Self::from_fields(enrich_details(fields)))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Two-letter country code, if the service returned one
    pub fn country(&self) -> Option<&str> {
        self.fields.get("country").and_then(Value::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Field value rendered as plain text, or `None` if the field is absent
    pub fn value_string(&self, key: &str) -> Option<String> {
        self.fields.get(key).map(value_to_string)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Append the derived country and coordinate fields to a raw response
///
/// When the response carries a `country` code, `country_name`, `isEU`,
/// `country_flag`, `country_flag_url`, `country_currency` and `continent` are
/// added in that order. Codes missing from the country table get `null` values.
/// When `loc` has the form `"lat,lon"`, `latitude` and `longitude` follow.
/// Fields already present in the response are left untouched.
pub fn enrich_details(mut fields: Map<String, Value>) -> Map<String, Value> {
    if let Some(code) = fields.get("country").and_then(Value::as_str).map(str::to_string) {
        let info = country::country_info(&code);

        let derived = [
            ("country_name", info.map(|c| json!(c.name)).unwrap_or(Value::Null)),
            ("isEU", Value::Bool(country::is_eu(&code))),
            (
                "country_flag",
                match (country::flag_emoji(&code), country::flag_unicode(&code)) {
                    (Some(emoji), Some(unicode)) => json!({"emoji": emoji, "unicode": unicode}),
                    _ => Value::Null,
                },
            ),
            (
                "country_flag_url",
                json!(format!("{}{}.svg", country::COUNTRY_FLAGS_URL, code)),
            ),
            (
                "country_currency",
                info.map(|c| json!({"code": c.currency, "symbol": c.symbol}))
                    .unwrap_or(Value::Null),
            ),
            (
                "continent",
                info.and_then(|c| {
                    country::continent_name(&c.continent)
                        .map(|name| json!({"code": c.continent, "name": name}))
                })
                .unwrap_or(Value::Null),
            ),
        ];
        for (key, value) in derived {
            fields.entry(key).or_insert(value);
        }
    }

    let coordinates = fields
        .get("loc")
        .and_then(Value::as_str)
        .and_then(|loc| loc.split_once(','))
        .map(|(lat, lon)| (lat.trim().to_string(), lon.trim().to_string()));
    if let Some((lat, lon)) = coordinates {
        fields
            .entry("latitude")
            .or_insert_with(|| Value::String(lat));
        fields
            .entry("longitude")
            .or_insert_with(|| Value::String(lon));
    }

    fields
}

/// Render a JSON value for terminal or CSV output.
///
/// Strings are written without quotes and `null` becomes an empty string.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

// =============================================================================
// Lens
// =============================================================================

/// Anything that can resolve an address into a [`LookupRecord`]
pub trait GeoLookup {
    fn lookup(&self, ip: &str) -> Result<LookupRecord, LookupError>;
}

/// ipinfo.io lookup client
///
/// # Example
///
/// ```rust,no_run
/// use ipcheck::lens::ip::{GeoLookup, IpInfoLens, IPINFO_API};
///
/// let lens = IpInfoLens::new(IPINFO_API, std::env::var("IPCHECK_TOKEN").ok());
/// let record = lens.lookup("8.8.8.8")?;
/// println!("{:?}", record.country());
/// # Ok::<(), ipcheck::LookupError>(())
/// ```
#[derive(Debug, Clone)]
pub struct IpInfoLens {
    api_url: String,
    token: Option<String>,
}

impl IpInfoLens {
    pub fn new(api_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            api_url: api_url.into(),
            token,
        }
    }

    pub fn from_config(config: &IpCheckConfig) -> Self {
        Self::new(config.api_url.clone(), config.token.clone())
    }

    /// Request URL for an address, without the credential
    pub fn request_url(&self, ip: &str) -> String {
        format!("{}/{}", self.api_url.trim_end_matches('/'), ip)
    }
}

impl Default for IpInfoLens {
    fn default() -> Self {
        Self::new(IPINFO_API, None)
    }
}

impl GeoLookup for IpInfoLens {
    fn lookup(&self, ip: &str) -> Result<LookupRecord, LookupError> {
        let url = self.request_url(ip);
        debug!(%url, authenticated = self.token.is_some(), "querying geolocation service");

        let mut request = ureq::get(&url);
        if let Some(token) = &self.token {
            request = request.query("token", token);
        }

        let body = request.call()?.body_mut().read_json::<Value>()?;
        let record = LookupRecord::from_response(body)?;
        debug!(fields = record.len(), country = ?record.country(), "lookup complete");
        Ok(record)
    }
}

// =============================================================================
// Tests
// =============================================================================
