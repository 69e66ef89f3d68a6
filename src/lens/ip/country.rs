//! Country reference data used to enrich lookup records
//!
//! The table is embedded at build time and parsed once on first use.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::Deserialize;

/// Base URL of the per-country flag images
pub const COUNTRY_FLAGS_URL: &str = "https://cdn.ipinfo.io/static/images/countries-flags/";

/// European Union member states
const EU_COUNTRIES: &[&str] = &[
    "AT", "BE", "BG", "CY", "CZ", "DE", "DK", "EE", "ES", "FI", "FR", "GR", "HR", "HU", "IE",
    "IT", "LT", "LU", "LV", "MT", "NL", "PL", "PT", "RO", "SE", "SI", "SK",
];

const COUNTRIES_TSV: &str = include_str!("countries.tsv");

/// Global country data cache
static COUNTRY_DATA: OnceLock<HashMap<String, CountryInfo>> = OnceLock::new();

/// One row of the country table
#[derive(Debug, Clone, Deserialize)]
pub struct CountryInfo {
    pub code: String,
    pub name: String,
    /// ISO 4217 currency code
    pub currency: String,
    pub symbol: String,
    /// Two-letter continent code
    pub continent: String,
}

fn load() -> Result<HashMap<String, CountryInfo>, csv::Error> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .from_reader(COUNTRIES_TSV.as_bytes());

    let mut entries = HashMap::new();
    for row in rdr.deserialize::<CountryInfo>() {
        let info = row?;
        entries.insert(info.code.clone(), info);
    }
    Ok(entries)
}

fn country_data() -> &'static HashMap<String, CountryInfo> {
    COUNTRY_DATA.get_or_init(|| {
        load().unwrap_or_else(|e| {
            tracing::warn!("Failed to load country data: {}. Using empty dataset.", e);
            HashMap::new()
        })
    })
}

/// Look up a country by its two-letter code (case-sensitive)
pub fn country_info(code: &str) -> Option<&'static CountryInfo> {
    country_data().get(code)
}

pub fn is_eu(code: &str) -> bool {
    EU_COUNTRIES.contains(&code)
}

pub fn continent_name(code: &str) -> Option<&'static str> {
    match code {
        "AF" => Some("Africa"),
        "AN" => Some("Antarctica"),
        "AS" => Some("Asia"),
        "EU" => Some("Europe"),
        "NA" => Some("North America"),
        "OC" => Some("Oceania"),
        "SA" => Some("South America"),
        _ => None,
    }
}

/// Regional-indicator code points spelling out a two-letter country code
fn regional_indicators(code: &str) -> Option<Vec<char>> {
    if code.len() != 2 || !code.bytes().all(|b| b.is_ascii_uppercase()) {
        return None;
    }
    code.bytes()
        .map(|b| char::from_u32(0x1F1E6 + u32::from(b - b'A')))
        .collect()
}

/// Flag emoji for a country code, e.g. `🇺🇸` for `US`
pub fn flag_emoji(code: &str) -> Option<String> {
    regional_indicators(code).map(|chars| chars.into_iter().collect())
}

/// Flag code points in `U+XXXX U+XXXX` notation
pub fn flag_unicode(code: &str) -> Option<String> {
    regional_indicators(code).map(|chars| {
        chars
            .into_iter()
            .map(|c| format!("U+{:X}", u32::from(c)))
            .collect::<Vec<_>>()
            .join(" ")
    })
}
