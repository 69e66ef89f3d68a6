//! Lookup result reporting
//!
//! Renders a [`LookupRecord`] for the terminal and emits an advisory telling the
//! user whether the address geolocates inside the reference country.

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::lens::ip::{value_to_string, LookupRecord, EXCLUDED_FIELD};

/// Country every lookup is compared against unless configured otherwise
pub const DEFAULT_REFERENCE_COUNTRY: &str = "US";

/// Output format for the record body
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// One `key: value` line per field (default)
    #[default]
    Text,
    /// Compact JSON object
    Json,
    /// Pretty-printed JSON object
    Pretty,
}

pub struct Reporter {
    reference_country: String,
    format: ReportFormat,
}

impl Reporter {
    pub fn new(reference_country: impl Into<String>, format: ReportFormat) -> Self {
        Self {
            reference_country: reference_country.into(),
            format,
        }
    }

    pub fn reference_country(&self) -> &str {
        &self.reference_country
    }

    /// Format the record body in the configured format
    pub fn format_record(&self, record: &LookupRecord) -> serde_json::Result<String> {
        match self.format {
            ReportFormat::Text => Ok(record
                .iter()
                .filter(|(key, _)| *key != EXCLUDED_FIELD)
                .map(|(key, value)| format!("{}: {}", key, value_to_string(value)))
                .collect::<Vec<_>>()
                .join("\n")),
            ReportFormat::Json => serde_json::to_string(record),
            ReportFormat::Pretty => serde_json::to_string_pretty(record),
        }
    }

    /// Exact, case-sensitive comparison of the record's country code.
    /// A record without a country is treated as outside.
    pub fn is_in_reference_country(&self, record: &LookupRecord) -> bool {
        record.country() == Some(self.reference_country.as_str())
    }

    /// Advisory lines printed after the record body
    pub fn advisory(&self, record: &LookupRecord) -> Vec<String> {
        if self.is_in_reference_country(record) {
            vec![format!(
                "This IP address is within the {}.",
                self.reference_country
            )]
        } else {
            vec![
                format!(
                    "Warning: This IP address is outside the {}.",
                    self.reference_country
                ),
                "Consider further investigation and possible blocking on the firewall.".to_string(),
            ]
        }
    }

    /// Write the record body, a blank line, and the advisory
    pub fn report<W: Write>(&self, record: &LookupRecord, out: &mut W) -> io::Result<()> {
        let body = self.format_record(record)?;
        if !body.is_empty() {
            writeln!(out, "{}", body)?;
        }
        writeln!(out)?;
        for line in self.advisory(record) {
            writeln!(out, "{}", line)?;
        }
        Ok(())
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new(DEFAULT_REFERENCE_COUNTRY, ReportFormat::default())
    }
}
