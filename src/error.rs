//! Error types for address validation, lookups, and CSV export
//!
//! Each stage of a session reports failures through its own error type so that
//! callers can decide which ones are recoverable. [`SessionError`] collects them
//! for the interactive loop.

use std::io;
use std::net::AddrParseError;

use thiserror::Error;

/// Failure to interpret a string as an IP address.
///
/// A string can pass the dotted-quad format check and still fail here, e.g.
/// `999.999.999.999`.
#[derive(Debug, Error)]
pub enum AddressError {
    #[error("'{input}' does not appear to be an IPv4 or IPv6 address")]
    Parse {
        input: String,
        #[source]
        source: AddrParseError,
    },
}

/// Failure while querying the geolocation service.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("geolocation request failed: {0}")]
    Http(#[from] ureq::Error),

    #[error("unexpected response from geolocation service: {0}")]
    InvalidResponse(String),
}

/// Failure while exporting session records to CSV.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no lookup records to export")]
    EmptySession,

    #[error(
        "record {index} has fields [{}] not among the export columns [{}]",
        .found.join(", "),
        .expected.join(", ")
    )]
    KeyMismatch {
        /// 1-based position of the offending record in the session
        index: usize,
        expected: Vec<String>,
        /// Fields of the record that have no column
        found: Vec<String>,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Any error that ends an interactive session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Address(#[from] AddressError),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("terminal I/O error: {0}")]
    Io(#[from] io::Error),
}
