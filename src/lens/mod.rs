//! Lens module
//!
//! Each lens covers one step of an IP check and is usable on its own from the
//! library as well as from the interactive binary.
//!
//! | Lens | Purpose | Dependencies |
//! |------|---------|--------------|
//! | `address` | Dotted-quad format check and private range classification | regex, ipnet |
//! | `ip` | Geolocation lookup against ipinfo.io | ureq, serde_json |
//! | `report` | Terminal rendering and reference-country advisory | serde_json |
//! | `export` | CSV export of accumulated records | csv |
//!
//! # Usage
//!
//! ```rust,ignore
//! use ipcheck::lens::address::{is_private, is_valid_format};
//! use ipcheck::lens::ip::{GeoLookup, IpInfoLens};
//! use ipcheck::lens::report::Reporter;
//!
//! let ip = "8.8.8.8";
//! if is_valid_format(ip) && !is_private(ip)? {
//!     let record = IpInfoLens::default().lookup(ip)?;
//!     Reporter::default().report(&record, &mut std::io::stdout())?;
//! }
//! ```

// Address format and private range checks
pub mod address;

// CSV export
pub mod export;

// IpInfoLens - geolocation lookup
pub mod ip;

// Record display and advisory
pub mod report;
