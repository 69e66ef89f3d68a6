#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

//! ipcheck - interactive IP geolocation checks
//!
//! ipcheck asks for public IPv4 addresses, looks each one up with the
//! ipinfo.io geolocation API, prints the result with an advisory on whether the
//! address is inside a reference country, and can export the collected results
//! to CSV. It can be used as both a command-line application and a library.
//!
//! # Architecture
//!
//! - **[`lens`]**: the individual steps of a check
//!   - `address`: format validation and private range classification
//!   - `ip`: geolocation lookup client and the [`LookupRecord`] type
//!   - `report`: terminal output and reference-country advisory
//!   - `export`: CSV export
//! - **[`app`]**: the interactive loop tying the lenses together
//! - **[`session`]**: records accumulated during one run
//! - **[`prompt`]**: line-based terminal prompting
//! - **[`config`]**: configuration from file, environment and `.env`
//! - **[`error`]**: error types
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use ipcheck::{IpCheck, IpCheckConfig, IpInfoLens, Prompter, ReportFormat, Reporter};
//!
//! let config = IpCheckConfig::new(&None)?;
//! let app = IpCheck::new(
//!     IpInfoLens::from_config(&config),
//!     Reporter::new(config.reference_country.clone(), ReportFormat::Text),
//! );
//! let session = app.run(&mut Prompter::stdio())?;
//! println!("looked up {} addresses", session.len());
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod app;
pub mod config;
pub mod error;
pub mod lens;
pub mod prompt;
pub mod session;

pub use app::{read_public_ip, IpCheck};
pub use config::IpCheckConfig;
pub use error::{AddressError, ExportError, LookupError, SessionError};
pub use lens::address::{is_private, is_valid_format};
pub use lens::export::{save_to_csv, write_csv, write_csv_file};
pub use lens::ip::{GeoLookup, IpInfoLens, LookupRecord};
pub use lens::report::{ReportFormat, Reporter};
pub use prompt::Prompter;
pub use session::Session;
