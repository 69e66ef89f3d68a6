//! Address validation lens
//!
//! Two independent checks are applied to user input before a lookup:
//!
//! - [`is_valid_format`] is a purely syntactic dotted-quad check. It accepts
//!   out-of-range octets such as `999.999.999.999`.
//! - [`is_private`] parses the address and classifies it against the IANA
//!   special-purpose ranges. It fails with [`AddressError::Parse`] for input that
//!   passed the format check but is not a real address.

use std::net::IpAddr;
use std::sync::OnceLock;

use ipnet::{Ipv4Net, Ipv6Net};
use regex::Regex;

use crate::error::AddressError;

/// Four dot-separated groups of one to three decimal digits.
const IPV4_FORMAT: &str = r"^(?:[0-9]{1,3}\.){3}[0-9]{1,3}$";

/// IPv4 networks treated as private or otherwise not globally reachable.
const PRIVATE_V4_NETWORKS: &[&str] = &[
    "0.0.0.0/8",
    "10.0.0.0/8",
    "127.0.0.0/8",
    "169.254.0.0/16",
    "172.16.0.0/12",
    "192.0.0.0/29",
    "192.0.0.170/31",
    "192.0.2.0/24",
    "192.168.0.0/16",
    "198.18.0.0/15",
    "198.51.100.0/24",
    "203.0.113.0/24",
    "240.0.0.0/4",
    "255.255.255.255/32",
];

/// IPv6 networks treated as private or otherwise not globally reachable.
const PRIVATE_V6_NETWORKS: &[&str] = &[
    "::1/128",
    "::/128",
    "::ffff:0:0/96",
    "100::/64",
    "2001::/23",
    "2001:db8::/32",
    "2001:10::/28",
    "fc00::/7",
    "fe80::/10",
];

static FORMAT_RE: OnceLock<Regex> = OnceLock::new();
static PRIVATE_V4: OnceLock<Vec<Ipv4Net>> = OnceLock::new();
static PRIVATE_V6: OnceLock<Vec<Ipv6Net>> = OnceLock::new();

#[allow(clippy::expect_used)]
fn format_re() -> &'static Regex {
    FORMAT_RE.get_or_init(|| Regex::new(IPV4_FORMAT).expect("IPv4 format pattern is valid"))
}

fn private_v4() -> &'static [Ipv4Net] {
    PRIVATE_V4.get_or_init(|| {
        PRIVATE_V4_NETWORKS
            .iter()
            .filter_map(|s| s.parse().ok())
            .collect()
    })
}

fn private_v6() -> &'static [Ipv6Net] {
    PRIVATE_V6.get_or_init(|| {
        PRIVATE_V6_NETWORKS
            .iter()
            .filter_map(|s| s.parse().ok())
            .collect()
    })
}

/// Check that `s` looks like a dotted-quad IPv4 address.
///
/// Only the shape is checked, so `999.999.999.999` is accepted.
///
/// ```
/// use ipcheck::lens::address::is_valid_format;
///
/// assert!(is_valid_format("8.8.8.8"));
/// assert!(is_valid_format("999.999.999.999"));
/// assert!(!is_valid_format("8.8.8"));
/// ```
pub fn is_valid_format(s: &str) -> bool {
    format_re().is_match(s)
}

/// Parse `s` and check whether it falls into a private or reserved range.
pub fn is_private(s: &str) -> Result<bool, AddressError> {
    let ip: IpAddr = s.parse().map_err(|source| AddressError::Parse {
        input: s.to_string(),
        source,
    })?;
    Ok(is_private_addr(ip))
}

/// Classify an already parsed address.
pub fn is_private_addr(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => private_v4().iter().any(|net| net.contains(&v4)),
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => is_private_addr(IpAddr::V4(v4)),
            None => private_v6().iter().any(|net| net.contains(&v6)),
        },
    }
}
