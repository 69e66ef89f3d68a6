//! Interactive lookup session
//!
//! Drives the prompt → validate → lookup → report loop and the optional CSV
//! export at the end. Input format errors and private addresses are handled by
//! re-prompting; everything else is returned to the caller as a
//! [`SessionError`].

use std::io::{BufRead, Write};

use tracing::{debug, warn};

use crate::error::SessionError;
use crate::lens::address::{is_private, is_valid_format};
use crate::lens::export::save_to_csv;
use crate::lens::ip::GeoLookup;
use crate::lens::report::Reporter;
use crate::prompt::Prompter;
use crate::session::Session;

pub const IP_PROMPT: &str = "Please enter an IP address: ";
pub const ANOTHER_PROMPT: &str = "\nWould you like to enter another IP address? (Y/N): ";
pub const SAVE_PROMPT: &str = "Would you like to save the information to a CSV file? (Y/N): ";
pub const EXIT_PROMPT: &str = "\nPress Enter to exit and close the terminal.";

const INVALID_FORMAT_MSG: &str =
    "Error: Invalid IP address format. Please enter a valid IP address.";
const PRIVATE_RANGE_MSG: &str =
    "Error: The IP address is within a private IP range. Please enter a public IP address.";

/// Prompt until a well-formed public address is entered and return it unchanged
///
/// An address that matches the dotted-quad format but cannot be parsed (e.g.
/// `999.999.999.999`) is returned as [`SessionError::Address`] rather than
/// re-prompted.
pub fn read_public_ip<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
) -> Result<String, SessionError> {
    loop {
        let ip = prompter.ask(IP_PROMPT)?;

        if !is_valid_format(&ip) {
            warn!(input = %ip, "rejected malformed address");
            prompter.say(INVALID_FORMAT_MSG)?;
            continue;
        }

        if is_private(&ip)? {
            warn!(input = %ip, "rejected private address");
            prompter.say(PRIVATE_RANGE_MSG)?;
            continue;
        }

        return Ok(ip);
    }
}

/// One interactive run: a lookup client plus the reporter used to display results
pub struct IpCheck<L> {
    lookup: L,
    reporter: Reporter,
}

impl<L: GeoLookup> IpCheck<L> {
    pub fn new(lookup: L, reporter: Reporter) -> Self {
        Self { lookup, reporter }
    }

    /// Run lookups until the user declines to continue, then offer a CSV export
    ///
    /// Returns the accumulated records.
    pub fn run<R: BufRead, W: Write>(
        &self,
        prompter: &mut Prompter<R, W>,
    ) -> Result<Session, SessionError> {
        let mut session = Session::new();

        loop {
            let ip = read_public_ip(prompter)?;
            let record = self.lookup.lookup(&ip)?;
            debug!(%ip, "lookup {} of session", session.len() + 1);

            self.reporter.report(&record, prompter.output_mut())?;
            session.push(record);

            if !prompter.confirm(ANOTHER_PROMPT)? {
                if prompter.confirm(SAVE_PROMPT)? {
                    save_to_csv(session.records(), prompter)?;
                }
                prompter.say("Exiting the script.")?;
                return Ok(session);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AddressError, LookupError};
    use crate::lens::ip::LookupRecord;
    use serde_json::json;
    use std::cell::RefCell;
    use std::io::Cursor;

    /// Returns canned records and remembers which addresses were queried
    struct StubLookup {
        queried: RefCell<Vec<String>>,
    }

    impl StubLookup {
        fn new() -> Self {
            Self {
                queried: RefCell::new(Vec::new()),
            }
        }
    }

    impl GeoLookup for StubLookup {
        fn lookup(&self, ip: &str) -> Result<LookupRecord, LookupError> {
            self.queried.borrow_mut().push(ip.to_string());
            // The service omits hostname and anycast for many addresses
            if ip.starts_with("90.") {
                LookupRecord::from_response(json!({
                    "ip": ip,
                    "city": "Paris",
                    "country": "FR",
                    "loc": "48.8534,2.3488",
                }))
            } else {
                LookupRecord::from_response(json!({
                    "ip": ip,
                    "hostname": "dns.google",
                    "city": "Mountain View",
                    "country": "US",
                    "loc": "37.4056,-122.0775",
                    "anycast": true,
                }))
            }
        }
    }

    struct FailingLookup;

    impl GeoLookup for FailingLookup {
        fn lookup(&self, _ip: &str) -> Result<LookupRecord, LookupError> {
            Err(LookupError::InvalidResponse("service unavailable".to_string()))
        }
    }

    fn prompter(input: &str) -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
        Prompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    fn output(p: Prompter<Cursor<Vec<u8>>, Vec<u8>>) -> String {
        String::from_utf8(p.into_inner().1).unwrap()
    }

    #[test]
    fn test_read_public_ip_accepts_public() {
        let mut p = prompter("8.8.8.8\n");
        assert_eq!(read_public_ip(&mut p).unwrap(), "8.8.8.8");
        assert_eq!(output(p), IP_PROMPT);
    }

    #[test]
    fn test_read_public_ip_reprompts() {
        let mut p = prompter("not an ip\n192.168.1.1\n10.0.0.1\n1.1.1.1\n");
        assert_eq!(read_public_ip(&mut p).unwrap(), "1.1.1.1");

        let out = output(p);
        assert_eq!(out.matches(IP_PROMPT).count(), 4);
        assert_eq!(out.matches(INVALID_FORMAT_MSG).count(), 1);
        assert_eq!(out.matches(PRIVATE_RANGE_MSG).count(), 2);
    }

    #[test]
    fn test_read_public_ip_surrounding_whitespace_is_a_format_error() {
        let mut p = prompter(" 8.8.8.8\n8.8.4.4\n");
        assert_eq!(read_public_ip(&mut p).unwrap(), "8.8.4.4");
        assert!(output(p).contains(INVALID_FORMAT_MSG));
    }

    #[test]
    fn test_read_public_ip_parse_error_is_not_recovered() {
        let mut p = prompter("999.999.999.999\n8.8.8.8\n");
        let err = read_public_ip(&mut p).unwrap_err();
        assert!(matches!(
            err,
            SessionError::Address(AddressError::Parse { ref input, .. })
                if input == "999.999.999.999"
        ));
        let out = output(p);
        assert_eq!(out.matches(IP_PROMPT).count(), 1);
        assert!(!out.contains(INVALID_FORMAT_MSG));
    }

    #[test]
    fn test_single_lookup_without_export() {
        let app = IpCheck::new(StubLookup::new(), Reporter::default());
        let mut p = prompter("8.8.8.8\nn\nn\n");

        let session = app.run(&mut p).unwrap();
        assert_eq!(session.len(), 1);
        assert_eq!(*app.lookup.queried.borrow(), vec!["8.8.8.8"]);

        let out = output(p);
        assert!(out.contains("ip: 8.8.8.8\nhostname: dns.google\ncity: Mountain View\n"));
        assert!(out.contains("country_name: United States\n"));
        assert!(!out.contains("country_flag"));
        assert!(out.contains("This IP address is within the US."));
        assert!(out.contains(SAVE_PROMPT));
        assert!(!out.contains("Enter the filename"));
        assert!(out.ends_with("Exiting the script.\n"));
    }

    #[test]
    fn test_two_lookups_us_then_fr() {
        let app = IpCheck::new(StubLookup::new(), Reporter::default());
        let mut p = prompter("8.8.8.8\nY\n192.168.1.1\n90.0.0.1\nno\nn\n");

        let session = app.run(&mut p).unwrap();
        let ips: Vec<String> = session
            .records()
            .iter()
            .filter_map(|r| r.value_string("ip"))
            .collect();
        assert_eq!(ips, vec!["8.8.8.8", "90.0.0.1"]);
        assert_eq!(*app.lookup.queried.borrow(), vec!["8.8.8.8", "90.0.0.1"]);

        let out = output(p);
        let within = out.find("This IP address is within the US.").unwrap();
        let outside = out.find("Warning: This IP address is outside the US.").unwrap();
        assert!(within < outside);
        assert!(out.contains(PRIVATE_RANGE_MSG));
    }

    #[test]
    fn test_export_at_end_of_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let input = format!("8.8.8.8\ny\n90.0.0.1\nn\ny\n{}\n", path.display());

        let app = IpCheck::new(StubLookup::new(), Reporter::default());
        let mut p = prompter(&input);
        app.run(&mut p).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("ip,hostname,city,country,loc,anycast,country_name,"));
        assert!(!content.contains("country_flag,"));

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr.headers().unwrap().clone();
        let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].len(), headers.len());
        assert_eq!(&rows[0][1], "dns.google");
        assert_eq!(&rows[1][0], "90.0.0.1");
        assert_eq!(&rows[1][1], "");
        assert_eq!(&rows[1][5], "");
        assert_eq!(&rows[1][6], "France");
        let out = output(p);
        assert!(out.contains(&format!("Information successfully saved to {}.", path.display())));
        assert!(out.ends_with("Exiting the script.\n"));
    }

    #[test]
    fn test_lookup_failure_ends_session() {
        let app = IpCheck::new(FailingLookup, Reporter::default());
        let mut p = prompter("8.8.8.8\n");
        let err = app.run(&mut p).unwrap_err();
        assert!(matches!(err, SessionError::Lookup(_)));
    }
}
