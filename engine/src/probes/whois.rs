//! Registration date lookup over the WHOIS protocol (TCP port 43).

use super::{ProbeError, RegistrationLookup};
use async_trait::async_trait;
use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Duration;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
};
use tracing::debug;

const WHOIS_PORT: u16 = 43;
const IANA_SERVER: &str = "whois.iana.org";
const MAX_RESPONSE_BYTES: u64 = 256 * 1024;

// Registrations before this are not real; it guards against day-first
// dates being read year-first.
const EARLIEST_REGISTRATION_YEAR: i32 = 1985;

const WHOIS_SERVERS: &[(&str, &str)] = &[
    ("com", "whois.verisign-grs.com"),
    ("net", "whois.verisign-grs.com"),
    ("org", "whois.pir.org"),
    ("info", "whois.nic.info"),
    ("biz", "whois.nic.biz"),
    ("io", "whois.nic.io"),
    ("xyz", "whois.nic.xyz"),
    ("top", "whois.nic.top"),
    ("online", "whois.nic.online"),
    ("site", "whois.nic.site"),
    ("click", "whois.nic.click"),
    ("us", "whois.nic.us"),
    ("uk", "whois.nic.uk"),
    ("de", "whois.denic.de"),
    ("fr", "whois.afnic.fr"),
    ("it", "whois.nic.it"),
    ("nl", "whois.domain-registry.nl"),
    ("au", "whois.auda.org.au"),
    ("ca", "whois.cira.ca"),
    ("jp", "whois.jprs.jp"),
    ("cn", "whois.cnnic.cn"),
    ("ru", "whois.tcinet.ru"),
    ("br", "whois.registro.br"),
    ("pw", "whois.nic.pw"),
    ("cc", "ccwhois.verisign-grs.com"),
];

static CREATION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?im)^\s*creation\s*date\s*:\s*(.+?)\s*$",
        r"(?im)^\s*created(?:\s*on)?\s*:\s*(.+?)\s*$",
        r"(?im)^\s*(?:domain\s*)?registration\s*(?:date|time)\s*:\s*(.+?)\s*$",
        r"(?im)^\s*registered(?:\s*on)?\s*:\s*(.+?)\s*$",
        r"(?im)^\s*(?:domain_date_created|create_date|created_date)\s*:\s*(.+?)\s*$",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid creation date pattern"))
    .collect()
});

static REFERRAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)^\s*(?:refer|whois)\s*:\s*(\S+)\s*$").expect("valid referral pattern")
});

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y.%m.%d",
    "%Y/%m/%d",
    "%d-%b-%Y",
    "%d.%m.%Y",
    "%d/%m/%Y",
    "%Y%m%d",
];

pub struct WhoisLookup {
    timeout: Duration,
    port: u16,
    iana_server: String,
    overrides: Vec<(String, String)>,
}

impl WhoisLookup {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            port: WHOIS_PORT,
            iana_server: IANA_SERVER.to_string(),
            overrides: Vec::new(),
        }
    }

    /// Port used for every query, referral included.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Server asked for the WHOIS server of TLDs missing from the table.
    pub fn with_iana_server(mut self, server: impl Into<String>) -> Self {
        self.iana_server = server.into();
        self
    }

    /// Routes `tld` to `server`, ahead of the built-in table.
    pub fn with_server(mut self, tld: &str, server: impl Into<String>) -> Self {
        self.overrides.push((tld.to_ascii_lowercase(), server.into()));
        self
    }

    fn server_for(&self, domain: &str) -> Option<String> {
        let tld = tld_of(domain).to_ascii_lowercase();
        self.overrides
            .iter()
            .find(|(suffix, _)| *suffix == tld)
            .map(|(_, server)| server.clone())
            .or_else(|| known_server(&tld).map(str::to_string))
    }

    async fn lookup(&self, domain: &str) -> Result<DateTime<Utc>, ProbeError> {
        let server = match self.server_for(domain) {
            Some(server) => server,
            None => {
                let iana = query(&self.iana_server, self.port, tld_of(domain)).await?;
                referral_server(&iana)
                    .ok_or_else(|| ProbeError::Lookup(format!("no WHOIS server for {domain}")))?
            }
        };

        debug!(domain, server = %server, "querying WHOIS");
        let record = query(&server, self.port, domain).await?;
        parse_creation_date(&record).ok_or(ProbeError::NoCreationDate)
    }
}

#[async_trait]
impl RegistrationLookup for WhoisLookup {
    async fn creation_date(&self, domain: &str) -> Result<DateTime<Utc>, ProbeError> {
        tokio::time::timeout(self.timeout, self.lookup(domain))
            .await
            .map_err(|_| ProbeError::Timeout(self.timeout))?
    }
}

fn tld_of(domain: &str) -> &str {
    domain.rsplit('.').next().unwrap_or(domain)
}

fn known_server(tld: &str) -> Option<&'static str> {
    WHOIS_SERVERS
        .iter()
        .find(|(suffix, _)| *suffix == tld)
        .map(|(_, server)| *server)
}

async fn query(server: &str, port: u16, request: &str) -> Result<String, ProbeError> {
    let mut stream = TcpStream::connect((server, port))
        .await
        .map_err(ProbeError::Connect)?;
    stream
        .write_all(format!("{request}\r\n").as_bytes())
        .await
        .map_err(ProbeError::Transport)?;

    let mut response = Vec::new();
    stream
        .take(MAX_RESPONSE_BYTES)
        .read_to_end(&mut response)
        .await
        .map_err(ProbeError::Transport)?;

    if response.is_empty() {
        return Err(ProbeError::Lookup(format!("empty response from {server}")));
    }
    Ok(String::from_utf8_lossy(&response).into_owned())
}

/// WHOIS server named by an IANA TLD record.
pub fn referral_server(record: &str) -> Option<String> {
    REFERRAL
        .captures(record)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// First creation date in the record that parses, trying labels in order
/// of how reliably registries use them.
pub fn parse_creation_date(record: &str) -> Option<DateTime<Utc>> {
    CREATION_PATTERNS.iter().find_map(|pattern| {
        pattern
            .captures_iter(record)
            .filter_map(|c| c.get(1))
            .find_map(|m| parse_whois_date(m.as_str()))
    })
}

pub fn parse_whois_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }

    DATE_FORMATS.iter().find_map(|format| {
        NaiveDate::parse_and_remainder(value, format)
            .ok()
            .map(|(date, _)| date)
            .filter(|date| date.year() >= EARLIEST_REGISTRATION_YEAR)
            .map(|date| Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)))
    })
}
