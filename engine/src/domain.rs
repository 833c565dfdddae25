//! Splits a URL's host into subdomain labels, registered-domain label and
//! public suffix using the public suffix list.

use crate::error::AppError;
use publicsuffix::{List, Psl};
use std::{
    net::{IpAddr, Ipv4Addr, Ipv6Addr},
    path::Path,
};

const BUNDLED_LIST: &str = include_str!("../data/public_suffix_list.dat");
const PRIVATE_SECTION_MARKER: &str = "// ===BEGIN PRIVATE DOMAINS===";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainParts {
    pub subdomains: Vec<String>,
    pub domain: String,
    pub suffix: String,
}

impl DomainParts {
    /// `domain.suffix`, or the bare domain label when no public suffix is known.
    pub fn registered_domain(&self) -> String {
        match (self.domain.is_empty(), self.suffix.is_empty()) {
            (false, false) => format!("{}.{}", self.domain, self.suffix),
            (false, true) => self.domain.clone(),
            (true, _) => String::new(),
        }
    }

    /// True when the host itself is `localhost`, a loopback address or a
    /// private IPv4 address.
    pub fn is_local(&self) -> bool {
        if !self.suffix.is_empty() || !self.subdomains.is_empty() {
            return false;
        }
        if self.domain.eq_ignore_ascii_case("localhost") {
            return true;
        }
        match self.domain.parse::<IpAddr>() {
            Ok(IpAddr::V4(ip)) => ip.is_loopback() || ip.is_private(),
            Ok(IpAddr::V6(ip)) => ip.is_loopback(),
            Err(_) => false,
        }
    }
}

pub struct SuffixList {
    list: List,
}

impl SuffixList {
    pub fn bundled() -> Result<Self, AppError> {
        Self::parse(BUNDLED_LIST)
    }

    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Parses list text, keeping only the ICANN section.
    pub fn parse(text: &str) -> Result<Self, AppError> {
        let icann = match text.find(PRIVATE_SECTION_MARKER) {
            Some(end) => &text[..end],
            None => text,
        };
        let list = icann
            .parse::<List>()
            .map_err(|e| AppError::SuffixList(e.to_string()))?;
        Ok(Self { list })
    }

    /// Decomposes the host of `url`. Label case is preserved; only the
    /// suffix lookup is case-insensitive.
    pub fn split(&self, url: &str) -> DomainParts {
        let host = host_of(url);
        if host.is_empty() {
            return DomainParts::default();
        }

        if is_ip_literal(&host) {
            return DomainParts {
                subdomains: Vec::new(),
                domain: host,
                suffix: String::new(),
            };
        }

        let labels: Vec<&str> = host.split('.').collect();
        let suffix_labels = self.known_suffix_labels(&host.to_lowercase());

        if suffix_labels >= labels.len() {
            return DomainParts {
                subdomains: Vec::new(),
                domain: String::new(),
                suffix: host,
            };
        }

        let domain_index = labels.len() - suffix_labels - 1;
        DomainParts {
            subdomains: labels[..domain_index].iter().map(|l| l.to_string()).collect(),
            domain: labels[domain_index].to_string(),
            suffix: labels[domain_index + 1..].join("."),
        }
    }

    fn known_suffix_labels(&self, host: &str) -> usize {
        match self.list.suffix(host.as_bytes()) {
            Some(suffix) if suffix.is_known() => {
                suffix.as_bytes().split(|b| *b == b'.').count()
            }
            _ => 0,
        }
    }
}

/// Pulls the host out of a URL without requiring it to be well formed:
/// scheme, userinfo, port, path, query and fragment are dropped.
pub fn host_of(url: &str) -> String {
    let rest = strip_scheme(url);
    let netloc = rest
        .split(|c: char| matches!(c, '/' | '?' | '#'))
        .next()
        .unwrap_or("");
    let netloc = netloc.rsplit('@').next().unwrap_or("");

    let host = match netloc.strip_prefix('[') {
        Some(bracketed) => bracketed.split(']').next().unwrap_or(""),
        None => netloc.split(':').next().unwrap_or(""),
    };

    host.replace(|c: char| matches!(c, '\u{3002}' | '\u{FF0E}' | '\u{FF61}'), ".")
        .trim_end_matches('.')
        .to_string()
}

fn strip_scheme(url: &str) -> &str {
    if let Some(idx) = url.find("://") {
        let scheme = &url[..idx];
        if scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        {
            return &url[idx + 3..];
        }
    }
    url.strip_prefix("//").unwrap_or(url)
}

fn is_ip_literal(host: &str) -> bool {
    host.parse::<Ipv4Addr>().is_ok() || host.parse::<Ipv6Addr>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use once_cell::sync::Lazy;

    static SUFFIXES: Lazy<SuffixList> =
        Lazy::new(|| SuffixList::bundled().expect("bundled list parses"));

    #[test]
    fn test_host_extraction() {
        assert_eq!(host_of("http://example.com"), "example.com");
        assert_eq!(host_of("https://user:pw@Example.com:8443/a/b?c#d"), "Example.com");
        assert_eq!(host_of("http://[::1]:8080/"), "::1");
        assert_eq!(host_of("http://example.com./path"), "example.com");
        assert_eq!(host_of("example.com/path"), "example.com");
        assert_eq!(host_of("http://"), "");
    }

    #[test]
    fn test_simple_domain() {
        let parts = SUFFIXES.split("http://example.com");
        assert!(parts.subdomains.is_empty());
        assert_eq!(parts.domain, "example");
        assert_eq!(parts.suffix, "com");
        assert_eq!(parts.registered_domain(), "example.com");
    }

    #[test]
    fn test_multi_label_suffix_and_subdomains() {
        let parts = SUFFIXES.split("http://secure.login.example.co.uk/index.html");
        assert_eq!(parts.subdomains, vec!["secure", "login"]);
        assert_eq!(parts.domain, "example");
        assert_eq!(parts.suffix, "co.uk");
    }

    #[test]
    fn test_label_case_is_preserved() {
        let parts = SUFFIXES.split("http://Login.Example.COM");
        assert_eq!(parts.subdomains, vec!["Login"]);
        assert_eq!(parts.domain, "Example");
        assert_eq!(parts.suffix, "COM");
    }

    #[test]
    fn test_private_registries_are_ignored() {
        let parts = SUFFIXES.split("https://someone.github.io");
        assert_eq!(parts.subdomains, vec!["someone"]);
        assert_eq!(parts.domain, "github");
        assert_eq!(parts.suffix, "io");
    }

    #[test]
    fn test_unknown_suffix_and_ip_hosts() {
        let parts = SUFFIXES.split("http://localhost:5000/admin");
        assert_eq!(parts.domain, "localhost");
        assert_eq!(parts.suffix, "");
        assert_eq!(parts.registered_domain(), "localhost");

        let parts = SUFFIXES.split("http://192.168.5.5/login");
        assert_eq!(parts.domain, "192.168.5.5");
        assert!(parts.subdomains.is_empty());
        assert_eq!(parts.suffix, "");
    }

    #[test]
    fn test_bare_suffix_and_empty_host() {
        let parts = SUFFIXES.split("http://co.uk");
        assert_eq!(parts.domain, "");
        assert_eq!(parts.suffix, "co.uk");
        assert_eq!(parts.registered_domain(), "");

        assert_eq!(SUFFIXES.split("http://"), DomainParts::default());
    }

    #[test]
    fn test_custom_list_text() {
        let text = "// ===BEGIN ICANN DOMAINS===\ncom\nexample\n// ===END ICANN DOMAINS===\n";
        let list = SuffixList::parse(text).unwrap();
        let parts = list.split("http://a.b.example");
        assert_eq!(parts.subdomains, vec!["a"]);
        assert_eq!(parts.domain, "b");
        assert_eq!(parts.suffix, "example");
    }

    #[test]
    fn test_local_hosts() {
        let local = [
            "http://localhost:5000/admin",
            "http://LOCALHOST",
            "http://127.0.0.1/",
            "http://192.168.5.5/login",
            "http://10.1.2.3",
            "http://[::1]:8080/",
        ];
        for url in local {
            assert!(SUFFIXES.split(url).is_local(), "{url}");
        }
        let public = [
            "https://paypal.com/login?next=http://localhost/",
            "http://localhost.example.com",
            "http://8.8.8.8",
            "http://",
        ];
        for url in public {
            assert!(!SUFFIXES.split(url).is_local(), "{url}");
        }
    }

    #[test]
    fn test_malformed_list_is_rejected() {
        let result = SuffixList::parse("this is not a suffix list");
        assert!(matches!(result, Err(AppError::SuffixList(_))));
    }
}
