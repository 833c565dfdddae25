use crate::{
    brand::brand_similarity,
    domain::{DomainParts, SuffixList},
    probes::LiveSignals,
    types::{CertificateStatus, FeatureSummary},
};
use once_cell::sync::Lazy;
use regex::Regex;

pub const SUSPICIOUS_SUBDOMAINS: [&str; 9] = [
    "localhost", "admin", "secure", "login", "paypal", "bank", "update", "signin", "account",
];

// "update", "verify" and "confirm" are listed twice; each entry is counted
// separately, so those words weigh double.
pub const SUSPICIOUS_KEYWORDS: [&str; 23] = [
    "secure", "account", "webscr", "login", "signin", "bank", "verify", "update", "password",
    "confirm", "paypal", "wallet", "support", "security", "click", "update", "suspended",
    "limited", "verify", "confirm", "urgent", "action", "required",
];

pub const SUSPICIOUS_TLDS: [&str; 13] = [
    "xyz", "top", "cc", "tk", "ml", "ga", "cf", "gq", "pw", "info", "online", "site", "click",
];

pub const URL_SHORTENERS: [&str; 8] = [
    "bit.ly", "tinyurl.com", "goo.gl", "t.co", "ow.ly", "is.gd", "buff.ly", "adf.ly",
];

const SPECIAL_CHARS: [char; 20] = [
    '!', '@', '#', '$', '%', '^', '&', '*', '(', ')', ',', '.', '?', '"', ':', '{', '}', '|', '<',
    '>',
];

const LOCAL_MARKERS: [&str; 2] = ["127.0.0.1", "192.168."];

pub const TRICK_SCORE: f64 = 0.7;
pub const SUSPICIOUS_TLD_SCORE: f64 = 0.8;
pub const IP_LITERAL_SCORE: f64 = 0.9;
pub const SHORTENER_SCORE: f64 = 0.8;

static IP_LITERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}").expect("valid IP literal pattern")
});

/// Order of the classifier input vector.
pub const FEATURE_ORDER: [&str; 11] = [
    "url_length_score",
    "special_chars_score",
    "suspicious_words_score",
    "ssl_valid_score",
    "domain_age_score",
    "suspicious_tld_score",
    "ip_in_domain_score",
    "subdomain_count_score",
    "suspicious_subdomain_score",
    "punycode_score",
    "unicode_trick_score",
];

/// Features computed from the URL string alone.
#[derive(Debug, Clone, PartialEq)]
pub struct LexicalFeatures {
    pub domain: DomainParts,
    pub url_length: usize,
    pub url_length_score: f64,
    pub domain_length: usize,
    pub subdomain_count: usize,
    pub subdomain_count_score: f64,
    pub suspicious_subdomain: bool,
    pub suspicious_subdomain_score: f64,
    pub punycode_detected: bool,
    pub punycode_score: f64,
    pub non_ascii_detected: bool,
    pub unicode_trick_score: f64,
    pub brand_similarity: f64,
    pub special_char_count: usize,
    pub special_chars_score: f64,
    pub suspicious_keyword_count: usize,
    pub suspicious_words_score: f64,
    pub suspicious_tld: bool,
    pub suspicious_tld_score: f64,
    pub contains_ip_literal: bool,
    pub ip_in_domain_score: f64,
    pub is_localhost: bool,
    pub is_known_shortener: bool,
    pub shortener_score: f64,
}

/// Lexical features plus the outcome of the live probes.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSet {
    pub lexical: LexicalFeatures,
    pub live: LiveSignals,
}

impl FeatureSet {
    /// Classifier input, laid out as [`FEATURE_ORDER`].
    pub fn vector(&self) -> [f64; 11] {
        let l = &self.lexical;
        [
            l.url_length_score,
            l.special_chars_score,
            l.suspicious_words_score,
            self.live.ssl_valid_score,
            self.live.domain_age_score,
            l.suspicious_tld_score,
            l.ip_in_domain_score,
            l.subdomain_count_score,
            l.suspicious_subdomain_score,
            l.punycode_score,
            l.unicode_trick_score,
        ]
    }

    pub fn summary(&self) -> FeatureSummary {
        let l = &self.lexical;
        FeatureSummary {
            url_length: l.url_length,
            domain_length: l.domain_length,
            special_characters: l.special_char_count,
            suspicious_keywords_found: l.suspicious_keyword_count,
            ssl_certificate: if self.live.tls_valid {
                CertificateStatus::Valid
            } else {
                CertificateStatus::InvalidOrMissing
            },
            domain_age_days: self.live.domain_age_days,
            contains_ip_address: l.contains_ip_literal,
            suspicious_tld: l.suspicious_tld,
            subdomain_count: l.subdomain_count,
            suspicious_subdomain: l.suspicious_subdomain,
            punycode_trick: l.punycode_detected,
            unicode_trick: l.non_ascii_detected,
            brand_similarity: l.brand_similarity,
        }
    }
}

pub struct LexicalExtractor {
    suffixes: SuffixList,
}

impl LexicalExtractor {
    pub fn new(suffixes: SuffixList) -> Self {
        Self { suffixes }
    }

    pub fn extract(&self, url: &str) -> LexicalFeatures {
        let domain = self.suffixes.split(url);
        let lowered = url.to_lowercase();

        let url_length = url.chars().count();
        let subdomain_count = domain.subdomains.len();
        let suspicious_subdomain = domain
            .subdomains
            .iter()
            .any(|label| SUSPICIOUS_SUBDOMAINS.contains(&label.as_str()));
        let punycode_detected = url.contains("xn--");
        let non_ascii_detected = !url.is_ascii();
        let special_char_count = url.chars().filter(|c| SPECIAL_CHARS.contains(c)).count();
        let suspicious_keyword_count = SUSPICIOUS_KEYWORDS
            .iter()
            .filter(|keyword| lowered.contains(*keyword))
            .count();
        let suspicious_tld = SUSPICIOUS_TLDS.contains(&domain.suffix.to_lowercase().as_str());
        let contains_ip_literal = IP_LITERAL.is_match(url);
        let is_localhost =
            lowered.contains("localhost") || LOCAL_MARKERS.iter().any(|m| url.contains(m));
        let is_known_shortener = URL_SHORTENERS.iter().any(|s| url.contains(s));

        LexicalFeatures {
            url_length,
            url_length_score: url_length_score(url_length),
            domain_length: domain.domain.chars().count(),
            subdomain_count,
            subdomain_count_score: subdomain_count_score(subdomain_count),
            suspicious_subdomain,
            suspicious_subdomain_score: flag_score(suspicious_subdomain, TRICK_SCORE),
            punycode_detected,
            punycode_score: flag_score(punycode_detected, TRICK_SCORE),
            non_ascii_detected,
            unicode_trick_score: flag_score(non_ascii_detected, TRICK_SCORE),
            brand_similarity: brand_similarity(&domain.domain),
            special_char_count,
            special_chars_score: special_chars_score(special_char_count),
            suspicious_keyword_count,
            suspicious_words_score: suspicious_words_score(suspicious_keyword_count),
            suspicious_tld,
            suspicious_tld_score: flag_score(suspicious_tld, SUSPICIOUS_TLD_SCORE),
            contains_ip_literal,
            ip_in_domain_score: flag_score(contains_ip_literal, IP_LITERAL_SCORE),
            is_localhost,
            is_known_shortener,
            shortener_score: flag_score(is_known_shortener, SHORTENER_SCORE),
            domain,
        }
    }
}

/// Very short URLs are scored as suspicious alongside very long ones.
pub fn url_length_score(length: usize) -> f64 {
    if length < 20 {
        0.3
    } else if length > 100 {
        0.4
    } else {
        0.0
    }
}

pub fn subdomain_count_score(count: usize) -> f64 {
    match count {
        0 | 1 => 0.0,
        2 => 0.2,
        _ => 0.5,
    }
}

pub fn special_chars_score(count: usize) -> f64 {
    match count {
        0 => 0.0,
        1..=2 => 0.2,
        3..=5 => 0.5,
        _ => 0.8,
    }
}

pub fn suspicious_words_score(count: usize) -> f64 {
    match count {
        0 => 0.0,
        1 => 0.3,
        2 => 0.6,
        _ => 0.9,
    }
}

fn flag_score(flag: bool, score: f64) -> f64 {
    if flag {
        score
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static EXTRACTOR: Lazy<LexicalExtractor> = Lazy::new(|| {
        LexicalExtractor::new(SuffixList::bundled().expect("bundled list parses"))
    });

    #[test]
    fn test_phishing_lookalike() {
        let f = EXTRACTOR.extract("http://paypal-secure-login.xyz");
        assert_eq!(f.url_length, 30);
        assert_eq!(f.url_length_score, 0.0);
        assert_eq!(f.domain_length, 19);
        assert_eq!(f.special_char_count, 2);
        assert_eq!(f.special_chars_score, 0.2);
        assert_eq!(f.suspicious_keyword_count, 3);
        assert_eq!(f.suspicious_words_score, 0.9);
        assert!(f.suspicious_tld);
        assert_eq!(f.suspicious_tld_score, 0.8);
        assert!(!f.contains_ip_literal);
        assert!(!f.is_localhost);
        assert!(!f.is_known_shortener);
        assert_eq!(f.domain.registered_domain(), "paypal-secure-login.xyz");
    }

    #[test]
    fn test_plain_domain() {
        let f = EXTRACTOR.extract("http://example.com");
        assert_eq!(f.url_length, 18);
        assert_eq!(f.url_length_score, 0.3);
        assert_eq!(f.domain_length, 7);
        assert_eq!(f.subdomain_count, 0);
        assert_eq!(f.suspicious_keyword_count, 0);
        assert_eq!(f.suspicious_words_score, 0.0);
        assert!(!f.suspicious_tld);
        assert!(!f.punycode_detected);
        assert!(!f.non_ascii_detected);
        assert!((f.brand_similarity - 8.0 / 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_duplicate_keywords_count_twice() {
        let f = EXTRACTOR.extract("http://example.com/update");
        assert_eq!(f.suspicious_keyword_count, 2);
        assert_eq!(f.suspicious_words_score, 0.6);

        let f = EXTRACTOR.extract("http://example.com/SECURITY");
        assert_eq!(f.suspicious_keyword_count, 1);
    }

    #[test]
    fn test_subdomain_signals() {
        let f = EXTRACTOR.extract("http://login.account.mail.example.com/");
        assert_eq!(f.subdomain_count, 3);
        assert_eq!(f.subdomain_count_score, 0.5);
        assert!(f.suspicious_subdomain);
        assert_eq!(f.suspicious_subdomain_score, 0.7);

        let f = EXTRACTOR.extract("http://Login.example.com/");
        assert_eq!(f.subdomain_count, 1);
        assert!(!f.suspicious_subdomain);
    }

    #[test]
    fn test_encoding_tricks() {
        let f = EXTRACTOR.extract("http://xn--pypal-4ve.com");
        assert!(f.punycode_detected);
        assert_eq!(f.punycode_score, 0.7);
        assert!(!f.non_ascii_detected);

        let f = EXTRACTOR.extract("http://pаypal.com");
        assert!(f.non_ascii_detected);
        assert_eq!(f.unicode_trick_score, 0.7);
    }

    #[test]
    fn test_ip_literals_and_local_hosts() {
        let f = EXTRACTOR.extract("http://999.999.999.999/login");
        assert!(f.contains_ip_literal);
        assert_eq!(f.ip_in_domain_score, 0.9);
        assert!(!f.is_localhost);

        let f = EXTRACTOR.extract("http://192.168.5.5/login");
        assert!(f.contains_ip_literal);
        assert!(f.is_localhost);

        assert!(EXTRACTOR.extract("http://LocalHost:8080").is_localhost);
        assert!(EXTRACTOR.extract("http://127.0.0.1/").is_localhost);
    }

    #[test]
    fn test_shorteners() {
        let f = EXTRACTOR.extract("https://bit.ly/3abcd");
        assert!(f.is_known_shortener);
        assert_eq!(f.shortener_score, 0.8);

        // "t.co" also matches inside longer hosts
        assert!(EXTRACTOR.extract("https://microsoft.com").is_known_shortener);
    }

    #[test]
    fn test_score_bands() {
        assert_eq!(url_length_score(19), 0.3);
        assert_eq!(url_length_score(20), 0.0);
        assert_eq!(url_length_score(100), 0.0);
        assert_eq!(url_length_score(101), 0.4);

        assert_eq!(special_chars_score(0), 0.0);
        assert_eq!(special_chars_score(2), 0.2);
        assert_eq!(special_chars_score(5), 0.5);
        assert_eq!(special_chars_score(6), 0.8);

        assert_eq!(subdomain_count_score(1), 0.0);
        assert_eq!(subdomain_count_score(2), 0.2);
        assert_eq!(subdomain_count_score(7), 0.5);
    }

    #[test]
    fn test_keyword_score_is_monotonic() {
        let scores: Vec<f64> = (0..=3).map(suspicious_words_score).collect();
        assert_eq!(scores, vec![0.0, 0.3, 0.6, 0.9]);
        assert!(scores.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_lexical_extraction_is_deterministic() {
        let url = "https://secure.paypa1.top/webscr?cmd=_login&x=1";
        assert_eq!(EXTRACTOR.extract(url), EXTRACTOR.extract(url));
    }

    #[test]
    fn test_all_scores_in_unit_range() {
        for url in [
            "http://a",
            "http://xn--80ak6aa92e.com/update/verify/confirm/password",
            "http://1.2.3.4/!@#$%^&*()",
            "https://bit.ly/ünïcode",
        ] {
            let f = EXTRACTOR.extract(url);
            for score in [
                f.url_length_score,
                f.subdomain_count_score,
                f.suspicious_subdomain_score,
                f.punycode_score,
                f.unicode_trick_score,
                f.special_chars_score,
                f.suspicious_words_score,
                f.suspicious_tld_score,
                f.ip_in_domain_score,
                f.shortener_score,
            ] {
                assert!((0.0..=1.0).contains(&score), "{url}: {score}");
            }
        }
    }
}
