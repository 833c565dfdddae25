use crate::{features::FeatureSet, verdict::ScoreResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckRequest {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CertificateStatus {
    Valid,
    #[serde(rename = "Invalid/Missing")]
    InvalidOrMissing,
}

/// Human-facing view of the extracted features.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureSummary {
    pub url_length: usize,
    pub domain_length: usize,
    pub special_characters: usize,
    pub suspicious_keywords_found: usize,
    pub ssl_certificate: CertificateStatus,
    pub domain_age_days: i64,
    pub contains_ip_address: bool,
    pub suspicious_tld: bool,
    pub subdomain_count: usize,
    pub suspicious_subdomain: bool,
    pub punycode_trick: bool,
    pub unicode_trick: bool,
    pub brand_similarity: f64,
}

/// Full outcome of one analysis, before any rounding.
#[derive(Debug, Clone)]
pub struct CheckReport {
    pub url: String,
    pub features: FeatureSet,
    pub result: ScoreResult,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckResponse {
    pub url: String,
    pub is_phishing: bool,
    pub confidence: f64,
    pub rule_confidence: Option<f64>,
    pub ml_confidence: Option<f64>,
    pub features: FeatureSummary,
}

impl From<&CheckReport> for CheckResponse {
    fn from(report: &CheckReport) -> Self {
        let result = report.result.rounded();
        Self {
            url: report.url.clone(),
            is_phishing: result.is_phishing,
            confidence: result.final_confidence,
            rule_confidence: Some(result.rule_confidence),
            ml_confidence: result.ml_confidence,
            features: report.features.summary(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub classifier_loaded: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_certificate_status_labels() {
        assert_eq!(serde_json::to_value(CertificateStatus::Valid).unwrap(), json!("Valid"));
        assert_eq!(
            serde_json::to_value(CertificateStatus::InvalidOrMissing).unwrap(),
            json!("Invalid/Missing")
        );
    }

    #[test]
    fn test_request_without_url() {
        let request: CheckRequest = serde_json::from_str("{}").unwrap();
        assert!(request.url.is_none());

        let request: CheckRequest = serde_json::from_str(r#"{"url": null}"#).unwrap();
        assert!(request.url.is_none());
    }
}
