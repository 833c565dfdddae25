use crate::features::FeatureSet;
use serde::Deserialize;

pub const BRAND_BONUS: f64 = 0.7;
pub const BRAND_SIMILARITY_THRESHOLD: f64 = 0.8;

/// Configurable weights for the seven core features.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(default)]
pub struct WeightTable {
    pub url_length: f64,
    pub special_chars: f64,
    pub suspicious_words: f64,
    pub ssl_valid: f64,
    pub domain_age: f64,
    pub suspicious_tld: f64,
    pub ip_in_domain: f64,
}

impl Default for WeightTable {
    fn default() -> Self {
        Self {
            url_length: 0.05,
            special_chars: 0.1,
            suspicious_words: 0.25,
            ssl_valid: 0.2,
            domain_age: 0.2,
            suspicious_tld: 0.15,
            ip_in_domain: 0.05,
        }
    }
}

impl WeightTable {
    pub fn entries(&self) -> [(&'static str, f64); 7] {
        [
            ("url_length", self.url_length),
            ("special_chars", self.special_chars),
            ("suspicious_words", self.suspicious_words),
            ("ssl_valid", self.ssl_valid),
            ("domain_age", self.domain_age),
            ("suspicious_tld", self.suspicious_tld),
            ("ip_in_domain", self.ip_in_domain),
        ]
    }

    pub fn validate(&self) -> Result<(), ::config::ConfigError> {
        for (name, weight) in self.entries() {
            if !weight.is_finite() || weight < 0.0 {
                return Err(::config::ConfigError::Message(format!(
                    "weights.{name} must be a finite, non-negative number (got {weight})"
                )));
            }
        }
        Ok(())
    }

    fn weighted_scores(&self, features: &FeatureSet) -> [(f64, f64); 7] {
        let l = &features.lexical;
        [
            (self.url_length, l.url_length_score),
            (self.special_chars, l.special_chars_score),
            (self.suspicious_words, l.suspicious_words_score),
            (self.ssl_valid, features.live.ssl_valid_score),
            (self.domain_age, features.live.domain_age_score),
            (self.suspicious_tld, l.suspicious_tld_score),
            (self.ip_in_domain, l.ip_in_domain_score),
        ]
    }
}

/// Features added on top of the core table with fixed weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuxiliaryFeature {
    SubdomainCount,
    SuspiciousSubdomain,
    Punycode,
    UnicodeTrick,
    Shortener,
}

pub const AUXILIARY_WEIGHTS: [(AuxiliaryFeature, f64); 5] = [
    (AuxiliaryFeature::SubdomainCount, 0.1),
    (AuxiliaryFeature::SuspiciousSubdomain, 0.2),
    (AuxiliaryFeature::Punycode, 0.2),
    (AuxiliaryFeature::UnicodeTrick, 0.2),
    (AuxiliaryFeature::Shortener, 0.3),
];

impl AuxiliaryFeature {
    fn score(self, features: &FeatureSet) -> f64 {
        let l = &features.lexical;
        match self {
            AuxiliaryFeature::SubdomainCount => l.subdomain_count_score,
            AuxiliaryFeature::SuspiciousSubdomain => l.suspicious_subdomain_score,
            AuxiliaryFeature::Punycode => l.punycode_score,
            AuxiliaryFeature::UnicodeTrick => l.unicode_trick_score,
            AuxiliaryFeature::Shortener => l.shortener_score,
        }
    }
}

/// When the brand-impersonation bonus applies.
///
/// `Literal` keeps the historical condition, which requires a brand name to
/// be present as a feature key and therefore never fires. `Similarity`
/// fires whenever the brand similarity exceeds the threshold.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BrandBonus {
    #[default]
    Literal,
    Similarity,
}

impl BrandBonus {
    fn applies(self, features: &FeatureSet) -> bool {
        match self {
            BrandBonus::Literal => false,
            BrandBonus::Similarity => {
                features.lexical.brand_similarity > BRAND_SIMILARITY_THRESHOLD
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleScore {
    pub total: f64,
    pub max: f64,
}

impl RuleScore {
    /// `100 * total / max`, or 0 when no weight was applied.
    pub fn confidence(&self) -> f64 {
        if self.max > 0.0 {
            100.0 * self.total / self.max
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone)]
pub struct RuleScorer {
    weights: WeightTable,
    brand_bonus: BrandBonus,
}

impl RuleScorer {
    pub fn new(weights: WeightTable, brand_bonus: BrandBonus) -> Self {
        Self {
            weights,
            brand_bonus,
        }
    }

    pub fn score(&self, features: &FeatureSet) -> RuleScore {
        let mut total = 0.0;
        let mut max = 0.0;

        for (weight, score) in self.weights.weighted_scores(features) {
            total += weight * score;
            max += weight;
        }

        for (feature, weight) in AUXILIARY_WEIGHTS {
            total += weight * feature.score(features);
            max += weight;
        }

        if self.brand_bonus.applies(features) {
            total += BRAND_BONUS;
            max += BRAND_BONUS;
        }

        RuleScore { total, max }
    }

    pub fn rule_confidence(&self, features: &FeatureSet) -> f64 {
        self.score(features).confidence()
    }
}
