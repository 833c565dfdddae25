pub const PHISHING_THRESHOLD: f64 = 30.0;
pub const ML_BLEND: f64 = 0.6;
pub const RULE_BLEND: f64 = 0.4;
pub const LOCALHOST_CONFIDENCE: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreResult {
    pub is_phishing: bool,
    pub final_confidence: f64,
    pub rule_confidence: f64,
    pub ml_confidence: Option<f64>,
}

impl ScoreResult {
    /// Fixed result for local and private-network targets.
    pub fn localhost() -> Self {
        Self {
            is_phishing: false,
            final_confidence: LOCALHOST_CONFIDENCE,
            rule_confidence: LOCALHOST_CONFIDENCE,
            ml_confidence: None,
        }
    }

    pub fn fuse(rule_confidence: f64, ml_confidence: Option<f64>) -> Self {
        let final_confidence = match ml_confidence {
            Some(ml) => ML_BLEND * ml + RULE_BLEND * rule_confidence,
            None => rule_confidence,
        };

        Self {
            is_phishing: final_confidence > PHISHING_THRESHOLD,
            final_confidence,
            rule_confidence,
            ml_confidence,
        }
    }

    /// Confidences rounded to two decimals; the verdict is kept as decided.
    pub fn rounded(&self) -> Self {
        Self {
            is_phishing: self.is_phishing,
            final_confidence: round2(self.final_confidence),
            rule_confidence: round2(self.rule_confidence),
            ml_confidence: self.ml_confidence.map(round2),
        }
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
