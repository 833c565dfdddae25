use crate::{
    config::Settings,
    domain::SuffixList,
    error::AppError,
    features::{FeatureSet, LexicalExtractor},
    model::{load_classifier, ml_confidence, Classifier},
    probes::{LiveProbes, LiveSignals, RustlsTlsProbe, WhoisLookup},
    scoring::RuleScorer,
    types::CheckReport,
    verdict::ScoreResult,
};
use std::sync::Arc;
use tracing::{debug, info};

/// Scores URLs. Built once at startup and shared read-only across requests.
pub struct PhishEngine {
    extractor: LexicalExtractor,
    probes: LiveProbes,
    scorer: RuleScorer,
    classifier: Option<Arc<dyn Classifier>>,
}

impl PhishEngine {
    pub fn new(
        extractor: LexicalExtractor,
        probes: LiveProbes,
        scorer: RuleScorer,
        classifier: Option<Arc<dyn Classifier>>,
    ) -> Self {
        Self {
            extractor,
            probes,
            scorer,
            classifier,
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, AppError> {
        info!("Initializing phishing engine...");

        // Public suffix list
        let suffixes = match &settings.psl_path {
            Some(path) => SuffixList::from_file(path)?,
            None => SuffixList::bundled()?,
        };

        // Live probes
        let probes = LiveProbes::new(
            Arc::new(RustlsTlsProbe::new(settings.tls_timeout())?),
            Arc::new(WhoisLookup::new(settings.whois_timeout())),
        );

        let scorer = RuleScorer::new(settings.weights, settings.brand_bonus);
        let classifier = load_classifier(&settings.classifier_path);

        info!("Phishing engine initialized");
        Ok(Self::new(
            LexicalExtractor::new(suffixes),
            probes,
            scorer,
            classifier,
        ))
    }

    pub fn classifier_loaded(&self) -> bool {
        self.classifier.is_some()
    }

    /// Lexical features plus live signals. Live lookups are skipped only
    /// when the host itself is local; a local marker elsewhere in the URL
    /// only affects scoring.
    pub async fn extract(&self, url: &str) -> FeatureSet {
        let lexical = self.extractor.extract(url);
        let live = if lexical.domain.is_local() {
            LiveSignals::unprobed()
        } else {
            self.probes.probe(&lexical.domain.registered_domain()).await
        };
        FeatureSet { lexical, live }
    }

    pub fn evaluate(&self, features: &FeatureSet) -> ScoreResult {
        if features.lexical.is_localhost {
            return ScoreResult::localhost();
        }

        let rule_confidence = self.scorer.rule_confidence(features);
        let ml_confidence = ml_confidence(self.classifier.as_deref(), features);
        ScoreResult::fuse(rule_confidence, ml_confidence)
    }

    pub async fn analyze(&self, url: &str) -> CheckReport {
        let features = self.extract(url).await;
        let result = self.evaluate(&features);

        debug!(
            rule_confidence = result.rule_confidence,
            ml_confidence = ?result.ml_confidence,
            final_confidence = result.final_confidence,
            "scored URL"
        );

        CheckReport {
            url: url.to_string(),
            features,
            result,
        }
    }
}
