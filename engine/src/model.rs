use crate::features::{FeatureSet, FEATURE_ORDER};
use serde::{Deserialize, Serialize};
use std::{path::Path, sync::Arc};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("expected {expected} features, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("classifier returned an invalid probability: {0}")]
    InvalidProbability(f64),

    #[error("failed to load classifier: {0}")]
    Load(String),
}

/// An externally trained binary classifier.
pub trait Classifier: Send + Sync {
    /// P(phishing) for a vector laid out as [`FEATURE_ORDER`].
    fn predict_probability(&self, vector: &[f64]) -> Result<f64, ClassifierError>;
}

/// Serialized logistic regression produced by the training pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierWeights {
    pub version: String,
    pub intercept: f64,
    pub weights: Vec<f64>,
    pub feature_order: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct LogisticClassifier {
    version: String,
    intercept: f64,
    weights: Vec<f64>,
}

impl LogisticClassifier {
    pub fn load(path: &Path) -> Result<Self, ClassifierError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ClassifierError::Load(format!("{}: {e}", path.display())))?;
        let weights: ClassifierWeights = serde_json::from_str(&content)
            .map_err(|e| ClassifierError::Load(format!("{}: {e}", path.display())))?;
        let model = Self::from_weights(weights)?;
        debug!("Loaded classifier from {}: version {}", path.display(), model.version);
        Ok(model)
    }

    pub fn from_weights(weights: ClassifierWeights) -> Result<Self, ClassifierError> {
        if weights.feature_order != FEATURE_ORDER {
            return Err(ClassifierError::Load(format!(
                "feature order {:?} does not match {:?}",
                weights.feature_order, FEATURE_ORDER
            )));
        }
        if weights.weights.len() != FEATURE_ORDER.len() {
            return Err(ClassifierError::ShapeMismatch {
                expected: FEATURE_ORDER.len(),
                actual: weights.weights.len(),
            });
        }
        if !weights.intercept.is_finite() || weights.weights.iter().any(|w| !w.is_finite()) {
            return Err(ClassifierError::Load("non-finite coefficient".to_string()));
        }

        Ok(Self {
            version: weights.version,
            intercept: weights.intercept,
            weights: weights.weights,
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}

impl Classifier for LogisticClassifier {
    fn predict_probability(&self, vector: &[f64]) -> Result<f64, ClassifierError> {
        if vector.len() != self.weights.len() {
            return Err(ClassifierError::ShapeMismatch {
                expected: self.weights.len(),
                actual: vector.len(),
            });
        }

        let z = self.intercept
            + self
                .weights
                .iter()
                .zip(vector)
                .map(|(w, x)| w * x)
                .sum::<f64>();
        Ok(sigmoid(z))
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Loads the classifier once at startup. A missing or invalid file leaves
/// the engine running on rule scores alone.
pub fn load_classifier(path: &Path) -> Option<Arc<dyn Classifier>> {
    match LogisticClassifier::load(path) {
        Ok(model) => {
            info!("Classifier {} loaded", model.version());
            Some(Arc::new(model))
        }
        Err(e) => {
            warn!("Classifier unavailable, using rule-based scores only: {}", e);
            None
        }
    }
}

/// Classifier confidence in percent, or `None` when no usable score exists.
pub fn ml_confidence(classifier: Option<&dyn Classifier>, features: &FeatureSet) -> Option<f64> {
    let classifier = classifier?;
    let probability = classifier
        .predict_probability(&features.vector())
        .and_then(|p| {
            if p.is_finite() && (0.0..=1.0).contains(&p) {
                Ok(p)
            } else {
                Err(ClassifierError::InvalidProbability(p))
            }
        });

    match probability {
        Ok(p) => Some(p * 100.0),
        Err(e) => {
            warn!("Classifier prediction failed: {}", e);
            metrics::counter!("phishcheck_classifier_failures_total").increment(1);
            None
        }
    }
}
