use crate::scoring::{BrandBonus, WeightTable};
use ::config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

pub const CONFIG_FILE_VAR: &str = "PHISHCHECK_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "phishcheck.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub bind_addr: String,
    pub classifier_path: PathBuf,
    pub psl_path: Option<PathBuf>,
    pub tls_timeout_ms: u64,
    pub whois_timeout_ms: u64,
    pub brand_bonus: BrandBonus,
    pub weights: WeightTable,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8000".to_string(),
            classifier_path: PathBuf::from("models/phishing_classifier.json"),
            psl_path: None,
            tls_timeout_ms: 3000,
            whois_timeout_ms: 5000,
            brand_bonus: BrandBonus::default(),
            weights: WeightTable::default(),
        }
    }
}

impl Settings {
    /// Reads the optional TOML file named by `PHISHCHECK_CONFIG`, then
    /// `PHISHCHECK_*` environment overrides (`__` separates nested keys).
    pub fn load() -> Result<Self, ConfigError> {
        let file = std::env::var(CONFIG_FILE_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_from(Path::new(&file))
    }

    pub fn load_from(file: &Path) -> Result<Self, ConfigError> {
        let settings: Settings = Config::builder()
            .add_source(File::from(file).required(false))
            .add_source(
                Environment::with_prefix("PHISHCHECK")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.weights.validate()?;
        Ok(settings)
    }

    pub fn tls_timeout(&self) -> Duration {
        Duration::from_millis(self.tls_timeout_ms)
    }

    pub fn whois_timeout(&self) -> Duration {
        Duration::from_millis(self.whois_timeout_ms)
    }
}
