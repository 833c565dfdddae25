//! Best-effort live lookups against the registered domain.
//!
//! Probes report failures as [`ProbeError`]; [`LiveSignals::from_outcomes`]
//! is the single place where a failure turns into its fallback score.
//! Failed lookups are fail-suspicious: they score as the riskiest outcome.

pub mod tls;
pub mod whois;

pub use tls::RustlsTlsProbe;
pub use whois::WhoisLookup;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::{sync::Arc, time::Duration};
use thiserror::Error;
use tracing::debug;

pub const TLS_SUCCESS_SCORE: f64 = 0.0;
pub const TLS_FAILURE_SCORE: f64 = 0.8;
pub const UNKNOWN_AGE_DAYS: i64 = 0;
pub const UNKNOWN_AGE_SCORE: f64 = 0.9;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("invalid probe target: {0:?}")]
    InvalidHost(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("connection failed: {0}")]
    Connect(#[source] std::io::Error),

    #[error("TLS handshake failed: {0}")]
    Handshake(#[source] std::io::Error),

    #[error("transport error: {0}")]
    Transport(#[source] std::io::Error),

    #[error("lookup failed: {0}")]
    Lookup(String),

    #[error("no creation date in registration record")]
    NoCreationDate,
}

#[async_trait]
pub trait TlsProbe: Send + Sync {
    /// Succeeds when a TLS handshake with `host:443` completes.
    async fn handshake(&self, host: &str) -> Result<(), ProbeError>;
}

#[async_trait]
pub trait RegistrationLookup: Send + Sync {
    async fn creation_date(&self, domain: &str) -> Result<DateTime<Utc>, ProbeError>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiveSignals {
    pub tls_valid: bool,
    pub ssl_valid_score: f64,
    pub domain_age_days: i64,
    pub domain_age_score: f64,
}

impl LiveSignals {
    /// Signals for a target that was never probed; scores as a double failure.
    pub fn unprobed() -> Self {
        Self {
            tls_valid: false,
            ssl_valid_score: TLS_FAILURE_SCORE,
            domain_age_days: UNKNOWN_AGE_DAYS,
            domain_age_score: UNKNOWN_AGE_SCORE,
        }
    }

    pub fn from_outcomes(
        tls: &Result<(), ProbeError>,
        created: &Result<DateTime<Utc>, ProbeError>,
        now: DateTime<Utc>,
    ) -> Self {
        let (tls_valid, ssl_valid_score) = match tls {
            Ok(()) => (true, TLS_SUCCESS_SCORE),
            Err(_) => (false, TLS_FAILURE_SCORE),
        };

        let (domain_age_days, domain_age_score) = match created {
            Ok(created) => {
                let days = (now - *created).num_days();
                (days, domain_age_score(days))
            }
            Err(_) => (UNKNOWN_AGE_DAYS, UNKNOWN_AGE_SCORE),
        };

        Self {
            tls_valid,
            ssl_valid_score,
            domain_age_days,
            domain_age_score,
        }
    }
}

pub fn domain_age_score(days: i64) -> f64 {
    if days < 30 {
        0.9
    } else if days < 90 {
        0.6
    } else if days < 365 {
        0.3
    } else {
        0.0
    }
}

/// Runs both probes concurrently against one registered domain.
#[derive(Clone)]
pub struct LiveProbes {
    tls: Arc<dyn TlsProbe>,
    registration: Arc<dyn RegistrationLookup>,
}

impl LiveProbes {
    pub fn new(tls: Arc<dyn TlsProbe>, registration: Arc<dyn RegistrationLookup>) -> Self {
        Self { tls, registration }
    }

    pub async fn probe(&self, registered_domain: &str) -> LiveSignals {
        let (tls, created) = match probe_target(registered_domain) {
            Ok(target) => tokio::join!(
                self.tls.handshake(&target),
                self.registration.creation_date(&target)
            ),
            Err(_) => (
                Err(ProbeError::InvalidHost(registered_domain.to_string())),
                Err(ProbeError::InvalidHost(registered_domain.to_string())),
            ),
        };

        if let Err(e) = &tls {
            debug!(domain = registered_domain, error = %e, "TLS probe failed");
            metrics::counter!("phishcheck_probe_failures_total", "probe" => "tls").increment(1);
        }
        if let Err(e) = &created {
            debug!(domain = registered_domain, error = %e, "registration lookup failed");
            metrics::counter!("phishcheck_probe_failures_total", "probe" => "whois").increment(1);
        }

        LiveSignals::from_outcomes(&tls, &created, Utc::now())
    }
}

/// ASCII (IDNA) form of the domain the probes connect to.
fn probe_target(registered_domain: &str) -> Result<String, ProbeError> {
    if registered_domain.is_empty() {
        return Err(ProbeError::InvalidHost(String::new()));
    }
    idna::domain_to_ascii(registered_domain)
        .map_err(|_| ProbeError::InvalidHost(registered_domain.to_string()))
}
