use super::{ProbeError, TlsProbe};
use crate::error::AppError;
use async_trait::async_trait;
use std::{sync::Arc, time::Duration};
use tokio::net::TcpStream;
use tokio_rustls::{
    rustls::{self, pki_types::ServerName, ClientConfig, RootCertStore},
    TlsConnector,
};

const HTTPS_PORT: u16 = 443;

/// Verifies the certificate chain and hostname of `host:443` (or the port
/// set with [`RustlsTlsProbe::with_port`]) against the Mozilla root set.
/// Only the handshake runs; no request is sent.
pub struct RustlsTlsProbe {
    connector: TlsConnector,
    timeout: Duration,
    port: u16,
}

impl RustlsTlsProbe {
    pub fn new(timeout: Duration) -> Result<Self, AppError> {
        let mut roots = RootCertStore::empty();
        roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

        let provider = Arc::new(rustls::crypto::ring::default_provider());
        let config = ClientConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .map_err(|e| AppError::Internal(format!("TLS client config: {e}")))?
            .with_root_certificates(roots)
            .with_no_client_auth();

        Ok(Self {
            connector: TlsConnector::from(Arc::new(config)),
            timeout,
            port: HTTPS_PORT,
        })
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }
}

#[async_trait]
impl TlsProbe for RustlsTlsProbe {
    async fn handshake(&self, host: &str) -> Result<(), ProbeError> {
        let server_name = ServerName::try_from(host.to_string())
            .map_err(|_| ProbeError::InvalidHost(host.to_string()))?;

        let attempt = async move {
            let tcp = TcpStream::connect((host, self.port))
                .await
                .map_err(ProbeError::Connect)?;
            self.connector
                .connect(server_name, tcp)
                .await
                .map_err(ProbeError::Handshake)?;
            Ok::<(), ProbeError>(())
        };

        tokio::time::timeout(self.timeout, attempt)
            .await
            .map_err(|_| ProbeError::Timeout(self.timeout))?
    }
}
