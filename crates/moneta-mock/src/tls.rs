// crates/moneta-mock/src/tls.rs
// ============================================================================
// Module: TLS Fixtures
// Description: Generate ephemeral TLS identities for mock servers.
// Purpose: Avoid committing private keys while keeping endpoints HTTPS.
// Dependencies: rcgen
// ============================================================================

//! ## Overview
//! Every mock server terminates TLS with a certificate generated at startup.
//! The connector's test configuration disables certificate verification, so
//! a self-signed loopback identity is all the harness needs.

use rcgen::CertificateParams;
use rcgen::DistinguishedName;
use rcgen::DnType;
use rcgen::IsCa;
use rcgen::KeyPair;
use thiserror::Error;

/// Failure to generate an ephemeral TLS identity.
#[derive(Debug, Error)]
#[error("tls identity generation failed: {0}")]
pub struct TlsError(#[from] rcgen::Error);

/// PEM-encoded certificate and private key for one mock server.
#[derive(Debug, Clone)]
pub struct TlsIdentity {
    /// Server certificate, PEM.
    pub cert_pem: String,
    /// Private key, PEM.
    pub key_pem: String,
}

impl TlsIdentity {
    /// Generates a self-signed loopback identity.
    ///
    /// # Errors
    ///
    /// Returns [`TlsError`] when key or certificate generation fails.
    pub fn generate(common_name: &str) -> Result<Self, TlsError> {
        let key = KeyPair::generate()?;
        let mut params =
            CertificateParams::new(vec!["localhost".to_string(), "127.0.0.1".to_string()])?;
        params.is_ca = IsCa::NoCa;
        params.distinguished_name = distinguished_name(common_name);
        let cert = params.self_signed(&key)?;
        Ok(Self {
            cert_pem: cert.pem(),
            key_pem: key.serialize_pem(),
        })
    }
}

fn distinguished_name(common_name: &str) -> DistinguishedName {
    let mut name = DistinguishedName::new();
    name.push(DnType::CommonName, common_name);
    name
}
