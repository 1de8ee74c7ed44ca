//! Named string formats used by the bundled schemas, plus the certificate
//! facts some resources check after schema validation.

use chrono::DateTime;
use gatecp_schema::Formats;
use sha2::{Digest, Sha256};
use x509_parser::pem::{parse_x509_pem, Pem};

pub const PEM_ENCODED_CERT: &str = "pem-encoded-cert";
pub const PEM_ENCODED_PRIVATE_KEY: &str = "pem-encoded-private-key";

/// Formats the bundled schemas refer to.
pub fn builtin_formats() -> gatecp_schema::Result<Formats> {
    let mut formats = Formats::new();
    formats.register(PEM_ENCODED_CERT, is_pem_encoded_cert)?;
    formats.register(PEM_ENCODED_PRIVATE_KEY, is_pem_encoded_private_key)?;
    Ok(formats)
}

pub fn is_pem_encoded_cert(value: &str) -> bool {
    certificate_info(value).is_ok()
}

pub fn is_pem_encoded_private_key(value: &str) -> bool {
    match decode_pem(value) {
        Ok(pem) => pem.label.ends_with("PRIVATE KEY") && !pem.contents.is_empty(),
        Err(_) => false,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CertificateError {
    #[error("invalid PEM block: {0}")]
    Pem(String),

    #[error("expected a CERTIFICATE block, found {0}")]
    Label(String),

    #[error("invalid certificate: {0}")]
    X509(String),
}

/// What the resource checks need to know about a certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateInfo {
    /// Unix seconds.
    pub not_before: i64,
    /// Unix seconds.
    pub not_after: i64,
    pub is_ca: bool,
    /// Hex sha256 of the DER encoding.
    pub digest: String,
}

impl CertificateInfo {
    pub fn is_expired_at(&self, unix_seconds: i64) -> bool {
        unix_seconds > self.not_after
    }

    /// Message for a certificate that is no longer valid.
    pub fn expired_message(&self) -> String {
        format!("certificate expired, \"Not After\" {}", format_time(self.not_after))
    }
}

pub const NOT_A_CA_MESSAGE: &str =
    "certificate does not appear to be a CA because it is missing the \"CA\" basic constraint";

pub fn certificate_info(value: &str) -> Result<CertificateInfo, CertificateError> {
    let pem = decode_pem(value)?;
    if pem.label != "CERTIFICATE" {
        return Err(CertificateError::Label(pem.label));
    }
    let cert = pem
        .parse_x509()
        .map_err(|err| CertificateError::X509(err.to_string()))?;

    let validity = cert.validity();
    let is_ca = match cert.basic_constraints() {
        Ok(Some(ext)) => ext.value.ca,
        _ => false,
    };

    Ok(CertificateInfo {
        not_before: validity.not_before.timestamp(),
        not_after: validity.not_after.timestamp(),
        is_ca,
        digest: hex::encode(Sha256::digest(&pem.contents)),
    })
}

fn decode_pem(value: &str) -> Result<Pem, CertificateError> {
    parse_x509_pem(value.trim().as_bytes())
        .map(|(_, pem)| pem)
        .map_err(|err| CertificateError::Pem(err.to_string()))
}

fn format_time(unix_seconds: i64) -> String {
    match DateTime::from_timestamp(unix_seconds, 0) {
        Some(time) => time.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => unix_seconds.to_string(),
    }
}
