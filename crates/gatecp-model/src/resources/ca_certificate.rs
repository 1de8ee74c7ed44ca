use gatecp_schema::detail::DetailSet;
use gatecp_schema::{Schema, ValidationError};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::formats::{certificate_info, NOT_A_CA_MESSAGE, PEM_ENCODED_CERT};
use crate::index::Index;
use crate::message::{is_default, Message, Named};
use crate::object::{apply_record_defaults, impl_record, validate_message, Object, ValidationContext};
use crate::typedefs;

pub const TYPE: &str = "ca_certificate";

/// A trusted certificate authority.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CaCertificate {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cert: String,
    /// Hex sha256 of the DER encoding of `cert`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cert_digest: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "is_default")]
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "is_default")]
    pub updated_at: i64,
}

impl Named for CaCertificate {
    const FULL_NAME: &'static str = "gatecp.model.v1.CACertificate";
}

impl_record!(CaCertificate);

pub fn schema() -> Schema {
    typedefs::with_record_fields(typedefs::root("CACertificate", "ca-certificates"))
        .with_property(
            "cert",
            Schema {
                format: Some(PEM_ENCODED_CERT.to_string()),
                ..Schema::string()
            },
        )
        .with_property(
            "cert_digest",
            Schema {
                pattern: Some("^[0-9a-f]{64}$".to_string()),
                ..Schema::string()
            },
        )
        .with_property("tags", typedefs::tags())
        .with_required(&["id", "cert"])
}

#[derive(Debug, Clone, Default)]
pub struct CaCertificateObject {
    pub certificate: CaCertificate,
}

impl CaCertificateObject {
    pub fn new(certificate: CaCertificate) -> Self {
        Self { certificate }
    }
}

impl Object for CaCertificateObject {
    fn id(&self) -> &str {
        &self.certificate.id
    }

    fn type_name(&self) -> &'static str {
        TYPE
    }

    fn resource(&self) -> &dyn Message {
        &self.certificate
    }

    fn resource_mut(&mut self) -> &mut dyn Message {
        &mut self.certificate
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> std::result::Result<(), ValidationError> {
        validate_message(ctx, TYPE, &self.certificate)?;

        // the schema already checked that the certificate parses
        let Ok(info) = certificate_info(&self.certificate.cert) else {
            return Ok(());
        };
        let mut details = DetailSet::new();
        if info.is_expired_at(chrono::Utc::now().timestamp()) {
            details.push_field("cert", info.expired_message());
        }
        if !info.is_ca {
            details.push_field("cert", NOT_A_CA_MESSAGE);
        }
        if !self.certificate.cert_digest.is_empty() && self.certificate.cert_digest != info.digest {
            details.push_field("cert_digest", "does not match the certificate");
        }
        details.into_result()
    }

    fn process_defaults(&mut self, _ctx: &ValidationContext<'_>) -> Result<()> {
        apply_record_defaults(&mut self.certificate);
        if self.certificate.cert_digest.is_empty() {
            if let Ok(info) = certificate_info(&self.certificate.cert) {
                self.certificate.cert_digest = info.digest;
            }
        }
        Ok(())
    }

    fn indexes(&self) -> Vec<Index> {
        let mut indexes = Vec::new();
        if !self.certificate.cert_digest.is_empty() {
            indexes.push(Index::unique(
                "cert_digest",
                &self.certificate.cert_digest,
                "cert_digest",
            ));
        }
        indexes
    }
}
