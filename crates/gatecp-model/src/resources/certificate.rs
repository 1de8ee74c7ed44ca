use gatecp_schema::{Schema, ValidationError};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::formats::{certificate_info, PEM_ENCODED_CERT, PEM_ENCODED_PRIVATE_KEY};
use crate::index::Index;
use crate::message::{is_default, Message, Named};
use crate::object::{apply_record_defaults, impl_record, validate_message, Object, ValidationContext};
use crate::typedefs;

pub const TYPE: &str = "certificate";

/// A certificate and key the gateway serves TLS with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Certificate {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cert: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub key: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "is_default")]
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "is_default")]
    pub updated_at: i64,
}

impl Named for Certificate {
    const FULL_NAME: &'static str = "gatecp.model.v1.Certificate";
}

impl_record!(Certificate);

pub fn schema() -> Schema {
    let pem = |format: &str| Schema {
        format: Some(format.to_string()),
        ..Schema::string()
    };

    typedefs::with_record_fields(typedefs::root("Certificate", ""))
        .with_property("cert", pem(PEM_ENCODED_CERT))
        .with_property("key", pem(PEM_ENCODED_PRIVATE_KEY))
        .with_property("tags", typedefs::tags())
        .with_required(&["id", "cert", "key"])
}

#[derive(Debug, Clone, Default)]
pub struct CertificateObject {
    pub certificate: Certificate,
}

impl CertificateObject {
    pub fn new(certificate: Certificate) -> Self {
        Self { certificate }
    }
}

impl Object for CertificateObject {
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

        match certificate_info(&self.certificate.cert) {
            Ok(info) if info.is_expired_at(chrono::Utc::now().timestamp()) => {
                Err(ValidationError::field("cert", info.expired_message()))
            }
            _ => Ok(()),
        }
    }

    fn process_defaults(&mut self, _ctx: &ValidationContext<'_>) -> Result<()> {
        apply_record_defaults(&mut self.certificate);
        Ok(())
    }

    fn indexes(&self) -> Vec<Index> {
        Vec::new()
    }
}
