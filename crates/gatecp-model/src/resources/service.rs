use gatecp_schema::detail::DetailSet;
use gatecp_schema::{Schema, ValidationError};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::Result;
use crate::index::Index;
use crate::message::{is_default, Message, Named};
use crate::object::{apply_record_defaults, impl_record, validate_message, Object, ValidationContext};
use crate::typedefs;

pub const TYPE: &str = "service";

const DEFAULT_RETRIES: i32 = 5;
const DEFAULT_TIMEOUT_MS: i32 = 60_000;
const STREAM_PROTOCOLS: [&str; 3] = ["tcp", "tls", "udp"];

/// An upstream the gateway proxies to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Service {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Shorthand for protocol, host, port and path; expanded by defaults.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub url: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub protocol: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub host: String,
    #[serde(default, skip_serializing_if = "is_default")]
    pub port: i32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retries: Option<i32>,
    #[serde(default, skip_serializing_if = "is_default")]
    pub connect_timeout: i32,
    #[serde(default, skip_serializing_if = "is_default")]
    pub read_timeout: i32,
    #[serde(default, skip_serializing_if = "is_default")]
    pub write_timeout: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "is_default")]
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "is_default")]
    pub updated_at: i64,
}

impl Named for Service {
    const FULL_NAME: &'static str = "gatecp.model.v1.Service";
}

impl_record!(Service);

pub fn schema() -> Schema {
    let timeout = || typedefs::bounded(1, i64::from(i32::MAX) - 1);
    let stream_protocol = Schema::default()
        .with_property("protocol", typedefs::one_of_strings(&STREAM_PROTOCOLS))
        .with_required(&["protocol"]);
    let no_path = Schema::default().with_property(
        "path",
        Schema {
            pattern: Some("^$".to_string()),
            ..Schema::default()
        }
        .with_description("path can only be set when protocol is 'http', 'https', 'grpc' or 'grpcs'"),
    );

    Schema {
        if_: Some(Box::new(stream_protocol)),
        then: Some(Box::new(no_path)),
        ..typedefs::with_record_fields(typedefs::root("Service", ""))
    }
    .with_property("name", typedefs::name())
    .with_property("url", Schema::string())
    .with_property("protocol", typedefs::one_of_strings(&typedefs::PROTOCOLS))
    .with_property(
        "host",
        Schema {
            pattern: Some(typedefs::HOST_PATTERN.to_string()),
            min_length: Some(1),
            max_length: Some(256),
            ..Schema::string()
        },
    )
    .with_property("port", typedefs::bounded(1, 65535))
    .with_property(
        "path",
        Schema {
            pattern: Some(typedefs::PATH_PATTERN.to_string()),
            ..Schema::string()
        },
    )
    .with_property("retries", typedefs::bounded(0, 32767))
    .with_property("connect_timeout", timeout())
    .with_property("read_timeout", timeout())
    .with_property("write_timeout", timeout())
    .with_property("enabled", Schema::boolean())
    .with_property("tags", typedefs::tags())
    .with_required(&["id", "protocol", "host"])
}

#[derive(Debug, Clone, Default)]
pub struct ServiceObject {
    pub service: Service,
}

impl ServiceObject {
    pub fn new(service: Service) -> Self {
        Self { service }
    }

    fn expand_url(&mut self) {
        if self.service.url.is_empty() {
            return;
        }
        // an unparsable url is kept for validate to report
        let Ok(url) = Url::parse(&self.service.url) else {
            return;
        };

        let service = &mut self.service;
        if service.protocol.is_empty() {
            service.protocol = url.scheme().to_string();
        }
        if service.host.is_empty() {
            service.host = url.host_str().unwrap_or_default().to_string();
        }
        if service.port == 0 {
            if let Some(port) = url.port_or_known_default() {
                service.port = i32::from(port);
            }
        }
        if service.path.is_empty() && url.path() != "/" {
            service.path = url.path().to_string();
        }
        service.url.clear();
    }
}

impl Object for ServiceObject {
    fn id(&self) -> &str {
        &self.service.id
    }

    fn type_name(&self) -> &'static str {
        TYPE
    }

    fn resource(&self) -> &dyn Message {
        &self.service
    }

    fn resource_mut(&mut self) -> &mut dyn Message {
        &mut self.service
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> std::result::Result<(), ValidationError> {
        let mut details = DetailSet::new();
        if let Err(err) = validate_message(ctx, TYPE, &self.service) {
            details.absorb(err);
        }
        if !self.service.url.is_empty() {
            if let Err(err) = Url::parse(&self.service.url) {
                details.push_field("url", format!("invalid url: {err}"));
            }
        }
        details.into_result()
    }

    fn process_defaults(&mut self, _ctx: &ValidationContext<'_>) -> Result<()> {
        self.expand_url();

        let service = &mut self.service;
        apply_record_defaults(service);
        if service.protocol.is_empty() {
            service.protocol = "http".to_string();
        }
        if service.port == 0 {
            service.port = match service.protocol.as_str() {
                "https" | "grpcs" | "tls" => 443,
                _ => 80,
            };
        }
        service.retries.get_or_insert(DEFAULT_RETRIES);
        for timeout in [
            &mut service.connect_timeout,
            &mut service.read_timeout,
            &mut service.write_timeout,
        ] {
            if *timeout == 0 {
                *timeout = DEFAULT_TIMEOUT_MS;
            }
        }
        service.enabled.get_or_insert(true);
        Ok(())
    }

    fn indexes(&self) -> Vec<Index> {
        let mut indexes = Vec::new();
        if !self.service.name.is_empty() {
            indexes.push(Index::unique("name", &self.service.name, "name"));
        }
        indexes
    }
}
