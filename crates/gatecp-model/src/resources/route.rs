use std::collections::BTreeMap;

use gatecp_schema::{Schema, ValidationError};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::index::Index;
use crate::message::{is_default, EntityRef, Message, Named};
use crate::object::{apply_record_defaults, impl_record, validate_message, Object, ValidationContext};
use crate::typedefs;

pub const TYPE: &str = "route";

const MATCHERS: [&str; 5] = ["methods", "hosts", "paths", "headers", "snis"];
const MATCHER_MESSAGE: &str =
    "at least one of 'methods', 'hosts', 'paths', 'headers' or 'snis' must be set";
const REDIRECT_STATUS_CODES: [i64; 5] = [426, 301, 302, 307, 308];

/// Matching rules that send requests to a service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Route {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub protocols: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hosts: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub paths: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, Vec<String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub snis: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strip_path: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preserve_host: Option<bool>,
    #[serde(default, skip_serializing_if = "is_default")]
    pub regex_priority: i32,
    #[serde(default, skip_serializing_if = "is_default")]
    pub https_redirect_status_code: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<EntityRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "is_default")]
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "is_default")]
    pub updated_at: i64,
}

impl Named for Route {
    const FULL_NAME: &'static str = "gatecp.model.v1.Route";
}

impl_record!(Route);

pub fn schema() -> Schema {
    let strings = |pattern: &str| {
        Schema::array(Schema {
            pattern: Some(pattern.to_string()),
            ..Schema::string()
        })
    };

    Schema {
        any_of: MATCHERS
            .iter()
            .map(|&field| Schema::requiring(&[field]).with_description(MATCHER_MESSAGE))
            .collect(),
        ..typedefs::with_record_fields(typedefs::root("Route", ""))
    }
    .with_property("name", typedefs::name())
    .with_property("protocols", typedefs::protocols(&typedefs::PROTOCOLS))
    .with_property(
        "methods",
        Schema {
            max_items: Some(16),
            ..strings("^[A-Z]+$")
        },
    )
    .with_property("hosts", strings(typedefs::HOST_PATTERN))
    .with_property("paths", strings(typedefs::PATH_PATTERN))
    .with_property(
        "headers",
        Schema {
            additional_properties: Some(true),
            ..Schema::object()
        },
    )
    .with_property("snis", strings(typedefs::HOST_PATTERN))
    .with_property("strip_path", Schema::boolean())
    .with_property("preserve_host", Schema::boolean())
    .with_property("regex_priority", typedefs::bounded(0, i64::from(i32::MAX)))
    .with_property(
        "https_redirect_status_code",
        Schema {
            enum_: REDIRECT_STATUS_CODES.iter().map(|code| (*code).into()).collect(),
            ..Schema::integer()
        },
    )
    .with_property("service", typedefs::reference())
    .with_property("tags", typedefs::tags())
    .with_required(&["id", "protocols"])
}

#[derive(Debug, Clone, Default)]
pub struct RouteObject {
    pub route: Route,
}

impl RouteObject {
    pub fn new(route: Route) -> Self {
        Self { route }
    }
}

impl Object for RouteObject {
    fn id(&self) -> &str {
        &self.route.id
    }

    fn type_name(&self) -> &'static str {
        TYPE
    }

    fn resource(&self) -> &dyn Message {
        &self.route
    }

    fn resource_mut(&mut self) -> &mut dyn Message {
        &mut self.route
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> std::result::Result<(), ValidationError> {
        validate_message(ctx, TYPE, &self.route)
    }

    fn process_defaults(&mut self, _ctx: &ValidationContext<'_>) -> Result<()> {
        let route = &mut self.route;
        apply_record_defaults(route);
        if route.protocols.is_empty() {
            route.protocols = vec!["http".to_string(), "https".to_string()];
        }
        route.strip_path.get_or_insert(true);
        route.preserve_host.get_or_insert(false);
        if route.https_redirect_status_code == 0 {
            route.https_redirect_status_code = 426;
        }
        Ok(())
    }

    fn indexes(&self) -> Vec<Index> {
        let mut indexes = Vec::new();
        if !self.route.name.is_empty() {
            indexes.push(Index::unique("name", &self.route.name, "name"));
        }
        if let Some(service) = self.route.service.as_ref().filter(|s| !s.id.is_empty()) {
            indexes.push(Index::foreign("service", super::service::TYPE, &service.id, "service.id"));
        }
        indexes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indexes_describe_name_and_service() {
        let object = RouteObject::new(Route {
            name: "r1".to_string(),
            service: Some(EntityRef::new("svc-1")),
            ..Route::default()
        });
        assert_eq!(
            object.indexes(),
            vec![
                Index::unique("name", "r1", "name"),
                Index::foreign("service", "service", "svc-1", "service.id"),
            ]
        );
    }

    #[test]
    fn headers_serialize_as_a_map() {
        let route = Route {
            headers: BTreeMap::from([("x-env".to_string(), vec!["prod".to_string()])]),
            ..Route::default()
        };
        assert_eq!(
            route.to_value().unwrap(),
            serde_json::json!({"headers": {"x-env": ["prod"]}})
        );
    }
}
