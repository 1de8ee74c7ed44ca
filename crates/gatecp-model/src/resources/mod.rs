//! The bundled resource types.

pub mod ca_certificate;
pub mod certificate;
pub mod consumer;
pub mod consumer_group;
pub mod plugin;
pub mod plugin_schema;
pub mod route;
pub mod service;

use gatecp_schema::{Schema, SchemaRegistry};

use crate::error::Result;
use crate::message::Message;
use crate::object::Object;
use crate::types::{Constructor, TypeRegistry};

pub use ca_certificate::{CaCertificate, CaCertificateObject};
pub use certificate::{Certificate, CertificateObject};
pub use consumer::{Consumer, ConsumerObject};
pub use consumer_group::{ConsumerGroup, ConsumerGroupObject};
pub use plugin::{Plugin, PluginObject};
pub use plugin_schema::{PluginSchema, PluginSchemaObject};
pub use route::{Route, RouteObject};
pub use service::{Service, ServiceObject};

struct Builtin {
    type_name: &'static str,
    sample: fn() -> Box<dyn Message>,
    constructor: Constructor,
    schema: fn() -> Schema,
}

fn builtins() -> [Builtin; 8] {
    fn boxed<O: Object + Default + 'static>() -> Box<dyn Object> {
        Box::new(O::default())
    }
    fn sample<M: Message + Default>() -> Box<dyn Message> {
        Box::new(M::default())
    }

    [
        Builtin {
            type_name: service::TYPE,
            sample: sample::<Service>,
            constructor: boxed::<ServiceObject>,
            schema: service::schema,
        },
        Builtin {
            type_name: route::TYPE,
            sample: sample::<Route>,
            constructor: boxed::<RouteObject>,
            schema: route::schema,
        },
        Builtin {
            type_name: consumer::TYPE,
            sample: sample::<Consumer>,
            constructor: boxed::<ConsumerObject>,
            schema: consumer::schema,
        },
        Builtin {
            type_name: consumer_group::TYPE,
            sample: sample::<ConsumerGroup>,
            constructor: boxed::<ConsumerGroupObject>,
            schema: consumer_group::schema,
        },
        Builtin {
            type_name: ca_certificate::TYPE,
            sample: sample::<CaCertificate>,
            constructor: boxed::<CaCertificateObject>,
            schema: ca_certificate::schema,
        },
        Builtin {
            type_name: certificate::TYPE,
            sample: sample::<Certificate>,
            constructor: boxed::<CertificateObject>,
            schema: certificate::schema,
        },
        Builtin {
            type_name: plugin::TYPE,
            sample: sample::<Plugin>,
            constructor: boxed::<PluginObject>,
            schema: plugin::schema,
        },
        Builtin {
            type_name: plugin_schema::TYPE,
            sample: sample::<PluginSchema>,
            constructor: boxed::<PluginSchemaObject>,
            schema: plugin_schema::schema,
        },
    ]
}

/// Register every bundled type and its schema document.
pub fn register_builtin(types: &TypeRegistry, schemas: &SchemaRegistry) -> Result<()> {
    for builtin in builtins() {
        let sample = (builtin.sample)();
        types.register_type(builtin.type_name, sample.as_ref(), builtin.constructor)?;
        schemas.register(builtin.type_name, (builtin.schema)())?;
    }
    Ok(())
}
