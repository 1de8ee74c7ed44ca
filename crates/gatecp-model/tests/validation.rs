use gatecp_model::formats::NOT_A_CA_MESSAGE;
use gatecp_model::object::UNKNOWN_FIELD;
use gatecp_model::resources::{
    CaCertificate, CaCertificateObject, ConsumerObject, Plugin, PluginObject, PluginSchema,
    PluginSchemaObject, Route, RouteObject, Service, ServiceObject,
};
use gatecp_model::{EntityRef, Engine, ModelError, Object};
use gatecp_plugin::Context;
use serde_json::json;
use gatecp_schema::{ErrorDetail, ErrorType, ValidationError, ValidatorConfig};
use pretty_assertions::assert_eq;

const CA: &str = include_str!("fixtures/ca.pem");
const EXPIRED_CA: &str = include_str!("fixtures/expired-ca.pem");
const LEAF: &str = include_str!("fixtures/leaf.pem");

fn engine() -> Engine {
    Engine::bootstrap(ValidatorConfig::default()).unwrap()
}

fn defaulted_then_validated(
    engine: &Engine,
    mut object: impl Object,
) -> Result<(), ValidationError> {
    let request = Context::new();
    let ctx = engine.context(&request);
    object.process_defaults(&ctx).unwrap();
    object.validate(&ctx)
}

#[test]
fn empty_consumer_reports_one_entity_detail() {
    let engine = engine();
    let request = Context::new();
    let err = ConsumerObject::default()
        .validate(&engine.context(&request))
        .unwrap_err();

    assert_eq!(err.len(), 1);
    let detail = err.entity_detail().unwrap();
    let mut messages = detail.messages.clone();
    messages.sort();
    assert_eq!(
        messages,
        vec![
            "at least one of custom_id or username must be set".to_string(),
            "missing properties: 'id'".to_string(),
        ]
    );
}

#[test]
fn out_of_range_port_is_one_field_detail() {
    let engine = engine();
    let err = defaulted_then_validated(
        &engine,
        ServiceObject::new(Service {
            host: "example.com".to_string(),
            port: 99999,
            ..Service::default()
        }),
    )
    .unwrap_err();

    assert_eq!(
        err.details(),
        &[ErrorDetail::field(
            "port",
            vec!["99999 is greater than the maximum of 65535".to_string()]
        )]
    );
}

#[test]
fn defaulted_service_is_valid() {
    let engine = engine();
    let service = ServiceObject::new(Service {
        url: "https://example.com:8443/api".to_string(),
        ..Service::default()
    });
    assert_eq!(defaulted_then_validated(&engine, service), Ok(()));
}

#[test]
fn malformed_ca_certificate_fails_its_format() {
    let engine = engine();
    let err = defaulted_then_validated(
        &engine,
        CaCertificateObject::new(CaCertificate {
            cert: "a".to_string(),
            ..CaCertificate::default()
        }),
    )
    .unwrap_err();

    assert_eq!(
        err.details(),
        &[ErrorDetail::field(
            "cert",
            vec!["'a' is not valid 'pem-encoded-cert'".to_string()]
        )]
    );
}

#[test]
fn expired_ca_certificate_is_rejected() {
    let engine = engine();
    let err = defaulted_then_validated(
        &engine,
        CaCertificateObject::new(CaCertificate {
            cert: EXPIRED_CA.to_string(),
            ..CaCertificate::default()
        }),
    )
    .unwrap_err();

    assert_eq!(err.len(), 1);
    let detail = err.field_detail("cert").unwrap();
    assert_eq!(detail.messages.len(), 1);
    assert!(detail.messages[0].contains("certificate expired"));
}

#[test]
fn leaf_certificate_is_not_a_ca() {
    let engine = engine();
    let err = defaulted_then_validated(
        &engine,
        CaCertificateObject::new(CaCertificate {
            cert: LEAF.to_string(),
            ..CaCertificate::default()
        }),
    )
    .unwrap_err();

    assert_eq!(
        err.details(),
        &[ErrorDetail::field("cert", vec![NOT_A_CA_MESSAGE.to_string()])]
    );
}

#[test]
fn ca_certificate_digest_is_filled_and_checked() {
    let engine = engine();
    let request = Context::new();
    let ctx = engine.context(&request);

    let mut object = CaCertificateObject::new(CaCertificate {
        cert: CA.to_string(),
        ..CaCertificate::default()
    });
    object.process_defaults(&ctx).unwrap();
    assert_eq!(
        object.certificate.cert_digest,
        "c465ba53164b6283cc670afa354e2958817e7afe76f864c5053ac94a2796c581"
    );
    assert_eq!(object.validate(&ctx), Ok(()));

    object.certificate.cert_digest = "0".repeat(64);
    let err = object.validate(&ctx).unwrap_err();
    assert_eq!(err.field_detail("cert_digest").unwrap().kind, ErrorType::Field);
}

#[test]
fn bundled_plugin_validates_after_defaults() {
    let engine = engine();
    let plugin = PluginObject::new(Plugin {
        name: "key-auth".to_string(),
        ..Plugin::default()
    });
    assert_eq!(defaulted_then_validated(&engine, plugin), Ok(()));
}

#[test]
fn unknown_plugin_is_reported_on_name() {
    let engine = engine();
    let err = defaulted_then_validated(
        &engine,
        PluginObject::new(Plugin {
            name: "nope".to_string(),
            ..Plugin::default()
        }),
    )
    .unwrap_err();

    assert_eq!(
        err.details(),
        &[ErrorDetail::field(
            "name",
            vec!["plugin(nope) does not exist".to_string()]
        )]
    );
}

#[test]
fn plugin_schema_derives_its_name() {
    let engine = engine();
    let request = Context::new();
    let ctx = engine.context(&request);

    let mut object = PluginSchemaObject::new(PluginSchema {
        schema: r#"{"name": "my-plugin", "config": {"type": "object"}}"#.to_string(),
        ..PluginSchema::default()
    });
    object.process_defaults(&ctx).unwrap();
    assert_eq!(object.plugin_schema.name, "my-plugin");
    assert_eq!(object.validate(&ctx), Ok(()));
}

#[test]
fn plugin_schema_cannot_shadow_a_loaded_plugin() {
    let engine = engine();
    let err = defaulted_then_validated(
        &engine,
        PluginSchemaObject::new(PluginSchema {
            schema: r#"{"name": "key-auth", "config": {"type": "object"}}"#.to_string(),
            ..PluginSchema::default()
        }),
    )
    .unwrap_err();

    let detail = err.entity_detail().unwrap();
    assert!(detail.messages[0].starts_with("unique constraint failed"));
}

#[test]
fn misspelled_field_is_named() {
    for strict_mode in [false, true] {
        let engine = Engine::bootstrap(ValidatorConfig {
            strict_mode,
            ..ValidatorConfig::default()
        })
        .unwrap();

        let err = engine
            .object_from_value("service", json!({"host": "a.b", "prot": "https"}))
            .unwrap_err();
        let ModelError::Invalid(err) = err else {
            panic!("expected an invalid entity, got {err:?}");
        };
        assert_eq!(
            err.details(),
            &[ErrorDetail::field("prot", vec![UNKNOWN_FIELD.to_string()])]
        );
    }
}

#[test]
fn nested_unknown_field_carries_its_path() {
    let engine = engine();
    let err = engine
        .object_from_value(
            "route",
            json!({
                "paths": ["/"],
                "headers": {"x-any": ["1"]},
                "service": {"id": "0b7a8f34-5a67-4c0e-9d3f-3a0e4c5b2f10", "name": "svc"},
            }),
        )
        .unwrap_err();
    let ModelError::Invalid(err) = err else {
        panic!("expected an invalid entity, got {err:?}");
    };
    assert_eq!(err.len(), 1);
    assert!(err.field_detail("service.name").is_some());
}

#[test]
fn declared_fields_still_load() {
    let engine = engine();
    let object = engine
        .object_from_value("service", json!({"host": "a.b", "protocol": "https"}))
        .unwrap();
    assert_eq!(object.resource().to_value().unwrap()["protocol"], "https");
}

#[test]
fn shared_engine_reports_identical_errors_across_threads() {
    let engine = engine();
    let consumer = ConsumerObject::default();
    let route = RouteObject::new(Route {
        protocols: vec!["ftp".to_string()],
        regex_priority: -1,
        service: Some(EntityRef::new("not-a-uuid")),
        ..Route::default()
    });
    let plugin = PluginObject::new(Plugin {
        name: "nope".to_string(),
        protocols: vec!["ftp".to_string()],
        ..Plugin::default()
    });
    let objects: [&dyn Object; 3] = [&consumer, &route, &plugin];

    let render = |object: &dyn Object| {
        let request = Context::new();
        let err = object.validate(&engine.context(&request)).unwrap_err();
        serde_json::to_string(&err).unwrap()
    };
    let expected: Vec<String> = objects.iter().map(|object| render(*object)).collect();

    let rendered: Vec<Vec<String>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                scope.spawn(|| {
                    let mut out = Vec::new();
                    for _ in 0..25 {
                        for object in objects {
                            out.push(render(object));
                        }
                    }
                    out
                })
            })
            .collect();
        handles.into_iter().map(|handle| handle.join().unwrap()).collect()
    });

    for thread in rendered {
        for (index, serialized) in thread.iter().enumerate() {
            assert_eq!(serialized, &expected[index % objects.len()]);
        }
    }
}
