use gatecp_model::resources::{Service, ServiceObject};
use gatecp_model::{register_builtin, ModelError, Object, TypeRegistry};
use gatecp_schema::SchemaRegistry;

fn service_object() -> Box<dyn Object> {
    Box::new(ServiceObject::default())
}

#[test]
fn registering_a_type_twice_fails() {
    let types = TypeRegistry::new();
    let schemas = SchemaRegistry::new();
    register_builtin(&types, &schemas).unwrap();

    let err = register_builtin(&types, &SchemaRegistry::new()).unwrap_err();
    assert!(matches!(err, ModelError::TypeAlreadyRegistered(_)));
    assert!(err.to_string().starts_with("type already registered"));
}

#[test]
fn two_types_cannot_share_a_message() {
    let types = TypeRegistry::new();
    types
        .register_type("service", &Service::default(), service_object)
        .unwrap();

    let err = types
        .register_type("upstream", &Service::default(), service_object)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "protobuf message already registered: gatecp.model.v1.Service"
    );
    assert_eq!(types.all_types(), vec!["service".to_string()]);
}

#[test]
fn lookups_follow_registration() {
    let types = TypeRegistry::new();
    register_builtin(&types, &SchemaRegistry::new()).unwrap();

    assert_eq!(
        types.type_for_message("gatecp.model.v1.CACertificate").as_deref(),
        Some("ca_certificate")
    );
    assert_eq!(types.message_name("route"), Some("gatecp.model.v1.Route"));
    assert!(matches!(
        types.new_object("upstream"),
        Err(ModelError::TypeNotFound(_))
    ));
}
