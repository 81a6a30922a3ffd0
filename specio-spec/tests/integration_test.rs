//! Integration tests for specio-spec

use specio_spec::*;
use std::io::Write;

const SEVEN_METHODS: &str = r#"{
  "paths": {
    "/foo": {
      "options": { "operationId": "sendOptions" },
      "head": { "operationId": "sendHead" },
      "get": { "operationId": "getFoo" },
      "post": { "operationId": "postFoo" },
      "put": { "operationId": "putFoo" },
      "patch": { "operationId": "patchFoo" },
      "delete": { "operationId": "deleteFoo" }
    }
  }
}"#;

#[test]
fn test_seven_methods_on_one_path() {
    let spec = Specification::from_json_str(SEVEN_METHODS).unwrap();
    let ids: Vec<_> = spec
        .operations()
        .filter_map(|(_, _, op)| op.operation_id())
        .collect();

    assert_eq!(
        ids,
        vec![
            "sendHead",
            "sendOptions",
            "deleteFoo",
            "getFoo",
            "postFoo",
            "putFoo",
            "patchFoo"
        ]
    );
}

#[test]
fn test_unknown_fields_are_ignored() {
    let spec = Specification::from_json_str(
        r#"{
            "swagger": "2.0",
            "info": { "title": "Petstore", "version": "1.0.0", "x-logo": {} },
            "definitions": { "Pet": { "type": "object" } },
            "paths": {
                "/pet": {
                    "post": {
                        "operationId": "addPet",
                        "parameters": [{ "in": "body", "name": "body" }],
                        "responses": { "405": { "description": "Invalid input" } }
                    }
                }
            }
        }"#,
    )
    .unwrap();

    assert_eq!(spec.operations().count(), 1);
}

#[test]
fn test_from_path_by_extension() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    file.write_all(SEVEN_METHODS.as_bytes()).unwrap();

    let spec = Specification::from_path(file.path()).unwrap();
    assert_eq!(spec.operations().count(), 7);
}

#[test]
fn test_from_path_yaml() {
    let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
    file.write_all(b"host: example.org\nbasePath: /api\n").unwrap();

    let spec = Specification::from_path(file.path()).unwrap();
    assert_eq!(spec.host(), "example.org");
    assert_eq!(spec.base_path(), "/api");
}

#[test]
fn test_from_path_unsupported_extension() {
    let file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
    let result = Specification::from_path(file.path());
    assert!(matches!(result, Err(SpecError::UnsupportedFormat(_))));
}

#[test]
fn test_from_path_missing_file() {
    let result = Specification::from_path("/nonexistent/specio/swagger.json");
    assert!(matches!(result, Err(SpecError::Io(_))));
}

#[test]
fn test_yaml_and_json_agree() {
    let from_json = Specification::from_json_str(SEVEN_METHODS).unwrap();
    let yaml = from_json.to_yaml_string().unwrap();
    let from_yaml = Specification::from_yaml_str(&yaml).unwrap();
    assert_eq!(from_json, from_yaml);
}
