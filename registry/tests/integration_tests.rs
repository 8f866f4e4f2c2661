use std::sync::Arc;
use std::thread;

use serde_json::{Value, json};
use valguard_core::{ErrorCode, Schema, display_path, email, object, string};
use valguard_registry::{
    DefinitionKind, RegistryError, RegistryFile, SchemaDefinition, SchemaRegistry,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const INVOICE_YAML: &str = r#"
version: "1.0"
schemas:
  - name: currency
    schema: { type: enum, values: [USD, EUR, GBP] }
  - name: invoice_item
    schema:
      type: object
      shape:
        invoice_item_no: { type: number, int: true, positive: true }
        invoice_item_quantity: { type: number, int: true, positive: true }
        invoice_item_unit_price: { type: number, positive: true }
        invoice_item_description: { type: string, min: 1 }
  - name: invoice
    schema:
      type: object
      shape:
        invoice_id: { type: string }
        invoice_date: { type: string, format: date }
        invoice_currency: { type: ref, name: currency }
        invoice_total_amount: { type: number, positive: true }
        notes: { type: string, optional: true, nullable: true }
        items:
          type: array
          nonempty: true
          items: { type: ref, name: invoice_item }
"#;

fn valid_invoice() -> Value {
    json!({
        "invoice_id": "INV-001",
        "invoice_date": "2024-02-29",
        "invoice_currency": "EUR",
        "invoice_total_amount": 30,
        "items": [
            {
                "invoice_item_no": 1,
                "invoice_item_quantity": 3,
                "invoice_item_unit_price": 10,
                "invoice_item_description": "Widget"
            }
        ]
    })
}

fn rendered(errors: &[valguard_core::ValidationError]) -> Vec<String> {
    errors
        .iter()
        .map(|e| format!("{} {}", display_path(&e.path), e.code))
        .collect()
}

// ---------------------------------------------------------------------------
// Definition files
// ---------------------------------------------------------------------------

#[test]
fn test_invoice_registry_accepts_valid_document() {
    let registry = SchemaRegistry::from_str_yaml(INVOICE_YAML).unwrap();
    assert_eq!(registry.len(), 3);

    let outcome = registry.validate("invoice", &valid_invoice(), "").unwrap();
    assert!(outcome.is_valid);
    assert_eq!(outcome.value, Some(valid_invoice()));
    assert!(outcome.errors.is_none());
}

#[test]
fn test_invoice_registry_reports_nested_errors_in_key_order() {
    let registry = SchemaRegistry::from_str_yaml(INVOICE_YAML).unwrap();
    let input = json!({
        "invoice_id": "INV-002",
        "invoice_date": "2024-02-30",
        "invoice_currency": "JPY",
        "invoice_total_amount": 10,
        "notes": null,
        "items": [
            {
                "invoice_item_no": 1,
                "invoice_item_quantity": 0,
                "invoice_item_unit_price": 10,
                "invoice_item_description": "a"
            },
            {
                "invoice_item_no": 1.5,
                "invoice_item_quantity": 1,
                "invoice_item_unit_price": 10,
                "invoice_item_description": ""
            }
        ]
    });

    let outcome = registry.validate("invoice", &input, "").unwrap();
    assert!(!outcome.is_valid);
    assert_eq!(outcome.value, Some(input));
    assert_eq!(
        rendered(&outcome.errors.unwrap()),
        vec![
            "invoice_currency union_mismatch",
            "invoice_date invalid_date",
            "items.0.invoice_item_quantity not_positive",
            "items.1.invoice_item_description string_too_short",
            "items.1.invoice_item_no not_integer",
        ]
    );
}

#[test]
fn test_definition_matches_builder_schema() {
    let registry = SchemaRegistry::from_str_yaml(
        r#"
version: "1.0"
schemas:
  - name: contact
    schema:
      type: object
      strict: true
      shape:
        email: { type: string, format: email }
        name: { type: string, min: 2 }
"#,
    )
    .unwrap();
    let built = object()
        .field("email", email())
        .field("name", string().min(2))
        .strict();

    let inputs = [
        json!({"email": "a@b.com", "name": "Jo"}),
        json!({"email": "nope", "name": "J"}),
        json!({"email": "a@b.com", "name": "Jo", "extra": 1}),
        json!("not an object"),
        Value::Null,
    ];
    for input in &inputs {
        let outcome = registry.validate("contact", input, "").unwrap();
        let direct = built.safe_parse(input);
        assert_eq!(outcome.is_valid, direct.is_ok(), "input {input}");
        if let Err(err) = direct {
            let mut from_registry = outcome.errors.unwrap();
            let mut from_builder = err.errors;
            from_registry.sort_by_key(|e| display_path(&e.path));
            from_builder.sort_by_key(|e| display_path(&e.path));
            assert_eq!(from_registry, from_builder, "input {input}");
        }
    }
}

#[test]
fn test_defaults_and_nullable_from_definitions() {
    let registry = SchemaRegistry::from_str_json(
        r#"{"version": "1.0", "schemas": [
            {"name": "settings", "schema": {"type": "object", "shape": {
                "retries": {"type": "number", "int": true, "optional": true, "default": 3},
                "label": {"type": "string", "nullable": true},
                "tags": {"type": "array", "items": {"type": "string"}, "optional": true}
            }}}
        ]}"#,
    )
    .unwrap();

    let outcome = registry
        .validate("settings", &json!({"label": null}), "")
        .unwrap();
    assert_eq!(outcome.value, Some(json!({"retries": 3, "label": null})));

    let outcome = registry
        .validate("settings", &json!({"retries": 5, "label": "x", "tags": ["a"]}), "")
        .unwrap();
    assert_eq!(
        outcome.value,
        Some(json!({"retries": 5, "label": "x", "tags": ["a"]}))
    );

    let outcome = registry.validate("settings", &json!({}), "cfg").unwrap();
    let errors = outcome.errors.unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, ErrorCode::Required);
    assert_eq!(display_path(&errors[0].path), "cfg.label");
}

#[test]
fn test_invalid_definitions_are_rejected() {
    let bad_default = r#"
version: "1.0"
schemas:
  - name: flag
    schema: { type: boolean, optional: true, default: "yes" }
"#;
    assert!(matches!(
        SchemaRegistry::from_str_yaml(bad_default),
        Err(RegistryError::InvalidDefault { kind: "boolean", .. })
    ));

    let bad_pattern = r#"
version: "1.0"
schemas:
  - name: code
    schema: { type: string, pattern: "(" }
"#;
    let err = SchemaRegistry::from_str_yaml(bad_pattern).unwrap_err();
    assert!(err.to_string().starts_with("invalid pattern '('"));
}

// ---------------------------------------------------------------------------
// Files and merging
// ---------------------------------------------------------------------------

#[test]
fn test_saved_file_loads_into_registry() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("schemas.yaml");

    let mut file = RegistryFile::default();
    file.push(
        "sku",
        SchemaDefinition::new(DefinitionKind::String {
            min: None,
            max: None,
            length: Some(8),
            pattern: Some("^[A-Z0-9]+$".to_string()),
            format: None,
        }),
    );
    file.save(&path).unwrap();

    let registry = SchemaRegistry::from_file(&path).unwrap();
    assert!(registry.validate("sku", &json!("AB12CD34"), "").unwrap().is_valid);
    let outcome = registry.validate("sku", &json!("ab12cd34"), "").unwrap();
    assert_eq!(
        outcome.errors.unwrap()[0].code,
        ErrorCode::StringPatternMismatch
    );
}

#[test]
fn test_file_definitions_reference_code_registered_schemas() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("order.json");
    std::fs::write(
        &path,
        r#"{"version": "1.0", "schemas": [
            {"name": "order", "schema": {"type": "object", "shape": {
                "contact": {"type": "ref", "name": "email"}
            }}}
        ]}"#,
    )
    .unwrap();

    let mut registry = SchemaRegistry::new();
    registry.register("email", email()).unwrap();
    registry.load_file(&path).unwrap();

    let outcome = registry
        .validate("order", &json!({"contact": "bad"}), "")
        .unwrap();
    let errors = outcome.errors.unwrap();
    assert_eq!(errors[0].code, ErrorCode::InvalidEmail);
    assert_eq!(errors[0].to_string(), "contact: Invalid email format");
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

#[test]
fn test_registry_shared_across_threads() {
    let registry = Arc::new(SchemaRegistry::from_str_yaml(INVOICE_YAML).unwrap());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let mut doc = valid_invoice();
                if i % 2 == 1 {
                    doc["invoice_total_amount"] = json!(-1);
                }
                registry.validate("invoice", &doc, "").unwrap().is_valid
            })
        })
        .collect();

    let results: Vec<bool> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(
        results,
        vec![true, false, true, false, true, false, true, false]
    );
}

#[test]
fn test_batch_matches_single_validation() {
    let registry = SchemaRegistry::from_str_yaml(INVOICE_YAML).unwrap();
    let docs: Vec<Value> = (0..20)
        .map(|i| {
            let mut doc = valid_invoice();
            doc["invoice_currency"] = json!(if i % 4 == 0 { "XXX" } else { "USD" });
            doc
        })
        .collect();

    let batch = registry.validate_batch("invoice", &docs).unwrap();
    for (doc, outcome) in docs.iter().zip(&batch) {
        assert_eq!(outcome, &registry.validate("invoice", doc, "").unwrap());
    }
    assert_eq!(batch.iter().filter(|o| !o.is_valid).count(), 5);

    assert!(matches!(
        registry.validate_batch("missing", &docs),
        Err(RegistryError::UnknownSchema(_))
    ));
}
