#![cfg(feature = "serde_json")]

use dotschema::json::validate_json_str;
use dotschema::{validator, Overrides, Schema, Value};
use serde::{Deserialize, Serialize};
use serde_json::json;

fn messages(schema: &str, json: &str) -> Vec<String> {
    validate_json_str(schema, json)
        .unwrap()
        .into_iter()
        .map(|m| m.message)
        .collect()
}

#[test]
fn validate_json_types() {
    let schema = r#"{ "thing": "string" }"#;
    assert!(messages(schema, r#"{ "thing": "x" }"#).is_empty());
    assert!(messages(schema, r#"{ "thing": null }"#).is_empty());
    assert!(messages(schema, r#"{}"#).is_empty());
    assert_eq!(
        messages(schema, r#"{ "thing": 1 }"#),
        vec!["thing must be of type string."]
    );

    let schema = r#"{ "thing": "number" }"#;
    assert!(messages(schema, r#"{ "thing": 1 }"#).is_empty());
    assert!(messages(schema, r#"{ "thing": 1.5e300 }"#).is_empty());
    assert_eq!(messages(schema, r#"{ "thing": true }"#).len(), 1);

    let schema = r#"{ "thing": "boolean" }"#;
    assert!(messages(schema, r#"{ "thing": false }"#).is_empty());
    assert_eq!(messages(schema, r#"{ "thing": "false" }"#).len(), 1);

    let schema = r#"{ "thing": "object" }"#;
    assert!(messages(schema, r#"{ "thing": {} }"#).is_empty());
    assert_eq!(messages(schema, r#"{ "thing": [] }"#).len(), 1);

    let schema = r#"{ "thing": [] }"#;
    assert!(messages(schema, r#"{ "thing": [1, "a"] }"#).is_empty());
    assert_eq!(messages(schema, r#"{ "thing": {} }"#).len(), 1);
}

#[test]
fn validate_json_rules() {
    let schema = r#"{
        "name": { "type": "string", "required": true, "length": { "min": 2, "max": 5 } },
        "age": { "type": "number", "size": { "min": 0, "max": 150 } },
        "role": { "enum": ["admin", "user"] },
        "code": { "match": "^[A-Z]{3}$" },
        "tags": { "type": "array", "nonempty": true, "each": "string" }
    }"#;
    assert!(messages(
        schema,
        r#"{ "name": "Ann", "age": 40, "role": "user", "code": "ABC", "tags": ["x"] }"#
    )
    .is_empty());

    assert_eq!(
        messages(
            schema,
            r#"{ "name": "A", "age": 200, "role": "root", "code": "abc", "tags": [] }"#
        ),
        vec![
            "name must have a length between 2 and 5.",
            "age must be between 0 and 150.",
            "role must be either admin or user.",
            "code must match /^[A-Z]{3}$/.",
            "tags must not be empty.",
        ]
    );
}

#[test]
fn validate_json_messages() {
    let schema = r#"{
        "name": {
            "type": "string",
            "required": true,
            "message": { "required": "who are you?" }
        },
        "age": { "type": "number", "message": "age is weird" }
    }"#;
    assert_eq!(
        messages(schema, r#"{ "age": "x" }"#),
        vec!["who are you?", "age is weird"]
    );
}

#[test]
fn validate_json_declaration_order() {
    let schema = r#"{ "name": { "required": true }, "age": { "required": true } }"#;
    let errors = validate_json_str(schema, "{}").unwrap();
    let paths: Vec<&str> = errors.iter().map(|e| e.path.as_str()).collect();
    assert_eq!(paths, vec!["name", "age"]);

    // Rules run in the order they are written, after required and type.
    let schema = r#"{
        "code": { "length": { "max": 2 }, "type": "string", "match": "^[0-9]+$" }
    }"#;
    assert_eq!(
        messages(schema, r#"{ "code": "abc" }"#),
        vec!["code must have a maximum length of 2."]
    );
    let schema = r#"{
        "code": { "type": "string", "match": "^[0-9]+$", "length": { "max": 2 } }
    }"#;
    assert_eq!(
        messages(schema, r#"{ "code": "abc" }"#),
        vec!["code must match /^[0-9]+$/."]
    );
}

#[test]
fn validate_json_nested() {
    let schema = r#"{
        "author": {
            "name": { "type": "string", "required": true },
            "posts": [{ "title": { "type": "string", "required": true } }]
        }
    }"#;
    let errors = validate_json_str(
        schema,
        r#"{ "author": { "name": "Ann", "posts": [{ "title": "a" }, {}] } }"#,
    )
    .unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].path, "author.posts.1.title");

    let errors = validate_json_str(schema, r#"{ "author": { "posts": "none" } }"#).unwrap();
    let paths: Vec<&str> = errors.iter().map(|e| e.path.as_str()).collect();
    assert_eq!(paths, vec!["author.name", "author.posts"]);
}

#[test]
fn validate_json_tuple() {
    let schema = r#"{ "pair": ["string", "number"] }"#;
    assert!(messages(schema, r#"{ "pair": ["a", 1] }"#).is_empty());
    assert_eq!(
        messages(schema, r#"{ "pair": [1, "a"] }"#),
        vec!["pair.0 must be of type string.", "pair.1 must be of type number."]
    );
}

#[test]
fn custom_validator_key() {
    let mut schema = Schema::new();
    schema.validator(
        "even",
        validator(|v, _, arg| {
            let want = !matches!(arg, dotschema::Arg::Value(Value::Bool(false)));
            v.and_then(Value::as_f64).map_or(true, |n| (n % 2.0 == 0.0) == want)
        }),
    );
    schema.message("even", "must be even");
    schema
        .extend_json(&json!({ "count": { "type": "number", "even": true } }))
        .unwrap();

    let mut data = json!({ "count": 3 });
    let errors = schema.validate_json(&mut data).unwrap();
    assert_eq!(errors[0].message, "must be even");

    // An unknown key makes an object a nested definition.
    let schema = Schema::from_json(&json!({ "count": { "odd": "boolean" } })).unwrap();
    assert!(schema.property("count.odd").is_some());
}

#[test]
fn validate_json_writes_back() {
    let schema = Schema::from_json_str(r#"{ "age": "number", "when": "date" }"#).unwrap();
    let mut data = json!({ "age": "42", "when": "2020-01-02", "extra": 1 });
    let overrides = Overrides {
        typecast: Some(true),
        strip: None,
    };
    assert!(schema.validate_json_with(&mut data, &overrides).unwrap().is_empty());
    assert_eq!(
        data,
        json!({ "age": 42, "when": "2020-01-02T00:00:00.000Z" })
    );
}

#[test]
fn write_back_keeps_large_integers() {
    let schema = Schema::from_json_str(r#"{ "id": "number" }"#).unwrap();
    let mut data: serde_json::Value =
        serde_json::from_str(r#"{ "id": 9007199254740993, "extra": 1 }"#).unwrap();
    assert!(schema.validate_json(&mut data).unwrap().is_empty());
    assert_eq!(data, json!({ "id": 9_007_199_254_740_993_u64 }));
    assert_eq!(data.to_string(), r#"{"id":9007199254740993}"#);

    let mut data = json!({ "id": -9_223_372_036_854_775_807_i64, "ratio": 0.1 });
    schema.validate_json(&mut data).unwrap();
    assert_eq!(data, json!({ "id": -9_223_372_036_854_775_807_i64 }));
}

#[test]
fn write_back_rejects_non_finite_casts() {
    let schema = Schema::from_json_str(r#"{ "age": "number" }"#).unwrap();
    let cast = Overrides {
        typecast: Some(true),
        strip: None,
    };
    let mut data = json!({ "age": "NaN" });
    let errors = schema.validate_json_with(&mut data, &cast).unwrap();
    assert_eq!(errors[0].message, "age must be of type number.");
    assert_eq!(data, json!({ "age": "NaN" }));

    let mut data = json!({ "age": " 17 " });
    assert!(schema.validate_json_with(&mut data, &cast).unwrap().is_empty());
    assert_eq!(data, json!({ "age": 17 }));
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Person {
    name: String,
    age: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    nickname: Option<String>,
}

#[test]
fn validate_serde_struct() {
    let schema = Schema::from_json_str(
        r#"{
            "name": { "type": "string", "required": true },
            "age": { "type": "number", "size": { "max": 130 } }
        }"#,
    )
    .unwrap();

    let bob = Person {
        name: "Bob".into(),
        age: 43,
        nickname: Some("Bobby".into()),
    };
    let checked = schema.assert_json(serde_json::to_value(&bob).unwrap()).unwrap();
    let stripped: Person = serde_json::from_value(checked).unwrap();
    assert_eq!(
        stripped,
        Person {
            name: "Bob".into(),
            age: 43,
            nickname: None
        }
    );

    let old = Person {
        name: "Old".into(),
        age: 200,
        nickname: None,
    };
    let err = schema
        .assert_json(serde_json::to_value(&old).unwrap())
        .unwrap_err();
    assert_eq!(format!("{}", err), "age must be at most 130.");
}
