//! End-to-end tests over the public API: bootstrap an extension against a
//! scripted connection, then exercise field resolution, host broadcasts and
//! request shaping the way an embedded extension would.

use std::sync::Arc;

use serde_json::{json, Value};

use extkit_sdk::testing::ScriptedConnection;
use extkit_sdk::{
    initialize, Connection, DataType, Error, Extension, ExtensionType, FieldSchema, InitPayload,
};

fn bootstrap() -> InitPayload {
    serde_json::from_value(json!({
        "config": {},
        "user": { "uid": "u1" },
        "type": "FIELD",
        "uid": "title",
        "schema": { "uid": "title", "data_type": "single_line" },
        "value": "Hello",
        "locale": "en-us",
        "entry": {
            "title": "Hello",
            "g": [ { "s": "a" }, { "s": "b" } ],
            "mb": [ { "banner": { "banner_image": { "uid": "f1" } } } ],
            "meta": { "tags": "x" }
        },
        "content_type": {
            "uid": "blog",
            "schema": [
                { "uid": "title", "data_type": "single_line" },
                { "uid": "g", "data_type": "group", "multiple": true, "schema": [
                    { "uid": "s", "data_type": "single_line" }
                ]},
                { "uid": "mb", "data_type": "blocks", "multiple": true, "blocks": [
                    { "uid": "banner", "title": "Banner", "schema": [
                        { "uid": "banner_image", "data_type": "file" }
                    ]}
                ]},
                { "uid": "meta", "data_type": "group", "schema": [
                    { "uid": "tags", "data_type": "single_line" }
                ]}
            ]
        },
        "stack": { "api_key": "k" }
    }))
    .unwrap()
}

fn extension() -> (Extension, Arc<ScriptedConnection>) {
    let connection = Arc::new(ScriptedConnection::new());
    let extension = Extension::new(
        bootstrap(),
        connection.clone() as Arc<dyn Connection>,
        None,
    )
    .unwrap();
    (extension, connection)
}

#[tokio::test]
async fn full_handshake_builds_a_field_extension() {
    let connection = Arc::new(ScriptedConnection::new());
    connection.push_response(json!({
        "type": "FIELD",
        "uid": "title",
        "schema": { "uid": "title", "data_type": "single_line" },
        "value": "Hello",
        "entry": { "title": "Hello" },
        "locale": "en-us",
        "content_type": {
            "uid": "blog",
            "schema": [{ "uid": "title", "data_type": "single_line" }]
        },
        "stack": {}
    }));

    let init = initialize(connection.as_ref(), Some("1.1.0")).await.unwrap();
    assert_eq!(connection.last_sent().unwrap().0, "init");

    let extension =
        Extension::new(init, connection.clone() as Arc<dyn Connection>, None).unwrap();
    assert_eq!(extension.extension_type(), ExtensionType::Field);
    assert_eq!(extension.field().unwrap().get_data(), json!("Hello"));

    extension.set_ready().await.unwrap();
    assert_eq!(connection.last_sent().unwrap().0, "ready");
}

#[test]
fn plain_field_resolves_value_and_schema() {
    let (extension, _connection) = extension();
    let field = extension.entry().get_field("title").unwrap();
    assert_eq!(field.get_data(), json!("Hello"));
    assert_eq!(field.data_type(), DataType::SingleLine);
}

#[test]
fn indexed_group_member_resolves() {
    let (extension, _connection) = extension();
    let field = extension.entry().get_field("g.1.s").unwrap();
    assert_eq!(field.get_data(), json!("b"));
}

#[test]
fn block_instance_and_block_member_resolve() {
    let (extension, _connection) = extension();

    let instance = extension.entry().get_field("mb.0").unwrap();
    match instance.schema() {
        FieldSchema::Block(block) => assert_eq!(block.uid, "banner"),
        other => panic!("expected block schema, got {:?}", other),
    }
    assert_eq!(
        instance.get_data(),
        json!({ "banner": { "banner_image": { "uid": "f1" } } })
    );

    let image = extension.entry().get_field("mb.0.banner.banner_image").unwrap();
    assert_eq!(image.get_data(), json!({ "uid": "f1" }));
    assert_eq!(image.data_type(), DataType::File);
}

#[test]
fn unknown_uid_fails_with_the_canonical_message() {
    let (extension, _connection) = extension();
    let err = extension.entry().get_field("nonexistent").unwrap_err();
    assert_eq!(err.to_string(), "Invalid uid, Field not found");
}

#[test]
fn truncated_multiple_group_path_fails() {
    let (extension, _connection) = extension();
    assert!(extension.entry().get_field("g.1").is_err());
}

#[test]
fn save_broadcast_refreshes_a_live_field_handle() {
    let (extension, connection) = extension();
    let field = extension.entry().get_field("title").unwrap();
    assert_eq!(field.get_data(), json!("Hello"));

    connection.dispatch_event(
        "entrySave",
        json!({
            "title": "Updated",
            "g": [],
            "mb": [],
            "meta": {}
        }),
    );

    assert_eq!(field.get_data(), json!("Updated"));
    assert_eq!(extension.entry().get_data()["title"], json!("Updated"));
}

#[tokio::test]
async fn set_data_on_a_group_field_is_refused() {
    let (extension, connection) = extension();
    let field = extension.entry().get_field("meta").unwrap();

    let err = field.set_data(json!({ "tags": "y" })).await.unwrap_err();
    assert_eq!(err.to_string(), "Cannot call set data for current field type");
    assert!(matches!(err, Error::UnsupportedFieldType));
    assert!(connection.sent().is_empty());
}

#[tokio::test]
async fn self_field_write_carries_the_self_flag() {
    let (extension, connection) = extension();
    extension
        .field()
        .unwrap()
        .set_data(json!("typed"))
        .await
        .unwrap();

    let (action, payload) = connection.last_sent().unwrap();
    assert_eq!(action, "setData");
    assert_eq!(
        payload,
        json!({ "data": "typed", "uid": "title", "self": true })
    );
}

#[tokio::test]
async fn entry_query_serializes_the_full_wire_shape() {
    let (extension, connection) = extension();
    connection.push_response(json!({ "entries": [] }));

    extension
        .stack()
        .content_type("newblog")
        .unwrap()
        .query()
        .query(json!({ "l": "c" }))
        .unwrap()
        .tags(&["k"])
        .include_count()
        .equal_to("x2", "y")
        .regex("k1", "v", Some(json!({})))
        .search("search")
        .less_than("k2", "v")
        .greater_than("k4", "v")
        .not_equal_to("k6", "v")
        .contained_in("k7", vec![json!("v")])
        .exists("k8")
        .ascending("k9")
        .descending("k10")
        .skip(100)
        .limit(100)
        .find()
        .await
        .unwrap();

    let (action, options) = connection.last_sent().unwrap();
    assert_eq!(action, "stackQuery");
    assert_eq!(
        options,
        json!({
            "content_type_uid": "newblog",
            "params": {
                "query": {
                    "l": "c",
                    "x2": "y",
                    "k1": { "$regex": "v", "$options": {} },
                    "k2": { "$lt": "v" },
                    "k4": { "$gt": "v" },
                    "k6": { "$ne": "v" },
                    "k7": { "$in": ["v"] },
                    "k8": { "$exists": true },
                },
                "tags": ["k"],
                "include_count": true,
                "typeahead": "search",
                "asc": "k9",
                "desc": "k10",
                "skip": 100,
                "limit": 100,
            },
            "action": "getEntries",
        })
    );
}

#[tokio::test]
async fn domain_failures_carry_the_host_message() {
    let (extension, connection) = extension();
    connection.push_response(json!("uid is required"));

    let err = extension
        .stack()
        .get_content_type("blog", Value::Null)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Host(message) if message == "uid is required"));
}

#[tokio::test]
async fn store_round_trip_shapes_requests() {
    let (extension, connection) = extension();

    connection.push_response(Value::Null);
    extension.store().set("k", json!("v")).await.unwrap();
    assert_eq!(
        connection.last_sent().unwrap().1,
        json!({ "action": "set", "key": "k", "value": "v" })
    );

    connection.push_response(json!("v"));
    let value = extension.store().get("k").await.unwrap();
    assert_eq!(value, json!("v"));
}

#[tokio::test]
async fn window_height_updates_are_deduplicated() {
    let (extension, connection) = extension();

    extension.window().update_height(120).await.unwrap();
    extension.window().update_height(120).await.unwrap();
    extension.window().update_height(180).await.unwrap();

    let resizes: Vec<_> = connection
        .sent()
        .into_iter()
        .filter(|(action, _)| action == "resize")
        .collect();
    assert_eq!(
        resizes,
        vec![
            ("resize".to_string(), json!(120)),
            ("resize".to_string(), json!(180)),
        ]
    );
}
