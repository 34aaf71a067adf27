//! Stack-level resource access.
//!
//! Every call here is a shaped `stackQuery` request: an options object
//! carrying some subset of `{uid, name, code, content_type_uid, params,
//! payload}` plus an `action` string the host interprets. The SDK's
//! contract is only to shape these options correctly and to apply the
//! shared response-envelope rule.

mod asset;
mod content_type;
mod entry;
mod query;

pub use asset::AssetResource;
pub use content_type::ContentTypeHandle;
pub use entry::EntryResource;
pub use query::{Query, QueryModule};

use std::sync::Arc;

use serde_json::{json, Map, Value};

use crate::{unwrap_response, Connection, Error};

/// Send a shaped options object on the `stackQuery` action and unwrap the
/// response envelope.
pub(crate) async fn stack_query(
    connection: &dyn Connection,
    options: Value,
) -> Result<Value, Error> {
    let response = connection.send_to_parent("stackQuery", options).await?;
    unwrap_response(response)
}

/// Normalize an optional params object: `Null` becomes `{}` so the wire
/// shape always carries a `params` key.
pub(crate) fn params_or_default(params: Value) -> Value {
    match params {
        Value::Null => Value::Object(Map::new()),
        other => other,
    }
}

/// Fold a query object into a params object under the `query` key.
fn params_with_query(query: Value, params: Value) -> Value {
    let mut params = match params_or_default(params) {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    params.insert(
        "query".to_string(),
        match query {
            Value::Null => Value::Object(Map::new()),
            other => other,
        },
    );
    Value::Object(params)
}

/// Handle to the stack the extension is installed in.
///
/// Carries the stack metadata from the bootstrap payload and acts as the
/// factory for content-type, entry, asset and query resources.
pub struct Stack {
    data: Value,
    connection: Arc<dyn Connection>,
}

impl Stack {
    pub(crate) fn new(data: Value, connection: Arc<dyn Connection>) -> Self {
        Self { data, connection }
    }

    /// The stack metadata the host sent at bootstrap (api key, name, ...).
    pub fn get_data(&self) -> &Value {
        &self.data
    }

    /// Scoped handle for one content type.
    pub fn content_type(&self, uid: &str) -> Result<ContentTypeHandle, Error> {
        if uid.is_empty() {
            return Err(Error::invalid_argument("uid is required"));
        }
        Ok(ContentTypeHandle::new(
            uid.to_string(),
            Arc::clone(&self.connection),
        ))
    }

    /// Handle for one asset.
    pub fn asset(&self, uid: &str) -> Result<AssetResource, Error> {
        if uid.is_empty() {
            return Err(Error::invalid_argument("uid is required"));
        }
        Ok(AssetResource::new(
            uid.to_string(),
            Arc::clone(&self.connection),
        ))
    }

    /// Query over the asset collection.
    pub fn asset_query(&self) -> Query {
        Query::new(Arc::clone(&self.connection), QueryModule::Assets, None)
    }

    pub async fn get_content_type(&self, uid: &str, params: Value) -> Result<Value, Error> {
        if uid.is_empty() {
            return Err(Error::invalid_argument("uid is required"));
        }
        let options = json!({
            "uid": uid,
            "params": params_or_default(params),
            "action": "getContentType",
        });
        stack_query(self.connection.as_ref(), options).await
    }

    pub async fn get_content_types(&self, query: Value, params: Value) -> Result<Value, Error> {
        let options = json!({
            "params": params_with_query(query, params),
            "action": "getContentTypes",
        });
        stack_query(self.connection.as_ref(), options).await
    }

    pub async fn get_environment(&self, name: &str, params: Value) -> Result<Value, Error> {
        if name.is_empty() {
            return Err(Error::invalid_argument("name is required"));
        }
        let options = json!({
            "name": name,
            "params": params_or_default(params),
            "action": "getEnvironment",
        });
        stack_query(self.connection.as_ref(), options).await
    }

    pub async fn get_environments(&self, query: Value, params: Value) -> Result<Value, Error> {
        let options = json!({
            "params": params_with_query(query, params),
            "action": "getEnvironments",
        });
        stack_query(self.connection.as_ref(), options).await
    }

    pub async fn get_locale(&self, code: &str, params: Value) -> Result<Value, Error> {
        if code.is_empty() {
            return Err(Error::invalid_argument("code is required"));
        }
        let options = json!({
            "code": code,
            "params": params_or_default(params),
            "action": "getLocale",
        });
        stack_query(self.connection.as_ref(), options).await
    }

    pub async fn get_locales(&self, query: Value, params: Value) -> Result<Value, Error> {
        let options = json!({
            "params": params_with_query(query, params),
            "action": "getLocales",
        });
        stack_query(self.connection.as_ref(), options).await
    }

    /// Create a new asset from the given payload.
    pub async fn create_asset(&self, payload: Value) -> Result<Value, Error> {
        if !payload.is_object() {
            return Err(Error::invalid_parameters());
        }
        let options = json!({
            "payload": payload,
            "action": "createAsset",
        });
        stack_query(self.connection.as_ref(), options).await
    }

    /// All assets uploaded through rich-text-editor fields.
    pub async fn get_rte_assets(&self) -> Result<Value, Error> {
        stack_query(
            self.connection.as_ref(),
            json!({ "action": "getRteAssets" }),
        )
        .await
    }

    /// Assets filtered by MIME type, e.g. `image/png`.
    pub async fn get_assets_of_specific_types(&self, asset_type: &str) -> Result<Value, Error> {
        if asset_type.is_empty() {
            return Err(Error::invalid_parameters());
        }
        let options = json!({
            "action": "getAssetsOfSpecificTypes",
            "asset_type": asset_type,
        });
        stack_query(self.connection.as_ref(), options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedConnection;

    fn stack() -> (Stack, Arc<ScriptedConnection>) {
        let connection = Arc::new(ScriptedConnection::new());
        let stack = Stack::new(
            json!({ "api_key": "k" }),
            connection.clone() as Arc<dyn Connection>,
        );
        (stack, connection)
    }

    #[tokio::test]
    async fn get_content_type_shapes_options() {
        let (stack, connection) = stack();
        connection.push_response(json!({ "content_type": {} }));

        stack
            .get_content_type("blog", json!({ "k": "v" }))
            .await
            .unwrap();

        let (action, options) = connection.last_sent().unwrap();
        assert_eq!(action, "stackQuery");
        assert_eq!(
            options,
            json!({ "uid": "blog", "params": { "k": "v" }, "action": "getContentType" })
        );
    }

    #[tokio::test]
    async fn get_content_type_requires_uid() {
        let (stack, connection) = stack();
        let err = stack.get_content_type("", Value::Null).await.unwrap_err();
        assert_eq!(err.to_string(), "uid is required");
        assert!(connection.sent().is_empty());
    }

    #[tokio::test]
    async fn plural_calls_fold_query_into_params() {
        let (stack, connection) = stack();
        connection.push_response(json!({ "content_types": [] }));

        stack
            .get_content_types(json!({ "title": "Blog" }), Value::Null)
            .await
            .unwrap();

        let (_, options) = connection.last_sent().unwrap();
        assert_eq!(
            options,
            json!({
                "params": { "query": { "title": "Blog" } },
                "action": "getContentTypes",
            })
        );
    }

    #[tokio::test]
    async fn environment_and_locale_use_name_and_code_keys() {
        let (stack, connection) = stack();
        connection.push_response(json!({}));
        stack.get_environment("dev", Value::Null).await.unwrap();
        let (_, options) = connection.last_sent().unwrap();
        assert_eq!(
            options,
            json!({ "name": "dev", "params": {}, "action": "getEnvironment" })
        );

        connection.push_response(json!({}));
        stack.get_locale("en-us", Value::Null).await.unwrap();
        let (_, options) = connection.last_sent().unwrap();
        assert_eq!(
            options,
            json!({ "code": "en-us", "params": {}, "action": "getLocale" })
        );
    }

    #[tokio::test]
    async fn string_envelope_is_a_domain_failure() {
        let (stack, connection) = stack();
        connection.push_response(json!("uid is required"));

        let err = stack
            .get_content_type("blog", Value::Null)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Host(message) if message == "uid is required"));
    }

    #[tokio::test]
    async fn rte_assets_is_a_bare_action() {
        let (stack, connection) = stack();
        connection.push_response(json!({ "assets": [] }));

        stack.get_rte_assets().await.unwrap();
        let (_, options) = connection.last_sent().unwrap();
        assert_eq!(options, json!({ "action": "getRteAssets" }));
    }

    #[tokio::test]
    async fn assets_of_specific_types_validates_type() {
        let (stack, connection) = stack();
        let err = stack.get_assets_of_specific_types("").await.unwrap_err();
        assert_eq!(err.to_string(), "Kindly provide valid parameters");

        connection.push_response(json!({ "assets": [] }));
        stack
            .get_assets_of_specific_types("image/png")
            .await
            .unwrap();
        let (_, options) = connection.last_sent().unwrap();
        assert_eq!(
            options,
            json!({ "action": "getAssetsOfSpecificTypes", "asset_type": "image/png" })
        );
    }

    #[tokio::test]
    async fn create_asset_validates_and_shapes_payload() {
        let (stack, connection) = stack();
        assert!(stack.create_asset(json!("nope")).await.is_err());
        assert!(connection.sent().is_empty());

        connection.push_response(json!({ "asset": { "uid": "a1" } }));
        stack
            .create_asset(json!({ "asset": { "title": "logo.png" } }))
            .await
            .unwrap();
        let (_, options) = connection.last_sent().unwrap();
        assert_eq!(
            options,
            json!({
                "payload": { "asset": { "title": "logo.png" } },
                "action": "createAsset",
            })
        );
    }

    #[test]
    fn factories_require_a_uid() {
        let (stack, _connection) = stack();
        assert!(stack.content_type("").is_err());
        assert!(stack.asset("").is_err());
        assert!(stack.content_type("blog").is_ok());
        assert!(stack.asset("a1").is_ok());
    }
}
