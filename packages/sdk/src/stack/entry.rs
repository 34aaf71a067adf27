//! Request builder for one entry of a content type.

use std::sync::Arc;

use serde_json::{json, Map, Value};

use crate::stack::stack_query;
use crate::{Connection, Error};

/// CRUD-style request builder for one entry, addressed by uid inside its
/// content type.
///
/// Builder methods accumulate request params and consume/return the
/// resource; terminal methods shape a `stackQuery` options object and send
/// it. Payload validation happens before anything reaches the wire.
pub struct EntryResource {
    uid: String,
    content_type_uid: String,
    params: Map<String, Value>,
    connection: Arc<dyn Connection>,
}

impl EntryResource {
    pub(crate) fn new(uid: String, content_type_uid: String, connection: Arc<dyn Connection>) -> Self {
        Self {
            uid,
            content_type_uid,
            params: Map::new(),
            connection,
        }
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    /// Restrict result fields. `reference` is a reference field uid, or
    /// `"BASE"` for the entry itself.
    pub fn only(self, reference: &str, fields: &[&str]) -> Self {
        self.projection("only", reference, fields)
    }

    /// Exclude result fields; same addressing as [`only`](Self::only).
    pub fn except(self, reference: &str, fields: &[&str]) -> Self {
        self.projection("except", reference, fields)
    }

    /// Include referenced entries from other content types.
    pub fn include_reference(mut self, references: &[&str]) -> Self {
        let slot = self
            .params
            .entry("include".to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(list) = slot {
            list.extend(references.iter().map(|reference| json!(reference)));
        }
        self
    }

    /// Which locale's data to retrieve, e.g. `en-us`.
    pub fn language(mut self, language_code: &str) -> Result<Self, Error> {
        if language_code.is_empty() {
            return Err(Error::invalid_argument("Argument should be a String."));
        }
        self.params.insert("locale".to_string(), json!(language_code));
        Ok(self)
    }

    /// Which environment's data to retrieve.
    pub fn environment(mut self, environment: &str) -> Result<Self, Error> {
        if environment.is_empty() {
            return Err(Error::invalid_argument("Argument should be a String."));
        }
        self.params.insert("environment".to_string(), json!(environment));
        Ok(self)
    }

    pub fn include_schema(mut self) -> Self {
        self.params.insert("include_schema".to_string(), json!(true));
        self
    }

    pub fn include_content_type(mut self) -> Self {
        self.params
            .insert("include_content_type".to_string(), json!(true));
        self
    }

    pub fn include_owner(mut self) -> Self {
        self.params.insert("include_owner".to_string(), json!(true));
        self
    }

    /// Arbitrary extra request parameter.
    pub fn add_param(mut self, key: &str, value: impl Into<Value>) -> Result<Self, Error> {
        if key.is_empty() {
            return Err(Error::invalid_parameters());
        }
        self.params.insert(key.to_string(), value.into());
        Ok(self)
    }

    /// Alias kept for symmetry with the query builder.
    pub fn add_query(self, key: &str, value: impl Into<Value>) -> Result<Self, Error> {
        self.add_param(key, value)
    }

    /// Fetch the entry.
    pub async fn fetch(self) -> Result<Value, Error> {
        self.request("getEntry", None).await
    }

    /// Update the entry's content, optionally localizing into `locale`.
    pub async fn update(mut self, payload: Value, locale: Option<&str>) -> Result<Value, Error> {
        if !payload.is_object() {
            return Err(Error::invalid_parameters());
        }
        if let Some(locale) = locale {
            self.params.insert("locale".to_string(), json!(locale));
        }
        self.request("updateEntry", Some(payload)).await
    }

    /// Delete the entry.
    pub async fn delete(self) -> Result<Value, Error> {
        self.request("deleteEntry", None).await
    }

    /// Publish immediately or on the schedule carried in the payload.
    pub async fn publish(mut self, payload: Value) -> Result<Value, Error> {
        if !payload.is_object() {
            return Err(Error::invalid_parameters());
        }
        // Publish requests carry no accumulated params.
        self.params.clear();
        self.request("publishEntry", Some(payload)).await
    }

    /// Unpublish immediately or on the schedule carried in the payload.
    pub async fn unpublish(mut self, payload: Value) -> Result<Value, Error> {
        if !payload.is_object() {
            return Err(Error::invalid_parameters());
        }
        self.params.clear();
        self.request("unpublishEntry", Some(payload)).await
    }

    /// Set or update the entry's workflow stage.
    pub async fn set_workflow_stage(self, payload: Value) -> Result<Value, Error> {
        if !payload.is_object() {
            return Err(Error::invalid_parameters());
        }
        self.request("setWorkflowStageEntry", Some(payload)).await
    }

    /// All languages this entry is localized in.
    pub async fn get_languages(self) -> Result<Value, Error> {
        self.request("getEntryLanguages", None).await
    }

    /// Unlocalize the entry in the given locale.
    pub async fn unlocalize(mut self, locale: &str) -> Result<Value, Error> {
        if locale.is_empty() {
            return Err(Error::invalid_parameters());
        }
        self.params.insert("locale".to_string(), json!(locale));
        self.request("unlocalizeEntry", None).await
    }

    fn projection(mut self, mode: &str, reference: &str, fields: &[&str]) -> Self {
        let slot = self
            .params
            .entry(mode.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(map) = slot {
            let list = map
                .entry(reference.to_string())
                .or_insert_with(|| Value::Array(Vec::new()));
            if let Value::Array(list) = list {
                list.extend(fields.iter().map(|field| json!(field)));
            }
        }
        self
    }

    async fn request(self, action: &str, payload: Option<Value>) -> Result<Value, Error> {
        let mut options = Map::new();
        if let Some(payload) = payload {
            options.insert("payload".to_string(), payload);
        }
        options.insert(
            "content_type_uid".to_string(),
            json!(self.content_type_uid),
        );
        options.insert("uid".to_string(), json!(self.uid));
        options.insert("params".to_string(), Value::Object(self.params));
        options.insert("action".to_string(), json!(action));
        stack_query(self.connection.as_ref(), Value::Object(options)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedConnection;

    fn resource() -> (EntryResource, Arc<ScriptedConnection>) {
        let connection = Arc::new(ScriptedConnection::new());
        let resource = EntryResource::new(
            "bltasssss".to_string(),
            "blog".to_string(),
            connection.clone() as Arc<dyn Connection>,
        );
        (resource, connection)
    }

    #[tokio::test]
    async fn fetch_carries_accumulated_params() {
        let (resource, connection) = resource();
        connection.push_response(json!({ "entry": {} }));

        resource
            .language("en_us")
            .unwrap()
            .include_reference(&["r1", "r2"])
            .add_query("key", "value")
            .unwrap()
            .add_param("k", "v")
            .unwrap()
            .include_schema()
            .include_content_type()
            .include_owner()
            .fetch()
            .await
            .unwrap();

        let (action, options) = connection.last_sent().unwrap();
        assert_eq!(action, "stackQuery");
        assert_eq!(
            options,
            json!({
                "uid": "bltasssss",
                "content_type_uid": "blog",
                "params": {
                    "locale": "en_us",
                    "include": ["r1", "r2"],
                    "key": "value",
                    "k": "v",
                    "include_schema": true,
                    "include_content_type": true,
                    "include_owner": true,
                },
                "action": "getEntry",
            })
        );
    }

    #[tokio::test]
    async fn projections_accumulate_per_reference() {
        let (resource, connection) = resource();
        connection.push_response(json!({ "entry": {} }));

        resource
            .only("BASE", &["title", "details"])
            .except("category", &["secret"])
            .fetch()
            .await
            .unwrap();

        let (_, options) = connection.last_sent().unwrap();
        assert_eq!(options["params"]["only"], json!({ "BASE": ["title", "details"] }));
        assert_eq!(options["params"]["except"], json!({ "category": ["secret"] }));
    }

    #[tokio::test]
    async fn update_localizes_when_asked() {
        let (resource, connection) = resource();
        connection.push_response(json!({ "entry": {} }));

        resource
            .update(json!({ "entry": { "title": "x" } }), Some("fr-fr"))
            .await
            .unwrap();

        let (_, options) = connection.last_sent().unwrap();
        assert_eq!(options["action"], json!("updateEntry"));
        assert_eq!(options["payload"], json!({ "entry": { "title": "x" } }));
        assert_eq!(options["params"]["locale"], json!("fr-fr"));
    }

    #[tokio::test]
    async fn publish_clears_params_and_validates_payload() {
        let (resource, connection) = resource();
        let err = resource.publish(json!([])).await.unwrap_err();
        assert_eq!(err.to_string(), "Kindly provide valid parameters");
        assert!(connection.sent().is_empty());

        let (resource, connection) = self::resource();
        connection.push_response(json!({ "notice": "ok" }));
        resource
            .language("en-us")
            .unwrap()
            .publish(json!({ "entry": { "locales": ["en-us"] } }))
            .await
            .unwrap();
        let (_, options) = connection.last_sent().unwrap();
        assert_eq!(options["action"], json!("publishEntry"));
        assert_eq!(options["params"], json!({}));
    }

    #[tokio::test]
    async fn unlocalize_sends_locale_param() {
        let (resource, connection) = resource();
        connection.push_response(json!({ "entry": {} }));

        resource.unlocalize("fr-fr").await.unwrap();

        let (_, options) = connection.last_sent().unwrap();
        assert_eq!(options["action"], json!("unlocalizeEntry"));
        assert_eq!(options["params"]["locale"], json!("fr-fr"));
    }

    #[tokio::test]
    async fn get_languages_and_delete_use_their_actions() {
        let (resource, connection) = resource();
        connection.push_response(json!({ "locales": [] }));
        resource.get_languages().await.unwrap();
        assert_eq!(
            connection.last_sent().unwrap().1["action"],
            json!("getEntryLanguages")
        );

        let (resource, connection) = self::resource();
        connection.push_response(json!({ "notice": "deleted" }));
        resource.delete().await.unwrap();
        assert_eq!(
            connection.last_sent().unwrap().1["action"],
            json!("deleteEntry")
        );
    }

    #[tokio::test]
    async fn set_workflow_stage_validates_payload() {
        let (resource, _connection) = resource();
        assert!(resource
            .set_workflow_stage(json!("nope"))
            .await
            .is_err());
    }

    #[test]
    fn language_rejects_empty_code() {
        let (resource, _connection) = resource();
        assert!(resource.language("").is_err());
    }
}
