//! Fluent query accumulator for entry and asset collections.

use std::fmt;
use std::sync::Arc;

use serde_json::{json, Map, Value};

use crate::stack::stack_query;
use crate::{Connection, Error};

/// Which collection a [`Query`] runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryModule {
    Entries,
    Assets,
}

impl QueryModule {
    fn action(self) -> &'static str {
        match self {
            QueryModule::Entries => "getEntries",
            QueryModule::Assets => "getAssets",
        }
    }
}

/// Accumulates predicates and options, then serializes them into one
/// `stackQuery` request.
///
/// Predicates land in the `query` object using the host's Mongo-style
/// operator vocabulary (`$lt`, `$in`, `$regex`, `$and`, ...); options land
/// as sibling keys of `query` inside `params`. Builder methods consume and
/// return the query, so chains read naturally; methods that validate their
/// argument return `Result` and fail before anything is sent.
pub struct Query {
    connection: Arc<dyn Connection>,
    module: QueryModule,
    content_type_uid: Option<String>,
    query: Map<String, Value>,
    params: Map<String, Value>,
}

impl fmt::Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("module", &self.module)
            .field("content_type_uid", &self.content_type_uid)
            .field("query", &self.query)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl Query {
    pub(crate) fn new(
        connection: Arc<dyn Connection>,
        module: QueryModule,
        content_type_uid: Option<String>,
    ) -> Self {
        Self {
            connection,
            module,
            content_type_uid,
            query: Map::new(),
            params: Map::new(),
        }
    }

    /// Merge a raw query object into the accumulated predicates.
    pub fn query(mut self, value: Value) -> Result<Self, Error> {
        match value {
            Value::Object(map) => {
                self.query.extend(map);
                Ok(self)
            }
            _ => Err(Error::invalid_parameters()),
        }
    }

    /// Exact-match predicate.
    pub fn equal_to(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.query.insert(key.to_string(), value.into());
        self
    }

    pub fn not_equal_to(self, key: &str, value: impl Into<Value>) -> Self {
        self.operator(key, "$ne", value.into())
    }

    pub fn less_than(self, key: &str, value: impl Into<Value>) -> Self {
        self.operator(key, "$lt", value.into())
    }

    pub fn less_than_or_equal_to(self, key: &str, value: impl Into<Value>) -> Self {
        self.operator(key, "$lte", value.into())
    }

    pub fn greater_than(self, key: &str, value: impl Into<Value>) -> Self {
        self.operator(key, "$gt", value.into())
    }

    pub fn greater_than_or_equal_to(self, key: &str, value: impl Into<Value>) -> Self {
        self.operator(key, "$gte", value.into())
    }

    pub fn contained_in(self, key: &str, values: Vec<Value>) -> Self {
        self.operator(key, "$in", Value::Array(values))
    }

    pub fn not_contained_in(self, key: &str, values: Vec<Value>) -> Self {
        self.operator(key, "$nin", Value::Array(values))
    }

    pub fn exists(self, key: &str) -> Self {
        self.operator(key, "$exists", Value::Bool(true))
    }

    pub fn not_exists(self, key: &str) -> Self {
        self.operator(key, "$exists", Value::Bool(false))
    }

    /// Regex predicate with optional regex options (e.g. `"i"`).
    pub fn regex(self, key: &str, pattern: &str, options: Option<Value>) -> Self {
        let query = self.operator(key, "$regex", Value::String(pattern.to_string()));
        match options {
            Some(options) => query.operator(key, "$options", options),
            None => query,
        }
    }

    /// Conjunction of sub-queries; repeated calls extend the `$and` list.
    pub fn and(self, sub_query: Value) -> Result<Self, Error> {
        self.combinator("$and", sub_query)
    }

    /// Disjunction of sub-queries; repeated calls extend the `$or` list.
    pub fn or(self, sub_query: Value) -> Result<Self, Error> {
        self.combinator("$or", sub_query)
    }

    pub fn tags(mut self, tags: &[&str]) -> Self {
        self.params.insert("tags".to_string(), json!(tags));
        self
    }

    pub fn include_count(mut self) -> Self {
        self.params.insert("include_count".to_string(), json!(true));
        self
    }

    /// Typeahead search over the collection.
    pub fn search(mut self, text: &str) -> Self {
        self.params.insert("typeahead".to_string(), json!(text));
        self
    }

    pub fn ascending(mut self, key: &str) -> Self {
        self.params.insert("asc".to_string(), json!(key));
        self
    }

    pub fn descending(mut self, key: &str) -> Self {
        self.params.insert("desc".to_string(), json!(key));
        self
    }

    pub fn before_uid(mut self, uid: &str) -> Self {
        self.params.insert("before_uid".to_string(), json!(uid));
        self
    }

    pub fn after_uid(mut self, uid: &str) -> Self {
        self.params.insert("after_uid".to_string(), json!(uid));
        self
    }

    pub fn skip(mut self, count: u64) -> Self {
        self.params.insert("skip".to_string(), json!(count));
        self
    }

    pub fn limit(mut self, count: u64) -> Self {
        self.params.insert("limit".to_string(), json!(count));
        self
    }

    /// Arbitrary extra query parameter.
    pub fn add_param(mut self, key: &str, value: impl Into<Value>) -> Result<Self, Error> {
        if key.is_empty() {
            return Err(Error::invalid_parameters());
        }
        self.params.insert(key.to_string(), value.into());
        Ok(self)
    }

    /// Restrict result fields. `reference` is a reference field uid, or
    /// `"BASE"` for the top-level object; repeated calls on the same
    /// reference extend the list.
    pub fn only(self, reference: &str, fields: &[&str]) -> Self {
        self.projection("only", reference, fields)
    }

    /// Exclude result fields; same addressing as [`only`](Self::only).
    pub fn except(self, reference: &str, fields: &[&str]) -> Self {
        self.projection("except", reference, fields)
    }

    /// The accumulated predicate object, for inspection.
    pub fn get_query(&self) -> Value {
        Value::Object(self.query.clone())
    }

    /// Run the query and resolve with the host's result set.
    pub async fn find(self) -> Result<Value, Error> {
        self.send(None, false).await
    }

    /// Run the query capped to a single result.
    pub async fn find_one(self) -> Result<Value, Error> {
        self.send(Some(1), false).await
    }

    /// Run the query asking only for the match count.
    pub async fn count(self) -> Result<Value, Error> {
        self.send(None, true).await
    }

    fn operator(mut self, key: &str, op: &str, value: Value) -> Self {
        let slot = self
            .query
            .entry(key.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(map) = slot {
            map.insert(op.to_string(), value);
        } else {
            // Key previously held a direct equality value; the operator
            // form replaces it.
            let mut map = Map::new();
            map.insert(op.to_string(), value);
            *slot = Value::Object(map);
        }
        self
    }

    fn combinator(mut self, op: &str, sub_query: Value) -> Result<Self, Error> {
        if !sub_query.is_object() {
            return Err(Error::invalid_parameters());
        }
        let slot = self
            .query
            .entry(op.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(list) = slot {
            list.push(sub_query);
        }
        Ok(self)
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

    async fn send(mut self, forced_limit: Option<u64>, count: bool) -> Result<Value, Error> {
        if let Some(limit) = forced_limit {
            self.params.insert("limit".to_string(), json!(limit));
        }
        if count {
            self.params.insert("count".to_string(), json!(true));
        }
        self.params
            .insert("query".to_string(), Value::Object(self.query));

        let mut options = Map::new();
        if let Some(uid) = self.content_type_uid {
            options.insert("content_type_uid".to_string(), json!(uid));
        }
        options.insert("params".to_string(), Value::Object(self.params));
        options.insert("action".to_string(), json!(self.module.action()));

        stack_query(self.connection.as_ref(), Value::Object(options)).await
    }
}
