//! Schema tree types for a content type.
//!
//! The host application describes each content type as a tree of
//! [`SchemaNode`]s. Plain fields are leaves; groups and global fields nest a
//! child schema; modular-blocks fields carry a list of [`BlockSchema`]
//! variants, one of which each block instance selects by uid.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The data type of a schema node, as a closed set of variants.
///
/// The host sends these as snake_case strings. Types this SDK does not
/// special-case round-trip through [`DataType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DataType {
    SingleLine,
    MultiLine,
    Text,
    Number,
    Boolean,
    IsoDate,
    Link,
    File,
    Reference,
    Group,
    GlobalField,
    Blocks,
    Other(String),
}

impl DataType {
    /// The host's wire name for this data type.
    pub fn as_str(&self) -> &str {
        match self {
            DataType::SingleLine => "single_line",
            DataType::MultiLine => "multi_line",
            DataType::Text => "text",
            DataType::Number => "number",
            DataType::Boolean => "boolean",
            DataType::IsoDate => "isodate",
            DataType::Link => "link",
            DataType::File => "file",
            DataType::Reference => "reference",
            DataType::Group => "group",
            DataType::GlobalField => "global_field",
            DataType::Blocks => "blocks",
            DataType::Other(name) => name,
        }
    }

    /// True for types whose value is structurally composite or a reference
    /// into another collection. These cannot be written through `setData`
    /// except by the extension's own field.
    pub fn is_compound(&self) -> bool {
        matches!(
            self,
            DataType::File
                | DataType::Reference
                | DataType::Blocks
                | DataType::Group
                | DataType::GlobalField
        )
    }
}

impl From<String> for DataType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "single_line" => DataType::SingleLine,
            "multi_line" => DataType::MultiLine,
            "text" => DataType::Text,
            "number" => DataType::Number,
            "boolean" => DataType::Boolean,
            "isodate" => DataType::IsoDate,
            "link" => DataType::Link,
            "file" => DataType::File,
            "reference" => DataType::Reference,
            "group" => DataType::Group,
            "global_field" => DataType::GlobalField,
            "blocks" => DataType::Blocks,
            _ => DataType::Other(s),
        }
    }
}

impl From<DataType> for String {
    fn from(data_type: DataType) -> Self {
        data_type.as_str().to_string()
    }
}

/// One node of a content type's schema tree.
///
/// Invariants maintained by the host: a `group`/`global_field` node carries
/// its children in `schema`; a `blocks` node carries its variants in
/// `blocks`; leaves carry neither.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaNode {
    pub uid: String,
    pub data_type: DataType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub multiple: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schema: Vec<SchemaNode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocks: Vec<BlockSchema>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub field_metadata: Value,
}

/// One variant of a modular-blocks field.
///
/// Block uids are unique within the owning field's `blocks` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockSchema {
    pub uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schema: Vec<SchemaNode>,
}

/// Borrowed view of the schema a resolution landed on: either a regular
/// node or a selected block variant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SchemaRef<'a> {
    Node(&'a SchemaNode),
    Block(&'a BlockSchema),
}

impl<'a> SchemaRef<'a> {
    pub fn uid(&self) -> &'a str {
        match self {
            SchemaRef::Node(node) => &node.uid,
            SchemaRef::Block(block) => &block.uid,
        }
    }

    /// The data type at this position. A selected block variant reports
    /// `Blocks`: the block has no data type of its own, it is one shape of
    /// the owning blocks field.
    pub fn data_type(&self) -> DataType {
        match self {
            SchemaRef::Node(node) => node.data_type.clone(),
            SchemaRef::Block(_) => DataType::Blocks,
        }
    }

    /// Clone into an owned [`FieldSchema`].
    pub fn to_owned(self) -> FieldSchema {
        match self {
            SchemaRef::Node(node) => FieldSchema::Node(node.clone()),
            SchemaRef::Block(block) => FieldSchema::Block(block.clone()),
        }
    }
}

/// Owned counterpart of [`SchemaRef`], held by field handles.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldSchema {
    Node(SchemaNode),
    Block(BlockSchema),
}

impl FieldSchema {
    pub fn uid(&self) -> &str {
        match self {
            FieldSchema::Node(node) => &node.uid,
            FieldSchema::Block(block) => &block.uid,
        }
    }

    pub fn data_type(&self) -> DataType {
        match self {
            FieldSchema::Node(node) => node.data_type.clone(),
            FieldSchema::Block(_) => DataType::Blocks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn data_type_round_trips_known_names() {
        for name in [
            "single_line",
            "number",
            "boolean",
            "file",
            "group",
            "global_field",
            "blocks",
        ] {
            let parsed = DataType::from(name.to_string());
            assert!(!matches!(parsed, DataType::Other(_)), "{}", name);
            assert_eq!(parsed.as_str(), name);
        }
    }

    #[test]
    fn unknown_data_type_preserved() {
        let parsed = DataType::from("json_rte".to_string());
        assert_eq!(parsed, DataType::Other("json_rte".to_string()));
        assert_eq!(parsed.as_str(), "json_rte");
    }

    #[test]
    fn compound_types() {
        assert!(DataType::File.is_compound());
        assert!(DataType::Reference.is_compound());
        assert!(DataType::Blocks.is_compound());
        assert!(DataType::Group.is_compound());
        assert!(DataType::GlobalField.is_compound());
        assert!(!DataType::SingleLine.is_compound());
        assert!(!DataType::Number.is_compound());
    }

    #[test]
    fn schema_node_from_host_json() {
        let node: SchemaNode = serde_json::from_value(json!({
            "uid": "modular_blocks",
            "data_type": "blocks",
            "multiple": true,
            "blocks": [
                { "uid": "banner", "title": "Banner", "schema": [
                    { "uid": "banner_image", "data_type": "file" }
                ]}
            ]
        }))
        .unwrap();

        assert_eq!(node.data_type, DataType::Blocks);
        assert!(node.multiple);
        assert_eq!(node.blocks.len(), 1);
        assert_eq!(node.blocks[0].schema[0].data_type, DataType::File);
    }

    #[test]
    fn defaults_for_missing_fields() {
        let node: SchemaNode =
            serde_json::from_value(json!({ "uid": "title", "data_type": "single_line" })).unwrap();
        assert!(!node.multiple);
        assert!(node.schema.is_empty());
        assert!(node.blocks.is_empty());
        assert!(node.field_metadata.is_null());
    }

    #[test]
    fn schema_ref_reports_block_as_blocks_type() {
        let block = BlockSchema {
            uid: "banner".to_string(),
            title: None,
            schema: Vec::new(),
        };
        let schema_ref = SchemaRef::Block(&block);
        assert_eq!(schema_ref.uid(), "banner");
        assert_eq!(schema_ref.data_type(), DataType::Blocks);

        let owned = schema_ref.to_owned();
        assert_eq!(owned.uid(), "banner");
        assert_eq!(owned.data_type(), DataType::Blocks);
    }
}
