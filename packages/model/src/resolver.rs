//! The field-path resolution engine.
//!
//! `resolve` walks a dotted path over two trees in lockstep: the content
//! type's schema tree and the entry's data tree. Most segments are plain
//! schema-uid lookups; multiple-valued groups consume the following segment
//! as an index, and modular-blocks fields additionally select one block
//! variant through the instance's single discriminator key.

use serde_json::Value;

use crate::path::{FieldPath, Segment};
use crate::schema::{DataType, SchemaNode, SchemaRef};
use crate::ResolveError;

/// A successful resolution: the value at the path and the schema that
/// describes it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolved<'a> {
    pub value: &'a Value,
    pub schema: SchemaRef<'a>,
}

/// Resolve a dotted field path against a schema tree and an entry's data.
///
/// Fails with [`ResolveError::EntryUnsaved`] when the entry has no data at
/// all (never created or never saved), and with
/// [`ResolveError::FieldNotFound`] for every other failure: unknown uid,
/// out-of-range index, an index segment where a uid is required, or a path
/// that stops at a bare index inside a multiple-valued group.
///
/// # Example
///
/// ```rust
/// use extkit_model::{fieldpath, resolve, DataType, SchemaNode};
/// use serde_json::json;
///
/// let schema: Vec<SchemaNode> = serde_json::from_value(json!([
///     { "uid": "g", "data_type": "group", "multiple": true, "schema": [
///         { "uid": "s", "data_type": "single_line" }
///     ]}
/// ])).unwrap();
/// let data = json!({ "g": [{ "s": "a" }, { "s": "b" }] });
///
/// let resolved = resolve(&schema, &data, &fieldpath!("g.1.s")).unwrap();
/// assert_eq!(resolved.value, &json!("b"));
/// assert_eq!(resolved.schema.data_type(), DataType::SingleLine);
/// ```
pub fn resolve<'a>(
    schema: &'a [SchemaNode],
    data: &'a Value,
    path: &FieldPath,
) -> Result<Resolved<'a>, ResolveError> {
    if path.is_empty() {
        return Err(ResolveError::FieldNotFound);
    }

    // An entry that was never saved has no data tree at all. Fail fast with
    // a message that tells the caller to save, not to fix the uid.
    match data {
        Value::Null => return Err(ResolveError::EntryUnsaved),
        Value::Object(map) if map.is_empty() => return Err(ResolveError::EntryUnsaved),
        _ => {}
    }

    walk(schema, data, path.segments()).ok_or(ResolveError::FieldNotFound)
}

fn walk<'a>(
    mut nodes: &'a [SchemaNode],
    root: &'a Value,
    segments: &[Segment],
) -> Option<Resolved<'a>> {
    let mut value = root;
    let mut schema: Option<SchemaRef<'a>> = None;
    // Segments already consumed by a multiple-group or blocks branch; the
    // main loop must not re-process them as schema-uid lookups.
    let mut skip = 0usize;

    for (i, segment) in segments.iter().enumerate() {
        if skip > 0 {
            skip -= 1;
            continue;
        }

        let uid = segment.as_uid()?;
        let node = nodes.iter().find(|n| n.uid == uid)?;
        value = value.get(uid)?;
        schema = Some(SchemaRef::Node(node));

        let last = i + 1 == segments.len();
        if last {
            continue;
        }

        match node.data_type {
            DataType::Group | DataType::GlobalField => {
                nodes = &node.schema;
                if node.multiple {
                    // The next segment indexes the sequence of group values.
                    let index = segments.get(i + 1)?.as_index()?;
                    value = value.get(index)?;
                    skip = 1;
                    // A path that stops at the index addresses nothing: an
                    // index is only valid with a field selector after it.
                    if i + 2 == segments.len() {
                        return None;
                    }
                }
            }
            DataType::Blocks => {
                let index = segments.get(i + 1)?.as_index()?;
                let instance = value.get(index)?;
                // Each block instance is a single-key map keyed by the
                // block-type uid it selected.
                let block_uid = instance.as_object()?.keys().next()?;
                let block = node.blocks.iter().find(|b| b.uid == *block_uid)?;

                if i + 2 == segments.len() {
                    // Path ends at the instance: the caller gets the whole
                    // discriminated map and the selected block's schema.
                    return Some(Resolved {
                        value: instance,
                        schema: SchemaRef::Block(block),
                    });
                }

                // Continue into the block's own fields. Both the index
                // segment and the discriminator segment are now consumed.
                value = instance.get(block_uid.as_str())?;
                nodes = &block.schema;
                schema = Some(SchemaRef::Block(block));
                skip = 2;
            }
            _ => {
                // Leaf with segments remaining: the next lookup will fail
                // against this node's (empty) children.
                nodes = &node.schema;
            }
        }
    }

    schema.map(|schema| Resolved { value, schema })
}
