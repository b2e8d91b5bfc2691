//! Complete-object extraction from an array that has not closed yet.
//!
//! While a `list` or `table` directive streams, its `items`/`rows` array
//! grows one object at a time. Every object whose closing `}` has arrived
//! can be rendered immediately instead of waiting for the whole payload.

use serde_json::{Map, Value};
use tracing::trace;

use crate::bracket::JsonScanner;
use crate::hash::content_hash;

/// Objects recovered from a partially received array.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialItems {
    /// Fully parsed objects, in source order.
    pub items: Vec<Value>,
    /// False only once the array's own closing `]` has been seen.
    pub still_streaming: bool,
}

/// Scan `body`, the text following an array's opening `[`, for complete
/// top-level `{...}` objects.
///
/// Objects that close but fail strict JSON parsing are skipped. When the
/// text ends inside an object, the object is closed provisionally and kept
/// if that parses to a non-empty object, so a row shows as soon as its
/// first field has arrived. Objects without an `id` get
/// `item-<ordinal>-<hash>`, hashed over the object's first field only, so
/// the id holds while later fields stream in and after the object closes.
pub fn extract_partial_items(body: &str) -> PartialItems {
    let bytes = body.as_bytes();
    let mut scanner = JsonScanner::new();
    // Openers of the object being scanned; empty between objects.
    let mut open: Vec<u8> = Vec::new();
    let mut object_start = 0;
    // First and last comma between the current object's own fields.
    let mut first_comma = None;
    let mut field_comma = None;
    let mut items = Vec::new();
    let mut closed = false;

    for (i, &byte) in bytes.iter().enumerate() {
        if !scanner.structural(byte) {
            continue;
        }
        match byte {
            b'{' => {
                if open.is_empty() {
                    object_start = i;
                    first_comma = None;
                    field_comma = None;
                }
                open.push(b'{');
            }
            b',' if open.len() == 1 => {
                first_comma.get_or_insert(i);
                field_comma = Some(i);
            }
            b'[' if !open.is_empty() => open.push(b'['),
            b'}' | b']' if !open.is_empty() => {
                open.pop();
                if open.is_empty() && byte == b'}' {
                    if let Some(object) = parse_object(&body[object_start..=i]) {
                        let key = identity_key(body, object_start, first_comma, i);
                        items.push(with_id(object, items.len(), key));
                    }
                }
            }
            b']' => {
                closed = true;
                break;
            }
            _ => {}
        }
    }

    if !closed && !open.is_empty() {
        let tail = &body[object_start..];
        let field_cut = field_comma.map(|comma| &body[object_start..comma]);
        let provisional = close_provisionally(tail, &open, scanner.in_string(), field_cut);
        if let Some(object) = provisional {
            let key = identity_key(body, object_start, first_comma, body.len());
            items.push(with_id(object, items.len(), key));
        }
    }

    PartialItems {
        items,
        still_streaming: !closed,
    }
}

/// Close an object the text ended inside of. First try closing every open
/// bracket as is; if the text ends mid-string or mid-field, fall back to the
/// fields before the last top-level comma.
fn close_provisionally(
    tail: &str,
    open: &[u8],
    in_string: bool,
    field_cut: Option<&str>,
) -> Option<Map<String, Value>> {
    if !in_string {
        let mut repaired = tail.to_string();
        repaired.extend(open.iter().rev().map(|&opener| match opener {
            b'{' => '}',
            _ => ']',
        }));
        if let Some(object) = parse_object(&repaired) {
            return (!object.is_empty()).then_some(object);
        }
    }
    let repaired = format!("{}}}", field_cut?);
    let object = parse_object(&repaired)?;
    (!object.is_empty()).then_some(object)
}

/// The object's text through its first field, without the closing brace.
/// `end` is the offset of the `}` or the end of the text.
fn identity_key(body: &str, object_start: usize, first_comma: Option<usize>, end: usize) -> &str {
    body[object_start..first_comma.unwrap_or(end)].trim_end()
}

fn parse_object(raw: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str(raw) {
        Ok(object) => Some(object),
        Err(err) => {
            trace!(error = %err, "skipping malformed partial item");
            None
        }
    }
}

fn with_id(mut object: Map<String, Value>, ordinal: usize, key: &str) -> Value {
    if !object.contains_key("id") {
        let id = format!("item-{}-{}", ordinal, content_hash(key));
        object.insert("id".to_string(), Value::String(id));
    }
    Value::Object(object)
}
