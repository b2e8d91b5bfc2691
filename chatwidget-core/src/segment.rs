//! Segment types produced by the segmenter.
//!
//! These serialize to the shape a JavaScript UI layer expects:
//!
//! ```text
//! {"type": "text", "content": "Here are results:"}
//! {"type": "widget", "widgetType": "list", "id": "...", "props": {...}, "isStreaming": true}
//! {"type": "pending_widget", "widgetType": "flow"}
//! ```

use phf::phf_set;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::DirectiveError;

/// Payload keys lifted from `props` onto the widget itself.
static LIFTED_KEYS: phf::Set<&'static str> = phf_set! {
    "actions",
    "metadata",
};

/// One ordered piece of a parsed message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Segment {
    /// Plain prose, rendered as markdown by the host.
    Text { content: String },

    /// A fully or partially decoded directive.
    Widget(Widget),

    /// A directive has started but has nothing decodable yet. At most one
    /// per parse, always last.
    PendingWidget {
        #[serde(rename = "widgetType")]
        widget_type: String,
    },
}

impl Segment {
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text { content: content.into() }
    }

    pub fn as_widget(&self) -> Option<&Widget> {
        match self {
            Self::Widget(widget) => Some(widget),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { content } => Some(content),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::PendingWidget { .. })
    }
}

/// A structured UI directive ready to hand to a renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Widget {
    pub widget_type: String,
    /// Deterministic, content-derived id. Stable across re-parses of a
    /// growing buffer, so hosts can key UI identity on it.
    pub id: String,
    /// Every payload key except `actions` and `metadata`.
    pub props: Value,
    /// The payload array is known to be incomplete.
    pub is_streaming: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

/// Strictly decode a complete directive payload.
///
/// `body` is the text between the directive's outer `[` and `]`; it must be
/// a JSON object. An `actions` array and a `metadata` object are lifted to
/// the widget root. Keys with those names but other value types stay in
/// `props`.
pub fn decode_widget(
    widget_type: &str,
    id: impl Into<String>,
    body: &str,
) -> Result<Widget, DirectiveError> {
    let mut props = match serde_json::from_str::<Value>(body.trim())? {
        Value::Object(map) => map,
        other => {
            return Err(DirectiveError::NotAnObject {
                found: json_kind(&other),
            })
        }
    };

    let mut actions = None;
    let mut metadata = None;
    for key in LIFTED_KEYS.iter() {
        match props.remove(*key) {
            Some(Value::Array(list)) if *key == "actions" => actions = Some(list),
            Some(Value::Object(map)) if *key == "metadata" => metadata = Some(map),
            Some(other) => {
                props.insert((*key).to_string(), other);
            }
            None => {}
        }
    }

    Ok(Widget {
        widget_type: widget_type.to_string(),
        id: id.into(),
        props: Value::Object(props),
        is_streaming: false,
        actions,
        metadata,
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Result of segmenting one buffer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedContent {
    pub segments: Vec<Segment>,
    /// At least one `Widget` segment (complete or streaming) is present.
    pub has_widgets: bool,
    /// The last segment is a `PendingWidget`.
    pub has_pending_widget: bool,
    /// The buffer ends inside a directive, so the last segment is
    /// provisional and will be replaced once the directive closes.
    #[serde(skip)]
    pub open_tail: bool,
}

impl ParsedContent {
    pub(crate) fn from_segments(segments: Vec<Segment>, open_tail: bool) -> Self {
        let has_widgets = segments.iter().any(|s| s.as_widget().is_some());
        let has_pending_widget = segments.last().is_some_and(Segment::is_pending);
        Self {
            segments,
            has_widgets,
            has_pending_widget,
            open_tail,
        }
    }

    pub fn widgets(&self) -> impl Iterator<Item = &Widget> {
        self.segments.iter().filter_map(Segment::as_widget)
    }

    /// Widgets decoded from closed directives: every widget except a
    /// provisional one at an open tail.
    pub fn settled_widgets(&self) -> impl Iterator<Item = &Widget> {
        let keep = if self.open_tail {
            self.segments.len().saturating_sub(1)
        } else {
            self.segments.len()
        };
        self.segments[..keep].iter().filter_map(Segment::as_widget)
    }

    /// Plain-text segments joined by blank lines.
    pub fn text(&self) -> String {
        self.segments
            .iter()
            .filter_map(Segment::as_text)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
