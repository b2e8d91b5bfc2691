//! Parser configuration.
//!
//! The defaults reproduce the wire syntax exactly (`@ui:` token, `list` and
//! `table` as the only streamable kinds). Hosts may hand in a JSON config to
//! register further streamable kinds; the core never reads files or the
//! environment itself.

use std::collections::BTreeMap;

use phf::phf_map;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default directive-open token.
pub const DEFAULT_DIRECTIVE_TOKEN: &str = "@ui:";

/// Built-in streamable kinds: widget type -> (shape, array key).
static DEFAULT_STREAMABLE: phf::Map<&'static str, (ShapeKind, &'static str)> = phf_map! {
    "list" => (ShapeKind::List, "items"),
    "table" => (ShapeKind::Table, "rows"),
};

#[derive(Debug, Clone, Copy)]
enum ShapeKind {
    List,
    Table,
}

/// How a streamable widget's incrementally revealed array maps to props.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum StreamShape {
    /// Props are `{<key>: [...]}`.
    List { key: String },
    /// Props are `{<key>: [...], "columns": []}`.
    Table { key: String },
}

impl StreamShape {
    /// The array-valued payload key whose items stream in.
    pub fn key(&self) -> &str {
        match self {
            Self::List { key } | Self::Table { key } => key,
        }
    }

    /// Build the props object for a streaming widget from the items found so far.
    pub fn props(&self, items: Vec<serde_json::Value>) -> serde_json::Value {
        let mut props = serde_json::Map::new();
        props.insert(self.key().to_string(), serde_json::Value::Array(items));
        if let Self::Table { .. } = self {
            props.insert("columns".to_string(), serde_json::Value::Array(Vec::new()));
        }
        serde_json::Value::Object(props)
    }
}

/// Segmenter configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParserConfig {
    /// Token that opens a directive, followed by the widget type.
    pub directive_token: String,
    /// Widget types whose payload array may be rendered before it closes.
    pub streamable: BTreeMap<String, StreamShape>,
    /// Strip `:`, `;`, dashes, ellipses and periods left dangling before a
    /// directive that is cut from the working text.
    pub strip_dangling_punctuation: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        let streamable = DEFAULT_STREAMABLE
            .entries()
            .map(|(widget_type, (kind, key))| {
                let key = key.to_string();
                let shape = match kind {
                    ShapeKind::List => StreamShape::List { key },
                    ShapeKind::Table => StreamShape::Table { key },
                };
                (widget_type.to_string(), shape)
            })
            .collect();

        Self {
            directive_token: DEFAULT_DIRECTIVE_TOKEN.to_string(),
            streamable,
            strip_dangling_punctuation: true,
        }
    }
}

impl ParserConfig {
    /// Load a config from JSON. Missing fields take their defaults; note that
    /// a given `streamable` map replaces the built-in one entirely.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the token and stream keys are usable by the scanner.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let token = &self.directive_token;
        if token.is_empty() {
            return Err(ConfigError::EmptyToken);
        }
        if token
            .chars()
            .any(|c| matches!(c, '[' | ']' | '{' | '}' | '"') || c.is_whitespace())
        {
            return Err(ConfigError::InvalidToken { token: token.clone() });
        }
        for (widget_type, shape) in &self.streamable {
            if shape.key().is_empty() {
                return Err(ConfigError::EmptyStreamKey {
                    widget_type: widget_type.clone(),
                });
            }
        }
        Ok(())
    }

    /// Register an additional streamable widget type.
    pub fn with_streamable(mut self, widget_type: impl Into<String>, shape: StreamShape) -> Self {
        self.streamable.insert(widget_type.into(), shape);
        self
    }

    pub fn stream_shape(&self, widget_type: &str) -> Option<&StreamShape> {
        self.streamable.get(widget_type)
    }
}
