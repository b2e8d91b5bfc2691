//! Chat Widget Core
//!
//! Segments streaming assistant text into plain prose and structured UI
//! directives of the form `@ui:<type>[{json}]`, while the JSON payload may
//! still be arriving token by token.
//!
//! # Architecture
//!
//! - **bracket.rs** - Quote/escape-aware bracket matching
//! - **partial.rs** - Complete-object extraction from an unclosed array
//! - **hash.rs** - Content hash for stable synthetic ids
//! - **directive.rs** - `@ui:` token scanning and complete directive spans
//! - **segment.rs** - Segment / Widget / ParsedContent types
//! - **parser.rs** - The segmenter (`parse`, `contains_widgets`, `strip_widgets`)
//! - **config.rs** - Directive token and streamable widget shapes
//! - **stream.rs** - Caller-side delta accumulator and widget tracker
//! - **registry.rs** - Widget type to renderer lookup
//!
//! # Example
//!
//! ```
//! use chatwidget_core::{parse, Segment};
//!
//! let content = parse(r#"Here you go: @ui:card[{"title": "A [B] C"}]"#);
//! assert_eq!(content.segments.len(), 2);
//! assert!(matches!(&content.segments[1], Segment::Widget(w) if w.widget_type == "card"));
//! ```

pub mod bracket;
pub mod config;
pub mod directive;
pub mod error;
pub mod hash;
pub mod parser;
pub mod partial;
pub mod registry;
pub mod segment;
pub mod span;
pub mod stream;

pub use bracket::find_matching_bracket;
pub use config::{ParserConfig, StreamShape};
pub use directive::{directives, Directive, Directives};
pub use error::{ConfigError, DirectiveError, StreamError};
pub use hash::content_hash;
pub use parser::{contains_widgets, parse, strip_widgets, WidgetParser};
pub use partial::{extract_partial_items, PartialItems};
pub use registry::WidgetRegistry;
pub use segment::{decode_widget, ParsedContent, Segment, Widget};
pub use span::Span;
pub use stream::{MessageStream, StreamStatus, WidgetTracker};
