//! The widget-text segmenter.
//!
//! Each call re-parses the whole buffer and is a pure function of it:
//!
//! 1. Find the trailing directive whose payload has not arrived completely.
//!    Cut it from the working text and represent it as a streaming widget
//!    (streamable kinds with at least one complete item) or as a trailing
//!    `PendingWidget`.
//! 2. Walk the complete directives in the working text, emitting the prose
//!    between them and a `Widget` for each payload that decodes. Payloads
//!    that do not decode are dropped and the prose around them is joined.
//! 3. Emit the trailing prose, then the streaming widget or pending marker.

use std::sync::OnceLock;

use memchr::memmem::Finder;
use tracing::{debug, trace};

use crate::bracket::{find_matching_bracket, JsonScanner};
use crate::config::ParserConfig;
use crate::directive::{Directives, Head, HeadTail};
use crate::error::ConfigError;
use crate::hash::content_hash;
use crate::partial::extract_partial_items;
use crate::segment::{decode_widget, ParsedContent, Segment, Widget};

/// Segmenter with a fixed configuration. Cheap to clone and share.
#[derive(Debug, Clone)]
pub struct WidgetParser {
    config: ParserConfig,
    finder: Finder<'static>,
}

/// The directive left open at the end of the buffer.
#[derive(Debug)]
struct Trailing<'a> {
    /// Offset of its token; the working text ends here.
    start: usize,
    widget_type: &'a str,
    /// Offset of the payload's `[`, if it has arrived.
    open: Option<usize>,
}

/// How the trailing directive is represented.
enum TrailingOutcome {
    Streaming(Widget),
    Pending(String),
    /// Only the bare token arrived; nothing to show.
    Hidden,
}

impl WidgetParser {
    pub fn new() -> Self {
        Self::from_valid(ParserConfig::default())
    }

    pub fn with_config(config: ParserConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_valid(config))
    }

    fn from_valid(config: ParserConfig) -> Self {
        let finder = Finder::new(config.directive_token.as_bytes()).into_owned();
        Self { config, finder }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Cheap pre-check: is the directive token present at all?
    pub fn contains_widgets(&self, text: &str) -> bool {
        self.finder.find(text.as_bytes()).is_some()
    }

    /// Complete directives in `text`, left to right.
    pub fn directives<'a>(&self, text: &'a str) -> Directives<'a, '_> {
        Directives::new(text, &self.finder)
    }

    /// Only the plain-text segments, joined by blank lines.
    pub fn strip_widgets(&self, text: &str) -> String {
        self.parse(text).text()
    }

    /// Segment `buffer` into prose, widgets and at most one trailing
    /// pending marker. Never fails: malformed payloads are dropped.
    pub fn parse(&self, buffer: &str) -> ParsedContent {
        if !self.contains_widgets(buffer) {
            let trimmed = buffer.trim();
            let segments = if trimmed.is_empty() {
                Vec::new()
            } else {
                vec![Segment::text(trimmed)]
            };
            return ParsedContent::from_segments(segments, false);
        }

        let (working, outcome) = match self.trailing_directive(buffer) {
            Some(trailing) => {
                let outcome = self.resolve_trailing(buffer, &trailing);
                let before = &buffer[..trailing.start];
                let working = match &outcome {
                    TrailingOutcome::Streaming(_) => before.trim_end(),
                    _ if self.config.strip_dangling_punctuation => strip_dangling(before),
                    _ => before.trim_end(),
                };
                (working, Some(outcome))
            }
            None => (buffer, None),
        };

        let open_tail = matches!(
            outcome,
            Some(TrailingOutcome::Streaming(_) | TrailingOutcome::Pending(_))
        );
        let mut segments = self.segment_complete(working);
        match outcome {
            Some(TrailingOutcome::Streaming(widget)) => segments.push(Segment::Widget(widget)),
            Some(TrailingOutcome::Pending(widget_type)) => {
                segments.push(Segment::PendingWidget { widget_type })
            }
            Some(TrailingOutcome::Hidden) | None => {}
        }

        trace!(
            len = buffer.len(),
            segments = segments.len(),
            "segmented buffer"
        );
        ParsedContent::from_segments(segments, open_tail)
    }

    /// Scan forward for the first directive, outside any complete payload,
    /// that is still open. Everything after it belongs to its payload.
    fn trailing_directive<'a>(&self, buffer: &'a str) -> Option<Trailing<'a>> {
        let bytes = buffer.as_bytes();
        let token_len = self.finder.needle().len();
        let mut pos = 0;

        while let Some(found) = self.finder.find(&bytes[pos..]) {
            let start = pos + found;
            let head = Head::read(buffer, start, token_len);
            match head.tail {
                HeadTail::Bracket(open) => match find_matching_bracket(buffer, open) {
                    Some(close) => pos = close + 1,
                    None => {
                        return Some(Trailing {
                            start,
                            widget_type: head.widget_type,
                            open: Some(open),
                        })
                    }
                },
                HeadTail::EndOfText => {
                    return Some(Trailing {
                        start,
                        widget_type: head.widget_type,
                        open: None,
                    })
                }
                HeadTail::Other => pos = start + token_len,
            }
        }
        None
    }

    fn resolve_trailing(&self, buffer: &str, trailing: &Trailing<'_>) -> TrailingOutcome {
        if trailing.widget_type.is_empty() {
            return TrailingOutcome::Hidden;
        }
        let pending = || TrailingOutcome::Pending(trailing.widget_type.to_string());

        let Some(open) = trailing.open else {
            return pending();
        };
        let Some(shape) = self.config.stream_shape(trailing.widget_type) else {
            return pending();
        };
        let payload = &buffer[open + 1..];
        let Some(array_body) = find_stream_array(payload, shape.key()) else {
            return pending();
        };

        let partial = extract_partial_items(&payload[array_body..]);
        if partial.items.is_empty() {
            return pending();
        }

        // Keyed on everything up to the payload so the id survives every
        // token that extends the payload.
        let id = format!(
            "{}-streaming-{}",
            trailing.widget_type,
            content_hash(&buffer[..open])
        );
        TrailingOutcome::Streaming(Widget {
            widget_type: trailing.widget_type.to_string(),
            id,
            props: shape.props(partial.items),
            is_streaming: partial.still_streaming,
            actions: None,
            metadata: None,
        })
    }

    /// Steps 2 and 3 over the working text.
    fn segment_complete(&self, working: &str) -> Vec<Segment> {
        let mut segments = Vec::new();
        let mut prose = Prose::default();
        let mut cursor = 0;
        let mut ordinal = 0;

        for directive in self.directives(working) {
            prose.append(&working[cursor..directive.span.start]);
            cursor = directive.span.end;

            let id = format!(
                "{}-{}-{}",
                directive.widget_type,
                ordinal,
                content_hash(directive.body)
            );
            match decode_widget(directive.widget_type, id, directive.body) {
                Ok(widget) => {
                    ordinal += 1;
                    prose.flush_into(&mut segments);
                    segments.push(Segment::Widget(widget));
                }
                Err(err) => {
                    debug!(
                        widget_type = directive.widget_type,
                        error = %err,
                        "dropping malformed widget directive"
                    );
                    prose.mark_gap();
                }
            }
        }

        prose.append(&working[cursor..]);
        prose.flush_into(&mut segments);
        segments
    }
}

impl Default for WidgetParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Prose accumulated between emitted widgets.
///
/// When a malformed directive is dropped the text on either side is joined
/// into one segment: a blank line if either side broke the line at the
/// seam, a single space otherwise.
#[derive(Default)]
struct Prose {
    text: String,
    gap: bool,
}

impl Prose {
    fn append(&mut self, piece: &str) {
        if !self.gap || self.text.is_empty() {
            self.text.push_str(piece);
            self.gap = false;
            return;
        }
        self.gap = false;

        let left_len = self.text.trim_end().len();
        let right = piece.trim_start();
        let line_break = self.text[left_len..].contains('\n')
            || piece[..piece.len() - right.len()].contains('\n');
        self.text.truncate(left_len);
        if right.is_empty() {
            return;
        }
        self.text.push_str(if line_break { "\n\n" } else { " " });
        self.text.push_str(right);
    }

    fn mark_gap(&mut self) {
        self.gap = true;
    }

    fn flush_into(&mut self, segments: &mut Vec<Segment>) {
        let trimmed = self.text.trim();
        if !trimmed.is_empty() {
            segments.push(Segment::text(trimmed));
        }
        self.text.clear();
        self.gap = false;
    }
}

/// Trim whitespace and punctuation left dangling before a cut directive,
/// e.g. the colon in "Here's the list:".
fn strip_dangling(text: &str) -> &str {
    text.trim_end_matches(|c: char| {
        c.is_whitespace() || matches!(c, ':' | ';' | '-' | '–' | '—' | '…' | '.')
    })
}

/// Locate `"<key>": [` as a key of the payload's top-level object and
/// return the offset just past the `[`.
fn find_stream_array(payload: &str, key: &str) -> Option<usize> {
    let bytes = payload.as_bytes();
    let quoted = format!("\"{key}\"");
    let mut scanner = JsonScanner::new();
    let mut depth: usize = 0;

    for (i, &byte) in bytes.iter().enumerate() {
        let opens_string = byte == b'"' && !scanner.in_string();
        if !scanner.structural(byte) {
            if opens_string && depth == 1 && payload[i..].starts_with(&quoted) {
                if let Some(body) = array_after_key(bytes, i + quoted.len()) {
                    return Some(body);
                }
            }
            continue;
        }
        match byte {
            b'[' | b'{' => depth += 1,
            b']' | b'}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    None
}

fn array_after_key(bytes: &[u8], mut i: usize) -> Option<usize> {
    let skip_ws = |mut i: usize| {
        while bytes.get(i).is_some_and(u8::is_ascii_whitespace) {
            i += 1;
        }
        i
    };
    i = skip_ws(i);
    if bytes.get(i) != Some(&b':') {
        return None;
    }
    i = skip_ws(i + 1);
    (bytes.get(i) == Some(&b'[')).then_some(i + 1)
}

fn default_parser() -> &'static WidgetParser {
    static DEFAULT: OnceLock<WidgetParser> = OnceLock::new();
    DEFAULT.get_or_init(WidgetParser::new)
}

pub(crate) fn default_finder() -> &'static Finder<'static> {
    &default_parser().finder
}

/// Segment `buffer` with the default `@ui:` configuration.
pub fn parse(buffer: &str) -> ParsedContent {
    default_parser().parse(buffer)
}

/// Is an `@ui:` token present anywhere in `text`?
pub fn contains_widgets(text: &str) -> bool {
    default_parser().contains_widgets(text)
}

/// The plain-text segments of `text`, joined by blank lines.
pub fn strip_widgets(text: &str) -> String {
    default_parser().strip_widgets(text)
}
