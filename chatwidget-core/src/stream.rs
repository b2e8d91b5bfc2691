//! Caller-side stream accumulation.
//!
//! The segmenter is stateless. Everything that must persist across deltas
//! of one assistant message lives here, owned by the caller: the growing
//! buffer, the stream's completion/error state, and the set of widget ids
//! already reported to the host.

use std::collections::HashSet;

use tracing::warn;

use crate::error::StreamError;
use crate::parser::WidgetParser;
use crate::segment::{ParsedContent, Segment, Widget};

/// Lifecycle of one streamed message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamStatus {
    Streaming,
    Complete,
    Failed { reason: String },
}

/// Remembers which widget ids have been reported, so a host callback fires
/// once per widget no matter how often the buffer is re-parsed.
#[derive(Debug, Clone, Default)]
pub struct WidgetTracker {
    seen: HashSet<String>,
}

impl WidgetTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Widgets in `content` not reported before, in order. A widget from a
    /// directive that is still open is held back until it closes.
    pub fn observe<'c>(&mut self, content: &'c ParsedContent) -> Vec<&'c Widget> {
        content
            .settled_widgets()
            .filter(|widget| !widget.is_streaming)
            .filter(|widget| self.seen.insert(widget.id.clone()))
            .collect()
    }

    pub fn has_seen(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    pub fn clear(&mut self) {
        self.seen.clear();
    }
}

/// Accumulates the text deltas of one assistant message and keeps the
/// latest segmentation of the full buffer.
///
/// ```
/// use chatwidget_core::MessageStream;
///
/// let mut stream = MessageStream::new();
/// stream.push("Here you go: @ui:card[{\"ti").unwrap();
/// assert!(stream.content().has_pending_widget);
/// stream.push("tle\": \"Hi\"}]").unwrap();
/// assert_eq!(stream.take_rendered().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MessageStream {
    parser: WidgetParser,
    buffer: String,
    content: ParsedContent,
    status: StreamStatus,
    tracker: WidgetTracker,
}

impl MessageStream {
    pub fn new() -> Self {
        Self::with_parser(WidgetParser::default())
    }

    pub fn with_parser(parser: WidgetParser) -> Self {
        Self {
            parser,
            buffer: String::new(),
            content: ParsedContent::default(),
            status: StreamStatus::Streaming,
            tracker: WidgetTracker::new(),
        }
    }

    /// Append a delta and re-segment the whole buffer.
    pub fn push(&mut self, delta: &str) -> Result<&ParsedContent, StreamError> {
        self.ensure_open()?;
        self.buffer.push_str(delta);
        self.content = self.parser.parse(&self.buffer);
        Ok(&self.content)
    }

    /// Signal that no more deltas will arrive.
    ///
    /// A trailing pending widget is dropped since its payload will never
    /// come, and any widget still marked streaming is settled as is.
    pub fn complete(&mut self) -> Result<&ParsedContent, StreamError> {
        self.ensure_open()?;
        let mut segments = self.parser.parse(&self.buffer).segments;

        if segments.last().is_some_and(Segment::is_pending) {
            if let Some(Segment::PendingWidget { widget_type }) = segments.pop() {
                warn!(widget_type = %widget_type, "stream completed before widget payload arrived");
            }
        }
        for segment in &mut segments {
            if let Segment::Widget(widget) = segment {
                if widget.is_streaming {
                    warn!(id = %widget.id, "stream completed with widget payload still open");
                    widget.is_streaming = false;
                }
            }
        }

        self.content = ParsedContent::from_segments(segments, false);
        self.status = StreamStatus::Complete;
        Ok(&self.content)
    }

    /// Signal a transport error. The content parsed so far is kept.
    pub fn fail(&mut self, reason: impl Into<String>) {
        if self.status == StreamStatus::Complete {
            return;
        }
        let reason = reason.into();
        warn!(reason = %reason, "message stream failed");
        self.status = StreamStatus::Failed { reason };
    }

    /// Settled widgets that have not been returned by an earlier call.
    pub fn take_rendered(&mut self) -> Vec<Widget> {
        self.tracker
            .observe(&self.content)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn content(&self) -> &ParsedContent {
        &self.content
    }

    pub fn status(&self) -> &StreamStatus {
        &self.status
    }

    pub fn is_finished(&self) -> bool {
        self.status != StreamStatus::Streaming
    }

    fn ensure_open(&self) -> Result<(), StreamError> {
        match &self.status {
            StreamStatus::Streaming => Ok(()),
            StreamStatus::Complete => Err(StreamError::Completed),
            StreamStatus::Failed { reason } => Err(StreamError::Failed {
                reason: reason.clone(),
            }),
        }
    }
}

impl Default for MessageStream {
    fn default() -> Self {
        Self::new()
    }
}
