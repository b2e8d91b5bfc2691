//! Replay a reply in small chunks and show what a chat client would render
//! after each delta.
//!
//!     RUST_LOG=chatwidget_core=trace cargo run --example stream_replay

use chatwidget_core::{MessageStream, Segment};
use tracing_subscriber::EnvFilter;

const REPLY: &str = r#"Sure, here is your plan: @ui:list[{"items": [{"id": "1", "title": "Warm up"}, {"id": "2", "title": "Squats"}, {"id": "3", "title": "Stretch"}]}] Anything else?"#;

fn describe(segment: &Segment) -> String {
    match segment {
        Segment::Text { content } => format!("text({:?})", content),
        Segment::Widget(w) if w.is_streaming => {
            let count = w.props["items"].as_array().map_or(0, Vec::len);
            format!("{}[streaming, {} items]", w.widget_type, count)
        }
        Segment::Widget(w) => format!("{}[{}]", w.widget_type, w.id),
        Segment::PendingWidget { widget_type } => format!("pending({})", widget_type),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut stream = MessageStream::new();
    let bytes = REPLY.as_bytes();
    let mut start = 0;

    while start < bytes.len() {
        let end = (start + 12).min(bytes.len());
        let content = stream.push(&REPLY[start..end])?;
        let line: Vec<String> = content.segments.iter().map(describe).collect();
        println!("{:>4} | {}", end, line.join("  "));

        for widget in stream.take_rendered() {
            println!("     + rendered {} ({})", widget.widget_type, widget.id);
        }
        start = end;
    }

    stream.complete()?;
    println!("final: {}", serde_json::to_string(stream.content())?);
    Ok(())
}
