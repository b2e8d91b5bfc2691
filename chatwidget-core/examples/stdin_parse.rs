//! Segment a full reply read from stdin and print the segments as JSON.
//!
//!     echo '@ui:card[{"title": "Hi"}]' | cargo run --example stdin_parse

use std::io::Read;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;

    let content = chatwidget_core::parse(&input);
    println!("{}", serde_json::to_string_pretty(&content)?);
    Ok(())
}
