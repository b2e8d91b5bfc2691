//! Stochastic message generators for streaming tests
//!
//! Uses seeded RNG for reproducibility. Print seed on failure for replay.

use std::ops::Range;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{json, Value};

const WORDS: &[&str] = &[
    "here", "are", "the", "results", "your", "plan", "looks", "good", "next", "step",
    "table", "of", "options", "summary", "café", "✓", "done", "review",
];

/// Titles chosen to stress the scanners: brackets, braces and quotes in strings.
const TITLES: &[&str] = &[
    "Alpha", "A [B] C", "{braces}", "say \"hi\"", "back\\slash", "]}", "naïve", "plain",
];

/// A generated assistant message and where its directives sit.
#[derive(Debug, Clone)]
pub struct Message {
    pub text: String,
    /// Byte range of each directive, token through closing `]`.
    pub directives: Vec<Range<usize>>,
}

/// Seeded generator for reproducible stochastic tests
pub struct Gen {
    pub rng: StdRng,
    pub seed: u64,
}

impl Gen {
    /// Create with specific seed (for reproduction)
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Create from environment or random seed
    pub fn from_env_or_random() -> Self {
        let seed = std::env::var("CHATWIDGET_TEST_SEED")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(|| rand::random());
        Self::new(seed)
    }

    /// Random boolean with probability p
    pub fn chance(&mut self, p: f64) -> bool {
        self.rng.gen::<f64>() < p
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.gen_range(0..items.len())]
    }

    /// A sentence of prose, ending with '.' or ':'.
    pub fn sentence(&mut self) -> String {
        let len = self.rng.gen_range(2..8);
        let words: Vec<&str> = (0..len).map(|_| self.pick(WORDS)).collect();
        let end = if self.chance(0.5) { ":" } else { "." };
        format!("{}{}", words.join(" "), end)
    }

    fn item(&mut self, ordinal: usize) -> Value {
        let title = self.pick(TITLES);
        if self.chance(0.5) {
            json!({"id": ordinal.to_string(), "title": title})
        } else {
            json!({"title": title, "tags": ["x", "y]"]})
        }
    }

    /// One complete, well-formed directive.
    pub fn directive(&mut self) -> String {
        let count = self.rng.gen_range(0..5);
        let items: Vec<Value> = (0..count).map(|i| self.item(i)).collect();
        let (widget_type, payload) = match self.rng.gen_range(0..4) {
            0 => ("card", json!({"title": self.pick(TITLES), "body": self.pick(TITLES)})),
            1 => {
                let mut payload = json!({"items": items});
                if self.chance(0.5) {
                    payload["actions"] = json!([{"type": "go", "label": "Go"}]);
                }
                ("list", payload)
            }
            2 => ("table", json!({"columns": [{"key": "title"}], "rows": items})),
            _ => ("widget_xyz", json!({"a": 1, "metadata": {"k": self.pick(TITLES)}})),
        };
        format!("@ui:{}[{}]", widget_type, payload)
    }

    /// A message alternating prose and directives.
    pub fn message(&mut self) -> Message {
        let mut text = String::new();
        let mut directives = Vec::new();
        let parts = self.rng.gen_range(1..6);
        for _ in 0..parts {
            if self.chance(0.6) {
                text.push_str(&self.sentence());
                text.push_str(if self.chance(0.5) { " " } else { "\n\n" });
            }
            if self.chance(0.7) {
                let start = text.len();
                text.push_str(&self.directive());
                directives.push(start..text.len());
                text.push_str("\n\n");
            }
        }
        Message { text, directives }
    }

    /// Split `text` into deltas of 1..=8 chars, like a token stream.
    pub fn chunks<'a>(&mut self, text: &'a str) -> Vec<&'a str> {
        let mut chunks = Vec::new();
        let mut rest = text;
        while !rest.is_empty() {
            let want = self.rng.gen_range(1..=8);
            let cut = rest
                .char_indices()
                .nth(want)
                .map_or(rest.len(), |(i, _)| i);
            let (head, tail) = rest.split_at(cut);
            chunks.push(head);
            rest = tail;
        }
        chunks
    }
}
