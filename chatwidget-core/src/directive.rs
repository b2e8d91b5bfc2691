//! Directive token scanning.
//!
//! A directive is `<token><type>[<json-object>]`, by default
//! `@ui:list[{"items": [...]}]`. The type is `[A-Za-z0-9_]+` and the `[`
//! must follow it with no whitespace in between.

use memchr::memmem::Finder;

use crate::bracket::find_matching_bracket;
use crate::span::Span;

/// A widget type may contain ASCII letters, digits and underscores.
#[inline]
pub fn is_type_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

/// What follows one occurrence of the directive token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Head<'a> {
    pub widget_type: &'a str,
    pub tail: HeadTail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HeadTail {
    /// `[` opens the payload at this offset.
    Bracket(usize),
    /// Only whitespace follows the type (or the token) up to the end of the
    /// text, so the payload may still arrive.
    EndOfText,
    /// Something else follows; the token is literal text.
    Other,
}

impl<'a> Head<'a> {
    /// Read the type and what follows it, starting at the token at `start`.
    pub fn read(text: &'a str, start: usize, token_len: usize) -> Self {
        let bytes = text.as_bytes();
        let type_start = start + token_len;
        let type_len = bytes[type_start..]
            .iter()
            .take_while(|&&b| is_type_byte(b))
            .count();
        let type_end = type_start + type_len;

        let rest = &bytes[type_end..];
        let tail = match rest.first() {
            None => HeadTail::EndOfText,
            Some(b'[') if type_len > 0 => HeadTail::Bracket(type_end),
            // a delta may end between the type and its `[`
            Some(_) if type_len > 0 && rest.iter().all(u8::is_ascii_whitespace) => {
                HeadTail::EndOfText
            }
            Some(_) => HeadTail::Other,
        };

        Self {
            widget_type: &text[type_start..type_end],
            tail,
        }
    }
}

/// A directive whose payload brackets are balanced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Directive<'a> {
    pub widget_type: &'a str,
    /// From the first byte of the token through the closing `]`.
    pub span: Span,
    /// The text between the outer `[` and `]`, normally a JSON object.
    pub body: &'a str,
}

/// Iterator over complete directives, left to right.
///
/// Tokens not followed by a type and `[`, and directives whose brackets do
/// not resolve, are skipped. Scanning resumes after each yielded span, so a
/// token inside a payload is never matched.
pub struct Directives<'a, 'f> {
    text: &'a str,
    finder: &'f Finder<'static>,
    pos: usize,
}

impl<'a, 'f> Directives<'a, 'f> {
    pub(crate) fn new(text: &'a str, finder: &'f Finder<'static>) -> Self {
        Self { text, finder, pos: 0 }
    }
}

impl<'a> Iterator for Directives<'a, '_> {
    type Item = Directive<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let token_len = self.finder.needle().len();
        while self.pos < self.text.len() {
            let start = self.pos + self.finder.find(&self.text.as_bytes()[self.pos..])?;
            let head = Head::read(self.text, start, token_len);
            self.pos = start + token_len;

            let HeadTail::Bracket(open) = head.tail else {
                continue;
            };
            let Some(close) = find_matching_bracket(self.text, open) else {
                continue;
            };

            self.pos = close + 1;
            return Some(Directive {
                widget_type: head.widget_type,
                span: Span::new(start, close + 1),
                body: &self.text[open + 1..close],
            });
        }
        None
    }
}

/// Iterate the complete `@ui:` directives in `text`.
pub fn directives(text: &str) -> Directives<'_, 'static> {
    Directives::new(text, crate::parser::default_finder())
}
