//! C Foreign Function Interface for the chat widget segmenter.
//!
//! Every segmentation result crosses the boundary as a NUL-terminated JSON
//! string in the shape the UI layer consumes:
//!
//! ```json
//! {"segments": [{"type": "text", "content": "..."}], "hasWidgets": false, "hasPendingWidget": false}
//! ```
//!
//! # Safety
//!
//! String arguments must be NULL or valid NUL-terminated strings. Strings
//! returned by this library must be released with
//! `chatwidget_string_free`, handles with their matching `_destroy`.
//! NULL or non-UTF-8 input yields a NULL result.
//!
//! # Example (C)
//!
//! ```c
//! ChatwidgetStream* stream = chatwidget_stream_new();
//! char* json = chatwidget_stream_push(stream, "Here: @ui:card[{\"ti");
//! chatwidget_string_free(json);
//! json = chatwidget_stream_push(stream, "tle\": \"Hi\"}]");
//! render(json);
//! chatwidget_string_free(json);
//! chatwidget_stream_destroy(stream);
//! ```

#![allow(unsafe_op_in_unsafe_fn)]
#![allow(clippy::missing_safety_doc)]
#![allow(clippy::not_unsafe_ptr_arg_deref)]

use chatwidget_core::{MessageStream, ParsedContent, ParserConfig, WidgetParser};
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;
use tracing::debug;

// =============================================================================
// Opaque Handle Types
// =============================================================================

/// Opaque handle to a configured parser.
pub struct ChatwidgetParser(WidgetParser);

/// Opaque handle to one streaming assistant message.
pub struct ChatwidgetStream(MessageStream);

// =============================================================================
// String Helpers
// =============================================================================

unsafe fn borrow_str<'a>(text: *const c_char) -> Option<&'a str> {
    if text.is_null() {
        return None;
    }
    match CStr::from_ptr(text).to_str() {
        Ok(s) => Some(s),
        Err(e) => {
            debug!(error = %e, "rejected non-UTF-8 input");
            None
        }
    }
}

fn into_c_string(text: String) -> *mut c_char {
    // Interior NULs cannot occur in serde_json output, but prose may carry one.
    match CString::new(text) {
        Ok(s) => s.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

fn content_to_json(content: &ParsedContent) -> *mut c_char {
    match serde_json::to_string(content) {
        Ok(json) => into_c_string(json),
        Err(e) => {
            debug!(error = %e, "failed to serialize parsed content");
            ptr::null_mut()
        }
    }
}

/// Free a string returned by this library.
#[no_mangle]
pub unsafe extern "C" fn chatwidget_string_free(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

// =============================================================================
// Stateless Functions
// =============================================================================

/// Segment a buffer with the default configuration. Returns JSON.
#[no_mangle]
pub unsafe extern "C" fn chatwidget_parse(buffer: *const c_char) -> *mut c_char {
    match borrow_str(buffer) {
        Some(buffer) => content_to_json(&chatwidget_core::parse(buffer)),
        None => ptr::null_mut(),
    }
}

/// True if the text contains the directive token. NULL yields false.
#[no_mangle]
pub unsafe extern "C" fn chatwidget_contains_widgets(text: *const c_char) -> bool {
    borrow_str(text).is_some_and(chatwidget_core::contains_widgets)
}

/// Remove every complete directive, keeping the surrounding prose.
#[no_mangle]
pub unsafe extern "C" fn chatwidget_strip_widgets(text: *const c_char) -> *mut c_char {
    match borrow_str(text) {
        Some(text) => into_c_string(chatwidget_core::strip_widgets(text)),
        None => ptr::null_mut(),
    }
}

// =============================================================================
// Parser Functions
// =============================================================================

/// Create a parser from a JSON configuration, or the default configuration
/// when `config_json` is NULL.
///
/// Returns NULL if the configuration is invalid.
#[no_mangle]
pub unsafe extern "C" fn chatwidget_parser_new(config_json: *const c_char) -> *mut ChatwidgetParser {
    let config = if config_json.is_null() {
        ParserConfig::default()
    } else {
        let Some(json) = borrow_str(config_json) else {
            return ptr::null_mut();
        };
        match ParserConfig::from_json(json) {
            Ok(config) => config,
            Err(e) => {
                debug!(error = %e, "rejected parser configuration");
                return ptr::null_mut();
            }
        }
    };

    match WidgetParser::with_config(config) {
        Ok(parser) => Box::into_raw(Box::new(ChatwidgetParser(parser))),
        Err(e) => {
            debug!(error = %e, "rejected parser configuration");
            ptr::null_mut()
        }
    }
}

/// Segment a buffer with a configured parser. Returns JSON.
#[no_mangle]
pub unsafe extern "C" fn chatwidget_parser_parse(
    parser: *const ChatwidgetParser,
    buffer: *const c_char,
) -> *mut c_char {
    if parser.is_null() {
        return ptr::null_mut();
    }
    match borrow_str(buffer) {
        Some(buffer) => content_to_json(&(*parser).0.parse(buffer)),
        None => ptr::null_mut(),
    }
}

/// Destroy a parser.
#[no_mangle]
pub unsafe extern "C" fn chatwidget_parser_destroy(parser: *mut ChatwidgetParser) {
    if !parser.is_null() {
        drop(Box::from_raw(parser));
    }
}

// =============================================================================
// Stream Functions
// =============================================================================

/// Create a message stream using the default configuration.
#[no_mangle]
pub extern "C" fn chatwidget_stream_new() -> *mut ChatwidgetStream {
    Box::into_raw(Box::new(ChatwidgetStream(MessageStream::new())))
}

/// Append a delta and return the segmentation of the full buffer as JSON.
///
/// Returns NULL once the stream has completed.
#[no_mangle]
pub unsafe extern "C" fn chatwidget_stream_push(
    stream: *mut ChatwidgetStream,
    delta: *const c_char,
) -> *mut c_char {
    if stream.is_null() {
        return ptr::null_mut();
    }
    let Some(delta) = borrow_str(delta) else {
        return ptr::null_mut();
    };
    match (*stream).0.push(delta) {
        Ok(content) => content_to_json(content),
        Err(e) => {
            debug!(error = %e, "push rejected");
            ptr::null_mut()
        }
    }
}

/// Finish the stream and return the settled segmentation as JSON.
#[no_mangle]
pub unsafe extern "C" fn chatwidget_stream_complete(stream: *mut ChatwidgetStream) -> *mut c_char {
    if stream.is_null() {
        return ptr::null_mut();
    }
    match (*stream).0.complete() {
        Ok(content) => content_to_json(content),
        Err(e) => {
            debug!(error = %e, "complete rejected");
            ptr::null_mut()
        }
    }
}

/// Destroy a message stream.
#[no_mangle]
pub unsafe extern "C" fn chatwidget_stream_destroy(stream: *mut ChatwidgetStream) {
    if !stream.is_null() {
        drop(Box::from_raw(stream));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    /// Take ownership of a returned string and parse it as JSON.
    unsafe fn take_json(s: *mut c_char) -> Value {
        assert!(!s.is_null());
        let json: Value = serde_json::from_str(CStr::from_ptr(s).to_str().unwrap()).unwrap();
        chatwidget_string_free(s);
        json
    }

    #[test]
    fn test_parse_returns_segments() {
        let input = CString::new(r#"Hi @ui:card[{"title": "T"}]"#).unwrap();
        unsafe {
            let json = take_json(chatwidget_parse(input.as_ptr()));
            assert_eq!(json["hasWidgets"], true);
            assert_eq!(json["segments"][0]["type"], "text");
            assert_eq!(json["segments"][1]["widgetType"], "card");
            assert_eq!(json["segments"][1]["props"]["title"], "T");
        }
    }

    #[test]
    fn test_null_input() {
        unsafe {
            assert!(chatwidget_parse(ptr::null()).is_null());
            assert!(chatwidget_strip_widgets(ptr::null()).is_null());
            assert!(!chatwidget_contains_widgets(ptr::null()));
            assert!(chatwidget_parser_parse(ptr::null(), ptr::null()).is_null());
            assert!(chatwidget_stream_push(ptr::null_mut(), ptr::null()).is_null());
            chatwidget_string_free(ptr::null_mut());
        }
    }

    #[test]
    fn test_invalid_utf8() {
        let bytes = [0x66u8, 0xff, 0x00];
        unsafe {
            assert!(chatwidget_parse(bytes.as_ptr() as *const c_char).is_null());
        }
    }

    #[test]
    fn test_contains_and_strip() {
        let input = CString::new(r#"A @ui:card[{}] B"#).unwrap();
        unsafe {
            assert!(chatwidget_contains_widgets(input.as_ptr()));
            let stripped = chatwidget_strip_widgets(input.as_ptr());
            assert_eq!(CStr::from_ptr(stripped).to_str().unwrap(), "A\n\nB");
            chatwidget_string_free(stripped);
        }
    }

    #[test]
    fn test_parser_with_config() {
        let config = CString::new(r#"{"directiveToken": "%w:"}"#).unwrap();
        let input = CString::new(r#"%w:card[{"a": 1}]"#).unwrap();
        unsafe {
            let parser = chatwidget_parser_new(config.as_ptr());
            assert!(!parser.is_null());
            let json = take_json(chatwidget_parser_parse(parser, input.as_ptr()));
            assert_eq!(json["segments"][0]["props"]["a"], 1);
            chatwidget_parser_destroy(parser);
        }
    }

    #[test]
    fn test_parser_rejects_bad_config() {
        let config = CString::new(r#"{"directiveToken": ""}"#).unwrap();
        unsafe {
            assert!(chatwidget_parser_new(config.as_ptr()).is_null());
            let default = chatwidget_parser_new(ptr::null());
            assert!(!default.is_null());
            chatwidget_parser_destroy(default);
        }
    }

    #[test]
    fn test_stream_lifecycle() {
        let first = CString::new(r#"Plan: @ui:card[{"ti"#).unwrap();
        let second = CString::new(r#"tle": "Hi"}]"#).unwrap();
        unsafe {
            let stream = chatwidget_stream_new();

            let json = take_json(chatwidget_stream_push(stream, first.as_ptr()));
            assert_eq!(json["hasPendingWidget"], true);

            let json = take_json(chatwidget_stream_push(stream, second.as_ptr()));
            assert_eq!(json["hasPendingWidget"], false);
            assert_eq!(json["segments"][1]["props"]["title"], "Hi");

            let json = take_json(chatwidget_stream_complete(stream));
            assert_eq!(json["segments"].as_array().unwrap().len(), 2);

            // Closed streams reject further input.
            assert!(chatwidget_stream_push(stream, second.as_ptr()).is_null());
            assert!(chatwidget_stream_complete(stream).is_null());

            chatwidget_stream_destroy(stream);
        }
    }
}
