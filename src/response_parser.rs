//! JSON extraction from language-model output
//!
//! Models asked for "JSON only" still wrap it in ```json fences or add a
//! sentence before/after. This module strips the fence and pulls out one
//! JSON object. It does not check field names; the routers do that when
//! deserializing into their analysis structs.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::ParseError;

/// How to locate the object inside the response text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonExtraction {
    /// Scan for brace-balanced spans (string-aware) and take the first one
    /// that parses as an object. Prose containing stray `{}` is skipped.
    #[default]
    Balanced,
    /// Take everything from the first `{` to the last `}`. A brace in
    /// trailing prose corrupts the span.
    Greedy,
}

/// Extract and parse the JSON object in a model response
pub fn parse_json_object(raw: &str, mode: JsonExtraction) -> Result<Map<String, Value>, ParseError> {
    let text = strip_code_fence(raw);

    let result = match mode {
        JsonExtraction::Balanced => parse_balanced(raw, text),
        JsonExtraction::Greedy => parse_greedy(raw, text),
    };

    match &result {
        Ok(object) => debug!("Parsed LLM JSON with {} fields", object.len()),
        Err(e) => warn!("LLM JSON parsing failed: {}\nraw response:\n{}", e, raw),
    }
    result
}

/// Strip a leading ```/```json fence and a trailing ``` fence
pub fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = match rest.get(..4) {
        Some(tag) if tag.eq_ignore_ascii_case("json") => &rest[4..],
        _ => rest,
    };
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

fn parse_greedy(raw: &str, text: &str) -> Result<Map<String, Value>, ParseError> {
    let span = match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if end > start => &text[start..=end],
        _ => return Err(no_object(raw)),
    };
    parse_object(raw, span)
}

fn parse_balanced(raw: &str, text: &str) -> Result<Map<String, Value>, ParseError> {
    let mut first_error = None;
    for span in balanced_spans(text) {
        match parse_object(raw, span) {
            Ok(object) => return Ok(object),
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }
    }
    Err(first_error.unwrap_or_else(|| no_object(raw)))
}

fn parse_object(raw: &str, span: &str) -> Result<Map<String, Value>, ParseError> {
    serde_json::from_str::<Map<String, Value>>(span).map_err(|source| ParseError::InvalidJson {
        raw: raw.to_string(),
        source,
    })
}

fn no_object(raw: &str) -> ParseError {
    ParseError::NoJsonObject {
        raw: raw.to_string(),
    }
}

/// Every `{...}` span with balanced braces, ordered by where it opens.
///
/// An enclosing span comes before the spans nested inside it, so a wrapper
/// that doesn't parse (`{{"a": 1}}`) still yields its inner object. Braces
/// inside JSON string literals don't count. Unclosed spans are dropped.
fn balanced_spans(text: &str) -> Vec<&str> {
    let mut spans = Vec::new();
    let mut open = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (idx, ch) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' if !open.is_empty() => in_string = true,
            '{' => open.push(idx),
            '}' => {
                if let Some(start) = open.pop() {
                    spans.push((start, &text[start..=idx]));
                }
            }
            _ => {}
        }
    }

    // closing order puts inner spans first; parse outermost first
    spans.sort_by_key(|(start, _)| *start);
    spans.into_iter().map(|(_, span)| span).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(raw: &str) -> Result<Value, ParseError> {
        parse_json_object(raw, JsonExtraction::Balanced).map(Value::Object)
    }

    fn parse_greedy(raw: &str) -> Result<Value, ParseError> {
        parse_json_object(raw, JsonExtraction::Greedy).map(Value::Object)
    }

    #[test]
    fn test_fenced_json() {
        assert_eq!(parse("```json\n{\"a\":1}\n```").unwrap(), json!({"a": 1}));
        assert_eq!(parse_greedy("```json\n{\"a\":1}\n```").unwrap(), json!({"a": 1}));
        assert_eq!(parse("```\n{\"a\":1}\n```").unwrap(), json!({"a": 1}));
        assert_eq!(parse("```JSON {\"a\":1} ```").unwrap(), json!({"a": 1}));
    }

    #[test]
    fn test_plain_json() {
        assert_eq!(
            parse(r#"  {"is_movie_related": true, "weather": null}  "#).unwrap(),
            json!({"is_movie_related": true, "weather": null})
        );
    }

    #[test]
    fn test_prose_around_object() {
        assert_eq!(parse("here you go {\"a\":1} thanks").unwrap(), json!({"a": 1}));
        assert_eq!(parse_greedy("here you go {\"a\":1} thanks").unwrap(), json!({"a": 1}));
    }

    #[test]
    fn test_no_braces_is_error() {
        let err = parse("I can only talk about movies.").unwrap_err();
        assert!(matches!(err, ParseError::NoJsonObject { .. }));
        assert_eq!(err.raw(), "I can only talk about movies.");

        assert!(matches!(
            parse_greedy("no json here").unwrap_err(),
            ParseError::NoJsonObject { .. }
        ));
        assert!(matches!(parse("").unwrap_err(), ParseError::NoJsonObject { .. }));
    }

    #[test]
    fn test_invalid_json_is_error() {
        let err = parse("{\"a\": }").unwrap_err();
        assert!(matches!(err, ParseError::InvalidJson { .. }));
        assert_eq!(err.raw(), "{\"a\": }");
    }

    #[test]
    fn test_unclosed_object_is_error() {
        assert!(matches!(
            parse("{\"a\": 1").unwrap_err(),
            ParseError::NoJsonObject { .. }
        ));
        // a lone closing brace before the opening one is not a span
        assert!(matches!(
            parse_greedy("} then {").unwrap_err(),
            ParseError::NoJsonObject { .. }
        ));
    }

    #[test]
    fn test_nested_objects() {
        assert_eq!(
            parse("result: {\"a\": {\"b\": [1, 2]}, \"c\": \"}\"} done").unwrap(),
            json!({"a": {"b": [1, 2]}, "c": "}"})
        );
    }

    #[test]
    fn test_stray_braces_in_prose() {
        let raw = "Using template {schema}: {\"a\": 1} (see {docs})";
        // balanced skips the unparseable prose spans
        assert_eq!(parse(raw).unwrap(), json!({"a": 1}));
        // greedy spans from the first { to the last } and fails
        assert!(matches!(
            parse_greedy(raw).unwrap_err(),
            ParseError::InvalidJson { .. }
        ));
    }

    #[test]
    fn test_wrapped_object_falls_back_to_inner_span() {
        assert_eq!(parse("{{\"a\":1}}").unwrap(), json!({"a": 1}));
        assert_eq!(
            parse("{ analysis: {\"is_movie_related\": true} }").unwrap(),
            json!({"is_movie_related": true})
        );
        // unclosed wrapper around a complete object
        assert_eq!(parse("{ \"x\": {\"a\": 1}").unwrap(), json!({"a": 1}));
    }

    #[test]
    fn test_multiple_objects_takes_first() {
        assert_eq!(parse("{\"a\":1} {\"b\":2}").unwrap(), json!({"a": 1}));
    }

    #[test]
    fn test_array_is_not_an_object() {
        assert!(parse("[1, 2, 3]").is_err());
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n{}\n```"), "{}");
        assert_eq!(strip_code_fence("  {}  "), "{}");
        assert_eq!(strip_code_fence("```"), "");
    }
}
