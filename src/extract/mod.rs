//! Recover an embedded JSON payload from free-form model output.
//!
//! Attempts, first success wins:
//! 1. interior of a ```json fenced block (a missing closing fence is tolerated),
//! 2. bracket-depth scan for the first balanced `{..}` / `[..]` of the wanted
//!    shape, string-literal aware, retrying from the next opener on failure,
//! 3. the whole trimmed text.
//!
//! An array cut off by the model's output limit is salvaged by keeping every
//! complete top-level element seen before the cut. When an opener never
//! closes and cannot be salvaged (a stray bracket in prose), only its direct
//! children are tried; deeper openers belong to a cut-off payload.

use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Object,
    Array,
}

impl Shape {
    fn open(self) -> u8 {
        match self {
            Shape::Object => b'{',
            Shape::Array => b'[',
        }
    }

    fn matches(self, v: &Value) -> bool {
        match self {
            Shape::Object => v.is_object(),
            Shape::Array => v.is_array(),
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Object => write!(f, "object"),
            Shape::Array => write!(f, "array"),
        }
    }
}

/// No recoverable JSON of the wanted shape was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unparseable;

impl fmt::Display for Unparseable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "response contained no recoverable JSON")
    }
}

impl std::error::Error for Unparseable {}

pub fn extract_json(text: &str, shape: Shape) -> Result<Value, Unparseable> {
    if let Some(inner) = fenced_block(text) {
        if let Some(v) = parse_shaped(inner, shape).or_else(|| scan(inner, shape)) {
            return Ok(v);
        }
    }
    if let Some(v) = scan(text, shape) {
        return Ok(v);
    }
    parse_shaped(text, shape).ok_or(Unparseable)
}

fn parse_shaped(s: &str, shape: Shape) -> Option<Value> {
    serde_json::from_str::<Value>(s.trim())
        .ok()
        .filter(|v| shape.matches(v))
}

/// Interior of the first ```json fence; plain ``` fences are accepted too.
fn fenced_block(text: &str) -> Option<&str> {
    let (start, marker_len) = match text.find("```json") {
        Some(i) => (i, "```json".len()),
        None => (text.find("```")?, "```".len()),
    };
    let after = &text[start + marker_len..];
    let end = after.find("```").unwrap_or(after.len());
    Some(after[..end].trim())
}

fn scan(text: &str, shape: Shape) -> Option<Value> {
    let bytes = text.as_bytes();
    let mut from = 0usize;
    while let Some(rel) = bytes[from..].iter().position(|&b| b == shape.open()) {
        let start = from + rel;
        match balanced_span(bytes, start, shape.open()) {
            Span::Closed(end) => {
                if let Some(v) = parse_shaped(&text[start..=end], shape) {
                    return Some(v);
                }
            }
            // every later opener sits inside the unclosed span
            Span::Truncated { last_element_end, children } => {
                let salvaged = match shape {
                    Shape::Array => salvage_array(text, start, last_element_end),
                    Shape::Object => None,
                };
                return salvaged.or_else(|| first_child(text, shape, &children));
            }
            Span::Broken => {}
        }
        from = start + 1;
    }
    None
}

/// Try the direct children of an unclosed opener, in order.
fn first_child(text: &str, shape: Shape, children: &[usize]) -> Option<Value> {
    children.iter().find_map(|&start| match balanced_span(text.as_bytes(), start, shape.open()) {
        Span::Closed(end) => parse_shaped(&text[start..=end], shape),
        Span::Truncated { last_element_end, .. } if shape == Shape::Array => {
            salvage_array(text, start, last_element_end)
        }
        _ => None,
    })
}

enum Span {
    Closed(usize),
    /// Text ended first. Carries the end offset of the last complete
    /// top-level element, if any, and the offsets of openers of the wanted
    /// kind found directly inside the span.
    Truncated { last_element_end: Option<usize>, children: Vec<usize> },
    /// A closer that does not match its opener.
    Broken,
}

fn balanced_span(bytes: &[u8], start: usize, open: u8) -> Span {
    let mut stack: Vec<u8> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;
    let mut last_element_end = None;
    let mut children = Vec::new();

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
                if stack.len() == 1 {
                    last_element_end = Some(i);
                }
            }
            continue;
        }
        if b == open && stack.len() == 1 {
            children.push(i);
        }
        match b {
            b'"' => in_string = true,
            b'{' => stack.push(b'}'),
            b'[' => stack.push(b']'),
            b'}' | b']' => {
                if stack.pop() != Some(b) {
                    return Span::Broken;
                }
                if stack.is_empty() {
                    return Span::Closed(i);
                }
                if stack.len() == 1 {
                    last_element_end = Some(i);
                }
            }
            _ => {}
        }
    }
    Span::Truncated { last_element_end, children }
}

fn salvage_array(text: &str, start: usize, last_element_end: Option<usize>) -> Option<Value> {
    let end = last_element_end?;
    let repaired = format!("{}]", &text[start..=end]);
    let v = parse_shaped(&repaired, Shape::Array)?;
    tracing::debug!(
        elements = v.as_array().map(Vec::len).unwrap_or(0),
        "salvaged truncated array"
    );
    Some(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fenced_block_inside_prose() {
        let text = "Here is your plan:\n```json\n[{\"a\":1}]\n```\nEnjoy!";
        assert_eq!(extract_json(text, Shape::Array), Ok(json!([{"a": 1}])));
        let other = "Sure thing.\n```json\n[{\"a\":1}]\n```\nAnything else?";
        assert_eq!(extract_json(other, Shape::Array), extract_json(text, Shape::Array));
    }

    #[test]
    fn bare_fence_and_unclosed_fence() {
        assert_eq!(extract_json("```\n{\"x\": 2}\n```", Shape::Object), Ok(json!({"x": 2})));
        assert_eq!(extract_json("```json\n{\"x\": 3}", Shape::Object), Ok(json!({"x": 3})));
    }

    #[test]
    fn raw_json_without_wrapping() {
        assert_eq!(extract_json("  [1, 2]  ", Shape::Array), Ok(json!([1, 2])));
    }

    #[test]
    fn nested_braces_in_strings_do_not_end_the_span() {
        let text = r#"ok: {"name": "Treino {A}", "inner": {"k": "]"}} trailing }"#;
        assert_eq!(
            extract_json(text, Shape::Object),
            Ok(json!({"name": "Treino {A}", "inner": {"k": "]"}}))
        );
    }

    #[test]
    fn skips_prose_braces_before_payload() {
        let text = r#"Format is {like this}. Result: {"total_calories": 1800}"#;
        assert_eq!(extract_json(text, Shape::Object), Ok(json!({"total_calories": 1800})));
    }

    #[test]
    fn escaped_quotes_are_handled() {
        let text = r#"[{"d": "say \"hi\" ]"}]"#;
        assert_eq!(extract_json(text, Shape::Array), Ok(json!([{"d": "say \"hi\" ]"}])));
    }

    #[test]
    fn wrong_shape_is_unparseable() {
        assert_eq!(extract_json(r#"{"a": 1}"#, Shape::Array), Err(Unparseable));
        assert_eq!(extract_json("no json here", Shape::Object), Err(Unparseable));
        assert_eq!(extract_json("", Shape::Array), Err(Unparseable));
    }

    #[test]
    fn truncated_array_keeps_complete_elements() {
        let text = r#"[{"name": "A", "reps": 10}, {"name": "B", "reps": 12}, {"name": "C", "re"#;
        assert_eq!(
            extract_json(text, Shape::Array),
            Ok(json!([{"name": "A", "reps": 10}, {"name": "B", "reps": 12}]))
        );
    }

    #[test]
    fn truncated_array_of_strings() {
        let text = r#"["Correr 5 km", "Beber água", "Dormir 8 ho"#;
        assert_eq!(extract_json(text, Shape::Array), Ok(json!(["Correr 5 km", "Beber água"])));
    }

    #[test]
    fn truncated_first_element_does_not_surface_inner_arrays() {
        let text = r#"[{"name": "Treino A", "exercises": [{"name": "Supino"}], "descr"#;
        assert_eq!(extract_json(text, Shape::Array), Err(Unparseable));
    }

    #[test]
    fn mismatched_prose_brackets_are_skipped() {
        let text = r#"Options [a} then ["x", "y"]"#;
        assert_eq!(extract_json(text, Shape::Array), Ok(json!(["x", "y"])));
    }

    #[test]
    fn truncated_object_is_unparseable() {
        assert_eq!(extract_json(r#"{"name": "x", "meals": [{"#, Shape::Object), Err(Unparseable));
    }

    #[test]
    fn array_wrapped_in_an_object_is_unwrapped() {
        let text = r#"{"workouts": [{"name": "A"}]}"#;
        assert_eq!(extract_json(text, Shape::Array), Ok(json!([{"name": "A"}])));
    }

    #[test]
    fn stray_unclosed_bracket_does_not_hide_the_payload() {
        let text = r#"Segue o plano (ver [1: [{"name": "Treino A"}]"#;
        assert_eq!(extract_json(text, Shape::Array), Ok(json!([{"name": "Treino A"}])));
    }
}
