//! Pulling JSON out of free-form model text.
//!
//! Models asked for JSON often wrap it in a fenced code block or add a
//! sentence before or after. [`extract_json`] finds the payload and
//! [`parse_model_json`] decodes it.

use std::sync::LazyLock;

use regex::Regex;
use serde::de::DeserializeOwned;

use crate::error::AiError;

static FENCED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json|JSON)?\s*\n?(.*?)```").expect("valid regex")
});

/// Return the JSON object or array embedded in `text`, if any.
///
/// Prefers the contents of a fenced code block; otherwise scans for the
/// first balanced `{...}` or `[...]`, honouring string literals.
pub fn extract_json(text: &str) -> Option<&str> {
    if let Some(inner) = FENCED.captures(text).and_then(|c| c.get(1)) {
        if let Some(found) = balanced(inner.as_str()) {
            return Some(found);
        }
    }
    balanced(text)
}

/// Decode the JSON payload in `text` into `T`.
pub fn parse_model_json<T: DeserializeOwned>(text: &str) -> Result<T, AiError> {
    let raw = extract_json(text)
        .ok_or_else(|| AiError::InvalidOutput("no JSON found in model reply".into()))?;
    serde_json::from_str(raw).map_err(|e| AiError::InvalidOutput(e.to_string()))
}

fn balanced(text: &str) -> Option<&str> {
    let start = text.find(['{', '['])?;
    let bytes = text.as_bytes();
    let mut stack: Vec<u8> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &b) in bytes[start..].iter().enumerate() {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => stack.push(b'}'),
            b'[' => stack.push(b']'),
            b'}' | b']' => {
                if stack.pop() != Some(b) {
                    return None;
                }
                if stack.is_empty() {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn bare_object() {
        assert_eq!(extract_json(r#"{"a":1}"#), Some(r#"{"a":1}"#));
    }

    #[test]
    fn fenced_block_with_prose() {
        let text = "Here you go:\n```json\n[{\"a\": 1}]\n```\nAnything else?";
        assert_eq!(extract_json(text), Some("[{\"a\": 1}]"));
    }

    #[test]
    fn object_inside_prose() {
        let text = "Sure. {\"face\": \"oval {soft}\", \"n\": [1, 2]} Hope that helps.";
        assert_eq!(
            extract_json(text),
            Some("{\"face\": \"oval {soft}\", \"n\": [1, 2]}")
        );
    }

    #[test]
    fn escaped_quotes_in_strings() {
        let text = r#"{"line": "she said \"}\" loudly"}"#;
        assert_eq!(extract_json(text), Some(text));
    }

    #[test]
    fn unbalanced_is_none() {
        assert_eq!(extract_json("{\"a\": [1, 2}"), None);
        assert_eq!(extract_json("no json here"), None);
    }

    #[test]
    fn parse_model_json_reports_invalid_output() {
        #[derive(serde::Deserialize, Debug)]
        struct Shape {
            #[allow(dead_code)]
            a: u32,
        }
        assert_matches!(
            parse_model_json::<Shape>("nothing"),
            Err(AiError::InvalidOutput(_))
        );
        assert_matches!(
            parse_model_json::<Shape>("{\"b\": 1}"),
            Err(AiError::InvalidOutput(_))
        );
        assert_eq!(parse_model_json::<Shape>("```\n{\"a\": 3}\n```").unwrap().a, 3);
    }
}
