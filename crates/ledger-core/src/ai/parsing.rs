//! JSON parsing helpers for AI backend responses
//!
//! Models often wrap the JSON payload in code fences or add a sentence
//! before/after it, so the array is located by its outermost brackets.

use serde_json::Value;
use tracing::debug;

use super::types::{ExtractionError, RawTransaction};

/// Longest raw excerpt carried in an error message (in characters)
const RAW_EXCERPT_LEN: usize = 200;

/// Parse the transaction array out of a completion's content
///
/// Blank content means no transactions. Content that is not JSON is
/// `MalformedJson`; JSON that is not an array is `SchemaMismatch`. Elements
/// are read leniently: an element that is not an object becomes an empty
/// record, which validation then rejects.
pub fn parse_transactions_response(
    response: &str,
) -> Result<Vec<RawTransaction>, ExtractionError> {
    let response = response.trim();
    if response.is_empty() {
        return Ok(Vec::new());
    }

    let start = response.find('[');
    let end = response.rfind(']');

    let json_str = match (start, end) {
        (Some(s), Some(e)) if s < e => &response[s..=e],
        _ => {
            // Valid JSON without an array (e.g. a bare object) is the wrong shape
            if serde_json::from_str::<Value>(response).is_ok() {
                return Err(ExtractionError::SchemaMismatch(format!(
                    "expected a JSON array | Raw: {}",
                    excerpt(response)
                )));
            }
            return Err(ExtractionError::MalformedJson(format!(
                "No JSON array found in AI response | Raw: {}",
                excerpt(response)
            )));
        }
    };

    let value: Value = serde_json::from_str(json_str).map_err(|e| {
        ExtractionError::MalformedJson(format!("{} | Raw: {}", e, excerpt(json_str)))
    })?;

    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(ExtractionError::SchemaMismatch(format!(
                "expected a JSON array, got {}",
                type_name(&other)
            )))
        }
    };

    Ok(items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            if !item.is_object() {
                debug!(element = i, kind = type_name(&item), "Non-object element in AI array");
                return RawTransaction::default();
            }
            serde_json::from_value(item).unwrap_or_else(|e| {
                debug!(element = i, error = %e, "Unreadable element in AI array");
                RawTransaction::default()
            })
        })
        .collect())
}

/// Truncate long responses for error messages
fn excerpt(text: &str) -> String {
    if text.chars().count() > RAW_EXCERPT_LEN {
        let head: String = text.chars().take(RAW_EXCERPT_LEN).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_array() {
        let response = r#"[{"date": "2024-01-12", "description": "Zomato", "amount": 450, "type": "expense", "category": "Food & Dining"}]"#;
        let result = parse_transactions_response(response).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].description.as_deref(), Some("Zomato"));
        assert_eq!(result[0].category.as_deref(), Some("Food & Dining"));
    }

    #[test]
    fn test_parse_with_code_fence_and_prose() {
        let response = "Here are the transactions:\n```json\n[{\"date\": \"2024-01-12\", \"amount\": 1}]\n```\nLet me know!";
        let result = parse_transactions_response(response).unwrap();
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_parse_empty_array() {
        assert!(parse_transactions_response("[]").unwrap().is_empty());
    }

    #[test]
    fn test_non_json_is_malformed() {
        let err = parse_transactions_response("I could not find any transactions.").unwrap_err();
        assert!(matches!(err, ExtractionError::MalformedJson(_)));

        let err = parse_transactions_response("[not json at all]").unwrap_err();
        assert!(matches!(err, ExtractionError::MalformedJson(_)));
    }

    #[test]
    fn test_object_instead_of_array_is_schema_mismatch() {
        let err = parse_transactions_response(r#"{"transactions": 3}"#).unwrap_err();
        assert!(matches!(err, ExtractionError::SchemaMismatch(_)));
    }

    #[test]
    fn test_blank_content_is_no_transactions() {
        assert!(parse_transactions_response("").unwrap().is_empty());
        assert!(parse_transactions_response(" \n ").unwrap().is_empty());
    }

    #[test]
    fn test_scalar_elements_become_empty_records() {
        let result = parse_transactions_response("[1, \"two\", null]").unwrap();
        assert_eq!(result, vec![RawTransaction::default(); 3]);
    }

    #[test]
    fn test_wrong_field_type_keeps_the_rest_of_the_array() {
        let response = r#"[
            {"date": "2024-01-12", "description": 5, "amount": 450},
            {"date": "2024-01-13", "description": "Uber", "amount": 312.4}
        ]"#;
        let result = parse_transactions_response(response).unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].date.as_deref(), Some("2024-01-12"));
        assert_eq!(result[0].description, None);
        assert_eq!(result[1].description.as_deref(), Some("Uber"));
    }

    #[test]
    fn test_long_raw_excerpt_truncated() {
        let long = "x".repeat(500);
        match parse_transactions_response(&long).unwrap_err() {
            ExtractionError::MalformedJson(msg) => assert!(msg.len() < 300),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
