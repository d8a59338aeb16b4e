//! Text extraction helpers.
//!
//! Pulls order ids, login phones, proposed addresses and embedded JSON out of
//! free-form text, both user messages and model replies.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::domain::foundation::OrderId;

/// Errors from pulling a plan out of a model reply.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlanParseError {
    #[error("No JSON object found in reply")]
    NoJsonObject,

    #[error("JSON object starting at byte {start} is never closed")]
    Unbalanced { start: usize },

    #[error("JSON parse error: {0}")]
    ParseError(String),
}

static ORDER_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bORD\d{5}\b").expect("order id pattern is valid"));

static ADDRESS_TARGET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)\baddress\b.*?\bto\s+(.+)$").expect("address pattern is valid")
});

/// First `ORD#####` id mentioned in the text, normalized to upper case.
pub fn extract_order_id(text: &str) -> Option<OrderId> {
    ORDER_ID_RE
        .find(text)
        .and_then(|m| OrderId::new(m.as_str()).ok())
}

/// Accepts input containing exactly ten digits, ignoring any other
/// characters, and returns those digits.
pub fn normalize_login_phone(input: &str) -> Option<String> {
    let digits: String = input.chars().filter(|c| c.is_ascii_digit()).collect();
    (digits.len() == 10).then_some(digits)
}

/// The text after "to" in an address-change request, e.g.
/// "change address for ORD10015 to 12 Park Lane, Mumbai".
pub fn extract_new_address(text: &str) -> Option<String> {
    let caps = ADDRESS_TARGET_RE.captures(text)?;
    let address = caps
        .get(1)?
        .as_str()
        .trim()
        .trim_end_matches(['.', '!', '?'])
        .trim();
    (!address.is_empty()).then(|| address.to_string())
}

/// Returns the first balanced `{...}` object in `text`.
///
/// Braces inside JSON strings (including escaped quotes) are ignored, so
/// prose before or after the object and fenced code blocks are tolerated.
pub fn extract_json_object(text: &str) -> Result<&str, PlanParseError> {
    let start = text.find('{').ok_or(PlanParseError::NoJsonObject)?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (offset, c) in text[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match c {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            _ if in_string => {}
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Ok(&text[start..start + offset + c.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    Err(PlanParseError::Unbalanced { start })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_patterns_compile() {
        Lazy::force(&ORDER_ID_RE);
        Lazy::force(&ADDRESS_TARGET_RE);
    }

    mod order_ids {
        use super::*;

        #[test]
        fn finds_first_id_case_insensitively() {
            let id = extract_order_id("is ord10015 or ORD10020 shipped?").unwrap();
            assert_eq!(id.as_str(), "ORD10015");
        }

        #[test]
        fn ignores_ids_with_wrong_length() {
            assert!(extract_order_id("ORD1001 and ORD100155").is_none());
            assert!(extract_order_id("no id here").is_none());
        }
    }

    mod phones {
        use super::*;

        #[test]
        fn accepts_ten_digits_with_separators() {
            assert_eq!(normalize_login_phone("98765-43210").as_deref(), Some("9876543210"));
            assert_eq!(normalize_login_phone(" (987) 654 3210 ").as_deref(), Some("9876543210"));
        }

        #[test]
        fn rejects_other_lengths() {
            assert!(normalize_login_phone("987654321").is_none());
            assert!(normalize_login_phone("+91 9876543210").is_none());
            assert!(normalize_login_phone("").is_none());
        }
    }

    mod addresses {
        use super::*;

        #[test]
        fn takes_text_after_to() {
            let addr = extract_new_address("change address for ORD10015 to 12 Park Lane, Mumbai.");
            assert_eq!(addr.as_deref(), Some("12 Park Lane, Mumbai"));
        }

        #[test]
        fn needs_a_destination() {
            assert!(extract_new_address("change my address").is_none());
            assert!(extract_new_address("ship to Pune").is_none());
        }
    }

    mod json {
        use super::*;

        #[test]
        fn extracts_object_surrounded_by_prose() {
            let raw = "Sure! Here is the plan:\n```json\n{\"intent\": \"track\", \"actions\": []}\n```\nDone.";
            assert_eq!(
                extract_json_object(raw).unwrap(),
                "{\"intent\": \"track\", \"actions\": []}"
            );
        }

        #[test]
        fn handles_nested_objects_and_braces_in_strings() {
            let raw = r#"{"notes": "use {braces} and \"quotes\"", "inner": {"a": 1}} trailing }"#;
            let obj = extract_json_object(raw).unwrap();
            assert!(obj.ends_with("{\"a\": 1}}"));
            assert!(serde_json::from_str::<serde_json::Value>(obj).is_ok());
        }

        #[test]
        fn stops_at_first_object() {
            let raw = "{\"a\": 1} {\"b\": 2}";
            assert_eq!(extract_json_object(raw).unwrap(), "{\"a\": 1}");
        }

        #[test]
        fn handles_multibyte_text() {
            let raw = "Voilà → {\"notes\": \"café — ok\"}";
            assert_eq!(extract_json_object(raw).unwrap(), "{\"notes\": \"café — ok\"}");
        }

        #[test]
        fn reports_missing_and_unbalanced() {
            assert_eq!(extract_json_object("no json"), Err(PlanParseError::NoJsonObject));
            assert_eq!(
                extract_json_object("x {\"a\": {\"b\": 1}"),
                Err(PlanParseError::Unbalanced { start: 2 })
            );
        }
    }
}
