//! Negated-cancel detection.
//!
//! Phrases such as "don't cancel" or "keep the order" must never be read as a
//! cancellation request, whatever a model proposes.

use once_cell::sync::Lazy;
use regex::Regex;

const PATTERNS: [&str; 9] = [
    r"\b(no need to\s+cancel)\b",
    r"\b(don'?t\s+cancel)\b",
    r"\b(do\s+not\s+cancel)\b",
    r"\b(no\s+cancel)\b",
    r"\b(not\s+cancel)\b",
    r"\b(never\s+cancel)\b",
    r"\b(keep\s+the\s+order)\b",
    r"\b(i\s+want\s+the\s+order)\b",
    r"\b(cancel\s+isn'?t\s+needed)\b",
];

static NEGATED_CANCEL: Lazy<Vec<Regex>> = Lazy::new(|| {
    PATTERNS
        .iter()
        .map(|p| Regex::new(p).expect("negated-cancel pattern is valid"))
        .collect()
});

/// True if the text says *not* to cancel.
pub fn is_negated_cancel(text: &str) -> bool {
    let lowercase = text.to_lowercase().replace('’', "'");
    NEGATED_CANCEL.iter().any(|re| re.is_match(&lowercase))
}
