use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

static CONVERSATION_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[1-5][0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$")
        .expect("valid conversation id regex")
});

/// Returns the trimmed string when `value` is a non-empty JSON string.
///
/// Numbers, objects, `null` and whitespace-only strings are never ids.
pub fn normalize_id(value: &Value) -> Option<String> {
    value.as_str().and_then(normalize_str)
}

pub fn normalize_str(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// UUID v1-v5 shape check. Only ids passing this are handed to callers.
pub fn is_conversation_id(value: &str) -> bool {
    CONVERSATION_ID_RE.is_match(value)
}

// Keeps the first spelling of each id; later case variants are dropped.
pub fn unique_ids<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for value in values {
        let Some(normalized) = normalize_str(value.as_ref()) else {
            continue;
        };
        if seen.insert(normalized.to_lowercase()) {
            out.push(normalized);
        }
    }
    out
}

pub fn intersects(a: &[String], b: &[String]) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    let lowered: HashSet<String> = a.iter().map(|value| value.to_lowercase()).collect();
    b.iter().any(|value| lowered.contains(&value.to_lowercase()))
}
