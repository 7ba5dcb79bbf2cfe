//! Pulls conversation ids and lists out of the envelopes the inbox service
//! returns. List and create responses wrap their payload differently depending
//! on the endpoint version, so each lookup is an ordered list of paths and the
//! first structural hit wins.

use serde_json::Value;

use crate::ids::normalize_id;
use crate::pairing::ConversationRecord;

const ID_KEYS: [&str; 3] = ["id", "ID", "conversation_id"];

const CONVERSATION_LIST_PATHS: [&[&str]; 5] = [
    &["conversations"],
    &["data", "conversations"],
    &["data", "data", "conversations"],
    &["data", "data"],
    &["data"],
];

pub fn extract_conversation_id(response: &Value) -> Option<String> {
    let data = response.get("data");
    ID_KEYS
        .iter()
        .map(|key| response.get(*key))
        .chain(ID_KEYS.iter().map(|key| data.and_then(|d| d.get(*key))))
        .flatten()
        .find_map(normalize_id)
}

/// The first path holding an array wins, even when that array is empty.
pub fn extract_conversations(response: &Value) -> Vec<ConversationRecord> {
    CONVERSATION_LIST_PATHS
        .iter()
        .find_map(|path| lookup(response, path).and_then(Value::as_array))
        .map(|items| items.iter().filter_map(ConversationRecord::from_value).collect())
        .unwrap_or_default()
}

fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, key| current.get(*key))
}
