use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::extract::extract_conversation_id;
use crate::ids::unique_ids;

/// The two sides a conversation is opened between.
///
/// Sent verbatim as the start-conversation request body; absent profile ids
/// are omitted rather than sent as `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartConversationPayload {
    pub household_user_id: String,
    pub househelp_user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub household_profile_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub househelp_profile_id: Option<String>,
}

impl StartConversationPayload {
    pub fn new(household_user_id: impl Into<String>, househelp_user_id: impl Into<String>) -> Self {
        Self {
            household_user_id: household_user_id.into(),
            househelp_user_id: househelp_user_id.into(),
            household_profile_id: None,
            househelp_profile_id: None,
        }
    }

    pub fn with_profiles(
        mut self,
        household_profile_id: impl Into<String>,
        househelp_profile_id: impl Into<String>,
    ) -> Self {
        self.household_profile_id = Some(household_profile_id.into());
        self.househelp_profile_id = Some(househelp_profile_id.into());
        self
    }
}

/// Every identifier the backend used for one side of a conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyIds {
    pub user_ids: Vec<String>,
    pub profile_ids: Vec<String>,
}

/// Read-only view of a listed conversation, rebuilt from the raw JSON on every
/// call. `id` is only the extracted string; it is not UUID-checked here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationRecord {
    pub id: Option<String>,
    pub household: PartyIds,
    pub househelp: PartyIds,
}

#[derive(Clone, Copy)]
enum Side {
    Household,
    Househelp,
}

impl Side {
    fn nested_key(self) -> &'static str {
        match self {
            Side::Household => "household",
            Side::Househelp => "househelp",
        }
    }

    fn user_keys(self) -> [&'static str; 4] {
        match self {
            Side::Household => [
                "household_user_id",
                "householdUserId",
                "household_id",
                "householdId",
            ],
            Side::Househelp => [
                "househelp_user_id",
                "househelpUserId",
                "househelp_id",
                "househelpId",
            ],
        }
    }

    fn profile_keys(self) -> [&'static str; 2] {
        match self {
            Side::Household => ["household_profile_id", "householdProfileId"],
            Side::Househelp => ["househelp_profile_id", "househelpProfileId"],
        }
    }
}

impl ConversationRecord {
    /// Builds a record from one element of a list response. Returns `None`
    /// when the element is not a JSON object.
    pub fn from_value(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        Some(Self {
            id: extract_conversation_id(value),
            household: party_ids(value, Side::Household),
            househelp: party_ids(value, Side::Househelp),
        })
    }
}

fn party_ids(value: &Value, side: Side) -> PartyIds {
    let nested = value.get(side.nested_key());

    let mut user_ids: Vec<&str> = side
        .user_keys()
        .iter()
        .filter_map(|key| value.get(*key).and_then(Value::as_str))
        .collect();
    user_ids.extend(
        ["user_id", "userId"]
            .iter()
            .filter_map(|key| nested.and_then(|n| n.get(*key)).and_then(Value::as_str)),
    );

    let mut profile_ids: Vec<&str> = side
        .profile_keys()
        .iter()
        .filter_map(|key| value.get(*key).and_then(Value::as_str))
        .collect();
    if let Some(id) = nested.and_then(|n| n.get("id")).and_then(Value::as_str) {
        profile_ids.push(id);
    }

    PartyIds {
        user_ids: unique_ids(user_ids),
        profile_ids: unique_ids(profile_ids),
    }
}
