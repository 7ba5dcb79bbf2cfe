use serde::Serialize;

use crate::ids::{intersects, unique_ids};
use crate::pairing::{ConversationRecord, StartConversationPayload};

/// Which rule tied a listed conversation to the requested pairing, strongest
/// first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    ProfilePair,
    /// Covers rows whose household profile id was never filled in.
    HousehelpProfileHouseholdUser,
    UserPair,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match<'a> {
    pub record: &'a ConversationRecord,
    pub strategy: MatchStrategy,
}

/// Finds the listed conversation that represents `pairing`.
///
/// Profile ids are the more specific key once a user has had several
/// profiles, so they are tried first; user ids stay as the net for older rows
/// without profile ids. The first strategy that finds a candidate decides the
/// result, even if that candidate has no usable id.
pub fn find_match<'a>(
    pairing: &StartConversationPayload,
    candidates: &'a [ConversationRecord],
) -> Option<Match<'a>> {
    let household_user = unique_ids([pairing.household_user_id.as_str()]);
    let househelp_user = unique_ids([pairing.househelp_user_id.as_str()]);
    let household_profile = unique_ids(pairing.household_profile_id.as_deref());
    let househelp_profile = unique_ids(pairing.househelp_profile_id.as_deref());

    if !household_profile.is_empty() && !househelp_profile.is_empty() {
        if let Some(record) = candidates.iter().find(|c| {
            intersects(&household_profile, &c.household.profile_ids)
                && intersects(&househelp_profile, &c.househelp.profile_ids)
        }) {
            return Some(Match {
                record,
                strategy: MatchStrategy::ProfilePair,
            });
        }
    }

    if !househelp_profile.is_empty() {
        if let Some(record) = candidates.iter().find(|c| {
            intersects(&househelp_profile, &c.househelp.profile_ids)
                && intersects(&household_user, &c.household.user_ids)
        }) {
            return Some(Match {
                record,
                strategy: MatchStrategy::HousehelpProfileHouseholdUser,
            });
        }
    }

    candidates
        .iter()
        .find(|c| {
            intersects(&household_user, &c.household.user_ids)
                && intersects(&househelp_user, &c.househelp.user_ids)
        })
        .map(|record| Match {
            record,
            strategy: MatchStrategy::UserPair,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract_conversations;
    use serde_json::{json, Value};

    fn records(list: Value) -> Vec<ConversationRecord> {
        extract_conversations(&json!({ "conversations": list }))
    }

    fn full_pairing() -> StartConversationPayload {
        StartConversationPayload::new("household-123", "househelp-456")
            .with_profiles("profile-household-789", "profile-househelp-012")
    }

    #[test]
    fn profile_pair_beats_earlier_user_pair() {
        let candidates = records(json!([
            {
                "id": "user-match",
                "household_user_id": "household-123",
                "househelp_user_id": "househelp-456",
            },
            {
                "id": "profile-match",
                "household": { "id": "PROFILE-HOUSEHOLD-789" },
                "househelp": { "id": "profile-househelp-012" },
            },
        ]));

        let found = find_match(&full_pairing(), &candidates).expect("match");
        assert_eq!(found.record.id.as_deref(), Some("profile-match"));
        assert_eq!(found.strategy, MatchStrategy::ProfilePair);
    }

    #[test]
    fn househelp_profile_with_household_user_covers_missing_household_profile() {
        let candidates = records(json!([
            {
                "id": "other-household",
                "household_user_id": "someone-else",
                "househelp_profile_id": "profile-househelp-012",
            },
            {
                "id": "wanted",
                "household_profile_id": null,
                "household": { "user_id": "household-123" },
                "househelp_profile_id": "profile-househelp-012",
            },
        ]));

        let found = find_match(&full_pairing(), &candidates).expect("match");
        assert_eq!(found.record.id.as_deref(), Some("wanted"));
        assert_eq!(found.strategy, MatchStrategy::HousehelpProfileHouseholdUser);
    }

    #[test]
    fn househelp_profile_alone_enables_second_strategy() {
        let mut pairing = StartConversationPayload::new("household-123", "househelp-456");
        pairing.househelp_profile_id = Some("profile-househelp-012".to_string());
        let candidates = records(json!([
            {
                "id": "wanted",
                "householdUserId": "HOUSEHOLD-123",
                "househelpProfileId": "profile-househelp-012",
            },
        ]));

        let found = find_match(&pairing, &candidates).expect("match");
        assert_eq!(found.strategy, MatchStrategy::HousehelpProfileHouseholdUser);
    }

    #[test]
    fn falls_back_to_user_pair() {
        let candidates = records(json!([
            {
                "id": "nested-users",
                "household": { "user_id": "Household-123" },
                "househelp": { "user_id": "househelp-456" },
            },
        ]));

        let found = find_match(&full_pairing(), &candidates).expect("match");
        assert_eq!(found.record.id.as_deref(), Some("nested-users"));
        assert_eq!(found.strategy, MatchStrategy::UserPair);
    }

    #[test]
    fn user_pair_accepts_legacy_party_keys() {
        let pairing = StartConversationPayload::new("household-123", "househelp-456");
        let candidates = records(json!([
            { "id": "legacy", "household_id": "household-123", "househelp_id": "househelp-456" },
        ]));
        assert!(find_match(&pairing, &candidates).is_some());
    }

    #[test]
    fn missing_fields_never_match() {
        let pairing = StartConversationPayload {
            household_user_id: "household-123".to_string(),
            househelp_user_id: "househelp-456".to_string(),
            household_profile_id: Some("".to_string()),
            househelp_profile_id: Some("   ".to_string()),
        };
        let candidates = records(json!([
            { "id": "blank", "household_profile_id": "", "househelp_profile_id": "" },
            { "id": "half", "household_user_id": "household-123" },
        ]));
        assert!(find_match(&pairing, &candidates).is_none());
    }

    #[test]
    fn one_sided_profile_match_is_not_a_profile_pair() {
        let candidates = records(json!([
            {
                "id": "half-profile",
                "household_profile_id": "profile-household-789",
                "househelp_profile_id": "another-househelp-profile",
            },
        ]));
        assert!(find_match(&full_pairing(), &candidates).is_none());
    }

    #[test]
    fn first_candidate_wins_within_a_strategy() {
        let pairing = StartConversationPayload::new("household-123", "househelp-456");
        let candidates = records(json!([
            { "id": "first", "household_user_id": "household-123", "househelp_user_id": "househelp-456" },
            { "id": "second", "household_user_id": "household-123", "househelp_user_id": "househelp-456" },
        ]));
        let found = find_match(&pairing, &candidates).expect("match");
        assert_eq!(found.record.id.as_deref(), Some("first"));
    }
}
