//! Household/househelp conversation bootstrap for the Homebit inbox.
//!
//! [`start_or_get_conversation`] turns a pairing into the single conversation
//! id both sides share, listing before it ever creates. [`inbox_route`] builds
//! the deep link for the result.

pub mod api;
pub mod auth;
pub mod config;
pub mod extract;
pub mod ids;
pub mod launcher;
pub mod matcher;
pub mod output;
pub mod pairing;
pub mod route;

pub use api::{ApiClient, ApiError, InboxSession, InboxTransport};
pub use extract::{extract_conversation_id, extract_conversations};
pub use ids::{is_conversation_id, normalize_id};
pub use launcher::{resolve_conversation, start_or_get_conversation, LaunchError, Resolution};
pub use matcher::{find_match, Match, MatchStrategy};
pub use pairing::{ConversationRecord, PartyIds, StartConversationPayload};
pub use route::{inbox_link, inbox_route};
