pub const INBOX_ROUTE: &str = "/inbox";

/// Deep link into the inbox, optionally focused on one conversation.
pub fn inbox_route(conversation_id: Option<&str>) -> String {
    match conversation_id {
        Some(id) if !id.is_empty() => {
            format!("{INBOX_ROUTE}?conversation={}", urlencoding::encode(id))
        }
        _ => INBOX_ROUTE.to_string(),
    }
}

pub fn inbox_link(app_base_url: &str, conversation_id: Option<&str>) -> String {
    format!(
        "{}{}",
        app_base_url.trim_end_matches('/'),
        inbox_route(conversation_id)
    )
}
