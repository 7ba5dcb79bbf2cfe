use serde::Serialize;
use thiserror::Error;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::launcher::Resolution;
use crate::pairing::ConversationRecord;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Clone, Copy)]
pub enum JsonFormat {
    Pretty,
    Compact,
}

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionOutput {
    #[serde(flatten)]
    pub resolution: Resolution,
    pub route: String,
    pub link: String,
}

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationListOutput {
    pub items: Vec<ConversationRecord>,
    pub raw: serde_json::Value,
}

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteOutput {
    pub route: String,
    pub link: String,
}

pub fn resolve_json_format(compact: bool) -> JsonFormat {
    if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    }
}

pub fn json_string<T: Serialize + ?Sized>(value: &T, format: JsonFormat) -> Result<String, OutputError> {
    let payload = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(value)?,
        JsonFormat::Compact => serde_json::to_string(value)?,
    };
    Ok(payload)
}

pub fn print_json<T: Serialize + ?Sized>(value: &T, format: JsonFormat) -> Result<(), OutputError> {
    let payload = json_string(value, format)?;
    println!("{payload}");
    Ok(())
}

pub fn print_resolution(
    output: &ResolutionOutput,
    json: bool,
    json_format: JsonFormat,
) -> Result<(), OutputError> {
    if json {
        return print_json(output, json_format);
    }

    match &output.resolution {
        Resolution::Unresolved => {
            println!("No conversation could be established yet.");
            println!("inbox: {}", output.link);
        }
        resolution => {
            let how = match resolution {
                Resolution::Matched(_) => "existing",
                Resolution::Created(_) => "created",
                _ => "found after create",
            };
            println!(
                "Conversation {} ({how})",
                resolution.conversation_id().unwrap_or_default()
            );
            println!("open: {}", output.link);
        }
    }
    Ok(())
}

pub fn print_conversations(
    output: &ConversationListOutput,
    json: bool,
    json_format: JsonFormat,
) -> Result<(), OutputError> {
    if json {
        return print_json(output, json_format);
    }

    if output.items.is_empty() {
        println!("No conversations.");
        return Ok(());
    }

    let columns = ["household user", "househelp user", "household profile", "househelp profile"];
    let mut widths = columns.map(display_width);
    for item in &output.items {
        for (width, ids) in widths.iter_mut().zip(party_columns(item)) {
            *width = (*width).max(display_width(&ids));
        }
    }
    let widths = widths.map(|width| width.min(24));

    println!(
        "{}  {}  {}  {}  {}",
        pad_right("id", 36),
        pad_right(columns[0], widths[0]),
        pad_right(columns[1], widths[1]),
        pad_right(columns[2], widths[2]),
        pad_right(columns[3], widths[3]),
    );
    for item in &output.items {
        let id = item.id.as_deref().unwrap_or("<no id>");
        let cells = party_columns(item);
        println!(
            "{}  {}  {}  {}  {}",
            pad_right(&truncate_display(id, 36), 36),
            pad_right(&truncate_display(&cells[0], widths[0]), widths[0]),
            pad_right(&truncate_display(&cells[1], widths[1]), widths[1]),
            pad_right(&truncate_display(&cells[2], widths[2]), widths[2]),
            pad_right(&truncate_display(&cells[3], widths[3]), widths[3]),
        );
    }
    Ok(())
}

pub fn print_route(output: &RouteOutput, json: bool, json_format: JsonFormat) -> Result<(), OutputError> {
    if json {
        return print_json(output, json_format);
    }
    println!("{}", output.route);
    Ok(())
}

fn party_columns(item: &ConversationRecord) -> [String; 4] {
    [
        join_ids(&item.household.user_ids),
        join_ids(&item.househelp.user_ids),
        join_ids(&item.household.profile_ids),
        join_ids(&item.househelp.profile_ids),
    ]
}

fn join_ids(ids: &[String]) -> String {
    if ids.is_empty() {
        "-".to_string()
    } else {
        ids.join(",")
    }
}

fn display_width(value: &str) -> usize {
    UnicodeWidthStr::width(value)
}

fn truncate_display(value: &str, max_width: usize) -> String {
    if display_width(value) <= max_width {
        return value.to_string();
    }
    let ellipsis = "...";
    let mut width = 0usize;
    let mut output = String::new();
    for ch in value.chars() {
        let ch_width = UnicodeWidthChar::width(ch).unwrap_or(0);
        if width + ch_width + ellipsis.len() > max_width {
            break;
        }
        output.push(ch);
        width += ch_width;
    }
    output.push_str(ellipsis);
    output
}

fn pad_right(value: &str, width: usize) -> String {
    let mut output = value.to_string();
    let current = display_width(value);
    if current < width {
        output.push_str(&" ".repeat(width - current));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resolution_output_flattens_state() {
        let output = ResolutionOutput {
            resolution: Resolution::Created("abc".to_string()),
            route: "/inbox?conversation=abc".to_string(),
            link: "https://homebit.co.ke/inbox?conversation=abc".to_string(),
        };
        let value: serde_json::Value =
            serde_json::from_str(&json_string(&output, JsonFormat::Compact).unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "resolution": "created",
                "conversationId": "abc",
                "route": "/inbox?conversation=abc",
                "link": "https://homebit.co.ke/inbox?conversation=abc",
            })
        );
    }

    #[test]
    fn truncates_wide_values_with_ellipsis() {
        assert_eq!(truncate_display("abcdefghij", 6), "abc...");
        assert_eq!(truncate_display("abc", 6), "abc");
        assert_eq!(pad_right("ab", 4), "ab  ");
    }

    #[test]
    fn empty_party_ids_render_as_dash() {
        let record = ConversationRecord::default();
        assert_eq!(party_columns(&record), ["-", "-", "-", "-"].map(String::from));
    }
}
