//! HTML-safe rendering of VK wall text.

use std::sync::LazyLock;

use regex::Regex;

const VK_WEB_BASE: &str = "https://vk.com";

static MENTION: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\[((?:id|club|public)\d+)\|([^\]\[|]+)\]").ok());

/// Escape the three characters Telegram's HTML parse mode reserves.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// `[id1|Name]` and `[club1|Name]` become `<a href="https://vk.com/id1">Name</a>`.
///
/// Expects already escaped text.
pub fn rewrite_mentions(text: &str) -> String {
    let Some(pattern) = MENTION.as_ref() else {
        return text.to_string();
    };
    pattern
        .replace_all(text, |captures: &regex::Captures<'_>| {
            format!(
                "<a href=\"{VK_WEB_BASE}/{}\">{}</a>",
                &captures[1], &captures[2]
            )
        })
        .into_owned()
}

/// Escape then link mentions.
pub fn render_wall_text(raw: &str) -> String {
    rewrite_mentions(&escape_html(raw))
}

/// Public page of a video, used when the file itself cannot be sent.
pub fn video_deep_link(owner_id: i64, video_id: i64) -> String {
    format!("{VK_WEB_BASE}/video{owner_id}_{video_id}")
}
