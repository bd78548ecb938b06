use super::links::{escape_html, render_wall_text};
use super::types::{VkPhoto, WallItem};

pub const REPOST_HEADER: &str = "REPOST ↓";

/// Wall items the source never reposts.
pub fn should_skip(item: &WallItem, last_delivered_id: i64) -> bool {
    item.is_pinned() || item.is_ad() || item.id <= last_delivered_id
}

/// Largest rendition by pixel area; ties keep the later entry.
pub fn largest_photo_url(photo: &VkPhoto) -> Option<&str> {
    photo
        .sizes
        .iter()
        .filter(|size| !size.url.is_empty())
        .max_by_key(|size| size.width.saturating_mul(size.height))
        .map(|size| size.url.as_str())
}

/// Outer text, then the repost header and the reposted text.
pub fn compose_text(item: &WallItem, repost_source_name: Option<&str>) -> String {
    let mut text = render_wall_text(item.text.trim());
    if let Some(inner) = item.copy_history.first() {
        let header = match repost_source_name.filter(|name| !name.is_empty()) {
            Some(name) => format!("{REPOST_HEADER} {}", render_wall_text(name)),
            None => REPOST_HEADER.to_string(),
        };
        push_paragraph(&mut text, &header);
        let inner_text = render_wall_text(inner.text.trim());
        if !inner_text.is_empty() {
            text.push('\n');
            text.push_str(&inner_text);
        }
    }
    text
}

/// Append a raw URL as a new paragraph unless the (already escaped) `text`
/// contains it.
pub fn push_link_line(text: &mut String, url: &str) {
    let line = escape_html(url);
    if line.is_empty() || text.contains(&line) {
        return;
    }
    push_paragraph(text, &line);
}

pub fn push_paragraph(text: &mut String, paragraph: &str) {
    if !text.is_empty() {
        text.push_str("\n\n");
    }
    text.push_str(paragraph);
}
