//! Text chunking under a character cap.
//!
//! `split_text` only cuts; continuation markers are applied afterwards by
//! `decorate_chunk`, so stripping them restores the original text.

/// Marker appended to every chunk that has a successor.
pub const CHUNK_CONTINUES_SUFFIX: &str = " (...)";
/// Marker prepended to every chunk that has a predecessor.
pub const CHUNK_CONTINUED_PREFIX: &str = "(...) ";

/// Split `text` into non-empty chunks of at most `max_chars` characters.
///
/// Within each window the last newline wins, then the last space, then a
/// hard cut. The break character stays with the preceding chunk, so
/// `chunks.concat() == text`.
pub fn split_text(text: &str, max_chars: usize) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    if max_chars == 0 {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut remaining = text;
    while !remaining.is_empty() {
        let window_end = byte_index_after_n_chars(remaining, max_chars);
        if window_end == remaining.len() {
            chunks.push(remaining.to_string());
            break;
        }

        let chunk_end = choose_split_boundary(&remaining[..window_end], window_end);
        chunks.push(remaining[..chunk_end].to_string());
        remaining = &remaining[chunk_end..];
    }
    chunks
}

/// Characters the markers may add to a single chunk.
pub fn chunk_marker_reserve_chars() -> usize {
    CHUNK_CONTINUED_PREFIX.chars().count() + CHUNK_CONTINUES_SUFFIX.chars().count()
}

/// Wrap a chunk with continuation markers according to its position.
pub fn decorate_chunk(chunk: &str, index: usize, total_chunks: usize) -> String {
    if total_chunks <= 1 {
        return chunk.to_string();
    }

    if index == 0 {
        format!("{chunk}{CHUNK_CONTINUES_SUFFIX}")
    } else if index == total_chunks - 1 {
        format!("{CHUNK_CONTINUED_PREFIX}{chunk}")
    } else {
        format!("{CHUNK_CONTINUED_PREFIX}{chunk}{CHUNK_CONTINUES_SUFFIX}")
    }
}

/// Inverse of [`decorate_chunk`].
pub fn strip_chunk_markers(decorated: &str, index: usize, total_chunks: usize) -> &str {
    if total_chunks <= 1 {
        return decorated;
    }
    let mut body = decorated;
    if index > 0 {
        body = body.strip_prefix(CHUNK_CONTINUED_PREFIX).unwrap_or(body);
    }
    if index < total_chunks - 1 {
        body = body.strip_suffix(CHUNK_CONTINUES_SUFFIX).unwrap_or(body);
    }
    body
}

fn byte_index_after_n_chars(text: &str, n: usize) -> usize {
    text.char_indices()
        .nth(n)
        .map_or(text.len(), |(idx, _)| idx)
}

// Both separators are ASCII, so `pos + 1` is always a char boundary and > 0.
fn choose_split_boundary(window: &str, window_end: usize) -> usize {
    if let Some(pos) = window.rfind('\n') {
        return pos + 1;
    }
    if let Some(pos) = window.rfind(' ') {
        return pos + 1;
    }
    window_end
}
