/// Telegram's maximum length for a text message.
pub const MAX_MESSAGE_LENGTH: usize = 4096;
/// Telegram's maximum length for a media caption.
pub const MAX_CAPTION_LENGTH: usize = 1024;
/// Chunk size that leaves room for both continuation markers.
pub const SAFE_CHUNK_LENGTH: usize = 4084;
pub const MEDIA_GROUP_MIN_ITEMS: usize = 2;
pub const MEDIA_GROUP_MAX_ITEMS: usize = 10;

pub(super) const DEFAULT_CHUNK_PAUSE_MS: u64 = 500;

const _: () = assert!(SAFE_CHUNK_LENGTH < MAX_MESSAGE_LENGTH);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::chunk_marker_reserve_chars;

    #[test]
    fn safe_chunk_leaves_room_for_markers() {
        assert_eq!(
            SAFE_CHUNK_LENGTH + chunk_marker_reserve_chars(),
            MAX_MESSAGE_LENGTH
        );
    }
}
