//! Post composition: the attachment/length decision table that turns a post
//! into an ordered list of send steps.

mod composer;
mod constants;
mod plan;
mod template;

pub use composer::{ComposerConfig, PostComposer, embed_link};
pub use constants::{
    MAX_CAPTION_LENGTH, MAX_MESSAGE_LENGTH, MEDIA_GROUP_MAX_ITEMS, MEDIA_GROUP_MIN_ITEMS,
    SAFE_CHUNK_LENGTH,
};
pub use plan::{MediaItem, MediaKind, Plan, PlannedStep, SendStep};
pub use template::{SectionTemplate, SectionedText};
