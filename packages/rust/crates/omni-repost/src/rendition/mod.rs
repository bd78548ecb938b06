//! Video rendition catalog and size-bounded selection.

mod catalog;
mod probe;
mod selector;

pub use catalog::{Rendition, VideoCatalog};
pub use probe::{HttpMetadataProbe, MetadataProbe, ProbeError};
pub use selector::{DEFAULT_VIDEO_SIZE_CEILING_BYTES, RenditionSelector, SelectedRendition};
