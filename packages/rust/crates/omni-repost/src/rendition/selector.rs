use super::catalog::{Rendition, VideoCatalog};
use super::probe::MetadataProbe;

/// Bot API limit for videos sent by URL.
pub const DEFAULT_VIDEO_SIZE_CEILING_BYTES: u64 = 20_000_000;

/// Outcome of a rendition selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedRendition {
    pub rendition: Rendition,
    /// Set when even the lowest quality is above the ceiling; callers should
    /// link to the video instead of sending the file.
    pub exceeded_size: bool,
}

impl SelectedRendition {
    pub fn url(&self) -> &str {
        &self.rendition.url
    }
}

/// Picks the best rendition that fits under a byte ceiling.
pub struct RenditionSelector<'a> {
    probe: &'a dyn MetadataProbe,
    size_ceiling: u64,
}

impl<'a> RenditionSelector<'a> {
    pub fn new(probe: &'a dyn MetadataProbe, size_ceiling: u64) -> Self {
        Self {
            probe,
            size_ceiling,
        }
    }

    /// Probe from the highest quality down and stop at the first rendition
    /// within the ceiling.
    ///
    /// Returns `None` only for an empty catalog. Probe failures count as
    /// size 0.
    pub async fn select(&self, catalog: &VideoCatalog) -> Option<SelectedRendition> {
        let mut lowest = None;
        for mut candidate in catalog.by_descending_quality() {
            let size = self.probe_size(&candidate.url).await;
            candidate.byte_size = Some(size);
            if size <= self.size_ceiling {
                tracing::debug!(
                    quality = %candidate.quality_label,
                    size,
                    ceiling = self.size_ceiling,
                    "selected video rendition"
                );
                return Some(SelectedRendition {
                    rendition: candidate,
                    exceeded_size: false,
                });
            }
            lowest = Some(candidate);
        }

        let rendition = lowest?;
        tracing::info!(
            quality = %rendition.quality_label,
            size = rendition.byte_size.unwrap_or_default(),
            ceiling = self.size_ceiling,
            url = %rendition.url,
            "every video rendition exceeds the size ceiling"
        );
        Some(SelectedRendition {
            rendition,
            exceeded_size: true,
        })
    }

    async fn probe_size(&self, url: &str) -> u64 {
        match self.probe.byte_size(url).await {
            Ok(size) => size,
            Err(error) => {
                tracing::debug!(url, error = %error, "metadata probe failed; assuming size 0");
                0
            }
        }
    }
}
