use std::path::{Path, PathBuf};

use super::types::VkDoc;

/// Local file name for a downloaded document: the title with path
/// separators replaced, plus the VK extension when the title lacks it.
pub fn document_file_name(doc: &VkDoc, fallback_stem: &str) -> String {
    let title = doc.title.trim();
    let stem: String = if title.is_empty() {
        fallback_stem.to_string()
    } else {
        title
            .chars()
            .map(|ch| match ch {
                '/' | '\\' | ':' | '\0' => '_',
                other => other,
            })
            .collect()
    };
    let ext = doc.ext.trim();
    let has_ext = stem
        .to_ascii_lowercase()
        .ends_with(&format!(".{}", ext.to_ascii_lowercase()));
    if ext.is_empty() || has_ext {
        stem
    } else {
        format!("{stem}.{ext}")
    }
}

/// Empty the temp directory, creating it when missing.
///
/// Refuses the current directory and filesystem roots.
pub async fn reset_temp_dir(dir: &Path) -> std::io::Result<()> {
    if dir.as_os_str().is_empty() || dir == Path::new(".") || dir.parent().is_none() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("refusing to reset temp dir {}", dir.display()),
        ));
    }
    match tokio::fs::remove_dir_all(dir).await {
        Ok(()) => {}
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {}
        Err(error) => return Err(error),
    }
    tokio::fs::create_dir_all(dir).await
}

/// `temp_dir/<post_id>_<index>/<file_name>`. One directory per attachment;
/// the file itself keeps its readable name.
pub fn document_path(temp_dir: &Path, post_id: i64, index: usize, file_name: &str) -> PathBuf {
    temp_dir.join(format!("{post_id}_{index}")).join(file_name)
}
