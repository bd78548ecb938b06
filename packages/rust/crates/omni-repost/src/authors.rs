//! Signer id to Telegram profile lookup.

use std::collections::HashMap;
use std::path::Path;

/// Maps VK `signer_id` values to `t.me/<username>` links.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorDirectory {
    links: HashMap<i64, String>,
}

impl AuthorDirectory {
    /// Parse `signer_id,telegram_username` lines. Blank and malformed lines
    /// are skipped with a warning.
    pub fn from_csv(raw: &str) -> Self {
        let mut links = HashMap::new();
        for (line_no, line) in raw.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let parsed = line.split_once(',').and_then(|(id, username)| {
                let username = username.trim().trim_start_matches('@');
                let id = id.trim().parse::<i64>().ok()?;
                (!username.is_empty()).then(|| (id, format!("t.me/{username}")))
            });
            match parsed {
                Some((id, link)) => {
                    links.insert(id, link);
                }
                None => tracing::warn!(line = line_no + 1, content = %line, "skipping malformed authors line"),
            }
        }
        Self { links }
    }

    /// Load from disk; a missing file yields an empty directory.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(raw) => {
                let directory = Self::from_csv(&raw);
                tracing::debug!(path = %path.display(), authors = directory.len(), "loaded authors");
                Ok(directory)
            }
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "authors file not found; signatures disabled");
                Ok(Self::default())
            }
            Err(error) => Err(anyhow::Error::new(error)
                .context(format!("failed to read authors file {}", path.display()))),
        }
    }

    pub fn link_for(&self, signer_id: i64) -> Option<&str> {
        self.links.get(&signer_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_csv_lines() {
        let directory = AuthorDirectory::from_csv("1,alice\n\n2, @bob \nbroken\nx,carol\n");
        assert_eq!(directory.len(), 2);
        assert_eq!(directory.link_for(1), Some("t.me/alice"));
        assert_eq!(directory.link_for(2), Some("t.me/bob"));
        assert_eq!(directory.link_for(3), None);
    }
}
