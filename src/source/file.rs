//! Local file content provider.
//!
//! Reads previously exported items from a JSON array, or from JSON Lines
//! when the file ends in `.jsonl`.

use super::{mentions, ContentProvider};
use crate::models::{SearchQuery, SourceKind, TextItem};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Loads items from a JSON or JSON Lines file.
pub struct JsonFileProvider {
    path: PathBuf,
}

impl JsonFileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn is_json_lines(&self) -> bool {
        self.path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("jsonl"))
    }

    /// Parse every record in the file, without filtering.
    pub fn load(&self) -> Result<Vec<TextItem>> {
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read input file: {}", self.path.display()))?;

        if self.is_json_lines() {
            parse_json_lines(&content, &self.path)
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse input file: {}", self.path.display()))
        }
    }
}

fn parse_json_lines(content: &str, path: &Path) -> Result<Vec<TextItem>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(n, line)| {
            serde_json::from_str(line)
                .with_context(|| format!("{}:{}: invalid item record", path.display(), n + 1))
        })
        .collect()
}

impl ContentProvider for JsonFileProvider {
    async fn fetch(&self, query: &SearchQuery) -> Result<Vec<TextItem>> {
        let all = self.load()?;
        let total = all.len();

        let mut posts = 0usize;
        let mut comments = 0usize;
        let items: Vec<TextItem> = all
            .into_iter()
            .filter(|item| !item.content.trim().is_empty())
            .filter(|item| query.include_comments || item.source_kind == SourceKind::Post)
            .filter(|item| mentions(&item.content, &query.keyword))
            .filter(|item| {
                // The limit applies to posts and comments separately, as with Reddit.
                let counter = match item.source_kind {
                    SourceKind::Post => &mut posts,
                    SourceKind::Comment => &mut comments,
                };
                *counter += 1;
                *counter <= query.limit
            })
            .collect();

        debug!(
            "Kept {} of {} records from {}",
            items.len(),
            total,
            self.path.display()
        );
        Ok(items)
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}
