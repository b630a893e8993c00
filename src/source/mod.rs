//! Content providers.
//!
//! A provider turns a [`SearchQuery`] into an ordered list of
//! [`TextItem`]s. The engine never fetches on its own; providers are
//! handed to the pipeline explicitly.

pub mod file;
pub mod reddit;

pub use file::JsonFileProvider;
pub use reddit::{RedditConfig, RedditProvider};

use crate::models::{SearchQuery, TextItem};
use anyhow::Result;

/// Supplies the items of one batch.
#[allow(async_fn_in_trait)] // Only used with concrete types, never boxed
pub trait ContentProvider {
    /// Fetch the items matching `query`, oldest-first order not guaranteed.
    async fn fetch(&self, query: &SearchQuery) -> Result<Vec<TextItem>>;

    /// Short description used in logs and report metadata.
    fn describe(&self) -> String;
}

/// The providers the CLI can choose between.
pub enum Source {
    Reddit(RedditProvider),
    File(JsonFileProvider),
}

impl ContentProvider for Source {
    async fn fetch(&self, query: &SearchQuery) -> Result<Vec<TextItem>> {
        match self {
            Source::Reddit(provider) => provider.fetch(query).await,
            Source::File(provider) => provider.fetch(query).await,
        }
    }

    fn describe(&self) -> String {
        match self {
            Source::Reddit(provider) => provider.describe(),
            Source::File(provider) => provider.describe(),
        }
    }
}

/// Case-insensitive keyword match; an empty keyword matches everything.
pub(crate) fn mentions(text: &str, keyword: &str) -> bool {
    let keyword = keyword.trim();
    keyword.is_empty() || text.to_lowercase().contains(&keyword.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mentions() {
        assert!(mentions("Rust is GREAT", "great"));
        assert!(mentions("anything", ""));
        assert!(mentions("anything", "   "));
        assert!(!mentions("python", "rust"));
    }
}
