//! Reddit content provider.
//!
//! Uses the public JSON listings: keyword search for posts, and the
//! subreddit's most recent comments filtered by keyword.

use super::{mentions, ContentProvider};
use crate::models::{SearchQuery, SourceKind, TextItem};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Reddit caps listing pages at 100 entries.
const MAX_PAGE_SIZE: usize = 100;

/// Connection settings for [`RedditProvider`].
#[derive(Debug, Clone)]
pub struct RedditConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub show_progress: bool,
}

impl Default for RedditConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.reddit.com".to_string(),
            user_agent: concat!("sentiscope/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_seconds: 30,
            show_progress: true,
        }
    }
}

/// A Reddit listing response.
#[derive(Debug, Deserialize)]
pub struct Listing {
    pub data: ListingData,
}

#[derive(Debug, Deserialize)]
pub struct ListingData {
    #[serde(default)]
    pub children: Vec<Thing>,
}

#[derive(Debug, Deserialize)]
pub struct Thing {
    pub kind: String,
    pub data: ThingData,
}

/// The fields of a post (`t3`) or comment (`t1`) we care about.
#[derive(Debug, Deserialize)]
pub struct ThingData {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub selftext: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub created_utc: Option<f64>,
}

fn timestamp(created_utc: Option<f64>) -> Option<DateTime<Utc>> {
    created_utc.and_then(|secs| DateTime::from_timestamp(secs as i64, 0))
}

/// Turn a search listing into post items: title, plus the body when present.
pub fn posts_from_listing(listing: Listing) -> Vec<TextItem> {
    listing
        .data
        .children
        .into_iter()
        .filter(|thing| thing.kind == "t3")
        .filter_map(|thing| {
            let data = thing.data;
            let title = data.title.unwrap_or_default();
            let content = match data.selftext.as_deref().map(str::trim) {
                Some(body) if !body.is_empty() => format!("{}\n{}", title, body),
                _ => title,
            };
            if content.trim().is_empty() {
                return None;
            }
            Some(TextItem::new(content, SourceKind::Post, timestamp(data.created_utc)))
        })
        .collect()
}

/// Turn a comment listing into items, keeping only comments that mention `keyword`.
pub fn comments_from_listing(listing: Listing, keyword: &str) -> Vec<TextItem> {
    listing
        .data
        .children
        .into_iter()
        .filter(|thing| thing.kind == "t1")
        .filter_map(|thing| {
            let body = thing.data.body?;
            if body.trim().is_empty() || !mentions(&body, keyword) {
                return None;
            }
            Some(TextItem::new(body, SourceKind::Comment, timestamp(thing.data.created_utc)))
        })
        .collect()
}

/// Fetches posts and comments from Reddit's public JSON endpoints.
pub struct RedditProvider {
    config: RedditConfig,
    http_client: Client,
}

impl RedditProvider {
    pub fn new(config: RedditConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.clone())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            config,
            http_client,
        })
    }

    fn subreddit_url(&self, subreddit: &str, endpoint: &str) -> String {
        let name = subreddit.trim().trim_start_matches("r/").trim_matches('/');
        let name = if name.is_empty() { "all" } else { name };
        format!(
            "{}/r/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            name,
            endpoint
        )
    }

    async fn get_listing(&self, url: &str, params: &[(&str, String)]) -> Result<Listing> {
        debug!("GET {} {:?}", url, params);

        let resp = self
            .http_client
            .get(url)
            .query(params)
            .send()
            .await
            .with_context(|| format!("Request failed for {}", url))?;

        let resp = resp
            .error_for_status()
            .with_context(|| format!("HTTP error for {}", url))?;

        resp.json::<Listing>()
            .await
            .with_context(|| format!("Decoding listing from {}", url))
    }

    async fn search_posts(&self, query: &SearchQuery, limit: usize) -> Result<Vec<TextItem>> {
        let url = self.subreddit_url(&query.subreddit, "search.json");
        let params = [
            ("q", query.keyword.clone()),
            ("limit", limit.to_string()),
            ("restrict_sr", "on".to_string()),
            ("raw_json", "1".to_string()),
        ];
        let listing = self.get_listing(&url, &params).await?;
        Ok(posts_from_listing(listing))
    }

    async fn recent_comments(&self, query: &SearchQuery, limit: usize) -> Result<Vec<TextItem>> {
        if !query.include_comments {
            return Ok(Vec::new());
        }
        let url = self.subreddit_url(&query.subreddit, "comments.json");
        let params = [("limit", limit.to_string()), ("raw_json", "1".to_string())];
        let listing = self.get_listing(&url, &params).await?;
        Ok(comments_from_listing(listing, &query.keyword))
    }

    fn spinner(&self, query: &SearchQuery) -> Option<ProgressBar> {
        if !self.config.show_progress {
            return None;
        }
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(format!(
            "Fetching r/{} for \"{}\"...",
            query.subreddit, query.keyword
        ));
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    }
}

impl ContentProvider for RedditProvider {
    async fn fetch(&self, query: &SearchQuery) -> Result<Vec<TextItem>> {
        let limit = query.limit.clamp(1, MAX_PAGE_SIZE);
        if limit != query.limit {
            warn!(
                "Limit {} adjusted to {} (Reddit listing page size)",
                query.limit, limit
            );
        }

        let spinner = self.spinner(query);
        let fetched = futures::try_join!(
            self.search_posts(query, limit),
            self.recent_comments(query, limit)
        );
        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }

        let (mut items, comments) = fetched?;
        info!(
            "Reddit returned {} posts and {} matching comments",
            items.len(),
            comments.len()
        );
        items.extend(comments);
        Ok(items)
    }

    fn describe(&self) -> String {
        format!("Reddit ({})", self.config.base_url)
    }
}
