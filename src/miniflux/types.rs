//! Wire types for the Miniflux REST API.

use crate::store::{Entry, EntryId};
use crate::util::strip_control_chars;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Response body of `GET /v1/entries`.
#[derive(Debug, Deserialize)]
pub struct EntriesResponse {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub entries: Vec<ApiEntry>,
}

#[derive(Debug, Deserialize)]
pub struct ApiEntry {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: String,
    pub feed: ApiFeed,
}

#[derive(Debug, Deserialize)]
pub struct ApiFeed {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub title: String,
}

/// Request body of `PUT /v1/entries`.
#[derive(Debug, Serialize)]
pub struct UpdateEntriesRequest<'a> {
    pub entry_ids: Vec<i64>,
    pub status: &'a str,
}

impl From<ApiEntry> for Entry {
    fn from(api: ApiEntry) -> Self {
        let title = strip_control_chars(&api.title).into_owned();
        let feed_title = strip_control_chars(&api.feed.title).into_owned();
        let mut entry = Entry::new(EntryId(api.id), title, feed_title, api.content);
        if !api.url.is_empty() {
            entry = entry.with_url(api.url);
        }
        if let Some(published) = api.published_at {
            entry = entry.with_published(published.timestamp());
        }
        entry
    }
}
