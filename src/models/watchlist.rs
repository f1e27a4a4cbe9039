use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of media a watchlist entry refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Series,
}

/// A single saved title in the user's watchlist
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchlistEntry {
    pub id: Uuid,
    pub title: String,
    pub media_type: MediaType,
    pub added_at: DateTime<Utc>,
}

impl WatchlistEntry {
    pub fn new(title: String, media_type: MediaType) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            media_type,
            added_at: Utc::now(),
        }
    }
}

/// The user's watchlist. The authoritative copy lives in the remote
/// document store; this is the in-process working set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Watchlist {
    pub entries: Vec<WatchlistEntry>,
}

impl Watchlist {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Adds an entry, replacing any existing entry with the same title
    pub fn add(&mut self, entry: WatchlistEntry) {
        if let Some(existing) = self.entries.iter_mut().find(|e| e.title == entry.title) {
            *existing = entry;
        } else {
            self.entries.push(entry);
        }
    }

    /// Removes an entry by id, returning it if present
    pub fn remove(&mut self, id: Uuid) -> Option<WatchlistEntry> {
        let idx = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(idx))
    }

    pub fn contains(&self, title: &str) -> bool {
        self.entries.iter().any(|e| e.title == title)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
