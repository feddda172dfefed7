//! Watch history tracking module
//!
//! One entry per show, ordered by recency of the last play (most recent last).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::store::Store;

/// Record key of the history array
const HISTORY_KEY: &str = "watch_history";

/// Last played position for one show
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchProgress {
    pub show_id: u64,
    pub show_name: String,
    pub season_number: u32,
    pub episode_number: u32,
    /// When the play request was issued; absent in records written by older versions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watched_at: Option<DateTime<Utc>>,
}

impl WatchProgress {
    /// Get a display string for when this was watched
    pub fn watched_at_display(&self) -> Option<String> {
        let watched_at = self.watched_at?;
        let duration = Utc::now().signed_duration_since(watched_at);

        let display = if duration.num_minutes() < 1 {
            "just now".to_string()
        } else if duration.num_hours() < 1 {
            format!("{}m ago", duration.num_minutes())
        } else if duration.num_days() < 1 {
            format!("{}h ago", duration.num_hours())
        } else if duration.num_days() < 7 {
            format!("{}d ago", duration.num_days())
        } else {
            watched_at.format("%b %d").to_string()
        };

        Some(display)
    }
}

/// Watch history view over the record store
pub struct WatchHistory<'a> {
    store: &'a Store,
}

impl<'a> WatchHistory<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// All entries, oldest first
    pub fn list(&self) -> Result<Vec<WatchProgress>> {
        Ok(self.store.get(HISTORY_KEY)?.unwrap_or_default())
    }

    /// Record a play: drop the show's previous entry and append the new one
    pub fn record(
        &self,
        show_id: u64,
        season_number: u32,
        episode_number: u32,
        show_name: &str,
    ) -> Result<()> {
        let mut entries = self.list()?;
        entries.retain(|entry| entry.show_id != show_id);
        entries.push(WatchProgress {
            show_id,
            show_name: show_name.to_string(),
            season_number,
            episode_number,
            watched_at: Some(Utc::now()),
        });

        tracing::debug!(
            "Recorded progress for {} ({}): S{}E{}",
            show_name,
            show_id,
            season_number,
            episode_number
        );

        self.store.put(HISTORY_KEY, &entries)
    }

    /// The entry for one show, if any
    pub fn find_by_show(&self, show_id: u64) -> Result<Option<WatchProgress>> {
        Ok(self
            .list()?
            .into_iter()
            .find(|entry| entry.show_id == show_id))
    }

    /// The most recently played show
    pub fn latest(&self) -> Result<Option<WatchProgress>> {
        Ok(self.list()?.pop())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_history() {
        let store = Store::open_in_memory().unwrap();
        let history = WatchHistory::new(&store);

        assert!(history.list().unwrap().is_empty());
        assert!(history.latest().unwrap().is_none());
    }

    #[test]
    fn test_record_appends_in_order() {
        let store = Store::open_in_memory().unwrap();
        let history = WatchHistory::new(&store);

        history.record(1396, 1, 1, "Breaking Bad").unwrap();
        history.record(1399, 3, 9, "Game of Thrones").unwrap();

        let entries = history.list().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].show_name, "Breaking Bad");
        assert_eq!(entries[1].show_name, "Game of Thrones");
        assert_eq!(history.latest().unwrap().unwrap().show_id, 1399);
    }

    #[test]
    fn test_record_deduplicates_and_moves_to_end() {
        let store = Store::open_in_memory().unwrap();
        let history = WatchHistory::new(&store);

        history.record(1396, 1, 1, "Breaking Bad").unwrap();
        history.record(1399, 1, 1, "Game of Thrones").unwrap();
        history.record(1396, 2, 5, "Breaking Bad").unwrap();

        let entries = history.list().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].show_id, 1399);
        assert_eq!(entries[1].show_id, 1396);
        assert_eq!(entries[1].season_number, 2);
        assert_eq!(entries[1].episode_number, 5);

        let ids: Vec<u64> = entries.iter().map(|e| e.show_id).collect();
        let mut unique = ids.clone();
        unique.dedup();
        assert_eq!(ids, unique);
    }

    #[test]
    fn test_find_by_show() {
        let store = Store::open_in_memory().unwrap();
        let history = WatchHistory::new(&store);

        history.record(1396, 4, 2, "Breaking Bad").unwrap();

        let progress = history.find_by_show(1396).unwrap().unwrap();
        assert_eq!((progress.season_number, progress.episode_number), (4, 2));
        assert!(history.find_by_show(1).unwrap().is_none());
    }

    #[test]
    fn test_reads_records_without_timestamp() {
        let store = Store::open_in_memory().unwrap();
        store
            .put(
                HISTORY_KEY,
                &serde_json::json!([
                    {"showId": 1396, "showName": "Breaking Bad", "seasonNumber": 2, "episodeNumber": 3}
                ]),
            )
            .unwrap();

        let history = WatchHistory::new(&store);
        let entries = history.list().unwrap();
        assert_eq!(entries[0].season_number, 2);
        assert!(entries[0].watched_at.is_none());
        assert!(entries[0].watched_at_display().is_none());
    }

    #[test]
    fn test_serialized_field_names() {
        let progress = WatchProgress {
            show_id: 7,
            show_name: "Show".to_string(),
            season_number: 1,
            episode_number: 2,
            watched_at: None,
        };
        let json = serde_json::to_string(&progress).unwrap();
        assert_eq!(
            json,
            r#"{"showId":7,"showName":"Show","seasonNumber":1,"episodeNumber":2}"#
        );
    }
}
