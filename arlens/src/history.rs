//! In-memory log of recent identifications, newest first.

use std::collections::VecDeque;

use chrono::{DateTime, Local};
use vision::ObjectAnalysis;

pub const HISTORY_CAPACITY: usize = 10;

#[derive(Debug, Clone)]
pub struct HistoryEntry {
	pub id: String,
	pub timestamp: DateTime<Local>,
	pub analysis: ObjectAnalysis,
	/// The still that was analysed, as a data URI.
	pub image: String,
}

impl HistoryEntry {
	pub fn new(analysis: ObjectAnalysis, image: String, timestamp: DateTime<Local>) -> Self {
		Self {
			id: uuid::Uuid::new_v4().to_string(),
			timestamp,
			analysis,
			image,
		}
	}
}

#[derive(Debug, Default)]
pub struct HistoryStore {
	entries: VecDeque<HistoryEntry>,
}

impl HistoryStore {
	/// Prepend `entry`, dropping the oldest entries beyond capacity.
	pub fn record(&mut self, entry: HistoryEntry) {
		self.entries.push_front(entry);
		self.entries.truncate(HISTORY_CAPACITY);
	}

	pub fn clear(&mut self) {
		self.entries.clear();
	}

	pub fn list(&self) -> impl ExactSizeIterator<Item = &HistoryEntry> {
		self.entries.iter()
	}

	pub fn get(&self, id: &str) -> Option<&HistoryEntry> {
		self.entries.iter().find(|e| e.id == id)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn entry(n: usize) -> HistoryEntry {
		let analysis = ObjectAnalysis {
			name: format!("object {n}"),
			category: "test".into(),
			description: String::new(),
			confidence: 0.5,
			tags: vec![],
			interesting_facts: vec![],
			suggested_actions: vec![],
			bounding_box: None,
		};
		HistoryEntry::new(analysis, format!("data:image/jpeg;base64,{n}"), Local::now())
	}

	#[test]
	fn keeps_last_ten_newest_first() {
		for total in [11, 17, 40] {
			let mut store = HistoryStore::default();
			for n in 0..total {
				store.record(entry(n));
			}

			let names = store.list().map(|e| e.analysis.name.clone()).collect::<Vec<_>>();
			let expected = (total - HISTORY_CAPACITY..total).rev().map(|n| format!("object {n}")).collect::<Vec<_>>();
			assert_eq!(names, expected);
		}
	}

	#[test]
	fn clear_empties_any_state() {
		let mut store = HistoryStore::default();
		store.clear();
		assert_eq!(store.list().len(), 0);

		for n in 0..5 {
			store.record(entry(n));
		}
		store.clear();
		assert!(store.is_empty());
		assert_eq!(store.list().count(), 0);
	}

	#[test]
	fn entries_get_unique_ids() {
		let mut store = HistoryStore::default();
		store.record(entry(0));
		store.record(entry(1));
		let ids = store.list().map(|e| e.id.clone()).collect::<Vec<_>>();
		assert_ne!(ids[0], ids[1]);
		assert_eq!(store.get(&ids[1]).map(|e| e.analysis.name.as_str()), Some("object 0"));
		assert!(store.get("missing").is_none());
	}
}
