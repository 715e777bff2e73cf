//! Application state and the actions that mutate it.
//!
//! Every stateful slot the UI shows lives in [`AppState`]. Rendering only
//! reads it and collects [`Action`]s; the actions are applied afterwards.

use chrono::{DateTime, Local};
use vision::{AnalysisError, AnalysisResponse, DebugInfo, ObjectAnalysis};

use crate::history::{HistoryEntry, HistoryStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
	ToggleAutoScan,
	Capture,
	/// Clear the current analysis (and with it the overlay).
	Dismiss,
	/// Collapse/expand the detail card. Visual only.
	ToggleMinimized,
	ToggleHistory,
	CloseHistory,
	SelectHistory(String),
	ClearHistory,
	ToggleSettings,
	RetryCamera,
}

/// What the error banner shows. One at a time; last write wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Banner {
	Camera(String),
	MissingApiKey,
}

/// Result of one analysis request, sent back from its worker thread.
#[derive(Debug)]
pub struct Completion {
	/// [`AppState::generation`] at the time the cycle started.
	pub generation: u64,
	pub captured_at: DateTime<Local>,
	pub image: String,
	pub result: Result<AnalysisResponse, AnalysisError>,
}

#[derive(Debug, Default)]
pub struct AppState {
	pub current: Option<ObjectAnalysis>,
	pub history: HistoryStore,
	pub error: Option<Banner>,
	pub analyzing: bool,
	pub auto_scan: bool,
	pub camera_ready: bool,
	pub minimized: bool,
	pub show_history: bool,
	pub show_settings: bool,
	pub last_debug: Option<DebugInfo>,
	pub last_failure: Option<String>,
	/// Bumped on every dismiss. A completion from an older generation is
	/// logged to history but does not bring the dismissed card back.
	pub generation: u64,
}

impl AppState {
	/// Apply an action that only touches view state.
	///
	/// Returns the action back if it needs the scan loop or the camera.
	pub fn apply(&mut self, action: Action) -> Option<Action> {
		match action {
			Action::Dismiss => {
				self.current = None;
				self.generation += 1;
			}
			Action::ToggleMinimized => self.minimized = !self.minimized,
			Action::ToggleHistory => self.show_history = !self.show_history,
			Action::CloseHistory => self.show_history = false,
			Action::SelectHistory(id) => {
				let Some(entry) = self.history.get(&id) else {
					tracing::debug!(%id, "history entry no longer exists");
					return None;
				};
				self.current = Some(entry.analysis.clone());
				self.minimized = false;
				self.show_history = false;
			}
			Action::ClearHistory => self.history.clear(),
			Action::ToggleSettings => self.show_settings = !self.show_settings,
			Action::ToggleAutoScan | Action::Capture | Action::RetryCamera => return Some(action),
		}
		None
	}

	pub fn complete(&mut self, completion: Completion) {
		self.analyzing = false;

		match completion.result {
			Ok(response) => {
				tracing::info!(
					name = %response.analysis.name,
					latency_ms = response.debug.latency_ms,
					"object identified"
				);
				self.history.record(HistoryEntry::new(
					response.analysis.clone(),
					completion.image,
					completion.captured_at,
				));

				if completion.generation == self.generation {
					self.current = Some(response.analysis);
					self.minimized = false;
				} else {
					tracing::debug!("analysis finished after dismiss; not restoring card");
				}

				self.last_debug = Some(response.debug);
				self.last_failure = None;
			}
			Err(err) => {
				tracing::warn!(error = %err, "tracking update failed");
				self.last_failure = Some(err.to_string());
			}
		}
	}

	pub fn overlay_box(&self) -> Option<imaging::BoundingBox> {
		self.current.as_ref()?.bounding_box
	}
}
