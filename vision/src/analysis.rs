use chrono::{DateTime, Local};
use imaging::BoundingBox;
use serde::{Deserialize, Deserializer, Serialize};

/// Identification of the main object in a frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectAnalysis {
	pub name: String,
	pub category: String,
	pub description: String,
	/// Model confidence, nominally 0..=1.
	pub confidence: f32,
	pub tags: Vec<String>,
	pub interesting_facts: Vec<String>,
	#[serde(default)]
	pub suggested_actions: Vec<String>,
	/// `[ymin, xmin, ymax, xmax]` in 0..=1000 space.
	#[serde(default, deserialize_with = "lenient_box", skip_serializing_if = "Option::is_none")]
	pub bounding_box: Option<BoundingBox>,
}

impl ObjectAnalysis {
	pub fn confidence_percent(&self) -> u32 {
		(self.confidence.clamp(0.0, 1.0) * 100.0).round() as u32
	}

	/// The tags shown on the detail card.
	pub fn headline_tags(&self) -> impl Iterator<Item = &str> {
		self.tags.iter().take(3).map(String::as_str)
	}

	pub fn first_fact(&self) -> Option<&str> {
		self.interesting_facts.first().map(String::as_str)
	}
}

/// A box that is missing or not exactly four numbers is dropped instead of
/// failing the whole analysis.
fn lenient_box<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<BoundingBox>, D::Error> {
	let value = Option::<serde_json::Value>::deserialize(deserializer)?;
	let Some(serde_json::Value::Array(values)) = value else {
		return Ok(None);
	};

	let numbers = values
		.iter()
		.map(|v| v.as_f64().map(|n| n.round() as i32))
		.collect::<Option<Vec<_>>>();

	Ok(match numbers.as_deref() {
		Some(&[ymin, xmin, ymax, xmax]) => Some(BoundingBox::new(ymin, xmin, ymax, xmax)),
		_ => {
			tracing::debug!(?values, "ignoring malformed bounding box");
			None
		}
	})
}

/// Round-trip metadata kept for the debug readout.
#[derive(Debug, Clone, PartialEq)]
pub struct DebugInfo {
	pub latency_ms: u64,
	pub raw_response: String,
	pub timestamp: DateTime<Local>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResponse {
	pub analysis: ObjectAnalysis,
	pub debug: DebugInfo,
}
