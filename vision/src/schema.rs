//! Wire types for the `generateContent` endpoint.

use serde::{Deserialize, Serialize};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest<'a> {
	pub contents: Vec<Content<'a>>,
	pub generation_config: GenerationConfig,
}

impl<'a> GenerateRequest<'a> {
	pub fn new(prompt: &'a str, image: InlineData<'a>) -> Self {
		Self {
			contents: vec![Content {
				parts: vec![Part::text(prompt), Part::inline(image)],
			}],
			generation_config: GenerationConfig::default(),
		}
	}
}

#[derive(Serialize)]
pub struct Content<'a> {
	pub parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Part<'a> {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub text: Option<&'a str>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub inline_data: Option<InlineData<'a>>,
}

impl<'a> Part<'a> {
	fn text(text: &'a str) -> Self {
		Self { text: Some(text), inline_data: None }
	}

	fn inline(data: InlineData<'a>) -> Self {
		Self { text: None, inline_data: Some(data) }
	}
}

#[derive(Serialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InlineData<'a> {
	pub mime_type: &'static str,
	/// Base64 payload without the `data:` prefix.
	pub data: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
	pub temperature: f32,
	pub response_mime_type: &'static str,
	pub thinking_config: ThinkingConfig,
	pub response_schema: serde_json::Value,
}

impl Default for GenerationConfig {
	/// Deterministic output and no extended reasoning keep the tracking loop fast and stable.
	fn default() -> Self {
		Self {
			temperature: 0.0,
			response_mime_type: "application/json",
			thinking_config: ThinkingConfig { thinking_budget: 0 },
			response_schema: response_schema(),
		}
	}
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThinkingConfig {
	pub thinking_budget: u32,
}

fn response_schema() -> serde_json::Value {
	let strings = serde_json::json!({ "type": "ARRAY", "items": { "type": "STRING" } });
	serde_json::json!({
		"type": "OBJECT",
		"properties": {
			"name": { "type": "STRING" },
			"category": { "type": "STRING" },
			"description": { "type": "STRING" },
			"confidence": { "type": "NUMBER" },
			"tags": strings,
			"interestingFacts": strings,
			"suggestedActions": strings,
			"boundingBox": { "type": "ARRAY", "items": { "type": "INTEGER" } },
		},
		"required": ["name", "category", "description", "confidence", "tags", "interestingFacts", "boundingBox"],
	})
}

#[derive(Deserialize, Debug)]
pub struct GenerateResponse {
	pub candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize, Debug)]
pub struct Candidate {
	pub content: Option<CandidateContent>,
}

#[derive(Deserialize, Debug)]
pub struct CandidateContent {
	pub parts: Option<Vec<CandidatePart>>,
}

#[derive(Deserialize, Debug)]
pub struct CandidatePart {
	pub text: Option<String>,
}

impl GenerateResponse {
	/// Concatenated text of the first candidate (empty if the model produced none).
	pub fn text(&self) -> String {
		self.candidates
			.iter()
			.flatten()
			.next()
			.and_then(|c| c.content.as_ref())
			.and_then(|c| c.parts.as_ref())
			.map(|parts| parts.iter().filter_map(|p| p.text.as_deref()).collect::<String>())
			.unwrap_or_default()
	}
}
