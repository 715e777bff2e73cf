//! Client for the remote multimodal analysis service.
//!
//! One request per frame: a fixed instruction prompt, the JPEG still, and a
//! declared response schema. The answer must parse into an [`ObjectAnalysis`]
//! as a whole; anything else is a [`AnalysisError::Malformed`] failure.

use std::{
	sync::LazyLock,
	time::{Duration, Instant},
};

use regex::Regex;

mod analysis;
pub use analysis::*;
mod schema;

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

/// Environment variables checked (in order) for the service credential.
pub const API_KEY_VARS: [&str; 2] = ["API_KEY", "GEMINI_API_KEY"];

const PROMPT: &str = "Identify the main object in this image. \
Respond with JSON containing its name, category, a short description, tags, \
two interesting facts, and its boundingBox as [ymin, xmin, ymax, xmax] normalized to 0-1000.";

static DATA_URI_PREFIX: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^data:image/(?<kind>png|jpeg|jpg);base64,").expect("static regex"));

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
	#[error("no API key in the environment (set {})", API_KEY_VARS[0])]
	MissingApiKey,

	#[error("request failed: {0}")]
	Transport(#[from] ureq::Error),

	#[error("service returned HTTP {status}: {body}")]
	Service { status: u16, body: String },

	#[error("malformed response: {source}")]
	Malformed {
		raw: String,
		#[source]
		source: serde_json::Error,
	},
}

/// Anything that can turn an encoded still into an identification.
///
/// The app only talks to this trait so the capture pipeline can run against
/// a fake service.
pub trait Analyze: Send + Sync {
	/// `image` is a base64 data URI (png or jpeg).
	fn analyze(&self, image: &str) -> Result<AnalysisResponse, AnalysisError>;
}

pub struct Client {
	agent: ureq::Agent,
	api_key: String,
	endpoint: String,
	model: String,
}

impl Client {
	pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
		// Non-2xx answers are read so their body ends up in the error.
		// No timeout: the service's own limits apply.
		let config = ureq::Agent::config_builder().http_status_as_error(false).build();

		Self {
			agent: ureq::Agent::new_with_config(config),
			api_key: api_key.into(),
			endpoint: DEFAULT_ENDPOINT.to_string(),
			model: model.into(),
		}
	}

	/// Build a client using the first credential found in [`API_KEY_VARS`].
	pub fn from_env(model: impl Into<String>) -> Result<Self, AnalysisError> {
		let key = API_KEY_VARS
			.iter()
			.filter_map(|var| std::env::var(var).ok())
			.map(|v| v.trim().to_string())
			.find(|v| !v.is_empty())
			.ok_or(AnalysisError::MissingApiKey)?;
		Ok(Self::new(key, model))
	}

	pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
		self.endpoint = endpoint.into().trim_end_matches('/').to_string();
		self
	}

	pub fn model(&self) -> &str {
		&self.model
	}

	fn url(&self) -> String {
		format!("{}/models/{}:generateContent", self.endpoint, self.model)
	}
}

impl Analyze for Client {
	fn analyze(&self, image: &str) -> Result<AnalysisResponse, AnalysisError> {
		let body = schema::GenerateRequest::new(PROMPT, inline_image(image));

		let start = Instant::now();
		let mut res = self
			.agent
			.post(&self.url())
			.header("x-goog-api-key", &self.api_key)
			.send_json(&body)
			.inspect_err(|err| tracing::error!(error = %err, "vision request failed"))?;
		let status = res.status();
		let text = res.body_mut().read_to_string()?;
		let latency = start.elapsed();

		if !status.is_success() {
			tracing::error!(status = status.as_u16(), body = %text, "vision service error");
			return Err(AnalysisError::Service { status: status.as_u16(), body: text });
		}

		let envelope: schema::GenerateResponse = serde_json::from_str(&text).map_err(|source| {
			tracing::error!(raw = %text, "vision envelope is not valid JSON");
			AnalysisError::Malformed { raw: text.clone(), source }
		})?;

		parse_analysis(&envelope.text(), latency)
	}
}

/// Parse the model's answer text into a complete analysis.
///
/// Empty text is treated as `{}` and therefore fails like any other
/// incomplete answer.
pub fn parse_analysis(text: &str, latency: Duration) -> Result<AnalysisResponse, AnalysisError> {
	let text = if text.trim().is_empty() { "{}" } else { text };

	match serde_json::from_str::<ObjectAnalysis>(text) {
		Ok(analysis) => {
			tracing::debug!(name = %analysis.name, latency_ms = latency.as_millis() as u64, "analysis parsed");
			Ok(AnalysisResponse {
				analysis,
				debug: DebugInfo {
					latency_ms: latency.as_millis() as u64,
					raw_response: text.to_string(),
					timestamp: chrono::Local::now(),
				},
			})
		}
		Err(source) => {
			tracing::error!(raw = %text, error = %source, "analysis JSON error");
			Err(AnalysisError::Malformed { raw: text.to_string(), source })
		}
	}
}

/// Strip a `data:image/...;base64,` prefix and pick the matching mime type.
///
/// Input without a recognised prefix is passed through as a JPEG payload.
fn inline_image(image: &str) -> schema::InlineData<'_> {
	match DATA_URI_PREFIX.captures(image) {
		Some(caps) => {
			let mime_type = if &caps["kind"] == "png" { "image/png" } else { "image/jpeg" };
			schema::InlineData { mime_type, data: &image[caps[0].len()..] }
		}
		None => schema::InlineData { mime_type: "image/jpeg", data: image },
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const MUG: &str = r#"{"name":"Mug","category":"Kitchenware","description":"A ceramic mug.","confidence":0.92,
		"tags":["ceramic","white"],"interestingFacts":["Fact A"],"boundingBox":[100,100,300,300]}"#;

	#[test]
	fn parses_complete_answer() {
		let res = parse_analysis(MUG, Duration::from_millis(420)).unwrap();
		assert_eq!(res.analysis.name, "Mug");
		assert_eq!(res.analysis.category, "Kitchenware");
		assert_eq!(res.analysis.bounding_box, Some(imaging::BoundingBox::new(100, 100, 300, 300)));
		assert_eq!(res.debug.latency_ms, 420);
		assert_eq!(res.debug.raw_response, MUG);
	}

	#[test]
	fn malformed_json_is_a_failure() {
		for text in ["not json at all", r#"{"name":"Mug","#, "", r#"{"name":"Mug"}"#] {
			match parse_analysis(text, Duration::ZERO) {
				Err(AnalysisError::Malformed { .. }) => {}
				other => panic!("expected malformed failure for {text:?}, got {other:?}"),
			}
		}
	}

	#[test]
	fn data_uri_prefix_is_stripped() {
		assert_eq!(
			inline_image("data:image/png;base64,AAAA"),
			schema::InlineData { mime_type: "image/png", data: "AAAA" }
		);
		assert_eq!(
			inline_image("data:image/jpg;base64,BBBB"),
			schema::InlineData { mime_type: "image/jpeg", data: "BBBB" }
		);
		assert_eq!(
			inline_image("data:image/jpeg;base64,CCCC"),
			schema::InlineData { mime_type: "image/jpeg", data: "CCCC" }
		);
		assert_eq!(inline_image("DDDD"), schema::InlineData { mime_type: "image/jpeg", data: "DDDD" });
	}

	#[test]
	fn request_declares_deterministic_schema_contract() {
		let body = serde_json::to_value(schema::GenerateRequest::new(PROMPT, inline_image("data:image/jpeg;base64,QQ"))).unwrap();

		let config = &body["generationConfig"];
		assert_eq!(config["temperature"], 0.0);
		assert_eq!(config["thinkingConfig"]["thinkingBudget"], 0);
		assert_eq!(config["responseMimeType"], "application/json");

		let required = config["responseSchema"]["required"].as_array().unwrap();
		assert_eq!(required.len(), 7);
		assert!(!required.iter().any(|v| v == "suggestedActions"));
		assert_eq!(config["responseSchema"]["properties"]["boundingBox"]["items"]["type"], "INTEGER");

		let parts = body["contents"][0]["parts"].as_array().unwrap();
		assert_eq!(parts[0]["text"], PROMPT);
		assert_eq!(parts[1]["inlineData"]["mimeType"], "image/jpeg");
		assert_eq!(parts[1]["inlineData"]["data"], "QQ");
	}

	#[test]
	fn envelope_text_joins_first_candidate_parts() {
		let envelope: schema::GenerateResponse = serde_json::from_str(
			r#"{"candidates":[{"content":{"parts":[{"text":"{\"a\":"},{"text":"1}"}]}},{"content":{"parts":[{"text":"x"}]}}]}"#,
		)
		.unwrap();
		assert_eq!(envelope.text(), r#"{"a":1}"#);

		let empty: schema::GenerateResponse = serde_json::from_str("{}").unwrap();
		assert_eq!(empty.text(), "");
	}

	/// Answer one HTTP request with `status` and `body`; the thread returns
	/// the request head it received.
	fn serve_once(status: &'static str, body: String) -> (String, std::thread::JoinHandle<String>) {
		use std::io::{BufRead, BufReader, Read, Write};

		let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
		let endpoint = format!("http://{}/v1beta/", listener.local_addr().unwrap());

		let handle = std::thread::spawn(move || {
			let (mut stream, _) = listener.accept().unwrap();
			let mut reader = BufReader::new(stream.try_clone().unwrap());

			let mut head = String::new();
			let mut length = 0;
			loop {
				let mut line = String::new();
				if reader.read_line(&mut line).unwrap() == 0 || line == "\r\n" {
					break;
				}
				if let Some(value) = line.to_ascii_lowercase().strip_prefix("content-length:") {
					length = value.trim().parse().unwrap();
				}
				head.push_str(&line);
			}
			let mut request_body = vec![0; length];
			reader.read_exact(&mut request_body).unwrap();

			write!(
				stream,
				"HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
				body.len()
			)
			.unwrap();
			head
		});
		(endpoint, handle)
	}

	fn client(endpoint: &str) -> Client {
		Client::new("test-key", "test-model").with_endpoint(endpoint)
	}

	#[test]
	fn posts_to_generate_content_with_key_header() {
		let envelope = serde_json::json!({
			"candidates": [{ "content": { "parts": [{ "text": MUG }] } }]
		});
		let (endpoint, server) = serve_once("200 OK", envelope.to_string());

		let res = client(&endpoint).analyze("data:image/jpeg;base64,QQ").unwrap();
		assert_eq!(res.analysis.name, "Mug");
		assert_eq!(res.debug.raw_response, MUG);

		let head = server.join().unwrap();
		assert!(
			head.starts_with("POST /v1beta/models/test-model:generateContent HTTP/1.1\r\n"),
			"{head}"
		);
		assert!(head.to_ascii_lowercase().contains("x-goog-api-key: test-key\r\n"), "{head}");
	}

	#[test]
	fn non_success_status_is_a_service_error() {
		let (endpoint, server) = serve_once("500 Internal Server Error", r#"{"error":1}"#.to_string());

		match client(&endpoint).analyze("data:image/jpeg;base64,QQ") {
			Err(AnalysisError::Service { status, body }) => {
				assert_eq!(status, 500);
				assert_eq!(body, r#"{"error":1}"#);
			}
			other => panic!("expected service error, got {other:?}"),
		}
		server.join().unwrap();
	}

	#[test]
	fn unreadable_envelope_is_malformed() {
		let (endpoint, server) = serve_once("200 OK", "<html>gateway</html>".to_string());

		match client(&endpoint).analyze("data:image/jpeg;base64,QQ") {
			Err(AnalysisError::Malformed { raw, .. }) => assert_eq!(raw, "<html>gateway</html>"),
			other => panic!("expected malformed failure, got {other:?}"),
		}
		server.join().unwrap();
	}
}
