//! Capture-and-analyze pipeline.
//!
//! `Lens` owns the app state and the scan loop. Each update it picks up
//! camera status changes and finished analyses, then starts a new cycle if
//! one is due. Requests run on short-lived worker threads and report back
//! over a channel, so the UI thread never blocks on the network.

use std::sync::{
	Arc,
	mpsc::{self, Receiver, Sender},
};
use std::time::{Duration, Instant};

use vision::Analyze;

use crate::capture::{CameraStatus, FrameSource};
use crate::scan::{ScanLoop, ScanTiming, Skip};
use crate::state::{Action, AppState, Banner, Completion};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LensSettings {
	pub timing: ScanTiming,
	pub auto_scan: bool,
	pub jpeg_quality: u8,
}

impl LensSettings {
	pub fn from_config(config: &crate::config::Config) -> Self {
		Self {
			timing: config.scan_timing(),
			auto_scan: config.auto_scan,
			jpeg_quality: config.jpeg_quality,
		}
	}
}

pub struct Lens {
	state: AppState,
	scan: ScanLoop,
	analyzer: Option<Arc<dyn Analyze>>,
	jpeg_quality: u8,
	camera: CameraStatus,
	tx: Sender<Completion>,
	rx: Receiver<Completion>,
}

impl Lens {
	/// Without an analyzer the lens still shows video but never captures.
	pub fn new(analyzer: Option<Arc<dyn Analyze>>, settings: LensSettings, now: Instant) -> Self {
		let (tx, rx) = mpsc::channel();
		let state = AppState {
			auto_scan: settings.auto_scan,
			error: analyzer.is_none().then_some(Banner::MissingApiKey),
			..AppState::default()
		};

		Self {
			state,
			scan: ScanLoop::new(settings.timing, settings.auto_scan, now),
			analyzer,
			jpeg_quality: settings.jpeg_quality,
			camera: CameraStatus::Starting,
			tx,
			rx,
		}
	}

	pub fn state(&self) -> &AppState {
		&self.state
	}

	pub fn can_capture(&self) -> bool {
		self.analyzer.is_some() && self.state.camera_ready && !self.state.analyzing
	}

	/// Settings changed at runtime. Takes effect from the next cycle.
	pub fn configure(&mut self, timing: ScanTiming, jpeg_quality: u8) {
		self.scan.set_timing(timing);
		self.jpeg_quality = jpeg_quality;
	}

	/// How long the UI may sleep before the next automatic cycle is due.
	pub fn time_until_next_scan(&self, now: Instant) -> Option<Duration> {
		self.scan.time_until_due(now)
	}

	pub fn update(&mut self, now: Instant, source: &dyn FrameSource) {
		self.sync_camera(source.status());
		self.drain(now);

		let ready = self.state.camera_ready && self.analyzer.is_some();
		if self.scan.due(now, ready) && !self.start_cycle(now, source) && !self.scan.in_flight() {
			self.scan.skip_auto(now);
		}
	}

	pub fn dispatch(&mut self, action: Action, now: Instant, source: &dyn FrameSource) {
		let Some(action) = self.state.apply(action) else {
			return;
		};

		match action {
			Action::ToggleAutoScan => {
				let on = !self.state.auto_scan;
				self.state.auto_scan = on;
				self.scan.set_auto(on, now);
				tracing::info!(auto_scan = on, "scan mode changed");
			}
			Action::Capture => {
				if self.state.camera_ready {
					self.start_cycle(now, source);
				}
			}
			Action::RetryCamera => {
				self.camera = CameraStatus::Starting;
				self.state.camera_ready = false;
				if matches!(self.state.error, Some(Banner::Camera(_))) {
					self.state.error = None;
				}
			}
			other => tracing::debug!(?other, "unhandled action"),
		}
	}

	/// Stop scheduling. An in-flight request still completes into the channel
	/// but nobody reads it.
	pub fn shutdown(&mut self) {
		self.scan.cancel();
	}

	fn sync_camera(&mut self, status: CameraStatus) {
		if status == self.camera {
			return;
		}

		match &status {
			CameraStatus::Starting => self.state.camera_ready = false,
			CameraStatus::Ready => self.state.camera_ready = true,
			CameraStatus::Failed(reason) => {
				self.state.camera_ready = false;
				self.state.error = Some(Banner::Camera(reason.clone()));
			}
		}
		self.camera = status;
	}

	fn drain(&mut self, now: Instant) {
		while let Ok(completion) = self.rx.try_recv() {
			self.receive(completion, now);
		}
	}

	fn receive(&mut self, completion: Completion, now: Instant) {
		self.state.complete(completion);
		self.scan.finish(now);
	}

	/// Returns whether a request was sent.
	fn start_cycle(&mut self, now: Instant, source: &dyn FrameSource) -> bool {
		let Some(analyzer) = self.analyzer.clone() else {
			return false;
		};
		if self.state.analyzing {
			return false;
		}
		if let Err(skip) = self.scan.begin(now) {
			if skip == Skip::Debounced {
				tracing::debug!("capture dropped; too soon after the previous one");
			}
			return false;
		}

		let Some(still) = source.latest().and_then(|frame| frame.sample(self.jpeg_quality)) else {
			self.scan.finish(now);
			return false;
		};

		self.state.analyzing = true;
		let generation = self.state.generation;
		let captured_at = chrono::Local::now();
		let tx = self.tx.clone();

		tracing::debug!(width = still.width, height = still.height, bytes = still.data_uri.len(), "sending frame");
		let spawned = std::thread::Builder::new().name("analysis".into()).spawn(move || {
			let result = analyzer.analyze(&still.data_uri);
			let completion = Completion {
				generation,
				captured_at,
				image: still.data_uri,
				result,
			};
			if tx.send(completion).is_err() {
				tracing::debug!("lens gone before analysis finished");
			}
		});

		if let Err(err) = spawned {
			tracing::error!(error = %err, "failed to spawn analysis worker");
			self.state.analyzing = false;
			self.scan.finish(now);
			return false;
		}
		true
	}
}
