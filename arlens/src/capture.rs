//! Camera acquisition.
//!
//! The device is opened and read on its own thread (camera handles are not
//! `Send` on every backend). The UI only sees a status and the latest decoded
//! frame through [`FrameSource`].

use std::sync::{
	Arc, Mutex, PoisonError,
	atomic::{AtomicBool, AtomicU64, Ordering},
};
use std::thread::JoinHandle;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use imaging::Frame;
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{ApiBackend, CameraFormat, FrameFormat, RequestedFormat, RequestedFormatType, Resolution};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraStatus {
	Starting,
	Ready,
	/// Terminal for this adapter; a retry opens a new one.
	Failed(String),
}

/// Read side of a live video source.
pub trait FrameSource {
	fn status(&self) -> CameraStatus;

	/// Most recent decoded frame, if any arrived yet.
	fn latest(&self) -> Option<Arc<Frame>>;

	/// Increments with every published frame.
	fn frame_number(&self) -> u64;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraRequest {
	pub index: u32,
	pub width: u32,
	pub height: u32,
}

impl CameraRequest {
	pub fn from_config(config: &crate::config::Config) -> Self {
		Self {
			index: config.camera_index,
			width: config.ideal_width,
			height: config.ideal_height,
		}
	}
}

/// Back-to-back frame errors after which the device counts as lost
/// (about two seconds at the retry pause below).
const LOST_AFTER: u32 = 40;
const RETRY_PAUSE: Duration = Duration::from_millis(50);

struct Shared {
	status: Mutex<CameraStatus>,
	latest: Mutex<Option<Arc<Frame>>>,
	frame_number: AtomicU64,
	stop: AtomicBool,
}

impl Shared {
	fn new() -> Self {
		Self {
			status: Mutex::new(CameraStatus::Starting),
			latest: Mutex::new(None),
			frame_number: AtomicU64::new(0),
			stop: AtomicBool::new(false),
		}
	}

	fn set_status(&self, status: CameraStatus) {
		*self.status.lock().unwrap_or_else(PoisonError::into_inner) = status;
	}

	fn publish(&self, frame: Frame) {
		*self.latest.lock().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(frame));
		self.frame_number.fetch_add(1, Ordering::Release);
	}

	/// The device stopped delivering. Drops the stale frame so nothing
	/// keeps analysing it.
	fn lose(&self, reason: String) {
		*self.latest.lock().unwrap_or_else(PoisonError::into_inner) = None;
		self.set_status(CameraStatus::Failed(reason));
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
	Published,
	Dropped,
	Lost,
}

/// Feed one read attempt into the shared slot. `failures` counts errors in a
/// row and resets on every good frame.
fn step(result: Result<Frame>, shared: &Shared, failures: &mut u32) -> Step {
	match result {
		Ok(frame) => {
			*failures = 0;
			shared.publish(frame);
			Step::Published
		}
		Err(err) if *failures + 1 >= LOST_AFTER => {
			let message = format!("{err:#}");
			tracing::error!(error = %message, failures = LOST_AFTER, "camera lost");
			shared.lose(message);
			Step::Lost
		}
		Err(err) => {
			*failures += 1;
			tracing::warn!(error = ?err, failures = *failures, "dropped camera frame");
			Step::Dropped
		}
	}
}

pub struct Camera {
	shared: Arc<Shared>,
	handle: Option<JoinHandle<()>>,
}

impl Camera {
	/// Start opening the device in the background. Check [`FrameSource::status`]
	/// for the outcome.
	pub fn open(request: CameraRequest) -> Self {
		let shared = Arc::new(Shared::new());

		let thread_shared = shared.clone();
		let handle = std::thread::Builder::new()
			.name("camera".into())
			.spawn(move || run(request, &thread_shared));

		let handle = match handle {
			Ok(handle) => Some(handle),
			Err(err) => {
				tracing::error!(error = %err, "failed to spawn camera thread");
				shared.set_status(CameraStatus::Failed(err.to_string()));
				None
			}
		};

		Self { shared, handle }
	}

	/// Stop the capture thread and release the device.
	pub fn close(&mut self) {
		self.shared.stop.store(true, Ordering::Release);
		if let Some(handle) = self.handle.take()
			&& handle.join().is_err()
		{
			tracing::warn!("camera thread panicked");
		}
	}
}

impl FrameSource for Camera {
	fn status(&self) -> CameraStatus {
		self.shared.status.lock().unwrap_or_else(PoisonError::into_inner).clone()
	}

	fn latest(&self) -> Option<Arc<Frame>> {
		self.shared.latest.lock().unwrap_or_else(PoisonError::into_inner).clone()
	}

	fn frame_number(&self) -> u64 {
		self.shared.frame_number.load(Ordering::Acquire)
	}
}

impl Drop for Camera {
	fn drop(&mut self) {
		self.close();
	}
}

fn run(request: CameraRequest, shared: &Shared) {
	let mut camera = match open_device(&request) {
		Ok(camera) => camera,
		Err(err) => {
			let message = format!("{err:#}");
			tracing::error!(error = %message, "camera unavailable");
			shared.set_status(CameraStatus::Failed(message));
			return;
		}
	};

	let resolution = camera.resolution();
	tracing::info!(
		width = resolution.width(),
		height = resolution.height(),
		fps = camera.frame_rate(),
		"camera ready"
	);
	shared.set_status(CameraStatus::Ready);

	let mut decoded = 0u64;
	let mut failures = 0;
	while !shared.stop.load(Ordering::Acquire) {
		match step(next_frame(&mut camera), shared, &mut failures) {
			Step::Published => decoded += 1,
			Step::Dropped => std::thread::sleep(RETRY_PAUSE),
			Step::Lost => break,
		}
	}

	if let Err(err) = camera.stop_stream() {
		tracing::debug!(error = %err, "stop_stream failed");
	}
	tracing::info!(frames = decoded, "camera stopped");
}

fn open_device(request: &CameraRequest) -> Result<nokhwa::Camera> {
	let devices = nokhwa::query(ApiBackend::Auto).context("query capture devices")?;
	let names = devices.iter().map(|d| d.human_name()).collect::<Vec<_>>();
	tracing::debug!(?names, "capture devices");

	let Some(position) = pick_device(&names, request.index) else {
		bail!("no camera found (looked for device {} among {})", request.index, names.len());
	};
	let device = &devices[position];
	tracing::info!(name = %device.human_name(), "opening camera");

	let format = CameraFormat::new(Resolution::new(request.width, request.height), FrameFormat::MJPEG, 30);
	let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(format));

	let mut camera = nokhwa::Camera::new(device.index().clone(), requested).context("open camera")?;
	camera.open_stream().context("start camera stream")?;
	Ok(camera)
}

fn next_frame(camera: &mut nokhwa::Camera) -> Result<Frame> {
	let buffer = camera.frame().context("fetch frame")?;
	let decoded = buffer.decode_image::<RgbFormat>().context("decode frame")?;
	let (width, height) = (decoded.width(), decoded.height());
	Frame::from_rgb(width, height, decoded.into_raw()).context("frame buffer size mismatch")
}

/// A non-zero `preferred` index is taken as is. Otherwise a device that
/// names itself a rear/back camera wins over the first one.
fn pick_device(names: &[String], preferred: u32) -> Option<usize> {
	let preferred = preferred as usize;
	if preferred != 0 {
		return (preferred < names.len()).then_some(preferred);
	}
	names.iter().position(|name| is_rear_facing(name)).or_else(|| (!names.is_empty()).then_some(0))
}

fn is_rear_facing(name: &str) -> bool {
	name.split(|c: char| !c.is_alphanumeric())
		.any(|word| word.eq_ignore_ascii_case("rear") || word.eq_ignore_ascii_case("back"))
}
