use std::sync::Arc;
use std::time::{Duration, Instant};

use egui::{TextureHandle, TextureOptions};
use imaging::Size;

mod card;
mod ext;
mod history;
mod hud;
mod settings;

use crate::capture::{Camera, CameraRequest, CameraStatus, FrameSource};
use crate::lens::{Lens, LensSettings};
use crate::state::Action;
use crate::tr;

const FRAME_INTERVAL: Duration = Duration::from_millis(33);

pub struct ArLens {
	lens: Lens,
	camera: Camera,

	video: Option<TextureHandle>,
	video_size: Size,
	video_frame: u64,

	thumbnails: history::Thumbnails,
}

impl ArLens {
	pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
		let config = crate::config_read();
		cc.egui_ctx.set_zoom_factor(config.ui_zoom_factor);

		let analyzer = match vision::Client::from_env(config.model.as_str()) {
			Ok(client) => {
				tracing::info!(model = client.model(), "analysis service configured");
				Some(Arc::new(client) as Arc<dyn vision::Analyze>)
			}
			Err(err) => {
				tracing::warn!(error = %err, "analysis disabled");
				None
			}
		};

		let lens = Lens::new(analyzer, LensSettings::from_config(&config), Instant::now());
		let camera = Camera::open(CameraRequest::from_config(&config));

		Self {
			lens,
			camera,
			video: None,
			video_size: Size::new(0.0, 0.0),
			video_frame: 0,
			thumbnails: history::Thumbnails::default(),
		}
	}

	/// Upload the newest camera frame, if it changed since the last one.
	fn upload_video(&mut self, ctx: &egui::Context) {
		let number = self.camera.frame_number();
		if number == self.video_frame {
			return;
		}
		let Some(frame) = self.camera.latest() else {
			return;
		};
		self.video_frame = number;
		if frame.width() == 0 || frame.height() == 0 {
			return;
		}

		let size = [frame.width() as usize, frame.height() as usize];
		let image = egui::ColorImage::from_rgb(size, frame.as_bytes());
		match &mut self.video {
			Some(texture) => texture.set(image, TextureOptions::LINEAR),
			None => self.video = Some(ctx.load_texture("camera", image, TextureOptions::LINEAR)),
		}
		self.video_size = frame.size();
	}

	fn ui_viewport(&self, ui: &mut egui::Ui) {
		let area = ui.max_rect();
		let painter = ui.painter();
		painter.rect_filled(area, egui::CornerRadius::ZERO, egui::Color32::BLACK);

		let Some(texture) = &self.video else {
			return;
		};
		crate::overlay::paint_video(painter, texture, self.video_size, area);

		let state = self.lens.state();
		if let (Some(bbox), Some(analysis)) = (state.overlay_box(), &state.current) {
			crate::overlay::paint_tracking_box(painter, bbox, self.video_size, area, &analysis.name);
		}
	}

	fn reopen_camera(&mut self) {
		let request = CameraRequest::from_config(&crate::config_read());
		tracing::info!(?request, "reopening camera");
		self.camera.close();
		self.camera = Camera::open(request);
		self.video = None;
		self.video_frame = 0;
	}
}

impl eframe::App for ArLens {
	fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
		let zoom = crate::config_read().ui_zoom_factor;
		if (ctx.zoom_factor() - zoom).abs() > f32::EPSILON {
			ctx.set_zoom_factor(zoom);
		}

		let now = Instant::now();
		self.lens.update(now, &self.camera);
		self.upload_video(ctx);

		let mut actions = Vec::new();
		let state = self.lens.state();

		hud::header(ctx, &self.lens, &mut actions);
		if state.show_history {
			history::panel(ctx, &state.history, &mut self.thumbnails, &mut actions);
		}

		egui::CentralPanel::default()
			.frame(egui::Frame::NONE)
			.show(ctx, |ui| self.ui_viewport(ui));

		let starting = self.camera.status() == CameraStatus::Starting;
		hud::banner(ctx, state.error.as_ref(), starting, &mut actions);
		hud::processing(ctx, state.analyzing);
		if let Some(analysis) = &state.current {
			card::show(ctx, analysis, state.minimized, &mut actions);
		}
		hud::controls(ctx, &self.lens, &mut actions);

		if state.show_settings {
			let mut open = true;
			let mut saved = false;
			egui::Window::new(tr!("settings-title"))
				.open(&mut open)
				.default_size([360.0, 420.0])
				.show(ctx, |ui| saved = settings::ui(ui));
			if !open {
				actions.push(Action::ToggleSettings);
			}
			if saved {
				let config = crate::config_read();
				self.lens.configure(config.scan_timing(), config.jpeg_quality);
			}
		}

		for action in actions {
			if action == Action::RetryCamera {
				self.reopen_camera();
			}
			self.lens.dispatch(action, now, &self.camera);
		}

		let wait = self
			.lens
			.time_until_next_scan(Instant::now())
			.map_or(FRAME_INTERVAL, |due| due.min(FRAME_INTERVAL));
		ctx.request_repaint_after(wait);
	}
}

impl Drop for ArLens {
	fn drop(&mut self) {
		self.lens.shutdown();
	}
}
