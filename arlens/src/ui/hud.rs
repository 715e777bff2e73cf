use egui::{Align2, Color32, CornerRadius, Margin, RichText};

use crate::lens::Lens;
use crate::overlay::{ACCENT, PANEL_FILL, PANEL_RADIUS};
use crate::state::{Action, Banner};
use crate::tr;

const DANGER: Color32 = Color32::from_rgb(220, 38, 38);

fn panel() -> egui::Frame {
	egui::Frame::default()
		.fill(PANEL_FILL)
		.corner_radius(CornerRadius::same(PANEL_RADIUS))
		.inner_margin(Margin::same(8))
}

fn pill(ui: &mut egui::Ui, text: String, color: Color32) {
	egui::Frame::default()
		.fill(color.gamma_multiply(0.2))
		.stroke(egui::Stroke::new(1.0, color))
		.corner_radius(CornerRadius::same(12))
		.inner_margin(Margin::symmetric(8, 2))
		.show(ui, |ui| ui.label(RichText::new(text).small().color(color)));
}

pub fn header(ctx: &egui::Context, lens: &Lens, actions: &mut Vec<Action>) {
	let state = lens.state();

	egui::TopBottomPanel::top("header").show(ctx, |ui| {
		ui.horizontal(|ui| {
			ui.label(RichText::new(tr!("app-title")).strong());
			if state.auto_scan {
				pill(ui, tr!("status-active"), ACCENT);
			} else {
				pill(ui, tr!("status-ready"), Color32::GRAY);
			}

			if let Some(debug) = &state.last_debug {
				ui.small(tr!("status-latency", ms = debug.latency_ms))
					.on_hover_text(debug.timestamp.format("%H:%M:%S").to_string());
			}
			if let Some(failure) = &state.last_failure {
				ui.small(RichText::new(tr!("status-last-failure")).color(Color32::LIGHT_RED))
					.on_hover_text(failure);
			}

			ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
				if ui
					.selectable_label(state.show_settings, "⚙")
					.on_hover_text(tr!("settings-toggle"))
					.clicked()
				{
					actions.push(Action::ToggleSettings);
				}
				let history = format!("🕘 {}", state.history.len());
				if ui
					.selectable_label(state.show_history, history)
					.on_hover_text(tr!("history-toggle"))
					.clicked()
				{
					actions.push(Action::ToggleHistory);
				}
			});
		});
	});
}

/// Auto-scan toggle and manual capture, bottom centre.
pub fn controls(ctx: &egui::Context, lens: &Lens, actions: &mut Vec<Action>) {
	let auto = lens.state().auto_scan;

	egui::Area::new(egui::Id::new("controls"))
		.anchor(Align2::CENTER_BOTTOM, [0.0, -16.0])
		.show(ctx, |ui| {
			panel().show(ui, |ui| {
				ui.horizontal(|ui| {
					let toggle = if auto {
						tr!("control-auto-on")
					} else {
						tr!("control-auto-off")
					};
					if ui.selectable_label(auto, toggle).clicked() {
						actions.push(Action::ToggleAutoScan);
					}

					let capture = egui::Button::new(RichText::new(tr!("control-capture")).strong())
						.min_size(egui::vec2(96.0, 32.0));
					if ui.add_enabled(lens.can_capture(), capture).clicked() {
						actions.push(Action::Capture);
					}
				});
			});
		});
}

pub fn processing(ctx: &egui::Context, analyzing: bool) {
	if !analyzing {
		return;
	}

	egui::Area::new(egui::Id::new("processing"))
		.anchor(Align2::CENTER_TOP, [0.0, 56.0])
		.interactable(false)
		.show(ctx, |ui| {
			panel().show(ui, |ui| {
				ui.horizontal(|ui| {
					ui.add(egui::Spinner::new().color(ACCENT));
					ui.label(RichText::new(tr!("processing")).color(ACCENT));
				});
			});
		});
}

pub fn banner(ctx: &egui::Context, banner: Option<&Banner>, camera_starting: bool, actions: &mut Vec<Action>) {
	let Some(banner) = banner else {
		if camera_starting {
			egui::Area::new(egui::Id::new("camera-starting"))
				.anchor(Align2::CENTER_CENTER, [0.0, 0.0])
				.interactable(false)
				.show(ctx, |ui| {
					ui.horizontal(|ui| {
						ui.spinner();
						ui.label(tr!("camera-starting"));
					});
				});
		}
		return;
	};

	egui::Area::new(egui::Id::new("banner"))
		.anchor(Align2::CENTER_TOP, [0.0, 56.0])
		.show(ctx, |ui| {
			egui::Frame::default()
				.fill(DANGER.gamma_multiply(0.85))
				.corner_radius(CornerRadius::same(PANEL_RADIUS))
				.inner_margin(Margin::same(10))
				.show(ui, |ui| {
					ui.set_max_width(420.0);
					match banner {
						Banner::Camera(reason) => {
							ui.label(RichText::new(tr!("banner-camera")).color(Color32::WHITE).strong())
								.on_hover_text(reason);
							if ui.button(tr!("banner-retry")).clicked() {
								actions.push(Action::RetryCamera);
							}
						}
						Banner::MissingApiKey => {
							ui.label(RichText::new(tr!("banner-missing-key")).color(Color32::WHITE).strong());
						}
					}
				});
		});
}
