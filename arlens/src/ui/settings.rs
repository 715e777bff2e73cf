use crate::tr;
use crate::ui::ext::UiExt;

/// Edits the live config. Returns true once the user pressed Save.
pub fn ui(ui: &mut egui::Ui) -> bool {
	let mut config = crate::config();

	ui.label(egui::RichText::new(tr!("settings-camera")).strong());
	ui.num_edit_range(&mut config.camera_index, tr!("settings-camera-index"), 0..=16);
	ui.num_edit_range(&mut config.ideal_width, tr!("settings-resolution-width"), 160..=3840);
	ui.num_edit_range(&mut config.ideal_height, tr!("settings-resolution-height"), 120..=2160);
	ui.small(tr!("settings-camera-note"));

	ui.spacer();
	ui.label(egui::RichText::new(tr!("settings-scan")).strong());
	ui.checkbox(&mut config.auto_scan, tr!("settings-auto-scan"));
	ui.num_edit_range(&mut config.scan_delay_ms, tr!("settings-scan-delay"), 200..=30_000);
	ui.num_edit_range(&mut config.debounce_ms, tr!("settings-debounce"), 0..=10_000);
	ui.num_edit_range(&mut config.jpeg_quality, tr!("settings-jpeg-quality"), 1..=100);

	ui.spacer();
	ui.label(egui::RichText::new(tr!("settings-service")).strong());
	ui.horizontal(|ui| {
		ui.text_edit_singleline(&mut config.model);
		ui.label(tr!("settings-model"));
	});

	ui.spacer();
	ui.label(egui::RichText::new(tr!("settings-display")).strong());
	ui.num_edit_range(&mut config.ui_zoom_factor, tr!("settings-zoom"), 0.5..=3.0);

	ui.spacer();
	if !ui.button(tr!("settings-save")).clicked() {
		return false;
	}

	if let Err(err) = config.save() {
		tracing::error!(error = %format!("{err:#}"), "failed to save config");
	}
	true
}
