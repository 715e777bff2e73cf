use egui::{Align2, Color32, CornerRadius, Margin, RichText};
use vision::ObjectAnalysis;

use crate::overlay::{ACCENT, PANEL_FILL, PANEL_RADIUS};
use crate::state::Action;
use crate::tr;

const CARD_WIDTH: f32 = 320.0;

/// Detail card for the current analysis, bottom right.
pub fn show(ctx: &egui::Context, analysis: &ObjectAnalysis, minimized: bool, actions: &mut Vec<Action>) {
	egui::Area::new(egui::Id::new("detail-card"))
		.anchor(Align2::RIGHT_BOTTOM, [-16.0, -72.0])
		.show(ctx, |ui| {
			egui::Frame::default()
				.fill(PANEL_FILL)
				.stroke(egui::Stroke::new(1.0, ACCENT.gamma_multiply(0.4)))
				.corner_radius(CornerRadius::same(PANEL_RADIUS))
				.inner_margin(Margin::same(12))
				.show(ui, |ui| {
					ui.set_width(CARD_WIDTH);
					title_row(ui, analysis, minimized, actions);
					if !minimized {
						body(ui, analysis);
					}
				});
		});
}

fn title_row(ui: &mut egui::Ui, analysis: &ObjectAnalysis, minimized: bool, actions: &mut Vec<Action>) {
	ui.horizontal(|ui| {
		ui.vertical(|ui| {
			ui.label(RichText::new(tr!("card-heading")).small().color(ACCENT));
			ui.label(RichText::new(&analysis.name).heading().color(Color32::WHITE));
		});

		ui.with_layout(egui::Layout::right_to_left(egui::Align::Min), |ui| {
			if ui.small_button("✕").on_hover_text(tr!("card-dismiss")).clicked() {
				actions.push(Action::Dismiss);
			}
			let (icon, hint) = if minimized {
				("⏶", tr!("card-expand"))
			} else {
				("⏷", tr!("card-collapse"))
			};
			if ui.small_button(icon).on_hover_text(hint).clicked() {
				actions.push(Action::ToggleMinimized);
			}
		});
	});
}

fn body(ui: &mut egui::Ui, analysis: &ObjectAnalysis) {
	ui.horizontal(|ui| {
		ui.label(RichText::new(&analysis.category).color(Color32::LIGHT_GRAY));
		ui.label("·");
		ui.label(RichText::new(tr!("card-confidence", percent = analysis.confidence_percent())).color(ACCENT));
	});

	ui.add_space(6.0);
	ui.label(&analysis.description);

	ui.add_space(6.0);
	ui.horizontal_wrapped(|ui| {
		for tag in analysis.headline_tags() {
			egui::Frame::default()
				.fill(Color32::from_white_alpha(20))
				.corner_radius(CornerRadius::same(4))
				.inner_margin(Margin::symmetric(6, 2))
				.show(ui, |ui| ui.label(RichText::new(format!("#{tag}")).small()));
		}
	});

	if let Some(fact) = analysis.first_fact() {
		ui.add_space(8.0);
		ui.label(RichText::new(tr!("card-insight")).small().color(ACCENT));
		ui.label(RichText::new(fact).italics());
	}
}
