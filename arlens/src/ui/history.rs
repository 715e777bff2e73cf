use std::collections::HashMap;

use egui::{Color32, RichText, Sense, TextureHandle, TextureOptions};
use imaging::StillImage;

use crate::history::{HistoryEntry, HistoryStore};
use crate::overlay::ACCENT;
use crate::state::Action;
use crate::tr;

const THUMB_HEIGHT: u32 = 48;

/// Textures for history stills, keyed by entry id.
#[derive(Default)]
pub struct Thumbnails {
	textures: HashMap<String, TextureHandle>,
}

impl Thumbnails {
	fn get(&mut self, ctx: &egui::Context, entry: &HistoryEntry) -> Option<TextureHandle> {
		if let Some(texture) = self.textures.get(&entry.id) {
			return Some(texture.clone());
		}

		let frame = match StillImage::decode(&entry.image) {
			Ok(frame) => frame.thumbnail(THUMB_HEIGHT),
			Err(err) => {
				tracing::debug!(id = %entry.id, error = %err, "history image not decodable");
				return None;
			}
		};
		if frame.width() == 0 || frame.height() == 0 {
			return None;
		}

		let size = [frame.width() as usize, frame.height() as usize];
		let image = egui::ColorImage::from_rgb(size, frame.as_bytes());
		let texture = ctx.load_texture(format!("history-{}", entry.id), image, TextureOptions::LINEAR);
		self.textures.insert(entry.id.clone(), texture.clone());
		Some(texture)
	}

	/// Drop textures for entries that fell out of the log.
	pub fn retain(&mut self, history: &HistoryStore) {
		self.textures.retain(|id, _| history.get(id).is_some());
	}
}

pub fn panel(ctx: &egui::Context, history: &HistoryStore, thumbnails: &mut Thumbnails, actions: &mut Vec<Action>) {
	thumbnails.retain(history);

	egui::SidePanel::right("history")
		.resizable(false)
		.exact_width(280.0)
		.show(ctx, |ui| {
			ui.horizontal(|ui| {
				ui.heading(tr!("history-title"));
				ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
					if ui.small_button("✕").clicked() {
						actions.push(Action::CloseHistory);
					}
				});
			});
			ui.separator();

			if history.is_empty() {
				ui.add_space(24.0);
				ui.vertical_centered(|ui| ui.label(RichText::new(tr!("history-empty")).color(Color32::GRAY)));
				return;
			}

			egui::ScrollArea::vertical().max_height(ui.available_height() - 40.0).show(ui, |ui| {
				for entry in history.list() {
					let thumbnail = thumbnails.get(ui.ctx(), entry);
					if row(ui, entry, thumbnail).clicked() {
						actions.push(Action::SelectHistory(entry.id.clone()));
					}
				}
			});

			ui.separator();
			if ui.button(tr!("history-clear")).clicked() {
				actions.push(Action::ClearHistory);
			}
		});
}

fn row(ui: &mut egui::Ui, entry: &HistoryEntry, thumbnail: Option<TextureHandle>) -> egui::Response {
	let response = egui::Frame::default()
		.inner_margin(egui::Margin::same(4))
		.show(ui, |ui| {
			ui.set_width(ui.available_width());
			ui.horizontal(|ui| {
				match &thumbnail {
					Some(texture) => {
						ui.add(egui::Image::from_texture(texture).max_height(THUMB_HEIGHT as f32));
					}
					None => {
						ui.allocate_space(egui::vec2(THUMB_HEIGHT as f32, THUMB_HEIGHT as f32));
					}
				}
				ui.vertical(|ui| {
					ui.label(RichText::new(&entry.analysis.name).strong());
					ui.horizontal(|ui| {
						ui.small(RichText::new(&entry.analysis.category).color(ACCENT));
						ui.small(entry.timestamp.format("%H:%M").to_string());
					});
				});
			});
		})
		.response
		.interact(Sense::click());

	if response.hovered() {
		ui.painter()
			.rect_filled(response.rect, egui::CornerRadius::same(4), Color32::from_white_alpha(12));
	}
	response.on_hover_cursor(egui::CursorIcon::PointingHand)
}
