//! Painting the camera image and the tracking box over it.
//!
//! Both go through [`imaging::geometry`] with the same source and container
//! sizes, so the box lines up with what is on screen.

use egui::{Color32, CornerRadius, Painter, Pos2, Rect, Stroke, StrokeKind, TextureHandle, pos2, vec2};
use imaging::{BoundingBox, ScreenRect, Size, geometry};

pub const ACCENT: Color32 = Color32::from_rgb(34, 211, 238);
pub const PANEL_FILL: Color32 = Color32::from_black_alpha(150);
pub const PANEL_RADIUS: u8 = 10;

const BOX_FILL: Color32 = Color32::from_rgba_premultiplied(4, 21, 24, 26);
const BOX_STROKE: f32 = 1.5;
const BRACKET_STROKE: f32 = 4.0;
const BRACKET_LEN: f32 = 18.0;
const LABEL_HEIGHT: f32 = 22.0;

/// Translate a rectangle computed relative to `area` into screen space.
pub fn to_screen(rect: ScreenRect, area: Rect) -> Rect {
	Rect::from_min_size(area.min + vec2(rect.left, rect.top), vec2(rect.width, rect.height))
}

fn container(area: Rect) -> Size {
	Size::new(area.width(), area.height())
}

/// Draw the frame so it fills `area`, cropping whatever overflows.
pub fn paint_video(painter: &Painter, texture: &TextureHandle, source: Size, area: Rect) {
	let Some(cover) = geometry::cover(source, container(area)) else {
		return;
	};

	let uv = Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0));
	painter
		.with_clip_rect(area)
		.image(texture.id(), to_screen(cover, area), uv, Color32::WHITE);
}

/// Draw the box for `bbox` with corner brackets and `label` above it.
///
/// Does nothing when the box cannot be projected (no frame yet).
pub fn paint_tracking_box(painter: &Painter, bbox: BoundingBox, source: Size, area: Rect, label: &str) {
	let Some(rect) = geometry::project(bbox, source, container(area)) else {
		return;
	};
	let rect = to_screen(rect, area);
	let painter = painter.with_clip_rect(area);

	painter.rect_filled(rect, CornerRadius::same(4), BOX_FILL);
	painter.rect_stroke(
		rect,
		CornerRadius::same(4),
		Stroke::new(BOX_STROKE, ACCENT.gamma_multiply(0.6)),
		StrokeKind::Middle,
	);

	let bracket = Stroke::new(BRACKET_STROKE, ACCENT);
	for segment in corner_brackets(rect, BRACKET_LEN) {
		painter.line_segment(segment, bracket);
	}

	paint_label(&painter, rect, label);
}

fn paint_label(painter: &Painter, rect: Rect, label: &str) {
	let galley = painter.layout_no_wrap(label.to_uppercase(), egui::FontId::proportional(13.0), Color32::BLACK);
	let size = vec2(galley.size().x + 16.0, LABEL_HEIGHT);
	let min = pos2(rect.left(), rect.top() - size.y - 6.0);
	let tag = Rect::from_min_size(min, size);

	painter.rect_filled(tag, CornerRadius::same(4), ACCENT);
	let text_pos = tag.center() - galley.size() / 2.0;
	painter.galley(text_pos, galley, Color32::BLACK);
}

/// Two segments per corner, each `len` long (shortened for small boxes).
pub fn corner_brackets(rect: Rect, len: f32) -> [[Pos2; 2]; 8] {
	let len = len.min(rect.width() / 2.0).min(rect.height() / 2.0).max(0.0);
	let (l, r, t, b) = (rect.left(), rect.right(), rect.top(), rect.bottom());

	[
		[pos2(l, t), pos2(l + len, t)],
		[pos2(l, t), pos2(l, t + len)],
		[pos2(r, t), pos2(r - len, t)],
		[pos2(r, t), pos2(r, t + len)],
		[pos2(l, b), pos2(l + len, b)],
		[pos2(l, b), pos2(l, b - len)],
		[pos2(r, b), pos2(r - len, b)],
		[pos2(r, b), pos2(r, b - len)],
	]
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn projected_box_is_offset_by_area() {
		let area = Rect::from_min_size(pos2(0.0, 40.0), vec2(1000.0, 500.0));
		let rect = geometry::project(BoundingBox::new(100, 100, 300, 300), Size::new(500.0, 500.0), container(area))
			.unwrap();

		let screen = to_screen(rect, area);
		assert_eq!(screen.min, pos2(100.0, -110.0));
		assert_eq!(screen.size(), vec2(200.0, 200.0));
	}

	#[test]
	fn brackets_touch_every_corner() {
		let rect = Rect::from_min_max(pos2(10.0, 10.0), pos2(110.0, 60.0));
		let segments = corner_brackets(rect, 18.0);

		for corner in [rect.left_top(), rect.right_top(), rect.left_bottom(), rect.right_bottom()] {
			assert_eq!(segments.iter().filter(|s| s[0] == corner).count(), 2);
		}
		assert!(segments.iter().all(|s| (s[0] - s[1]).length() == 18.0));
	}

	#[test]
	fn brackets_shrink_for_tiny_boxes() {
		let rect = Rect::from_min_max(pos2(0.0, 0.0), pos2(10.0, 30.0));
		assert!(corner_brackets(rect, 18.0).iter().all(|s| (s[0] - s[1]).length() == 5.0));
	}
}
