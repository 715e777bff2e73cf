use std::ops::RangeInclusive;

pub trait UiExt {
	/// Labelled drag value clamped to `range`.
	fn num_edit_range<N: egui::emath::Numeric>(
		&mut self,
		value: &mut N,
		label: impl Into<egui::WidgetText>,
		range: RangeInclusive<N>,
	) -> egui::Response;

	fn spacer(&mut self);
}

impl UiExt for egui::Ui {
	fn num_edit_range<N: egui::emath::Numeric>(
		&mut self,
		value: &mut N,
		label: impl Into<egui::WidgetText>,
		range: RangeInclusive<N>,
	) -> egui::Response {
		self.horizontal(|ui| {
			let response = ui.add(egui::DragValue::new(value).range(range));
			ui.label(label);
			response
		})
		.inner
	}

	fn spacer(&mut self) {
		self.add_space(6.0);
		self.separator();
		self.add_space(6.0);
	}
}
