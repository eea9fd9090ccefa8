pub mod widget;

pub use widget::{MapCursor, MapWidget, MapWidgetConfig};

/// Shorthand for showing a [`MapWidget`] inside a [`egui::Ui`]
pub trait UiMapExt {
    fn map_widget(&mut self, widget: &mut MapWidget) -> egui::Response;
}

impl UiMapExt for egui::Ui {
    fn map_widget(&mut self, widget: &mut MapWidget) -> egui::Response {
        widget.show(self)
    }
}
