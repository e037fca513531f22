//! UI rendering helpers.
//!
//! Texture preparation and the drop-zone visuals, kept out of the main app
//! loop so `app.rs` stays focused on state and events.

use eframe::egui;
use image::DynamicImage;

/// Converts a decoded image into an egui texture source.
///
/// This is the expensive pixel copy; workers do it off the UI thread and ship
/// the [`egui::ColorImage`] over the event channel.
pub fn color_image(image: &DynamicImage) -> egui::ColorImage {
    let rgba = image.to_rgba8();
    let size = [image.width() as usize, image.height() as usize];
    let pixels = rgba.as_flat_samples();
    egui::ColorImage::from_rgba_unmultiplied(size, pixels.as_slice())
}

/// Draws the landing drop zone: a stroked rectangle with a hint label,
/// highlighted while files hover over the window.
pub fn draw_drop_zone(painter: &egui::Painter, rect: egui::Rect, hovering: bool) {
    let (stroke_color, fill) = if hovering {
        (
            egui::Color32::from_rgb(110, 170, 255),
            egui::Color32::from_rgb(30, 45, 70),
        )
    } else {
        (
            egui::Color32::GRAY,
            egui::Color32::from_rgb(30, 30, 30),
        )
    };

    painter.rect_filled(rect, 8.0, fill);
    painter.rect_stroke(
        rect,
        8.0,
        egui::Stroke::new(2.0, stroke_color),
        egui::StrokeKind::Inside,
    );

    let hint = if hovering {
        "Release to load the image"
    } else {
        "Drag an image here"
    };
    painter.text(
        rect.center(),
        egui::Align2::CENTER_CENTER,
        hint,
        egui::FontId::proportional(18.0),
        egui::Color32::LIGHT_GRAY,
    );
}

/// Fits image dimensions into a bounding box, preserving aspect ratio and
/// never upscaling.
pub fn fit_preview(size: [usize; 2], max_width: f32, max_height: f32) -> egui::Vec2 {
    let (width, height) = (size[0] as f32, size[1] as f32);
    let scale = (max_width / width).min(max_height / height).min(1.0);
    egui::vec2(width * scale, height * scale)
}
