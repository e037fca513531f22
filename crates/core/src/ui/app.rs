//! The converter window.
//!
//! `ConverterApp` implements `eframe::App` and renders whatever the
//! [`Controller`] says is visible. Long operations (file read, decode,
//! re-encode) run on a spawned worker thread that drives a current-thread
//! tokio runtime and reports back over an mpsc channel; completions carry the
//! controller's generation tag so stale ones are dropped.

use super::rendering::{color_image, draw_drop_zone, fit_preview};
use super::state::{Controller, Phase};
use crate::config::Config;
use crate::convert::{self, ConversionRequest, ConversionResult, TargetFormat};
use crate::error::{AppError, Result};
use crate::ingest::{self, PickedFile, Session};
use crate::sizing;
use eframe::egui;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;

/// Completions from worker threads. Preview pixels ride along so the UI
/// thread never decodes images itself.
enum AppEvent {
    Ingested {
        generation: u64,
        outcome: Result<(Session, Option<egui::ColorImage>)>,
    },
    Converted {
        generation: u64,
        outcome: Result<(ConversionResult, Option<egui::ColorImage>)>,
    },
}

/// The image converter application.
pub struct ConverterApp {
    config: Config,
    controller: Controller,

    // Textures are uploaded lazily from the pending images on the next frame.
    preview_texture: Option<egui::TextureHandle>,
    pending_preview: Option<egui::ColorImage>,
    result_texture: Option<egui::TextureHandle>,
    pending_result: Option<egui::ColorImage>,

    /// Transient feedback line ("Saved to …", "Copied …").
    status: Option<String>,

    rx: Receiver<AppEvent>,
    tx: Sender<AppEvent>,
}

impl ConverterApp {
    pub fn new(config: Config) -> Self {
        let (tx, rx) = channel();
        let controller = Controller::new(&config);

        Self {
            config,
            controller,
            preview_texture: None,
            pending_preview: None,
            result_texture: None,
            pending_result: None,
            status: None,
            rx,
            tx,
        }
    }

    /// Reads and validates a picked file on a worker thread.
    fn spawn_ingest(&mut self, file: PickedFile, ctx: &egui::Context) {
        let generation = self.controller.begin_ingest();
        self.status = None;

        let tx = self.tx.clone();
        let ctx = ctx.clone();
        thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build();

            let outcome = match runtime {
                Ok(rt) => rt.block_on(async {
                    let session = ingest::ingest(file).await?;
                    let preview = decode_for_preview(&session.data_url);
                    Ok((session, preview))
                }),
                Err(e) => Err(AppError::ui(format!("Failed to create async runtime: {e}"))),
            };

            let _ = tx.send(AppEvent::Ingested { generation, outcome });
            ctx.request_repaint();
        });
    }

    /// Runs the conversion pipeline on a worker thread.
    fn spawn_convert(&mut self, ctx: &egui::Context) {
        let Some((session, request, generation)) = self.controller.begin_convert() else {
            return;
        };
        self.status = None;

        let tx = self.tx.clone();
        let ctx = ctx.clone();
        thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build();

            let outcome = match runtime {
                Ok(rt) => rt.block_on(run_conversion(session, request)),
                Err(e) => Err(AppError::ui(format!("Failed to create async runtime: {e}"))),
            };

            let _ = tx.send(AppEvent::Converted { generation, outcome });
            ctx.request_repaint();
        });
    }

    /// Applies pending worker completions to the controller.
    fn process_events(&mut self) {
        while let Ok(event) = self.rx.try_recv() {
            match event {
                AppEvent::Ingested { generation, outcome } => {
                    let (outcome, preview) = match outcome {
                        Ok((session, preview)) => (Ok(session), preview),
                        Err(e) => (Err(e), None),
                    };
                    let loaded = outcome.is_ok();
                    if self.controller.file_ingested(generation, outcome) && loaded {
                        self.pending_preview = preview;
                        self.preview_texture = None;
                        self.pending_result = None;
                        self.result_texture = None;
                    }
                }
                AppEvent::Converted { generation, outcome } => {
                    let (outcome, preview) = match outcome {
                        Ok((result, preview)) => (Ok(result), preview),
                        Err(e) => (Err(e), None),
                    };
                    let converted = outcome.is_ok();
                    if self.controller.conversion_finished(generation, outcome) && converted {
                        self.pending_result = preview;
                        self.result_texture = None;
                    }
                }
            }
        }
    }

    /// Handles window-level drag & drop. Only the landing view accepts files;
    /// multi-file drops truncate to the first.
    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        if self.controller.phase != Phase::Landing {
            return;
        }

        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        let Some(file) = dropped.into_iter().next() else {
            return;
        };

        let picked = if let Some(path) = file.path {
            PickedFile::from_path(&path)
        } else if let Some(bytes) = file.bytes {
            let media_type = if file.mime.is_empty() {
                ingest::media_type_for(&file.name).to_string()
            } else {
                file.mime
            };
            PickedFile::from_memory(file.name, media_type, bytes)
        } else {
            return;
        };

        self.spawn_ingest(picked, ctx);
    }

    fn pick_file(&mut self, ctx: &egui::Context) {
        let picked = rfd::FileDialog::new()
            .add_filter(
                "Images",
                &["png", "jpg", "jpeg", "gif", "webp", "bmp", "tif", "tiff", "ico", "svg", "avif"],
            )
            .pick_file();

        if let Some(path) = picked {
            self.spawn_ingest(PickedFile::from_path(&path), ctx);
        }
    }

    fn save_result(&mut self, result: &ConversionResult) {
        let Some(path) = rfd::FileDialog::new()
            .set_file_name(&result.file_name)
            .save_file()
        else {
            return;
        };

        let written = result
            .decoded_bytes()
            .and_then(|bytes| std::fs::write(&path, bytes).map_err(AppError::from));

        self.status = Some(match written {
            Ok(()) => format!("Saved to {}", path.display()),
            Err(e) => format!("Save failed: {e}"),
        });
    }

    fn copy_result(&mut self, result: &ConversionResult) {
        let copied = arboard::Clipboard::new()
            .and_then(|mut clipboard| clipboard.set_text(result.data_url.clone()));

        self.status = Some(match copied {
            Ok(()) => "Copied data URL to clipboard".to_string(),
            Err(e) => format!("Clipboard error: {e}"),
        });
    }

    fn render_error_banner(&self, ui: &mut egui::Ui) {
        let Some(message) = self.controller.error() else {
            return;
        };
        let message = message.to_string();

        egui::Frame::new()
            .fill(egui::Color32::from_rgb(70, 25, 25))
            .stroke(egui::Stroke::new(1.0, egui::Color32::from_rgb(160, 60, 60)))
            .corner_radius(6.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.colored_label(egui::Color32::from_rgb(255, 170, 170), message);
            });
        ui.add_space(8.0);
    }

    fn render_landing(&mut self, ui: &mut egui::Ui, ctx: &egui::Context, hovering: bool) {
        ui.heading("Image Converter");
        ui.label("Convert images between PNG, JPEG, BMP and WebP.");
        ui.add_space(12.0);

        let desired = egui::vec2(ui.available_width().min(520.0), 180.0);
        let (rect, response) = ui.allocate_exact_size(desired, egui::Sense::click());
        draw_drop_zone(ui.painter(), rect, hovering);
        if response.clicked() {
            self.pick_file(ctx);
        }

        ui.add_space(8.0);
        if ui.button("Browse files…").clicked() {
            self.pick_file(ctx);
        }
    }

    fn render_conversion(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let Some(session) = self.controller.session.clone() else {
            return;
        };

        if let Some(texture) = &self.preview_texture {
            let size = fit_preview(texture.size(), 360.0, 240.0);
            ui.image((texture.id(), size));
            ui.add_space(4.0);
        }
        ui.label(format!("Name: {}", session.file_name));
        ui.label(format!(
            "Size: {}",
            sizing::format_bytes(session.size_bytes as f64, 2)
        ));
        ui.add_space(12.0);

        // Format menu. Changing the selection discards any shown result.
        let mut selected = self.controller.target_format;
        egui::ComboBox::from_label("Convert to")
            .selected_text(selected.label())
            .show_ui(ui, |ui| {
                for format in TargetFormat::ALL {
                    ui.selectable_value(&mut selected, format, format.label());
                }
            });
        if selected != self.controller.target_format {
            self.controller.format_changed(selected);
            self.result_texture = None;
            self.pending_result = None;
        }

        if self.controller.quality_visible() {
            let mut quality = self.controller.quality;
            let slider = ui.add(
                egui::Slider::new(&mut quality, 0.0..=1.0)
                    .fixed_decimals(2)
                    .text("Quality"),
            );
            if slider.changed() {
                self.controller.quality_changed(quality);
                self.result_texture = None;
                self.pending_result = None;
            }
        }

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            let convert = ui.add_enabled(
                self.controller.can_convert(),
                egui::Button::new("Convert"),
            );
            if convert.clicked() {
                self.spawn_convert(ctx);
            }
            if self.controller.phase == Phase::Converting {
                ui.spinner();
                ui.label("Converting…");
            }
        });

        if self.controller.phase == Phase::ResultShown {
            if let Some(result) = self.controller.result.clone() {
                self.render_result(ui, &result);
            }
        }

        ui.add_space(12.0);
        if ui.button("Convert another image").clicked() {
            self.controller.reset(&self.config);
            self.preview_texture = None;
            self.pending_preview = None;
            self.result_texture = None;
            self.pending_result = None;
            self.status = None;
        }

        if let Some(status) = &self.status {
            ui.add_space(4.0);
            ui.colored_label(egui::Color32::from_rgb(170, 220, 170), status);
        }
    }

    fn render_result(&mut self, ui: &mut egui::Ui, result: &ConversionResult) {
        ui.add_space(12.0);
        ui.separator();
        ui.heading("Converted");

        if let Some(texture) = &self.result_texture {
            let size = fit_preview(texture.size(), 360.0, 240.0);
            ui.image((texture.id(), size));
            ui.add_space(4.0);
        }
        ui.label(format!("New Name: {}", result.file_name));
        ui.label(format!(
            "Size: {}",
            sizing::format_bytes(result.estimated_size, 2)
        ));

        ui.add_space(4.0);
        ui.horizontal(|ui| {
            if ui.button("Save…").clicked() {
                self.save_result(result);
            }
            if ui.button("Copy data URL").clicked() {
                self.copy_result(result);
            }
        });
    }
}

impl eframe::App for ConverterApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.set_visuals(egui::Visuals::dark());

        self.process_events();
        self.handle_dropped_files(ctx);

        if let Some(image) = self.pending_preview.take() {
            self.preview_texture =
                Some(ctx.load_texture("preview", image, egui::TextureOptions::LINEAR));
        }
        if let Some(image) = self.pending_result.take() {
            self.result_texture =
                Some(ctx.load_texture("result", image, egui::TextureOptions::LINEAR));
        }

        let hovering = ctx.input(|i| !i.raw.hovered_files.is_empty())
            && self.controller.phase == Phase::Landing;

        egui::CentralPanel::default().show(ctx, |ui| {
            self.render_error_banner(ui);

            match self.controller.phase {
                Phase::Landing => self.render_landing(ui, ctx, hovering),
                Phase::Ready | Phase::Converting | Phase::ResultShown => {
                    self.render_conversion(ui, ctx)
                }
            }
        });
    }
}

/// The full convert pipeline for one worker invocation.
async fn run_conversion(
    session: Session,
    request: ConversionRequest,
) -> Result<(ConversionResult, Option<egui::ColorImage>)> {
    let result = convert::convert(&session.data_url, &session.base_name, &request).await?;
    let preview = decode_for_preview(&result.data_url);
    Ok((result, preview))
}

/// Best-effort decode of a data URL for on-screen preview. Failures are not
/// surfaced here; the conversion step reports them properly.
fn decode_for_preview(data_url: &str) -> Option<egui::ColorImage> {
    let bytes = convert::decode_data_url(data_url).ok()?;
    let decoded = image::load_from_memory(&bytes).ok()?;
    Some(color_image(&decoded))
}
