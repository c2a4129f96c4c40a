mod canvas;

use crate::{EngineCommand, EngineHandle, EngineUpdate};
use canvas::Canvas;
use eframe::egui;
use std::path::PathBuf;

pub struct VisualizerApp {
    engine: EngineHandle,
    mappings_path: Option<PathBuf>,
    status: String,
    error_message: Option<String>,
}

impl VisualizerApp {
    pub fn new(engine: EngineHandle, mappings_path: Option<PathBuf>, source_name: String) -> Self {
        Self {
            engine,
            mappings_path,
            status: format!("Listening to {}", source_name),
            error_message: None,
        }
    }

    fn process_engine_updates(&mut self) {
        while let Ok(update) = self.engine.update_rx.try_recv() {
            match update {
                EngineUpdate::MappingsReloaded { path } => {
                    self.status = format!("Mappings loaded from {}", path.display());
                    self.error_message = None;
                    self.mappings_path = Some(path);
                }
                EngineUpdate::SourceFinished => {
                    self.status = "Source finished".to_string();
                }
                EngineUpdate::Error { message } => {
                    self.error_message = Some(message);
                }
            }
        }
    }

    fn reload_mappings(&self, path: PathBuf) {
        let _ = self
            .engine
            .command_tx
            .send(EngineCommand::ReloadMappings(path));
    }

    fn menu_bar(&mut self, ui: &mut egui::Ui) {
        egui::MenuBar::new().ui(ui, |ui| {
            ui.menu_button("File", |ui| {
                if ui.button("Open Mappings...").clicked() {
                    if let Some(path) = rfd::FileDialog::new()
                        .set_title("Open Mappings")
                        .add_filter("RON", &["ron"])
                        .pick_file()
                    {
                        self.reload_mappings(path);
                    }
                    ui.close();
                }

                let reload = ui.add_enabled(
                    self.mappings_path.is_some(),
                    egui::Button::new("Reload Mappings"),
                );
                if reload.clicked() {
                    if let Some(path) = self.mappings_path.clone() {
                        self.reload_mappings(path);
                    }
                    ui.close();
                }

                ui.separator();

                if ui.button("Quit").clicked() {
                    ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });
        });
    }
}

impl eframe::App for VisualizerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_engine_updates();

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            self.menu_bar(ui);
        });

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(&self.status);
                if let Some(ref error) = self.error_message {
                    ui.separator();
                    ui.colored_label(egui::Color32::RED, error);
                }
            });
        });

        let frame = self.engine.frame();
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                Canvas::new(&frame).show(ui);
            });

        ctx.request_repaint();
    }
}
