use eframe::egui;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use decoder_core::{experiments, report, save, Snapshot};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GuiConfig {
    save_path: String,
    researched: Vec<String>,
}

impl Default for GuiConfig {
    fn default() -> Self {
        Self {
            save_path: String::new(),
            researched: Vec::new(),
        }
    }
}

fn config_path() -> Option<PathBuf> {
    let mut base = dirs::config_dir().or_else(dirs::data_dir)?;
    base.push("AdComDecoder");
    base.push("gui_config.json");
    Some(base)
}

fn load_config() -> GuiConfig {
    if let Some(path) = config_path() {
        if let Ok(data) = fs::read_to_string(&path) {
            if let Ok(cfg) = serde_json::from_str::<GuiConfig>(&data) {
                return cfg;
            }
        }
    }
    GuiConfig::default()
}

fn save_config(cfg: &GuiConfig) {
    if let Some(path) = config_path() {
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        if let Ok(data) = serde_json::to_string_pretty(cfg) {
            let _ = fs::write(path, data);
        }
    }
}

/// Look for the Steam cloud copy of game.sav (app id 462930) under the
/// default userdata locations. First user directory wins.
fn detect_steam_save() -> Option<PathBuf> {
    let candidates = [
        r"C:\Program Files (x86)\Steam\userdata",
        r"C:\Program Files\Steam\userdata",
    ];

    for base in &candidates {
        let base = Path::new(base);
        let Ok(entries) = fs::read_dir(base) else {
            continue;
        };
        for entry in entries.flatten() {
            let save = entry.path().join("462930").join("remote").join("game.sav");
            if save.exists() {
                return Some(save);
            }
        }
    }

    None
}

struct DecoderApp {
    save_path: String,
    researched_text: String,
    status: String,
    output: String,
    snapshot: Option<Snapshot>,
}

impl Default for DecoderApp {
    fn default() -> Self {
        let mut cfg = load_config();

        if cfg.save_path.is_empty() {
            if let Some(path) = detect_steam_save() {
                cfg.save_path = path.display().to_string();
            }
        }

        Self {
            save_path: cfg.save_path,
            researched_text: cfg.researched.join("\n"),
            status: "Ready".to_string(),
            output: String::new(),
            snapshot: None,
        }
    }
}

impl DecoderApp {
    fn researched_set(&self) -> HashSet<String> {
        self.researched_text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect()
    }

    fn persist_config(&self) {
        save_config(&GuiConfig {
            save_path: self.save_path.clone(),
            researched: self.researched_set().into_iter().collect(),
        });
    }

    fn decode(&mut self) {
        let path = PathBuf::from(self.save_path.trim());
        self.persist_config();

        let data = match fs::read(&path) {
            Ok(data) => data,
            Err(err) => {
                self.status = format!("Error: could not read {}: {}", path.display(), err);
                return;
            }
        };

        match save::decode_save(&data) {
            Ok(snapshot) => {
                self.output = report::format_snapshot(&snapshot, &path.display().to_string());

                let json_path = path.with_file_name("decoded_save.json");
                let export = report::SaveExport::from_snapshot(&snapshot);
                match serde_json::to_string_pretty(&export)
                    .map_err(|e| e.to_string())
                    .and_then(|json| fs::write(&json_path, json).map_err(|e| e.to_string()))
                {
                    Ok(()) => self.output.push_str(&format!(
                        "\nData saved to: {}\n",
                        json_path.display()
                    )),
                    Err(err) => self
                        .output
                        .push_str(&format!("\nCould not write JSON export: {}\n", err)),
                }

                self.status = format!(
                    "Decoded {} ({} cards, {} progress labels, {} statistics)",
                    path.display(),
                    snapshot.cards.len(),
                    snapshot.progress.len(),
                    snapshot.statistics.len()
                );
                self.snapshot = Some(snapshot);
            }
            Err(err) => {
                self.snapshot = None;
                self.output.clear();
                self.status = format!("Error: {}", err);
            }
        }
    }

    fn analyze(&mut self) {
        let Some(snapshot) = self.snapshot.as_ref() else {
            self.status = "Error: no save file loaded".to_string();
            return;
        };
        self.persist_config();

        let researched = self.researched_set();
        let (recommendations, scientists) =
            experiments::analyze_experiments(snapshot, &researched);
        let production = experiments::industry_production(snapshot);

        self.output =
            report::format_recommendations(&recommendations, scientists, &production, 20);
        self.status = format!(
            "Experiments analyzed: {} ranked, {} Scientists available",
            recommendations.len(),
            scientists
        );
    }
}

impl eframe::App for DecoderApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label("Save file:");
                ui.text_edit_singleline(&mut self.save_path);
                if ui.button("Browse...").clicked() {
                    let mut dialog = rfd::FileDialog::new()
                        .add_filter("Save files", &["sav"])
                        .add_filter("All files", &["*"]);
                    if let Some(parent) =
                        Path::new(self.save_path.trim()).parent().filter(|p| p.exists())
                    {
                        dialog = dialog.set_directory(parent);
                    }
                    if let Some(path) = dialog.pick_file() {
                        self.save_path = path.display().to_string();
                    }
                }
            });

            ui.horizontal(|ui| {
                if ui.button("Decode save").clicked() {
                    self.decode();
                }

                let analyze_enabled = self.snapshot.is_some();
                if ui
                    .add_enabled(analyze_enabled, egui::Button::new("Analyze experiments"))
                    .clicked()
                {
                    self.analyze();
                }
            });

            ui.collapsing("Researched experiments (one per line)", |ui| {
                ui.label(
                    "The save file only records how many experiments are owned, \
                     not which ones. List the ones you already researched so they \
                     are excluded from recommendations.",
                );
                ui.text_edit_multiline(&mut self.researched_text);
            });

            ui.separator();
            ui.label(&self.status);
            ui.separator();

            egui::ScrollArea::vertical()
                .id_source("output_scroll")
                .show(ui, |ui| {
                    ui.monospace(&self.output);
                });
        });
    }
}

fn main() -> eframe::Result<()> {
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([900.0, 700.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Adventure Communist Save Decoder",
        native_options,
        Box::new(|cc| {
            cc.egui_ctx.set_visuals(egui::Visuals::dark());
            Box::new(DecoderApp::default())
        }),
    )
}
