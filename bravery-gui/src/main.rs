use eframe::egui;
use egui_extras::{Column, TableBuilder};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use bravery_core::{
    format_cost, initial_link, load_assets, Assets, BraverySettings, Clipboard,
    ClipboardUnavailable, CopyOutcome, DrawResult, LinkState, Session, Slot,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct GuiConfig {
    api_base_url: String,
    share_base_url: String,
    item_allowlist_path: String,
}

impl Default for GuiConfig {
    fn default() -> Self {
        let defaults = BraverySettings::default();
        Self {
            api_base_url: defaults.api_base_url,
            share_base_url: defaults.share_base_url,
            item_allowlist_path: String::new(),
        }
    }
}

fn config_path() -> Option<PathBuf> {
    let mut base = dirs::config_dir().or_else(|| dirs::data_dir())?;
    base.push("DeadlockBravery");
    base.push("gui_config.json");
    Some(base)
}

fn load_config() -> GuiConfig {
    if let Some(path) = config_path() {
        if let Ok(data) = fs::read_to_string(&path) {
            match serde_json::from_str::<GuiConfig>(&data) {
                Ok(cfg) => return cfg,
                Err(err) => tracing::warn!(path = %path.display(), %err, "ignoring unreadable config"),
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
            if let Err(err) = fs::write(&path, data) {
                tracing::warn!(path = %path.display(), %err, "could not save config");
            }
        }
    }
}

/// Copies through egui's platform output, which the native backend forwards
/// to the system clipboard.
struct EguiClipboard<'a>(&'a egui::Context);

impl Clipboard for EguiClipboard<'_> {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardUnavailable> {
        let text = text.to_string();
        self.0.output_mut(|o| o.copied_text = text);
        Ok(())
    }
}

fn slot_color(slot: Slot) -> egui::Color32 {
    let [r, g, b, a] = slot.tint_rgba();
    egui::Color32::from_rgba_unmultiplied(r, g, b, a)
}

enum LoadState {
    Loading(mpsc::Receiver<bravery_core::Result<Assets>>),
    Ready,
    Failed(String),
}

struct BraveryApp {
    config: GuiConfig,
    seed_text: String,
    link_text: String,

    session: Session,
    load: LoadState,

    /// Blocking notice; the main view is disabled until it is dismissed.
    notice: Option<String>,
    /// Link to show for manual copying when the clipboard is unavailable.
    manual_copy: Option<String>,
    status: String,
}

impl BraveryApp {
    fn new(startup_link: Option<String>) -> Self {
        let config = load_config();
        let seed = rand::thread_rng().gen::<u64>();

        let settings = BraverySettings {
            seed: Some(seed),
            link: startup_link,
            ..Self::settings_from(&config)
        };
        let (session, load) = Self::begin(&settings);

        Self {
            config,
            seed_text: seed.to_string(),
            link_text: String::new(),
            session,
            load,
            notice: None,
            manual_copy: None,
            status: String::new(),
        }
    }

    fn settings_from(config: &GuiConfig) -> BraverySettings {
        let allowlist = config.item_allowlist_path.trim();
        BraverySettings {
            api_base_url: config.api_base_url.trim().to_string(),
            share_base_url: config.share_base_url.trim().to_string(),
            item_allowlist_path: (!allowlist.is_empty()).then(|| PathBuf::from(allowlist)),
            ..BraverySettings::default()
        }
    }

    /// Start a session and kick off the asset load on a worker thread.
    fn begin(settings: &BraverySettings) -> (Session, LoadState) {
        let link = match initial_link(settings) {
            Ok(link) => link,
            Err(err) => {
                let session = Session::start(LinkState::default(), settings.seed);
                return (session, LoadState::Failed(err.to_string()));
            }
        };
        let session = Session::start(link, settings.seed);

        let (tx, rx) = mpsc::channel();
        let settings = settings.clone();
        thread::spawn(move || {
            let result = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .map_err(bravery_core::BraveryError::from)
                .and_then(|rt| rt.block_on(load_assets(&settings)));
            // The app may have been closed or reloaded; a late result is dropped.
            let _ = tx.send(result);
        });

        (session, LoadState::Loading(rx))
    }

    fn reload(&mut self) {
        save_config(&self.config);
        let seed = self
            .seed_text
            .trim()
            .parse::<u64>()
            .unwrap_or_else(|_| rand::thread_rng().gen::<u64>());
        self.seed_text = seed.to_string();

        let settings = BraverySettings {
            seed: Some(seed),
            link: Some(self.session.link().url().to_string()),
            ..Self::settings_from(&self.config)
        };
        let (session, load) = Self::begin(&settings);
        self.session = session;
        self.load = load;
        self.status = format!("Reloading assets with seed {seed}...");
    }

    fn poll_load(&mut self) {
        let LoadState::Loading(rx) = &self.load else {
            return;
        };
        match rx.try_recv() {
            Ok(Ok(assets)) => {
                self.session.install(assets);
                self.load = LoadState::Ready;
                // Show a loadout straight away; the hero from the link stays.
                if let Err(err) = self.session.reroll_items() {
                    tracing::warn!(%err, "no initial loadout");
                }
                self.status = format!(
                    "Loaded {} items and {} heroes.",
                    self.session.catalog().len(),
                    self.session.roster().len()
                );
            }
            Ok(Err(err)) => {
                tracing::error!(%err, "asset load failed");
                self.load = LoadState::Failed(err.to_string());
            }
            Err(mpsc::TryRecvError::Empty) => {}
            Err(mpsc::TryRecvError::Disconnected) => {
                self.load = LoadState::Failed("asset loader stopped unexpectedly".to_string());
            }
        }
    }

    fn randomize(&mut self) {
        if let Err(err) = self.session.randomize() {
            self.notice = Some(err.to_string());
        }
    }

    fn copy_link(&mut self, ctx: &egui::Context) {
        match self.session.copy_link(&mut EguiClipboard(ctx)) {
            CopyOutcome::Copied(link) => self.status = format!("Link copied! {link}"),
            CopyOutcome::Manual(link) => self.manual_copy = Some(link),
        }
    }

    fn open_link(&mut self) {
        match LinkState::parse(&self.link_text) {
            Ok(link) => {
                self.session.open_link(link);
                if let Err(err) = self.session.reroll_items() {
                    tracing::warn!(%err, "no loadout for opened link");
                }
                self.link_text.clear();
                self.status = "Opened link.".to_string();
            }
            Err(err) => self.status = err.to_string(),
        }
    }

    fn hero_pool_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Hero Pool");
        ui.horizontal(|ui| {
            if ui.button("Select All").clicked() {
                self.session.select_all();
            }
            if ui.button("Deselect All").clicked() {
                self.session.deselect_all();
            }
        });
        ui.label(format!(
            "{} of {} selected",
            self.session.pool().len(),
            self.session.roster().len()
        ));
        ui.separator();

        let mut toggled = None;
        egui::ScrollArea::vertical()
            .id_source("hero_pool_scroll")
            .show(ui, |ui| {
                egui::Grid::new("hero_grid").num_columns(2).show(ui, |ui| {
                    for (i, hero) in self.session.roster().heroes().iter().enumerate() {
                        let selected = self.session.pool().contains(&hero.id);
                        let label = format!("{}  {}", hero.placeholder(), hero.name);
                        if ui.selectable_label(selected, label).clicked() {
                            toggled = Some(hero.id.clone());
                        }
                        if i % 2 == 1 {
                            ui.end_row();
                        }
                    }
                });
            });
        if let Some(id) = toggled {
            self.session.toggle(&id);
        }
    }

    fn settings_section(&mut self, ui: &mut egui::Ui) {
        egui::CollapsingHeader::new("Settings").show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.label("Asset API:");
                ui.text_edit_singleline(&mut self.config.api_base_url);
            });
            ui.horizontal(|ui| {
                ui.label("Share base:");
                ui.text_edit_singleline(&mut self.config.share_base_url);
            });
            ui.horizontal(|ui| {
                ui.label("Item allow-list:");
                ui.text_edit_singleline(&mut self.config.item_allowlist_path);
                if ui.button("Browse...").clicked() {
                    if let Some(path) = rfd::FileDialog::new()
                        .add_filter("JSON", &["json"])
                        .pick_file()
                    {
                        self.config.item_allowlist_path = path.display().to_string();
                    }
                }
            });
            ui.horizontal(|ui| {
                ui.label("Seed:");
                ui.text_edit_singleline(&mut self.seed_text);
                if ui.button("Random seed").clicked() {
                    self.seed_text = rand::thread_rng().gen::<u64>().to_string();
                }
            });
            if ui.button("Save and reload").clicked() {
                self.reload();
            }
        });
    }

    fn hero_display(&mut self, ui: &mut egui::Ui) {
        let active_id = self.session.active_hero_id().map(str::to_string);
        let (glyph, name, icon) = match self.session.active_hero() {
            Some(hero) => (hero.placeholder(), hero.name.clone(), hero.icon.clone()),
            None => {
                let id = active_id.clone().unwrap_or_default();
                (id.chars().next().map(String::from).unwrap_or_default(), id, None)
            }
        };

        ui.horizontal(|ui| {
            ui.label(egui::RichText::new(glyph).size(40.0).strong());
            ui.vertical(|ui| {
                ui.heading(&name);
                if let Some(icon) = icon {
                    ui.hyperlink_to("portrait", icon);
                }
            });
        });

        let mut chosen = None;
        egui::ComboBox::from_label("Select Hero")
            .selected_text(name)
            .show_ui(ui, |ui| {
                for hero in self.session.roster().heroes() {
                    let selected = active_id.as_deref() == Some(hero.id.as_str());
                    if ui.selectable_label(selected, &hero.name).clicked() {
                        chosen = Some(hero.id.clone());
                    }
                }
            });
        if let Some(id) = chosen {
            self.session.choose_hero(&id);
        }
    }

    fn draw_table(ui: &mut egui::Ui, result: &DrawResult) {
        TableBuilder::new(ui)
            .striped(true)
            .column(Column::exact(24.0))
            .column(Column::remainder().at_least(180.0))
            .column(Column::exact(72.0))
            .column(Column::exact(64.0))
            .column(Column::exact(48.0))
            .column(Column::exact(40.0))
            .header(20.0, |mut header| {
                for title in ["#", "Item", "Slot", "Cost", "Art", ""] {
                    header.col(|ui| {
                        ui.strong(title);
                    });
                }
            })
            .body(|mut body| {
                for (i, (entry, locked)) in result.slots().enumerate() {
                    body.row(22.0, |mut row| {
                        row.col(|ui| {
                            ui.label((i + 1).to_string());
                        });
                        row.col(|ui| {
                            let label = ui.label(entry.label());
                            if let Some(desc) = &entry.description {
                                label.on_hover_text(desc);
                            }
                        });
                        row.col(|ui| {
                            ui.label(
                                egui::RichText::new(entry.slot.as_str())
                                    .background_color(slot_color(entry.slot)),
                            );
                        });
                        row.col(|ui| {
                            ui.label(format_cost(entry.cost));
                        });
                        row.col(|ui| {
                            if let Some(url) = entry.image_url() {
                                ui.hyperlink_to("view", url);
                            }
                        });
                        row.col(|ui| {
                            if locked {
                                ui.label("🔒");
                            }
                        });
                    });
                }
            });
    }
}

impl eframe::App for BraveryApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_load();

        if let Some(notice) = self.notice.clone() {
            egui::Window::new("Notice")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
                .show(ctx, |ui| {
                    ui.label(notice);
                    if ui.button("OK").clicked() {
                        self.notice = None;
                    }
                });
        }

        if let Some(link) = self.manual_copy.clone() {
            let mut open = true;
            egui::Window::new("Copy this link:")
                .collapsible(false)
                .open(&mut open)
                .show(ctx, |ui| {
                    let mut text = link;
                    ui.text_edit_singleline(&mut text);
                });
            if !open {
                self.manual_copy = None;
            }
        }

        let blocked = self.notice.is_some();

        egui::TopBottomPanel::bottom("footer").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                ui.label("Link:");
                ui.monospace(self.session.link().url().as_str());
            });
            if !self.status.is_empty() {
                ui.label(&self.status);
            }
            ui.add_space(4.0);
        });

        egui::SidePanel::right("hero_pool")
            .resizable(false)
            .min_width(220.0)
            .show(ctx, |ui| {
                ui.add_enabled_ui(!blocked, |ui| self.hero_pool_panel(ui));
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_enabled_ui(!blocked, |ui| {
                ui.heading("Deadlock Ultimate Bravery");
                ui.separator();

                self.settings_section(ui);
                ui.horizontal(|ui| {
                    ui.label("Open link:");
                    ui.text_edit_singleline(&mut self.link_text);
                    if ui.button("Open").clicked() {
                        self.open_link();
                    }
                });
                ui.separator();

                match &self.load {
                    LoadState::Loading(_) => {
                        ui.label("Loading assets...");
                        return;
                    }
                    LoadState::Failed(err) => {
                        ui.colored_label(egui::Color32::from_rgb(230, 80, 80), format!("Error: {err}"));
                        return;
                    }
                    LoadState::Ready => {}
                }

                if self.session.active_hero_id().is_none() {
                    return;
                }

                ui.horizontal(|ui| {
                    if ui.button("Randomize").clicked() {
                        self.randomize();
                    }
                    if ui.button("Copy Link").clicked() {
                        self.copy_link(ui.ctx());
                    }
                });
                ui.separator();

                self.hero_display(ui);
                ui.separator();

                if let Some(result) = self.session.last_draw() {
                    Self::draw_table(ui, result);
                    ui.label(format!("Total cost: {}", format_cost(result.total_cost())));
                }
            });
        });

        if matches!(self.load, LoadState::Loading(_)) {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,bravery_core=info".into()),
        )
        .init();

    // A shared link may be passed as the only argument.
    let startup_link = std::env::args().nth(1);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1000.0, 680.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Deadlock Bravery",
        native_options,
        Box::new(move |cc| {
            cc.egui_ctx.set_visuals(egui::Visuals::dark());
            Box::new(BraveryApp::new(startup_link))
        }),
    )
}
