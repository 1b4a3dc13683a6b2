use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use eframe::egui;
use log::{error, info, warn};
use tokio::runtime::{Builder, Runtime};
use tokio::sync::{Mutex, mpsc};

use crate::engine::models::{FeaturedMode, MapCandidate};
use crate::engine::state::{ConnectionState, HostPhase, SessionUpdate, UserAction};
use crate::engine::validate::ValidationError;
use crate::engine::{HostConfig, HostEngine};
use crate::featured::FeaturedModeService;
use crate::maps::{self, MapService};
use crate::mods::{self, ModService};
use crate::networking::NetworkClient;
use crate::process::GameRunner;
use crate::storage::StorageManager;

mod i18n;
use self::i18n::{I18n, Language};

const LOCALE_LANGUAGE_CODES: [(&[&str], Language); 2] = [
    (&["uk", "ua", "ukr"], Language::Ukrainian),
    (&["en", "eng"], Language::English),
];

fn parse_locale_token(token: &str) -> Option<Language> {
    let normalized = token
        .split(|c| matches!(c, '.' | '@'))
        .next()
        .unwrap_or(token)
        .replace('-', "_")
        .to_ascii_lowercase();
    let language_code = normalized.split('_').next().unwrap_or(&normalized);

    LOCALE_LANGUAGE_CODES.iter().find_map(|(codes, language)| {
        codes
            .iter()
            .any(|code| *code == language_code)
            .then_some(*language)
    })
}

fn detect_system_language() -> Language {
    for var in ["LC_ALL", "LANGUAGE", "LANG"] {
        if let Ok(value) = std::env::var(var) {
            for token in value.split(':') {
                if let Some(language) = parse_locale_token(token) {
                    return language;
                }
            }
        }
    }

    Language::English
}

fn build_runtime() -> Arc<Runtime> {
    match Runtime::new() {
        Ok(rt) => Arc::new(rt),
        Err(err) => {
            warn!(
                "ui: failed to create multithreaded runtime ({}); trying single-threaded runtime",
                err
            );
            match Builder::new_current_thread().enable_all().build() {
                Ok(rt) => Arc::new(rt),
                Err(fallback_err) => {
                    error!(
                        "ui: failed to create any Tokio runtime ({}); terminating",
                        fallback_err
                    );
                    std::process::exit(1);
                }
            }
        }
    }
}

type Engine = HostEngine<MapService, ModService, GameRunner>;

/// Thin shell over the host engine: mirrors its updates into widget state
/// and forwards every interaction back as a `UserAction`. All semantics
/// live in the engine.
pub struct LobbyApp {
    runtime: Arc<Runtime>,
    engine: Arc<Mutex<Engine>>,
    live_flag: Arc<AtomicBool>,
    updates_rx: mpsc::UnboundedReceiver<SessionUpdate>,
    updates_tx: mpsc::UnboundedSender<SessionUpdate>,
    language: Language,
    title: String,
    password: String,
    friends_only: bool,
    rating_min: String,
    rating_max: String,
    enforce_rating: bool,
    query: String,
    filtered: Vec<MapCandidate>,
    selected_map: Option<String>,
    modes: Vec<FeaturedMode>,
    selected_mode: Option<String>,
    installed_mods: Vec<String>,
    enabled_mods: Vec<bool>,
    validation: Option<ValidationError>,
    phase: HostPhase,
    close_requested: bool,
    close_sent: bool,
}

impl LobbyApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let runtime = build_runtime();
        let storage = StorageManager::new();
        let prefs = runtime
            .block_on(storage.read_last_game())
            .unwrap_or_default();

        let network = NetworkClient::new();
        let live_flag = Arc::new(AtomicBool::new(true));
        let engine = Engine::new(
            MapService::new(network.clone()),
            ModService::new(network.clone()),
            GameRunner::new(),
            storage.clone(),
            HostConfig::default(),
            live_flag.clone(),
            prefs.clone(),
        );
        let engine = Arc::new(Mutex::new(engine));
        let (updates_tx, updates_rx) = mpsc::unbounded_channel();

        let installed_mods = mods::scan_installed(&crate::env::mods_dir());
        let enabled_mods = vec![false; installed_mods.len()];

        let app = Self {
            runtime,
            engine,
            live_flag,
            updates_rx,
            updates_tx,
            language: detect_system_language(),
            title: prefs.title,
            password: prefs.password,
            friends_only: prefs.friends_only,
            rating_min: prefs.rating_min.map(|r| r.to_string()).unwrap_or_default(),
            rating_max: prefs.rating_max.map(|r| r.to_string()).unwrap_or_default(),
            enforce_rating: prefs.enforce_rating,
            query: String::new(),
            filtered: Vec::new(),
            selected_map: None,
            modes: Vec::new(),
            selected_mode: None,
            installed_mods,
            enabled_mods,
            validation: None,
            phase: HostPhase::Idle,
            close_requested: false,
            close_sent: false,
        };

        app.start_bootstrap(storage, FeaturedModeService::new(network));
        app
    }

    fn i18n(&self) -> I18n {
        I18n::new(self.language)
    }

    /// Scan installed maps and fetch the featured modes, feeding the results
    /// into the engine. API reachability doubles as the connection signal.
    fn start_bootstrap(&self, storage: StorageManager, featured: FeaturedModeService) {
        let engine = self.engine.clone();
        let tx = self.updates_tx.clone();
        let rt = self.runtime.clone();
        rt.spawn(async move {
            let candidates = maps::scan_installed(&storage.maps_dir());
            info!("bootstrap: {} installed map(s)", candidates.len());
            {
                let mut locked = engine.lock().await;
                locked
                    .handle_action(UserAction::CandidatesChanged(candidates), &tx)
                    .await;
            }

            match featured.list().await {
                Ok(modes) => {
                    let mut locked = engine.lock().await;
                    locked
                        .handle_action(UserAction::ModesChanged(modes), &tx)
                        .await;
                    locked
                        .handle_action(
                            UserAction::ConnectionChanged(ConnectionState::Connected),
                            &tx,
                        )
                        .await;
                }
                Err(err) => {
                    warn!("bootstrap: featured mode listing failed: {err}");
                    let mut locked = engine.lock().await;
                    locked
                        .handle_action(
                            UserAction::ConnectionChanged(ConnectionState::Disconnected),
                            &tx,
                        )
                        .await;
                }
            }
        });
    }

    fn trigger_action(&self, action: UserAction) {
        let engine = self.engine.clone();
        let tx = self.updates_tx.clone();
        let rt = self.runtime.clone();
        rt.spawn(async move {
            let mut locked = engine.lock().await;
            locked.handle_action(action, &tx).await;
        });
    }

    fn drain_updates(&mut self) {
        loop {
            match self.updates_rx.try_recv() {
                Ok(SessionUpdate::Phase(phase)) => self.phase = phase,
                Ok(SessionUpdate::MapList { filtered, selected }) => {
                    self.filtered = filtered;
                    self.selected_map = selected;
                }
                Ok(SessionUpdate::Modes { visible, selected }) => {
                    self.modes = visible;
                    self.selected_mode = selected;
                }
                Ok(SessionUpdate::Validation(problem)) => self.validation = problem,
                Ok(SessionUpdate::CloseRequested) => self.close_requested = true,
                Err(_) => break,
            }
        }
    }

    fn send_rating(&self) {
        self.trigger_action(UserAction::SetRating {
            min: self.rating_min.trim().parse().ok(),
            max: self.rating_max.trim().parse().ok(),
            enforce: self.enforce_rating,
        });
    }

    fn send_mods(&self) {
        let uids = self
            .installed_mods
            .iter()
            .zip(&self.enabled_mods)
            .filter(|(_, enabled)| **enabled)
            .map(|(uid, _)| uid.clone())
            .collect();
        self.trigger_action(UserAction::SetMods(uids));
    }

    fn settings_column(&mut self, ui: &mut egui::Ui) {
        let i18n = self.i18n();

        ui.label(i18n.title_label());
        if ui.text_edit_singleline(&mut self.title).changed() {
            self.trigger_action(UserAction::SetTitle(self.title.clone()));
        }

        ui.label(i18n.password_label());
        let password_edit = egui::TextEdit::singleline(&mut self.password).password(true);
        if ui.add(password_edit).changed() {
            self.trigger_action(UserAction::SetPassword(self.password.clone()));
        }

        if ui
            .checkbox(&mut self.friends_only, i18n.friends_only_label())
            .changed()
        {
            self.trigger_action(UserAction::SetFriendsOnly(self.friends_only));
        }

        ui.horizontal(|ui| {
            ui.label("Rating");
            let min_edit = egui::TextEdit::singleline(&mut self.rating_min).desired_width(60.0);
            let max_edit = egui::TextEdit::singleline(&mut self.rating_max).desired_width(60.0);
            let min_changed = ui.add(min_edit).changed();
            ui.label("-");
            let max_changed = ui.add(max_edit).changed();
            let enforce_changed = ui.checkbox(&mut self.enforce_rating, "enforce").changed();
            if min_changed || max_changed || enforce_changed {
                self.send_rating();
            }
        });

        ui.separator();
        ui.heading(i18n.modes_heading());
        let mut clicked_mode = None;
        for mode in &self.modes {
            let selected = self.selected_mode.as_deref() == Some(mode.technical_name.as_str());
            let response = ui.selectable_label(selected, &mode.display_name);
            if !mode.description.is_empty() {
                response.clone().on_hover_text(&mode.description);
            }
            if response.clicked() {
                clicked_mode = Some(mode.technical_name.clone());
            }
        }
        if let Some(technical_name) = clicked_mode {
            self.trigger_action(UserAction::SelectMode(technical_name));
        }

        ui.separator();
        egui::ComboBox::from_id_source("language")
            .selected_text(self.language.display_name())
            .show_ui(ui, |ui| {
                for language in [Language::English, Language::Ukrainian] {
                    ui.selectable_value(&mut self.language, language, language.display_name());
                }
            });

        if !self.installed_mods.is_empty() {
            ui.separator();
            ui.heading("Mods");
            let mut changed = false;
            for (uid, enabled) in self.installed_mods.iter().zip(self.enabled_mods.iter_mut()) {
                if ui.checkbox(enabled, uid.as_str()).changed() {
                    changed = true;
                }
            }
            if changed {
                self.send_mods();
            }
        }
    }

    fn map_column(&mut self, ui: &mut egui::Ui) {
        let i18n = self.i18n();

        ui.heading(i18n.maps_heading());
        let search_edit = egui::TextEdit::singleline(&mut self.query)
            .hint_text(i18n.map_search_hint());
        let search_response = ui.add(search_edit);
        if search_response.changed() {
            self.trigger_action(UserAction::QueryChanged(self.query.clone()));
        }
        if search_response.has_focus() {
            if ui.input(|input| input.key_pressed(egui::Key::ArrowDown)) {
                self.trigger_action(UserAction::MoveMapSelection(1));
            }
            if ui.input(|input| input.key_pressed(egui::Key::ArrowUp)) {
                self.trigger_action(UserAction::MoveMapSelection(-1));
            }
        }

        if self.filtered.is_empty() {
            ui.label(i18n.no_maps_found());
            return;
        }

        let mut clicked_map = None;
        egui::ScrollArea::vertical()
            .auto_shrink([false, true])
            .show(ui, |ui| {
                for candidate in &self.filtered {
                    let selected =
                        self.selected_map.as_deref() == Some(candidate.folder_name.as_str());
                    let label = format!(
                        "{} (v{:04})",
                        candidate.display_name, candidate.version
                    );
                    if ui.selectable_label(selected, label).clicked() {
                        clicked_map = Some(candidate.folder_name.clone());
                    }
                }
            });
        if let Some(folder_name) = clicked_map {
            self.trigger_action(UserAction::SelectMap(folder_name));
        }
    }

    fn create_row(&mut self, ui: &mut egui::Ui) {
        let i18n = self.i18n();
        let busy = self.phase != HostPhase::Idle;
        let label = match self.validation {
            Some(problem) => i18n.validation_message(problem),
            None if busy => i18n.creating_in_progress(),
            None => i18n.create_button(),
        };
        let enabled = self.validation.is_none() && !busy;
        if busy {
            ui.spinner();
        }
        if ui
            .add_enabled(enabled, egui::Button::new(label))
            .clicked()
        {
            self.trigger_action(UserAction::CreateGame);
        }
    }
}

impl eframe::App for LobbyApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_updates();

        if ctx.input(|input| input.viewport().close_requested()) {
            // No stale host call after the window is gone.
            self.live_flag.store(false, Ordering::SeqCst);
        }
        if self.close_requested && !self.close_sent {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            self.close_sent = true;
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading(self.i18n().heading());
            ui.separator();
            ui.columns(2, |columns| {
                self.settings_column(&mut columns[0]);
                self.map_column(&mut columns[1]);
            });
            ui.separator();
            self.create_row(ui);
        });

        // Engine updates arrive off-thread; keep polling at a gentle pace.
        ctx.request_repaint_after(Duration::from_millis(100));
    }
}
