use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures_util::future::join;
use log::{error, info, warn};
use tokio::sync::mpsc;

use crate::engine::models::{
    FeaturedMode, LastGamePrefs, LaunchDescriptor, MapCandidate, MapVersionRef, ModVersion,
};
use crate::engine::state::{ConnectionState, HostPhase, SessionUpdate, UserAction};
use crate::engine::validate::{ValidationError, ValidationInput, validate};
use crate::featured;
use crate::search;
use crate::storage::StorageManager;

pub mod models;
pub mod state;
pub mod validate;

/// Authoritative source for map versions.
pub trait MapSource {
    fn fetch_latest(
        &self,
        selected: &MapVersionRef,
    ) -> impl Future<Output = Result<MapVersionRef, String>> + Send;
}

/// Authoritative source for the active mod set.
pub trait ModSource {
    fn update_and_activate(
        &self,
        uids: &BTreeSet<String>,
    ) -> impl Future<Output = Result<Vec<ModVersion>, String>> + Send;
}

/// Hands a finished descriptor to the game client.
pub trait Runner {
    fn host(&self, descriptor: &LaunchDescriptor) -> Result<(), String>;
}

#[derive(Clone, Debug)]
pub struct HostConfig {
    pub default_mode: String,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            default_mode: featured::DEFAULT_FEATURED_MODE.to_owned(),
        }
    }
}

/// The session state machine behind the create-game dialog. All entry points
/// funnel through `handle_action`, one action at a time; the shell only ever
/// sees the `SessionUpdate`s this engine emits.
pub struct HostEngine<M, S, R> {
    map_source: M,
    mod_source: S,
    runner: R,
    storage: StorageManager,
    config: HostConfig,
    live: Arc<AtomicBool>,
    phase: HostPhase,
    connection: ConnectionState,
    candidates: Vec<MapCandidate>,
    query: String,
    filtered: Vec<MapCandidate>,
    selected_map: Option<MapCandidate>,
    modes: Vec<FeaturedMode>,
    selected_mode: Option<String>,
    last_mode: Option<String>,
    selected_mods: BTreeSet<String>,
    title: String,
    password: String,
    friends_only: bool,
    rating_min: Option<i32>,
    rating_max: Option<i32>,
    enforce_rating: bool,
}

impl<M, S, R> HostEngine<M, S, R>
where
    M: MapSource,
    S: ModSource,
    R: Runner,
{
    pub fn new(
        map_source: M,
        mod_source: S,
        runner: R,
        storage: StorageManager,
        config: HostConfig,
        live: Arc<AtomicBool>,
        prefs: LastGamePrefs,
    ) -> Self {
        Self {
            map_source,
            mod_source,
            runner,
            storage,
            config,
            live,
            phase: HostPhase::Idle,
            connection: ConnectionState::Connecting,
            candidates: Vec::new(),
            query: String::new(),
            filtered: Vec::new(),
            selected_map: None,
            modes: Vec::new(),
            selected_mode: None,
            last_mode: prefs.featured_mode,
            selected_mods: BTreeSet::new(),
            title: prefs.title,
            password: prefs.password,
            friends_only: prefs.friends_only,
            rating_min: prefs.rating_min,
            rating_max: prefs.rating_max,
            enforce_rating: prefs.enforce_rating,
        }
    }

    pub async fn handle_action(
        &mut self,
        action: UserAction,
        updates: &mpsc::UnboundedSender<SessionUpdate>,
    ) {
        match action {
            UserAction::CreateGame => {
                info!("action: CreateGame");
                self.create_game(updates).await;
            }
            UserAction::QueryChanged(query) => {
                self.query = query;
                self.refresh_filter(updates);
            }
            UserAction::CandidatesChanged(candidates) => {
                info!("action: CandidatesChanged ({} maps)", candidates.len());
                self.candidates = candidates;
                self.refresh_filter(updates);
            }
            UserAction::ModesChanged(modes) => {
                info!("action: ModesChanged ({} modes)", modes.len());
                self.modes = modes.into_iter().filter(|mode| mode.visible).collect();
                let keep = self
                    .selected_mode
                    .as_deref()
                    .is_some_and(|name| self.modes.iter().any(|m| m.technical_name == name));
                if !keep {
                    self.selected_mode = featured::select_initial(
                        &self.modes,
                        self.last_mode.as_deref(),
                        &self.config.default_mode,
                    )
                    .map(|mode| mode.technical_name.clone());
                }
                self.send_modes(updates);
                self.send_validation(updates);
            }
            UserAction::SelectMap(folder_name) => {
                match self
                    .filtered
                    .iter()
                    .find(|candidate| candidate.folder_name == folder_name)
                {
                    Some(candidate) => {
                        self.selected_map = Some(candidate.clone());
                        self.send_map_list(updates);
                        self.send_validation(updates);
                    }
                    None => warn!("action: SelectMap {folder_name} is not in the filtered view"),
                }
            }
            UserAction::MoveMapSelection(delta) => {
                self.selected_map =
                    search::step_selection(&self.filtered, self.selected_map.as_ref(), delta);
                self.send_map_list(updates);
                self.send_validation(updates);
            }
            UserAction::SelectMode(technical_name) => {
                if self
                    .modes
                    .iter()
                    .any(|mode| mode.technical_name == technical_name)
                {
                    self.selected_mode = Some(technical_name.clone());
                    self.last_mode = Some(technical_name);
                    self.persist_prefs().await;
                    self.send_modes(updates);
                    self.send_validation(updates);
                } else {
                    warn!("action: SelectMode for unknown mode {technical_name}");
                }
            }
            UserAction::SetTitle(title) => {
                self.title = title;
                self.persist_prefs().await;
                self.send_validation(updates);
            }
            UserAction::SetPassword(password) => {
                self.password = password;
                self.persist_prefs().await;
                self.send_validation(updates);
            }
            UserAction::SetFriendsOnly(friends_only) => {
                self.friends_only = friends_only;
                self.persist_prefs().await;
            }
            UserAction::SetMods(uids) => {
                self.selected_mods = uids;
            }
            UserAction::SetRating { min, max, enforce } => {
                self.rating_min = min;
                self.rating_max = max;
                self.enforce_rating = enforce;
                self.persist_prefs().await;
            }
            UserAction::ConnectionChanged(connection) => {
                info!("action: ConnectionChanged ({connection:?})");
                self.connection = connection;
                self.send_validation(updates);
            }
        }
    }

    /// The launch-assembly pipeline. Version resolution and mod
    /// reconciliation run concurrently; both fall back to the user's
    /// explicit choice on failure, so nothing past validation can abort
    /// the launch.
    async fn create_game(&mut self, updates: &mpsc::UnboundedSender<SessionUpdate>) {
        if !self.live.load(Ordering::SeqCst) {
            warn!("create: shell is closed; discarding trigger");
            return;
        }
        if self.phase != HostPhase::Idle {
            warn!("create: launch already in flight; discarding trigger");
            return;
        }
        if let Some(problem) = self.validation_error() {
            warn!("create: rejected by validation ({problem:?})");
            let _ = updates.send(SessionUpdate::Validation(Some(problem)));
            return;
        }
        let Some(map) = self.selected_map.clone() else {
            // validation_error() covers this; the guard protects direct calls.
            return;
        };

        self.set_phase(HostPhase::Resolving, updates);
        let selected_ref = map.version_ref();
        let selected_mods = self.selected_mods.clone();
        info!(
            "create: resolving {} and {} mod(s)",
            selected_ref.folder_name,
            selected_mods.len()
        );

        let (resolved_map, reconciled) = join(
            resolve_latest(&self.map_source, &selected_ref),
            self.mod_source.update_and_activate(&selected_mods),
        )
        .await;

        let mod_uids: BTreeSet<String> = match reconciled {
            Ok(active) => active.into_iter().map(|version| version.uid).collect(),
            Err(err) => {
                warn!("create: mod reconciliation failed ({err}); keeping the selected set");
                selected_mods
            }
        };

        self.set_phase(HostPhase::Assembling, updates);
        let descriptor = LaunchDescriptor {
            title: self.title.trim().to_owned(),
            password: (!self.password.is_empty()).then(|| self.password.clone()),
            map_folder: resolved_map.folder_name,
            mod_uids,
            featured_mode: self
                .selected_mode
                .clone()
                .unwrap_or_else(|| self.config.default_mode.clone()),
            friends_only: self.friends_only,
            rating_min: self.rating_min,
            rating_max: self.rating_max,
            enforce_rating: self.enforce_rating,
        };

        if !self.live.load(Ordering::SeqCst) {
            warn!("create: shell closed while resolving; discarding launch");
            self.set_phase(HostPhase::Idle, updates);
            return;
        }

        if let Err(err) = self.runner.host(&descriptor) {
            // The runner's own failures are its business; the session is done.
            error!("create: runner failed to start the client: {err}");
        }
        self.set_phase(HostPhase::Dispatched, updates);
        let _ = updates.send(SessionUpdate::CloseRequested);
        self.live.store(false, Ordering::SeqCst);
        self.set_phase(HostPhase::Idle, updates);
        info!("create: descriptor dispatched; session complete");
    }

    fn refresh_filter(&mut self, updates: &mpsc::UnboundedSender<SessionUpdate>) {
        let outcome = search::apply_query(&self.query, &self.candidates, self.selected_map.as_ref());
        self.filtered = outcome.filtered;
        self.selected_map = outcome.selected;
        self.send_map_list(updates);
        self.send_validation(updates);
    }

    fn validation_error(&self) -> Option<ValidationError> {
        validate(&ValidationInput {
            connection: self.connection,
            title: &self.title,
            password: &self.password,
            map_selected: self.selected_map.is_some(),
            mode_selected: self.selected_mode.is_some(),
        })
    }

    fn set_phase(&mut self, phase: HostPhase, updates: &mpsc::UnboundedSender<SessionUpdate>) {
        self.phase = phase;
        let _ = updates.send(SessionUpdate::Phase(phase));
    }

    fn send_map_list(&self, updates: &mpsc::UnboundedSender<SessionUpdate>) {
        let _ = updates.send(SessionUpdate::MapList {
            filtered: self.filtered.clone(),
            selected: self
                .selected_map
                .as_ref()
                .map(|candidate| candidate.folder_name.clone()),
        });
    }

    fn send_modes(&self, updates: &mpsc::UnboundedSender<SessionUpdate>) {
        let _ = updates.send(SessionUpdate::Modes {
            visible: self.modes.clone(),
            selected: self.selected_mode.clone(),
        });
    }

    fn send_validation(&self, updates: &mpsc::UnboundedSender<SessionUpdate>) {
        let _ = updates.send(SessionUpdate::Validation(self.validation_error()));
    }

    async fn persist_prefs(&self) {
        let prefs = LastGamePrefs {
            title: self.title.clone(),
            password: self.password.clone(),
            friends_only: self.friends_only,
            featured_mode: self.selected_mode.clone().or_else(|| self.last_mode.clone()),
            rating_min: self.rating_min,
            rating_max: self.rating_max,
            enforce_rating: self.enforce_rating,
            updated_at: String::new(),
        };
        if let Err(err) = self.storage.write_last_game(&prefs).await {
            warn!("prefs: failed to persist last game ({err})");
        }
    }
}

/// Resolve the latest version of the selected map, falling back to the
/// selection itself on any failure. Responses that would change the map's
/// base identity or step backwards in version are treated as failures too.
async fn resolve_latest<M: MapSource>(source: &M, selected: &MapVersionRef) -> MapVersionRef {
    match source.fetch_latest(selected).await {
        Ok(latest) => {
            if latest.base_name() != selected.base_name() {
                warn!(
                    "resolve: server answered with {} for {}; keeping selection",
                    latest.folder_name, selected.folder_name
                );
                selected.clone()
            } else if latest.version < selected.version {
                warn!(
                    "resolve: server version v{:04} is older than installed v{:04}; keeping selection",
                    latest.version, selected.version
                );
                selected.clone()
            } else {
                latest
            }
        }
        Err(err) => {
            warn!(
                "resolve: latest-version lookup failed ({err}); keeping {}",
                selected.folder_name
            );
            selected.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Clone)]
    struct StubMapSource {
        latest: Result<MapVersionRef, String>,
    }

    impl MapSource for StubMapSource {
        fn fetch_latest(
            &self,
            _selected: &MapVersionRef,
        ) -> impl Future<Output = Result<MapVersionRef, String>> + Send {
            let result = self.latest.clone();
            async move { result }
        }
    }

    /// Simulates the shell tearing down while the lookup is in flight.
    struct ShellClosingMapSource {
        live: Arc<AtomicBool>,
        latest: MapVersionRef,
    }

    impl MapSource for ShellClosingMapSource {
        fn fetch_latest(
            &self,
            _selected: &MapVersionRef,
        ) -> impl Future<Output = Result<MapVersionRef, String>> + Send {
            let live = self.live.clone();
            let latest = self.latest.clone();
            async move {
                live.store(false, Ordering::SeqCst);
                Ok(latest)
            }
        }
    }

    #[derive(Clone)]
    struct StubModSource {
        active: Result<Vec<ModVersion>, String>,
    }

    impl ModSource for StubModSource {
        fn update_and_activate(
            &self,
            _uids: &BTreeSet<String>,
        ) -> impl Future<Output = Result<Vec<ModVersion>, String>> + Send {
            let result = self.active.clone();
            async move { result }
        }
    }

    #[derive(Clone, Default)]
    struct RecordingRunner {
        hosted: Arc<Mutex<Vec<LaunchDescriptor>>>,
    }

    impl Runner for RecordingRunner {
        fn host(&self, descriptor: &LaunchDescriptor) -> Result<(), String> {
            self.hosted.lock().expect("runner lock").push(descriptor.clone());
            Ok(())
        }
    }

    fn map_ref(folder: &str, version: u32) -> MapVersionRef {
        MapVersionRef {
            folder_name: folder.to_owned(),
            version,
        }
    }

    fn candidate(folder: &str, display: &str, version: u32) -> MapCandidate {
        MapCandidate {
            folder_name: folder.to_owned(),
            display_name: display.to_owned(),
            version,
            preview: None,
        }
    }

    fn mod_version(uid: &str) -> ModVersion {
        ModVersion {
            uid: uid.to_owned(),
            enabled: true,
        }
    }

    fn mode(name: &str) -> FeaturedMode {
        FeaturedMode {
            technical_name: name.to_owned(),
            display_name: name.to_uppercase(),
            description: String::new(),
            visible: true,
        }
    }

    struct Harness {
        engine: HostEngine<StubMapSource, StubModSource, RecordingRunner>,
        runner: RecordingRunner,
        updates_tx: mpsc::UnboundedSender<SessionUpdate>,
        updates_rx: mpsc::UnboundedReceiver<SessionUpdate>,
        _tmp: tempfile::TempDir,
    }

    fn harness(map: StubMapSource, mods: StubModSource) -> Harness {
        let tmp = tempfile::tempdir().expect("tempdir");
        let runner = RecordingRunner::default();
        let engine = HostEngine::new(
            map,
            mods,
            runner.clone(),
            StorageManager::with_base_dir(tmp.path().to_path_buf()),
            HostConfig::default(),
            Arc::new(AtomicBool::new(true)),
            LastGamePrefs::default(),
        );
        let (updates_tx, updates_rx) = mpsc::unbounded_channel();
        Harness {
            engine,
            runner,
            updates_tx,
            updates_rx,
            _tmp: tmp,
        }
    }

    fn working_sources() -> (StubMapSource, StubModSource) {
        (
            StubMapSource {
                latest: Ok(map_ref("gap.v0001", 1)),
            },
            StubModSource { active: Ok(vec![]) },
        )
    }

    async fn prepare_session(h: &mut Harness) {
        let tx = h.updates_tx.clone();
        h.engine
            .handle_action(
                UserAction::ConnectionChanged(ConnectionState::Connected),
                &tx,
            )
            .await;
        h.engine
            .handle_action(
                UserAction::CandidatesChanged(vec![candidate("gap.v0001", "dual", 1)]),
                &tx,
            )
            .await;
        h.engine
            .handle_action(UserAction::ModesChanged(vec![mode("skirmish")]), &tx)
            .await;
        h.engine
            .handle_action(UserAction::SetTitle("test game".to_owned()), &tx)
            .await;
        h.engine
            .handle_action(UserAction::SelectMap("gap.v0001".to_owned()), &tx)
            .await;
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<SessionUpdate>) -> Vec<SessionUpdate> {
        let mut updates = Vec::new();
        while let Ok(update) = rx.try_recv() {
            updates.push(update);
        }
        updates
    }

    fn hosted(runner: &RecordingRunner) -> Vec<LaunchDescriptor> {
        runner.hosted.lock().expect("runner lock").clone()
    }

    #[tokio::test]
    async fn resolver_returns_the_fetched_version() {
        let source = StubMapSource {
            latest: Ok(map_ref("gap.v0002", 2)),
        };
        let resolved = resolve_latest(&source, &map_ref("gap.v0001", 1)).await;
        assert_eq!(resolved, map_ref("gap.v0002", 2));
    }

    #[tokio::test]
    async fn resolver_falls_back_to_the_selection_on_failure() {
        let source = StubMapSource {
            latest: Err("server unreachable".to_owned()),
        };
        let resolved = resolve_latest(&source, &map_ref("gap.v0001", 1)).await;
        assert_eq!(resolved, map_ref("gap.v0001", 1));
    }

    #[tokio::test]
    async fn resolver_rejects_cross_identity_substitution() {
        let source = StubMapSource {
            latest: Ok(map_ref("other.v0005", 5)),
        };
        let resolved = resolve_latest(&source, &map_ref("gap.v0001", 1)).await;
        assert_eq!(resolved, map_ref("gap.v0001", 1));
    }

    #[tokio::test]
    async fn resolver_never_steps_backwards() {
        let source = StubMapSource {
            latest: Ok(map_ref("gap.v0001", 1)),
        };
        let resolved = resolve_latest(&source, &map_ref("gap.v0003", 3)).await;
        assert_eq!(resolved, map_ref("gap.v0003", 3));
    }

    #[tokio::test]
    async fn create_dispatches_the_updated_map_version() {
        let (_, mods) = working_sources();
        let map = StubMapSource {
            latest: Ok(map_ref("gap.v0002", 2)),
        };
        let mut h = harness(map, mods);
        prepare_session(&mut h).await;

        let tx = h.updates_tx.clone();
        h.engine.handle_action(UserAction::CreateGame, &tx).await;

        let dispatched = hosted(&h.runner);
        assert_eq!(dispatched.len(), 1);
        assert_eq!(dispatched[0].map_folder, "gap.v0002");
        assert_eq!(dispatched[0].title, "test game");
        assert_eq!(dispatched[0].featured_mode, "skirmish");

        let updates = drain(&mut h.updates_rx);
        assert!(
            updates
                .iter()
                .any(|update| matches!(update, SessionUpdate::CloseRequested))
        );
    }

    #[tokio::test]
    async fn create_keeps_the_selection_when_the_lookup_fails() {
        let map = StubMapSource {
            latest: Err("timeout".to_owned()),
        };
        let mods = StubModSource {
            active: Ok(vec![mod_version("mod-new")]),
        };
        let mut h = harness(map, mods);
        prepare_session(&mut h).await;
        let tx = h.updates_tx.clone();
        h.engine
            .handle_action(
                UserAction::SetMods(BTreeSet::from(["mod-old".to_owned()])),
                &tx,
            )
            .await;

        h.engine.handle_action(UserAction::CreateGame, &tx).await;

        let dispatched = hosted(&h.runner);
        assert_eq!(dispatched.len(), 1);
        assert_eq!(dispatched[0].map_folder, "gap.v0001");
        assert_eq!(dispatched[0].mod_uids, BTreeSet::from(["mod-new".to_owned()]));
    }

    #[tokio::test]
    async fn create_falls_back_to_the_selected_mods_on_reconcile_failure() {
        let (map, _) = working_sources();
        let mods = StubModSource {
            active: Err("backend flaked".to_owned()),
        };
        let mut h = harness(map, mods);
        prepare_session(&mut h).await;
        let tx = h.updates_tx.clone();
        h.engine
            .handle_action(
                UserAction::SetMods(BTreeSet::from(["mod-a".to_owned(), "mod-b".to_owned()])),
                &tx,
            )
            .await;

        h.engine.handle_action(UserAction::CreateGame, &tx).await;

        let dispatched = hosted(&h.runner);
        assert_eq!(dispatched.len(), 1);
        assert_eq!(
            dispatched[0].mod_uids,
            BTreeSet::from(["mod-a".to_owned(), "mod-b".to_owned()])
        );
    }

    #[tokio::test]
    async fn create_uses_the_reconciled_mod_set() {
        let (map, _) = working_sources();
        let mods = StubModSource {
            active: Ok(vec![mod_version("mod-replacement")]),
        };
        let mut h = harness(map, mods);
        prepare_session(&mut h).await;
        let tx = h.updates_tx.clone();
        h.engine
            .handle_action(
                UserAction::SetMods(BTreeSet::from(["mod-outdated".to_owned()])),
                &tx,
            )
            .await;

        h.engine.handle_action(UserAction::CreateGame, &tx).await;

        let dispatched = hosted(&h.runner);
        assert_eq!(dispatched.len(), 1);
        assert_eq!(
            dispatched[0].mod_uids,
            BTreeSet::from(["mod-replacement".to_owned()])
        );
    }

    #[tokio::test]
    async fn rapid_triggers_host_exactly_once() {
        let (map, mods) = working_sources();
        let mut h = harness(map, mods);
        prepare_session(&mut h).await;

        let tx = h.updates_tx.clone();
        h.engine.handle_action(UserAction::CreateGame, &tx).await;
        h.engine.handle_action(UserAction::CreateGame, &tx).await;

        assert_eq!(hosted(&h.runner).len(), 1);
    }

    #[tokio::test]
    async fn create_is_rejected_without_a_map_selection() {
        let (map, mods) = working_sources();
        let mut h = harness(map, mods);
        let tx = h.updates_tx.clone();
        h.engine
            .handle_action(
                UserAction::ConnectionChanged(ConnectionState::Connected),
                &tx,
            )
            .await;
        h.engine
            .handle_action(UserAction::ModesChanged(vec![mode("skirmish")]), &tx)
            .await;
        h.engine
            .handle_action(UserAction::SetTitle("test game".to_owned()), &tx)
            .await;

        h.engine.handle_action(UserAction::CreateGame, &tx).await;

        assert!(hosted(&h.runner).is_empty());
        let updates = drain(&mut h.updates_rx);
        assert!(updates.iter().any(|update| matches!(
            update,
            SessionUpdate::Validation(Some(ValidationError::NoMapSelected))
        )));
    }

    #[tokio::test]
    async fn shell_teardown_mid_resolve_suppresses_the_dispatch() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let runner = RecordingRunner::default();
        let live = Arc::new(AtomicBool::new(true));
        let map = ShellClosingMapSource {
            live: live.clone(),
            latest: map_ref("gap.v0002", 2),
        };
        let mut engine = HostEngine::new(
            map,
            StubModSource { active: Ok(vec![]) },
            runner.clone(),
            StorageManager::with_base_dir(tmp.path().to_path_buf()),
            HostConfig::default(),
            live.clone(),
            LastGamePrefs::default(),
        );
        let (tx, _rx) = mpsc::unbounded_channel();
        engine
            .handle_action(
                UserAction::ConnectionChanged(ConnectionState::Connected),
                &tx,
            )
            .await;
        engine
            .handle_action(
                UserAction::CandidatesChanged(vec![candidate("gap.v0001", "dual", 1)]),
                &tx,
            )
            .await;
        engine
            .handle_action(UserAction::ModesChanged(vec![mode("skirmish")]), &tx)
            .await;
        engine
            .handle_action(UserAction::SetTitle("test game".to_owned()), &tx)
            .await;
        engine
            .handle_action(UserAction::SelectMap("gap.v0001".to_owned()), &tx)
            .await;

        engine.handle_action(UserAction::CreateGame, &tx).await;

        assert!(hosted(&runner).is_empty());
    }

    #[tokio::test]
    async fn query_changes_preserve_then_clear_the_selection() {
        let (map, mods) = working_sources();
        let mut h = harness(map, mods);
        let tx = h.updates_tx.clone();
        h.engine
            .handle_action(
                UserAction::CandidatesChanged(vec![candidate("test1.v0001", "Test1", 1)]),
                &tx,
            )
            .await;
        h.engine
            .handle_action(UserAction::SelectMap("test1.v0001".to_owned()), &tx)
            .await;

        h.engine
            .handle_action(UserAction::QueryChanged("Test".to_owned()), &tx)
            .await;
        let updates = drain(&mut h.updates_rx);
        let last_list = updates
            .iter()
            .rev()
            .find_map(|update| match update {
                SessionUpdate::MapList { selected, .. } => Some(selected.clone()),
                _ => None,
            })
            .expect("map list update");
        assert_eq!(last_list.as_deref(), Some("test1.v0001"));

        h.engine
            .handle_action(
                UserAction::QueryChanged("Not in Filtered Maps".to_owned()),
                &tx,
            )
            .await;
        let updates = drain(&mut h.updates_rx);
        let last_list = updates
            .iter()
            .rev()
            .find_map(|update| match update {
                SessionUpdate::MapList { filtered, selected } => {
                    Some((filtered.clone(), selected.clone()))
                }
                _ => None,
            })
            .expect("map list update");
        assert!(last_list.0.is_empty());
        assert_eq!(last_list.1, None);
    }

    #[tokio::test]
    async fn mode_list_selects_last_used_or_default() {
        let (map, mods) = working_sources();
        let tmp = tempfile::tempdir().expect("tempdir");
        let mut engine = HostEngine::new(
            map.clone(),
            mods.clone(),
            RecordingRunner::default(),
            StorageManager::with_base_dir(tmp.path().to_path_buf()),
            HostConfig::default(),
            Arc::new(AtomicBool::new(true)),
            LastGamePrefs {
                featured_mode: Some("last".to_owned()),
                ..LastGamePrefs::default()
            },
        );
        let (tx, mut rx) = mpsc::unbounded_channel();
        engine
            .handle_action(
                UserAction::ModesChanged(vec![mode("skirmish"), mode("last")]),
                &tx,
            )
            .await;
        let updates = drain(&mut rx);
        let selected = updates
            .iter()
            .find_map(|update| match update {
                SessionUpdate::Modes { selected, .. } => Some(selected.clone()),
                _ => None,
            })
            .expect("modes update");
        assert_eq!(selected.as_deref(), Some("last"));

        // A remembered mode that no longer exists falls back to the default.
        let mut engine = HostEngine::new(
            map,
            mods,
            RecordingRunner::default(),
            StorageManager::with_base_dir(tmp.path().to_path_buf()),
            HostConfig::default(),
            Arc::new(AtomicBool::new(true)),
            LastGamePrefs {
                featured_mode: Some("gone".to_owned()),
                ..LastGamePrefs::default()
            },
        );
        let (tx, mut rx) = mpsc::unbounded_channel();
        engine
            .handle_action(
                UserAction::ModesChanged(vec![mode("skirmish"), mode("last")]),
                &tx,
            )
            .await;
        let updates = drain(&mut rx);
        let selected = updates
            .iter()
            .find_map(|update| match update {
                SessionUpdate::Modes { selected, .. } => Some(selected.clone()),
                _ => None,
            })
            .expect("modes update");
        assert_eq!(selected.as_deref(), Some("skirmish"));
    }
}
