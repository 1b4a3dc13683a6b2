use std::path::PathBuf;

use chrono::Utc;
use log::debug;
use tokio::fs;

use crate::engine::models::LastGamePrefs;
use crate::env;

const LAST_GAME_FILE: &str = "last_game.json";

#[derive(Clone)]
pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    pub fn new() -> Self {
        // Best-effort directory creation; failures are surfaced on write.
        let _ = env::ensure_base_dirs();
        Self::with_base_dir(env::default_app_dir())
    }

    #[must_use]
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn maps_dir(&self) -> PathBuf {
        env::maps_dir()
    }

    /// Last-session dialog defaults, if any were saved.
    pub async fn read_last_game(&self) -> Option<LastGamePrefs> {
        let path = self.base_dir.join(LAST_GAME_FILE);
        let bytes = fs::read(&path).await.ok()?;
        match serde_json::from_slice(&bytes) {
            Ok(prefs) => Some(prefs),
            Err(err) => {
                debug!("storage: discarding unreadable {LAST_GAME_FILE}: {err}");
                None
            }
        }
    }

    /// Persist the dialog defaults, stamping the write time.
    pub async fn write_last_game(&self, prefs: &LastGamePrefs) -> Result<(), String> {
        let mut stamped = prefs.clone();
        stamped.updated_at = Utc::now().to_rfc3339();

        let path = self.base_dir.join(LAST_GAME_FILE);
        let bytes = serde_json::to_vec_pretty(&stamped)
            .map_err(|e| format!("failed to serialize game prefs: {e}"))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| format!("failed to create prefs dir: {e}"))?;
        }
        fs::write(&path, &bytes)
            .await
            .map_err(|e| format!("failed to write game prefs: {e}"))
    }
}

impl Default for StorageManager {
    fn default() -> Self {
        Self::new()
    }
}
