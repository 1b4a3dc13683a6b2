use std::collections::BTreeSet;
use std::path::Path;

use log::warn;
use serde::Serialize;
use walkdir::WalkDir;

use crate::engine::ModSource;
use crate::engine::models::ModVersion;
use crate::networking::{API_BASE, NetworkClient};

#[derive(Serialize)]
struct ActivateRequest<'a> {
    uids: &'a BTreeSet<String>,
}

/// Client for the mod endpoints of the lobby API.
#[derive(Clone)]
pub struct ModService {
    network: NetworkClient,
    base_url: String,
}

impl ModService {
    pub fn new(network: NetworkClient) -> Self {
        Self {
            network,
            base_url: API_BASE.to_owned(),
        }
    }

    /// Ask the server to update and activate the selected mod set, returning
    /// the resulting active versions. The server owns the outcome: an
    /// outdated mod may come back as a newer uid, a withdrawn one not at all.
    ///
    /// Failures propagate to the caller; the launch pipeline decides what a
    /// failed reconciliation falls back to.
    pub async fn update_and_activate(
        &self,
        uids: &BTreeSet<String>,
    ) -> Result<Vec<ModVersion>, String> {
        let url = format!("{}/mods/activate", self.base_url);
        let resp = self
            .network
            .inner()
            .post(&url)
            .json(&ActivateRequest { uids })
            .send()
            .await
            .map_err(|e| format!("mod activation failed: {e}"))?
            .error_for_status()
            .map_err(|e| format!("mod activation status error: {e}"))?;
        resp.json::<Vec<ModVersion>>()
            .await
            .map_err(|e| format!("mod activation parse error: {e}"))
    }
}

impl ModSource for ModService {
    fn update_and_activate(
        &self,
        uids: &BTreeSet<String>,
    ) -> impl std::future::Future<Output = Result<Vec<ModVersion>, String>> + Send {
        ModService::update_and_activate(self, uids)
    }
}

/// Scan the mods directory for installed mods. One folder per mod, named by
/// its uid; the folder contents are the client's business.
pub fn scan_installed(mods_dir: &Path) -> Vec<String> {
    let mut uids = Vec::new();
    for entry in WalkDir::new(mods_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("mod scan: skipping unreadable entry: {err}");
                continue;
            }
        };
        if entry.file_type().is_dir() {
            uids.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    uids
}
