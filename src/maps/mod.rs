use std::fs;
use std::path::Path;

use log::{debug, warn};
use serde::Deserialize;
use walkdir::WalkDir;

use crate::engine::MapSource;
use crate::engine::models::{MapCandidate, MapVersionRef};
use crate::networking::{API_BASE, NetworkClient};
use crate::util::split_version_suffix;

const MAP_INFO_FILE: &str = "map.json";
const PREVIEW_FILE: &str = "preview.png";

#[derive(Debug, Deserialize)]
struct MapInfo {
    display_name: String,
}

/// Client for the map endpoints of the lobby API plus the local install scan.
#[derive(Clone)]
pub struct MapService {
    network: NetworkClient,
    base_url: String,
}

impl MapService {
    pub fn new(network: NetworkClient) -> Self {
        Self {
            network,
            base_url: API_BASE.to_owned(),
        }
    }

    /// Latest known version of the selected map, straight from the server.
    /// May fail; the caller owns the fallback policy.
    pub async fn fetch_latest(&self, selected: &MapVersionRef) -> Result<MapVersionRef, String> {
        let url = format!("{}/maps/{}/latest", self.base_url, selected.base_name());
        let resp = self
            .network
            .inner()
            .get(&url)
            .send()
            .await
            .map_err(|e| format!("map version lookup failed: {e}"))?
            .error_for_status()
            .map_err(|e| format!("map version lookup status error: {e}"))?;
        resp.json::<MapVersionRef>()
            .await
            .map_err(|e| format!("map version parse error: {e}"))
    }
}

impl MapSource for MapService {
    fn fetch_latest(
        &self,
        selected: &MapVersionRef,
    ) -> impl std::future::Future<Output = Result<MapVersionRef, String>> + Send {
        MapService::fetch_latest(self, selected)
    }
}

/// Scan the maps directory for installed maps. One folder per map version,
/// named `<base>.v<NNNN>`, optionally carrying `map.json` metadata and a
/// `preview.png` thumbnail. Unreadable entries are skipped with a warning.
pub fn scan_installed(maps_dir: &Path) -> Vec<MapCandidate> {
    let mut candidates = Vec::new();
    for entry in WalkDir::new(maps_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("map scan: skipping unreadable entry: {err}");
                continue;
            }
        };
        if !entry.file_type().is_dir() {
            continue;
        }
        let folder_name = entry.file_name().to_string_lossy().into_owned();
        let (base, version) = split_version_suffix(&folder_name);

        let display_name = match read_map_info(&entry.path().join(MAP_INFO_FILE)) {
            Some(info) => info.display_name,
            None => base.to_owned(),
        };

        let preview_path = entry.path().join(PREVIEW_FILE);
        let preview = preview_path.exists().then_some(preview_path);

        debug!("map scan: found {folder_name} (v{version:04})");
        candidates.push(MapCandidate {
            folder_name,
            display_name,
            version,
            preview,
        });
    }
    candidates
}

fn read_map_info(path: &Path) -> Option<MapInfo> {
    let raw = fs::read_to_string(path).ok()?;
    match serde_json::from_str(&raw) {
        Ok(info) => Some(info),
        Err(err) => {
            warn!("map scan: ignoring malformed {}: {err}", path.display());
            None
        }
    }
}
