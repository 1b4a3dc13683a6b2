use crate::engine::models::FeaturedMode;
use crate::networking::{API_BASE, NetworkClient};

/// Technical name of the mode preselected when the last-used one is gone.
pub const DEFAULT_FEATURED_MODE: &str = "skirmish";

/// Client for the featured game-mode listing of the lobby API.
#[derive(Clone)]
pub struct FeaturedModeService {
    network: NetworkClient,
    base_url: String,
}

impl FeaturedModeService {
    pub fn new(network: NetworkClient) -> Self {
        Self {
            network,
            base_url: API_BASE.to_owned(),
        }
    }

    /// Server-advertised game modes, in server order, including invisible
    /// entries. Callers filter for visibility.
    pub async fn list(&self) -> Result<Vec<FeaturedMode>, String> {
        let url = format!("{}/featured-modes", self.base_url);
        let resp = self
            .network
            .inner()
            .get(&url)
            .send()
            .await
            .map_err(|e| format!("featured mode listing failed: {e}"))?
            .error_for_status()
            .map_err(|e| format!("featured mode listing status error: {e}"))?;
        resp.json::<Vec<FeaturedMode>>()
            .await
            .map_err(|e| format!("featured mode parse error: {e}"))
    }
}

/// Pick the initial mode selection: the last-used mode if it is still
/// visible, else the configured default, else none. Invisible modes are
/// never candidates, even when they were the last-used one.
#[must_use]
pub fn select_initial<'a>(
    modes: &'a [FeaturedMode],
    last_used: Option<&str>,
    default_mode: &str,
) -> Option<&'a FeaturedMode> {
    let visible = |name: &str| {
        modes
            .iter()
            .find(|mode| mode.visible && mode.technical_name == name)
    };

    last_used
        .and_then(|name| visible(name))
        .or_else(|| visible(default_mode))
}
