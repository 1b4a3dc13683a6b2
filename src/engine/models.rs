use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::util::split_version_suffix;

/// An installed map, as produced by the maps directory scan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MapCandidate {
    pub folder_name: String,
    pub display_name: String,
    pub version: u32,
    pub preview: Option<PathBuf>,
}

impl MapCandidate {
    #[must_use]
    pub fn version_ref(&self) -> MapVersionRef {
        MapVersionRef {
            folder_name: self.folder_name.clone(),
            version: self.version,
        }
    }
}

/// The specific deployable map version a launch descriptor will reference.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapVersionRef {
    pub folder_name: String,
    pub version: u32,
}

impl MapVersionRef {
    /// Base identity without the `.vNNNN` ordinal suffix.
    #[must_use]
    pub fn base_name(&self) -> &str {
        split_version_suffix(&self.folder_name).0
    }
}

/// A server-activated mod version returned by reconciliation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModVersion {
    pub uid: String,
    #[serde(default)]
    pub enabled: bool,
}

/// A server-advertised game-mode variant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeaturedMode {
    pub technical_name: String,
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    pub visible: bool,
}

/// Fully-resolved record handed to the runner to start a match. Built once
/// per create action; never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LaunchDescriptor {
    pub title: String,
    pub password: Option<String>,
    pub map_folder: String,
    pub mod_uids: BTreeSet<String>,
    pub featured_mode: String,
    pub friends_only: bool,
    pub rating_min: Option<i32>,
    pub rating_max: Option<i32>,
    pub enforce_rating: bool,
}

/// Persisted dialog defaults, re-applied on the next session.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LastGamePrefs {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub friends_only: bool,
    #[serde(default)]
    pub featured_mode: Option<String>,
    #[serde(default)]
    pub rating_min: Option<i32>,
    #[serde(default)]
    pub rating_max: Option<i32>,
    #[serde(default)]
    pub enforce_rating: bool,
    #[serde(default)]
    pub updated_at: String,
}
