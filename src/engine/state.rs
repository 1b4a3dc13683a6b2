use std::collections::BTreeSet;

use crate::engine::models::{FeaturedMode, MapCandidate};
use crate::engine::validate::ValidationError;

/// Launch pipeline phases. One create action walks
/// Idle -> Resolving -> Assembling -> Dispatched and back to Idle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostPhase {
    Idle,
    Resolving,
    Assembling,
    Dispatched,
}

/// Lobby server connection state, observed from the shell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    Connected,
    Connecting,
    Disconnected,
}

// Entry points into the session state machine. Everything the shell can do
// arrives here, in order, one at a time.
#[derive(Clone, Debug)]
pub enum UserAction {
    CreateGame,
    QueryChanged(String),
    CandidatesChanged(Vec<MapCandidate>),
    ModesChanged(Vec<FeaturedMode>),
    SelectMap(String),
    MoveMapSelection(i32),
    SelectMode(String),
    SetTitle(String),
    SetPassword(String),
    SetFriendsOnly(bool),
    SetMods(BTreeSet<String>),
    SetRating {
        min: Option<i32>,
        max: Option<i32>,
        enforce: bool,
    },
    ConnectionChanged(ConnectionState),
}

// Derived-state snapshots pushed to the shell after each action.
#[derive(Clone, Debug)]
pub enum SessionUpdate {
    Phase(HostPhase),
    MapList {
        filtered: Vec<MapCandidate>,
        selected: Option<String>,
    },
    Modes {
        visible: Vec<FeaturedMode>,
        selected: Option<String>,
    },
    Validation(Option<ValidationError>),
    CloseRequested,
}
