use crate::engine::state::ConnectionState;

/// Everything that can disable the create button. Each variant maps to one
/// user-facing message; nothing below this layer is ever shown to the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValidationError {
    Disconnected,
    Connecting,
    TitleMissing,
    TitleNotAscii,
    PasswordNotAscii,
    NoMapSelected,
    NoModeSelected,
}

pub struct ValidationInput<'a> {
    pub connection: ConnectionState,
    pub title: &'a str,
    pub password: &'a str,
    pub map_selected: bool,
    pub mode_selected: bool,
}

/// First failing check wins; the order mirrors the create-button bindings of
/// the dialog (connection issues outrank field issues).
#[must_use]
pub fn validate(input: &ValidationInput<'_>) -> Option<ValidationError> {
    match input.connection {
        ConnectionState::Disconnected => return Some(ValidationError::Disconnected),
        ConnectionState::Connecting => return Some(ValidationError::Connecting),
        ConnectionState::Connected => {}
    }
    if input.title.trim().is_empty() {
        return Some(ValidationError::TitleMissing);
    }
    if !input.title.is_ascii() {
        return Some(ValidationError::TitleNotAscii);
    }
    if !input.password.is_ascii() {
        return Some(ValidationError::PasswordNotAscii);
    }
    if !input.map_selected {
        return Some(ValidationError::NoMapSelected);
    }
    if !input.mode_selected {
        return Some(ValidationError::NoModeSelected);
    }
    None
}
