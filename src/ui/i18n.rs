use crate::engine::validate::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    English,
    Ukrainian,
}

impl Language {
    pub const fn display_name(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Ukrainian => "Українська",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct I18n {
    language: Language,
}

impl I18n {
    #[must_use]
    pub const fn new(language: Language) -> Self {
        Self { language }
    }

    fn pick<'a>(self, english: &'a str, ukrainian: &'a str) -> &'a str {
        match self.language {
            Language::English => english,
            Language::Ukrainian => ukrainian,
        }
    }

    pub fn heading(self) -> &'static str {
        self.pick("Host a game", "Створити гру")
    }

    pub fn title_label(self) -> &'static str {
        self.pick("Title", "Назва")
    }

    pub fn password_label(self) -> &'static str {
        self.pick("Password (optional)", "Пароль (необов'язково)")
    }

    pub fn friends_only_label(self) -> &'static str {
        self.pick("Visible to friends only", "Видима лише друзям")
    }

    pub fn maps_heading(self) -> &'static str {
        self.pick("Map", "Мапа")
    }

    pub fn map_search_hint(self) -> &'static str {
        self.pick("Search maps...", "Пошук мап...")
    }

    pub fn no_maps_found(self) -> &'static str {
        self.pick("No maps match your search.", "Жодна мапа не відповідає пошуку.")
    }

    pub fn modes_heading(self) -> &'static str {
        self.pick("Game mode", "Режим гри")
    }

    pub fn create_button(self) -> &'static str {
        self.pick("Create game", "Створити гру")
    }

    pub fn creating_in_progress(self) -> &'static str {
        self.pick("Creating...", "Створення...")
    }

    pub fn validation_message(self, problem: ValidationError) -> &'static str {
        match problem {
            ValidationError::Disconnected => {
                self.pick("Not connected to the lobby", "Немає з'єднання з лобі")
            }
            ValidationError::Connecting => {
                self.pick("Connecting to the lobby...", "З'єднання з лобі...")
            }
            ValidationError::TitleMissing => self.pick("Title is missing", "Назва відсутня"),
            ValidationError::TitleNotAscii => self.pick(
                "Title contains unsupported characters",
                "Назва містить непідтримувані символи",
            ),
            ValidationError::PasswordNotAscii => self.pick(
                "Password contains unsupported characters",
                "Пароль містить непідтримувані символи",
            ),
            ValidationError::NoMapSelected => self.pick("Select a map", "Оберіть мапу"),
            ValidationError::NoModeSelected => {
                self.pick("No game mode available", "Немає доступного режиму гри")
            }
        }
    }
}
