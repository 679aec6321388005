use std::fmt;

/// Which presentation strategy is active. Exactly one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavigationMode {
    /// Clickable outline panel listing every user turn.
    #[default]
    List,
    /// Position-mapped scrollbar with per-message tick marks.
    Precision,
}

impl NavigationMode {
    /// Token written to and read from the settings store.
    pub fn token(self) -> &'static str {
        match self {
            NavigationMode::List => "list",
            NavigationMode::Precision => "precision",
        }
    }

    /// Parses a persisted token. Unknown tokens are the caller's problem;
    /// settings readers default them rather than erroring.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "list" => Some(NavigationMode::List),
            "precision" => Some(NavigationMode::Precision),
            _ => None,
        }
    }

    /// The other mode, used by the toggle shortcut.
    pub fn toggled(self) -> Self {
        match self {
            NavigationMode::List => NavigationMode::Precision,
            NavigationMode::Precision => NavigationMode::List,
        }
    }
}

impl fmt::Display for NavigationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Which page edge the list-mode panel docks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanelPosition {
    Left,
    #[default]
    Right,
}

impl PanelPosition {
    /// Token written to and read from the settings store.
    pub fn token(self) -> &'static str {
        match self {
            PanelPosition::Left => "left",
            PanelPosition::Right => "right",
        }
    }

    /// Parses a persisted token; `None` for anything unrecognized.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "left" => Some(PanelPosition::Left),
            "right" => Some(PanelPosition::Right),
            _ => None,
        }
    }
}

impl fmt::Display for PanelPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}
