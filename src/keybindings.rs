//! Keybinding registry: maps key events to actions per screen, with
//! overrides from `config.toml`.
use crossterm::event::{KeyCode, KeyModifiers};
use std::collections::HashMap;

// ============================================================================
// Action Enum
// ============================================================================

/// Every user-facing action a key can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    ShowHelp,
    NavDown,
    NavUp,
    PageDown,
    PageUp,
    Top,
    Bottom,
    Open,
    MarkRead,
    OpenInBrowser,
    Back,
    Next,
    ScrollDown,
    ScrollUp,
    ScrollPageDown,
    ScrollPageUp,
}

impl Action {
    /// Human-readable description for the help overlay.
    pub fn describe(self) -> &'static str {
        match self {
            Self::Quit => "Quit",
            Self::ShowHelp => "Toggle this help",
            Self::NavDown => "Next entry",
            Self::NavUp => "Previous entry",
            Self::PageDown => "Page down",
            Self::PageUp => "Page up",
            Self::Top => "First entry",
            Self::Bottom => "Last entry",
            Self::Open => "Open entry",
            Self::MarkRead => "Mark read",
            Self::OpenInBrowser => "Open link in browser",
            Self::Back => "Back to list",
            Self::Next => "Mark read and open next",
            Self::ScrollDown => "Scroll down",
            Self::ScrollUp => "Scroll up",
            Self::ScrollPageDown => "Scroll page down",
            Self::ScrollPageUp => "Scroll page up",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        let action = match name.to_lowercase().as_str() {
            "quit" => Self::Quit,
            "show_help" | "help" => Self::ShowHelp,
            "nav_down" | "down" => Self::NavDown,
            "nav_up" | "up" => Self::NavUp,
            "page_down" | "pagedown" => Self::PageDown,
            "page_up" | "pageup" => Self::PageUp,
            "top" | "first" => Self::Top,
            "bottom" | "last" => Self::Bottom,
            "open" | "select" => Self::Open,
            "mark_read" | "markread" | "read" => Self::MarkRead,
            "open_in_browser" | "browser" => Self::OpenInBrowser,
            "back" => Self::Back,
            "next" | "open_next" => Self::Next,
            "scroll_down" => Self::ScrollDown,
            "scroll_up" => Self::ScrollUp,
            "scroll_page_down" => Self::ScrollPageDown,
            "scroll_page_up" => Self::ScrollPageUp,
            _ => return None,
        };
        Some(action)
    }
}

/// Which bindings are active. Screen contexts fall back to `Global`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    Global,
    List,
    Detail,
}

impl Context {
    /// Group heading in the help overlay.
    pub fn label(self) -> &'static str {
        match self {
            Self::Global => "General",
            Self::List => "Entry list",
            Self::Detail => "Entry view",
        }
    }
}

// ============================================================================
// Key Specification
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeySpec {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeySpec {
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub const fn char(c: char) -> Self {
        Self::plain(KeyCode::Char(c))
    }

    pub const fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    /// Terminals report `G` or `?` with SHIFT set; the character already
    /// carries the case, so SHIFT is dropped for char keys.
    fn normalized(self) -> Self {
        match self.code {
            KeyCode::Char(_) => {
                Self::new(self.code, self.modifiers.difference(KeyModifiers::SHIFT))
            }
            _ => self,
        }
    }
}

/// Parse a key string from config.
///
/// Accepts a single character (`q`, `/`), a named key (`Enter`, `Esc`,
/// `PageDown`, `Home`, ...), `Ctrl+<char>` or `F1`..`F12`.
fn parse_key_string(s: &str) -> Option<KeySpec> {
    let s = s.trim();

    if let Some(rest) = s.strip_prefix("Ctrl+").or_else(|| s.strip_prefix("ctrl+")) {
        let mut chars = rest.trim().chars();
        return match (chars.next(), chars.next()) {
            (Some(c), None) => Some(KeySpec::ctrl(c)),
            _ => None,
        };
    }

    let named = match s.to_lowercase().as_str() {
        "enter" | "return" => Some(KeyCode::Enter),
        "esc" | "escape" => Some(KeyCode::Esc),
        "tab" => Some(KeyCode::Tab),
        "up" => Some(KeyCode::Up),
        "down" => Some(KeyCode::Down),
        "left" => Some(KeyCode::Left),
        "right" => Some(KeyCode::Right),
        "pageup" | "pgup" => Some(KeyCode::PageUp),
        "pagedown" | "pgdn" => Some(KeyCode::PageDown),
        "home" => Some(KeyCode::Home),
        "end" => Some(KeyCode::End),
        "backspace" => Some(KeyCode::Backspace),
        "space" => Some(KeyCode::Char(' ')),
        _ => None,
    };
    if let Some(code) = named {
        return Some(KeySpec::plain(code));
    }

    if let Some(n) = s
        .strip_prefix(['F', 'f'])
        .and_then(|n| n.parse::<u8>().ok())
    {
        return (1..=12).contains(&n).then(|| KeySpec::plain(KeyCode::F(n)));
    }

    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(KeySpec::char(c)),
        _ => None,
    }
}

/// Human-readable key name for the help overlay and status hints.
pub fn format_key(key: &KeySpec) -> String {
    let name = match key.code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Up => "Up".to_string(),
        KeyCode::Down => "Down".to_string(),
        KeyCode::Left => "Left".to_string(),
        KeyCode::Right => "Right".to_string(),
        KeyCode::PageUp => "PgUp".to_string(),
        KeyCode::PageDown => "PgDn".to_string(),
        KeyCode::Home => "Home".to_string(),
        KeyCode::End => "End".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        _ => "?".to_string(),
    };

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        format!("Ctrl+{}", name)
    } else {
        name
    }
}

// ============================================================================
// Defaults
// ============================================================================

const DEFAULT_BINDINGS: &[(Context, KeySpec, Action)] = &[
    (Context::Global, KeySpec::char('q'), Action::Quit),
    (Context::Global, KeySpec::char('?'), Action::ShowHelp),
    // List
    (Context::List, KeySpec::char('j'), Action::NavDown),
    (Context::List, KeySpec::plain(KeyCode::Down), Action::NavDown),
    (Context::List, KeySpec::char('k'), Action::NavUp),
    (Context::List, KeySpec::plain(KeyCode::Up), Action::NavUp),
    (Context::List, KeySpec::plain(KeyCode::PageDown), Action::PageDown),
    (Context::List, KeySpec::ctrl('d'), Action::PageDown),
    (Context::List, KeySpec::plain(KeyCode::PageUp), Action::PageUp),
    (Context::List, KeySpec::ctrl('u'), Action::PageUp),
    (Context::List, KeySpec::char('g'), Action::Top),
    (Context::List, KeySpec::plain(KeyCode::Home), Action::Top),
    (Context::List, KeySpec::char('G'), Action::Bottom),
    (Context::List, KeySpec::plain(KeyCode::End), Action::Bottom),
    (Context::List, KeySpec::plain(KeyCode::Enter), Action::Open),
    (Context::List, KeySpec::char('r'), Action::MarkRead),
    (Context::List, KeySpec::char('o'), Action::OpenInBrowser),
    // Detail
    (Context::Detail, KeySpec::char('q'), Action::Back),
    (Context::Detail, KeySpec::plain(KeyCode::Esc), Action::Back),
    (Context::Detail, KeySpec::char('b'), Action::Back),
    (Context::Detail, KeySpec::plain(KeyCode::Right), Action::Next),
    (Context::Detail, KeySpec::char('n'), Action::Next),
    (Context::Detail, KeySpec::char('r'), Action::MarkRead),
    (Context::Detail, KeySpec::char('o'), Action::OpenInBrowser),
    (Context::Detail, KeySpec::char('j'), Action::ScrollDown),
    (Context::Detail, KeySpec::plain(KeyCode::Down), Action::ScrollDown),
    (Context::Detail, KeySpec::char('k'), Action::ScrollUp),
    (Context::Detail, KeySpec::plain(KeyCode::Up), Action::ScrollUp),
    (Context::Detail, KeySpec::ctrl('d'), Action::ScrollPageDown),
    (Context::Detail, KeySpec::plain(KeyCode::PageDown), Action::ScrollPageDown),
    (Context::Detail, KeySpec::ctrl('u'), Action::ScrollPageUp),
    (Context::Detail, KeySpec::plain(KeyCode::PageUp), Action::ScrollPageUp),
];

// ============================================================================
// Keybinding Registry
// ============================================================================

/// Context-aware key lookup. The same key can mean different things on the
/// list and detail screens.
#[derive(Debug)]
pub struct KeybindingRegistry {
    lookup: HashMap<(Context, KeySpec), Action>,
    /// Registration order, kept for the help overlay.
    bindings: Vec<(Context, KeySpec, Action)>,
}

impl KeybindingRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            lookup: HashMap::new(),
            bindings: Vec::with_capacity(DEFAULT_BINDINGS.len()),
        };
        for &(context, key, action) in DEFAULT_BINDINGS {
            registry.bind(context, key, action);
        }
        registry
    }

    fn bind(&mut self, context: Context, key: KeySpec, action: Action) {
        if let Some(previous) = self.lookup.insert((context, key), action) {
            self.bindings
                .retain(|(c, k, a)| !(*c == context && *k == key && *a == previous));
        }
        self.bindings.push((context, key, action));
    }

    /// Apply `action name -> key string` overrides from config.
    ///
    /// The new key replaces every default key of that action, in every
    /// context the action was bound in. Returns one warning per entry that
    /// could not be applied.
    pub fn apply_overrides(&mut self, overrides: &HashMap<String, String>) -> Vec<String> {
        let mut warnings = Vec::new();

        for (action_name, key_str) in overrides {
            let Some(action) = Action::from_name(action_name) else {
                warnings.push(format!("Unknown action '{}', ignoring", action_name));
                continue;
            };
            let Some(key) = parse_key_string(key_str) else {
                warnings.push(format!(
                    "Cannot parse key '{}' for action '{}', ignoring",
                    key_str, action_name
                ));
                continue;
            };

            let mut contexts: Vec<Context> = self
                .bindings
                .iter()
                .filter(|(_, _, a)| *a == action)
                .map(|(c, _, _)| *c)
                .collect();
            contexts.dedup();

            self.lookup.retain(|_, a| *a != action);
            self.bindings.retain(|(_, _, a)| *a != action);
            for context in contexts {
                self.bind(context, key, action);
            }

            tracing::info!(action = %action_name, key = %key_str, "Applied keybinding override");
        }

        warnings
    }

    /// Resolve a key in `context`, falling back to `Global`.
    pub fn action_for_key(
        &self,
        code: KeyCode,
        modifiers: KeyModifiers,
        context: Context,
    ) -> Option<Action> {
        let key = KeySpec::new(code, modifiers).normalized();
        self.lookup
            .get(&(context, key))
            .or_else(|| self.lookup.get(&(Context::Global, key)))
            .copied()
    }

    /// First key bound to `action` in `context` (or Global), for hints.
    pub fn key_for(&self, action: Action, context: Context) -> Option<String> {
        self.bindings
            .iter()
            .find(|(c, _, a)| *a == action && (*c == context || *c == Context::Global))
            .map(|(_, k, _)| format_key(k))
    }

    /// `(context, key, action, description)` for every binding, in
    /// registration order.
    pub fn all_bindings(&self) -> Vec<(Context, String, Action, &'static str)> {
        self.bindings
            .iter()
            .map(|(ctx, key, action)| (*ctx, format_key(key), *action, action.describe()))
            .collect()
    }
}

impl Default for KeybindingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
