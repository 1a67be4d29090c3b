//! Keyboard shortcuts.
//!
//! Each [`KeybindingMode`] has its own `keybinds` dispatcher mapping key
//! sequences to an [`Action`]. Users override or add bindings per mode in
//! the `[keybindings]` table of the config file:
//!
//! ```toml
//! [keybindings.Normal]
//! "n" = "Next"
//! "g h" = "First"
//!
//! [keybindings.LinkFollow]
//! "o" = "FollowLink"
//! ```
//!
//! Bindings that fail to parse are skipped with a warning; the defaults for
//! that key stay in place.

mod action;
mod defaults;

pub use action::Action;

use crossterm::event::KeyEvent;
use keybinds::{Key, KeyInput, KeySeq, Keybinds, Mods};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::warn;

/// Viewer states with their own key map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum KeybindingMode {
    /// Outline and content navigation
    Normal,
    /// Help popup is shown
    Help,
    /// Cycling through the links of the page
    LinkFollow,
}

#[derive(Debug)]
pub struct Keybindings {
    bindings: HashMap<KeybindingMode, Keybinds<Action>>,
}

impl Default for Keybindings {
    fn default() -> Self {
        defaults::default_keybindings()
    }
}

impl Keybindings {
    fn empty() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// Feed one key press to the dispatcher for `mode`.
    ///
    /// Returns `None` for unbound keys and for the first keys of a
    /// multi-key sequence.
    pub fn dispatch(&mut self, mode: KeybindingMode, event: KeyEvent) -> Option<Action> {
        self.bindings
            .get_mut(&mode)
            .and_then(|kb| kb.dispatch(event).copied())
    }

    /// Drop half-typed sequences. Called on every mode change.
    pub fn reset_sequences(&mut self) {
        self.bindings.values_mut().for_each(Keybinds::reset);
    }

    fn bind(
        &mut self,
        mode: KeybindingMode,
        keys: &str,
        action: Action,
    ) -> Result<(), keybinds::Error> {
        self.bindings.entry(mode).or_default().bind(keys, action)
    }

    /// Actions bound in `mode` with their display keys, ordered by help
    /// category and then by description.
    pub fn help_entries(&self, mode: KeybindingMode) -> Vec<(Action, Vec<String>)> {
        let mut grouped: BTreeMap<(&'static str, &'static str), (Action, Vec<String>)> =
            BTreeMap::new();

        for bind in self.bindings.get(&mode).map(Keybinds::as_slice).unwrap_or(&[]) {
            let action = bind.action;
            grouped
                .entry((action.category(), action.description()))
                .or_insert_with(|| (action, Vec::new()))
                .1
                .push(describe_seq(&bind.seq));
        }

        grouped.into_values().collect()
    }

    /// Layer user bindings over the current ones. Returns the key strings
    /// that could not be parsed.
    fn apply(&mut self, config: &KeybindingsConfig) -> Vec<String> {
        let mut rejected = Vec::new();
        for (mode, keys) in &config.0 {
            for (key, action) in keys {
                if let Err(err) = self.bind(*mode, key, *action) {
                    warn!(?mode, key = %key, error = %err, "ignoring invalid keybinding");
                    rejected.push(key.clone());
                }
            }
        }
        rejected
    }
}

fn describe_seq(seq: &KeySeq) -> String {
    seq.as_slice()
        .iter()
        .map(describe_input)
        .collect::<Vec<_>>()
        .join(" ")
}

/// `C-A-S-x` style: modifiers first, then the key.
fn describe_input(input: &KeyInput) -> String {
    let mods = input.mods();
    let mut out = String::new();
    for (flag, label) in [(Mods::CTRL, "C-"), (Mods::ALT, "A-"), (Mods::SHIFT, "S-")] {
        if mods.contains(flag) {
            out.push_str(label);
        }
    }
    out.push_str(&describe_key(input.key()));
    out
}

fn describe_key(key: Key) -> String {
    let name = match key {
        Key::Char(' ') => "Spc",
        Key::Char(c) => return c.to_string(),
        Key::Enter => "Ret",
        Key::Esc => "Esc",
        Key::Tab => "Tab",
        Key::Backspace => "BS",
        Key::Delete => "Del",
        Key::Up => "↑",
        Key::Down => "↓",
        Key::Left => "←",
        Key::Right => "→",
        Key::PageUp => "PgU",
        Key::PageDown => "PgD",
        Key::Home => "Home",
        Key::End => "End",
        _ => "?",
    };
    name.to_string()
}

/// The `[keybindings]` config table: mode, then key string, then action.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeybindingsConfig(pub HashMap<KeybindingMode, HashMap<String, Action>>);

impl KeybindingsConfig {
    /// Defaults with the user's bindings layered on top.
    pub fn to_keybindings(&self) -> Keybindings {
        let mut keybindings = Keybindings::default();
        keybindings.apply(self);
        keybindings
    }
}
