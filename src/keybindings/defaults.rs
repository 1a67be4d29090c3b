//! Built-in key maps, in `keybinds` key string syntax.

use super::{Action, KeybindingMode, Keybindings};
use Action::*;

const NORMAL: &[(&str, Action)] = &[
    ("j", Next),
    ("Down", Next),
    ("k", Previous),
    ("Up", Previous),
    ("g g", First),
    ("Home", First),
    ("G", Last),
    ("End", Last),
    ("d", PageDown),
    ("PageDown", PageDown),
    ("u", PageUp),
    ("PageUp", PageUp),
    ("Enter", JumpToHeading),
    ("Space", JumpToHeading),
    ("Tab", ToggleFocus),
    ("w", ToggleOutline),
    ("[", OutlineWidthDecrease),
    ("]", OutlineWidthIncrease),
    ("f", EnterLinkFollowMode),
    ("b", GoBack),
    ("Backspace", GoBack),
    ("r", Reload),
    ("t", CycleTheme),
    ("?", ToggleHelp),
    ("q", Quit),
    ("Ctrl+c", Quit),
];

const HELP: &[(&str, Action)] = &[
    ("j", HelpScrollDown),
    ("Down", HelpScrollDown),
    ("k", HelpScrollUp),
    ("Up", HelpScrollUp),
    ("?", ToggleHelp),
    ("Escape", ExitMode),
    ("q", ExitMode),
    ("Ctrl+c", Quit),
];

const LINK_FOLLOW: &[(&str, Action)] = &[
    ("j", NextLink),
    ("Down", NextLink),
    ("Tab", NextLink),
    ("k", PreviousLink),
    ("Up", PreviousLink),
    ("Shift+Tab", PreviousLink),
    ("Enter", FollowLink),
    ("Escape", ExitMode),
    ("f", ExitMode),
    ("Ctrl+c", Quit),
];

pub fn default_keybindings() -> Keybindings {
    let mut kb = Keybindings::empty();
    for (mode, table) in [
        (KeybindingMode::Normal, NORMAL),
        (KeybindingMode::Help, HELP),
        (KeybindingMode::LinkFollow, LINK_FOLLOW),
    ] {
        for &(keys, action) in table {
            if let Err(err) = kb.bind(mode, keys, action) {
                tracing::error!(?mode, keys, error = %err, "invalid built-in keybinding");
            }
        }
    }
    kb
}
