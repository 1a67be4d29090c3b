//! Everything a key can be bound to.
//!
//! Names are the config spelling (`"Next"`, `"FollowLink"`); the help popup
//! text and grouping live next to each variant.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumMessage, EnumProperty, EnumString};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
    EnumMessage,
    EnumProperty,
)]
#[serde(rename_all = "PascalCase")]
#[strum(serialize_all = "PascalCase")]
pub enum Action {
    #[strum(message = "Next heading / scroll down", props(group = "Navigation"))]
    Next,
    #[strum(message = "Previous heading / scroll up", props(group = "Navigation"))]
    Previous,
    #[strum(message = "First heading / top of page", props(group = "Navigation"))]
    First,
    #[strum(message = "Last heading / bottom of page", props(group = "Navigation"))]
    Last,
    #[strum(message = "Half page down", props(group = "Navigation"))]
    PageDown,
    #[strum(message = "Half page up", props(group = "Navigation"))]
    PageUp,

    #[strum(message = "Scroll to the selected heading", props(group = "Outline"))]
    JumpToHeading,
    #[strum(message = "Switch focus (outline/content)", props(group = "Outline"))]
    ToggleFocus,
    #[strum(message = "Show or hide the outline", props(group = "Outline"))]
    ToggleOutline,
    #[strum(message = "Wider outline", props(group = "Outline"))]
    OutlineWidthIncrease,
    #[strum(message = "Narrower outline", props(group = "Outline"))]
    OutlineWidthDecrease,

    #[strum(message = "Pick a link on the page", props(group = "Links"))]
    EnterLinkFollowMode,
    #[strum(message = "Next link", props(group = "Links"))]
    NextLink,
    #[strum(message = "Previous link", props(group = "Links"))]
    PreviousLink,
    #[strum(message = "Open the selected link", props(group = "Links"))]
    FollowLink,
    #[strum(message = "Leave the current mode", props(group = "Links"))]
    ExitMode,

    #[strum(message = "Back to the previous page", props(group = "Pages"))]
    GoBack,
    #[strum(message = "Fetch the page again", props(group = "Pages"))]
    Reload,

    #[strum(message = "Keyboard shortcuts", props(group = "View"))]
    ToggleHelp,
    #[strum(message = "Next theme", props(group = "View"))]
    CycleTheme,
    #[strum(message = "Scroll help down", props(group = "View"))]
    HelpScrollDown,
    #[strum(message = "Scroll help up", props(group = "View"))]
    HelpScrollUp,

    #[strum(message = "Quit", props(group = "Application"))]
    Quit,
}

impl Action {
    /// One-line help text.
    pub fn description(&self) -> &'static str {
        self.get_message().unwrap_or_default()
    }

    /// Help popup group.
    pub fn category(&self) -> &'static str {
        self.get_str("group").unwrap_or("Other")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_names_roundtrip() {
        for action in Action::iter() {
            assert_eq!(Action::from_str(&action.to_string()).unwrap(), action);
        }
    }

    #[test]
    fn test_every_action_is_described() {
        for action in Action::iter() {
            assert!(!action.description().is_empty(), "{action} has no message");
            assert_ne!(action.category(), "Other", "{action} has no group");
        }
    }

    #[test]
    fn test_config_spelling() {
        let action: Action = toml::Value::String("FollowLink".into()).try_into().unwrap();
        assert_eq!(action, Action::FollowLink);
    }
}
