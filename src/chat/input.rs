//! Input-side helpers: quick-action presets and key handling.

use serde::{Deserialize, Serialize};

/// Preset prompts shown under the input field. Choosing one fills the input
/// but does not send it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuickAction {
    ResearchCapabilities,
    DataAnalysis,
    FactCheck,
}

impl QuickAction {
    pub const ALL: [QuickAction; 3] = [QuickAction::ResearchCapabilities, QuickAction::DataAnalysis, QuickAction::FactCheck];

    /// Button label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            QuickAction::ResearchCapabilities => "Research capabilities",
            QuickAction::DataAnalysis => "Data analysis",
            QuickAction::FactCheck => "Fact-check",
        }
    }

    /// Text placed in the input field.
    #[must_use]
    pub fn prompt(self) -> &'static str {
        match self {
            QuickAction::ResearchCapabilities => "What research capabilities do you have?",
            QuickAction::DataAnalysis => "Help me analyze this data",
            QuickAction::FactCheck => "Fact-check this information",
        }
    }

    /// Wire key, e.g. `"data_analysis"`.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            QuickAction::ResearchCapabilities => "research_capabilities",
            QuickAction::DataAnalysis => "data_analysis",
            QuickAction::FactCheck => "fact_check",
        }
    }

    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.key() == key)
    }
}

/// A key event from the input field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct KeyPress {
    pub key: String,
    #[serde(default)]
    pub shift: bool,
}

impl KeyPress {
    /// Enter without shift sends; shift+Enter is left to the host toolkit.
    #[must_use]
    pub fn is_submit(&self) -> bool {
        self.key == "Enter" && !self.shift
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quick_action_keys_round_trip() {
        for action in QuickAction::ALL {
            assert_eq!(QuickAction::from_key(action.key()), Some(action));
        }
        assert_eq!(QuickAction::from_key("nope"), None);
    }

    #[test]
    fn quick_action_serde_matches_key() {
        let json = serde_json::to_value(QuickAction::FactCheck).unwrap();
        assert_eq!(json, QuickAction::FactCheck.key());
    }

    #[test]
    fn only_plain_enter_submits() {
        let enter = KeyPress { key: "Enter".into(), shift: false };
        let shift_enter = KeyPress { key: "Enter".into(), shift: true };
        let other = KeyPress { key: "a".into(), shift: false };
        assert!(enter.is_submit());
        assert!(!shift_enter.is_submit());
        assert!(!other.is_submit());
    }

    #[test]
    fn key_press_shift_defaults_false() {
        let key: KeyPress = serde_json::from_str(r#"{"key":"Enter"}"#).unwrap();
        assert!(key.is_submit());
    }
}
