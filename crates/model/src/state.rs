use serde::{Deserialize, Serialize};

/// State of one control (or row/cell of a table control).
///
/// An absent entry means visible and enabled; the store only records
/// departures from that default plus explicit restorations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlState {
    Visible,
    Hidden,
    Enabled,
    Disabled,
}

impl ControlState {
    /// True when a value at this address should be withheld from
    /// filtered reads.
    pub fn suppresses_value(&self) -> bool {
        matches!(self, ControlState::Hidden | ControlState::Disabled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ControlState::Visible => "visible",
            ControlState::Hidden => "hidden",
            ControlState::Enabled => "enabled",
            ControlState::Disabled => "disabled",
        }
    }
}

impl std::fmt::Display for ControlState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
