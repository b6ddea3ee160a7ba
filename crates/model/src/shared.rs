use serde::{Deserialize, Serialize};

/// One member of a shared-controls group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedControlName {
    pub control_name: String,
}

/// A group of controls drawing from the same pool of dataset fields: a
/// field consumed by one member disappears from the lists offered to the
/// others. Registered by the host once per group at form-build time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedControlsGroup {
    pub id: String,
    pub control_names: Vec<SharedControlName>,
}

impl SharedControlsGroup {
    pub fn new(id: impl Into<String>, names: &[&str]) -> Self {
        SharedControlsGroup {
            id: id.into(),
            control_names: names
                .iter()
                .map(|name| SharedControlName {
                    control_name: (*name).to_string(),
                })
                .collect(),
        }
    }

    pub fn contains(&self, control_name: &str) -> bool {
        self.control_names
            .iter()
            .any(|entry| entry.control_name == control_name)
    }
}
