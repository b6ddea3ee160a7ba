use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::condition_decl::ConditionDecl;
use crate::control::Control;
use crate::dataset::DatasetMetadata;
use crate::error::FormError;

/// Panel kinds the engine cares about. `Summary` panels index the controls
/// they contain; everything else is layout-only and just flattened through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PanelType {
    General,
    Summary,
    ColumnSelection,
    #[serde(other)]
    Other,
}

impl Default for PanelType {
    fn default() -> Self {
        PanelType::General
    }
}

/// A grouping of items in the form layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Panel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub panel_type: PanelType,
    #[serde(default)]
    pub ui_items: Vec<UiItem>,
}

/// One node of the form layout tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "itemType", rename_all = "camelCase")]
pub enum UiItem {
    Control { control: Control },
    Panel { panel: Panel },
}

/// The data section of a form document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormData {
    #[serde(default)]
    pub dataset_metadata: DatasetMetadata,
    #[serde(default)]
    pub current_parameters: Map<String, Value>,
}

/// A complete form document: layout, initial data, and the declarative
/// conditions that drive visibility, enablement, validation, and filtering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Form {
    #[serde(default)]
    pub conditions: Vec<ConditionDecl>,
    #[serde(default)]
    pub data: FormData,
    #[serde(default)]
    pub ui_items: Vec<UiItem>,
}

impl Form {
    pub fn from_value(value: Value) -> Result<Form, FormError> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn from_json_str(json: &str) -> Result<Form, FormError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Walks the layout tree and returns every control in document order,
    /// assigning `column_index` to table sub-controls. The second return is
    /// the summary-panel index: panel id to the names of the controls it
    /// contains.
    pub fn flatten_controls(&self) -> (Vec<Control>, Vec<(String, Vec<String>)>) {
        let mut controls = Vec::new();
        let mut summary_panels = Vec::new();
        flatten_items(&self.ui_items, None, &mut controls, &mut summary_panels);
        (controls, summary_panels)
    }
}

fn flatten_items(
    items: &[UiItem],
    summary: Option<usize>,
    controls: &mut Vec<Control>,
    summary_panels: &mut Vec<(String, Vec<String>)>,
) {
    for item in items {
        match item {
            UiItem::Control { control } => {
                let mut control = control.clone();
                for (idx, sub) in control.sub_controls.iter_mut().enumerate() {
                    sub.column_index = Some(idx);
                }
                if let Some(panel_idx) = summary {
                    summary_panels[panel_idx].1.push(control.name.clone());
                }
                controls.push(control);
            }
            UiItem::Panel { panel } => {
                let summary = if panel.panel_type == PanelType::Summary {
                    if let Some(id) = &panel.id {
                        summary_panels.push((id.clone(), Vec::new()));
                        Some(summary_panels.len() - 1)
                    } else {
                        summary
                    }
                } else {
                    summary
                };
                flatten_items(&panel.ui_items, summary, controls, summary_panels);
            }
        }
    }
}
