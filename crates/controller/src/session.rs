//! Per-form state: the flattened control list and the compiled conditions.
//!
//! A session is built whole by `set_form` and swapped in atomically, so no
//! caller can observe a half-reconfigured controller.

use std::collections::HashMap;

use propeller_conditions::CompiledConditions;
use propeller_model::{Control, ControlType, PropertyId};

#[derive(Debug, Default)]
pub struct FormSession {
    controls: Vec<Control>,
    index: HashMap<String, usize>,
    pub compiled: CompiledConditions,
}

impl FormSession {
    pub fn new(controls: Vec<Control>, compiled: CompiledConditions) -> Self {
        let index = controls
            .iter()
            .enumerate()
            .map(|(idx, control)| (control.name.clone(), idx))
            .collect();
        FormSession {
            controls,
            index,
            compiled,
        }
    }

    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    pub fn control_by_name(&self, name: &str) -> Option<&Control> {
        self.index.get(name).map(|idx| &self.controls[*idx])
    }

    /// The control an id addresses: the sub-control at `col` for table
    /// cells, otherwise the named control itself.
    pub fn control(&self, id: &PropertyId) -> Option<&Control> {
        self.control_at(&id.name, id.col)
    }

    pub fn control_at(&self, name: &str, col: Option<usize>) -> Option<&Control> {
        let control = self.control_by_name(name)?;
        match col {
            Some(col) if !control.sub_controls.is_empty() => control.sub_controls.get(col),
            _ => Some(control),
        }
    }

    pub fn control_type(&self, id: &PropertyId) -> Option<ControlType> {
        self.control(id).map(|control| control.control_type)
    }

    /// Registers a control synthesized at runtime (custom panels). A
    /// control with an already-known name replaces the original.
    pub fn add_control(&mut self, control: Control) {
        match self.index.get(&control.name) {
            Some(idx) => self.controls[*idx] = control,
            None => {
                self.index.insert(control.name.clone(), self.controls.len());
                if control.required && !self.compiled.required.contains(&control.name) {
                    self.compiled.required.push(control.name.clone());
                }
                self.controls.push(control);
            }
        }
    }
}
