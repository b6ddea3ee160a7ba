use serde::{Deserialize, Serialize};

/// Address of one unit of editable state.
///
/// A bare `name` addresses a whole property value. `row` selects one row of
/// a list-typed property, and `col` additionally selects one cell of a
/// table-typed property. Control states and error messages use the same
/// addressing, so a single cell can carry its own state and message
/// independently of the rest of its table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertyId {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub col: Option<usize>,
}

impl PropertyId {
    /// Addresses a whole property value.
    pub fn new(name: impl Into<String>) -> Self {
        PropertyId {
            name: name.into(),
            row: None,
            col: None,
        }
    }

    /// Addresses one row of a list-typed property.
    pub fn with_row(name: impl Into<String>, row: usize) -> Self {
        PropertyId {
            name: name.into(),
            row: Some(row),
            col: None,
        }
    }

    /// Addresses one cell of a table-typed property.
    pub fn with_cell(name: impl Into<String>, row: usize, col: usize) -> Self {
        PropertyId {
            name: name.into(),
            row: Some(row),
            col: Some(col),
        }
    }

    /// The same address with row/col context stripped.
    pub fn property(&self) -> PropertyId {
        PropertyId::new(self.name.clone())
    }

    pub fn is_cell(&self) -> bool {
        self.row.is_some() && self.col.is_some()
    }

    pub fn is_row(&self) -> bool {
        self.row.is_some() && self.col.is_none()
    }
}

impl std::fmt::Display for PropertyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.row, self.col) {
            (Some(row), Some(col)) => write!(f, "{}[{}][{}]", self.name, row, col),
            (Some(row), None) => write!(f, "{}[{}]", self.name, row),
            _ => write!(f, "{}", self.name),
        }
    }
}

impl From<&str> for PropertyId {
    fn from(name: &str) -> Self {
        PropertyId::new(name)
    }
}
