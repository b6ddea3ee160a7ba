use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Per-field annotations carried by dataset metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measure: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modeling_role: Option<String>,
}

/// One column of a dataset schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default)]
    pub metadata: FieldMetadata,
}

/// One schema of the dataset metadata. `name` may be empty or shared with
/// other schemas; identifiers are de-duplicated at read time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub fields: Vec<Field>,
}

/// Reference to a dataset field: either a bare name (optionally
/// `schema.field` qualified) or an explicit `{link_ref, field_name}` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldRef {
    Name(String),
    Link { link_ref: String, field_name: String },
}

impl FieldRef {
    /// Reads a field reference out of a property value. Strings become bare
    /// names; objects must carry `link_ref` and `field_name`.
    pub fn from_value(value: &Value) -> Option<FieldRef> {
        serde_json::from_value(value.clone()).ok()
    }
}

/// The ordered list of schemas a form works against.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatasetMetadata {
    pub schemas: Vec<Schema>,
}

impl DatasetMetadata {
    pub fn new(schemas: Vec<Schema>) -> Self {
        DatasetMetadata { schemas }
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.iter().all(|s| s.fields.is_empty())
    }

    /// De-duplicated schema identifiers, index-aligned with `schemas`.
    ///
    /// An empty or absent schema name becomes the schema's index; a name
    /// shared with another schema gets the index suffixed.
    pub fn schema_names(&self) -> Vec<String> {
        self.schemas
            .iter()
            .enumerate()
            .map(|(idx, schema)| {
                let base = schema.name.as_deref().unwrap_or("");
                if base.is_empty() {
                    idx.to_string()
                } else if self
                    .schemas
                    .iter()
                    .enumerate()
                    .any(|(other, s)| other != idx && s.name.as_deref() == Some(base))
                {
                    format!("{}_{}", base, idx)
                } else {
                    base.to_string()
                }
            })
            .collect()
    }

    fn schema_index(&self, ident: &str) -> Option<usize> {
        self.schema_names()
            .iter()
            .position(|name| name == ident)
            .or_else(|| {
                self.schemas
                    .iter()
                    .position(|s| s.name.as_deref() == Some(ident))
            })
    }

    /// Resolves a field reference to its metadata record. Qualified names
    /// search only the matching schema; bare names search all schemas in
    /// order. Returns `None` when nothing matches.
    pub fn find_field(&self, fref: &FieldRef) -> Option<&Field> {
        match fref {
            FieldRef::Link {
                link_ref,
                field_name,
            } => {
                let idx = self.schema_index(link_ref)?;
                self.schemas[idx].fields.iter().find(|f| f.name == *field_name)
            }
            FieldRef::Name(name) => {
                if let Some((prefix, rest)) = name.split_once('.') {
                    if let Some(idx) = self.schema_index(prefix) {
                        return self.schemas[idx].fields.iter().find(|f| f.name == rest);
                    }
                }
                self.schemas
                    .iter()
                    .flat_map(|s| s.fields.iter())
                    .find(|f| f.name == *name)
            }
        }
    }

    pub fn contains_field(&self, name: &str) -> bool {
        self.find_field(&FieldRef::Name(name.to_string())).is_some()
    }

    /// Every field name across all schemas, in schema order.
    pub fn field_names(&self) -> Vec<String> {
        self.schemas
            .iter()
            .flat_map(|s| s.fields.iter().map(|f| f.name.clone()))
            .collect()
    }

    /// Keeps only the fields the predicate accepts. The predicate receives
    /// the owning schema's de-duplicated identifier and the field.
    pub fn retain_fields<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str, &Field) -> bool,
    {
        let idents = self.schema_names();
        for (schema, ident) in self.schemas.iter_mut().zip(idents) {
            schema.fields.retain(|field| keep(&ident, field));
        }
    }
}
