use crate::{DefaultValue, EmptyRule, Field};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The current value of one field, as held while a form is being edited.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Text(String),
    Number(f64),
    Selection(Vec<String>),
    File(FileHandle),
}

/// An uploaded file. Only its name takes part in validation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
pub struct FileHandle {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl FileHandle {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size: None,
        }
    }

    /// Lowercased text after the last `.`, or the whole name if it has none.
    pub fn extension(&self) -> String {
        extension_of(&self.name)
    }
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Null
    }
}

impl FieldValue {
    /// The value a field starts with when its form is generated: the
    /// field's own `value` if it supplied one, else the default for its kind.
    pub fn initial(field: &Field) -> Self {
        match &field.value {
            Some(value) if *value != FieldValue::Null => value.clone(),
            _ => match field.kind.rules().default {
                DefaultValue::EmptyText => FieldValue::Text(String::new()),
                DefaultValue::EmptySelection => FieldValue::Selection(vec![]),
                DefaultValue::Null => FieldValue::Null,
            },
        }
    }

    pub fn is_empty(&self, rule: EmptyRule) -> bool {
        match (self, rule) {
            (FieldValue::Null, _) => true,
            (FieldValue::Selection(items), EmptyRule::NoSelection) => items.is_empty(),
            (FieldValue::Text(s), EmptyRule::Blank) | (FieldValue::Text(s), EmptyRule::NoFile) => {
                s.trim().is_empty()
            }
            _ => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The name of the chosen file. A plain string stands in for a file name.
    pub fn file_name(&self) -> Option<&str> {
        match self {
            FieldValue::File(file) => Some(&file.name),
            FieldValue::Text(s) if !s.is_empty() => Some(s),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Null => Value::Null,
            FieldValue::Text(s) => Value::String(s.clone()),
            FieldValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            FieldValue::Selection(items) => {
                Value::Array(items.iter().cloned().map(Value::String).collect())
            }
            FieldValue::File(file) => serde_json::to_value(file).unwrap_or(Value::Null),
        }
    }
}

// Lenient conversion used for values supplied in a schema document, where
// the shape has only been checked loosely.
impl From<&Value> for FieldValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => FieldValue::Null,
            Value::String(s) => FieldValue::Text(s.clone()),
            Value::Number(n) => n.as_f64().map(FieldValue::Number).unwrap_or_default(),
            Value::Bool(_) => FieldValue::Text(display_value(value)),
            Value::Array(items) => FieldValue::Selection(items.iter().map(display_value).collect()),
            Value::Object(_) => serde_json::from_value(value.clone())
                .map(FieldValue::File)
                .unwrap_or_default(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(items: Vec<String>) -> Self {
        FieldValue::Selection(items)
    }
}

impl From<FileHandle> for FieldValue {
    fn from(file: FileHandle) -> Self {
        FieldValue::File(file)
    }
}

pub(crate) fn extension_of(file_name: &str) -> String {
    file_name
        .rsplit('.')
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

/// Whether a schema attribute counts as set: `null`, `false`, `0` and `""`
/// do not.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|n| n != 0.0 && !n.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Renders a schema attribute as text for labels and messages.
pub(crate) fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_owned(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n
            .as_f64()
            .map(display_number)
            .unwrap_or_else(|| n.to_string()),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                _ => display_value(item),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_owned(),
    }
}

// Very large and very small magnitudes switch to exponent form ("1e+21").
fn display_number(n: f64) -> String {
    let magnitude = n.abs();
    if magnitude >= 1e21 || (magnitude != 0.0 && magnitude < 1e-6) {
        let exp = format!("{:e}", n);
        match exp.find('e') {
            Some(i) if !exp[i + 1..].starts_with('-') => format!("{}e+{}", &exp[..i], &exp[i + 1..]),
            _ => exp,
        }
    } else {
        n.to_string()
    }
}
