use crate::value::{display_value, is_truthy};
use crate::{is_email, FieldKind, FieldValue, SerdeField, ValueShape};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
pub struct Field {
    pub kind: FieldKind,
    pub label: Option<String>,
    pub name: String,
    pub required: bool,
    pub disabled: bool,
    pub description: Option<String>,
    pub placeholder: Option<String>,
    pub min_length: Option<f64>,
    pub max_length: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub items: Vec<Item>,
    pub allowed_extensions: Vec<String>,
    pub value: Option<FieldValue>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
pub struct Item {
    pub value: String,
    pub label: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FieldShapeError {
    #[error("Each field must have a 'type'.")]
    MissingType,

    #[error("Each field must have a 'label'.")]
    MissingLabel,

    #[error("Each field must have a 'name'.")]
    MissingName,

    #[error("Unknown field type: {0}.")]
    UnknownType(String),

    #[error("{kind} field '{attribute}' must be {expected}.")]
    InvalidAttribute {
        kind: FieldKind,
        attribute: &'static str,
        expected: Expected,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Expected {
    String,
    Number,
    NumberOrString,
    Array,
    EmailAddress,
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Expected::String => "a string",
            Expected::Number => "a number",
            Expected::NumberOrString => "a number or string",
            Expected::Array => "an array",
            Expected::EmailAddress => "a valid email address",
        })
    }
}

/// Checks one raw field definition, returning the first problem found.
///
/// ```
/// use serde_json::json;
///
/// assert_eq!(None, jform::validate_field_shape(&json!({
///     "type": "date", "label": "Date of Birth", "name": "dob", "value": "",
/// })));
///
/// assert_eq!(
///     "Date field 'value' must be a string.",
///     jform::validate_field_shape(&json!({
///         "type": "date", "label": "Date of Birth", "name": "dob",
///     }))
///     .unwrap()
///     .to_string()
/// );
/// ```
pub fn validate_field_shape(field: &Value) -> Option<FieldShapeError> {
    let serde_field = match field {
        Value::Object(_) => serde_json::from_value(field.clone()).unwrap_or_default(),
        _ => SerdeField::default(),
    };

    Field::from_serde_field(serde_field).err()
}

impl Field {
    pub fn new(kind: FieldKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            label: None,
            name: name.into(),
            required: false,
            disabled: false,
            description: None,
            placeholder: None,
            min_length: None,
            max_length: None,
            min: None,
            max: None,
            items: vec![],
            allowed_extensions: vec![],
            value: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_length(mut self, min_length: Option<f64>, max_length: Option<f64>) -> Self {
        self.min_length = min_length;
        self.max_length = max_length;
        self
    }

    pub fn with_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn with_allowed_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_value(mut self, value: FieldValue) -> Self {
        self.value = Some(value);
        self
    }

    /// The name shown in value error messages: the label, or else the name.
    pub fn label_or_name(&self) -> &str {
        match &self.label {
            Some(label) if !label.is_empty() => label,
            _ => &self.name,
        }
    }

    /// Checks a raw field definition and converts it. Presence checks run
    /// first (type, then label, then name), then the shape rules for the
    /// field's kind.
    pub fn from_serde_field(field: SerdeField) -> Result<Self, FieldShapeError> {
        let type_ = match field.type_ {
            Some(ref type_) if is_truthy(type_) => type_,
            _ => return Err(FieldShapeError::MissingType),
        };

        let label = match field.label {
            Some(ref label) if is_truthy(label) => display_value(label),
            _ => return Err(FieldShapeError::MissingLabel),
        };

        let name = match field.name {
            Some(ref name) if is_truthy(name) => display_value(name),
            _ => return Err(FieldShapeError::MissingName),
        };

        let kind: FieldKind = type_
            .as_str()
            .and_then(|tag| tag.parse().ok())
            .ok_or_else(|| FieldShapeError::UnknownType(display_value(type_)))?;

        check_shape(kind, &field)?;

        Ok(Self {
            kind,
            label: Some(label),
            name,
            required: field.required.as_ref().map(is_truthy).unwrap_or(false),
            disabled: field.disabled.as_ref().map(is_truthy).unwrap_or(false),
            description: field.description.as_ref().and_then(text),
            placeholder: field.placeholder.as_ref().and_then(text),
            min_length: field.min_length.as_ref().and_then(Value::as_f64),
            max_length: field.max_length.as_ref().and_then(Value::as_f64),
            min: field.min.as_ref().and_then(Value::as_f64),
            max: field.max.as_ref().and_then(Value::as_f64),
            items: field
                .items
                .as_ref()
                .and_then(Value::as_array)
                .map(|items| items.iter().map(item).collect())
                .unwrap_or_default(),
            allowed_extensions: field
                .allowed_extensions
                .as_ref()
                .and_then(Value::as_array)
                .map(|exts| exts.iter().map(display_value).collect())
                .unwrap_or_default(),
            value: field.value.as_ref().map(FieldValue::from),
        })
    }
}

fn check_shape(kind: FieldKind, field: &SerdeField) -> Result<(), FieldShapeError> {
    let rules = kind.rules();
    let invalid = |attribute, expected| FieldShapeError::InvalidAttribute {
        kind,
        attribute,
        expected,
    };

    if rules.items_required && !is_array(&field.items) {
        return Err(invalid("items", Expected::Array));
    }

    if rules.extensions_required && !is_array(&field.allowed_extensions) {
        return Err(invalid("allowedExtensions", Expected::Array));
    }

    match rules.value {
        ValueShape::Any => {}
        ValueShape::String => {
            if !matches!(field.value, Some(Value::String(_))) {
                return Err(invalid("value", Expected::String));
            }
        }
        ValueShape::NumberOrString => {
            if !matches!(field.value, Some(Value::String(_)) | Some(Value::Number(_))) {
                return Err(invalid("value", Expected::NumberOrString));
            }
        }
        ValueShape::Array => {
            if !is_array(&field.value) {
                return Err(invalid("value", Expected::Array));
            }
        }
    }

    if rules.email_pattern {
        if let Some(Value::String(s)) = &field.value {
            if !s.is_empty() && !is_email(s) {
                return Err(invalid("value", Expected::EmailAddress));
            }
        }
    }

    let bounds = if rules.length_attributes {
        vec![
            ("minLength", &field.min_length),
            ("maxLength", &field.max_length),
        ]
    } else if rules.numeric_bounds {
        vec![("min", &field.min), ("max", &field.max)]
    } else {
        vec![]
    };

    for (attribute, bound) in bounds {
        if matches!(bound, Some(bound) if !bound.is_number()) {
            return Err(invalid(attribute, Expected::Number));
        }
    }

    Ok(())
}

fn is_array(value: &Option<Value>) -> bool {
    matches!(value, Some(Value::Array(_)))
}

fn text(value: &Value) -> Option<String> {
    value.as_str().map(str::to_owned)
}

fn item(value: &Value) -> Item {
    let attribute = |key: &str| {
        value
            .get(key)
            .filter(|v| !v.is_null())
            .map(display_value)
            .unwrap_or_default()
    };

    Item {
        value: attribute("value"),
        label: attribute("label"),
    }
}
