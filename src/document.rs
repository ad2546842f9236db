use crate::{Field, FieldShapeError, SerdeDocument, SerdeField, SerdeForm};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
pub struct Document {
    pub forms: Vec<Form>,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
pub struct Form {
    pub form_name: String,
    pub fields: Vec<Field>,
}

/// Why a document was rejected. Positions are 1-indexed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GenerateError {
    #[error("Invalid JSON format.")]
    InvalidJson,

    #[error("JSON must have a 'forms' array.")]
    MissingForms,

    #[error("Form {form}: must have a string 'formName'.")]
    MissingFormName { form: usize },

    #[error("Form {form}: must have a 'fields' array.")]
    MissingFields { form: usize },

    #[error("Form {form}, Field {field}: {error}")]
    Field {
        form: usize,
        field: usize,
        error: FieldShapeError,
    },
}

impl Document {
    /// Parses and checks a whole document. The first problem found anywhere
    /// rejects the document; nothing is accepted partially.
    ///
    /// ```
    /// let err = jform::Document::parse(r#"{ "forms": [{ "formName": "F" }] }"#).unwrap_err();
    /// assert_eq!("Form 1: must have a 'fields' array.", err.to_string());
    /// ```
    pub fn parse(text: &str) -> Result<Self, GenerateError> {
        let value: Value = serde_json::from_str(text).map_err(|_| GenerateError::InvalidJson)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, GenerateError> {
        let document: SerdeDocument = raw(value)?;
        let forms = match document.forms {
            Some(Value::Array(forms)) => forms,
            _ => return Err(GenerateError::MissingForms),
        };

        let mut out = Vec::with_capacity(forms.len());
        for (i, form) in forms.into_iter().enumerate() {
            out.push(Form::from_serde_form(raw(form)?, i + 1)?);
        }

        Ok(Self { forms: out })
    }

    pub fn form(&self, form_name: &str) -> Option<&Form> {
        self.forms.iter().find(|form| form.form_name == form_name)
    }
}

impl Form {
    fn from_serde_form(form: SerdeForm, position: usize) -> Result<Self, GenerateError> {
        let form_name = match form.form_name {
            Some(Value::String(ref name)) if !name.is_empty() => name.clone(),
            _ => return Err(GenerateError::MissingFormName { form: position }),
        };

        let fields = match form.fields {
            Some(Value::Array(fields)) => fields,
            _ => return Err(GenerateError::MissingFields { form: position }),
        };

        let mut out = Vec::with_capacity(fields.len());
        for (j, field) in fields.into_iter().enumerate() {
            let field: SerdeField = raw(field)?;
            out.push(
                Field::from_serde_field(field).map_err(|error| GenerateError::Field {
                    form: position,
                    field: j + 1,
                    error,
                })?,
            );
        }

        Ok(Self { form_name, fields: out })
    }

    /// The first field with the given name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Field names used by more than one field. Values and errors are keyed
    /// by name, so such fields share one slot.
    pub fn duplicate_names(&self) -> BTreeSet<&str> {
        let mut seen = BTreeSet::new();
        self.fields
            .iter()
            .map(|field| field.name.as_str())
            .filter(|name| !seen.insert(*name))
            .collect()
    }
}

// A null anywhere the editor expects an object cannot be read at all, and
// is reported like unparseable text. Other non-objects read as empty.
fn raw<T: DeserializeOwned + Default>(value: Value) -> Result<T, GenerateError> {
    match value {
        Value::Null => Err(GenerateError::InvalidJson),
        Value::Object(_) => serde_json::from_value(value).map_err(|_| GenerateError::InvalidJson),
        _ => Ok(T::default()),
    }
}
