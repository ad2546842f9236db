use crate::{Field, FieldValue, Form, RequiredRule};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Error)]
pub enum ValueError {
    #[error("{label} is required.")]
    Required { label: String },

    #[error("{label} must be at least {min} characters.")]
    TooShort { label: String, min: f64 },

    #[error("{label} must be at most {max} characters.")]
    TooLong { label: String, max: f64 },

    #[error("{label} must be at least {min}.")]
    BelowMinimum { label: String, min: f64 },

    #[error("{label} must be at most {max}.")]
    AboveMaximum { label: String, max: f64 },

    #[error("Please enter a valid email address.")]
    InvalidEmail,

    #[error("Please select at least one option for {label}.")]
    NoOptionsSelected { label: String },

    #[error("Please select an option for {label}.")]
    NoOptionSelected { label: String },

    #[error("Please upload a file for {label}.")]
    MissingFile { label: String },

    #[error("Allowed file types: {}.", .allowed.join(", "))]
    DisallowedExtension { allowed: Vec<String> },
}

/// Checks the current value of one field, returning the error to show next
/// to it, if any.
///
/// The `required` check runs first and is the same for every kind. Then come
/// the bounds and format checks for the field's kind, which run whether or
/// not the field is required.
///
/// ```
/// use jform::{Field, FieldKind, FieldValue};
///
/// let age = Field::new(FieldKind::Number, "age")
///     .with_label("Age")
///     .with_range(Some(10.0), Some(20.0));
///
/// assert_eq!(
///     "Age must be at least 10.",
///     jform::validate_value(&age, &FieldValue::from("5")).unwrap().to_string()
/// );
/// assert_eq!(None, jform::validate_value(&age, &FieldValue::Number(15.0)));
/// ```
pub fn validate_value(field: &Field, value: &FieldValue) -> Option<ValueError> {
    let rules = field.kind.rules();
    let label = || field.label_or_name().to_owned();

    let missing = field.required && value.is_empty(rules.empty);
    if missing {
        return Some(ValueError::Required { label: label() });
    }

    if rules.length_bounds {
        if let Some(s) = value.as_text() {
            match check_bounds(char_len(s), field.min_length, field.max_length) {
                Some(Bound::Min(min)) => return Some(ValueError::TooShort { label: label(), min }),
                Some(Bound::Max(max)) => return Some(ValueError::TooLong { label: label(), max }),
                None => {}
            }

            if rules.email_pattern && !s.is_empty() && !is_email(s) {
                return Some(ValueError::InvalidEmail);
            }
        }
    }

    if rules.numeric_bounds {
        match coerce_number(value) {
            Some(n) => match check_bounds(n, field.min, field.max) {
                Some(Bound::Min(min)) => {
                    return Some(ValueError::BelowMinimum { label: label(), min })
                }
                Some(Bound::Max(max)) => {
                    return Some(ValueError::AboveMaximum { label: label(), max })
                }
                None => {}
            },
            None if field.required => return Some(ValueError::Required { label: label() }),
            None => {}
        }
    }

    // The kind's own emptiness message. The generic check above runs first
    // and reports the same condition, so this is currently shadowed.
    if missing {
        return Some(match rules.required {
            RequiredRule::Generic => ValueError::Required { label: label() },
            RequiredRule::SelectAtLeastOne => ValueError::NoOptionsSelected { label: label() },
            RequiredRule::SelectOne => ValueError::NoOptionSelected { label: label() },
            RequiredRule::UploadFile => ValueError::MissingFile { label: label() },
        });
    }

    if rules.extensions_required && !extension_allowed(field, value) {
        return Some(ValueError::DisallowedExtension {
            allowed: field.allowed_extensions.clone(),
        });
    }

    None
}

/// The outcome of validating every field of one form, keyed by field name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FormErrors {
    errors: BTreeMap<String, Option<ValueError>>,
    // Failures of earlier fields whose slot a later field of the same name
    // took over.
    shadowed: BTreeMap<String, usize>,
}

impl FormErrors {
    pub fn has_errors(&self) -> bool {
        self.failures() > 0
    }

    /// How many fields currently fail. Fields sharing a name are counted
    /// separately even though only the last one keeps a slot in the map.
    pub fn failures(&self) -> usize {
        let current = self.errors.values().filter(|err| err.is_some()).count();
        current + self.shadowed.values().sum::<usize>()
    }

    pub fn get(&self, name: &str) -> Option<&ValueError> {
        self.errors.get(name).and_then(Option::as_ref)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&ValueError>)> {
        self.errors
            .iter()
            .map(|(name, err)| (name.as_str(), err.as_ref()))
    }

    /// Drops the error for `name`, and for every field sharing it.
    pub(crate) fn clear(&mut self, name: &str) {
        self.shadowed.remove(name);
        self.errors.insert(name.to_owned(), None);
    }

    fn insert(&mut self, name: &str, err: Option<ValueError>) {
        if let Some(Some(_)) = self.errors.insert(name.to_owned(), err) {
            *self.shadowed.entry(name.to_owned()).or_default() += 1;
        }
    }
}

/// Validates every field of a form against its current value. No field
/// stops the others from being checked. Fields missing from `values` are
/// treated as null.
pub fn validate_form(form: &Form, values: &BTreeMap<String, FieldValue>) -> FormErrors {
    let mut out = FormErrors::default();

    for field in &form.fields {
        let value = values.get(&field.name).unwrap_or(&FieldValue::Null);
        out.insert(&field.name, validate_value(field, value));
    }

    out
}

pub fn is_email(s: &str) -> bool {
    static EMAIL: OnceLock<Regex> = OnceLock::new();

    EMAIL
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap())
        .is_match(s)
}

pub(crate) enum Bound {
    Min(f64),
    Max(f64),
}

pub(crate) fn check_bounds(n: f64, min: Option<f64>, max: Option<f64>) -> Option<Bound> {
    match (min, max) {
        (Some(min), _) if n < min => Some(Bound::Min(min)),
        (_, Some(max)) if n > max => Some(Bound::Max(max)),
        _ => None,
    }
}

pub(crate) fn char_len(s: &str) -> f64 {
    s.chars().count() as f64
}

/// A finite number read from a number field's value, if there is one.
pub(crate) fn coerce_number(value: &FieldValue) -> Option<f64> {
    let n = match value {
        FieldValue::Number(n) => *n,
        FieldValue::Text(s) => s.trim().parse().ok()?,
        _ => return None,
    };

    if n.is_finite() {
        Some(n)
    } else {
        None
    }
}

/// True when no file is chosen, no allow-list is set, or the file's
/// extension is on the list (ignoring case).
pub(crate) fn extension_allowed(field: &Field, value: &FieldValue) -> bool {
    let name = match value.file_name() {
        Some(name) if !field.allowed_extensions.is_empty() => name,
        _ => return true,
    };

    let ext = crate::value::extension_of(name);
    field
        .allowed_extensions
        .iter()
        .any(|allowed| allowed.to_lowercase() == ext)
}
