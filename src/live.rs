use crate::validate::{char_len, check_bounds, coerce_number, extension_allowed, is_email, Bound};
use crate::{EmptyRule, Field, FieldKind, FieldValue};
use thiserror::Error;

/// Immediate feedback shown while a field is being edited. These are
/// lighter than [`ValueError`][`crate::ValueError`] and never block a
/// submission on their own.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum LiveError {
    #[error("This field is required.")]
    Required,

    #[error("Minimum length is {0} characters.")]
    MinLength(f64),

    #[error("Maximum length is {0} characters.")]
    MaxLength(f64),

    #[error("Please enter a valid email address.")]
    InvalidEmail,

    #[error("Minimum value is {0}.")]
    MinValue(f64),

    #[error("Maximum value is {0}.")]
    MaxValue(f64),

    #[error("At least one checkbox must be selected.")]
    NoCheckboxSelected,

    #[error("Selection is required")]
    SelectionRequired,

    #[error("Date is required")]
    DateRequired,

    #[error("File is required")]
    FileRequired,

    #[error("Allowed file types: {}", .0.join(", "))]
    DisallowedExtension(Vec<String>),
}

/// Re-checks a field after an edit, using the same predicates as
/// [`validate_value`][`crate::validate_value`]. Radio groups have no live
/// check.
pub fn check_live(field: &Field, value: &FieldValue) -> Option<LiveError> {
    let missing = |rule| field.required && value.is_empty(rule);

    match field.kind {
        FieldKind::Text | FieldKind::Email | FieldKind::Password => {
            if missing(EmptyRule::Blank) {
                return Some(LiveError::Required);
            }

            let s = value.as_text().unwrap_or_default();
            match check_bounds(char_len(s), field.min_length, field.max_length) {
                Some(Bound::Min(min)) => Some(LiveError::MinLength(min)),
                Some(Bound::Max(max)) => Some(LiveError::MaxLength(max)),
                None if field.kind.rules().email_pattern && !s.is_empty() && !is_email(s) => {
                    Some(LiveError::InvalidEmail)
                }
                None => None,
            }
        }
        FieldKind::Textarea => {
            if missing(EmptyRule::Blank) {
                Some(LiveError::Required)
            } else {
                None
            }
        }
        FieldKind::Number => {
            if missing(EmptyRule::Blank) {
                return Some(LiveError::Required);
            }

            match coerce_number(value).and_then(|n| check_bounds(n, field.min, field.max)) {
                Some(Bound::Min(min)) => Some(LiveError::MinValue(min)),
                Some(Bound::Max(max)) => Some(LiveError::MaxValue(max)),
                None => None,
            }
        }
        FieldKind::Checkbox if missing(EmptyRule::NoSelection) => {
            Some(LiveError::NoCheckboxSelected)
        }
        // Clearing a select or date is flagged even when the field is optional.
        FieldKind::Select if cleared(value) => Some(LiveError::SelectionRequired),
        FieldKind::Date if cleared(value) => Some(LiveError::DateRequired),
        FieldKind::File => {
            if missing(EmptyRule::NoFile) {
                Some(LiveError::FileRequired)
            } else if !extension_allowed(field, value) {
                Some(LiveError::DisallowedExtension(
                    field.allowed_extensions.clone(),
                ))
            } else {
                None
            }
        }
        FieldKind::Checkbox | FieldKind::Select | FieldKind::Date | FieldKind::Radio => None,
    }
}

fn cleared(value: &FieldValue) -> bool {
    match value {
        FieldValue::Null => true,
        FieldValue::Text(s) => s.is_empty(),
        _ => false,
    }
}
