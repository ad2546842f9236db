use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
pub enum FieldKind {
    Text,
    Email,
    Number,
    Radio,
    Checkbox,
    Date,
    Select,
    File,
    Textarea,
    Password,
}

impl FieldKind {
    pub const ALL: [FieldKind; 10] = [
        FieldKind::Text,
        FieldKind::Email,
        FieldKind::Number,
        FieldKind::Radio,
        FieldKind::Checkbox,
        FieldKind::Date,
        FieldKind::Select,
        FieldKind::File,
        FieldKind::Textarea,
        FieldKind::Password,
    ];

    /// The wire tag used in the `type` attribute.
    pub fn tag(self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Email => "email",
            FieldKind::Number => "number",
            FieldKind::Radio => "radio",
            FieldKind::Checkbox => "checkbox",
            FieldKind::Date => "date",
            FieldKind::Select => "select",
            FieldKind::File => "file",
            FieldKind::Textarea => "textarea",
            FieldKind::Password => "password",
        }
    }

    /// The rule set for this kind. Both the shape checks in
    /// [`Field::from_serde_field`][`crate::Field::from_serde_field`] and the
    /// value checks in [`validate_value`][`crate::validate_value`] read from
    /// here, so a new kind only needs a new row.
    pub fn rules(self) -> KindRules {
        match self {
            FieldKind::Text | FieldKind::Password => KindRules {
                value: ValueShape::String,
                length_bounds: true,
                length_attributes: true,
                ..KindRules::BASE
            },
            FieldKind::Textarea => KindRules {
                value: ValueShape::String,
                length_bounds: true,
                ..KindRules::BASE
            },
            FieldKind::Email => KindRules {
                value: ValueShape::String,
                length_bounds: true,
                length_attributes: true,
                email_pattern: true,
                ..KindRules::BASE
            },
            FieldKind::Number => KindRules {
                value: ValueShape::NumberOrString,
                numeric_bounds: true,
                ..KindRules::BASE
            },
            FieldKind::Radio | FieldKind::Select => KindRules {
                items_required: true,
                required: RequiredRule::SelectOne,
                ..KindRules::BASE
            },
            FieldKind::Checkbox => KindRules {
                value: ValueShape::Array,
                items_required: true,
                empty: EmptyRule::NoSelection,
                required: RequiredRule::SelectAtLeastOne,
                default: DefaultValue::EmptySelection,
                ..KindRules::BASE
            },
            FieldKind::Date => KindRules {
                value: ValueShape::String,
                ..KindRules::BASE
            },
            FieldKind::File => KindRules {
                extensions_required: true,
                empty: EmptyRule::NoFile,
                required: RequiredRule::UploadFile,
                default: DefaultValue::Null,
                ..KindRules::BASE
            },
        }
    }
}

impl FromStr for FieldKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "email" => Ok(Self::Email),
            "number" => Ok(Self::Number),
            "radio" => Ok(Self::Radio),
            "checkbox" => Ok(Self::Checkbox),
            "date" => Ok(Self::Date),
            "select" => Ok(Self::Select),
            "file" => Ok(Self::File),
            "textarea" => Ok(Self::Textarea),
            "password" => Ok(Self::Password),
            _ => Err(()),
        }
    }
}

// Capitalised name, as used in shape messages ("Text field 'value' ...").
impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FieldKind::Text => "Text",
            FieldKind::Email => "Email",
            FieldKind::Number => "Number",
            FieldKind::Radio => "Radio",
            FieldKind::Checkbox => "Checkbox",
            FieldKind::Date => "Date",
            FieldKind::Select => "Select",
            FieldKind::File => "File",
            FieldKind::Textarea => "Textarea",
            FieldKind::Password => "Password",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KindRules {
    pub value: ValueShape,
    pub items_required: bool,
    pub extensions_required: bool,
    /// `minLength`/`maxLength` are checked against string values.
    pub length_bounds: bool,
    /// `minLength`/`maxLength` must be numbers in a field definition.
    pub length_attributes: bool,
    pub numeric_bounds: bool,
    pub email_pattern: bool,
    pub empty: EmptyRule,
    pub required: RequiredRule,
    pub default: DefaultValue,
}

impl KindRules {
    const BASE: KindRules = KindRules {
        value: ValueShape::Any,
        items_required: false,
        extensions_required: false,
        length_bounds: false,
        length_attributes: false,
        numeric_bounds: false,
        email_pattern: false,
        empty: EmptyRule::Blank,
        required: RequiredRule::Generic,
        default: DefaultValue::EmptyText,
    };
}

/// What the `value` attribute of a field definition must look like.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueShape {
    Any,
    String,
    NumberOrString,
    Array,
}

/// When a current value counts as missing for the `required` check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmptyRule {
    /// Null, or a whitespace-only string.
    Blank,
    /// Null, or an empty selection.
    NoSelection,
    /// No file chosen.
    NoFile,
}

/// Which message the kind's own emptiness check reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequiredRule {
    Generic,
    SelectAtLeastOne,
    SelectOne,
    UploadFile,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DefaultValue {
    EmptyText,
    EmptySelection,
    Null,
}
