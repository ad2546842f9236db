use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A JSON representation of a form field, compatible with `serde_json`.
///
/// Every attribute is kept as raw JSON so that malformed definitions can be
/// reported precisely. An attribute that is present but `null` deserializes
/// as `Some(Value::Null)`, not `None`.
///
/// To check and convert this into a [`Field`][`crate::Field`], see
/// [`Field::from_serde_field`][`crate::Field::from_serde_field`].
///
/// ```
/// use jform::SerdeField;
/// use serde_json::json;
///
/// let field: SerdeField = serde_json::from_value(json!({
///     "type": "text",
///     "minLength": null,
/// }))
/// .unwrap();
///
/// assert_eq!(Some(json!("text")), field.type_);
/// assert_eq!(Some(json!(null)), field.min_length);
/// assert_eq!(None, field.max_length);
/// ```
#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SerdeField {
    #[serde(rename = "type")]
    #[serde(default, deserialize_with = "present")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_: Option<Value>,

    #[serde(default, deserialize_with = "present")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<Value>,

    #[serde(default, deserialize_with = "present")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Value>,

    #[serde(default, deserialize_with = "present")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Value>,

    #[serde(default, deserialize_with = "present")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Value>,

    #[serde(default, deserialize_with = "present")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<Value>,

    #[serde(default, deserialize_with = "present")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<Value>,

    #[serde(default, deserialize_with = "present")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,

    #[serde(default, deserialize_with = "present")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<Value>,

    #[serde(default, deserialize_with = "present")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<Value>,

    #[serde(default, deserialize_with = "present")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<Value>,

    #[serde(default, deserialize_with = "present")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<Value>,

    #[serde(default, deserialize_with = "present")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Value>,

    #[serde(default, deserialize_with = "present")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_extensions: Option<Value>,
}

#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SerdeForm {
    #[serde(default, deserialize_with = "present")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form_name: Option<Value>,

    #[serde(default, deserialize_with = "present")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Value>,
}

#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct SerdeDocument {
    #[serde(default, deserialize_with = "present")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forms: Option<Value>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    #[test]
    fn serialize_partial() {
        // Absent attributes are not serialized; present nulls are.
        assert_eq!(
            "{\"type\":\"text\",\"value\":null}",
            serde_json::to_string(&super::SerdeField {
                type_: Some(json!("text")),
                value: Some(json!(null)),
                ..Default::default()
            })
            .unwrap()
        );
    }

    #[test]
    fn parse_empty() {
        assert_eq!(
            super::SerdeField::default(),
            serde_json::from_value(json!({})).unwrap()
        );
    }

    #[test]
    fn parse_tolerates_unknown_attributes() {
        assert_eq!(
            super::SerdeField {
                name: Some(json!("bio")),
                ..Default::default()
            },
            serde_json::from_value(json!({ "name": "bio", "rows": 4 })).unwrap()
        );
    }

    #[test]
    fn parse_full() {
        assert_eq!(
            super::SerdeField {
                type_: Some(json!("file")),
                label: Some(json!("Resume")),
                name: Some(json!("resume")),
                required: Some(json!(true)),
                description: Some(json!("PDF only")),
                placeholder: Some(json!("Choose file")),
                disabled: Some(json!(false)),
                value: Some(json!(null)),
                min_length: Some(json!(1)),
                max_length: Some(json!(2)),
                min: Some(json!(3)),
                max: Some(json!(4)),
                items: Some(json!([])),
                allowed_extensions: Some(json!(["pdf"])),
            },
            serde_json::from_value(json!({
                "type": "file",
                "label": "Resume",
                "name": "resume",
                "required": true,
                "description": "PDF only",
                "placeholder": "Choose file",
                "disabled": false,
                "value": null,
                "minLength": 1,
                "maxLength": 2,
                "min": 3,
                "max": 4,
                "items": [],
                "allowedExtensions": ["pdf"],
            }))
            .unwrap()
        );
    }

    #[test]
    fn parse_form_and_document() {
        let document: super::SerdeDocument = serde_json::from_value(json!({
            "forms": [{ "formName": "F", "fields": [] }],
        }))
        .unwrap();

        let forms = document.forms.unwrap();
        let form: super::SerdeForm = serde_json::from_value(forms[0].clone()).unwrap();

        assert_eq!(Some(json!("F")), form.form_name);
        assert_eq!(Some(json!([])), form.fields);
    }
}
