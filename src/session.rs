use crate::{check_live, validate_form, Document, FieldValue, FormErrors, GenerateError, LiveError};
use chrono::{DateTime, Duration, Utc};
use log::{debug, warn};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

pub struct SessionOptions {
    notice_duration: Duration,
    live_validation: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            notice_duration: Duration::milliseconds(3000),
            live_validation: true,
        }
    }
}

impl SessionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_notice_duration(mut self, notice_duration: Duration) -> Self {
        self.notice_duration = notice_duration;
        self
    }

    pub fn with_live_validation(mut self, live_validation: bool) -> Self {
        self.live_validation = live_validation;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Error)]
pub enum SessionError {
    #[error("no document has been generated")]
    NotGenerated,

    #[error("unknown form: {0}")]
    UnknownForm(String),

    #[error("form {form_name} has no field named {name}")]
    UnknownField { form_name: String, name: String },

    #[error("form {form_name} has {} invalid field(s)", .errors.failures())]
    Rejected {
        form_name: String,
        errors: FormErrors,
    },
}

/// An accepted submission.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub form_name: String,
    pub values: Map<String, Value>,
    pub submitted_at: DateTime<Utc>,
}

/// The success message shown after a submission, until it expires.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub form_name: String,
    pub expires_at: DateTime<Utc>,
}

/// Holds the generated forms and everything the user has entered into them.
///
/// Values and errors are kept per form name, then per field name.
#[derive(Default)]
pub struct FormSession {
    options: SessionOptions,
    document: Option<Document>,
    values: BTreeMap<String, BTreeMap<String, FieldValue>>,
    errors: BTreeMap<String, FormErrors>,
    notice: Option<Notice>,
}

impl FormSession {
    pub fn new(options: SessionOptions) -> Self {
        Self {
            options,
            ..Default::default()
        }
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    /// Parses and checks `text`, then replaces the current forms with it and
    /// resets every value. On error nothing changes.
    pub fn generate(&mut self, text: &str) -> Result<(), GenerateError> {
        let document = Document::parse(text)?;

        let mut values = BTreeMap::new();
        for form in &document.forms {
            for name in form.duplicate_names() {
                warn!(
                    "form {:?} has more than one field named {:?}; they share one value",
                    form.form_name, name
                );
            }

            let initial = form
                .fields
                .iter()
                .map(|field| (field.name.clone(), FieldValue::initial(field)))
                .collect();
            values.insert(form.form_name.clone(), initial);
        }

        debug!("generated {} form(s)", document.forms.len());

        self.document = Some(document);
        self.values = values;
        self.errors.clear();
        self.notice = None;
        Ok(())
    }

    /// Stores a new value for a field and clears its submit error. Returns
    /// the live feedback for the new value, if live validation is on.
    pub fn set_value(
        &mut self,
        form_name: &str,
        name: &str,
        value: FieldValue,
    ) -> Result<Option<LiveError>, SessionError> {
        let document = self.document.as_ref().ok_or(SessionError::NotGenerated)?;
        let form = document
            .form(form_name)
            .ok_or_else(|| SessionError::UnknownForm(form_name.to_owned()))?;
        let field = form.field(name).ok_or_else(|| SessionError::UnknownField {
            form_name: form_name.to_owned(),
            name: name.to_owned(),
        })?;

        let feedback = if self.options.live_validation {
            check_live(field, &value)
        } else {
            None
        };

        self.values
            .entry(form_name.to_owned())
            .or_default()
            .insert(name.to_owned(), value);
        self.errors
            .entry(form_name.to_owned())
            .or_default()
            .clear(name);

        Ok(feedback)
    }

    pub fn value(&self, form_name: &str, name: &str) -> Option<&FieldValue> {
        self.values.get(form_name)?.get(name)
    }

    /// The errors from the last submission of a form.
    pub fn errors(&self, form_name: &str) -> Option<&FormErrors> {
        self.errors.get(form_name)
    }

    pub fn error(&self, form_name: &str, name: &str) -> Option<String> {
        self.errors
            .get(form_name)?
            .get(name)
            .map(ToString::to_string)
    }

    pub fn submit(&mut self, form_name: &str) -> Result<Submission, SessionError> {
        self.submit_at(form_name, Utc::now())
    }

    /// Validates every field of one form. Any error blocks the submission
    /// and is recorded; otherwise the form's errors are cleared and a
    /// success notice is shown.
    pub fn submit_at(
        &mut self,
        form_name: &str,
        now: DateTime<Utc>,
    ) -> Result<Submission, SessionError> {
        let document = self.document.as_ref().ok_or(SessionError::NotGenerated)?;
        let form = document
            .form(form_name)
            .ok_or_else(|| SessionError::UnknownForm(form_name.to_owned()))?;

        let empty = BTreeMap::new();
        let values = self.values.get(form_name).unwrap_or(&empty);
        let errors = validate_form(form, values);

        self.errors.insert(form_name.to_owned(), errors.clone());
        if errors.has_errors() {
            debug!(
                "form {:?} rejected with {} invalid field(s)",
                form_name,
                errors.failures()
            );
            return Err(SessionError::Rejected {
                form_name: form_name.to_owned(),
                errors,
            });
        }

        let values = form
            .fields
            .iter()
            .map(|field| {
                let value = values.get(&field.name).unwrap_or(&FieldValue::Null);
                (field.name.clone(), value.to_json())
            })
            .collect();

        debug!("form {:?} submitted", form_name);
        self.notice = Some(Notice {
            form_name: form_name.to_owned(),
            expires_at: now + self.options.notice_duration,
        });

        Ok(Submission {
            form_name: form_name.to_owned(),
            values,
            submitted_at: now,
        })
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice_at(Utc::now())
    }

    pub fn notice_at(&self, now: DateTime<Utc>) -> Option<&Notice> {
        self.notice.as_ref().filter(|notice| now < notice.expires_at)
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FileHandle;
    use chrono::TimeZone;
    use serde_json::json;

    const SIMPLE: &str = r#"{"forms":[{"formName":"F","fields":[{"type":"text","label":"Name","name":"n","required":true,"value":""}]}]}"#;

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn generated(text: &str) -> FormSession {
        let mut session = FormSession::default();
        session.generate(text).unwrap();
        session
    }

    #[test]
    fn end_to_end() {
        let mut session = generated(SIMPLE);
        assert_eq!(Some(&FieldValue::from("")), session.value("F", "n"));

        match session.submit_at("F", noon()) {
            Err(SessionError::Rejected { errors, .. }) => {
                assert_eq!("Name is required.", errors.get("n").unwrap().to_string());
            }
            other => panic!("expected rejection, got {:?}", other),
        }
        assert_eq!(Some("Name is required.".to_owned()), session.error("F", "n"));
        assert_eq!(None, session.notice_at(noon()));

        session.set_value("F", "n", "Alice".into()).unwrap();
        assert_eq!(None, session.error("F", "n"));

        let submission = session.submit_at("F", noon()).unwrap();
        assert_eq!("F", submission.form_name);
        assert_eq!(json!({ "n": "Alice" }), Value::Object(submission.values));
        assert_eq!(noon(), submission.submitted_at);
        assert!(!session.errors("F").unwrap().has_errors());
    }

    #[test]
    fn generate_failure_keeps_state() {
        let mut session = generated(SIMPLE);
        session.set_value("F", "n", "Alice".into()).unwrap();

        assert_eq!(
            Err(GenerateError::InvalidJson),
            session.generate("{ not json")
        );
        assert_eq!(Some(&FieldValue::from("Alice")), session.value("F", "n"));
        assert_eq!(1, session.document().unwrap().forms.len());
    }

    #[test]
    fn regenerate_resets_values_and_errors() {
        let mut session = generated(SIMPLE);
        session.set_value("F", "n", "Alice".into()).unwrap();
        let _ = session.submit_at("F", noon());

        session.generate(SIMPLE).unwrap();
        assert_eq!(Some(&FieldValue::from("")), session.value("F", "n"));
        assert_eq!(None, session.errors("F"));
        assert_eq!(None, session.notice_at(noon()));
    }

    #[test]
    fn initial_values_follow_kind() {
        let session = generated(include_str!("../testdata/tests/session.json"));

        assert_eq!(Some(&FieldValue::Selection(vec![])), session.value("Signup", "topics"));
        assert_eq!(Some(&FieldValue::Null), session.value("Signup", "resume"));
        assert_eq!(Some(&FieldValue::Number(30.0)), session.value("Signup", "age"));
        assert_eq!(Some(&FieldValue::from("")), session.value("Signup", "country"));
    }

    #[test]
    fn errors_are_reported_for_every_field() {
        let mut session = generated(include_str!("../testdata/tests/session.json"));

        let errors = match session.submit_at("Signup", noon()) {
            Err(SessionError::Rejected { errors, .. }) => errors,
            other => panic!("expected rejection, got {:?}", other),
        };

        assert_eq!(3, errors.failures());
        assert_eq!(
            "Topics is required.",
            errors.get("topics").unwrap().to_string()
        );
        assert_eq!(
            "Resume is required.",
            errors.get("resume").unwrap().to_string()
        );
        assert_eq!(
            "Country is required.",
            errors.get("country").unwrap().to_string()
        );
        assert_eq!(None, errors.get("age"));
    }

    #[test]
    fn set_value_returns_live_feedback() {
        let mut session = generated(include_str!("../testdata/tests/session.json"));

        assert_eq!(
            Ok(Some(LiveError::DisallowedExtension(vec!["pdf".to_owned()]))),
            session.set_value("Signup", "resume", FileHandle::new("cv.doc").into())
        );
        assert_eq!(
            Ok(None),
            session.set_value("Signup", "resume", FileHandle::new("cv.pdf").into())
        );

        let mut quiet = FormSession::new(SessionOptions::new().with_live_validation(false));
        quiet
            .generate(include_str!("../testdata/tests/session.json"))
            .unwrap();
        assert_eq!(
            Ok(None),
            quiet.set_value("Signup", "resume", FileHandle::new("cv.doc").into())
        );
    }

    #[test]
    fn set_value_clears_only_that_field() {
        let mut session = generated(include_str!("../testdata/tests/session.json"));
        let _ = session.submit_at("Signup", noon());

        session
            .set_value("Signup", "topics", vec!["tech".to_owned()].into())
            .unwrap();
        assert_eq!(None, session.error("Signup", "topics"));
        assert!(session.error("Signup", "resume").is_some());

        let errors = session.errors("Signup").unwrap();
        assert!(errors.has_errors());
        assert_eq!(2, errors.failures());
    }

    #[test]
    fn editing_every_failing_field_clears_the_form() {
        let mut session = generated(SIMPLE);
        assert!(session.submit_at("F", noon()).is_err());
        assert!(session.errors("F").unwrap().has_errors());

        session.set_value("F", "n", "Alice".into()).unwrap();
        assert_eq!(None, session.error("F", "n"));

        let errors = session.errors("F").unwrap();
        assert!(!errors.has_errors());
        assert_eq!(0, errors.failures());

        let mut session = generated(include_str!("../testdata/tests/session.json"));
        let _ = session.submit_at("Signup", noon());
        session
            .set_value("Signup", "topics", vec!["tech".to_owned()].into())
            .unwrap();
        session
            .set_value("Signup", "resume", FileHandle::new("cv.pdf").into())
            .unwrap();
        session.set_value("Signup", "country", "ng".into()).unwrap();

        assert!(!session.errors("Signup").unwrap().has_errors());
        assert!(session.submit_at("Signup", noon()).is_ok());
    }

    #[test]
    fn unknown_targets() {
        let mut session = FormSession::default();
        assert_eq!(
            Err(SessionError::NotGenerated),
            session.set_value("F", "n", FieldValue::Null)
        );

        session.generate(SIMPLE).unwrap();
        assert_eq!(
            Err(SessionError::UnknownForm("G".to_owned())),
            session.submit_at("G", noon())
        );
        assert_eq!(
            Err(SessionError::UnknownField {
                form_name: "F".to_owned(),
                name: "m".to_owned(),
            }),
            session.set_value("F", "m", FieldValue::Null)
        );
    }

    #[test]
    fn notice_expires() {
        let mut session = FormSession::new(
            SessionOptions::new().with_notice_duration(Duration::seconds(5)),
        );
        session.generate(SIMPLE).unwrap();
        session.set_value("F", "n", "Alice".into()).unwrap();
        session.submit_at("F", noon()).unwrap();

        let notice = session.notice_at(noon() + Duration::seconds(4)).unwrap();
        assert_eq!("F", notice.form_name);
        assert_eq!(None, session.notice_at(noon() + Duration::seconds(5)));

        session.dismiss_notice();
        assert_eq!(None, session.notice_at(noon()));
    }

    #[test]
    fn rejection_message() {
        let mut session = generated(SIMPLE);
        let err = session.submit_at("F", noon()).unwrap_err();
        assert_eq!("form F has 1 invalid field(s)", err.to_string());
    }
}
