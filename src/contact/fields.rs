use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::Submission;

/// Shown when a submission fails `validate_form`.
pub const REQUIRED_FIELDS_MESSAGE: &str = "Por favor completa todos los campos requeridos";

/// Fields that must be present and non-blank for a submission to be accepted.
pub const REQUIRED_FIELDS: &[&str] = &[
    "firstName",
    "lastName",
    "email",
    "phone",
    "service",
    "origin",
    "destination",
    "message",
];

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Email,
    Tel,
    Number,
    Select,
    Textarea,
}

/// One control of the contact form as the page declares it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

/// The controls of `#contactForm`, in page order.
pub const FIELDS: &[FieldSpec] = &[
    FieldSpec { name: "firstName", kind: FieldKind::Text, required: true },
    FieldSpec { name: "lastName", kind: FieldKind::Text, required: true },
    FieldSpec { name: "email", kind: FieldKind::Email, required: true },
    FieldSpec { name: "phone", kind: FieldKind::Tel, required: true },
    FieldSpec { name: "company", kind: FieldKind::Text, required: false },
    FieldSpec { name: "service", kind: FieldKind::Select, required: true },
    FieldSpec { name: "origin", kind: FieldKind::Text, required: true },
    FieldSpec { name: "destination", kind: FieldKind::Text, required: true },
    FieldSpec { name: "weight", kind: FieldKind::Number, required: false },
    FieldSpec { name: "urgency", kind: FieldKind::Select, required: true },
    FieldSpec { name: "message", kind: FieldKind::Textarea, required: true },
];

pub fn find(name: &str) -> Option<&'static FieldSpec> {
    FIELDS.iter().find(|f| f.name == name)
}

/// Visual state of a single control after it loses focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldMark {
    Unmarked,
    Valid,
    Invalid,
}

impl FieldMark {
    pub fn css_class(self) -> Option<&'static str> {
        match self {
            FieldMark::Unmarked => None,
            FieldMark::Valid => Some("field-valid"),
            FieldMark::Invalid => Some("field-invalid"),
        }
    }
}

/// Loose address check: something, `@`, something, `.`, something.
pub fn is_valid_email(s: &str) -> bool {
    EMAIL_RE.is_match(s)
}

/// Whole-form check run on submit. Does not report which field failed.
pub fn validate_form(data: &Submission) -> bool {
    let all_present = REQUIRED_FIELDS
        .iter()
        .all(|name| data.get(name).is_some_and(|v| !v.trim().is_empty()));

    all_present && is_valid_email(data.value("email"))
}

/// Per-field check run on blur. The returned mark replaces any previous one.
pub fn validate_field(spec: &FieldSpec, value: &str) -> FieldMark {
    let value = value.trim();

    if spec.required && value.is_empty() {
        return FieldMark::Invalid;
    }

    if spec.kind == FieldKind::Email && !value.is_empty() && !is_valid_email(value) {
        return FieldMark::Invalid;
    }

    if value.is_empty() {
        FieldMark::Unmarked
    } else {
        FieldMark::Valid
    }
}
