use std::{borrow::Cow, fmt};

use kube::core::Status;
use thiserror::Error;

/// Path to a field of a resource, using the field names found in manifests, e.g.
/// `spec.rabbitmqClusterReference.name`.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct FieldPath(Vec<&'static str>);

impl FieldPath {
    pub fn new(root: &'static str) -> Self {
        FieldPath(vec![root])
    }

    pub fn spec() -> Self {
        FieldPath::new("spec")
    }

    pub fn child(&self, name: &'static str) -> Self {
        let mut path = self.clone();
        path.0.push(name);
        path
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

/// Problem with a single field.
///
/// The [`Display`](fmt::Display) output is the one Kubernetes produces for field errors, tooling
/// matches on it.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum FieldError {
    #[error("{path}: Required value")]
    Required { path: FieldPath },

    #[error("{path}: Unsupported value: {}: supported values: {}", quote(.value), quote_all(.supported))]
    NotSupported {
        path: FieldPath,
        value: String,
        supported: Vec<&'static str>,
    },

    #[error("{path}: Forbidden: {detail}")]
    Forbidden {
        path: FieldPath,
        detail: Cow<'static, str>,
    },
}

fn quote_all(values: &[&str]) -> String {
    values
        .iter()
        .map(|value| quote(value))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Double quotes `value` with the escapes of Go's `%q`, which the API server uses for the values
/// in its field errors.
fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');

    for c in value.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\u{7}' => quoted.push_str("\\a"),
            '\u{8}' => quoted.push_str("\\b"),
            '\u{c}' => quoted.push_str("\\f"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            '\u{b}' => quoted.push_str("\\v"),
            c if c < ' ' || c == '\u{7f}' => quoted.push_str(&format!("\\x{:02x}", c as u32)),
            c if !is_printable(c) && (c as u32) < 0x10000 => {
                quoted.push_str(&format!("\\u{:04x}", c as u32))
            }
            c if !is_printable(c) => quoted.push_str(&format!("\\U{:08x}", c as u32)),
            c => quoted.push(c),
        }
    }

    quoted.push('"');
    quoted
}

/// Approximates Go's `unicode.IsPrint`: controls, format characters and any space other than
/// ASCII space are escaped.
fn is_printable(c: char) -> bool {
    !(c.is_control()
        || (c.is_whitespace() && c != ' ')
        || matches!(
            c,
            '\u{ad}' | '\u{200b}'..='\u{200f}' | '\u{2060}'..='\u{2064}' | '\u{feff}'
        ))
}

impl FieldError {
    pub fn path(&self) -> &FieldPath {
        match self {
            FieldError::Required { path }
            | FieldError::NotSupported { path, .. }
            | FieldError::Forbidden { path, .. } => path,
        }
    }
}

/// Every [`FieldError`] found in a resource, never empty.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    /// `None` when there is nothing to report.
    pub fn from_vec(errors: Vec<FieldError>) -> Option<Self> {
        (!errors.is_empty()).then_some(FieldErrors(errors))
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Drops everything but the first error.
    pub fn truncate_to_first(mut self) -> Self {
        self.0.truncate(1);
        self
    }
}

impl From<FieldError> for FieldErrors {
    fn from(error: FieldError) -> Self {
        FieldErrors(vec![error])
    }
}

/// Single error as is, several as a bracketed list.
impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_slice() {
            [single] => single.fmt(f),
            many => {
                f.write_str("[")?;
                for (index, error) in many.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    error.fmt(f)?;
                }
                f.write_str("]")
            }
        }
    }
}

impl std::error::Error for FieldErrors {}

/// Rejection of a create or update request.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum AdmissionError {
    /// The resource contains illegal values, `kind` is `Kind.group`.
    #[error("{kind} {name:?} is invalid: {errors}")]
    Invalid {
        kind: String,
        name: String,
        errors: FieldErrors,
    },

    /// The resource is fine on its own, but can't replace the existing one. `resource` is
    /// `plural.group`.
    #[error("{resource} {name:?} is forbidden: {errors}")]
    Forbidden {
        resource: String,
        name: String,
        errors: FieldErrors,
    },
}

impl AdmissionError {
    pub fn field_errors(&self) -> &FieldErrors {
        match self {
            AdmissionError::Invalid { errors, .. } | AdmissionError::Forbidden { errors, .. } => {
                errors
            }
        }
    }

    pub fn reason(&self) -> &'static str {
        match self {
            AdmissionError::Invalid { .. } => "Invalid",
            AdmissionError::Forbidden { .. } => "Forbidden",
        }
    }

    pub fn code(&self) -> u16 {
        match self {
            AdmissionError::Invalid { .. } => 422,
            AdmissionError::Forbidden { .. } => 403,
        }
    }
}

/// What an admission webhook sends back to the API server.
impl From<&AdmissionError> for Status {
    fn from(error: &AdmissionError) -> Self {
        Status::failure(&error.to_string(), error.reason()).with_code(error.code())
    }
}

pub type AdmissionResult<T, E = AdmissionError> = Result<T, E>;

#[cfg(test)]
mod test {
    use kube::core::Status;
    use rstest::rstest;

    use super::{AdmissionError, FieldError, FieldErrors, FieldPath};

    fn unsupported_ack_mode() -> FieldError {
        FieldError::NotSupported {
            path: FieldPath::spec().child("ackMode"),
            value: "an-invalid-ackmode".to_string(),
            supported: vec!["on-confirm", "on-publish", "no-ack"],
        }
    }

    #[test]
    fn field_error_text() {
        assert_eq!(
            unsupported_ack_mode().to_string(),
            r#"spec.ackMode: Unsupported value: "an-invalid-ackmode": supported values: "on-confirm", "on-publish", "no-ack""#
        );
        assert_eq!(
            FieldError::Required {
                path: FieldPath::spec()
                    .child("rabbitmqClusterReference")
                    .child("name")
            }
            .to_string(),
            "spec.rabbitmqClusterReference.name: Required value"
        );
    }

    #[rstest]
    #[case::plain("an-invalid-ackmode", r#""an-invalid-ackmode""#)]
    #[case::control("on\tconfirm\u{7f}", r#""on\tconfirm\x7f""#)]
    #[case::low_byte("\u{1}\u{1b}", r#""\x01\x1b""#)]
    #[case::quotes(r#"say "hi" \o/"#, r#""say \"hi\" \\o/""#)]
    #[case::unicode("décembre ✓", r#""décembre ✓""#)]
    #[case::non_printable("a\u{a0}b\u{200b}\u{85}", r#""a\u00a0b\u200b\u0085""#)]
    fn values_are_quoted_like_go(#[case] value: &str, #[case] quoted: &str) {
        let error = FieldError::NotSupported {
            path: FieldPath::spec().child("ackMode"),
            value: value.to_string(),
            supported: vec!["no-ack"],
        };

        assert_eq!(
            error.to_string(),
            format!(r#"spec.ackMode: Unsupported value: {quoted}: supported values: "no-ack""#)
        );
    }

    #[test]
    fn several_errors_are_bracketed() {
        let errors = FieldErrors::from_vec(vec![
            unsupported_ack_mode(),
            FieldError::Required {
                path: FieldPath::spec().child("name"),
            },
        ])
        .unwrap();

        assert_eq!(
            errors.to_string(),
            r#"[spec.ackMode: Unsupported value: "an-invalid-ackmode": supported values: "on-confirm", "on-publish", "no-ack", spec.name: Required value]"#
        );
        assert_eq!(errors.truncate_to_first().len(), 1);
    }

    #[test]
    fn no_errors_is_not_an_error() {
        assert_eq!(FieldErrors::from_vec(Vec::new()), None);
    }

    #[test]
    fn status_for_webhook() {
        let error = AdmissionError::Invalid {
            kind: "Shovel.rabbitmq.com".to_string(),
            name: "an-invalid-ackmode".to_string(),
            errors: unsupported_ack_mode().into(),
        };
        let status = Status::from(&error);

        assert_eq!(status.code, 422);
        assert_eq!(status.reason, "Invalid");
        assert_eq!(
            status.message,
            r#"Shovel.rabbitmq.com "an-invalid-ackmode" is invalid: spec.ackMode: Unsupported value: "an-invalid-ackmode": supported values: "on-confirm", "on-publish", "no-ack""#
        );
    }
}
