use serde::{Deserialize, Serialize};

use super::error::FieldErrors;

/// Knobs of [`ShovelAdmission`](super::ShovelAdmission).
///
/// ```yaml
/// errorReporting: all
/// ```
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AdmissionConfig {
    #[serde(default)]
    pub error_reporting: ErrorReporting,
}

/// How many problems a rejection reports.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorReporting {
    /// Only the first failing rule, like the API server's own schema validation.
    #[default]
    First,

    /// Every failing rule.
    All,
}

impl ErrorReporting {
    pub fn apply(self, errors: FieldErrors) -> FieldErrors {
        match self {
            ErrorReporting::First => errors.truncate_to_first(),
            ErrorReporting::All => errors,
        }
    }
}
