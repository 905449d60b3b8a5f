use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// A single setting that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Dotted path into the settings tree, e.g. `mypackage.request_timeout`.
    pub field: String,
    pub input: String,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} (input: {:?})", self.field, self.message, self.input)
    }
}

/// Errors raised while building [`AppSettings`](super::AppSettings).
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// One or more settings were present but malformed.
    #[error("{} setting(s) failed validation: {}", .0.len(), join_fields(.0))]
    Validation(Vec<FieldError>),

    #[error("dotenv file {} does not exist", path.display())]
    EnvFileMissing { path: PathBuf },

    #[error("failed to read dotenv file {}", path.display())]
    EnvFile {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },
}

impl SettingsError {
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            Self::Validation(errors) => errors,
            _ => &[],
        }
    }

    /// Render field errors as pretty JSON for startup diagnostics.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self.field_errors()).unwrap_or_else(|_| "[]".to_string())
    }
}

fn join_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
