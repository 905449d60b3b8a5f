use std::collections::HashMap;
use std::path::Path;

use super::error::SettingsError;

pub const DEFAULT_ENV_FILE: &str = ".env";

/// Separator between a settings group and its field, e.g. `CORE__ENVIRONMENT`.
pub const NESTED_DELIMITER: &str = "__";

/// Snapshot of the variables settings are resolved from.
///
/// Keys are stored upper-cased so lookups are case-insensitive. Values from the
/// process environment replace values read from the dotenv file.
#[derive(Debug, Clone, Default)]
pub struct EnvSource {
    vars: HashMap<String, String>,
}

impl EnvSource {
    /// Read `env_file` (or `.env` in the working directory) and overlay the
    /// process environment on top of it.
    ///
    /// A missing default `.env` is ignored. An explicitly requested file that
    /// does not exist, or any file that cannot be parsed, is an error.
    pub fn load(env_file: Option<&Path>) -> Result<Self, SettingsError> {
        let mut env = Self::default();

        let path = env_file.unwrap_or_else(|| Path::new(DEFAULT_ENV_FILE));
        if path.is_file() {
            env.merge_dotenv(path)?;
        } else if env_file.is_some() {
            return Err(SettingsError::EnvFileMissing {
                path: path.to_path_buf(),
            });
        }

        for (key, value) in std::env::vars_os() {
            // Non UTF-8 variables can never name a setting.
            if let (Ok(key), Ok(value)) = (key.into_string(), value.into_string()) {
                env.insert(&key, value);
            }
        }
        Ok(env)
    }

    /// Build a source from explicit pairs, bypassing the process environment.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut env = Self::default();
        for (key, value) in pairs {
            env.insert(key.as_ref(), value.into());
        }
        env
    }

    fn merge_dotenv(&mut self, path: &Path) -> Result<(), SettingsError> {
        let entries = dotenvy::from_path_iter(path).map_err(|err| SettingsError::EnvFile {
            path: path.to_path_buf(),
            source: err,
        })?;
        for entry in entries {
            let (key, value) = entry.map_err(|err| SettingsError::EnvFile {
                path: path.to_path_buf(),
                source: err,
            })?;
            self.insert(&key, value);
        }
        Ok(())
    }

    fn insert(&mut self, key: &str, value: String) {
        self.vars.insert(key.to_ascii_uppercase(), value);
    }

    /// Look up a variable as a trimmed, non-empty string.
    pub fn get(&self, key: &str) -> Option<&str> {
        let val = self.vars.get(&key.to_ascii_uppercase())?;
        let trimmed = val.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    }

    /// Look up a grouped setting, preferring `GROUP__FIELD` over `GROUP_FIELD`.
    pub fn field(&self, group: &str, field: &str) -> Option<&str> {
        self.get(&format!("{group}{NESTED_DELIMITER}{field}"))
            .or_else(|| self.get(&format!("{group}_{field}")))
    }
}

/// Parse a boolean flag (1/true/yes/on/t/y → true, 0/false/no/off/f/n → false).
/// Returns `None` for anything else.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" | "t" | "y" => Some(true),
        "0" | "false" | "no" | "off" | "f" | "n" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    #[test]
    fn parse_bool_truthy_values() {
        for val in ["1", "true", "yes", "on", " TRUE ", " On ", "y"] {
            assert_eq!(parse_bool(val), Some(true), "expected true for {val:?}");
        }
    }

    #[test]
    fn parse_bool_falsy_values() {
        for val in ["0", "false", "no", "off", "F"] {
            assert_eq!(parse_bool(val), Some(false), "expected false for {val:?}");
        }
    }

    #[test]
    fn parse_bool_rejects_garbage() {
        assert_eq!(parse_bool("anything"), None);
        assert_eq!(parse_bool(""), None);
    }

    #[test]
    fn get_trims_whitespace() {
        let env = EnvSource::from_pairs([("_TEST_STR_TRIM", "  hello  ")]);
        assert_eq!(env.get("_TEST_STR_TRIM"), Some("hello"));
    }

    #[test]
    fn get_empty_is_none() {
        let env = EnvSource::from_pairs([("_TEST_STR_EMPTY", "   ")]);
        assert_eq!(env.get("_TEST_STR_EMPTY"), None);
    }

    #[test]
    fn lookups_ignore_case() {
        let env = EnvSource::from_pairs([("core_environment", "dev")]);
        assert_eq!(env.field("CORE", "ENVIRONMENT"), Some("dev"));
    }

    #[test]
    fn nested_form_wins_over_prefixed_form() {
        let env = EnvSource::from_pairs([
            ("MYPACKAGE_REQUEST_TIMEOUT", "5"),
            ("MYPACKAGE__REQUEST_TIMEOUT", "7"),
        ]);
        assert_eq!(env.field("MYPACKAGE", "REQUEST_TIMEOUT"), Some("7"));
    }

    #[test]
    #[serial]
    fn load_reads_dotenv_and_process_env_wins() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(".env");
        fs::write(
            &path,
            "_TEST_DOTENV_ONLY=from-file\n_TEST_DOTENV_SHADOWED=from-file\n",
        )
        .expect("write .env");

        unsafe { std::env::set_var("_TEST_DOTENV_SHADOWED", "from-process") };
        let env = EnvSource::load(Some(&path)).expect("load env");
        unsafe { std::env::remove_var("_TEST_DOTENV_SHADOWED") };

        assert_eq!(env.get("_TEST_DOTENV_ONLY"), Some("from-file"));
        assert_eq!(env.get("_TEST_DOTENV_SHADOWED"), Some("from-process"));
    }

    #[test]
    #[serial]
    fn load_rejects_missing_explicit_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("absent.env");
        let err = EnvSource::load(Some(&path)).unwrap_err();
        assert!(matches!(err, SettingsError::EnvFileMissing { .. }));
    }

    #[test]
    #[serial]
    fn load_rejects_malformed_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(".env");
        fs::write(&path, "NOT A VALID LINE\n").expect("write .env");
        let err = EnvSource::load(Some(&path)).unwrap_err();
        assert!(matches!(err, SettingsError::EnvFile { .. }));
    }

    #[test]
    #[serial]
    fn load_tolerates_missing_default_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let previous = std::env::current_dir().expect("cwd");
        std::env::set_current_dir(dir.path()).expect("chdir");
        unsafe { std::env::set_var("_TEST_NO_DOTENV", "from-process") };

        let result = EnvSource::load(None);

        unsafe { std::env::remove_var("_TEST_NO_DOTENV") };
        std::env::set_current_dir(previous).expect("restore cwd");

        let env = result.expect("missing .env is not an error");
        assert_eq!(env.get("_TEST_NO_DOTENV"), Some("from-process"));
    }
}
