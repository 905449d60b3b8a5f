use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Deployment environment the process runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Environment {
    #[default]
    #[serde(rename = "local")]
    Local,
    #[serde(rename = "dev")]
    Development,
}

impl Environment {
    pub const ALL: [Environment; 2] = [Environment::Local, Environment::Development];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Development => "dev",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEnvironment(pub String);

impl fmt::Display for UnknownEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let allowed = Environment::ALL
            .iter()
            .map(|env| format!("'{env}'"))
            .collect::<Vec<_>>()
            .join(" or ");
        write!(f, "input should be {allowed}, got {:?}", self.0)
    }
}

impl FromStr for Environment {
    type Err = UnknownEnvironment;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let lower = raw.trim().to_ascii_lowercase();
        Environment::ALL
            .into_iter()
            .find(|env| env.as_str() == lower)
            .ok_or_else(|| UnknownEnvironment(raw.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_names_case_insensitively() {
        assert_eq!("local".parse(), Ok(Environment::Local));
        assert_eq!(" DEV ".parse(), Ok(Environment::Development));
    }

    #[test]
    fn rejects_unknown_names() {
        let err = "production".parse::<Environment>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "input should be 'local' or 'dev', got \"production\""
        );
    }

    #[test]
    fn default_is_local() {
        assert_eq!(Environment::default(), Environment::Local);
    }
}
