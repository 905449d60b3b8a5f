use reqwest::Url;
use serde::{Serialize, Serializer};
use std::path::PathBuf;
use std::time::Duration;

use super::env::EnvSource;
use super::environment::Environment;
use super::error::SettingsError;
use super::validation::{
    FieldResolver, parse_bounded_int, parse_environment, parse_flag, parse_http_url, parse_path,
};

pub const DEFAULT_API_BASE_URL: &str = "https://jsonplaceholder.typicode.com";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
/// Upper bound on the request timeout (one day).
pub const MAX_REQUEST_TIMEOUT_SECS: u64 = 86_400;

/// Path appended to the API base URL for the single fetched resource.
pub const TODO_PATH: &str = "/todos/1";

/// Environment selection and project layout. Read from `CORE_*`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CoreSettings {
    pub environment: Environment,
    /// Explicit project root; when unset the crate root is used.
    pub root_path: Option<PathBuf>,
}

impl CoreSettings {
    pub const PREFIX: &'static str = "CORE";

    fn resolve(env: &EnvSource, fields: &mut FieldResolver) -> Self {
        Self {
            environment: fields.resolve(
                env,
                Self::PREFIX,
                "ENVIRONMENT",
                Environment::default,
                parse_environment,
            ),
            root_path: fields.resolve(env, Self::PREFIX, "ROOT_PATH", || None, |raw| {
                parse_path(raw).map(Some)
            }),
        }
    }
}

/// Settings owned by the fetch pipeline. Read from `MYPACKAGE_*`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MyPackageSettings {
    #[serde(serialize_with = "serialize_url")]
    pub api_base_url: Url,
    /// Request timeout in seconds, in `1..=MAX_REQUEST_TIMEOUT_SECS`.
    pub request_timeout: u64,
    pub debug_mode: bool,
}

impl Default for MyPackageSettings {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT_SECS,
            debug_mode: false,
        }
    }
}

fn default_api_base_url() -> Url {
    Url::parse(DEFAULT_API_BASE_URL).expect("default API base URL is valid")
}

fn serialize_url<S: Serializer>(url: &Url, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(url.as_str())
}

impl MyPackageSettings {
    pub const PREFIX: &'static str = "MYPACKAGE";

    fn resolve(env: &EnvSource, fields: &mut FieldResolver) -> Self {
        Self {
            api_base_url: fields.resolve(
                env,
                Self::PREFIX,
                "API_BASE_URL",
                default_api_base_url,
                parse_http_url,
            ),
            request_timeout: fields.resolve(
                env,
                Self::PREFIX,
                "REQUEST_TIMEOUT",
                || DEFAULT_REQUEST_TIMEOUT_SECS,
                |raw| parse_bounded_int(raw, MAX_REQUEST_TIMEOUT_SECS),
            ),
            debug_mode: fields.resolve(env, Self::PREFIX, "DEBUG_MODE", || false, parse_flag),
        }
    }
}

/// The full settings tree, built once at startup and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AppSettings {
    pub core: CoreSettings,
    pub mypackage: MyPackageSettings,
}

impl AppSettings {
    /// Resolve every group from `env`, reporting all malformed fields at once.
    pub fn from_source(env: &EnvSource) -> Result<Self, SettingsError> {
        let mut fields = FieldResolver::default();
        let settings = Self {
            core: CoreSettings::resolve(env, &mut fields),
            mypackage: MyPackageSettings::resolve(env, &mut fields),
        };
        fields.finish()?;
        Ok(settings)
    }

    pub fn fetch_url(&self) -> String {
        let base = self.mypackage.api_base_url.as_str().trim_end_matches('/');
        format!("{base}{TODO_PATH}")
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.mypackage.request_timeout)
    }

    /// Log a summary of the resolved settings at startup.
    pub fn log_startup_summary(&self) {
        tracing::info!(
            environment = %self.core.environment,
            root_path = ?self.core.root_path,
            api_base_url = %self.mypackage.api_base_url,
            request_timeout_secs = self.mypackage.request_timeout,
            debug_mode = self.mypackage.debug_mode,
            "resolved settings"
        );
    }
}
