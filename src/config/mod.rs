/// Layered settings resolution.
///
/// Resolution order (later wins):
/// 1. Field defaults
/// 2. Dotenv file (`.env` in the working directory, or `--env-file`)
/// 3. Process environment, `GROUP_FIELD` form
/// 4. Process environment, `GROUP__FIELD` form
///
/// Settings are resolved once at startup. Any malformed value is fatal; the
/// binary reports every failing field and exits with status 1.
mod app_settings;
pub mod cli;
mod env;
mod environment;
mod error;
mod validation;

pub use app_settings::{
    AppSettings, CoreSettings, DEFAULT_API_BASE_URL, DEFAULT_REQUEST_TIMEOUT_SECS,
    MAX_REQUEST_TIMEOUT_SECS, MyPackageSettings, TODO_PATH,
};
pub use cli::CliArgs;
pub use env::{DEFAULT_ENV_FILE, EnvSource, NESTED_DELIMITER};
pub use environment::{Environment, UnknownEnvironment};
pub use error::{FieldError, SettingsError};

use std::path::Path;

/// Load and validate `AppSettings` from the environment and an optional
/// dotenv file.
pub fn load_app_settings(env_file: Option<&Path>) -> Result<AppSettings, SettingsError> {
    let env = EnvSource::load(env_file)?;
    AppSettings::from_source(&env)
}
