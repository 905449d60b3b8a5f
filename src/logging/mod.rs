//! Logging bootstrap.
//!
//! The subscriber is configured from
//! `<root>/config/logger/logging-conf/logging-<env>.conf` when that file exists
//! and loads cleanly. Otherwise a basic console setup is used whose level and
//! stream depend on whether the environment is production-like.
//!
//! Setup never fails. Problems are written straight to the console (logging
//! is not up yet) and repeated as warning records once the fallback is
//! installed.

mod fallback;
mod file_config;

pub use fallback::{Fallback, PRODUCTION_LIKE_ENVS, Stream, is_production_like};
pub use file_config::{
    HandlerConfig, LevelSpec, LogFormat, LoggingConfig, LoggingConfigError, RootConfig,
    RotationSpec, THIRD_PARTY_LOGGERS,
};

use std::path::{Path, PathBuf};
use tracing::Dispatch;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;

use crate::config::{CoreSettings, Environment};

/// Directory under the project root holding `logging-<env>.conf` files.
pub const CONFIG_DIR: [&str; 3] = ["config", "logger", "logging-conf"];

/// Replace characters that cannot appear in a single path component.
pub fn sanitize_filename(name: &str) -> String {
    name.replace(['/', '\\'], "-")
}

/// The crate's source root, where the bundled `config/` directory lives.
pub fn default_project_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

pub fn project_root(core: &CoreSettings) -> PathBuf {
    core.root_path.clone().unwrap_or_else(default_project_root)
}

pub fn config_file_name(env: Environment) -> String {
    format!("logging-{}.conf", sanitize_filename(env.as_str()))
}

pub fn config_path_in(root: &Path, env: Environment) -> PathBuf {
    CONFIG_DIR
        .iter()
        .fold(root.to_path_buf(), |path, part| path.join(part))
        .join(config_file_name(env))
}

pub fn config_path(core: &CoreSettings) -> PathBuf {
    config_path_in(&project_root(core), core.environment)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    /// No config file at the expected path.
    Missing,
    /// The file exists but could not be read, parsed or applied.
    Invalid(String),
}

/// Which configuration logging ended up with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogSource {
    File {
        path: PathBuf,
    },
    Fallback {
        fallback: Fallback,
        attempted: PathBuf,
        reason: FallbackReason,
    },
}

impl LogSource {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}

/// Decision between a config file and the fallback, made before anything is
/// installed.
#[derive(Debug, Clone)]
pub enum LoggingPlan {
    FromFile {
        path: PathBuf,
        root: PathBuf,
        config: LoggingConfig,
    },
    Fallback {
        fallback: Fallback,
        attempted: PathBuf,
        reason: FallbackReason,
    },
}

impl LoggingPlan {
    pub fn resolve(core: &CoreSettings) -> Self {
        let root = project_root(core);
        let path = config_path_in(&root, core.environment);

        if !path.is_file() {
            return Self::fallback(core.environment, path, FallbackReason::Missing);
        }
        match LoggingConfig::load(&path) {
            Ok(config) => Self::FromFile { path, root, config },
            Err(err) => Self::fallback(
                core.environment,
                path,
                FallbackReason::Invalid(format!("{:#}", anyhow::Error::from(err))),
            ),
        }
    }

    fn fallback(env: Environment, attempted: PathBuf, reason: FallbackReason) -> Self {
        Self::Fallback {
            fallback: Fallback::for_environment(env),
            attempted,
            reason,
        }
    }
}

/// Handle to the configured subscriber.
///
/// Holds the non-blocking writer guards of file handlers; keep it alive for
/// the whole run so buffered records are flushed on exit.
#[must_use = "dropping the logging handle stops file writers"]
pub struct Logging {
    environment: Environment,
    source: LogSource,
    dispatch: Dispatch,
    _guards: Vec<WorkerGuard>,
}

impl std::fmt::Debug for Logging {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logging")
            .field("environment", &self.environment)
            .field("source", &self.source)
            .field("file_writers", &self._guards.len())
            .finish()
    }
}

impl Logging {
    /// Build the subscriber for `core` without installing it.
    pub fn build(core: &CoreSettings) -> Self {
        let env = core.environment;
        if let Some(root) = &core.root_path {
            eprintln!(
                "INFO: Using explicit ROOT_PATH from settings: {}",
                root.display()
            );
        }

        let (attempted, reason) = match LoggingPlan::resolve(core) {
            LoggingPlan::FromFile { path, root, config } => match config.build(&root) {
                Ok(built) => {
                    println!(
                        "INFO: Logging configured successfully from: {} for environment '{env}'",
                        path.display()
                    );
                    let subscriber = tracing_subscriber::registry()
                        .with(built.layers)
                        .with(built.filter);
                    return Self {
                        environment: env,
                        source: LogSource::File { path },
                        dispatch: Dispatch::new(subscriber),
                        _guards: built.guards,
                    };
                }
                Err(err) => {
                    let err = anyhow::Error::from(err);
                    (path, FallbackReason::Invalid(format!("{err:#}")))
                }
            },
            LoggingPlan::Fallback {
                attempted, reason, ..
            } => (attempted, reason),
        };

        match &reason {
            FallbackReason::Missing => eprintln!(
                "WARNING: Logging configuration file not found for environment '{env}' at {}. \
                 Using basic fallback config.",
                attempted.display()
            ),
            FallbackReason::Invalid(err) => eprintln!(
                "CRITICAL: Error processing logging configuration. Env='{env}', Path='{}'. \
                 Error='{err}'. Using basic fallback config.",
                attempted.display()
            ),
        }

        let fallback = Fallback::for_environment(env);
        let subscriber = tracing_subscriber::registry()
            .with(vec![fallback.layer()])
            .with(fallback.filter());
        Self {
            environment: env,
            source: LogSource::Fallback {
                fallback,
                attempted,
                reason,
            },
            dispatch: Dispatch::new(subscriber),
            _guards: Vec::new(),
        }
    }

    /// Install the subscriber as the process-wide default.
    pub fn install(self) -> Self {
        // If another logger has already been installed, keep going; tracing still works.
        let _ = tracing_log::LogTracer::init();
        if let Err(err) = tracing::dispatcher::set_global_default(self.dispatch.clone()) {
            eprintln!("WARNING: Could not install logging subscriber: {err}");
        }
        self.announce();
        self
    }

    pub fn source(&self) -> &LogSource {
        &self.source
    }

    /// Emit the records describing which configuration is active.
    pub fn announce(&self) {
        let env = self.environment;
        match &self.source {
            LogSource::File { path } => tracing::info!(
                path = %path.display(),
                environment = %env,
                "logging configured from file, third-party loggers adjusted"
            ),
            LogSource::Fallback {
                fallback,
                attempted,
                reason,
            } => {
                tracing::warn!(
                    level = %fallback.level,
                    output = fallback.stream.name(),
                    "using basic fallback logging configuration"
                );
                tracing::warn!(
                    environment = %env,
                    path = %attempted.display(),
                    reason = ?reason,
                    "attempted to load logging configuration"
                );
            }
        }
    }
}

/// Configure and install process-wide logging for `core`. Never fails.
pub fn setup_logging(core: &CoreSettings) -> Logging {
    Logging::build(core).install()
}
