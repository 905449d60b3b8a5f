//! Logging configuration files.
//!
//! A config file is TOML: a `[root]` level, optional per-target levels under
//! `[loggers]`, and one or more `[[handlers]]`. Python `fileConfig` files
//! (`[loggers]` with `keys=root`) are not understood and fall back as invalid.
//!
//! ```toml
//! [root]
//! level = "info"
//!
//! [loggers]
//! my_package = "debug"
//!
//! [[handlers]]
//! kind = "console"
//! stream = "stderr"
//!
//! [[handlers]]
//! kind = "file"
//! directory = "logs"
//! rotation = "daily"
//! format = "json"
//! ```

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::{EnvFilter, Layer, Registry};

use super::fallback::Stream;

pub(crate) type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

const DEFAULT_FILE_PREFIX: &str = "my-package";
const DEFAULT_MAX_FILES: usize = 10;
const LOG_FILE_SUFFIX: &str = "log";

/// Targets whose levels are forced after a config file has been applied.
pub const THIRD_PARTY_LOGGERS: &[(&str, LevelFilter)] = &[
    ("hyper", LevelFilter::WARN),
    ("hyper_util", LevelFilter::WARN),
    ("reqwest", LevelFilter::WARN),
    ("rustls", LevelFilter::WARN),
    ("mio", LevelFilter::WARN),
];

#[derive(Debug, thiserror::Error)]
pub enum LoggingConfigError {
    #[error("failed to read logging config {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse logging config")]
    Parse(#[from] toml::de::Error),

    #[error("logging config defines no handlers")]
    NoHandlers,

    #[error("max_files must be greater than zero for file handler in {}", directory.display())]
    MaxFiles { directory: PathBuf },

    #[error("invalid logger target in filter {directives:?}")]
    Filter {
        directives: String,
        #[source]
        source: ParseError,
    },

    #[error("failed to create log directory {}", path.display())]
    LogDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open rolling log file in {}", path.display())]
    Appender {
        path: PathBuf,
        #[source]
        source: InitError,
    },
}

/// A level name as written in config files. Accepts `warning` and `critical`
/// alongside the usual tracing names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct LevelSpec(pub LevelFilter);

impl TryFrom<String> for LevelSpec {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        let lower = raw.trim().to_ascii_lowercase();
        let level = match lower.as_str() {
            "warning" => LevelFilter::WARN,
            "critical" | "fatal" => LevelFilter::ERROR,
            "notset" => LevelFilter::TRACE,
            other => other
                .parse()
                .map_err(|_| format!("unknown log level {raw:?}"))?,
        };
        Ok(Self(level))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RootConfig {
    #[serde(default = "default_root_level")]
    pub level: LevelSpec,
}

impl Default for RootConfig {
    fn default() -> Self {
        Self {
            level: default_root_level(),
        }
    }
}

fn default_root_level() -> LevelSpec {
    LevelSpec(LevelFilter::INFO)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Full,
    Compact,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationSpec {
    Minutely,
    Hourly,
    #[default]
    Daily,
    Never,
}

impl From<RotationSpec> for Rotation {
    fn from(spec: RotationSpec) -> Self {
        match spec {
            RotationSpec::Minutely => Rotation::MINUTELY,
            RotationSpec::Hourly => Rotation::HOURLY,
            RotationSpec::Daily => Rotation::DAILY,
            RotationSpec::Never => Rotation::NEVER,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum HandlerConfig {
    Console {
        #[serde(default)]
        stream: Stream,
        #[serde(default)]
        format: LogFormat,
        #[serde(default)]
        ansi: bool,
    },
    File {
        /// Relative directories resolve against the project root.
        directory: PathBuf,
        #[serde(default = "default_file_prefix")]
        prefix: String,
        #[serde(default)]
        rotation: RotationSpec,
        #[serde(default = "default_max_files")]
        max_files: usize,
        #[serde(default)]
        format: LogFormat,
    },
}

fn default_file_prefix() -> String {
    DEFAULT_FILE_PREFIX.to_string()
}

fn default_max_files() -> usize {
    DEFAULT_MAX_FILES
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    #[serde(default)]
    pub root: RootConfig,
    #[serde(default)]
    pub loggers: BTreeMap<String, LevelSpec>,
    #[serde(default)]
    pub handlers: Vec<HandlerConfig>,
}

/// Layers and writer guards built from a [`LoggingConfig`].
pub(crate) struct BuiltConfig {
    pub filter: EnvFilter,
    pub layers: Vec<BoxedLayer>,
    pub guards: Vec<WorkerGuard>,
}

impl LoggingConfig {
    pub fn load(path: &Path) -> Result<Self, LoggingConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| LoggingConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self, LoggingConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), LoggingConfigError> {
        if self.handlers.is_empty() {
            return Err(LoggingConfigError::NoHandlers);
        }
        for handler in &self.handlers {
            if let HandlerConfig::File {
                directory,
                max_files: 0,
                ..
            } = handler
            {
                return Err(LoggingConfigError::MaxFiles {
                    directory: directory.clone(),
                });
            }
        }
        Ok(())
    }

    /// Filter directives: the root level, then per-target levels from the
    /// file, then [`THIRD_PARTY_LOGGERS`], which win over the file.
    pub fn filter_directives(&self) -> String {
        let mut targets: BTreeMap<&str, LevelFilter> = self
            .loggers
            .iter()
            .map(|(target, level)| (target.as_str(), level.0))
            .collect();
        for &(target, level) in THIRD_PARTY_LOGGERS {
            targets.insert(target, level);
        }

        std::iter::once(level_name(self.root.level.0))
            .chain(
                targets
                    .into_iter()
                    .map(|(target, level)| format!("{target}={}", level_name(level))),
            )
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Build the filter and every handler. Nothing is kept on failure, so a
    /// half-built configuration never reaches the subscriber.
    pub(crate) fn build(&self, root: &Path) -> Result<BuiltConfig, LoggingConfigError> {
        let directives = self.filter_directives();
        let filter = EnvFilter::builder()
            .parse(&directives)
            .map_err(|source| LoggingConfigError::Filter {
                directives: directives.clone(),
                source,
            })?;

        let mut layers = Vec::with_capacity(self.handlers.len());
        let mut guards = Vec::new();
        for handler in &self.handlers {
            match handler {
                HandlerConfig::Console {
                    stream,
                    format,
                    ansi,
                } => layers.push(format_layer(stream.make_writer(), *format, *ansi)),
                HandlerConfig::File {
                    directory,
                    prefix,
                    rotation,
                    max_files,
                    format,
                } => {
                    let path = root.join(directory);
                    fs::create_dir_all(&path).map_err(|source| LoggingConfigError::LogDir {
                        path: path.clone(),
                        source,
                    })?;
                    let appender = RollingFileAppender::builder()
                        .rotation((*rotation).into())
                        .filename_prefix(prefix)
                        .filename_suffix(LOG_FILE_SUFFIX)
                        .max_log_files(*max_files)
                        .build(&path)
                        .map_err(|source| LoggingConfigError::Appender {
                            path: path.clone(),
                            source,
                        })?;
                    let (writer, guard) = tracing_appender::non_blocking(appender);
                    layers.push(format_layer(writer, *format, false));
                    guards.push(guard);
                }
            }
        }

        Ok(BuiltConfig {
            filter,
            layers,
            guards,
        })
    }
}

fn level_name(level: LevelFilter) -> String {
    level.to_string().to_ascii_lowercase()
}

pub(crate) fn format_layer<W>(writer: W, format: LogFormat, ansi: bool) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(true)
        .with_line_number(true);
    match format {
        LogFormat::Full => layer.boxed(),
        LogFormat::Compact => layer.compact().boxed(),
        LogFormat::Json => layer.json().boxed(),
    }
}
