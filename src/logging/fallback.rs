use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use super::file_config::{BoxedLayer, LogFormat, format_layer};
use crate::config::Environment;

/// Environments that log quietly to stdout when no config file applies.
pub const PRODUCTION_LIKE_ENVS: &[Environment] = &[Environment::Development];

pub fn is_production_like(env: Environment) -> bool {
    PRODUCTION_LIKE_ENVS.contains(&env)
}

/// Standard stream a console handler writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stream {
    Stdout,
    #[default]
    Stderr,
}

impl Stream {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Stdout => "<stdout>",
            Self::Stderr => "<stderr>",
        }
    }

    pub(crate) fn make_writer(self) -> BoxMakeWriter {
        match self {
            Self::Stdout => BoxMakeWriter::new(std::io::stdout),
            Self::Stderr => BoxMakeWriter::new(std::io::stderr),
        }
    }
}

/// Basic console configuration used when no config file can be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fallback {
    pub level: LevelFilter,
    pub stream: Stream,
}

impl Fallback {
    pub fn for_environment(env: Environment) -> Self {
        if is_production_like(env) {
            Self {
                level: LevelFilter::INFO,
                stream: Stream::Stdout,
            }
        } else {
            Self {
                level: LevelFilter::DEBUG,
                stream: Stream::Stderr,
            }
        }
    }

    pub(crate) fn filter(&self) -> EnvFilter {
        EnvFilter::builder()
            .with_default_directive(self.level.into())
            .parse_lossy("")
    }

    pub(crate) fn layer(&self) -> BoxedLayer {
        format_layer(self.stream.make_writer(), LogFormat::Full, false)
    }
}
