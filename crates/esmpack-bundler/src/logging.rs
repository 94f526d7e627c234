//! Subscriber setup for binaries that embed esmpack
//!
//! The library itself only emits `tracing` events: modules loaded or reused,
//! exports and imports removed by shaking, output units and their sizes.
//! Applications that already own a subscriber can ignore this module.

use std::str::FromStr;
use std::sync::Once;

use tracing_subscriber::filter::{Directive, LevelFilter};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// Verbosity used when `RUST_LOG` does not say otherwise
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogLevel(LevelFilter);

impl Default for LogLevel {
    fn default() -> Self {
        Self::INFO
    }
}

impl LogLevel {
    pub const OFF: Self = Self(LevelFilter::OFF);
    pub const WARN: Self = Self(LevelFilter::WARN);
    pub const INFO: Self = Self(LevelFilter::INFO);
    /// Per-module loading and rewriting events
    pub const DEBUG: Self = Self(LevelFilter::DEBUG);
    /// Cache hits and chunk-name assignment
    pub const TRACE: Self = Self(LevelFilter::TRACE);

    fn directive(self) -> Directive {
        self.0.into()
    }
}

impl FromStr for LogLevel {
    type Err = String;

    /// Accepts tracing level names plus `silent` for `off`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        let name = if name == "silent" { "off" } else { name.as_str() };
        LevelFilter::from_str(name)
            .map(Self)
            .map_err(|_| format!("unknown log level '{s}'"))
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

fn install(filter: EnvFilter) {
    // A host application may have installed its own subscriber first
    if let Err(err) = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_target(false).without_time())
        .try_init()
    {
        tracing::debug!(%err, "tracing subscriber already installed");
    }
}

/// Install a compact stderr subscriber. `RUST_LOG` directives still apply;
/// `level` covers everything they leave out. Only the first call in a process
/// has any effect.
///
/// ```rust,no_run
/// use esmpack_bundler::logging::{LogLevel, init_logging};
///
/// init_logging(LogLevel::DEBUG);
/// ```
pub fn init_logging(level: LogLevel) {
    INIT.call_once(|| {
        install(
            EnvFilter::builder()
                .with_default_directive(level.directive())
                .from_env_lossy(),
        );
    });
}

/// Same as [`init_logging`] at `info`, unless `RUST_LOG` parses cleanly
pub fn init_logging_from_env() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::builder()
                .with_default_directive(LogLevel::INFO.directive())
                .from_env_lossy()
        });
        install(filter);
    });
}
