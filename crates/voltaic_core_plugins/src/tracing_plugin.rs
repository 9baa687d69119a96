//! Tracing plugin.
//!
//! [`TracingPlugin`] stores its [`TracingConfig`] as a global during `build()`
//! and installs the subscriber during `ready()`, so every plugin built before
//! it can still read the configuration. Installing twice is harmless: if a
//! subscriber is already set (tests, embedding hosts), the existing one stays.
//!
//! # Example
//!
//! ```
//! use voltaic_system::server::Server;
//! use voltaic_core_plugins::{TracingConfig, TracingFormat, TracingPlugin};
//! use tracing::Level;
//!
//! let mut server = Server::new();
//! server.add_plugins(
//!     TracingPlugin::default()
//!         .with_format(TracingFormat::Json)
//!         .with_env_filter("voltaic_battery=debug,voltaic_sysfs=info"),
//! );
//! server.finish();
//!
//! let config = server.get_global::<TracingConfig>().unwrap();
//! assert_eq!(config.level, Level::INFO);
//! ```

use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use voltaic_system::plugin::Plugin;
use voltaic_system::resource::GlobalResource;
use voltaic_system::server::Server;

/// Output format of the installed subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracingFormat {
    /// Multi-line, colored output.
    #[default]
    Pretty,
    /// Single-line output.
    Compact,
    /// Newline-delimited JSON for log shippers.
    Json,
}

/// Tracing settings, readable by other plugins as a global.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Maximum level when no filter directive overrides it.
    pub level: Level,
    /// Output format.
    pub format: TracingFormat,
    /// Filter directives in `EnvFilter` syntax, if any.
    pub filter: Option<String>,
}

impl GlobalResource for TracingConfig {}

/// Installs a `tracing-subscriber` registry for the host.
///
/// # Resources Provided
///
/// | Resource | Scope | Description |
/// |----------|-------|-------------|
/// | [`TracingConfig`] | Global | Effective tracing settings |
///
/// # Configuration
///
/// ```
/// use voltaic_core_plugins::{TracingFormat, TracingPlugin};
/// use tracing::Level;
///
/// // Local debugging: everything from the battery crate.
/// let dev = TracingPlugin::new()
///     .with_level(Level::DEBUG)
///     .with_span_events(true);
///
/// // Deployed: JSON, filter taken from `VOLTAIC_LOG` when set.
/// let deployed = TracingPlugin::from_env("VOLTAIC_LOG").with_format(TracingFormat::Json);
/// ```
#[derive(Debug, Clone)]
pub struct TracingPlugin {
    level: Level,
    format: TracingFormat,
    env_filter: Option<String>,
    span_events: bool,
}

impl Default for TracingPlugin {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: TracingFormat::Pretty,
            env_filter: None,
            span_events: false,
        }
    }
}

impl TracingPlugin {
    /// Creates a plugin with `INFO` level and pretty output.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a plugin whose filter directives come from `env_var`.
    ///
    /// An unset or empty variable leaves the default level in effect.
    #[must_use]
    pub fn from_env(env_var: &str) -> Self {
        let env_filter = std::env::var(env_var)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        Self {
            env_filter,
            ..Self::default()
        }
    }

    /// Sets the maximum level.
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Sets the output format.
    #[must_use]
    pub fn with_format(mut self, format: TracingFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets filter directives, e.g. `voltaic_battery=debug,voltaic_sysfs=warn`.
    #[must_use]
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Emits span enter/exit events.
    #[must_use]
    pub fn with_span_events(mut self, enabled: bool) -> Self {
        self.span_events = enabled;
        self
    }

    /// Builds the subscriber filter. Directives that fail to parse fall back
    /// to the level filter and are returned with their parse error.
    fn filter(&self) -> (EnvFilter, Option<ParseError>) {
        let by_level = || EnvFilter::new(self.level.as_str());
        match self.env_filter.as_deref().map(EnvFilter::try_new) {
            Some(Ok(filter)) => (filter, None),
            Some(Err(error)) => (by_level(), Some(error)),
            None => (by_level(), None),
        }
    }
}

impl Plugin for TracingPlugin {
    fn build(&self, server: &mut Server) {
        server.insert_global(TracingConfig {
            level: self.level,
            format: self.format,
            filter: self.env_filter.clone(),
        });
    }

    fn ready(&self, _server: &mut Server) {
        let span_events = if self.span_events {
            FmtSpan::ENTER | FmtSpan::EXIT
        } else {
            FmtSpan::NONE
        };

        let (filter, rejected) = self.filter();
        let registry = tracing_subscriber::registry().with(filter);
        let installed = match self.format {
            TracingFormat::Pretty => registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .pretty()
                        .with_span_events(span_events),
                )
                .try_init(),
            TracingFormat::Compact => registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .compact()
                        .with_span_events(span_events),
                )
                .try_init(),
            TracingFormat::Json => registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_span_events(span_events),
                )
                .try_init(),
        };

        if installed.is_ok() {
            tracing::info!(level = %self.level, format = ?self.format, "tracing initialized");
        } else {
            tracing::debug!("tracing subscriber already installed, keeping it");
        }

        if let Some(error) = rejected {
            tracing::warn!(
                directives = self.env_filter.as_deref().unwrap_or_default(),
                %error,
                level = %self.level,
                "invalid tracing filter, falling back to level"
            );
        }
    }

    fn cleanup(&self, _server: &mut Server) {
        tracing::info!("tracing shutting down");
    }

    fn name(&self) -> &str {
        "voltaic::tracing"
    }
}
