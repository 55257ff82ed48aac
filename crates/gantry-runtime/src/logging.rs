//! Logging setup for the gantry host.
//!
//! One `tracing-subscriber` stack with `EnvFilter`: the `RUST_LOG`
//! environment variable always wins, otherwise the filter configured here
//! (typically `log_filter` from the `[HOST]` manifest section) applies.
//! Plugin `log` vtable calls surface under the `plugin` target.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// A builder for configuring host logging.
///
/// ```rust,ignore
/// LoggingBuilder::new()
///     .with_filter("gantry=debug")
///     .init();
/// ```
#[derive(Default)]
pub struct LoggingBuilder {
    filter: Option<String>,
    with_target: bool,
}

impl LoggingBuilder {
    /// Creates a new logging builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the fallback filter used when `RUST_LOG` is not set.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Include the target (module path) in log output.
    pub fn with_target(mut self, enabled: bool) -> Self {
        self.with_target = enabled;
        self
    }

    fn build_filter(&self) -> EnvFilter {
        let fallback = self.filter.as_deref().unwrap_or("info");
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
    }

    /// Initialize the logging system.
    ///
    /// # Panics
    ///
    /// Panics if a subscriber has already been set.
    pub fn init(self) {
        let filter = self.build_filter();
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(self.with_target))
            .with(filter)
            .init();
    }

    /// Try to initialize the logging system, returning an error instead of
    /// panicking when a subscriber is already installed.
    pub fn try_init(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let filter = self.build_filter();
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(self.with_target))
            .with(filter)
            .try_init()
            .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)
    }
}
