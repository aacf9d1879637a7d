//! Bridge configuration.

use std::sync::Arc;

use ecu_bridge_core::{LogFacadeSink, LogSink, NullSink, Severity};
use ecu_bridge_registry::{DEFAULT_TAG, RegistryBuilder};

/// Settings applied when the bridge registry is built.
///
/// ```
/// use ecu_bridge::{BridgeConfig, Severity};
///
/// let config = BridgeConfig::new()
///     .with_tag("EcuCamera")
///     .with_min_severity(Severity::Debug);
/// assert_eq!(config.tag(), "EcuCamera");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    tag: String,
    min_severity: Severity,
    logging: bool,
}

impl BridgeConfig {
    pub fn new() -> Self {
        Self {
            tag: DEFAULT_TAG.to_string(),
            min_severity: Severity::Info,
            logging: true,
        }
    }

    /// Tag attached to every diagnostic record.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Records below this severity are dropped.
    pub fn with_min_severity(mut self, severity: Severity) -> Self {
        self.min_severity = severity;
        self
    }

    /// Turn diagnostic records on or off. Results are the same either way.
    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.logging = enabled;
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn min_severity(&self) -> Severity {
        self.min_severity
    }

    pub fn logging_enabled(&self) -> bool {
        self.logging
    }

    /// The sink a registry built from this config reports to.
    pub fn sink(&self) -> Arc<dyn LogSink> {
        if self.logging {
            Arc::new(LogFacadeSink)
        } else {
            Arc::new(NullSink)
        }
    }

    /// A registry builder carrying these settings.
    pub fn builder(&self) -> RegistryBuilder {
        RegistryBuilder::new()
            .with_sink(self.sink())
            .with_tag(self.tag.clone())
            .with_min_severity(self.min_severity)
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self::new()
    }
}
