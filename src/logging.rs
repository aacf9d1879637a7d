//! Logger initialisation.
//!
//! The bridge logs through the `log` facade. On Android the records go to
//! logcat through `android_logger`; anywhere else the host application
//! installs whatever logger it likes and this is a no-op.

use crate::BridgeConfig;

/// Install the platform logger. Safe to call more than once; only the first
/// call on Android has an effect.
pub fn init(config: &BridgeConfig) {
    if !config.logging_enabled() {
        return;
    }

    #[cfg(target_os = "android")]
    android_logger::init_once(
        android_logger::Config::default()
            .with_max_level(config.min_severity().to_level_filter())
            .with_tag(config.tag()),
    );

    log::debug!(target: config.tag(), "logging initialised at {}", config.min_severity());
}
