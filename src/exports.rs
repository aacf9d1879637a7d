//! The `NativeBridge` symbol table and the process-wide registry behind it.

use lazy_static::lazy_static;

use ecu_bridge_core::{BridgeError, RegistrationError, SymbolName, Value};
use ecu_bridge_macros::bindings;
use ecu_bridge_registry::NativeEntryRegistry;

use crate::BridgeConfig;

bindings! {
    /// Entry points of `id.xms.ecucamera.bridge.NativeBridge`.
    pub mod native_bridge = "id.xms.ecucamera.bridge.NativeBridge" {
        fn stringFromRust => crate::engine::string_from_rust;
        fn getEngineStatus => crate::engine::get_engine_status;
        fn initializeEngine => crate::engine::initialize_engine;
        fn getCppBridgeInfo => crate::bridge_info::get_bridge_info;
        fn analyzeFrame => crate::engine::analyze_frame;
        fn analyzeFrameArray => crate::engine::analyze_frame_array;
        fn calculateHistogram => crate::engine::calculate_histogram;
        fn detectFocusPeaks => crate::engine::detect_focus_peaks;
    }
}

lazy_static! {
    static ref REGISTRY: Result<NativeEntryRegistry, RegistrationError> =
        registry_with(&BridgeConfig::default());
}

/// The registry serving the exported entry points, built on first use with
/// [`BridgeConfig::default`].
pub fn registry() -> Result<&'static NativeEntryRegistry, RegistrationError> {
    REGISTRY.as_ref().map_err(Clone::clone)
}

/// Build a registry holding the `NativeBridge` table with custom settings.
pub fn registry_with(config: &BridgeConfig) -> Result<NativeEntryRegistry, RegistrationError> {
    config.builder().install(native_bridge::module()).build()
}

/// Fully-qualified name of a `NativeBridge` method.
pub fn symbol(method: &str) -> SymbolName {
    SymbolName::from_qualified_string(native_bridge::NAMESPACE).child(method)
}

/// Call a `NativeBridge` method on the process-wide registry.
pub fn invoke(method: &str, args: &[Value]) -> Result<Value, BridgeError> {
    let registry = registry()?;
    Ok(registry.invoke_symbol(&symbol(method), args)?)
}
