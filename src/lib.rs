//! ECU Bridge
//!
//! Native side of the ECU camera bridge: a fixed table of entry points called
//! from the managed runtime, each backed by exactly one Rust implementation.
//!
//! # Layout
//!
//! - [`engine`] - status probes and frame analysis
//! - [`exports`] - the `NativeBridge` symbol table and the process-wide registry
//! - [`BridgeConfig`] - tag, severity and logging switch for a registry
//! - `ffi` - JNI exports (feature `jni`, on by default)
//!
//! # Binding uniqueness
//!
//! A symbol bound twice never reaches a caller. Within one table the
//! `bindings!` macro rejects it at compile time:
//!
//! ```compile_fail
//! use ecu_bridge::{bindings, native};
//!
//! #[native]
//! fn first() -> &'static str { "first" }
//!
//! #[native]
//! fn second() -> &'static str { "second" }
//!
//! bindings! {
//!     mod table = "a.b.Bridge" {
//!         fn status => first;
//!         fn status => second;
//!     }
//! }
//! # fn main() {}
//! ```
//!
//! Across separately built modules, [`RegistryBuilder::build`] reports an
//! [`RegistrationError::ImplementationConflict`] naming both implementations,
//! and no registry is produced.
//!
//! # Example
//!
//! ```
//! use ecu_bridge::{Value, exports};
//!
//! let status = exports::invoke("getEngineStatus", &[]).unwrap();
//! assert_eq!(status, Value::from("Rust Engine: Ready for ECU Communication"));
//! ```

pub mod bridge_info;
mod config;
pub mod engine;
pub mod exports;
#[cfg(feature = "jni")]
pub mod ffi;
pub mod logging;

pub use config::BridgeConfig;
pub use exports::{registry, registry_with};

pub use ecu_bridge_core::{
    BridgeError, ExportedSymbol, InvocationError, InvocationResult, LogFacadeSink, LogSink,
    NativeError, NullSink, RegistrationError, Severity, Shape, Signature, SymbolName, Value,
};
pub use ecu_bridge_macros::{bindings, native};
pub use ecu_bridge_registry::{
    DEFAULT_TAG, Module, ModuleEntry, NativeEntryRegistry, RegistryBuilder,
};

/// Items needed to write and bind native implementations.
pub mod prelude {
    pub use ecu_bridge_core::{
        CallContext, IntoNativeResult, NativeError, NativeFn, NativeMeta, Shape, Signature, Value,
    };
    pub use ecu_bridge_macros::{bindings, native};
    pub use ecu_bridge_registry::{Module, NativeEntryRegistry, RegistryBuilder};
}
