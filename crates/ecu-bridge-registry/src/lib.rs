//! Symbol registry for the ECU native bridge.
//!
//! - [`Module`] - one native module's bindings and declarations
//! - [`RegistryBuilder`] - validates modules, rejecting conflicting bindings
//! - [`NativeEntryRegistry`] - the immutable table that serves calls

mod module;
mod registry;

pub use module::{Module, ModuleEntry};
pub use registry::{DEFAULT_TAG, NativeEntryRegistry, RegistryBuilder};

// Re-export from core so generated code and callers need one import path.
pub use ecu_bridge_core::{
    InvocationError, InvocationResult, LogSink, NativeMeta, RegistrationError, Severity, Shape,
    Signature, SymbolName, Value,
};
