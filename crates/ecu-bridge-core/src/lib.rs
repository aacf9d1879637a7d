//! Core types for the ECU native bridge.
//!
//! This crate holds the data model shared by the registry, the proc macros
//! and the JNI layer:
//!
//! - [`SymbolName`], [`ExportedSymbol`] - what the managed runtime calls
//! - [`Shape`], [`Signature`], [`Value`] - what crosses the boundary
//! - [`NativeFn`], [`CallContext`], [`NativeMeta`] - how implementations are stored and called
//! - [`RegistrationError`], [`InvocationError`], [`NativeError`] - what can go wrong
//! - [`LogSink`], [`Severity`] - the logging collaborator

pub mod convert;
mod diagnostics;
mod error;
mod native_fn;
mod shape;
mod symbol;
mod symbol_name;
mod value;

pub use convert::{BridgeType, FromValue, IntoNativeResult, IntoValue};
pub use diagnostics::{LogFacadeSink, LogSink, NullSink, Severity};
pub use error::{
    BridgeError, ConversionError, InvocationError, NativeError, RegistrationError,
};
pub use native_fn::{CallContext, NativeCallable, NativeFn, NativeMeta};
pub use shape::{Shape, Signature};
pub use symbol::ExportedSymbol;
pub use symbol_name::SymbolName;
pub use value::Value;

/// Result of a single call through the bridge.
pub type InvocationResult = Result<Value, InvocationError>;
