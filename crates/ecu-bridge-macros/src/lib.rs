//! ECU Bridge Proc Macros
//!
//! This crate provides the procedural macros that connect Rust functions to
//! the native symbol table.
//!
//! # Macros
//!
//! - `#[native]` - Generate binding metadata for a free function
//! - `bindings!` - Declare a symbol table, checked for duplicate names at compile time
//!
//! # Example
//!
//! ```ignore
//! use ecu_bridge_macros::{bindings, native};
//!
//! #[native]
//! pub fn get_engine_status() -> &'static str {
//!     "Rust Engine: Ready for ECU Communication"
//! }
//!
//! bindings! {
//!     pub mod native_bridge = "id.xms.ecucamera.bridge.NativeBridge" {
//!         fn getEngineStatus => get_engine_status;
//!     }
//! }
//! ```

use proc_macro::TokenStream;

mod bindings;
mod native;

/// Mark a function as a native implementation.
///
/// The function is kept as written. Next to it the macro generates a hidden
/// `__bridge_<name>_meta()` function returning a `NativeMeta` with:
///
/// - the Rust path of the function, used in conflict diagnostics
/// - the signature derived from the parameter and return types
/// - a type-erased wrapper that pulls each argument out of the call context
///
/// Parameter types must implement `FromValue`; the return type must
/// implement `IntoNativeResult`, which covers `Result<T, E>` for any
/// `E: Into<NativeError>`.
///
/// # Example
///
/// ```ignore
/// #[native]
/// pub fn analyze_frame(data: &[u8], length: i32) -> Result<String, NativeError> {
///     // ...
/// }
/// ```
#[proc_macro_attribute]
pub fn native(attr: TokenStream, item: TokenStream) -> TokenStream {
    native::native_impl(attr, item)
}

/// Declare one or more symbol tables.
///
/// Each table names a namespace and lists its symbols. A symbol is either
/// bound to a `#[native]` function by path, or declared by shape only and
/// left without an implementation:
///
/// ```ignore
/// bindings! {
///     pub mod native_bridge = "id.xms.ecucamera.bridge.NativeBridge" {
///         fn getEngineStatus => crate::engine::get_engine_status;
///         fn probeEcu(String) -> String;
///     }
/// }
/// ```
///
/// Each table expands to a module with `NAMESPACE`, `SYMBOLS` and a
/// `module()` function building the registry module.
///
/// A fully-qualified name listed twice, within a table or across tables of
/// the same invocation, is a compile error naming both definitions.
#[proc_macro]
pub fn bindings(input: TokenStream) -> TokenStream {
    bindings::bindings_impl(input)
}
