//! Error types for the native bridge.
//!
//! ## Error Hierarchy
//!
//! ```text
//! BridgeError (top-level wrapper)
//! ├── RegistrationError - building the symbol table (before any call)
//! └── InvocationError   - a single call through the registry
//!
//! NativeError      - reported by an implementation, wrapped into InvocationError
//! ConversionError  - argument extraction inside an implementation wrapper
//! ```
//!
//! Registration errors can only occur while the registry is being built, so a
//! registry that exists never reports one. Invocation errors are returned
//! synchronously as part of the call's result.

use thiserror::Error;

use crate::{Shape, Signature};

// ============================================================================
// Registration Errors
// ============================================================================

/// Errors raised while binding implementations to symbols.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// Two implementations were bound to the same symbol.
    #[error("symbol '{symbol}' is bound more than once: first by {first}, then by {second}")]
    ImplementationConflict {
        symbol: String,
        first: String,
        second: String,
    },

    /// A declaration and a binding (or two declarations) disagree on shape.
    #[error("symbol '{symbol}' is declared as {declared} but bound as {bound}")]
    SignatureMismatch {
        symbol: String,
        declared: Signature,
        bound: Signature,
    },

    /// The signature or name itself is not acceptable.
    #[error("invalid signature for '{symbol}': {reason}")]
    InvalidSignature { symbol: String, reason: String },
}

impl RegistrationError {
    /// The symbol this error is about.
    pub fn symbol(&self) -> &str {
        match self {
            RegistrationError::ImplementationConflict { symbol, .. } => symbol,
            RegistrationError::SignatureMismatch { symbol, .. } => symbol,
            RegistrationError::InvalidSignature { symbol, .. } => symbol,
        }
    }
}

// ============================================================================
// Invocation Errors
// ============================================================================

/// Errors returned from a call through the registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvocationError {
    /// No implementation is bound to the symbol.
    #[error("unbound symbol: {symbol}")]
    UnboundSymbol { symbol: String },

    /// Arguments or return value do not match the declared signature.
    #[error("shape mismatch calling {symbol}: {detail}")]
    ShapeMismatch { symbol: String, detail: String },

    /// The implementation ran and reported a failure.
    #[error("{symbol} failed: {message}")]
    NativeInvocationFailure { symbol: String, message: String },
}

impl InvocationError {
    /// The symbol this error is about.
    pub fn symbol(&self) -> &str {
        match self {
            InvocationError::UnboundSymbol { symbol } => symbol,
            InvocationError::ShapeMismatch { symbol, .. } => symbol,
            InvocationError::NativeInvocationFailure { symbol, .. } => symbol,
        }
    }

    /// Short stable name for the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            InvocationError::UnboundSymbol { .. } => "UnboundSymbol",
            InvocationError::ShapeMismatch { .. } => "ShapeMismatch",
            InvocationError::NativeInvocationFailure { .. } => "NativeInvocationFailure",
        }
    }

    pub fn is_unbound(&self) -> bool {
        matches!(self, InvocationError::UnboundSymbol { .. })
    }
}

// ============================================================================
// Implementation Errors
// ============================================================================

/// Failure reported by a native implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct NativeError {
    pub message: String,
}

impl NativeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for NativeError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

impl From<&str> for NativeError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<ConversionError> for NativeError {
    fn from(err: ConversionError) -> Self {
        Self::new(err.to_string())
    }
}

/// Failure extracting an argument inside an implementation wrapper.
///
/// The registry checks shapes before calling, so this only surfaces when an
/// implementation is invoked directly with a hand-built context.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("missing argument {index}")]
    MissingArgument { index: usize },

    #[error("argument {index}: expected {expected}, found {actual}")]
    TypeMismatch {
        index: usize,
        expected: Shape,
        actual: Shape,
    },
}

// ============================================================================
// Top-level
// ============================================================================

/// Any bridge error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error(transparent)]
    Invocation(#[from] InvocationError),
}

impl BridgeError {
    pub fn is_registration(&self) -> bool {
        matches!(self, BridgeError::Registration(_))
    }

    pub fn is_invocation(&self) -> bool {
        matches!(self, BridgeError::Invocation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_names_both_definitions() {
        let err = RegistrationError::ImplementationConflict {
            symbol: "a.B.getEngineStatus".to_string(),
            first: "engine::get_engine_status".to_string(),
            second: "bridge_info::get_engine_status".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("engine::get_engine_status"));
        assert!(msg.contains("bridge_info::get_engine_status"));
        assert_eq!(err.symbol(), "a.B.getEngineStatus");
    }

    #[test]
    fn signature_mismatch_display() {
        let err = RegistrationError::SignatureMismatch {
            symbol: "x".to_string(),
            declared: Signature::nullary(Shape::String),
            bound: Signature::new(vec![Shape::Int], Shape::String),
        };
        assert_eq!(
            err.to_string(),
            "symbol 'x' is declared as () -> string but bound as (int) -> string"
        );
    }

    #[test]
    fn invocation_error_kinds() {
        let unbound = InvocationError::UnboundSymbol {
            symbol: "s".to_string(),
        };
        assert!(unbound.is_unbound());
        assert_eq!(unbound.kind(), "UnboundSymbol");
        assert_eq!(unbound.to_string(), "unbound symbol: s");

        let failure = InvocationError::NativeInvocationFailure {
            symbol: "s".to_string(),
            message: "boom".to_string(),
        };
        assert!(!failure.is_unbound());
        assert_eq!(failure.to_string(), "s failed: boom");
    }

    #[test]
    fn conversion_into_bridge_error() {
        let err: BridgeError = InvocationError::UnboundSymbol {
            symbol: "s".to_string(),
        }
        .into();
        assert!(err.is_invocation());
        assert!(!err.is_registration());
    }

    #[test]
    fn native_error_from_conversion() {
        let err: NativeError = ConversionError::MissingArgument { index: 2 }.into();
        assert_eq!(err.message, "missing argument 2");
    }
}
