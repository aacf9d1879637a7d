//! Native function storage and call context.
//!
//! An implementation is stored type-erased as a [`NativeFn`]. The registry
//! hands it a [`CallContext`] holding the already shape-checked arguments and
//! reads the return value back out of it afterwards.

use std::fmt;
use std::sync::Arc;

use crate::convert::{FromValue, extract_arg};
use crate::{ConversionError, NativeError, Signature, Value};

/// Type-erased native function.
///
/// The inner callable is wrapped in `Arc` so bindings can be cloned into
/// several registries without copying the implementation.
#[derive(Clone)]
pub struct NativeFn {
    inner: Arc<dyn NativeCallable + Send + Sync>,
}

impl NativeFn {
    /// Create a new NativeFn from a callable.
    pub fn new<F>(f: F) -> Self
    where
        F: NativeCallable + Send + Sync + 'static,
    {
        Self { inner: Arc::new(f) }
    }

    /// Call this native function with the given context.
    pub fn call(&self, ctx: &mut CallContext<'_>) -> Result<(), NativeError> {
        self.inner.call(ctx)
    }

    /// Whether two handles share the same implementation.
    pub fn ptr_eq(&self, other: &NativeFn) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFn").finish_non_exhaustive()
    }
}

/// Trait for callable native functions.
pub trait NativeCallable {
    fn call(&self, ctx: &mut CallContext<'_>) -> Result<(), NativeError>;
}

impl<F> NativeCallable for F
where
    F: Fn(&mut CallContext<'_>) -> Result<(), NativeError>,
{
    fn call(&self, ctx: &mut CallContext<'_>) -> Result<(), NativeError> {
        (self)(ctx)
    }
}

/// Arguments and return slot for one call.
#[derive(Debug)]
pub struct CallContext<'a> {
    args: &'a [Value],
    ret: Value,
}

impl<'a> CallContext<'a> {
    pub fn new(args: &'a [Value]) -> Self {
        Self {
            args,
            ret: Value::Void,
        }
    }

    /// Number of arguments passed.
    pub fn arg_count(&self) -> usize {
        self.args.len()
    }

    /// Raw argument slice.
    pub fn args(&self) -> &'a [Value] {
        self.args
    }

    /// Extract argument `index` as `T`.
    ///
    /// The result borrows from the argument slice rather than the context, so
    /// it can be held across a later [`set_return`](Self::set_return).
    pub fn arg<T: FromValue<'a>>(&self, index: usize) -> Result<T, ConversionError> {
        extract_arg(self.args, index)
    }

    pub fn set_return(&mut self, value: Value) {
        self.ret = value;
    }

    /// Take the return value, leaving `Void` behind.
    pub fn take_return(&mut self) -> Value {
        std::mem::replace(&mut self.ret, Value::Void)
    }
}

/// Metadata for one implementation, produced by `#[native]`.
#[derive(Debug, Clone)]
pub struct NativeMeta {
    /// Rust path of the implementing function, used in conflict diagnostics.
    pub origin: &'static str,
    pub signature: Signature,
    pub native_fn: NativeFn,
}

impl NativeMeta {
    pub fn new(origin: &'static str, signature: Signature, native_fn: NativeFn) -> Self {
        Self {
            origin,
            signature,
            native_fn,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Shape;

    #[test]
    fn closure_is_callable() {
        let f = NativeFn::new(|ctx: &mut CallContext<'_>| -> Result<(), NativeError> {
            let a: i32 = ctx.arg(0)?;
            let b: i32 = ctx.arg(1)?;
            ctx.set_return(Value::Int(a + b));
            Ok(())
        });

        let args = [Value::Int(2), Value::Int(3)];
        let mut ctx = CallContext::new(&args);
        f.call(&mut ctx).unwrap();
        assert_eq!(ctx.take_return(), Value::Int(5));
        assert_eq!(ctx.take_return(), Value::Void);
    }

    #[test]
    fn borrowed_arg_outlives_set_return() {
        let f = NativeFn::new(|ctx: &mut CallContext<'_>| -> Result<(), NativeError> {
            let s: &str = ctx.arg(0)?;
            ctx.set_return(Value::Int(s.len() as i32));
            ctx.set_return(Value::from(s));
            Ok(())
        });

        let args = [Value::from("abc")];
        let mut ctx = CallContext::new(&args);
        f.call(&mut ctx).unwrap();
        assert_eq!(ctx.take_return(), Value::from("abc"));
    }

    #[test]
    fn conversion_failure_becomes_native_error() {
        let f = NativeFn::new(|ctx: &mut CallContext<'_>| -> Result<(), NativeError> {
            let _: &[u8] = ctx.arg(0)?;
            Ok(())
        });

        let args = [Value::Int(1)];
        let mut ctx = CallContext::new(&args);
        let err = f.call(&mut ctx).unwrap_err();
        assert_eq!(err.message, "argument 0: expected bytes, found int");
    }

    #[test]
    fn clones_share_implementation() {
        let f = NativeFn::new(|_: &mut CallContext<'_>| -> Result<(), NativeError> { Ok(()) });
        let g = f.clone();
        assert!(f.ptr_eq(&g));

        let meta = NativeMeta::new("tests::noop", Signature::nullary(Shape::Void), g);
        assert!(meta.native_fn.ptr_eq(&f));
    }
}
