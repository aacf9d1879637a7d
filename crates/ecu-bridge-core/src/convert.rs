//! Conversion traits for argument extraction and return value handling.
//!
//! - [`BridgeType`]: the [`Shape`] a Rust type occupies on the boundary
//! - [`FromValue`]: borrow or copy a Rust value out of a [`Value`]
//! - [`IntoValue`]: turn a Rust value into a [`Value`]
//! - [`IntoNativeResult`]: what an implementation may return (`T` or `Result<T, E>`)
//!
//! ## Supported Types
//!
//! | Rust | Shape |
//! |------|-------|
//! | `()` | void (return only) |
//! | `bool` | bool |
//! | `i32` | int |
//! | `i64` | long |
//! | `f64` | double |
//! | `String`, `&str` | string |
//! | `Vec<u8>`, `&[u8]` | bytes |

use crate::{ConversionError, NativeError, Shape, Value};

/// A Rust type with a fixed shape on the boundary.
pub trait BridgeType {
    const SHAPE: Shape;
}

/// Extract a value, borrowing from the argument where possible.
pub trait FromValue<'a>: BridgeType + Sized {
    /// Returns `None` if the value has a different shape.
    fn from_value(value: &'a Value) -> Option<Self>;
}

/// Convert a Rust value into a [`Value`].
pub trait IntoValue: BridgeType {
    fn into_value(self) -> Value;
}

/// Return type of an implementation.
pub trait IntoNativeResult {
    /// Shape of the successful value.
    const SHAPE: Shape;

    fn into_native_result(self) -> Result<Value, NativeError>;
}

macro_rules! impl_bridge_type {
    ($($ty:ty => $shape:ident),* $(,)?) => {
        $(
            impl BridgeType for $ty {
                const SHAPE: Shape = Shape::$shape;
            }
        )*
    };
}

impl_bridge_type!(
    () => Void,
    bool => Bool,
    i32 => Int,
    i64 => Long,
    f64 => Double,
    String => String,
    Vec<u8> => Bytes,
);

impl BridgeType for &str {
    const SHAPE: Shape = Shape::String;
}

impl BridgeType for &[u8] {
    const SHAPE: Shape = Shape::Bytes;
}

macro_rules! impl_copy_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl<'a> FromValue<'a> for $ty {
                fn from_value(value: &'a Value) -> Option<Self> {
                    match value {
                        Value::$variant(v) => Some(*v),
                        _ => None,
                    }
                }
            }

            impl IntoValue for $ty {
                fn into_value(self) -> Value {
                    Value::$variant(self)
                }
            }
        )*
    };
}

impl_copy_value!(bool => Bool, i32 => Int, i64 => Long, f64 => Double);

impl<'a> FromValue<'a> for &'a str {
    fn from_value(value: &'a Value) -> Option<Self> {
        value.as_str()
    }
}

impl<'a> FromValue<'a> for String {
    fn from_value(value: &'a Value) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

impl<'a> FromValue<'a> for &'a [u8] {
    fn from_value(value: &'a Value) -> Option<Self> {
        value.as_bytes()
    }
}

impl<'a> FromValue<'a> for Vec<u8> {
    fn from_value(value: &'a Value) -> Option<Self> {
        value.as_bytes().map(<[u8]>::to_vec)
    }
}

impl IntoValue for () {
    fn into_value(self) -> Value {
        Value::Void
    }
}

impl IntoValue for String {
    fn into_value(self) -> Value {
        Value::String(self)
    }
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::String(self.to_string())
    }
}

impl IntoValue for Vec<u8> {
    fn into_value(self) -> Value {
        Value::Bytes(self)
    }
}

// Implemented per concrete type rather than as a blanket over `IntoValue`
// so the `Result` impls below cannot overlap.
macro_rules! impl_into_native_result {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoNativeResult for $ty {
                const SHAPE: Shape = <$ty as BridgeType>::SHAPE;

                fn into_native_result(self) -> Result<Value, NativeError> {
                    Ok(self.into_value())
                }
            }

            impl<E: Into<NativeError>> IntoNativeResult for Result<$ty, E> {
                const SHAPE: Shape = <$ty as BridgeType>::SHAPE;

                fn into_native_result(self) -> Result<Value, NativeError> {
                    self.map(IntoValue::into_value).map_err(Into::into)
                }
            }
        )*
    };
}

impl_into_native_result!((), bool, i32, i64, f64, String, &'static str, Vec<u8>);

/// Extract argument `index` from `args`, checking its shape.
pub fn extract_arg<'a, T: FromValue<'a>>(args: &'a [Value], index: usize) -> Result<T, ConversionError> {
    let value = args
        .get(index)
        .ok_or(ConversionError::MissingArgument { index })?;
    T::from_value(value).ok_or(ConversionError::TypeMismatch {
        index,
        expected: T::SHAPE,
        actual: value.shape(),
    })
}
