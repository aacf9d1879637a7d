//! Argument and return shapes of exported symbols.
//!
//! The managed boundary only carries primitives, strings and byte buffers.
//! Each shape knows its JNI type descriptor so a full method signature can be
//! rendered for `RegisterNatives` or diagnostics.

use std::fmt;

/// The shape of a single value crossing the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// No value. Only valid as a return shape.
    Void,
    /// `boolean`
    Bool,
    /// 32-bit signed integer (`int`)
    Int,
    /// 64-bit signed integer (`long`)
    Long,
    /// 64-bit float (`double`)
    Double,
    /// UTF-8 string (`java.lang.String`)
    String,
    /// Raw bytes (`byte[]` or a direct `ByteBuffer`)
    Bytes,
}

impl Shape {
    /// All shapes, in declaration order.
    pub const ALL: [Shape; 7] = [
        Shape::Void,
        Shape::Bool,
        Shape::Int,
        Shape::Long,
        Shape::Double,
        Shape::String,
        Shape::Bytes,
    ];

    /// Human-readable name, as used in diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Shape::Void => "void",
            Shape::Bool => "bool",
            Shape::Int => "int",
            Shape::Long => "long",
            Shape::Double => "double",
            Shape::String => "string",
            Shape::Bytes => "bytes",
        }
    }

    /// JNI field descriptor for this shape.
    pub fn jni_descriptor(&self) -> &'static str {
        match self {
            Shape::Void => "V",
            Shape::Bool => "Z",
            Shape::Int => "I",
            Shape::Long => "J",
            Shape::Double => "D",
            Shape::String => "Ljava/lang/String;",
            Shape::Bytes => "[B",
        }
    }

    /// Whether a parameter may have this shape.
    pub fn is_valid_param(&self) -> bool {
        !matches!(self, Shape::Void)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameter and return shapes of an exported symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    pub params: Vec<Shape>,
    pub returns: Shape,
}

impl Signature {
    pub fn new(params: Vec<Shape>, returns: Shape) -> Self {
        Self { params, returns }
    }

    /// Signature of a function taking nothing and returning `returns`.
    pub fn nullary(returns: Shape) -> Self {
        Self {
            params: Vec::new(),
            returns,
        }
    }

    /// Number of parameters.
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// JNI method descriptor, e.g. `([BIII)Ljava/lang/String;`.
    pub fn jni_descriptor(&self) -> String {
        let mut out = String::from("(");
        for param in &self.params {
            out.push_str(param.jni_descriptor());
        }
        out.push(')');
        out.push_str(self.returns.jni_descriptor());
        out
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", param)?;
        }
        write!(f, ") -> {}", self.returns)
    }
}
