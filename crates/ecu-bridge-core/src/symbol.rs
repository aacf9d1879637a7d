use std::fmt;

use crate::{Signature, SymbolName};

/// A name the managed runtime can call, with its declared shapes.
///
/// Immutable once created; fields are only reachable through getters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExportedSymbol {
    name: SymbolName,
    signature: Signature,
}

impl ExportedSymbol {
    pub fn new(name: SymbolName, signature: Signature) -> Self {
        Self { name, signature }
    }

    pub fn name(&self) -> &SymbolName {
        &self.name
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// JNI export name (see [`SymbolName::jni_export_name`]).
    pub fn jni_export_name(&self) -> String {
        self.name.jni_export_name()
    }
}

impl fmt::Display for ExportedSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.signature)
    }
}
