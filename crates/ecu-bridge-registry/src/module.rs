//! One native module's contribution to the symbol table.

use ecu_bridge_core::{NativeMeta, Signature, SymbolName};

/// A symbol contributed by a module: either bound to an implementation, or
/// declared with no implementation yet.
#[derive(Debug, Clone)]
pub enum ModuleEntry {
    Binding { name: SymbolName, meta: NativeMeta },
    Declaration { name: SymbolName, signature: Signature },
}

impl ModuleEntry {
    pub fn name(&self) -> &SymbolName {
        match self {
            ModuleEntry::Binding { name, .. } => name,
            ModuleEntry::Declaration { name, .. } => name,
        }
    }

    pub fn signature(&self) -> &Signature {
        match self {
            ModuleEntry::Binding { meta, .. } => &meta.signature,
            ModuleEntry::Declaration { signature, .. } => signature,
        }
    }

    pub fn is_binding(&self) -> bool {
        matches!(self, ModuleEntry::Binding { .. })
    }
}

/// Symbols of one native module, all under a single namespace.
///
/// ```ignore
/// let module = Module::from_namespace("id.xms.ecucamera.bridge.NativeBridge")
///     .function("getEngineStatus", engine::__bridge_get_engine_status_meta)
///     .declare("probeEcu", Signature::new(vec![Shape::String], Shape::String));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Module {
    namespace: Vec<String>,
    entries: Vec<ModuleEntry>,
}

impl Module {
    /// A module whose symbols have no namespace.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_namespace(path: &[&str]) -> Self {
        Self {
            namespace: path.iter().map(|s| s.to_string()).collect(),
            entries: Vec::new(),
        }
    }

    /// Namespace from a dotted string, e.g. `"id.xms.ecucamera.bridge.NativeBridge"`.
    pub fn from_namespace(dotted: &str) -> Self {
        Self {
            namespace: dotted
                .split('.')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            entries: Vec::new(),
        }
    }

    /// Bind `name` to the implementation described by `meta`.
    pub fn function(mut self, name: &str, meta: fn() -> NativeMeta) -> Self {
        self.entries.push(ModuleEntry::Binding {
            name: self.qualify(name),
            meta: meta(),
        });
        self
    }

    /// Bind `name` to an already-built [`NativeMeta`].
    pub fn function_meta(mut self, name: &str, meta: NativeMeta) -> Self {
        self.entries.push(ModuleEntry::Binding {
            name: self.qualify(name),
            meta,
        });
        self
    }

    /// Declare `name` without binding an implementation.
    pub fn declare(mut self, name: &str, signature: Signature) -> Self {
        self.entries.push(ModuleEntry::Declaration {
            name: self.qualify(name),
            signature,
        });
        self
    }

    pub fn namespace(&self) -> &[String] {
        &self.namespace
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[ModuleEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<ModuleEntry> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn qualify(&self, name: &str) -> SymbolName {
        SymbolName::new(name, self.namespace.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecu_bridge_core::{CallContext, NativeError, NativeFn, Shape, Value};

    fn status_meta() -> NativeMeta {
        NativeMeta::new(
            "tests::status",
            Signature::nullary(Shape::String),
            NativeFn::new(|ctx: &mut CallContext<'_>| -> Result<(), NativeError> {
                ctx.set_return(Value::from("ready"));
                Ok(())
            }),
        )
    }

    #[test]
    fn entries_are_qualified_and_ordered() {
        let module = Module::from_namespace("a.b.Bridge")
            .function("getEngineStatus", status_meta)
            .declare("probe", Signature::new(vec![Shape::Int], Shape::String));

        assert_eq!(module.len(), 2);
        assert_eq!(module.namespace(), &["a", "b", "Bridge"]);

        let entries = module.entries();
        assert_eq!(entries[0].name().to_string(), "a.b.Bridge.getEngineStatus");
        assert!(entries[0].is_binding());
        assert_eq!(entries[1].name().to_string(), "a.b.Bridge.probe");
        assert!(!entries[1].is_binding());
        assert_eq!(entries[1].signature().params, vec![Shape::Int]);
    }

    #[test]
    fn in_namespace_matches_dotted_form() {
        let a = Module::in_namespace(&["x", "Y"]);
        let b = Module::from_namespace("x.Y");
        assert_eq!(a.namespace(), b.namespace());
        assert!(a.is_empty());
    }
}
