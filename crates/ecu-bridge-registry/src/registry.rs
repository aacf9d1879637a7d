//! NativeEntryRegistry - the symbol table behind the exported entry points.
//!
//! # Lifecycle
//!
//! - **Build phase**: native modules are installed into a [`RegistryBuilder`].
//!   [`RegistryBuilder::build`] checks that every symbol has at most one
//!   implementation and a single signature. Any conflict is a
//!   [`RegistrationError`] and no registry is produced, so a conflicting table
//!   can never serve a call.
//!
//! - **Call phase**: the built [`NativeEntryRegistry`] is immutable. It is
//!   `Send + Sync` and holds no locks; callers on any thread can share it.
//!   State an implementation needs across calls belongs to the implementation.
//!
//! # Example
//!
//! ```ignore
//! let registry = NativeEntryRegistry::builder()
//!     .install(engine_module())
//!     .install(bridge_info_module())
//!     .build()?;
//!
//! let status = registry.invoke("id.xms.ecucamera.bridge.NativeBridge.getEngineStatus", &[])?;
//! ```

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use rustc_hash::FxHashMap;

use ecu_bridge_core::{
    CallContext, ExportedSymbol, InvocationError, InvocationResult, LogFacadeSink, LogSink,
    NativeFn, RegistrationError, Severity, Signature, SymbolName, Value,
};

use crate::module::{Module, ModuleEntry};

/// Default tag for diagnostic records.
pub const DEFAULT_TAG: &str = "EcuBridge";

/// An implementation bound to a symbol.
#[derive(Debug, Clone)]
struct Binding {
    origin: &'static str,
    native_fn: NativeFn,
}

#[derive(Debug, Clone)]
struct Entry {
    symbol: ExportedSymbol,
    binding: Option<Binding>,
}

/// Work-in-progress slot used while validating modules.
struct PendingEntry {
    name: SymbolName,
    signature: Signature,
    binding: Option<Binding>,
}

// ============================================================================
// Builder
// ============================================================================

/// Collects native modules and validates them into a [`NativeEntryRegistry`].
pub struct RegistryBuilder {
    modules: Vec<Module>,
    sink: Arc<dyn LogSink>,
    tag: String,
    min_severity: Severity,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self {
            modules: Vec::new(),
            sink: Arc::new(LogFacadeSink),
            tag: DEFAULT_TAG.to_string(),
            min_severity: Severity::Info,
        }
    }

    /// Replace the logging collaborator.
    pub fn with_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Records below this severity are not emitted.
    pub fn with_min_severity(mut self, severity: Severity) -> Self {
        self.min_severity = severity;
        self
    }

    /// Add a native module. Modules are validated in installation order.
    pub fn install(mut self, module: Module) -> Self {
        self.modules.push(module);
        self
    }

    /// Validate all installed modules and freeze them into a registry.
    pub fn build(self) -> Result<NativeEntryRegistry, RegistrationError> {
        let mut pending: FxHashMap<String, PendingEntry> = FxHashMap::default();

        for entry in self.modules.into_iter().flat_map(Module::into_entries) {
            validate_entry(&entry)?;
            let key = entry.name().to_string();

            match entry {
                ModuleEntry::Binding { name, meta } => {
                    let binding = Binding {
                        origin: meta.origin,
                        native_fn: meta.native_fn,
                    };
                    match pending.get_mut(&key) {
                        Some(existing) => {
                            if let Some(first) = &existing.binding {
                                return Err(RegistrationError::ImplementationConflict {
                                    symbol: key,
                                    first: first.origin.to_string(),
                                    second: binding.origin.to_string(),
                                });
                            }
                            if existing.signature != meta.signature {
                                return Err(RegistrationError::SignatureMismatch {
                                    symbol: key,
                                    declared: existing.signature.clone(),
                                    bound: meta.signature,
                                });
                            }
                            existing.binding = Some(binding);
                        }
                        None => {
                            pending.insert(
                                key,
                                PendingEntry {
                                    name,
                                    signature: meta.signature,
                                    binding: Some(binding),
                                },
                            );
                        }
                    }
                }
                ModuleEntry::Declaration { name, signature } => match pending.get(&key) {
                    Some(existing) if existing.signature != signature => {
                        return Err(RegistrationError::SignatureMismatch {
                            symbol: key,
                            declared: signature,
                            bound: existing.signature.clone(),
                        });
                    }
                    // Identical re-declarations merge.
                    Some(_) => {}
                    None => {
                        pending.insert(
                            key,
                            PendingEntry {
                                name,
                                signature,
                                binding: None,
                            },
                        );
                    }
                },
            }
        }

        let entries: FxHashMap<String, Entry> = pending
            .into_iter()
            .map(|(key, p)| {
                (
                    key,
                    Entry {
                        symbol: ExportedSymbol::new(p.name, p.signature),
                        binding: p.binding,
                    },
                )
            })
            .collect();

        let registry = NativeEntryRegistry {
            entries,
            sink: self.sink,
            tag: self.tag,
            min_severity: self.min_severity,
        };

        let bound = registry.entries.values().filter(|e| e.binding.is_some()).count();
        registry.emit(Severity::Info, || {
            format!(
                "registered {} symbols ({} bound, {} unbound)",
                registry.len(),
                bound,
                registry.len() - bound
            )
        });
        for symbol in registry.symbols() {
            if !registry.is_bound(&symbol.name().to_string()) {
                registry.emit(Severity::Debug, || format!("{} has no implementation", symbol));
            }
        }

        Ok(registry)
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_entry(entry: &ModuleEntry) -> Result<(), RegistrationError> {
    let name = entry.name();
    if name.simple_name().is_empty() {
        return Err(RegistrationError::InvalidSignature {
            symbol: name.to_string(),
            reason: "symbol name is empty".to_string(),
        });
    }
    if let Some(index) = entry
        .signature()
        .params
        .iter()
        .position(|shape| !shape.is_valid_param())
    {
        return Err(RegistrationError::InvalidSignature {
            symbol: name.to_string(),
            reason: format!("parameter {} has shape void", index),
        });
    }
    Ok(())
}

// ============================================================================
// Registry
// ============================================================================

/// Immutable mapping from exported symbol names to implementations.
pub struct NativeEntryRegistry {
    entries: FxHashMap<String, Entry>,
    sink: Arc<dyn LogSink>,
    tag: String,
    min_severity: Severity,
}

impl NativeEntryRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Call `name` with `args`.
    ///
    /// The result is produced entirely by the lookup, the shape checks and the
    /// implementation. Diagnostic records go to the sink after the outcome is
    /// decided.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn invoke(&self, name: &str, args: &[Value]) -> InvocationResult {
        let result = self.dispatch(name, args);
        if let Err(err) = &result {
            self.emit(Severity::Error, || err.to_string());
        }
        result
    }

    /// Call by [`SymbolName`].
    pub fn invoke_symbol(&self, name: &SymbolName, args: &[Value]) -> InvocationResult {
        self.invoke(&name.to_string(), args)
    }

    fn dispatch(&self, name: &str, args: &[Value]) -> InvocationResult {
        let unbound = || InvocationError::UnboundSymbol {
            symbol: name.to_string(),
        };
        let entry = self.entries.get(name).ok_or_else(unbound)?;
        let binding = entry.binding.as_ref().ok_or_else(unbound)?;
        let signature = entry.symbol.signature();

        check_args(name, signature, args)?;

        self.emit(Severity::Debug, || {
            format!("invoking {} via {}", name, binding.origin)
        });

        let mut ctx = CallContext::new(args);
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| binding.native_fn.call(&mut ctx)));
        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                return Err(InvocationError::NativeInvocationFailure {
                    symbol: name.to_string(),
                    message: err.message,
                });
            }
            Err(payload) => {
                return Err(InvocationError::NativeInvocationFailure {
                    symbol: name.to_string(),
                    message: format!("implementation panicked: {}", panic_message(&*payload)),
                });
            }
        }

        let value = ctx.take_return();
        if value.shape() != signature.returns {
            return Err(InvocationError::ShapeMismatch {
                symbol: name.to_string(),
                detail: format!(
                    "implementation returned {} but {} is declared",
                    value.shape(),
                    signature.returns
                ),
            });
        }
        Ok(value)
    }

    /// Look up a symbol by its dotted name.
    pub fn get(&self, name: &str) -> Option<&ExportedSymbol> {
        self.entries.get(name).map(|e| &e.symbol)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Whether `name` is declared and has an implementation.
    pub fn is_bound(&self, name: &str) -> bool {
        self.entries
            .get(name)
            .is_some_and(|e| e.binding.is_some())
    }

    /// Rust path of the implementation bound to `name`.
    pub fn origin(&self, name: &str) -> Option<&'static str> {
        self.entries
            .get(name)
            .and_then(|e| e.binding.as_ref())
            .map(|b| b.origin)
    }

    /// All symbols, sorted by name.
    pub fn symbols(&self) -> Vec<&ExportedSymbol> {
        let mut symbols: Vec<_> = self.entries.values().map(|e| &e.symbol).collect();
        symbols.sort_by(|a, b| a.name().cmp(b.name()));
        symbols
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// A panicking sink is contained here and the record is lost.
    fn emit(&self, severity: Severity, message: impl FnOnce() -> String) {
        if severity >= self.min_severity {
            let _ = panic::catch_unwind(AssertUnwindSafe(|| {
                self.sink.log(severity, &self.tag, &message());
            }));
        }
    }
}

impl std::fmt::Debug for NativeEntryRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeEntryRegistry")
            .field("symbols", &self.len())
            .field("tag", &self.tag)
            .field("min_severity", &self.min_severity)
            .finish_non_exhaustive()
    }
}

fn check_args(name: &str, signature: &Signature, args: &[Value]) -> Result<(), InvocationError> {
    if args.len() != signature.arity() {
        return Err(InvocationError::ShapeMismatch {
            symbol: name.to_string(),
            detail: format!(
                "expected {} arguments, got {}",
                signature.arity(),
                args.len()
            ),
        });
    }
    for (index, (arg, expected)) in args.iter().zip(&signature.params).enumerate() {
        if arg.shape() != *expected {
            return Err(InvocationError::ShapeMismatch {
                symbol: name.to_string(),
                detail: format!(
                    "argument {} is {} but {} is declared",
                    index,
                    arg.shape(),
                    expected
                ),
            });
        }
    }
    Ok(())
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "non-string panic payload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecu_bridge_core::{NativeError, NativeMeta, NullSink, Shape};
    use std::sync::Mutex;

    const NS: &str = "id.xms.ecucamera.bridge.NativeBridge";

    fn returning(origin: &'static str, value: Value, returns: Shape) -> NativeMeta {
        NativeMeta::new(
            origin,
            Signature::nullary(returns),
            NativeFn::new(move |ctx: &mut CallContext<'_>| -> Result<(), NativeError> {
                ctx.set_return(value.clone());
                Ok(())
            }),
        )
    }

    fn status_a() -> NativeMeta {
        returning("engine::get_engine_status", Value::from("ready"), Shape::String)
    }

    fn status_b() -> NativeMeta {
        returning("bridge_info::get_engine_status", Value::from("stub"), Shape::String)
    }

    fn name(method: &str) -> String {
        format!("{NS}.{method}")
    }

    #[derive(Default)]
    struct RecordingSink {
        records: Mutex<Vec<(Severity, String, String)>>,
    }

    impl LogSink for RecordingSink {
        fn log(&self, severity: Severity, tag: &str, message: &str) {
            self.records
                .lock()
                .unwrap()
                .push((severity, tag.to_string(), message.to_string()));
        }
    }

    #[test]
    fn bound_symbol_returns_value() {
        let registry = NativeEntryRegistry::builder()
            .install(Module::from_namespace(NS).function("getEngineStatus", status_a))
            .build()
            .unwrap();

        assert_eq!(
            registry.invoke(&name("getEngineStatus"), &[]),
            Ok(Value::from("ready"))
        );
        assert_eq!(
            registry.origin(&name("getEngineStatus")),
            Some("engine::get_engine_status")
        );
    }

    #[test]
    fn duplicate_binding_across_modules_is_rejected() {
        let err = NativeEntryRegistry::builder()
            .install(Module::from_namespace(NS).function("getEngineStatus", status_a))
            .install(Module::from_namespace(NS).function("getEngineStatus", status_b))
            .build()
            .unwrap_err();

        assert_eq!(
            err,
            RegistrationError::ImplementationConflict {
                symbol: name("getEngineStatus"),
                first: "engine::get_engine_status".to_string(),
                second: "bridge_info::get_engine_status".to_string(),
            }
        );
    }

    #[test]
    fn declaration_then_binding_merges() {
        let registry = NativeEntryRegistry::builder()
            .install(Module::from_namespace(NS).declare("getEngineStatus", Signature::nullary(Shape::String)))
            .install(Module::from_namespace(NS).function("getEngineStatus", status_a))
            .build()
            .unwrap();
        assert!(registry.is_bound(&name("getEngineStatus")));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn declaration_with_other_signature_is_rejected() {
        let err = NativeEntryRegistry::builder()
            .install(Module::from_namespace(NS).function("getEngineStatus", status_a))
            .install(
                Module::from_namespace(NS)
                    .declare("getEngineStatus", Signature::new(vec![Shape::Int], Shape::String)),
            )
            .build()
            .unwrap_err();

        assert!(matches!(err, RegistrationError::SignatureMismatch { .. }));
    }

    #[test]
    fn void_parameter_is_rejected() {
        let err = NativeEntryRegistry::builder()
            .install(Module::from_namespace(NS).declare("bad", Signature::new(vec![Shape::Void], Shape::Void)))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            RegistrationError::InvalidSignature {
                symbol: name("bad"),
                reason: "parameter 0 has shape void".to_string(),
            }
        );
    }

    #[test]
    fn unbound_and_unknown_symbols() {
        let registry = NativeEntryRegistry::builder()
            .install(Module::from_namespace(NS).declare("getEngineStatus", Signature::nullary(Shape::String)))
            .build()
            .unwrap();

        for _ in 0..3 {
            let err = registry.invoke(&name("getEngineStatus"), &[]).unwrap_err();
            assert!(err.is_unbound());
            let err = registry.invoke(&name("neverDeclared"), &[]).unwrap_err();
            assert!(err.is_unbound());
        }
    }

    #[test]
    fn argument_shapes_are_checked() {
        let registry = NativeEntryRegistry::builder()
            .install(Module::from_namespace(NS).function("getEngineStatus", status_a))
            .build()
            .unwrap();

        let err = registry
            .invoke(&name("getEngineStatus"), &[Value::Int(1)])
            .unwrap_err();
        assert_eq!(
            err,
            InvocationError::ShapeMismatch {
                symbol: name("getEngineStatus"),
                detail: "expected 0 arguments, got 1".to_string(),
            }
        );
    }

    #[test]
    fn wrong_return_shape_is_not_passed_through() {
        // Declares a string return but produces an int.
        let meta = returning("tests::liar", Value::Int(3), Shape::String);
        let registry = NativeEntryRegistry::builder()
            .install(Module::from_namespace(NS).function_meta("liar", meta))
            .build()
            .unwrap();

        let err = registry.invoke(&name("liar"), &[]).unwrap_err();
        assert_eq!(err.kind(), "ShapeMismatch");
    }

    #[test]
    fn native_failure_and_panic_surface_as_failure() {
        let failing = NativeMeta::new(
            "tests::failing",
            Signature::nullary(Shape::String),
            NativeFn::new(|_: &mut CallContext<'_>| -> Result<(), NativeError> {
                Err(NativeError::new("sensor offline"))
            }),
        );
        let panicking = NativeMeta::new(
            "tests::panicking",
            Signature::nullary(Shape::String),
            NativeFn::new(|_: &mut CallContext<'_>| -> Result<(), NativeError> {
                panic!("bad frame")
            }),
        );
        let registry = NativeEntryRegistry::builder()
            .with_sink(Arc::new(NullSink))
            .install(
                Module::from_namespace(NS)
                    .function_meta("failing", failing)
                    .function_meta("panicking", panicking),
            )
            .build()
            .unwrap();

        assert_eq!(
            registry.invoke(&name("failing"), &[]),
            Err(InvocationError::NativeInvocationFailure {
                symbol: name("failing"),
                message: "sensor offline".to_string(),
            })
        );
        assert_eq!(
            registry.invoke(&name("panicking"), &[]),
            Err(InvocationError::NativeInvocationFailure {
                symbol: name("panicking"),
                message: "implementation panicked: bad frame".to_string(),
            })
        );
    }

    #[test]
    fn diagnostics_respect_min_severity() {
        let sink = Arc::new(RecordingSink::default());
        let registry = NativeEntryRegistry::builder()
            .with_sink(sink.clone())
            .with_tag("Test")
            .with_min_severity(Severity::Debug)
            .install(Module::from_namespace(NS).function("getEngineStatus", status_a))
            .build()
            .unwrap();

        registry.invoke(&name("getEngineStatus"), &[]).unwrap();
        registry.invoke(&name("missing"), &[]).unwrap_err();

        let records = sink.records.lock().unwrap();
        assert!(records.iter().all(|(_, tag, _)| tag == "Test"));
        assert!(records.iter().any(|(sev, _, msg)| *sev == Severity::Info
            && msg == "registered 1 symbols (1 bound, 0 unbound)"));
        assert!(records.iter().any(|(sev, _, msg)| *sev == Severity::Debug
            && msg.starts_with("invoking ")));
        assert!(records.iter().any(|(sev, _, msg)| *sev == Severity::Error
            && msg.contains("unbound symbol")));
    }

    #[test]
    fn debug_records_filtered_by_default() {
        let sink = Arc::new(RecordingSink::default());
        let registry = NativeEntryRegistry::builder()
            .with_sink(sink.clone())
            .install(Module::from_namespace(NS).function("getEngineStatus", status_a))
            .build()
            .unwrap();
        registry.invoke(&name("getEngineStatus"), &[]).unwrap();

        let records = sink.records.lock().unwrap();
        assert!(records.iter().all(|(sev, _, _)| *sev >= Severity::Info));
    }

    struct PanickingSink;

    impl LogSink for PanickingSink {
        fn log(&self, severity: Severity, _tag: &str, message: &str) {
            if severity <= Severity::Debug || severity == Severity::Error {
                panic!("sink failed on {message}");
            }
        }
    }

    #[test]
    fn panicking_sink_does_not_change_results() {
        let build = |sink: Arc<dyn LogSink>| {
            NativeEntryRegistry::builder()
                .with_sink(sink)
                .with_min_severity(Severity::Verbose)
                .install(
                    Module::from_namespace(NS)
                        .function("getEngineStatus", status_a)
                        .declare("connectEcu", Signature::nullary(Shape::String)),
                )
                .build()
                .unwrap()
        };
        let logged = build(Arc::new(PanickingSink));
        let silent = build(Arc::new(NullSink));

        for method in ["getEngineStatus", "connectEcu", "missing"] {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                logged.invoke(&name(method), &[])
            }));
            assert_eq!(outcome.ok(), Some(silent.invoke(&name(method), &[])), "{method}");
        }
    }

    #[test]
    fn symbols_are_sorted() {
        let registry = NativeEntryRegistry::builder()
            .install(
                Module::from_namespace(NS)
                    .declare("zeta", Signature::nullary(Shape::Void))
                    .declare("alpha", Signature::nullary(Shape::Void)),
            )
            .build()
            .unwrap();
        let names: Vec<_> = registry
            .symbols()
            .iter()
            .map(|s| s.name().simple_name().to_string())
            .collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }

    #[test]
    fn registry_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<NativeEntryRegistry>();
    }
}
