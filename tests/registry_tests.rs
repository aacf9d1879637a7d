//! Registry contract tests.
//!
//! Exercises the bridge registry through the public API: every call yields a
//! value of the declared shape or a typed failure, conflicting bindings never
//! produce a registry, and logging has no effect on results.

use std::sync::{Arc, Mutex};

use ecu_bridge::prelude::*;
use ecu_bridge::{
    BridgeConfig, InvocationError, LogSink, RegistrationError, Severity, engine, exports,
    registry, registry_with,
};

const NS: &str = "id.xms.ecucamera.bridge.NativeBridge";

fn qualified(method: &str) -> String {
    format!("{}.{}", NS, method)
}

#[derive(Default)]
struct RecordingSink {
    records: Mutex<Vec<(Severity, String, String)>>,
}

impl RecordingSink {
    fn records(&self) -> Vec<(Severity, String, String)> {
        self.records.lock().unwrap().clone()
    }
}

impl LogSink for RecordingSink {
    fn log(&self, severity: Severity, tag: &str, message: &str) {
        self.records
            .lock()
            .unwrap()
            .push((severity, tag.to_string(), message.to_string()));
    }
}

fn sample_frame() -> Vec<Value> {
    let data = vec![
        10, 20, 30, 40, 255, 255, //
        50, 60, 70, 80, 255, 255,
    ];
    vec![
        Value::Bytes(data),
        Value::Int(4),
        Value::Int(2),
        Value::Int(6),
    ]
}

// ============================================================================
// Every declared symbol yields a value of its shape or a typed failure
// ============================================================================

#[test]
fn every_symbol_returns_declared_shape_or_failure() {
    let registry = registry().unwrap();

    for symbol in registry.symbols() {
        let name = symbol.name().to_string();
        let args: Vec<Value> = if symbol.signature().arity() == 0 {
            Vec::new()
        } else if symbol.signature().arity() == 4 {
            sample_frame()
        } else {
            let mut args = sample_frame();
            args.insert(1, Value::Int(12));
            args
        };

        match registry.invoke(&name, &args) {
            Ok(value) => assert_eq!(
                value.shape(),
                symbol.signature().returns,
                "{name} returned the wrong shape"
            ),
            Err(err) => assert_eq!(err.symbol(), name),
        }
    }
}

#[test]
fn no_entry_point_returns_a_placeholder() {
    let registry = registry().unwrap();
    for method in exports::native_bridge::SYMBOLS {
        let signature = registry.get(&qualified(method)).unwrap().signature().clone();
        if signature.arity() != 0 {
            continue;
        }
        let value = registry.invoke(&qualified(method), &[]).unwrap();
        let text = value.as_str().unwrap();
        assert!(!text.contains("should override"), "{method}: {text}");
        assert!(!text.starts_with("Error"), "{method}: {text}");
    }
}

#[test]
fn bad_frame_is_a_failure_not_a_string() {
    let err = exports::invoke(
        "analyzeFrameArray",
        &[Value::Bytes(vec![0; 4]), Value::Int(4), Value::Int(4), Value::Int(4)],
    )
    .unwrap_err();

    match err {
        ecu_bridge::BridgeError::Invocation(InvocationError::NativeInvocationFailure {
            symbol,
            message,
        }) => {
            assert_eq!(symbol, qualified("analyzeFrameArray"));
            assert_eq!(message, "buffer too small: 4 bytes, expected at least 16");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn wrong_argument_shape_is_rejected_before_the_call() {
    let err = exports::invoke(
        "analyzeFrameArray",
        &[Value::from("frame"), Value::Int(4), Value::Int(4), Value::Int(4)],
    )
    .unwrap_err();
    assert!(matches!(
        err,
        ecu_bridge::BridgeError::Invocation(InvocationError::ShapeMismatch { .. })
    ));
}

// ============================================================================
// Conflicting bindings are rejected before any call
// ============================================================================

fn other_status_meta() -> NativeMeta {
    NativeMeta::new(
        "other::status",
        Signature::nullary(Shape::String),
        NativeFn::new(|ctx: &mut CallContext<'_>| -> Result<(), NativeError> {
            ctx.set_return(Value::from("other"));
            Ok(())
        }),
    )
}

#[test]
fn second_module_binding_same_symbol_fails_the_build() {
    let result = BridgeConfig::default()
        .builder()
        .install(exports::native_bridge::module())
        .install(Module::from_namespace(NS).function("getEngineStatus", other_status_meta))
        .build();

    let err = result.unwrap_err();
    assert_eq!(
        err,
        RegistrationError::ImplementationConflict {
            symbol: qualified("getEngineStatus"),
            first: "ecu_bridge::engine::get_engine_status".to_string(),
            second: "other::status".to_string(),
        }
    );
    let message = err.to_string();
    assert!(message.contains("ecu_bridge::engine::get_engine_status"));
    assert!(message.contains("other::status"));
}

#[test]
fn conflicting_declaration_fails_the_build() {
    let result = NativeEntryRegistry::builder()
        .install(exports::native_bridge::module())
        .install(
            Module::from_namespace(NS).declare("getEngineStatus", Signature::nullary(Shape::Int)),
        )
        .build();
    assert!(matches!(
        result,
        Err(RegistrationError::SignatureMismatch { .. })
    ));
}

// ============================================================================
// Unbound symbols
// ============================================================================

#[test]
fn unbound_symbol_is_deterministic() {
    let registry = NativeEntryRegistry::builder()
        .install(
            Module::from_namespace(NS)
                .function("getEngineStatus", engine::__bridge_get_engine_status_meta)
                .declare("probeEcu", Signature::new(vec![Shape::String], Shape::String)),
        )
        .build()
        .unwrap();

    let probe = qualified("probeEcu");
    let status = qualified("getEngineStatus");
    let expected = InvocationError::UnboundSymbol {
        symbol: probe.clone(),
    };

    assert_eq!(registry.invoke(&probe, &[Value::from("ecu")]), Err(expected.clone()));
    assert!(registry.invoke(&status, &[]).is_ok());
    assert_eq!(registry.invoke(&probe, &[Value::from("ecu")]), Err(expected.clone()));
    assert_eq!(registry.invoke(&probe, &[]), Err(expected));
}

#[test]
fn undeclared_symbol_is_unbound() {
    let err = registry()
        .unwrap()
        .invoke(&qualified("connectEcu"), &[])
        .unwrap_err();
    assert!(err.is_unbound());
    assert_eq!(err.kind(), "UnboundSymbol");
}

// ============================================================================
// Logging never alters results
// ============================================================================

#[test]
fn logging_enabled_and_disabled_give_identical_results() {
    let sink = Arc::new(RecordingSink::default());
    let logged = NativeEntryRegistry::builder()
        .with_sink(sink.clone())
        .with_min_severity(Severity::Verbose)
        .install(exports::native_bridge::module())
        .build()
        .unwrap();
    let silent = registry_with(&BridgeConfig::default().with_logging(false)).unwrap();

    let calls: Vec<(&str, Vec<Value>)> = vec![
        ("getEngineStatus", vec![]),
        ("getCppBridgeInfo", vec![]),
        ("analyzeFrameArray", sample_frame()),
        ("calculateHistogram", sample_frame()),
        ("detectFocusPeaks", sample_frame()),
        ("analyzeFrameArray", vec![Value::Int(1)]),
        ("missing", vec![]),
    ];

    for (method, args) in &calls {
        for _ in 0..2 {
            assert_eq!(
                logged.invoke(&qualified(method), args),
                silent.invoke(&qualified(method), args),
                "{method}"
            );
        }
    }

    let records = sink.records();
    assert!(records.iter().any(|(s, _, _)| *s == Severity::Debug));
    assert!(records.iter().any(|(s, _, _)| *s == Severity::Error));
    assert!(records.iter().all(|(_, tag, _)| tag == "EcuBridge"));
}

#[test]
fn tag_and_severity_come_from_config() {
    let sink = Arc::new(RecordingSink::default());
    let config = BridgeConfig::new()
        .with_tag("EcuCamera")
        .with_min_severity(Severity::Error);
    let registry = config
        .builder()
        .with_sink(sink.clone())
        .install(exports::native_bridge::module())
        .build()
        .unwrap();

    registry.invoke(&qualified("getEngineStatus"), &[]).unwrap();
    assert!(sink.records().is_empty());

    registry.invoke(&qualified("missing"), &[]).unwrap_err();
    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].0, Severity::Error);
    assert_eq!(records[0].1, "EcuCamera");
}

// ============================================================================
// getEngineStatus, bound and unbound
// ============================================================================

#[test]
fn get_engine_status_bound() {
    let value = registry()
        .unwrap()
        .invoke(&qualified("getEngineStatus"), &[])
        .unwrap();
    assert_eq!(value, Value::from("Rust Engine: Ready for ECU Communication"));
}

#[test]
fn get_engine_status_unbound() {
    let registry = NativeEntryRegistry::builder()
        .install(
            Module::from_namespace(NS)
                .declare("getEngineStatus", Signature::nullary(Shape::String)),
        )
        .build()
        .unwrap();

    assert_eq!(
        registry.invoke(&qualified("getEngineStatus"), &[]),
        Err(InvocationError::UnboundSymbol {
            symbol: qualified("getEngineStatus"),
        })
    );
}
