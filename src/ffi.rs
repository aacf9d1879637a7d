//! JNI entry points for `id.xms.ecucamera.bridge.NativeBridge`.
//!
//! Each export marshals its Java arguments into [`Value`]s, calls the
//! process-wide registry and hands the result back as a `jstring`. A failure
//! throws a Java exception and returns null:
//!
//! | Failure                    | Java exception                       |
//! |----------------------------|--------------------------------------|
//! | `UnboundSymbol`            | `java.lang.UnsatisfiedLinkError`     |
//! | `ShapeMismatch`            | `java.lang.IllegalArgumentException` |
//! | `NativeInvocationFailure`  | `java.lang.RuntimeException`         |
//! | registry construction      | `java.lang.IllegalStateException`    |
//!
//! Rust rejects two `#[no_mangle]` definitions of one name, so each entry
//! point has exactly one export.

use std::ffi::c_void;
use std::ptr;

use jni::JNIEnv;
use jni::objects::{JByteArray, JByteBuffer, JClass};
use jni::sys::{JNI_VERSION_1_6, JavaVM, jint, jstring};

use ecu_bridge_core::{BridgeError, InvocationError, Value};

use crate::exports;

const UNSATISFIED_LINK_ERROR: &str = "java/lang/UnsatisfiedLinkError";
const ILLEGAL_ARGUMENT: &str = "java/lang/IllegalArgumentException";
const ILLEGAL_STATE: &str = "java/lang/IllegalStateException";
const RUNTIME_EXCEPTION: &str = "java/lang/RuntimeException";

/// Java exception class thrown for `err`.
pub fn exception_class(err: &BridgeError) -> &'static str {
    match err {
        BridgeError::Registration(_) => ILLEGAL_STATE,
        BridgeError::Invocation(InvocationError::UnboundSymbol { .. }) => UNSATISFIED_LINK_ERROR,
        BridgeError::Invocation(InvocationError::ShapeMismatch { .. }) => ILLEGAL_ARGUMENT,
        BridgeError::Invocation(InvocationError::NativeInvocationFailure { .. }) => {
            RUNTIME_EXCEPTION
        }
    }
}

/// Invoke `method` and convert the outcome for the JVM.
fn call(env: &mut JNIEnv<'_>, method: &str, args: jni::errors::Result<Vec<Value>>) -> jstring {
    let args = match args {
        Ok(args) => args,
        Err(err) => {
            if !exception_pending(&err) {
                throw(env, ILLEGAL_ARGUMENT, &format!("{}: cannot read arguments: {}", method, err));
            }
            return ptr::null_mut();
        }
    };

    match exports::invoke(method, &args) {
        Ok(Value::String(text)) => match env.new_string(text) {
            Ok(string) => string.into_raw(),
            Err(err) => {
                throw(env, RUNTIME_EXCEPTION, &format!("{}: cannot create string: {}", method, err));
                ptr::null_mut()
            }
        },
        Ok(other) => {
            throw(
                env,
                ILLEGAL_STATE,
                &format!("{} returned {} where a string is expected", method, other.shape()),
            );
            ptr::null_mut()
        }
        Err(err) => {
            throw(env, exception_class(&err), &err.to_string());
            ptr::null_mut()
        }
    }
}

/// Whether `err` left a Java exception pending in the calling thread.
fn exception_pending(err: &jni::errors::Error) -> bool {
    matches!(err, jni::errors::Error::JavaException)
}

/// Throw `class` unless an exception is already pending, which then propagates.
fn throw(env: &mut JNIEnv<'_>, class: &str, message: &str) {
    if env.exception_check().unwrap_or(true) {
        log::error!(target: crate::DEFAULT_TAG, "exception already pending, dropping {}: {}", class, message);
        return;
    }
    if let Err(err) = env.throw_new(class, message) {
        log::error!(target: crate::DEFAULT_TAG, "failed to throw {}: {} ({})", class, message, err);
    }
}

fn read_byte_array(env: &JNIEnv<'_>, array: &JByteArray<'_>) -> jni::errors::Result<Value> {
    Ok(Value::Bytes(env.convert_byte_array(array)?))
}

fn read_direct_buffer(env: &JNIEnv<'_>, buffer: &JByteBuffer<'_>) -> jni::errors::Result<Value> {
    let address = env.get_direct_buffer_address(buffer)?;
    let capacity = env.get_direct_buffer_capacity(buffer)?;
    // SAFETY: a direct buffer's memory stays valid and pinned while the
    // buffer object is live, which covers this native call.
    let bytes = unsafe { std::slice::from_raw_parts(address, capacity) };
    Ok(Value::Bytes(bytes.to_vec()))
}

/// Frame arguments shared by the array-based analysis entry points.
fn frame_args(
    env: &JNIEnv<'_>,
    data: &JByteArray<'_>,
    width: jint,
    height: jint,
    stride: jint,
) -> jni::errors::Result<Vec<Value>> {
    Ok(vec![
        read_byte_array(env, data)?,
        Value::Int(width),
        Value::Int(height),
        Value::Int(stride),
    ])
}

// =============================================================================
// LIFECYCLE
// =============================================================================

/// Called by the JVM when the library is loaded.
#[unsafe(no_mangle)]
pub extern "system" fn JNI_OnLoad(_vm: *mut JavaVM, _reserved: *mut c_void) -> jint {
    let config = crate::BridgeConfig::default();
    crate::logging::init(&config);

    match exports::registry() {
        Ok(registry) => {
            log::info!(target: config.tag(), "native bridge loaded with {} symbols", registry.len())
        }
        Err(err) => log::error!(target: config.tag(), "native bridge failed to build: {}", err),
    }

    JNI_VERSION_1_6
}

// =============================================================================
// ENTRY POINTS
// =============================================================================

#[unsafe(no_mangle)]
pub extern "system" fn Java_id_xms_ecucamera_bridge_NativeBridge_stringFromRust<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
) -> jstring {
    call(&mut env, "stringFromRust", Ok(Vec::new()))
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_id_xms_ecucamera_bridge_NativeBridge_getEngineStatus<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
) -> jstring {
    call(&mut env, "getEngineStatus", Ok(Vec::new()))
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_id_xms_ecucamera_bridge_NativeBridge_initializeEngine<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
) -> jstring {
    call(&mut env, "initializeEngine", Ok(Vec::new()))
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_id_xms_ecucamera_bridge_NativeBridge_getCppBridgeInfo<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
) -> jstring {
    call(&mut env, "getCppBridgeInfo", Ok(Vec::new()))
}

/// `analyzeFrame(ByteBuffer buffer, int length, int width, int height, int stride)`
#[unsafe(no_mangle)]
pub extern "system" fn Java_id_xms_ecucamera_bridge_NativeBridge_analyzeFrame<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    buffer: JByteBuffer<'local>,
    length: jint,
    width: jint,
    height: jint,
    stride: jint,
) -> jstring {
    let args = read_direct_buffer(&env, &buffer).map(|bytes| {
        vec![
            bytes,
            Value::Int(length),
            Value::Int(width),
            Value::Int(height),
            Value::Int(stride),
        ]
    });
    call(&mut env, "analyzeFrame", args)
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_id_xms_ecucamera_bridge_NativeBridge_analyzeFrameArray<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    data: JByteArray<'local>,
    width: jint,
    height: jint,
    stride: jint,
) -> jstring {
    let args = frame_args(&env, &data, width, height, stride);
    call(&mut env, "analyzeFrameArray", args)
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_id_xms_ecucamera_bridge_NativeBridge_calculateHistogram<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    data: JByteArray<'local>,
    width: jint,
    height: jint,
    stride: jint,
) -> jstring {
    let args = frame_args(&env, &data, width, height, stride);
    call(&mut env, "calculateHistogram", args)
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_id_xms_ecucamera_bridge_NativeBridge_detectFocusPeaks<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    data: JByteArray<'local>,
    width: jint,
    height: jint,
    stride: jint,
) -> jstring {
    let args = frame_args(&env, &data, width, height, stride);
    call(&mut env, "detectFocusPeaks", args)
}
