//! ECU engine entry points.
//!
//! Status probes and frame analysis over single-byte luminance planes. The
//! engine's only shared state is its initialisation flag.

use std::sync::atomic::{AtomicBool, Ordering};

use ecu_bridge_core::NativeError;
use ecu_bridge_macros::native;

pub mod focus;
pub mod frame;
pub mod luma;

pub use frame::{Frame, FrameError, Geometry};

static INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Whether [`initialize_engine`] has run in this process.
pub fn is_initialized() -> bool {
    INITIALIZED.load(Ordering::Acquire)
}

// =============================================================================
// STATUS
// =============================================================================

/// Connection probe.
#[native]
pub fn string_from_rust() -> &'static str {
    "ECU Engine: Rust V8 Connected [Optimized]"
}

#[native]
pub fn get_engine_status() -> &'static str {
    "Rust Engine: Ready for ECU Communication"
}

/// Mark the engine initialised. Calling it again is harmless.
#[native]
pub fn initialize_engine() -> &'static str {
    if !INITIALIZED.swap(true, Ordering::AcqRel) {
        log::info!(target: crate::DEFAULT_TAG, "ECU engine initialised");
    }
    "ECU Engine initialized successfully"
}

// =============================================================================
// FRAME ANALYSIS
// =============================================================================

/// Average luminance of a frame delivered in a direct buffer, of which only
/// the first `length` bytes are valid.
#[native]
pub fn analyze_frame(
    buffer: &[u8],
    length: i32,
    width: i32,
    height: i32,
    stride: i32,
) -> Result<String, NativeError> {
    let frame = Frame::with_length(buffer, length, width, height, stride)?;
    Ok(luma_report(&frame))
}

/// Average luminance of a frame delivered as a byte array.
#[native]
pub fn analyze_frame_array(
    data: &[u8],
    width: i32,
    height: i32,
    stride: i32,
) -> Result<String, NativeError> {
    let frame = Frame::new(data, width, height, stride)?;
    Ok(luma_report(&frame))
}

#[native]
pub fn calculate_histogram(
    data: &[u8],
    width: i32,
    height: i32,
    stride: i32,
) -> Result<String, NativeError> {
    let frame = Frame::new(data, width, height, stride)?;
    Ok(luma::histogram_csv(&luma::histogram(&frame)))
}

#[native]
pub fn detect_focus_peaks(
    data: &[u8],
    width: i32,
    height: i32,
    stride: i32,
) -> Result<String, NativeError> {
    let frame = Frame::new(data, width, height, stride)?;
    let peaks = focus::detect_peaks(&frame)?;
    Ok(focus::peaks_csv(&peaks))
}

fn luma_report(frame: &Frame<'_>) -> String {
    format!(
        "LUMA: {} | RES: {}x{} | STRIDE: {}",
        luma::average_luma(frame),
        frame.width(),
        frame.height(),
        frame.stride()
    )
}
