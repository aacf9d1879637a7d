//! Luminance statistics over a frame.

use super::frame::Frame;

/// Rows and columns sampled by [`histogram`].
pub const HISTOGRAM_STEP: usize = 4;

/// Integer mean of every visible pixel.
pub fn average_luma(frame: &Frame<'_>) -> u32 {
    let mut sum: u64 = 0;
    let mut count: u64 = 0;

    for y in 0..frame.height() {
        for &pixel in frame.row(y) {
            sum += u64::from(pixel);
            count += 1;
        }
    }

    if count == 0 { 0 } else { (sum / count) as u32 }
}

/// 256-bin histogram of every [`HISTOGRAM_STEP`]th pixel of every
/// [`HISTOGRAM_STEP`]th row.
pub fn histogram(frame: &Frame<'_>) -> [u32; 256] {
    let mut bins = [0u32; 256];

    for y in (0..frame.height()).step_by(HISTOGRAM_STEP) {
        for &pixel in frame.row(y).iter().step_by(HISTOGRAM_STEP) {
            bins[usize::from(pixel)] += 1;
        }
    }

    bins
}

/// Bin counts as a comma-separated list.
pub fn histogram_csv(bins: &[u32; 256]) -> String {
    bins.iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
