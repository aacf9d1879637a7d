//! Focus peaking over a coarse grid.
//!
//! Each cell counts interior pixels whose gradient
//! `|right - left| + |bottom - top|` exceeds [`EDGE_THRESHOLD`]. A cell with
//! at least [`MIN_EDGES_PER_CELL`] such pixels is in focus.

use super::frame::{Frame, FrameError};

/// Cells per side.
pub const GRID_SIZE: usize = 10;
pub const EDGE_THRESHOLD: i32 = 50;
pub const MIN_EDGES_PER_CELL: usize = 10;

/// Row-major indices (`y * GRID_SIZE + x`) of in-focus cells, ascending.
pub fn detect_peaks(frame: &Frame<'_>) -> Result<Vec<usize>, FrameError> {
    let width = frame.width();
    let height = frame.height();
    let cell_width = width / GRID_SIZE;
    let cell_height = height / GRID_SIZE;

    if cell_width == 0 || cell_height == 0 {
        return Err(FrameError::TooSmallForGrid {
            width,
            height,
            grid: GRID_SIZE,
        });
    }

    let mut peaks = Vec::new();
    for grid_y in 0..GRID_SIZE {
        for grid_x in 0..GRID_SIZE {
            let start_x = grid_x * cell_width;
            let start_y = grid_y * cell_height;
            let end_x = ((grid_x + 1) * cell_width).min(width - 1);
            let end_y = ((grid_y + 1) * cell_height).min(height - 1);

            let edges = count_edges(
                frame,
                start_x + 1..end_x.saturating_sub(1),
                start_y + 1..end_y.saturating_sub(1),
            );
            if edges >= MIN_EDGES_PER_CELL {
                peaks.push(grid_y * GRID_SIZE + grid_x);
            }
        }
    }

    Ok(peaks)
}

fn count_edges(
    frame: &Frame<'_>,
    xs: std::ops::Range<usize>,
    ys: std::ops::Range<usize>,
) -> usize {
    let data = frame.data();
    let stride = frame.stride();
    let mut edges = 0;

    for y in ys {
        for x in xs.clone() {
            let i = y * stride + x;
            if i < stride + 1 || i + stride + 1 >= data.len() {
                continue;
            }

            let gx = (i32::from(data[i + 1]) - i32::from(data[i - 1])).abs();
            let gy = (i32::from(data[i + stride]) - i32::from(data[i - stride])).abs();
            if gx + gy > EDGE_THRESHOLD {
                edges += 1;
            }
        }
    }

    edges
}

/// Indices as a comma-separated list, empty when nothing is in focus.
pub fn peaks_csv(peaks: &[usize]) -> String {
    peaks
        .iter()
        .map(usize::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
