//! Luminance plane geometry and validation.

use ecu_bridge_core::NativeError;
use thiserror::Error;

/// Why a frame was rejected before analysis.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("invalid dimensions: {width}x{height} with stride {stride}")]
    InvalidDimensions { width: i32, height: i32, stride: i32 },

    #[error("stride {stride} is smaller than width {width}")]
    StrideTooSmall { width: usize, stride: usize },

    #[error("buffer too small: {len} bytes, expected at least {expected}")]
    BufferTooSmall { len: usize, expected: usize },

    #[error("valid length {length} is outside a buffer of {capacity} bytes")]
    InvalidLength { length: i32, capacity: usize },

    #[error("image of {width}x{height} is too small for a {grid}x{grid} grid")]
    TooSmallForGrid { width: usize, height: usize, grid: usize },
}

impl From<FrameError> for NativeError {
    fn from(err: FrameError) -> Self {
        NativeError::new(err.to_string())
    }
}

/// Dimensions of a single-byte-per-pixel plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub width: usize,
    pub height: usize,
    /// Bytes between the starts of consecutive rows.
    pub stride: usize,
}

impl Geometry {
    /// Check raw dimensions as they arrive from the managed side.
    pub fn new(width: i32, height: i32, stride: i32) -> Result<Self, FrameError> {
        if width <= 0 || height <= 0 || stride <= 0 {
            return Err(FrameError::InvalidDimensions {
                width,
                height,
                stride,
            });
        }

        let geometry = Self {
            width: width as usize,
            height: height as usize,
            stride: stride as usize,
        };
        if geometry.stride < geometry.width {
            return Err(FrameError::StrideTooSmall {
                width: geometry.width,
                stride: geometry.stride,
            });
        }
        Ok(geometry)
    }

    /// Smallest buffer that holds every row.
    pub fn required_len(&self) -> usize {
        self.height.saturating_mul(self.stride)
    }
}

/// A validated view over a luminance plane.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    data: &'a [u8],
    geometry: Geometry,
}

impl<'a> Frame<'a> {
    pub fn new(data: &'a [u8], width: i32, height: i32, stride: i32) -> Result<Self, FrameError> {
        let geometry = Geometry::new(width, height, stride)?;
        let expected = geometry.required_len();
        if data.len() < expected {
            return Err(FrameError::BufferTooSmall {
                len: data.len(),
                expected,
            });
        }
        Ok(Self { data, geometry })
    }

    /// Like [`Frame::new`], but only the first `length` bytes of `data` are
    /// pixel data.
    pub fn with_length(
        data: &'a [u8],
        length: i32,
        width: i32,
        height: i32,
        stride: i32,
    ) -> Result<Self, FrameError> {
        let valid = usize::try_from(length)
            .ok()
            .filter(|&len| len <= data.len())
            .ok_or(FrameError::InvalidLength {
                length,
                capacity: data.len(),
            })?;
        Self::new(&data[..valid], width, height, stride)
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn width(&self) -> usize {
        self.geometry.width
    }

    pub fn height(&self) -> usize {
        self.geometry.height
    }

    pub fn stride(&self) -> usize {
        self.geometry.stride
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Visible pixels of row `y`, without the stride padding.
    pub fn row(&self, y: usize) -> &'a [u8] {
        let start = y * self.geometry.stride;
        &self.data[start..start + self.geometry.width]
    }
}
