//! Errors reported before a segmentation run touches any buffer

use image::ColorType;

/// Precondition violations for constructing or running a [`Segmenter`](crate::Segmenter)
///
/// Numeric edge cases inside the color math never produce an error.
/// They are clamped to a defined value instead.
#[derive(Debug, thiserror::Error)]
pub enum SegmentError {
	/// The supplied image does not have the dimensions the segmenter was created with
	#[error(
		"image is {actual_width}x{actual_height} but the segmenter expects {expected_width}x{expected_height}"
	)]
	DimensionMismatch {
		/// Width the segmenter was created with
		expected_width: u32,
		/// Height the segmenter was created with
		expected_height: u32,
		/// Width of the supplied image
		actual_width: u32,
		/// Height of the supplied image
		actual_height: u32,
	},

	/// The supplied image does not store one byte per RGB channel
	#[error("unsupported pixel format {0:?}, expected 8-bit RGB or RGBA")]
	UnsupportedPixelFormat(ColorType),

	/// A raw frame declared a pixel size other than 3 (RGB) or 4 (RGBA) bytes
	#[error("unsupported pixel size of {0} bytes, expected 3 (RGB) or 4 (RGBA)")]
	UnsupportedPixelSize(usize),

	/// A raw frame buffer is too short for its declared dimensions and stride
	#[error("frame buffer holds {actual} bytes but {expected} are required")]
	BufferTooSmall {
		/// Minimum number of bytes implied by the dimensions and stride
		expected: usize,
		/// Length of the supplied buffer
		actual: usize,
	},

	/// A raw frame has a row stride shorter than one row of pixels
	#[error("row stride of {stride} bytes is shorter than a row of {row} bytes")]
	StrideTooSmall {
		/// The declared row stride
		stride: usize,
		/// Bytes needed for one row of pixels
		row: usize,
	},

	/// Width or height is zero
	#[error("image dimensions must be non-zero, got {width}x{height}")]
	EmptyGrid {
		/// Requested width
		width: u32,
		/// Requested height
		height: u32,
	},

	/// The number of pixels does not fit in a `u32` label
	#[error("image of {width}x{height} has more than u32::MAX pixels")]
	GridTooLarge {
		/// Requested width
		width: u32,
		/// Requested height
		height: u32,
	},

	/// A configuration value is out of range
	#[error("invalid configuration: {0}")]
	InvalidConfig(String),
}

/// Result type for fallible segmentation operations
pub type Result<T, E = SegmentError> = std::result::Result<T, E>;
