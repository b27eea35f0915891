//! Borrowed view over raw interleaved 8-bit pixel data

use crate::{Result, SegmentError};
use image::RgbImage;
use palette::Srgb;

/// Raw RGB or RGBA pixel rows, possibly padded at the end of each row
///
/// Alpha is ignored.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
	/// Pixel bytes, `height` rows of `stride` bytes (the last row may omit its padding)
	data: &'a [u8],
	/// Number of pixels per row
	width: u32,
	/// Number of rows
	height: u32,
	/// Bytes from the start of one row to the start of the next
	stride: usize,
	/// Either 3 or 4
	bytes_per_pixel: usize,
}

impl<'a> Frame<'a> {
	/// Create a frame over `data`, checking that it is large enough.
	///
	/// # Errors
	/// - [`SegmentError::UnsupportedPixelSize`] if `bytes_per_pixel` is not 3 or 4
	/// - [`SegmentError::EmptyGrid`] if `width` or `height` is zero
	/// - [`SegmentError::StrideTooSmall`] if `stride` cannot hold one row of pixels
	/// - [`SegmentError::BufferTooSmall`] if `data` ends before the last pixel,
	///   or if the layout's size does not fit in a `usize`
	pub fn new(data: &'a [u8], width: u32, height: u32, stride: usize, bytes_per_pixel: usize) -> Result<Self> {
		if !matches!(bytes_per_pixel, 3 | 4) {
			return Err(SegmentError::UnsupportedPixelSize(bytes_per_pixel));
		}

		if width == 0 || height == 0 {
			return Err(SegmentError::EmptyGrid { width, height });
		}

		let row = width as usize * bytes_per_pixel;
		if stride < row {
			return Err(SegmentError::StrideTooSmall { stride, row });
		}

		// A layout whose size overflows cannot fit in any buffer
		let expected = (height as usize - 1)
			.checked_mul(stride)
			.and_then(|start| start.checked_add(row))
			.unwrap_or(usize::MAX);

		if data.len() < expected {
			return Err(SegmentError::BufferTooSmall { expected, actual: data.len() });
		}

		Ok(Self { data, width, height, stride, bytes_per_pixel })
	}

	/// Create a frame over tightly packed RGB rows
	///
	/// # Errors
	/// See [`Frame::new`].
	pub fn packed_rgb(data: &'a [u8], width: u32, height: u32) -> Result<Self> {
		Self::new(data, width, height, width as usize * 3, 3)
	}

	/// Create a frame over tightly packed RGBA rows
	///
	/// # Errors
	/// See [`Frame::new`].
	pub fn packed_rgba(data: &'a [u8], width: u32, height: u32) -> Result<Self> {
		Self::new(data, width, height, width as usize * 4, 4)
	}

	/// The number of pixels per row
	#[must_use]
	pub const fn width(&self) -> u32 {
		self.width
	}

	/// The number of rows
	#[must_use]
	pub const fn height(&self) -> u32 {
		self.height
	}

	/// The number of bytes between the start of consecutive rows
	#[must_use]
	pub const fn stride(&self) -> usize {
		self.stride
	}

	/// The number of bytes per pixel, 3 or 4
	#[must_use]
	pub const fn bytes_per_pixel(&self) -> usize {
		self.bytes_per_pixel
	}

	/// Iterate over the pixels in raster order
	pub fn pixels(&self) -> impl Iterator<Item = Srgb<u8>> + 'a {
		let row = self.width as usize * self.bytes_per_pixel;
		let Self { data, stride, bytes_per_pixel, .. } = *self;
		(0..self.height as usize).flat_map(move |y| {
			let start = y * stride;
			data[start..start + row]
				.chunks_exact(bytes_per_pixel)
				.map(|pixel| Srgb::new(pixel[0], pixel[1], pixel[2]))
		})
	}

	/// Copy the pixels in raster order into `out`, which must hold exactly `width * height` colors
	pub(crate) fn copy_into(&self, out: &mut [Srgb<u8>]) {
		debug_assert_eq!(out.len(), self.width as usize * self.height as usize);
		for (out, pixel) in out.iter_mut().zip(self.pixels()) {
			*out = pixel;
		}
	}
}

impl<'a> From<&'a RgbImage> for Frame<'a> {
	fn from(image: &'a RgbImage) -> Self {
		let (width, height) = image.dimensions();
		Self {
			data: image.as_raw(),
			width,
			height,
			stride: width as usize * 3,
			bytes_per_pixel: 3,
		}
	}
}
