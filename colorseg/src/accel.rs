//! Dispatch of the per-pixel transforms
//!
//! The segmentation pipeline treats "run this transform over every pixel" as a capability
//! provided by an [`Accelerator`]. Each transform writes one output element per pixel
//! and only reads its input buffers, so an implementation is free to evaluate pixels
//! in any order and on any number of workers.
//!
//! [`CpuAccelerator`] is the provided implementation.
//! With the `threads` feature it spreads work across the current rayon thread pool.

use crate::{blur, noise, similarity, LabPixel, SimilarityFlags};
use palette::Srgb;

/// Runs the named per-pixel transforms of the segmentation pipeline
///
/// All buffers passed to one call have exactly `width * height` elements,
/// where `width` and `height` are non-zero.
pub trait Accelerator: Send + Sync {
	/// Blur `pixels` with a fixed 7x7 gaussian kernel into `blurred`, clamping at the edges
	fn gaussian_blur(&self, pixels: &[Srgb<u8>], blurred: &mut [Srgb<u8>], width: usize, height: usize);

	/// Convert each sRGB pixel with channels in `0..=max_value` to a quantized Lab color
	fn rgb_to_lab(&self, pixels: &[Srgb<u8>], lab: &mut [LabPixel], max_value: f32);

	/// Compare each pixel to its four neighbors, marking neighbors within `threshold` as similar
	fn lab_similarity(
		&self,
		lab: &[LabPixel],
		flags: &mut [SimilarityFlags],
		width: usize,
		height: usize,
		threshold: f32,
	);

	/// Apply the local majority filter to `flags`, writing the result to `denoised`
	fn remove_noise(
		&self,
		flags: &[SimilarityFlags],
		denoised: &mut [SimilarityFlags],
		width: usize,
		height: usize,
		threshold: f32,
	);
}

/// Runs each transform on the CPU
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuAccelerator;

/// Fill `output` by evaluating `f` at each index
#[cfg(not(feature = "threads"))]
fn fill_indexed<T: Send>(output: &mut [T], f: impl Fn(usize) -> T + Send + Sync) {
	for (i, out) in output.iter_mut().enumerate() {
		*out = f(i);
	}
}

/// Fill `output` by evaluating `f` at each index
#[cfg(feature = "threads")]
fn fill_indexed<T: Send>(output: &mut [T], f: impl Fn(usize) -> T + Send + Sync) {
	use rayon::prelude::*;

	// Rows of a small image are cheaper to process than to schedule
	const MIN_LEN: usize = 4096;

	output
		.par_iter_mut()
		.with_min_len(MIN_LEN)
		.enumerate()
		.for_each(|(i, out)| *out = f(i));
}

impl Accelerator for CpuAccelerator {
	fn gaussian_blur(&self, pixels: &[Srgb<u8>], blurred: &mut [Srgb<u8>], width: usize, height: usize) {
		fill_indexed(blurred, |i| blur::blur_at(pixels, width, height, i));
	}

	fn rgb_to_lab(&self, pixels: &[Srgb<u8>], lab: &mut [LabPixel], max_value: f32) {
		fill_indexed(lab, |i| crate::lab::rgb_to_lab(pixels[i], max_value));
	}

	fn lab_similarity(
		&self,
		lab: &[LabPixel],
		flags: &mut [SimilarityFlags],
		width: usize,
		height: usize,
		threshold: f32,
	) {
		fill_indexed(flags, |i| similarity::similarity_at(lab, width, height, i, threshold));
	}

	fn remove_noise(
		&self,
		flags: &[SimilarityFlags],
		denoised: &mut [SimilarityFlags],
		width: usize,
		height: usize,
		threshold: f32,
	) {
		fill_indexed(denoised, |i| noise::denoise_at(flags, width, height, i, threshold));
	}
}
