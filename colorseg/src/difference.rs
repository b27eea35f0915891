//! The CIE94 color difference

use crate::LabPixel;
use palette::Lab;

/// Chroma weighting for the graphic arts application of CIE94
pub const K1: f32 = 0.045;
/// Hue weighting for the graphic arts application of CIE94
pub const K2: f32 = 0.015;

/// CIE94 color difference between a reference color and a sample
///
/// The chroma and hue weights are derived from the chroma of `reference`,
/// so swapping the arguments only gives the same result when both colors have equal chroma.
///
/// Negative values under a square root, which can appear through floating point cancellation
/// for nearly achromatic colors, are clamped to zero.
#[must_use]
pub fn cie94(reference: Lab, sample: Lab) -> f32 {
	let c1 = reference.a.hypot(reference.b);
	let c2 = sample.a.hypot(sample.b);
	let delta_c = c1 - c2;

	let delta_l = reference.l - sample.l;
	let delta_a = reference.a - sample.a;
	let delta_b = reference.b - sample.b;
	let delta_h = (delta_a * delta_a + delta_b * delta_b - delta_c * delta_c)
		.max(0.0)
		.sqrt();

	let sl = 1.0;
	let sc = 1.0 + K1 * c1;
	let sh = 1.0 + K2 * c1;

	let l = delta_l / sl;
	let c = delta_c / sc;
	let h = delta_h / sh;

	(l * l + c * c + h * h).max(0.0).sqrt()
}

impl LabPixel {
	/// CIE94 color difference from `self` to `other`, using `self` as the reference
	#[must_use]
	pub fn distance(self, other: Self) -> f32 {
		cie94(self.to_lab(), other.to_lab())
	}
}
