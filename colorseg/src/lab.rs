//! Conversion from sRGB to the quantized Lab colors used for segmentation

use palette::{Lab, Srgb};

/// The maximum channel value of 8-bit sRGB colors
pub const CHANNEL_MAX: f32 = 255.0;

/// Reference white (D65, 2° observer) used to normalize XYZ
const WHITE: [f32; 3] = [0.95047, 1.0, 1.08883];

/// Linear sRGB to CIE XYZ
const RGB_TO_XYZ: [[f32; 3]; 3] = [
	[0.4124, 0.3576, 0.1805],
	[0.2126, 0.7152, 0.0722],
	[0.0193, 0.1192, 0.9505],
];

/// A Lab color with each channel rounded and clamped to a signed byte
///
/// Clamping bounds the memory per pixel but loses accuracy for extreme chroma,
/// since `a` and `b` of saturated sRGB colors can reach just past `-128`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LabPixel {
	/// Lightness
	pub l: i8,
	/// Green-red axis
	pub a: i8,
	/// Blue-yellow axis
	pub b: i8,
}

impl LabPixel {
	/// Create a [`LabPixel`] from its channels
	#[must_use]
	pub const fn new(l: i8, a: i8, b: i8) -> Self {
		Self { l, a, b }
	}

	/// Convert an 8-bit sRGB color
	#[must_use]
	pub fn from_srgb(color: Srgb<u8>) -> Self {
		rgb_to_lab(color, CHANNEL_MAX)
	}

	/// Widen to a floating point [`Lab`] color for color difference
	#[must_use]
	pub fn to_lab(self) -> Lab {
		Lab::new(f32::from(self.l), f32::from(self.a), f32::from(self.b))
	}
}

impl From<Srgb<u8>> for LabPixel {
	fn from(color: Srgb<u8>) -> Self {
		Self::from_srgb(color)
	}
}

/// Undo the sRGB transfer function for a channel in `0.0..=1.0`
fn srgb_to_linear(channel: f32) -> f32 {
	if channel > 0.04045 {
		((channel + 0.055) / 1.055).powf(2.4)
	} else {
		channel / 12.92
	}
}

/// The piecewise cube root used by the Lab transfer function
fn lab_f(t: f32) -> f32 {
	if t > 0.008856 {
		t.cbrt()
	} else {
		7.787 * t + 4.0 / 29.0
	}
}

/// Round to the nearest integer and clamp into the range of an `i8`
fn quantize(value: f32) -> i8 {
	// clamped into range above, NaN saturates to 0
	#[allow(clippy::cast_possible_truncation)]
	{
		value.round().clamp(-128.0, 127.0) as i8
	}
}

/// Convert an sRGB color with channels in `0..=max_value` to a quantized Lab color
#[must_use]
pub fn rgb_to_lab(color: Srgb<u8>, max_value: f32) -> LabPixel {
	let rgb = [
		srgb_to_linear(f32::from(color.red) / max_value),
		srgb_to_linear(f32::from(color.green) / max_value),
		srgb_to_linear(f32::from(color.blue) / max_value),
	];

	let [fx, fy, fz] = std::array::from_fn(|i| {
		let row = RGB_TO_XYZ[i];
		let xyz = row[0] * rgb[0] + row[1] * rgb[1] + row[2] * rgb[2];
		lab_f(xyz / WHITE[i])
	});

	LabPixel {
		l: quantize(116.0 * fy - 16.0),
		a: quantize(500.0 * (fx - fy)),
		b: quantize(200.0 * (fy - fz)),
	}
}
