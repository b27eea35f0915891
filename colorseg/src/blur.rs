//! Fixed 7x7 gaussian blur applied to the sRGB pixels before color conversion

use palette::Srgb;

/// Distance from the center to the edge of the kernel
const RADIUS: usize = 3;

/// Width and height of the kernel
const WIDTH: usize = 2 * RADIUS + 1;

/// Row-major kernel weights, summing to 1
const WEIGHTS: [f32; WIDTH * WIDTH] = [
	0.00000067, 0.00002292, 0.00019117, 0.00038771, 0.00019117, 0.00002292, 0.00000067,
	0.00002292, 0.00078634, 0.00655965, 0.01330373, 0.00655965, 0.00078633, 0.00002292,
	0.00019117, 0.00655965, 0.05472157, 0.11098164, 0.05472157, 0.00655965, 0.00019117,
	0.00038771, 0.01330373, 0.11098164, 0.22508352, 0.11098164, 0.01330373, 0.00038771,
	0.00019117, 0.00655965, 0.05472157, 0.11098164, 0.05472157, 0.00655965, 0.00019117,
	0.00002292, 0.00078633, 0.00655965, 0.01330373, 0.00655965, 0.00078633, 0.00002292,
	0.00000067, 0.00002292, 0.00019117, 0.00038771, 0.00019117, 0.00002292, 0.00000067,
];

/// Round a weighted channel sum back to a byte
fn to_channel(sum: f32) -> u8 {
	// `as` saturates to 0..=255
	#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
	{
		sum.round() as u8
	}
}

/// Compute the blurred color of the pixel at `index` in a `width` x `height` grid.
///
/// Samples outside the grid are clamped to the nearest border pixel.
#[must_use]
pub fn blur_at(pixels: &[Srgb<u8>], width: usize, height: usize, index: usize) -> Srgb<u8> {
	let x = index % width;
	let y = index / width;

	let mut red = 0.0;
	let mut green = 0.0;
	let mut blue = 0.0;

	for (dy, weights) in WEIGHTS.chunks_exact(WIDTH).enumerate() {
		let sy = usize::min((y + dy).saturating_sub(RADIUS), height - 1);
		let row = &pixels[(sy * width)..((sy + 1) * width)];

		for (dx, &weight) in weights.iter().enumerate() {
			let sx = usize::min((x + dx).saturating_sub(RADIUS), width - 1);
			let color = row[sx];
			red += f32::from(color.red) * weight;
			green += f32::from(color.green) * weight;
			blue += f32::from(color.blue) * weight;
		}
	}

	Srgb::new(to_channel(red), to_channel(green), to_channel(blue))
}

#[cfg(test)]
mod tests {
	use super::*;
	use approx::assert_relative_eq;

	fn blur(pixels: &[Srgb<u8>], width: usize, height: usize) -> Vec<Srgb<u8>> {
		(0..pixels.len()).map(|i| blur_at(pixels, width, height, i)).collect()
	}

	#[test]
	fn weights_sum_to_one() {
		assert_relative_eq!(WEIGHTS.iter().sum::<f32>(), 1.0, epsilon = 1e-6);
	}

	#[test]
	fn uniform_image_is_unchanged() {
		for color in [Srgb::new(0, 0, 0), Srgb::new(255, 255, 255), Srgb::new(12, 200, 77)] {
			let pixels = vec![color; 10 * 8];
			assert_eq!(blur(&pixels, 10, 8), pixels);
		}
	}

	#[test]
	fn single_pixel_is_unchanged() {
		let pixels = vec![Srgb::new(1, 2, 3)];
		assert_eq!(blur(&pixels, 1, 1), pixels);
	}

	#[test]
	fn spreads_a_bright_dot() {
		let (width, height) = (9, 9);
		let mut pixels = vec![Srgb::new(0, 0, 0); width * height];
		let center = 4 * width + 4;
		pixels[center] = Srgb::new(255, 255, 255);

		let blurred = blur(&pixels, width, height);
		let center_value = blurred[center].red;
		let neighbor_value = blurred[center + 1].red;

		assert!(center_value < 255);
		assert!(neighbor_value > 0);
		assert!(neighbor_value < center_value);
		assert_eq!(blurred[0].red, 0);
	}
}
