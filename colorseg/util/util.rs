#![allow(dead_code)]

use image::{Rgb, RgbImage};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

/// Flat colored rectangles on a flat background
pub fn blocks(width: u32, height: u32, seed: u64) -> RgbImage {
	let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
	let mut image = RgbImage::from_pixel(width, height, Rgb(rng.gen()));

	for _ in 0..24 {
		let w = rng.gen_range(1..=(width / 4).max(1));
		let h = rng.gen_range(1..=(height / 4).max(1));
		let x0 = rng.gen_range(0..width);
		let y0 = rng.gen_range(0..height);
		let color = Rgb(rng.gen());

		for y in y0..(y0 + h).min(height) {
			for x in x0..(x0 + w).min(width) {
				image.put_pixel(x, y, color);
			}
		}
	}

	image
}

/// [`blocks`] with every channel jittered by up to `amount` in either direction
pub fn noisy_blocks(width: u32, height: u32, seed: u64, amount: u8) -> RgbImage {
	let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed.wrapping_add(1));
	let mut image = blocks(width, height, seed);
	let amount = i16::from(amount);

	for pixel in image.pixels_mut() {
		for channel in &mut pixel.0 {
			let offset = rng.gen_range(-amount..=amount);
			*channel = (i16::from(*channel) + offset).clamp(0, 255) as u8;
		}
	}

	image
}

/// Smooth diagonal gradient
pub fn gradient(width: u32, height: u32) -> RgbImage {
	RgbImage::from_fn(width, height, |x, y| {
		Rgb([
			(x * 255 / width.max(1)) as u8,
			(y * 255 / height.max(1)) as u8,
			((x + y) * 255 / (width + height).max(1)) as u8,
		])
	})
}

/// The synthetic test images by name
pub fn synthetic_images(width: u32, height: u32) -> Vec<(String, RgbImage)> {
	vec![
		("blocks".to_owned(), blocks(width, height, 7)),
		("noisy blocks".to_owned(), noisy_blocks(width, height, 7, 6)),
		("gradient".to_owned(), gradient(width, height)),
	]
}
