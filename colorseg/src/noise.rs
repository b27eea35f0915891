//! Local majority filter that erases isolated dissimilarity

use crate::SimilarityFlags;

/// Radius of the square window around each pixel
pub const RADIUS: usize = 4;

/// The number of flags in a full window: 9 x 9 pixels with 4 flags each
#[allow(clippy::cast_possible_truncation)]
pub const MAX_WINDOW_SUM: u32 = ((2 * RADIUS + 1) * (2 * RADIUS + 1) * 4) as u32;

/// Compute the denoised flags for the pixel at `index` in a `width` x `height` grid.
///
/// Window coordinates outside the grid are clamped to the border,
/// so border pixels are sampled more than once.
/// If more than `threshold` (a fraction in `0.0..=1.0`) of the flags in the window are set,
/// all four flags of the center pixel are set. Otherwise the center flags are kept as is.
///
/// `flags` must be the unmodified input map, never the output being written.
#[must_use]
pub fn denoise_at(
	flags: &[SimilarityFlags],
	width: usize,
	height: usize,
	index: usize,
	threshold: f32,
) -> SimilarityFlags {
	let center_x = index % width;
	let center_y = index / width;

	let columns = || {
		(0..=2 * RADIUS).map(move |offset| usize::min((center_x + offset).saturating_sub(RADIUS), width - 1))
	};

	let mut sum = 0;
	for offset in 0..=2 * RADIUS {
		let y = usize::min((center_y + offset).saturating_sub(RADIUS), height - 1);
		let row = &flags[(y * width)..((y + 1) * width)];
		sum += columns().map(|x| row[x].count()).sum::<u32>();
	}

	#[allow(clippy::cast_precision_loss)]
	let ratio = sum as f32 / MAX_WINDOW_SUM as f32;

	if ratio > threshold {
		SimilarityFlags::ALL
	} else {
		flags[index]
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn denoise(flags: &[SimilarityFlags], width: usize, height: usize, threshold: f32) -> Vec<SimilarityFlags> {
		(0..flags.len())
			.map(|i| denoise_at(flags, width, height, i, threshold))
			.collect()
	}

	#[test]
	fn max_window_sum() {
		assert_eq!(MAX_WINDOW_SUM, 324);
	}

	#[test]
	fn isolated_pixel_is_absorbed() {
		let (width, height) = (20, 20);
		let mut flags = vec![SimilarityFlags::ALL; width * height];
		let center = 10 * width + 10;
		flags[center] = SimilarityFlags::NONE;
		flags[center - 1].0[crate::similarity::RIGHT] = false;
		flags[center + 1].0[crate::similarity::LEFT] = false;
		flags[center - width].0[crate::similarity::BOTTOM] = false;
		flags[center + width].0[crate::similarity::TOP] = false;

		let denoised = denoise(&flags, width, height, 0.9);
		assert!(denoised.iter().all(|&f| f == SimilarityFlags::ALL));
	}

	#[test]
	fn dissimilar_neighborhood_is_kept() {
		let (width, height) = (12, 12);
		let flags = vec![SimilarityFlags::NONE; width * height];
		assert_eq!(denoise(&flags, width, height, 0.9), flags);
	}

	#[test]
	fn threshold_is_exclusive() {
		// Every pixel has exactly 3 of 4 flags set, giving a ratio of exactly 0.75
		let (width, height) = (10, 10);
		let flags = vec![SimilarityFlags::new(true, true, true, false); width * height];

		assert_eq!(denoise(&flags, width, height, 0.75), flags);
		assert!(denoise(&flags, width, height, 0.7)
			.iter()
			.all(|&f| f == SimilarityFlags::ALL));
	}

	#[test]
	fn decisions_read_only_the_input() {
		// Similar columns on the left, dissimilar columns on the right.
		// Column 4 is forced to similar. If that write were visible while computing column 5,
		// column 5 would see 4 of 9 similar columns and be forced as well.
		let (width, height) = (9, 9);
		let flags = (0..width * height)
			.map(|i| if i % width < 4 { SimilarityFlags::ALL } else { SimilarityFlags::NONE })
			.collect::<Vec<_>>();

		let denoised = denoise(&flags, width, height, 0.4);
		for y in 0..height {
			for x in 0..width {
				let expected = if x <= 4 { SimilarityFlags::ALL } else { SimilarityFlags::NONE };
				assert_eq!(denoised[y * width + x], expected, "pixel ({x}, {y})");
			}
		}
	}

	#[test]
	fn tiny_grid_clamps_window() {
		let flags = vec![SimilarityFlags::new(true, true, true, false)];
		assert_eq!(denoise(&flags, 1, 1, 0.8), flags);
		assert_eq!(denoise(&flags, 1, 1, 0.5), vec![SimilarityFlags::ALL]);
	}
}
