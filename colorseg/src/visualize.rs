//! Render the intermediate and final results of a run as an image

use crate::SimilarityFlags;
use image::{Rgb, RgbImage};
use palette::Srgb;

/// What to draw when rendering a segmentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ViewMode {
	/// Each label in a color from [`DISPLAY_PALETTE`]
	#[default]
	Clusters,
	/// Brightness proportional to the number of similar neighbors of each pixel
	PixelDistances,
	/// The pixels that were segmented, after the optional blur
	Image,
}

/// Colors used to tell labels apart, indexed by `label % DISPLAY_PALETTE.len()`
pub const DISPLAY_PALETTE: [[u8; 3]; 32] = [
	[230, 25, 75],
	[60, 180, 75],
	[255, 225, 25],
	[0, 130, 200],
	[245, 130, 48],
	[145, 30, 180],
	[70, 240, 240],
	[240, 50, 230],
	[210, 245, 60],
	[250, 190, 212],
	[0, 128, 128],
	[220, 190, 255],
	[170, 110, 40],
	[255, 250, 200],
	[128, 0, 0],
	[170, 255, 195],
	[128, 128, 0],
	[255, 215, 180],
	[0, 0, 128],
	[128, 128, 128],
	[255, 255, 255],
	[0, 0, 0],
	[255, 99, 71],
	[46, 139, 87],
	[218, 165, 32],
	[65, 105, 225],
	[210, 105, 30],
	[106, 90, 205],
	[0, 206, 209],
	[199, 21, 133],
	[154, 205, 50],
	[244, 164, 96],
];

/// Brightness added per similar neighbor in [`ViewMode::PixelDistances`]
const DISTANCE_STEP: u32 = 50;

/// The display color of `label`
#[must_use]
pub fn label_color(label: u32) -> [u8; 3] {
	DISPLAY_PALETTE[label as usize % DISPLAY_PALETTE.len()]
}

/// The gray level shown for a pixel with the given similarity flags
#[must_use]
pub fn distance_level(flags: SimilarityFlags) -> u8 {
	#[allow(clippy::cast_possible_truncation)]
	{
		u32::min(flags.count() * DISTANCE_STEP, u32::from(u8::MAX)) as u8
	}
}

/// Draw a `width` x `height` grid in the given `mode`.
///
/// All slices hold one element per pixel in raster order.
#[must_use]
pub fn render(
	mode: ViewMode,
	width: u32,
	height: u32,
	labels: &[u32],
	flags: &[SimilarityFlags],
	pixels: &[Srgb<u8>],
) -> RgbImage {
	let mut image = RgbImage::new(width, height);
	let out = image.pixels_mut();

	match mode {
		ViewMode::Clusters => {
			for (out, &label) in out.zip(labels) {
				*out = Rgb(label_color(label));
			}
		},
		ViewMode::PixelDistances => {
			for (out, &flags) in out.zip(flags) {
				let level = distance_level(flags);
				*out = Rgb([level; 3]);
			}
		},
		ViewMode::Image => {
			for (out, &color) in out.zip(pixels) {
				*out = Rgb([color.red, color.green, color.blue]);
			}
		},
	}

	image
}
