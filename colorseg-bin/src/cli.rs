//! Specifies the CLI and handles arg parsing

use clap::{Parser, ValueEnum};
use colorseg::{ReferenceColor, SegmenterConfig, ViewMode};
use std::{
	fmt::{Debug, Display},
	num::ParseFloatError,
	ops::RangeBounds,
	path::PathBuf,
	str::FromStr,
};

/// Supported output formats for the cluster colors
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum FormatOutput {
	/// sRGB hexcode
	Hex,
	/// sRGB (r,g,b) triple
	Rgb,
	/// Whitespace with true color background
	Swatch,
}

/// Sort orders for the printed clusters
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum SortOutput {
	/// Descending number of pixels
	Size,
	/// Ascending label, i.e., raster order of each region's first pixel
	Label,
	/// Closest to pure red first
	Red,
	/// Closest to pure green first
	Green,
	/// Closest to pure blue first
	Blue,
	/// Closest to black first
	Black,
	/// Closest to white first
	White,
}

impl SortOutput {
	/// The reference color to sort by, if any
	pub const fn reference(self) -> Option<ReferenceColor> {
		match self {
			Self::Size | Self::Label => None,
			Self::Red => Some(ReferenceColor::Red),
			Self::Green => Some(ReferenceColor::Green),
			Self::Blue => Some(ReferenceColor::Blue),
			Self::Black => Some(ReferenceColor::Black),
			Self::White => Some(ReferenceColor::White),
		}
	}
}

/// Ways to colorize the output text
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorizeOutput {
	/// Foreground
	Fg,
	/// Background
	Bg,
}

/// What to draw into the --view-output image
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ViewOutput {
	/// Each region in a distinct display color
	Clusters,
	/// Brightness by the number of similar neighbors of each pixel
	Distances,
	/// The segmented pixels, after the optional blur
	Image,
}

impl From<ViewOutput> for ViewMode {
	fn from(view: ViewOutput) -> Self {
		match view {
			ViewOutput::Clusters => Self::Clusters,
			ViewOutput::Distances => Self::PixelDistances,
			ViewOutput::Image => Self::Image,
		}
	}
}

/// Segment an image into connected regions of perceptually similar color.
///
/// Each region with enough pixels is printed on its own line with
/// its mean color, pixel count, centroid, and bounding box.
#[allow(clippy::struct_excessive_bools)]
#[derive(Parser)]
#[command(version)]
pub struct Options {
	/// The path to the input image
	pub image: PathBuf,

	/// The format to print the colors in
	#[arg(short, long, default_value = "hex")]
	pub output: FormatOutput,

	/// Color the foreground or background for each printed color
	#[arg(short, long)]
	pub colorize: Option<ColorizeOutput>,

	/// The order to print the clusters in
	#[arg(short, long, default_value = "size")]
	pub sort: SortOutput,

	/// Reverse the printed order of the clusters
	#[arg(short, long)]
	pub reverse: bool,

	/// Only print clusters whose bounding box contains no other cluster's centroid
	#[arg(short, long)]
	pub pure: bool,

	/// The largest CIE94 distance at which neighboring pixels belong to the same region
	///
	/// Values around 2 to 5 work well for photos.
	/// Higher values merge more regions, lower values split regions along soft gradients.
	#[arg(short, long, default_value_t = SegmenterConfig::DEFAULT_SIMILARITY_THRESHOLD, value_parser = parse_valid_threshold)]
	pub threshold: f32,

	/// The fraction of similar neighbor links in a 9x9 window above which a pixel is treated as noise
	///
	/// Provided values should be in the range [0.0, 1.0].
	#[arg(short, long, default_value_t = SegmenterConfig::DEFAULT_NOISE_THRESHOLD, value_parser = parse_valid_noise_threshold)]
	pub noise_threshold: f32,

	/// Do not remove noise from the similarity map
	#[arg(long)]
	pub no_noise_removal: bool,

	/// Do not blur the image before segmenting it
	#[arg(long)]
	pub no_blur: bool,

	/// Regions with fewer pixels than this are not printed
	#[arg(short, long, default_value_t = SegmenterConfig::DEFAULT_MIN_CLUSTER_SIZE)]
	pub min_size: u32,

	/// The maximum image size, in number of pixels, before a thumbnail is created
	///
	/// Note that the minimum cluster size applies to the thumbnail.
	#[arg(long, default_value_t = u32::MAX)]
	pub max_pixels: u32,

	/// What to draw when writing --view-output
	#[arg(long, default_value = "clusters")]
	pub view: ViewOutput,

	/// Write a visualization of the segmentation to this path
	///
	/// The image format is chosen from the file extension.
	#[arg(long)]
	pub view_output: Option<PathBuf>,

	/// The number of threads to use
	///
	/// A value of 0 uses one thread per available CPU.
	#[cfg(feature = "threads")]
	#[arg(short = 'j', long, default_value_t = 0)]
	pub threads: usize,

	/// Log timings and intermediate counts to stderr
	///
	/// The RUST_LOG environment variable takes precedence over this flag.
	#[arg(short, long)]
	pub verbose: bool,
}

impl Options {
	/// The segmentation options given on the command line
	pub fn config(&self) -> SegmenterConfig {
		SegmenterConfig::new()
			.with_similarity_threshold(self.threshold)
			.with_noise_removal(!self.no_noise_removal)
			.with_noise_threshold(self.noise_threshold)
			.with_blur(!self.no_blur)
			.with_min_cluster_size(self.min_size)
			.with_view_mode(self.view.into())
	}
}

/// Parse a float value and ensure it in the provided, valid range
fn parse_float_in_range<T>(s: &str, range: impl RangeBounds<T> + Debug) -> Result<T, String>
where
	T: FromStr<Err = ParseFloatError> + Display + PartialOrd,
{
	let value: T = s.parse().map_err(|e| format!("{e}"))?;
	if range.contains(&value) {
		Ok(value)
	} else {
		Err(format!("{value} is not in {range:?}"))
	}
}

/// Parse the similarity threshold and ensure it is a finite value `>= 0.0`
fn parse_valid_threshold(s: &str) -> Result<f32, String> {
	parse_float_in_range(s, 0.0..f32::INFINITY)
}

/// Parse the noise threshold and ensure it is in `0.0..=1.0`
fn parse_valid_noise_threshold(s: &str) -> Result<f32, String> {
	parse_float_in_range(s, 0.0..=1.0)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
	use super::*;
	use clap::CommandFactory;

	#[test]
	fn cli_is_well_formed() {
		Options::command().debug_assert();
	}

	#[test]
	fn float_ranges() {
		assert_eq!(parse_valid_threshold("2.5"), Ok(2.5));
		assert!(parse_valid_threshold("-1").is_err());
		assert!(parse_valid_threshold("inf").is_err());
		assert!(parse_valid_threshold("NaN").is_err());
		assert!(parse_valid_threshold("three").is_err());

		assert_eq!(parse_valid_noise_threshold("1"), Ok(1.0));
		assert_eq!(parse_valid_noise_threshold("0.85"), Ok(0.85));
		assert!(parse_valid_noise_threshold("1.01").is_err());
	}

	#[test]
	fn defaults_match_library_defaults() {
		let options = Options::try_parse_from(["colorseg", "image.png"]).unwrap();
		assert_eq!(options.config(), SegmenterConfig::default());
		assert_eq!(options.sort, SortOutput::Size);
		assert_eq!(options.output, FormatOutput::Hex);
		assert!(options.view_output.is_none());
	}

	#[test]
	fn flags_map_onto_config() {
		let options = Options::try_parse_from([
			"colorseg",
			"image.png",
			"-t",
			"6",
			"-n",
			"0.8",
			"--no-blur",
			"--no-noise-removal",
			"-m",
			"10",
			"--view",
			"distances",
			"-s",
			"red",
		])
		.unwrap();

		assert_eq!(
			options.config(),
			SegmenterConfig::new()
				.with_similarity_threshold(6.0)
				.with_noise_threshold(0.8)
				.with_blur(false)
				.with_noise_removal(false)
				.with_min_cluster_size(10)
				.with_view_mode(ViewMode::PixelDistances)
		);
		assert_eq!(options.sort.reference(), Some(ReferenceColor::Red));
	}
}
