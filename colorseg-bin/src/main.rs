//! Segment an image into connected regions of perceptually similar color and print each region.

#![deny(unsafe_code, unsafe_op_in_unsafe_fn)]
#![warn(
	clippy::pedantic,
	clippy::cargo,
	clippy::use_debug,
	clippy::dbg_macro,
	clippy::todo,
	clippy::unimplemented,
	clippy::unwrap_used,
	clippy::unwrap_in_result,
	clippy::unneeded_field_pattern,
	clippy::rest_pat_in_fully_bound_structs,
	clippy::unnecessary_self_imports,
	clippy::str_to_string,
	clippy::string_to_string,
	clippy::string_slice,
	missing_docs,
	clippy::missing_docs_in_private_items,
	rustdoc::all,
	clippy::float_cmp_const,
	clippy::lossy_float_literal
)]
#![allow(
	clippy::doc_markdown,
	clippy::module_name_repetitions,
	clippy::many_single_char_names,
	clippy::missing_panics_doc,
	clippy::unreadable_literal
)]

mod cli;

#[allow(clippy::wildcard_imports)]
use cli::*;

use std::{
	fmt::{self, Display},
	path::{Path, PathBuf},
	process::ExitCode,
	time::Instant,
};

use clap::Parser;
use colored::Colorize;
use colorseg::{query, Cluster, SegmentError, Segmenter};
use image::{DynamicImage, GenericImageView};
use palette::Srgb;
use tracing_subscriber::EnvFilter;

/// Record the running time of a function and log the elapsed time
macro_rules! time {
	($name: literal, $func_call: expr) => {{
		let start = Instant::now();
		let result = $func_call;
		tracing::info!("{} took {}ms", $name, start.elapsed().as_millis());
		result
	}};
}

/// Error cases for a run of the CLI
#[derive(Debug)]
enum CliError {
	/// Failed to read or decode the image file
	ImageLoad(image::ImageError),
	/// The image could not be segmented
	Segment(SegmentError),
	/// Failed to encode or write the visualization
	ViewSave(PathBuf, image::ImageError),
	/// Failed to start the worker threads
	#[cfg(feature = "threads")]
	ThreadPool(rayon::ThreadPoolBuildError),
}

impl Display for CliError {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			CliError::ImageLoad(e) => write!(f, "Failed to load the image file: {e}"),
			CliError::Segment(e) => write!(f, "Failed to segment the image: {e}"),
			CliError::ViewSave(path, e) => write!(f, "Failed to write {}: {e}", path.display()),
			#[cfg(feature = "threads")]
			CliError::ThreadPool(e) => write!(f, "Failed to create the thread pool: {e}"),
		}
	}
}

impl From<SegmentError> for CliError {
	fn from(e: SegmentError) -> Self {
		CliError::Segment(e)
	}
}

fn main() -> ExitCode {
	let options = Options::parse();

	init_logging(options.verbose);

	let result = run_segment_and_print(&options);

	// Returning Result<_> uses Debug printing instead of Display
	if let Err(e) = result {
		eprintln!("{e}");
		ExitCode::FAILURE
	} else {
		ExitCode::SUCCESS
	}
}

/// Send log output to stderr, at debug level for `--verbose` unless `RUST_LOG` is set
fn init_logging(verbose: bool) {
	let filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(false)
		.init();
}

/// Builds a thread pool and then runs `segment_and_print`
#[cfg(feature = "threads")]
fn run_segment_and_print(options: &Options) -> Result<(), CliError> {
	let pool = rayon::ThreadPoolBuilder::new()
		.num_threads(options.threads)
		.build()
		.map_err(CliError::ThreadPool)?;

	tracing::debug!(threads = pool.current_num_threads(), "built thread pool");

	pool.install(|| segment_and_print(options))
}

/// Runs `segment_and_print` on a single thread
#[cfg(not(feature = "threads"))]
fn run_segment_and_print(options: &Options) -> Result<(), CliError> {
	segment_and_print(options)
}

/// Load an image, segment it, and print the clusters using the given options
fn segment_and_print(options: &Options) -> Result<(), CliError> {
	// Input
	let img = time!("Image loading", load_image(&options.image))?;
	let img = generate_thumbnail(img, options.max_pixels);
	let img = segmentable(img);

	// Processing
	let (width, height) = img.dimensions();
	let mut segmenter = Segmenter::new(width, height, options.config())?;
	let clusters = {
		let start = Instant::now();
		let clusters = segmenter.update_dynamic(&img)?.to_vec();
		tracing::info!(
			"Segmentation took {}ms in total, found {} clusters in {} labels",
			start.elapsed().as_millis(),
			clusters.len(),
			segmenter.label_count(),
		);
		clusters
	};

	// Output
	if let Some(path) = &options.view_output {
		save_view(&segmenter, path)?;
	}

	let clusters = sorted_clusters(&clusters, options);
	print_clusters(&clusters, options);

	Ok(())
}

/// Load the image at the given path
fn load_image(path: &Path) -> Result<DynamicImage, CliError> {
	image::open(path).map_err(CliError::ImageLoad)
}

/// Convert images that are not 8-bit RGB or RGBA
fn segmentable(image: DynamicImage) -> DynamicImage {
	match image {
		DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_) => image,
		image => {
			tracing::debug!(color = ?image.color(), "converting image to 8-bit RGB");
			DynamicImage::ImageRgb8(image.into_rgb8())
		},
	}
}

/// Create a thumbnail with at most `max_pixels` pixels if the image has more than `max_pixels` pixels
fn generate_thumbnail(image: DynamicImage, max_pixels: u32) -> DynamicImage {
	// The number of pixels should be < u64::MAX, since image dimensions are (u32, u32)
	let (width, height) = image.dimensions();
	let pixels = u64::from(width) * u64::from(height);
	if pixels <= u64::from(max_pixels) {
		tracing::debug!("Skipping image thumbnail since pixels was below max pixels");
		image
	} else {
		// (u64 as f64) only gives innaccurate results for very large u64
		// I.e, only when pixels is in the order of quintillions
		#[allow(clippy::cast_precision_loss)]
		let scale = (f64::from(max_pixels) / pixels as f64).sqrt();

		// multiplying by a positive factor < 1
		#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
		let (thumb_width, thumb_height) = ((f64::from(width) * scale) as u32, (f64::from(height) * scale) as u32);

		tracing::debug!("Creating a thumbnail with dimensions {thumb_width}x{thumb_height}");

		time!("Image thumbnail", image.thumbnail(thumb_width, thumb_height))
	}
}

/// Render the last segmentation in the configured view mode and write it to `path`
fn save_view(segmenter: &Segmenter, path: &Path) -> Result<(), CliError> {
	let view = time!("View rendering", segmenter.render());
	view.save(path)
		.map_err(|e| CliError::ViewSave(path.to_path_buf(), e))
}

/// Filter and sort the clusters according to the given options
fn sorted_clusters(clusters: &[Cluster], options: &Options) -> Vec<Cluster> {
	let mut clusters = if options.pure {
		query::pure_clusters(clusters)
	} else {
		clusters.to_vec()
	};

	match options.sort.reference() {
		Some(reference) => clusters = query::sorted_by_reference(&clusters, reference),
		None if options.sort == SortOutput::Size => {
			clusters.sort_by_key(|cluster| std::cmp::Reverse(cluster.size()));
		},
		None => clusters.sort_by_key(Cluster::label),
	}

	if options.reverse {
		clusters.reverse();
	}

	clusters
}

/// The statistics printed after each cluster's color
fn cluster_stats(cluster: &Cluster) -> String {
	let centroid = cluster.centroid();
	let bounds = cluster.bounds();
	format!(
		"{:>8} ({:.1},{:.1}) [{},{}]-[{},{}]",
		cluster.size(),
		centroid.x,
		centroid.y,
		bounds.min_x,
		bounds.min_y,
		bounds.max_x,
		bounds.max_y,
	)
}

/// Print the given clusters based off the provided options
fn print_clusters(clusters: &[Cluster], options: &Options) {
	match options.output {
		FormatOutput::Hex => color_format_print(clusters, options, |color| format!("{color:X}")),

		FormatOutput::Rgb => color_format_print(clusters, options, |color| {
			format!("({},{},{})", color.red, color.green, color.blue)
		}),

		FormatOutput::Swatch => format_print(clusters, |color| {
			"   ".on_truecolor(color.red, color.green, color.blue).to_string()
		}),
	}
}

/// Print one line per cluster using the given color format
fn format_print(clusters: &[Cluster], format: impl Fn(Srgb<u8>) -> String) {
	for cluster in clusters {
		println!("{} {}", format(cluster.rgb()), cluster_stats(cluster));
	}
}

/// Format, colorize, and then print the text for all clusters
fn color_format_print(clusters: &[Cluster], options: &Options, format: impl Fn(Srgb<u8>) -> String) {
	match options.colorize {
		Some(ColorizeOutput::Fg) => format_print(clusters, |color| {
			format(color).truecolor(color.red, color.green, color.blue).to_string()
		}),

		Some(ColorizeOutput::Bg) => format_print(clusters, |color| {
			format(color).on_truecolor(color.red, color.green, color.blue).to_string()
		}),

		None => format_print(clusters, format),
	}
}
