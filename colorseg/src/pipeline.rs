//! The segmentation pipeline and the buffers it reuses between frames

use crate::{
	label::{self, UnionFind},
	visualize, Accelerator, Cluster, CpuAccelerator, Frame, LabPixel, Result, SegmentError, SegmenterConfig,
	SimilarityFlags, ViewMode,
};
use image::{DynamicImage, RgbImage};
use palette::Srgb;

/// Run one stage of the pipeline and log how long it took
macro_rules! stage {
	($name: literal, $body: expr) => {{
		let start = std::time::Instant::now();
		let result = $body;
		tracing::trace!(elapsed = ?start.elapsed(), "{}", $name);
		result
	}};
}

/// Segments images of one fixed size into clusters of similar color
///
/// All working buffers are allocated once in [`Segmenter::new`] and overwritten by each update.
/// The label map and clusters of the most recent update stay readable until the next one.
#[derive(Debug)]
pub struct Segmenter<A: Accelerator = CpuAccelerator> {
	/// Runs the per-pixel transforms
	accelerator: A,
	/// Current options
	config: SegmenterConfig,
	/// Grid width
	width: u32,
	/// Grid height
	height: u32,
	/// Input pixels, blurred in place when blur is enabled
	pixels: Vec<Srgb<u8>>,
	/// Scratch buffer for the blur
	blurred: Vec<Srgb<u8>>,
	/// Quantized Lab colors
	lab: Vec<LabPixel>,
	/// Similarity map, denoised when noise removal is enabled
	flags: Vec<SimilarityFlags>,
	/// Scratch buffer for noise removal
	denoised: Vec<SimilarityFlags>,
	/// Final label of each pixel
	labels: Vec<u32>,
	/// Provisional label table
	table: UnionFind,
	/// Clusters of the last run
	clusters: Vec<Cluster>,
	/// Number of completed runs
	generation: u64,
}

/// Check that a `width` x `height` grid is non-empty and its pixels can be labeled with a `u32`
fn grid_len(width: u32, height: u32) -> Result<usize> {
	if width == 0 || height == 0 {
		return Err(SegmentError::EmptyGrid { width, height });
	}

	let len = u64::from(width) * u64::from(height);
	if len > u64::from(u32::MAX) {
		return Err(SegmentError::GridTooLarge { width, height });
	}

	usize::try_from(len).map_err(|_| SegmentError::GridTooLarge { width, height })
}

impl Segmenter<CpuAccelerator> {
	/// Create a [`Segmenter`] for images of `width` x `height` pixels that runs on the CPU.
	///
	/// # Errors
	/// - [`SegmentError::EmptyGrid`] if `width` or `height` is zero
	/// - [`SegmentError::GridTooLarge`] if there are more than `u32::MAX` pixels
	/// - [`SegmentError::InvalidConfig`] if `config` does not validate
	pub fn new(width: u32, height: u32, config: SegmenterConfig) -> Result<Self> {
		Self::with_accelerator(width, height, config, CpuAccelerator)
	}
}

impl<A: Accelerator> Segmenter<A> {
	/// Create a [`Segmenter`] that runs the per-pixel transforms on `accelerator`.
	///
	/// # Errors
	/// See [`Segmenter::new`].
	pub fn with_accelerator(width: u32, height: u32, config: SegmenterConfig, accelerator: A) -> Result<Self> {
		let len = grid_len(width, height)?;
		config.validate()?;

		Ok(Self {
			accelerator,
			config,
			width,
			height,
			pixels: vec![Srgb::new(0, 0, 0); len],
			blurred: vec![Srgb::new(0, 0, 0); len],
			lab: vec![LabPixel::default(); len],
			flags: vec![SimilarityFlags::NONE; len],
			denoised: vec![SimilarityFlags::NONE; len],
			labels: vec![0; len],
			table: UnionFind::with_capacity(len),
			clusters: Vec::new(),
			generation: 0,
		})
	}

	/// Segment an 8-bit RGB image and return the resulting clusters
	///
	/// # Errors
	/// Returns [`SegmentError::DimensionMismatch`] if `image` is not the size given at construction.
	/// No state is modified in that case.
	pub fn update(&mut self, image: &RgbImage) -> Result<&[Cluster]> {
		self.update_frame(Frame::from(image))
	}

	/// Segment an image stored as 8-bit RGB or RGBA and return the resulting clusters
	///
	/// # Errors
	/// - [`SegmentError::UnsupportedPixelFormat`] for any other pixel format
	/// - [`SegmentError::DimensionMismatch`] if `image` is not the size given at construction
	pub fn update_dynamic(&mut self, image: &DynamicImage) -> Result<&[Cluster]> {
		match image {
			DynamicImage::ImageRgb8(image) => self.update(image),
			DynamicImage::ImageRgba8(image) => {
				let frame = Frame::packed_rgba(image.as_raw(), image.width(), image.height())?;
				self.update_frame(frame)
			},
			image => Err(SegmentError::UnsupportedPixelFormat(image.color())),
		}
	}

	/// Segment a raw frame and return the resulting clusters
	///
	/// # Errors
	/// Returns [`SegmentError::DimensionMismatch`] if `frame` is not the size given at construction.
	/// No state is modified in that case.
	pub fn update_frame(&mut self, frame: Frame<'_>) -> Result<&[Cluster]> {
		if (frame.width(), frame.height()) != (self.width, self.height) {
			return Err(SegmentError::DimensionMismatch {
				expected_width: self.width,
				expected_height: self.height,
				actual_width: frame.width(),
				actual_height: frame.height(),
			});
		}

		frame.copy_into(&mut self.pixels);
		self.run();
		Ok(&self.clusters)
	}

	/// Run every stage over the loaded pixels
	fn run(&mut self) {
		let span = tracing::debug_span!("segment", width = self.width, height = self.height, generation = self.generation);
		let _enter = span.enter();

		let width = self.width as usize;
		let height = self.height as usize;
		let config = self.config;

		if config.blur {
			stage!("blur", self.accelerator.gaussian_blur(&self.pixels, &mut self.blurred, width, height));
			std::mem::swap(&mut self.pixels, &mut self.blurred);
		}

		stage!("lab conversion", {
			self.accelerator.rgb_to_lab(&self.pixels, &mut self.lab, crate::lab::CHANNEL_MAX);
		});

		stage!("similarity", {
			self.accelerator.lab_similarity(&self.lab, &mut self.flags, width, height, config.similarity_threshold);
		});

		if config.noise_removal {
			stage!("noise removal", {
				self.accelerator.remove_noise(&self.flags, &mut self.denoised, width, height, config.noise_threshold);
			});
			std::mem::swap(&mut self.flags, &mut self.denoised);
		}

		stage!("labeling", label::label_regions(&self.flags, width, height, &mut self.labels, &mut self.table));

		self.clusters = stage!(
			"aggregation",
			crate::cluster::aggregate(&self.labels, &self.pixels, width, self.table.len(), config.min_cluster_size)
		);

		self.generation += 1;

		tracing::debug!(
			provisional_labels = self.table.len(),
			clusters = self.clusters.len(),
			"segmentation finished"
		);
	}

	/// The width of the images this segmenter accepts
	#[must_use]
	pub const fn width(&self) -> u32 {
		self.width
	}

	/// The height of the images this segmenter accepts
	#[must_use]
	pub const fn height(&self) -> u32 {
		self.height
	}

	/// The current options
	#[must_use]
	pub const fn config(&self) -> &SegmenterConfig {
		&self.config
	}

	/// The accelerator running the per-pixel transforms
	#[must_use]
	pub const fn accelerator(&self) -> &A {
		&self.accelerator
	}

	/// The number of completed updates
	#[must_use]
	pub const fn generation(&self) -> u64 {
		self.generation
	}

	/// Clusters from the last update, in ascending label order
	#[must_use]
	pub fn clusters(&self) -> &[Cluster] {
		&self.clusters
	}

	/// The label of each pixel from the last update, in raster order
	#[must_use]
	pub fn labels(&self) -> &[u32] {
		&self.labels
	}

	/// The similarity map from the last update, after noise removal if enabled
	#[must_use]
	pub fn similarity(&self) -> &[SimilarityFlags] {
		&self.flags
	}

	/// The quantized Lab colors from the last update
	#[must_use]
	pub fn lab(&self) -> &[LabPixel] {
		&self.lab
	}

	/// The pixels that were segmented in the last update, after the blur if enabled
	#[must_use]
	pub fn pixels(&self) -> &[Srgb<u8>] {
		&self.pixels
	}

	/// An upper bound on the labels in [`Segmenter::labels`]
	#[must_use]
	pub fn label_count(&self) -> usize {
		self.table.len()
	}

	/// Replace all options. They take effect on the next update.
	///
	/// # Errors
	/// Returns [`SegmentError::InvalidConfig`] and keeps the current options if `config` does not validate.
	pub fn set_config(&mut self, config: SegmenterConfig) -> Result<()> {
		config.validate()?;
		self.config = config;
		Ok(())
	}

	/// Change the similarity threshold
	///
	/// # Errors
	/// See [`SegmentError::InvalidConfig`].
	pub fn set_similarity_threshold(&mut self, threshold: f32) -> Result<()> {
		self.set_config(self.config.with_similarity_threshold(threshold))
	}

	/// Change the noise threshold
	///
	/// # Errors
	/// See [`SegmentError::InvalidConfig`].
	pub fn set_noise_threshold(&mut self, threshold: f32) -> Result<()> {
		self.set_config(self.config.with_noise_threshold(threshold))
	}

	/// Enable or disable noise removal
	pub fn set_noise_removal(&mut self, enabled: bool) {
		self.config.noise_removal = enabled;
	}

	/// Enable or disable the pre-blur
	pub fn set_blur(&mut self, enabled: bool) {
		self.config.blur = enabled;
	}

	/// Change the minimum cluster size
	pub fn set_min_cluster_size(&mut self, size: u32) {
		self.config.min_cluster_size = size;
	}

	/// Change what [`Segmenter::render`] draws
	pub fn set_view_mode(&mut self, mode: ViewMode) {
		self.config.view_mode = mode;
	}

	/// Draw the last update in the configured view mode
	#[must_use]
	pub fn render(&self) -> RgbImage {
		self.render_mode(self.config.view_mode)
	}

	/// Draw the last update in the given view mode
	#[must_use]
	pub fn render_mode(&self, mode: ViewMode) -> RgbImage {
		visualize::render(mode, self.width, self.height, &self.labels, &self.flags, &self.pixels)
	}
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
	use super::*;
	use crate::BoundingBox;
	use image::{GrayImage, Rgb, RgbaImage};

	const RED: Rgb<u8> = Rgb([255, 0, 0]);
	const BLUE: Rgb<u8> = Rgb([0, 0, 255]);

	fn exact_config() -> SegmenterConfig {
		SegmenterConfig::default()
			.with_noise_removal(false)
			.with_blur(false)
			.with_min_cluster_size(1)
	}

	fn red_corner() -> RgbImage {
		RgbImage::from_fn(4, 4, |x, y| if x < 2 && y < 2 { RED } else { BLUE })
	}

	#[test]
	fn red_corner_on_blue() {
		let mut segmenter = Segmenter::new(4, 4, exact_config()).unwrap();
		let clusters = segmenter.update(&red_corner()).unwrap();

		assert_eq!(clusters.len(), 2);

		let red = clusters[0];
		assert_eq!(red.size(), 4);
		assert_eq!(red.rgb(), Srgb::new(255, 0, 0));
		assert_eq!(red.bounds(), BoundingBox { min_x: 0, min_y: 0, max_x: 1, max_y: 1 });

		let blue = clusters[1];
		assert_eq!(blue.size(), 12);
		assert_eq!(blue.rgb(), Srgb::new(0, 0, 255));
		assert_eq!(blue.bounds(), BoundingBox { min_x: 0, min_y: 0, max_x: 3, max_y: 3 });

		#[rustfmt::skip]
		assert_eq!(segmenter.labels(), &[
			0, 0, 1, 1,
			0, 0, 1, 1,
			1, 1, 1, 1,
			1, 1, 1, 1,
		]);
	}

	#[test]
	fn uniform_image_is_one_cluster() {
		let color = Rgb([40, 90, 160]);
		let image = RgbImage::from_pixel(20, 20, color);
		let mut segmenter = Segmenter::new(20, 20, SegmenterConfig::default()).unwrap();
		let clusters = segmenter.update(&image).unwrap();

		assert_eq!(clusters.len(), 1);
		assert_eq!(clusters[0].size(), 400);
		assert_eq!(clusters[0].rgb(), Srgb::new(40, 90, 160));
		assert!(segmenter.labels().iter().all(|&l| l == 0));
	}

	#[test]
	fn block_on_background() {
		let image = RgbImage::from_fn(40, 30, |x, y| {
			if (5..25).contains(&x) && (8..20).contains(&y) {
				Rgb([220, 200, 20])
			} else {
				Rgb([20, 60, 30])
			}
		});

		let config = SegmenterConfig::default().with_noise_removal(false).with_blur(false);
		let mut segmenter = Segmenter::new(40, 30, config).unwrap();
		let clusters = segmenter.update(&image).unwrap();

		assert_eq!(clusters.len(), 2);
		let block = clusters
			.iter()
			.find(|c| c.rgb() == Srgb::new(220, 200, 20))
			.unwrap();
		assert_eq!(block.size(), 20 * 12);
		assert_eq!(block.bounds(), BoundingBox { min_x: 5, min_y: 8, max_x: 24, max_y: 19 });

		// Each centroid falls inside the other's bounding box
		assert!(crate::query::pure_clusters(clusters).is_empty());
	}

	#[test]
	fn noise_removal_absorbs_a_speck() {
		let mut image = RgbImage::from_pixel(20, 20, Rgb([100, 100, 100]));
		image.put_pixel(9, 9, Rgb([250, 30, 30]));

		let mut segmenter = Segmenter::new(20, 20, exact_config()).unwrap();
		assert_eq!(segmenter.update(&image).unwrap().len(), 2);

		segmenter.set_noise_removal(true);
		let clusters = segmenter.update(&image).unwrap();
		assert_eq!(clusters.len(), 1);
		assert_eq!(clusters[0].size(), 400);
	}

	#[test]
	fn small_clusters_are_dropped() {
		let mut segmenter = Segmenter::new(4, 4, exact_config().with_min_cluster_size(5)).unwrap();
		let clusters = segmenter.update(&red_corner()).unwrap();
		assert_eq!(clusters.len(), 1);
		assert_eq!(clusters[0].size(), 12);

		// Labels are kept for dropped regions
		assert_eq!(segmenter.labels()[0], 0);
	}

	#[test]
	fn dimension_mismatch_changes_nothing() {
		let mut segmenter = Segmenter::new(4, 4, exact_config()).unwrap();
		segmenter.update(&red_corner()).unwrap();
		let labels = segmenter.labels().to_vec();
		let clusters = segmenter.clusters().to_vec();

		let wrong = RgbImage::from_pixel(3, 4, RED);
		assert!(matches!(
			segmenter.update(&wrong),
			Err(SegmentError::DimensionMismatch {
				expected_width: 4,
				expected_height: 4,
				actual_width: 3,
				actual_height: 4,
			})
		));

		assert_eq!(segmenter.generation(), 1);
		assert_eq!(segmenter.labels(), labels);
		assert_eq!(segmenter.clusters(), clusters);
	}

	#[test]
	fn dynamic_images() {
		let mut segmenter = Segmenter::new(4, 4, exact_config()).unwrap();
		let expected = segmenter.update(&red_corner()).unwrap().to_vec();

		let rgba = RgbaImage::from_fn(4, 4, |x, y| {
			let Rgb([r, g, b]) = *red_corner().get_pixel(x, y);
			image::Rgba([r, g, b, 7])
		});
		let clusters = segmenter.update_dynamic(&DynamicImage::ImageRgba8(rgba)).unwrap();
		assert_eq!(clusters, expected);

		let clusters = segmenter.update_dynamic(&DynamicImage::ImageRgb8(red_corner())).unwrap();
		assert_eq!(clusters, expected);

		let gray = DynamicImage::ImageLuma8(GrayImage::new(4, 4));
		assert!(matches!(
			segmenter.update_dynamic(&gray),
			Err(SegmentError::UnsupportedPixelFormat(image::ColorType::L8))
		));
		assert_eq!(segmenter.generation(), 3);
	}

	#[test]
	fn strided_frames() {
		let image = red_corner();
		let mut data = Vec::new();
		for row in image.rows() {
			for pixel in row {
				data.extend(pixel.0);
			}
			data.extend([0xAA; 5]);
		}

		let mut segmenter = Segmenter::new(4, 4, exact_config()).unwrap();
		let expected = segmenter.update(&image).unwrap().to_vec();
		let frame = Frame::new(&data, 4, 4, 4 * 3 + 5, 3).unwrap();
		assert_eq!(segmenter.update_frame(frame).unwrap(), expected);
	}

	#[test]
	fn invalid_construction_is_rejected() {
		assert!(matches!(
			Segmenter::new(0, 5, SegmenterConfig::default()),
			Err(SegmentError::EmptyGrid { width: 0, height: 5 })
		));
		assert!(matches!(
			Segmenter::new(u32::MAX, 2, SegmenterConfig::default()),
			Err(SegmentError::GridTooLarge { .. })
		));
		assert!(matches!(
			Segmenter::new(4, 4, SegmenterConfig::default().with_similarity_threshold(-1.0)),
			Err(SegmentError::InvalidConfig(_))
		));
	}

	#[test]
	fn invalid_settings_keep_the_old_value() {
		let mut segmenter = Segmenter::new(4, 4, SegmenterConfig::default()).unwrap();
		assert!(segmenter.set_noise_threshold(2.0).is_err());
		assert!(segmenter.set_similarity_threshold(f32::NAN).is_err());
		assert_eq!(*segmenter.config(), SegmenterConfig::default());

		segmenter.set_similarity_threshold(10.0).unwrap();
		assert_eq!(*segmenter.config(), SegmenterConfig::default().with_similarity_threshold(10.0));
	}

	#[test]
	fn higher_threshold_merges_regions() {
		// Adjacent grays one lightness step apart
		let image = RgbImage::from_fn(30, 10, |x, _| if x < 15 { Rgb([118, 118, 118]) } else { Rgb([121, 121, 121]) });
		let mut segmenter = Segmenter::new(30, 10, exact_config().with_similarity_threshold(0.5)).unwrap();
		assert_eq!(segmenter.update(&image).unwrap().len(), 2);

		segmenter.set_similarity_threshold(3.0).unwrap();
		assert_eq!(segmenter.update(&image).unwrap().len(), 1);
	}

	#[test]
	fn render_uses_view_mode() {
		let mut segmenter = Segmenter::new(4, 4, exact_config()).unwrap();
		segmenter.update(&red_corner()).unwrap();

		let clusters = segmenter.render();
		assert_eq!(clusters.get_pixel(0, 0).0, visualize::DISPLAY_PALETTE[0]);
		assert_eq!(clusters.get_pixel(3, 3).0, visualize::DISPLAY_PALETTE[1]);

		segmenter.set_view_mode(ViewMode::Image);
		assert_eq!(segmenter.render(), red_corner());

		// Every pixel of the corner case has at least two similar sides
		let distances = segmenter.render_mode(ViewMode::PixelDistances);
		assert!(distances.pixels().all(|p| p.0[0] >= 100));
		assert_eq!(distances.get_pixel(3, 3).0, [200; 3]);
	}
}
