//! A [`Segmenter`] that one thread updates while others read the latest results

use crate::{
	query, Accelerator, Cluster, CpuAccelerator, Frame, ReferenceColor, Result, Segmenter, SegmenterConfig,
	ViewMode,
};
use image::{DynamicImage, RgbImage};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

/// An immutable snapshot of one completed update
#[derive(Debug, Clone, PartialEq)]
pub struct Segmentation {
	/// Grid width
	width: u32,
	/// Grid height
	height: u32,
	/// The update this snapshot came from, `0` before the first update
	generation: u64,
	/// Final label of each pixel, empty before the first update
	labels: Vec<u32>,
	/// Clusters in ascending label order
	clusters: Vec<Cluster>,
}

impl Segmentation {
	/// The snapshot published before any update has finished
	const fn empty(width: u32, height: u32) -> Self {
		Self {
			width,
			height,
			generation: 0,
			labels: Vec::new(),
			clusters: Vec::new(),
		}
	}

	/// Copy the results of the last update out of `segmenter`
	fn capture<A: Accelerator>(segmenter: &Segmenter<A>) -> Self {
		Self {
			width: segmenter.width(),
			height: segmenter.height(),
			generation: segmenter.generation(),
			labels: segmenter.labels().to_vec(),
			clusters: segmenter.clusters().to_vec(),
		}
	}

	/// Grid width
	#[must_use]
	pub const fn width(&self) -> u32 {
		self.width
	}

	/// Grid height
	#[must_use]
	pub const fn height(&self) -> u32 {
		self.height
	}

	/// The number of the update that produced this snapshot. Starts at `1`.
	///
	/// A generation of `0` means no update has finished yet.
	#[must_use]
	pub const fn generation(&self) -> u64 {
		self.generation
	}

	/// Labels in raster order
	#[must_use]
	pub fn labels(&self) -> &[u32] {
		&self.labels
	}

	/// Clusters in ascending label order
	#[must_use]
	pub fn clusters(&self) -> &[Cluster] {
		&self.clusters
	}

	/// The label of the pixel at `(x, y)`, if it is in bounds and an update has finished
	#[must_use]
	pub fn label_at(&self, x: u32, y: u32) -> Option<u32> {
		if x < self.width && y < self.height {
			self.labels.get(y as usize * self.width as usize + x as usize).copied()
		} else {
			None
		}
	}

	/// The cluster with the given label, if it was large enough to be kept
	#[must_use]
	pub fn cluster(&self, label: u32) -> Option<&Cluster> {
		self.clusters
			.binary_search_by_key(&label, Cluster::label)
			.ok()
			.map(|i| &self.clusters[i])
	}

	/// See [`query::sorted_by_reference`]
	#[must_use]
	pub fn sorted_by_reference(&self, reference: ReferenceColor) -> Vec<Cluster> {
		query::sorted_by_reference(&self.clusters, reference)
	}

	/// See [`query::sorted_by_reference_desc`]
	#[must_use]
	pub fn sorted_by_reference_desc(&self, reference: ReferenceColor) -> Vec<Cluster> {
		query::sorted_by_reference_desc(&self.clusters, reference)
	}

	/// See [`query::pure_clusters`]
	#[must_use]
	pub fn pure_clusters(&self) -> Vec<Cluster> {
		query::pure_clusters(&self.clusters)
	}
}

/// Shares one [`Segmenter`] between a producer and any number of readers
///
/// The pipeline sits behind a mutex that is held for a whole update,
/// so updates and configuration changes never interleave.
/// Readers only ever see complete [`Segmentation`] snapshots,
/// which are swapped in after an update succeeds.
#[derive(Debug)]
pub struct SharedSegmenter<A: Accelerator = CpuAccelerator> {
	/// The pipeline and its buffers
	pipeline: Mutex<Segmenter<A>>,
	/// The latest snapshot
	published: RwLock<Arc<Segmentation>>,
}

impl SharedSegmenter<CpuAccelerator> {
	/// Create a [`SharedSegmenter`] around a new CPU [`Segmenter`]
	///
	/// # Errors
	/// See [`Segmenter::new`].
	pub fn new(width: u32, height: u32, config: SegmenterConfig) -> Result<Self> {
		Segmenter::new(width, height, config).map(Self::from_segmenter)
	}
}

impl<A: Accelerator> SharedSegmenter<A> {
	/// Share an existing [`Segmenter`], publishing its last results if it has any
	#[must_use]
	pub fn from_segmenter(segmenter: Segmenter<A>) -> Self {
		let snapshot = if segmenter.generation() == 0 {
			Segmentation::empty(segmenter.width(), segmenter.height())
		} else {
			Segmentation::capture(&segmenter)
		};

		Self {
			pipeline: Mutex::new(segmenter),
			published: RwLock::new(Arc::new(snapshot)),
		}
	}

	/// Publish the results currently held by `pipeline`
	fn publish(&self, pipeline: &Segmenter<A>) -> Arc<Segmentation> {
		let snapshot = Arc::new(Segmentation::capture(pipeline));
		*self.published.write() = Arc::clone(&snapshot);
		tracing::debug!(generation = snapshot.generation(), "published segmentation");
		snapshot
	}

	/// Segment an 8-bit RGB image and publish the result
	///
	/// # Errors
	/// See [`Segmenter::update`]. Nothing is published on error.
	pub fn update(&self, image: &RgbImage) -> Result<Arc<Segmentation>> {
		let mut pipeline = self.pipeline.lock();
		pipeline.update(image)?;
		Ok(self.publish(&pipeline))
	}

	/// Segment an 8-bit RGB or RGBA image and publish the result
	///
	/// # Errors
	/// See [`Segmenter::update_dynamic`]. Nothing is published on error.
	pub fn update_dynamic(&self, image: &DynamicImage) -> Result<Arc<Segmentation>> {
		let mut pipeline = self.pipeline.lock();
		pipeline.update_dynamic(image)?;
		Ok(self.publish(&pipeline))
	}

	/// Segment a raw frame and publish the result
	///
	/// # Errors
	/// See [`Segmenter::update_frame`]. Nothing is published on error.
	pub fn update_frame(&self, frame: Frame<'_>) -> Result<Arc<Segmentation>> {
		let mut pipeline = self.pipeline.lock();
		pipeline.update_frame(frame)?;
		Ok(self.publish(&pipeline))
	}

	/// The most recently published snapshot
	#[must_use]
	pub fn latest(&self) -> Arc<Segmentation> {
		Arc::clone(&self.published.read())
	}

	/// A copy of the current options
	#[must_use]
	pub fn config(&self) -> SegmenterConfig {
		*self.pipeline.lock().config()
	}

	/// Replace all options, waiting for any running update to finish first
	///
	/// # Errors
	/// See [`Segmenter::set_config`].
	pub fn set_config(&self, config: SegmenterConfig) -> Result<()> {
		self.pipeline.lock().set_config(config)
	}

	/// Change the similarity threshold
	///
	/// # Errors
	/// See [`Segmenter::set_similarity_threshold`].
	pub fn set_similarity_threshold(&self, threshold: f32) -> Result<()> {
		self.pipeline.lock().set_similarity_threshold(threshold)
	}

	/// Change the noise threshold
	///
	/// # Errors
	/// See [`Segmenter::set_noise_threshold`].
	pub fn set_noise_threshold(&self, threshold: f32) -> Result<()> {
		self.pipeline.lock().set_noise_threshold(threshold)
	}

	/// Enable or disable noise removal
	pub fn set_noise_removal(&self, enabled: bool) {
		self.pipeline.lock().set_noise_removal(enabled);
	}

	/// Enable or disable the pre-blur
	pub fn set_blur(&self, enabled: bool) {
		self.pipeline.lock().set_blur(enabled);
	}

	/// Change the minimum cluster size
	pub fn set_min_cluster_size(&self, size: u32) {
		self.pipeline.lock().set_min_cluster_size(size);
	}

	/// Change the view mode used by [`SharedSegmenter::render`]
	pub fn set_view_mode(&self, mode: ViewMode) {
		self.pipeline.lock().set_view_mode(mode);
	}

	/// Draw the last update in the configured view mode
	#[must_use]
	pub fn render(&self) -> RgbImage {
		self.pipeline.lock().render()
	}

	/// Run `f` with exclusive access to the underlying [`Segmenter`]
	pub fn with_segmenter<R>(&self, f: impl FnOnce(&Segmenter<A>) -> R) -> R {
		f(&self.pipeline.lock())
	}

	/// Take back the underlying [`Segmenter`]
	#[must_use]
	pub fn into_inner(self) -> Segmenter<A> {
		self.pipeline.into_inner()
	}
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
	use super::*;
	use image::Rgb;
	use std::sync::atomic::{AtomicBool, Ordering};

	const SIZE: u32 = 32;

	fn config() -> SegmenterConfig {
		SegmenterConfig::default()
			.with_blur(false)
			.with_noise_removal(false)
			.with_min_cluster_size(1)
	}

	/// `bands` vertical stripes alternating between black and white
	fn stripes(bands: u32) -> RgbImage {
		RgbImage::from_fn(SIZE, SIZE, |x, _| {
			if (x * bands / SIZE) % 2 == 0 {
				Rgb([0, 0, 0])
			} else {
				Rgb([255, 255, 255])
			}
		})
	}

	#[test]
	fn nothing_is_published_before_the_first_update() {
		let shared = SharedSegmenter::new(SIZE, SIZE, config()).unwrap();
		let latest = shared.latest();
		assert_eq!(latest.generation(), 0);
		assert!(latest.labels().is_empty());
		assert!(latest.clusters().is_empty());
		assert_eq!(latest.label_at(0, 0), None);
	}

	#[test]
	fn update_publishes_a_snapshot() {
		let shared = SharedSegmenter::new(SIZE, SIZE, config()).unwrap();
		let snapshot = shared.update(&stripes(4)).unwrap();

		assert!(Arc::ptr_eq(&snapshot, &shared.latest()));
		assert_eq!(snapshot.generation(), 1);
		assert_eq!(snapshot.clusters().len(), 4);
		assert_eq!(snapshot.labels().len(), (SIZE * SIZE) as usize);
		assert_eq!(snapshot.label_at(0, 0), Some(0));
		assert_eq!(snapshot.label_at(SIZE, 0), None);

		let label = snapshot.label_at(SIZE - 1, SIZE - 1).unwrap();
		assert_eq!(snapshot.cluster(label).map(Cluster::size), Some(SIZE * SIZE / 4));

		let whitest = snapshot.sorted_by_reference(ReferenceColor::White);
		assert_eq!(whitest[0].rgb(), palette::Srgb::new(255, 255, 255));
		assert_eq!(snapshot.pure_clusters().len(), 4);
	}

	#[test]
	fn failed_update_keeps_the_previous_snapshot() {
		let shared = SharedSegmenter::new(SIZE, SIZE, config()).unwrap();
		let first = shared.update(&stripes(2)).unwrap();

		assert!(shared.update(&RgbImage::new(SIZE, SIZE + 1)).is_err());
		assert!(Arc::ptr_eq(&first, &shared.latest()));
		assert!(shared.set_noise_threshold(-0.5).is_err());
		assert_eq!(shared.config(), config());
	}

	#[test]
	fn settings_apply_to_the_next_update() {
		let shared = SharedSegmenter::new(SIZE, SIZE, config()).unwrap();
		assert_eq!(shared.update(&stripes(8)).unwrap().clusters().len(), 8);

		shared.set_min_cluster_size(SIZE * SIZE);
		assert_eq!(shared.latest().clusters().len(), 8);
		assert!(shared.update(&stripes(8)).unwrap().clusters().is_empty());

		shared.set_similarity_threshold(200.0).unwrap();
		shared.set_min_cluster_size(1);
		assert_eq!(shared.update(&stripes(8)).unwrap().clusters().len(), 1);

		shared.set_view_mode(ViewMode::Image);
		assert_eq!(shared.render(), stripes(8));
		assert_eq!(shared.with_segmenter(Segmenter::generation), 3);
		assert_eq!(shared.into_inner().generation(), 3);
	}

	#[test]
	fn readers_only_see_complete_snapshots() {
		let shared = SharedSegmenter::new(SIZE, SIZE, config()).unwrap();
		let images = [stripes(2), stripes(4), stripes(8), stripes(16)];
		let done = AtomicBool::new(false);

		std::thread::scope(|scope| {
			for _ in 0..3 {
				scope.spawn(|| {
					let mut last_generation = 0;
					while !done.load(Ordering::Acquire) {
						let latest = shared.latest();
						assert!(latest.generation() >= last_generation);
						last_generation = latest.generation();

						if latest.generation() > 0 {
							assert_eq!(latest.labels().len(), (SIZE * SIZE) as usize);
							let total = latest.clusters().iter().map(Cluster::size).sum::<u32>();
							assert_eq!(total, SIZE * SIZE);
							assert!([2, 4, 8, 16].contains(&latest.clusters().len()));
						}
					}
				});
			}

			for round in 0..50 {
				let image = &images[round % images.len()];
				let snapshot = shared.update(image).unwrap();
				assert_eq!(snapshot.generation(), round as u64 + 1);
			}
			done.store(true, Ordering::Release);
		});

		assert_eq!(shared.latest().generation(), 50);
	}
}
