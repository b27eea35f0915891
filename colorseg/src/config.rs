//! Tunable parameters of a segmentation run

use crate::{Result, SegmentError, ViewMode};

/// Options for a [`Segmenter`](crate::Segmenter)
///
/// See the crate documentation for what each option does.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmenterConfig {
	/// Largest CIE94 distance at which neighboring pixels are linked
	pub similarity_threshold: f32,
	/// Whether to run the majority filter over the similarity map
	pub noise_removal: bool,
	/// Fraction of similar links in a window above which a pixel is linked to all neighbors
	pub noise_threshold: f32,
	/// Whether to blur the image before color conversion
	pub blur: bool,
	/// Regions with fewer pixels are not reported as clusters
	pub min_cluster_size: u32,
	/// What [`Segmenter::render`](crate::Segmenter::render) draws
	pub view_mode: ViewMode,
}

impl SegmenterConfig {
	/// Default similarity threshold
	pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 3.0;
	/// Default noise threshold
	pub const DEFAULT_NOISE_THRESHOLD: f32 = 0.9;
	/// Default minimum cluster size
	pub const DEFAULT_MIN_CLUSTER_SIZE: u32 = 200;

	/// Create the default configuration
	#[must_use]
	pub const fn new() -> Self {
		Self {
			similarity_threshold: Self::DEFAULT_SIMILARITY_THRESHOLD,
			noise_removal: true,
			noise_threshold: Self::DEFAULT_NOISE_THRESHOLD,
			blur: true,
			min_cluster_size: Self::DEFAULT_MIN_CLUSTER_SIZE,
			view_mode: ViewMode::Clusters,
		}
	}

	/// Set the similarity threshold
	#[must_use]
	pub const fn with_similarity_threshold(mut self, threshold: f32) -> Self {
		self.similarity_threshold = threshold;
		self
	}

	/// Enable or disable noise removal
	#[must_use]
	pub const fn with_noise_removal(mut self, enabled: bool) -> Self {
		self.noise_removal = enabled;
		self
	}

	/// Set the noise threshold, a fraction in `0.0..=1.0`
	#[must_use]
	pub const fn with_noise_threshold(mut self, threshold: f32) -> Self {
		self.noise_threshold = threshold;
		self
	}

	/// Enable or disable the pre-blur
	#[must_use]
	pub const fn with_blur(mut self, enabled: bool) -> Self {
		self.blur = enabled;
		self
	}

	/// Set the minimum cluster size
	#[must_use]
	pub const fn with_min_cluster_size(mut self, size: u32) -> Self {
		self.min_cluster_size = size;
		self
	}

	/// Set the view mode
	#[must_use]
	pub const fn with_view_mode(mut self, mode: ViewMode) -> Self {
		self.view_mode = mode;
		self
	}

	/// Check that every value is in range
	///
	/// # Errors
	/// Returns [`SegmentError::InvalidConfig`] if the similarity threshold is negative or not finite,
	/// or if the noise threshold is outside `0.0..=1.0`.
	pub fn validate(&self) -> Result<()> {
		if !(self.similarity_threshold.is_finite() && self.similarity_threshold >= 0.0) {
			return Err(SegmentError::InvalidConfig(format!(
				"similarity threshold must be a non-negative number, got {}",
				self.similarity_threshold
			)));
		}

		if !(0.0..=1.0).contains(&self.noise_threshold) {
			return Err(SegmentError::InvalidConfig(format!(
				"noise threshold must be in 0.0..=1.0, got {}",
				self.noise_threshold
			)));
		}

		Ok(())
	}
}

impl Default for SegmenterConfig {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_is_valid() {
		let config = SegmenterConfig::default();
		assert!(config.validate().is_ok());
		assert!(config.noise_removal);
		assert!(config.blur);
		assert_eq!(config.min_cluster_size, 200);
		assert_eq!(config.view_mode, ViewMode::Clusters);
	}

	#[test]
	fn builders_set_fields() {
		let config = SegmenterConfig::new()
			.with_similarity_threshold(5.5)
			.with_noise_removal(false)
			.with_noise_threshold(0.8)
			.with_blur(false)
			.with_min_cluster_size(1)
			.with_view_mode(ViewMode::Image);

		assert_eq!(
			config,
			SegmenterConfig {
				similarity_threshold: 5.5,
				noise_removal: false,
				noise_threshold: 0.8,
				blur: false,
				min_cluster_size: 1,
				view_mode: ViewMode::Image,
			}
		);
	}

	#[test]
	fn out_of_range_values_are_rejected() {
		let config = SegmenterConfig::default();
		for threshold in [-1.0, f32::NAN, f32::INFINITY] {
			assert!(matches!(
				config.with_similarity_threshold(threshold).validate(),
				Err(SegmentError::InvalidConfig(_))
			));
		}
		for threshold in [-0.1, 1.1, f32::NAN] {
			assert!(matches!(
				config.with_noise_threshold(threshold).validate(),
				Err(SegmentError::InvalidConfig(_))
			));
		}

		assert!(config.with_similarity_threshold(0.0).validate().is_ok());
		assert!(config.with_noise_threshold(0.0).validate().is_ok());
		assert!(config.with_noise_threshold(1.0).validate().is_ok());
	}
}
