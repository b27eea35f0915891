//! Per-pixel similarity between each pixel and its four neighbors

use crate::LabPixel;

/// Index of the flag for the neighbor above
pub const TOP: usize = 0;
/// Index of the flag for the neighbor to the left
pub const LEFT: usize = 1;
/// Index of the flag for the neighbor to the right
pub const RIGHT: usize = 2;
/// Index of the flag for the neighbor below
pub const BOTTOM: usize = 3;

/// Whether a pixel is similar to each of its top, left, right, and bottom neighbors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SimilarityFlags(pub [bool; 4]);

impl SimilarityFlags {
	/// Similar to every neighbor
	pub const ALL: Self = Self([true; 4]);
	/// Similar to no neighbor
	pub const NONE: Self = Self([false; 4]);

	/// Create flags from each direction
	#[must_use]
	pub const fn new(top: bool, left: bool, right: bool, bottom: bool) -> Self {
		// same order as TOP, LEFT, RIGHT, BOTTOM
		Self([top, left, right, bottom])
	}

	/// Similar to the neighbor above
	#[must_use]
	pub const fn top(self) -> bool {
		self.0[TOP]
	}

	/// Similar to the neighbor on the left
	#[must_use]
	pub const fn left(self) -> bool {
		self.0[LEFT]
	}

	/// Similar to the neighbor on the right
	#[must_use]
	pub const fn right(self) -> bool {
		self.0[RIGHT]
	}

	/// Similar to the neighbor below
	#[must_use]
	pub const fn bottom(self) -> bool {
		self.0[BOTTOM]
	}

	/// The number of similar neighbors
	#[must_use]
	pub fn count(self) -> u32 {
		self.0.iter().map(|&similar| u32::from(similar)).sum()
	}
}

/// Compute the similarity flags for the pixel at `index` in a `width` x `height` grid.
///
/// Neighbors outside the grid are clamped to the nearest row or column,
/// so border pixels compare against themselves and are always similar on that side.
#[must_use]
pub fn similarity_at(lab: &[LabPixel], width: usize, height: usize, index: usize, threshold: f32) -> SimilarityFlags {
	let x = index % width;
	let y = index / width;

	let center = lab[index].to_lab();
	let is_similar = |nx: usize, ny: usize| {
		let neighbor = lab[ny * width + nx].to_lab();
		crate::difference::cie94(center, neighbor) <= threshold
	};

	SimilarityFlags::new(
		is_similar(x, y.saturating_sub(1)),
		is_similar(x.saturating_sub(1), y),
		is_similar(usize::min(x + 1, width - 1), y),
		is_similar(x, usize::min(y + 1, height - 1)),
	)
}
