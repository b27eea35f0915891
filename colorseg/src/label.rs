//! Connected-component labeling over a similarity map
//!
//! Pixels are visited once in raster order. Each pixel only looks at its top and left neighbors,
//! which have already been labeled, and either starts a new provisional label or reuses a neighbor's.
//! When both neighbors are similar but carry different labels, the two labels are merged
//! in a union-find table that always points toward the smaller label.
//! Once the scan is done the table is flattened so that each entry points straight at its root,
//! and every pixel is relabeled through it.

use crate::SimilarityFlags;

/// Parent table of provisional labels
///
/// Entry `i` points at a label that `i` was merged into, or at itself if `i` is a root.
/// Merges always point a root at a smaller label, so `parent[i] <= i` holds for every entry.
#[derive(Debug, Clone, Default)]
pub struct UnionFind {
	/// Parent label of each provisional label
	parent: Vec<u32>,
}

impl UnionFind {
	/// Create an empty table with room for `capacity` labels
	#[must_use]
	pub fn with_capacity(capacity: usize) -> Self {
		Self { parent: Vec::with_capacity(capacity) }
	}

	/// Remove all labels, keeping the allocation
	pub fn clear(&mut self) {
		self.parent.clear();
	}

	/// The number of provisional labels
	#[must_use]
	pub fn len(&self) -> usize {
		self.parent.len()
	}

	/// Whether no labels have been made
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.parent.is_empty()
	}

	/// Make a new root label
	pub fn make_label(&mut self) -> u32 {
		// The number of labels is at most the number of pixels, which is checked to fit in a u32
		#[allow(clippy::cast_possible_truncation)]
		let label = self.parent.len() as u32;
		self.parent.push(label);
		label
	}

	/// The entry for `label`, which is its root once the table is flattened
	#[must_use]
	pub fn get(&self, label: u32) -> u32 {
		self.parent[label as usize]
	}

	/// Follow `label` up to its root without modifying the table
	#[must_use]
	pub fn root(&self, mut label: u32) -> u32 {
		loop {
			let parent = self.parent[label as usize];
			if parent == label {
				return label;
			}
			label = parent;
		}
	}

	/// Merge the sets containing `x` and `y`, returning the root of the merged set
	///
	/// Both roots are pointed at the smaller of the two.
	pub fn union(&mut self, x: u32, y: u32) -> u32 {
		let x = self.root(x);
		let y = self.root(y);
		let min = u32::min(x, y);
		self.parent[x as usize] = min;
		self.parent[y as usize] = min;
		min
	}

	/// Point every entry directly at its root
	pub fn flatten(&mut self) {
		for i in 0..self.parent.len() {
			let mut label = i;
			let mut parent = self.parent[label] as usize;
			while parent != label {
				label = parent;
				parent = self.parent[label] as usize;
			}

			#[allow(clippy::cast_possible_truncation)]
			{
				self.parent[i] = parent as u32;
			}
		}
	}

	/// The flattened parent table
	#[must_use]
	pub fn as_slice(&self) -> &[u32] {
		&self.parent
	}
}

/// Label each pixel of a `width` x `height` similarity map, writing the final labels to `labels`.
///
/// Two 4-adjacent pixels end up with the same label if and only if
/// they are connected by a chain of pixels where each pixel is similar to the previous one
/// (judged by the top and left flags of the later pixel in raster order).
///
/// Labels are not compacted: each region is labeled with the smallest provisional label
/// assigned to any of its pixels. `table` holds the flattened labels after this returns,
/// and its length is an upper bound for every label in `labels`.
pub fn label_regions(
	flags: &[SimilarityFlags],
	width: usize,
	height: usize,
	labels: &mut [u32],
	table: &mut UnionFind,
) {
	debug_assert_eq!(flags.len(), width * height);
	debug_assert_eq!(labels.len(), width * height);

	table.clear();

	// First pixel
	labels[0] = table.make_label();

	// First row, only the left neighbor exists
	for x in 1..width {
		labels[x] = if flags[x].left() { labels[x - 1] } else { table.make_label() };
	}

	// First column, only the top neighbor exists
	for y in 1..height {
		let i = y * width;
		labels[i] = if flags[i].top() { labels[i - width] } else { table.make_label() };
	}

	for y in 1..height {
		for x in 1..width {
			let i = y * width + x;
			let top = labels[i - width];
			let left = labels[i - 1];

			labels[i] = match (flags[i].top(), flags[i].left()) {
				(false, false) => table.make_label(),
				(true, false) => top,
				(false, true) => left,
				(true, true) if top == left => top,
				(true, true) => table.union(top, left),
			};
		}
	}

	table.flatten();

	for label in labels.iter_mut() {
		*label = table.get(*label);
	}
}
