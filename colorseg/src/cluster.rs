//! Per-region statistics gathered from a label map

use crate::LabPixel;
use palette::Srgb;

/// Axis-aligned bounding box over the pixels of a region, inclusive on all sides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoundingBox {
	/// Smallest x coordinate of any pixel in the region
	pub min_x: u32,
	/// Smallest y coordinate of any pixel in the region
	pub min_y: u32,
	/// Largest x coordinate of any pixel in the region
	pub max_x: u32,
	/// Largest y coordinate of any pixel in the region
	pub max_y: u32,
}

impl BoundingBox {
	/// The number of columns covered by the box
	#[must_use]
	pub const fn width(&self) -> u32 {
		self.max_x - self.min_x + 1
	}

	/// The number of rows covered by the box
	#[must_use]
	pub const fn height(&self) -> u32 {
		self.max_y - self.min_y + 1
	}

	/// Whether `point` lies inside the box and on none of its edges
	#[must_use]
	#[allow(clippy::cast_precision_loss)]
	pub fn strictly_contains(&self, point: Centroid) -> bool {
		(self.min_x as f32) < point.x
			&& point.x < self.max_x as f32
			&& (self.min_y as f32) < point.y
			&& point.y < self.max_y as f32
	}
}

/// Center of mass of a region in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Centroid {
	/// Mean x coordinate
	pub x: f32,
	/// Mean y coordinate
	pub y: f32,
}

/// Summary of one connected region of similar color
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cluster {
	/// Label of the region in the label map
	label: u32,
	/// Number of pixels in the region
	size: u32,
	/// Mean sRGB color
	rgb: Srgb<u8>,
	/// Mean color converted to Lab
	color: LabPixel,
	/// Mean pixel coordinate
	centroid: Centroid,
	/// Tight bounds over every pixel
	bounds: BoundingBox,
}

impl Cluster {
	/// The label of this region in the label map it was built from
	#[must_use]
	pub const fn label(&self) -> u32 {
		self.label
	}

	/// The number of pixels in this region
	#[must_use]
	pub const fn size(&self) -> u32 {
		self.size
	}

	/// The mean sRGB color of this region
	#[must_use]
	pub const fn rgb(&self) -> Srgb<u8> {
		self.rgb
	}

	/// The mean color of this region in Lab
	#[must_use]
	pub const fn color(&self) -> LabPixel {
		self.color
	}

	/// The mean pixel coordinate of this region
	#[must_use]
	pub const fn centroid(&self) -> Centroid {
		self.centroid
	}

	/// The bounding box of this region
	#[must_use]
	pub const fn bounds(&self) -> BoundingBox {
		self.bounds
	}

	/// Whether no other cluster in `clusters` has its centroid strictly inside this cluster's bounding box
	///
	/// `clusters` may contain `self`, which is skipped.
	#[must_use]
	pub fn is_pure(&self, clusters: &[Cluster]) -> bool {
		clusters
			.iter()
			.filter(|other| other.label != self.label)
			.all(|other| !self.bounds.strictly_contains(other.centroid))
	}
}

/// Running sums for one region
#[derive(Debug, Clone, Copy)]
struct Accumulator {
	/// Label of the region
	label: u32,
	/// Sum of each color channel
	color: [u64; 3],
	/// Sum of x coordinates
	x: u64,
	/// Sum of y coordinates
	y: u64,
	/// Running bounds
	bounds: BoundingBox,
	/// Number of accumulated pixels
	count: u32,
}

impl Accumulator {
	/// Create an empty [`Accumulator`] for `label`
	const fn new(label: u32) -> Self {
		Self {
			label,
			color: [0; 3],
			x: 0,
			y: 0,
			bounds: BoundingBox {
				min_x: u32::MAX,
				min_y: u32::MAX,
				max_x: 0,
				max_y: 0,
			},
			count: 0,
		}
	}

	/// Add the pixel at `(x, y)` with the given color
	fn add(&mut self, x: u32, y: u32, color: Srgb<u8>) {
		self.color[0] += u64::from(color.red);
		self.color[1] += u64::from(color.green);
		self.color[2] += u64::from(color.blue);
		self.x += u64::from(x);
		self.y += u64::from(y);
		self.bounds.min_x = self.bounds.min_x.min(x);
		self.bounds.min_y = self.bounds.min_y.min(y);
		self.bounds.max_x = self.bounds.max_x.max(x);
		self.bounds.max_y = self.bounds.max_y.max(y);
		self.count += 1;
	}

	/// Build the final [`Cluster`]. `count` must be non-zero.
	fn finish(&self) -> Cluster {
		debug_assert!(self.count > 0);
		let n = u64::from(self.count);

		// rounded division, the mean of u8 values is at most u8::MAX
		#[allow(clippy::cast_possible_truncation)]
		let [red, green, blue] = self.color.map(|sum| ((sum + n / 2) / n) as u8);
		let rgb = Srgb::new(red, green, blue);

		#[allow(clippy::cast_precision_loss)]
		let centroid = Centroid {
			x: (self.x as f64 / n as f64) as f32,
			y: (self.y as f64 / n as f64) as f32,
		};

		Cluster {
			label: self.label,
			size: self.count,
			rgb,
			color: LabPixel::from_srgb(rgb),
			centroid,
			bounds: self.bounds,
		}
	}
}

/// Marks a label whose region is too small to become a cluster
const DISCARDED: u32 = u32::MAX;

/// Gather a [`Cluster`] for each region in `labels` with at least `min_size` pixels.
///
/// `labels` and `pixels` describe a grid with `width` columns,
/// and every label must be less than `label_count`.
/// Clusters are returned in ascending label order.
/// Regions without any pixels are never returned, even for a `min_size` of `0`.
#[must_use]
pub fn aggregate(
	labels: &[u32],
	pixels: &[Srgb<u8>],
	width: usize,
	label_count: usize,
	min_size: u32,
) -> Vec<Cluster> {
	debug_assert_eq!(labels.len(), pixels.len());

	let mut sizes = vec![0_u32; label_count];
	for &label in labels {
		sizes[label as usize] += 1;
	}

	// Map each surviving label to a dense accumulator index
	let mut accumulators = Vec::new();
	let slots = sizes
		.iter()
		.enumerate()
		.map(|(label, &size)| {
			if size > 0 && size >= min_size {
				#[allow(clippy::cast_possible_truncation)]
				let slot = accumulators.len() as u32;
				#[allow(clippy::cast_possible_truncation)]
				accumulators.push(Accumulator::new(label as u32));
				slot
			} else {
				DISCARDED
			}
		})
		.collect::<Vec<_>>();

	for (y, (row_labels, row_pixels)) in labels.chunks_exact(width).zip(pixels.chunks_exact(width)).enumerate() {
		for (x, (&label, &color)) in row_labels.iter().zip(row_pixels).enumerate() {
			let slot = slots[label as usize];
			if slot != DISCARDED {
				// coordinates are bounded by the grid dimensions, which are u32
				#[allow(clippy::cast_possible_truncation)]
				accumulators[slot as usize].add(x as u32, y as u32, color);
			}
		}
	}

	accumulators.iter().map(Accumulator::finish).collect()
}
