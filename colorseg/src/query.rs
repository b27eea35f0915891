//! Read-only queries over a finished set of clusters

use crate::{Cluster, LabPixel};
use palette::Srgb;

/// Fixed colors that clusters can be ranked against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceColor {
	/// Pure red, `(255, 0, 0)`
	Red,
	/// Pure green, `(0, 255, 0)`
	Green,
	/// Pure blue, `(0, 0, 255)`
	Blue,
	/// Black, `(0, 0, 0)`
	Black,
	/// White, `(255, 255, 255)`
	White,
}

impl ReferenceColor {
	/// All reference colors
	pub const ALL: [Self; 5] = [Self::Red, Self::Green, Self::Blue, Self::Black, Self::White];

	/// The sRGB value of this reference color
	#[must_use]
	pub const fn srgb(self) -> Srgb<u8> {
		let [red, green, blue] = match self {
			Self::Red => [u8::MAX, 0, 0],
			Self::Green => [0, u8::MAX, 0],
			Self::Blue => [0, 0, u8::MAX],
			Self::Black => [0, 0, 0],
			Self::White => [u8::MAX, u8::MAX, u8::MAX],
		};
		Srgb::new(red, green, blue)
	}

	/// The Lab value of this reference color
	#[must_use]
	pub fn lab(self) -> LabPixel {
		LabPixel::from_srgb(self.srgb())
	}
}

/// Pair each cluster with its distance from `reference`
fn with_distances(clusters: &[Cluster], reference: LabPixel) -> Vec<(f32, Cluster)> {
	clusters
		.iter()
		.map(|&cluster| (reference.distance(cluster.color()), cluster))
		.collect()
}

/// Sort clusters by ascending CIE94 distance from `reference` to each cluster's mean color.
///
/// The sort is stable, so clusters at equal distance keep their relative order.
#[must_use]
pub fn sorted_by_distance(clusters: &[Cluster], reference: LabPixel) -> Vec<Cluster> {
	let mut pairs = with_distances(clusters, reference);
	pairs.sort_by(|(x, _), (y, _)| f32::total_cmp(x, y));
	pairs.into_iter().map(|(_, cluster)| cluster).collect()
}

/// Sort clusters by descending CIE94 distance from `reference` to each cluster's mean color.
///
/// The sort is stable, so clusters at equal distance keep their relative order.
#[must_use]
pub fn sorted_by_distance_desc(clusters: &[Cluster], reference: LabPixel) -> Vec<Cluster> {
	let mut pairs = with_distances(clusters, reference);
	pairs.sort_by(|(x, _), (y, _)| f32::total_cmp(y, x));
	pairs.into_iter().map(|(_, cluster)| cluster).collect()
}

/// Sort clusters so that the cluster closest to `reference` comes first
#[must_use]
pub fn sorted_by_reference(clusters: &[Cluster], reference: ReferenceColor) -> Vec<Cluster> {
	sorted_by_distance(clusters, reference.lab())
}

/// Sort clusters so that the cluster furthest from `reference` comes first
#[must_use]
pub fn sorted_by_reference_desc(clusters: &[Cluster], reference: ReferenceColor) -> Vec<Cluster> {
	sorted_by_distance_desc(clusters, reference.lab())
}

/// The clusters whose bounding box contains no other cluster's centroid, in their original order
#[must_use]
pub fn pure_clusters(clusters: &[Cluster]) -> Vec<Cluster> {
	clusters
		.iter()
		.filter(|cluster| cluster.is_pure(clusters))
		.copied()
		.collect()
}

/// CIE94 distance from `reference` to the mean color of `cluster`
#[must_use]
pub fn distance_to(cluster: &Cluster, reference: ReferenceColor) -> f32 {
	reference.lab().distance(cluster.color())
}
