//! Segment an image into connected regions of perceptually similar color.
//!
//! Each pixel is converted to a quantized Lab color and compared against its four neighbors
//! using the CIE94 color difference. Neighbors closer than a threshold are linked,
//! isolated dissimilar links are optionally erased by a local majority filter,
//! and the linked pixels are grouped into regions with a single raster scan over the image.
//! Every region large enough is summarized as a [`Cluster`].
//!
//! # Examples
//!
//! ## Segment an image once
//!
//! ```no_run
//! use colorseg::{Segmenter, SegmenterConfig};
//!
//! let image = image::open("some image").unwrap().into_rgb8();
//! let mut segmenter = Segmenter::new(image.width(), image.height(), SegmenterConfig::default()).unwrap();
//! let clusters = segmenter.update(&image).unwrap();
//! println!("found {} clusters", clusters.len());
//! ```
//!
//! ## Find the reddest pure region
//!
//! ```no_run
//! use colorseg::{query, ReferenceColor, Segmenter, SegmenterConfig};
//!
//! let image = image::open("some image").unwrap().into_rgb8();
//! let mut segmenter = Segmenter::new(image.width(), image.height(), SegmenterConfig::default()).unwrap();
//! let clusters = segmenter.update(&image).unwrap();
//!
//! let pure = query::pure_clusters(clusters);
//! let reddest = query::sorted_by_reference(&pure, ReferenceColor::Red).into_iter().next();
//! ```
//!
//! ## Share results between threads
//!
//! ```no_run
//! use colorseg::{SegmenterConfig, SharedSegmenter};
//! use std::sync::Arc;
//!
//! let image = image::open("some image").unwrap().into_rgb8();
//! let shared = Arc::new(SharedSegmenter::new(image.width(), image.height(), SegmenterConfig::default()).unwrap());
//!
//! let reader = Arc::clone(&shared);
//! std::thread::spawn(move || {
//! 	let latest = reader.latest();
//! 	println!("generation {} has {} clusters", latest.generation(), latest.clusters().len());
//! });
//!
//! shared.update(&image).unwrap();
//! ```
//!
//! # Arguments
//!
//! The options below live in [`SegmenterConfig`].
//!
//! ## Similarity Threshold
//!
//! The largest CIE94 distance at which two neighboring pixels are still considered the same color.
//!
//! The default of `3.0` sits just above the "just noticeable difference".
//! Higher values merge more regions together, lower values split regions along soft gradients.
//!
//! ## Noise Removal and Noise Threshold
//!
//! When enabled, each pixel looks at the similarity links in the 9x9 window around it.
//! If more than `noise_threshold` of those links are "similar",
//! the pixel is treated as noise and linked to all of its neighbors.
//!
//! Values between `0.8` and `0.9` work well. `0.9` is the default.
//!
//! ## Blur
//!
//! A small 7x7 gaussian blur applied before color conversion.
//! This smooths over dithering and sensor noise which would otherwise break up regions.
//!
//! ## Minimum Cluster Size
//!
//! Regions with fewer pixels than this are dropped from the cluster list.
//! They still have labels in the label map.

#![deny(unsafe_code)]
#![warn(clippy::pedantic, clippy::cargo)]
#![warn(clippy::use_debug, clippy::dbg_macro, clippy::todo, clippy::unimplemented)]
#![warn(clippy::unwrap_used, clippy::unwrap_in_result)]
#![warn(clippy::unneeded_field_pattern, clippy::rest_pat_in_fully_bound_structs)]
#![warn(clippy::unnecessary_self_imports)]
#![warn(clippy::str_to_string, clippy::string_to_string, clippy::string_slice)]
#![warn(missing_docs, clippy::missing_docs_in_private_items, rustdoc::all)]
#![warn(clippy::float_cmp_const, clippy::lossy_float_literal)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::enum_glob_use)]
#![allow(clippy::unreadable_literal)]

pub mod accel;
mod blur;
pub mod cluster;
mod config;
pub mod difference;
mod error;
pub mod frame;
pub mod label;
pub mod lab;
mod noise;
mod pipeline;
pub mod query;
mod shared;
pub mod similarity;
pub mod visualize;

pub use accel::{Accelerator, CpuAccelerator};
pub use cluster::{BoundingBox, Centroid, Cluster};
pub use config::SegmenterConfig;
pub use error::{Result, SegmentError};
pub use frame::Frame;
pub use lab::LabPixel;
pub use pipeline::Segmenter;
pub use query::ReferenceColor;
pub use shared::{Segmentation, SharedSegmenter};
pub use similarity::SimilarityFlags;
pub use visualize::ViewMode;
