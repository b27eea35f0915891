use clap::Parser;
use colorseg::{Segmenter, SegmenterConfig};
use itertools::iproduct;

#[path = "../util/util.rs"]
mod util;

/// Print the number of clusters found for each combination of thresholds
#[derive(Parser)]
struct Options {
	#[arg(short = 't', long, default_value = "1,2,3,5,8", value_delimiter = ',')]
	similarity: Vec<f32>,

	#[arg(short = 'n', long, default_value = "0.8,0.85,0.9,1", value_delimiter = ',')]
	noise: Vec<f32>,

	#[arg(short = 'm', long, default_value_t = 200)]
	min_size: u32,

	#[arg(long, default_value_t = 640)]
	width: u32,

	#[arg(long, default_value_t = 480)]
	height: u32,

	#[arg(long)]
	no_blur: bool,
}

fn main() {
	let options = Options::parse();
	let images = util::synthetic_images(options.width, options.height);

	let mut segmenter = Segmenter::new(options.width, options.height, SegmenterConfig::default())
		.expect("non-empty image dimensions");

	let max_name_len = images.iter().map(|(name, _)| name.chars().count()).max().unwrap_or(0);

	const NUM_COL_WIDTH: usize = 8;

	println!(
		"{:width$} {:>NUM_COL_WIDTH$} {:>NUM_COL_WIDTH$} {:>NUM_COL_WIDTH$} {:>NUM_COL_WIDTH$}",
		"image",
		"cie94",
		"noise",
		"clusters",
		"labels",
		width = max_name_len,
	);

	for ((name, image), &similarity, &noise) in iproduct!(&images, &options.similarity, &options.noise) {
		// a noise threshold of 1 can never be exceeded, so it stands for "noise removal off"
		let config = SegmenterConfig::default()
			.with_similarity_threshold(similarity)
			.with_noise_removal(noise < 1.0)
			.with_noise_threshold(noise.min(1.0))
			.with_blur(!options.no_blur)
			.with_min_cluster_size(options.min_size);

		segmenter.set_config(config).expect("thresholds in range");
		let clusters = segmenter.update(image).expect("matching dimensions").len();

		println!(
			"{:width$} {:>NUM_COL_WIDTH$.2} {:>NUM_COL_WIDTH$.2} {:>NUM_COL_WIDTH$} {:>NUM_COL_WIDTH$}",
			name,
			similarity,
			noise,
			clusters,
			segmenter.label_count(),
			width = max_name_len,
		);
	}
}
