use colorseg::{Segmenter, SegmenterConfig};
use criterion::{
	black_box, criterion_group, criterion_main, measurement::WallTime, BenchmarkGroup, BenchmarkId, Criterion,
	SamplingMode,
};
use std::time::Duration;

#[path = "../util/util.rs"]
mod util;

const SIZES: [(u32, u32); 2] = [(640, 480), (1920, 1080)];

fn create_group<'a>(c: &'a mut Criterion, name: &'a str) -> BenchmarkGroup<'a, WallTime> {
	let mut group = c.benchmark_group(name);
	group
		.sample_size(30)
		.noise_threshold(0.05)
		.sampling_mode(SamplingMode::Flat)
		.warm_up_time(Duration::from_millis(500));
	group
}

fn bench_config(group: &mut BenchmarkGroup<WallTime>, name: &str, config: SegmenterConfig) {
	for (width, height) in SIZES {
		for (image_name, image) in util::synthetic_images(width, height) {
			let mut segmenter = Segmenter::new(width, height, config).expect("valid config");
			group.bench_with_input(
				BenchmarkId::new(name, format!("{image_name} {width}x{height}")),
				&image,
				|b, image| {
					b.iter(|| segmenter.update(black_box(image)).expect("matching dimensions").len());
				},
			);
		}
	}
}

fn pipeline(c: &mut Criterion) {
	let mut group = create_group(c, "pipeline");
	group.measurement_time(Duration::from_secs(4));

	bench_config(&mut group, "default", SegmenterConfig::default());
	bench_config(&mut group, "no blur", SegmenterConfig::default().with_blur(false));
	bench_config(&mut group, "no noise removal", SegmenterConfig::default().with_noise_removal(false));
	bench_config(
		&mut group,
		"labeling only",
		SegmenterConfig::default().with_blur(false).with_noise_removal(false),
	);
}

fn stages(c: &mut Criterion) {
	use colorseg::{
		label::{label_regions, UnionFind},
		Accelerator, CpuAccelerator, LabPixel, SimilarityFlags,
	};
	use palette::Srgb;

	let mut group = create_group(c, "stages");
	let (width, height) = SIZES[1];
	let (w, h) = (width as usize, height as usize);
	let image = util::noisy_blocks(width, height, 3, 6);
	let pixels = image.pixels().map(|p| Srgb::new(p.0[0], p.0[1], p.0[2])).collect::<Vec<_>>();

	let mut blurred = vec![Srgb::new(0, 0, 0); w * h];
	group.bench_function("blur", |b| b.iter(|| CpuAccelerator.gaussian_blur(&pixels, &mut blurred, w, h)));

	let mut lab = vec![LabPixel::default(); w * h];
	group.bench_function("lab", |b| b.iter(|| CpuAccelerator.rgb_to_lab(&pixels, &mut lab, 255.0)));

	let mut flags = vec![SimilarityFlags::NONE; w * h];
	group.bench_function("similarity", |b| {
		b.iter(|| CpuAccelerator.lab_similarity(&lab, &mut flags, w, h, black_box(3.0)));
	});

	let mut denoised = vec![SimilarityFlags::NONE; w * h];
	group.bench_function("noise removal", |b| {
		b.iter(|| CpuAccelerator.remove_noise(&flags, &mut denoised, w, h, black_box(0.9)));
	});

	let mut labels = vec![0; w * h];
	let mut table = UnionFind::with_capacity(w * h);
	group.bench_function("labeling", |b| {
		b.iter(|| label_regions(&denoised, w, h, &mut labels, &mut table));
	});
}

criterion_group!(benches, pipeline, stages);
criterion_main!(benches);
