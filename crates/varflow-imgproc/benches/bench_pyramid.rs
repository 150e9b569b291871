use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::Rng;

use varflow_image::Image;
use varflow_imgproc::parallel::ExecutionStrategy;
use varflow_imgproc::pyramid::ImagePyramid;
use varflow_imgproc::warp::{resample_flow, warp_by_flow};

fn bench_pyramid(c: &mut Criterion) {
    let mut group = c.benchmark_group("Pyramid Operations");
    let mut rng = rand::rng();

    for (width, height) in [(256, 224), (512, 448), (1024, 896)].iter() {
        group.throughput(criterion::Throughput::Elements((*width * *height) as u64));

        let parameter_string = format!("{}x{}", width, height);

        let image_size = [*width, *height].into();
        let image_data = (0..(*width * *height))
            .map(|_| rng.random_range(0.0..255.0))
            .collect();
        let image = Image::<f32, 1>::new(image_size, image_data).unwrap();
        let flow_data = (0..(*width * *height * 2))
            .map(|_| rng.random_range(-2.0..2.0))
            .collect();
        let flow = Image::<f32, 2>::new(image_size, flow_data).unwrap();

        group.bench_with_input(
            BenchmarkId::new("pyramid_4_levels", &parameter_string),
            &image,
            |b, src| {
                b.iter(|| {
                    black_box(ImagePyramid::build(
                        src,
                        4,
                        1.0,
                        ExecutionStrategy::ParallelRows,
                    ))
                    .unwrap();
                })
            },
        );

        group.bench_with_input(
            BenchmarkId::new("warp_by_flow", &parameter_string),
            &(&image, &flow),
            |b, i| {
                b.iter(|| {
                    black_box(warp_by_flow(i.0, i.1, ExecutionStrategy::ParallelRows)).unwrap();
                })
            },
        );

        group.bench_with_input(
            BenchmarkId::new("resample_flow", &parameter_string),
            &(&image, &flow),
            |b, i| {
                b.iter(|| {
                    black_box(resample_flow(i.1, i.0, 2.0, ExecutionStrategy::ParallelRows))
                        .unwrap();
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_pyramid);
criterion_main!(benches);
