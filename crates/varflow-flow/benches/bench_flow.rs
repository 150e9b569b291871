use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use varflow_flow::config::{ClgConfig, HornSchunckConfig, SweepMode};
use varflow_flow::engine::{ClgEngine, ComputeOptions, FlowEngine, HornSchunckEngine};
use varflow_flow::structure_tensor::StructureTensorBuilder;
use varflow_image::{ImageSize, ScalarImage};

fn translated_pair(size: ImageSize) -> (ScalarImage, ScalarImage) {
    let f = |x: f32, y: f32| 50.0 * (0.3 * x).sin() + 50.0 * (0.25 * y).cos();
    let fixed = ScalarImage::from_fn(size, |x, y| [f(x as f32, y as f32)]);
    let moving = ScalarImage::from_fn(size, |x, y| [f(x as f32 - 1.0, y as f32)]);
    (fixed, moving)
}

fn bench_flow(c: &mut Criterion) {
    let mut group = c.benchmark_group("Flow");
    group.sample_size(10);

    for (width, height) in [(128, 96), (256, 224)].iter() {
        group.throughput(criterion::Throughput::Elements((*width * *height) as u64));

        let parameter_string = format!("{}x{}", width, height);
        let (fixed, moving) = translated_pair([*width, *height].into());

        group.bench_with_input(
            BenchmarkId::new("structure_tensor", &parameter_string),
            &(&fixed, &moving),
            |b, i| {
                let builder = StructureTensorBuilder::new().fixed(i.0).moving(i.1);
                b.iter(|| black_box(builder.build()).unwrap())
            },
        );

        for sweep in [SweepMode::InPlace, SweepMode::DoubleBuffered] {
            let engine = ClgEngine::new(ClgConfig {
                iterations: 20,
                relaxation: 1.0,
                sweep,
                ..Default::default()
            })
            .unwrap();
            group.bench_with_input(
                BenchmarkId::new(format!("clg_{sweep:?}"), &parameter_string),
                &(&fixed, &moving),
                |b, i| {
                    b.iter(|| {
                        black_box(engine.compute(i.0, i.1, &ComputeOptions::default())).unwrap()
                    })
                },
            );
        }

        let engine = HornSchunckEngine::new(HornSchunckConfig {
            iterations: 20,
            ..Default::default()
        })
        .unwrap();
        group.bench_with_input(
            BenchmarkId::new("horn_schunck", &parameter_string),
            &(&fixed, &moving),
            |b, i| b.iter(|| black_box(engine.compute(i.0, i.1, &ComputeOptions::default())).unwrap()),
        );
    }
    group.finish();
}

criterion_group!(benches, bench_flow);
criterion_main!(benches);
