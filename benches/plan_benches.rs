use bevy_gpu_sort::cpu::bitonic::sort_with_plan;
use bevy_gpu_sort::gpu::buffers::random_values;
use bevy_gpu_sort::gpu::plan::build_plan;
use criterion::{Criterion, criterion_group, criterion_main};

fn bench_build_plan(c: &mut Criterion) {
    // 2^20 elements -> 210 dispatches
    c.bench_function("build_plan_1m", |b| b.iter(|| build_plan(1 << 20)));
}

fn bench_cpu_sort(c: &mut Criterion) {
    let plan = build_plan(1 << 14).unwrap();
    let values = random_values(1 << 14, 3);

    c.bench_function("cpu_sort_16k", |b| {
        b.iter(|| {
            let mut data = values.clone();
            sort_with_plan(&mut data, &plan).unwrap();
            data
        })
    });
}

criterion_group!(benches, bench_build_plan, bench_cpu_sort);
criterion_main!(benches);
