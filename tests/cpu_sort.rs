use bevy_gpu_sort::cpu::bitonic::sort_with_plan;
use bevy_gpu_sort::error::ComputeError;
use bevy_gpu_sort::gpu::plan::{BitonicSortScheduler, build_plan};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn scheduler() -> BitonicSortScheduler {
    BitonicSortScheduler::with_threads_per_group(4).unwrap()
}

#[test]
fn sorts_random_floats() {
    let mut rng = StdRng::seed_from_u64(7);
    for count in [8u32, 16, 64, 1024] {
        let plan = scheduler().build_plan(count).unwrap();
        for _ in 0..10 {
            let mut data: Vec<f32> = (0..count).map(|_| rng.random()).collect();
            let mut expected = data.clone();
            expected.sort_by(|a, b| a.total_cmp(b));

            sort_with_plan(&mut data, &plan).unwrap();
            assert_eq!(data, expected, "count={count}");
        }
    }
}

#[test]
fn sorts_with_duplicates() {
    let mut rng = StdRng::seed_from_u64(42);
    let plan = scheduler().build_plan(256).unwrap();
    let mut data: Vec<u32> = (0..256).map(|_| rng.random_range(0..8)).collect();
    let mut expected = data.clone();
    expected.sort_unstable();

    sort_with_plan(&mut data, &plan).unwrap();
    assert_eq!(data, expected);
}

#[test]
fn reverse_order_input() {
    let plan = build_plan(1024).unwrap();
    let mut data: Vec<i32> = (0..1024).rev().collect();
    sort_with_plan(&mut data, &plan).unwrap();
    assert!(data.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(data[0], 0);
    assert_eq!(data[1023], 1023);
}

#[test]
fn sorted_input_is_unchanged() {
    let plan = scheduler().build_plan(64).unwrap();
    let sorted: Vec<f32> = (0..64).map(|i| i as f32 * 0.5).collect();
    let mut data = sorted.clone();
    sort_with_plan(&mut data, &plan).unwrap();
    assert_eq!(data, sorted);

    // and a second pass over the result
    sort_with_plan(&mut data, &plan).unwrap();
    assert_eq!(data, sorted);
}

#[test]
fn length_must_match_plan() {
    let plan = build_plan(128).unwrap();
    let mut data = vec![0.0f32; 64];
    assert!(matches!(
        sort_with_plan(&mut data, &plan),
        Err(ComputeError::PlanMismatch { plan: 128, len: 64 })
    ));
}
