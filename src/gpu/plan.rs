//! Dispatch sequence of a bitonic sorting network.
//!
//! A buffer of `count` elements (a power of two) is sorted by
//! `log2(count) * (log2(count) + 1) / 2` dispatches of the same
//! compare-and-swap kernel. Every dispatch runs `count / 2` threads, one per
//! element pair, and has to see the complete result of the one before it.

use std::collections::HashMap;
use std::sync::Arc;

use bevy::log::debug;
use bevy::prelude::Resource;

use crate::error::{ComputeError, InvalidArgument};
use crate::gpu::dispatch::{Bindings, BufferHandle, ComputeBackend, DispatchDescriptor};
use crate::gpu::ffi::{BitonicParams, THREADS_PER_GROUP};

/// Ordered dispatches that sort one buffer of `count` elements in place.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortPlan {
    count: u32,
    threads_per_group: u32,
    dispatches: Vec<DispatchDescriptor>,
}

impl SortPlan {
    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn threads_per_group(&self) -> u32 {
        self.threads_per_group
    }

    pub fn dispatches(&self) -> &[DispatchDescriptor] {
        &self.dispatches
    }

    pub fn len(&self) -> usize {
        self.dispatches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dispatches.is_empty()
    }

    /// Fails unless `backend` runs groups of the size this plan was built for.
    pub fn check_backend<B: ComputeBackend + ?Sized>(
        &self,
        backend: &B,
    ) -> Result<(), ComputeError> {
        let backend = backend.threads_per_group();
        if backend != self.threads_per_group {
            return Err(ComputeError::GroupSizeMismatch {
                plan: self.threads_per_group,
                backend,
            });
        }
        Ok(())
    }

    /// Issues every dispatch against `buffer`, in order.
    pub fn record<B: ComputeBackend + ?Sized>(
        &self,
        backend: &mut B,
        buffer: BufferHandle,
    ) -> Result<(), ComputeError> {
        // a smaller group size would leave pairs unsorted
        self.check_backend(backend)?;
        let bindings = Bindings::BitonicSort { data: buffer };
        for descriptor in &self.dispatches {
            backend.dispatch(descriptor, &bindings)?;
        }
        Ok(())
    }
}

/// Builds [`SortPlan`]s for a fixed kernel group size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BitonicSortScheduler {
    threads_per_group: u32,
}

impl Default for BitonicSortScheduler {
    fn default() -> Self {
        Self {
            threads_per_group: THREADS_PER_GROUP,
        }
    }
}

impl BitonicSortScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// For kernels compiled with a group size other than [`THREADS_PER_GROUP`].
    pub fn with_threads_per_group(threads_per_group: u32) -> Result<Self, InvalidArgument> {
        if threads_per_group == 0 {
            return Err(InvalidArgument::ZeroThreadsPerGroup);
        }
        Ok(Self { threads_per_group })
    }

    pub fn threads_per_group(&self) -> u32 {
        self.threads_per_group
    }

    pub fn build_plan(&self, count: u32) -> Result<SortPlan, InvalidArgument> {
        if count == 0 {
            return Err(InvalidArgument::ZeroCount);
        }
        if !count.is_power_of_two() {
            return Err(InvalidArgument::NotPowerOfTwo { count });
        }

        let stages = count.trailing_zeros();
        let total = (stages * (stages + 1) / 2) as usize;

        let threads = count >> 1;
        if total > 0 && threads % self.threads_per_group != 0 {
            return Err(InvalidArgument::UnevenThreadGroups {
                threads,
                threads_per_group: self.threads_per_group,
            });
        }
        let groups = threads / self.threads_per_group;

        let mut dispatches = Vec::with_capacity(total);
        for i in 0..stages {
            // inc restarts at the block half-size and halves every pass
            let mut inc = 1u32 << i;
            let dir = 2u32 << i;
            for _ in 0..=i {
                dispatches.push(DispatchDescriptor::bitonic(BitonicParams { inc, dir }, groups));
                inc >>= 1;
            }
        }

        debug!(
            "bitonic plan: {} elements, {} stages, {} dispatches of {} groups",
            count,
            stages,
            dispatches.len(),
            groups
        );

        Ok(SortPlan {
            count,
            threads_per_group: self.threads_per_group,
            dispatches,
        })
    }
}

/// [`BitonicSortScheduler::build_plan`] with the default group size.
pub fn build_plan(count: u32) -> Result<SortPlan, InvalidArgument> {
    BitonicSortScheduler::default().build_plan(count)
}

/// Plans keyed by element count, built on first request.
#[derive(Resource, Default, Debug)]
pub struct PlanCache {
    scheduler: BitonicSortScheduler,
    plans: HashMap<u32, Arc<SortPlan>>,
}

impl PlanCache {
    pub fn new(scheduler: BitonicSortScheduler) -> Self {
        Self {
            scheduler,
            plans: HashMap::new(),
        }
    }

    pub fn get_or_build(&mut self, count: u32) -> Result<Arc<SortPlan>, InvalidArgument> {
        if let Some(plan) = self.plans.get(&count) {
            return Ok(plan.clone());
        }
        let plan = Arc::new(self.scheduler.build_plan(count)?);
        self.plans.insert(count, plan.clone());
        Ok(plan)
    }

    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_element_needs_no_dispatch() {
        let plan = build_plan(1).unwrap();
        assert!(plan.is_empty());
        assert_eq!(plan.count(), 1);
    }

    #[test]
    fn dispatch_count_follows_stage_count() {
        let scheduler = BitonicSortScheduler::with_threads_per_group(1).unwrap();
        for stages in 1..=16u32 {
            let plan = scheduler.build_plan(1 << stages).unwrap();
            assert_eq!(plan.len() as u32, stages * (stages + 1) / 2, "stages={stages}");
        }
    }

    #[test]
    fn dir_is_constant_within_a_stage() {
        let plan = build_plan(4096).unwrap();
        let mut start = 0;
        for i in 0..12u32 {
            let passes = (i + 1) as usize;
            for d in &plan.dispatches()[start..start + passes] {
                assert_eq!(d.bitonic_params().unwrap().dir, 2 << i);
            }
            start += passes;
        }
        assert_eq!(start, plan.len());
    }

    #[test]
    fn zero_group_size_is_rejected() {
        assert_eq!(
            BitonicSortScheduler::with_threads_per_group(0),
            Err(InvalidArgument::ZeroThreadsPerGroup)
        );
    }

    #[test]
    fn cache_reuses_plans() {
        let mut cache = PlanCache::default();
        let a = cache.get_or_build(1024).unwrap();
        let b = cache.get_or_build(1024).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
        assert!(cache.get_or_build(100).is_err());
        assert_eq!(cache.len(), 1);
    }
}
