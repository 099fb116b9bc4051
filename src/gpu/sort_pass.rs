use std::sync::Arc;

use bevy::log::info;

use crate::ComputeConfig;
use crate::error::ComputeError;
use crate::gpu::buffers::{create_buffer_with_data, random_values};
use crate::gpu::dispatch::{BufferHandle, ComputeBackend};
use crate::gpu::pipeline::FramePass;
use crate::gpu::plan::{PlanCache, SortPlan};

/// What a consumer binds once the sort has run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SortOutput {
    pub buffer: BufferHandle,
    pub count: u32,
}

/// Sorts one buffer of random values the first frame it is recorded.
pub struct SortPass {
    plan: Arc<SortPlan>,
    buffer: BufferHandle,
    computed: bool,
}

impl SortPass {
    /// Acquires a buffer of `plan.count()` random values drawn from `seed`.
    pub fn new<B: ComputeBackend + ?Sized>(
        backend: &mut B,
        plan: Arc<SortPlan>,
        seed: u64,
    ) -> Result<Self, ComputeError> {
        let values = random_values(plan.count(), seed);
        Self::with_contents(backend, plan, &values)
    }

    pub fn with_contents<B: ComputeBackend + ?Sized>(
        backend: &mut B,
        plan: Arc<SortPlan>,
        contents: &[f32],
    ) -> Result<Self, ComputeError> {
        if contents.len() != plan.count() as usize {
            return Err(ComputeError::PlanMismatch {
                plan: plan.count(),
                len: contents.len(),
            });
        }
        plan.check_backend(backend)?;
        let buffer = create_buffer_with_data(backend, "sort_idx_buffer", contents)?;
        info!(
            "sort pass: {} elements, {} dispatches queued",
            plan.count(),
            plan.len()
        );
        Ok(Self {
            plan,
            buffer,
            computed: false,
        })
    }

    pub fn from_config<B: ComputeBackend + ?Sized>(
        backend: &mut B,
        config: &ComputeConfig,
        cache: &mut PlanCache,
    ) -> Result<Self, ComputeError> {
        let plan = cache.get_or_build(config.sort_count)?;
        Self::new(backend, plan, config.seed)
    }

    pub fn plan(&self) -> &SortPlan {
        &self.plan
    }

    pub fn buffer(&self) -> BufferHandle {
        self.buffer
    }

    pub fn is_computed(&self) -> bool {
        self.computed
    }

    /// `None` until the sort has been recorded.
    pub fn sorted(&self) -> Option<SortOutput> {
        self.computed.then_some(SortOutput {
            buffer: self.buffer,
            count: self.plan.count(),
        })
    }
}

impl<B: ComputeBackend> FramePass<B> for SortPass {
    fn label(&self) -> &str {
        "bitonic_sort_pass"
    }

    fn record(&mut self, backend: &mut B, frame: u64) -> Result<(), ComputeError> {
        if self.computed {
            return Ok(());
        }
        self.plan.record(backend, self.buffer)?;
        self.computed = true;
        info!(
            "sort pass: sorted {} elements on frame {}",
            self.plan.count(),
            frame
        );
        Ok(())
    }

    fn output(&self) -> Option<BufferHandle> {
        self.sorted().map(|o| o.buffer)
    }

    fn release(&mut self, backend: &mut B) {
        backend.release_buffer(self.buffer);
    }
}
