use bevy::prelude::Resource;

pub mod error;

pub mod cpu {
    pub mod backend;
    pub mod bitonic;
    pub mod flow;
}

pub mod gpu {
    pub mod ffi;
    pub mod buffers;
    pub mod dispatch;
    pub mod plan;
    pub mod pipeline;
    pub mod sort_pass;
    pub mod flow_pass;
}

use crate::error::{ComputeError, InvalidArgument};
use crate::gpu::dispatch::ComputeBackend;
use crate::gpu::ffi::THREADS_PER_GROUP;
use crate::gpu::flow_pass::FlowPass;
use crate::gpu::pipeline::ComputeContext;
use crate::gpu::plan::{BitonicSortScheduler, PlanCache};
use crate::gpu::sort_pass::SortPass;

#[derive(Resource, Debug, Copy, Clone, PartialEq, Eq)]
pub struct ComputeConfig {
    pub sort_count: u32, // power of two
    pub flow_count: u32,
    pub threads_per_group: u32, // has to match the bitonic kernel
    pub seed: u64,
}

impl Default for ComputeConfig {
    fn default() -> Self {
        Self {
            sort_count: 1024,
            flow_count: 256,
            threads_per_group: THREADS_PER_GROUP,
            seed: 0x5eed,
        }
    }
}

impl ComputeConfig {
    pub fn scheduler(&self) -> Result<BitonicSortScheduler, InvalidArgument> {
        BitonicSortScheduler::with_threads_per_group(self.threads_per_group)
    }

    pub fn plan_cache(&self) -> Result<PlanCache, InvalidArgument> {
        Ok(PlanCache::new(self.scheduler()?))
    }

    /// Context running the sort pass (index 0) then the flow pass (index 1).
    pub fn build_context<B: ComputeBackend>(
        &self,
        backend: B,
    ) -> Result<ComputeContext<B>, ComputeError> {
        let mut cache = self.plan_cache()?;
        let mut context = ComputeContext::new(backend);
        context.add_pass(|backend| SortPass::from_config(backend, self, &mut cache))?;
        context.add_pass(|backend| FlowPass::new(backend, self.flow_count))?;
        Ok(context)
    }
}
