use thiserror::Error;

use crate::gpu::dispatch::{BufferHandle, KernelId};

/// Rejected input to plan construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidArgument {
    #[error("element count must be non-zero")]
    ZeroCount,

    #[error("element count {count} is not a power of two")]
    NotPowerOfTwo { count: u32 },

    #[error("threads per group must be non-zero")]
    ZeroThreadsPerGroup,

    // count / 2 threads have to fill whole groups
    #[error("{threads} threads do not split into groups of {threads_per_group}")]
    UnevenThreadGroups { threads: u32, threads_per_group: u32 },
}

#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] InvalidArgument),

    #[error("unknown buffer {0:?}")]
    UnknownBuffer(BufferHandle),

    #[error("buffer {buffer:?} holds {actual} elements, expected {expected}")]
    SizeMismatch {
        buffer: BufferHandle,
        expected: usize,
        actual: usize,
    },

    #[error("plan built for {plan} threads per group, backend runs {backend}")]
    GroupSizeMismatch { plan: u32, backend: u32 },

    #[error("{0} elements do not fit a 32-bit element count")]
    TooManyElements(usize),

    #[error("plan sorts {plan} elements, data holds {len}")]
    PlanMismatch { plan: u32, len: usize },

    #[error("bindings for {bound:?} passed to a {kernel:?} dispatch")]
    BindingMismatch { kernel: KernelId, bound: KernelId },

    #[error("byte length {0} is not a whole number of elements")]
    MisalignedData(usize),
}
