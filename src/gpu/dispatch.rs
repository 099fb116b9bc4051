use glam::UVec3;

use crate::error::ComputeError;
use crate::gpu::ffi::{BitonicParams, FlowParams, KernelParams};

/// Opaque handle to a GPU-visible array owned by a [`ComputeBackend`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferHandle(pub(crate) u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KernelId {
    BitonicSort,
    Flow,
}

/// One compute dispatch: which kernel, its parameters and the grid size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DispatchDescriptor {
    params: KernelParams,
    thread_groups: UVec3,
}

impl DispatchDescriptor {
    pub fn bitonic(params: BitonicParams, groups_x: u32) -> Self {
        Self {
            params: KernelParams::BitonicSort(params),
            thread_groups: UVec3::new(groups_x, 1, 1),
        }
    }

    pub fn flow(params: FlowParams, groups_x: u32) -> Self {
        Self {
            params: KernelParams::Flow(params),
            thread_groups: UVec3::new(groups_x, 1, 1),
        }
    }

    pub fn kernel(&self) -> KernelId {
        match self.params {
            KernelParams::BitonicSort(_) => KernelId::BitonicSort,
            KernelParams::Flow(_) => KernelId::Flow,
        }
    }

    pub fn params(&self) -> KernelParams {
        self.params
    }

    pub fn bitonic_params(&self) -> Option<BitonicParams> {
        match self.params {
            KernelParams::BitonicSort(p) => Some(p),
            _ => None,
        }
    }

    pub fn thread_groups(&self) -> UVec3 {
        self.thread_groups
    }

    // u64 so x * y * z cannot overflow
    pub fn total_groups(&self) -> u64 {
        self.thread_groups.as_u64vec3().element_product()
    }
}

/// Buffers bound to a kernel's fixed slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bindings {
    // binding(0): data (rw storage)
    BitonicSort { data: BufferHandle },
    // binding(0): src (ro storage), binding(1): dst (rw storage)
    Flow { src: BufferHandle, dst: BufferHandle },
}

impl Bindings {
    pub fn kernel(&self) -> KernelId {
        match self {
            Bindings::BitonicSort { .. } => KernelId::BitonicSort,
            Bindings::Flow { .. } => KernelId::Flow,
        }
    }
}

/// The GPU side the scheduler records into.
///
/// Implementations must execute dispatches in submission order, each one
/// observing the buffer writes of the previous (a compute-to-compute barrier
/// or a single in-order command stream).
pub trait ComputeBackend {
    /// Group size the bitonic kernel was compiled with.
    fn threads_per_group(&self) -> u32;

    fn create_buffer(&mut self, label: &str, len: u32) -> Result<BufferHandle, ComputeError>;

    /// Overwrites the whole buffer; `bytes` must match its size exactly.
    fn write_buffer(&mut self, buffer: BufferHandle, bytes: &[u8]) -> Result<(), ComputeError>;

    fn read_buffer(&self, buffer: BufferHandle) -> Result<Vec<u8>, ComputeError>;

    fn release_buffer(&mut self, buffer: BufferHandle);

    fn dispatch(
        &mut self,
        descriptor: &DispatchDescriptor,
        bindings: &Bindings,
    ) -> Result<(), ComputeError>;
}

impl<B: ComputeBackend + ?Sized> ComputeBackend for &mut B {
    fn threads_per_group(&self) -> u32 {
        (**self).threads_per_group()
    }

    fn create_buffer(&mut self, label: &str, len: u32) -> Result<BufferHandle, ComputeError> {
        (**self).create_buffer(label, len)
    }

    fn write_buffer(&mut self, buffer: BufferHandle, bytes: &[u8]) -> Result<(), ComputeError> {
        (**self).write_buffer(buffer, bytes)
    }

    fn read_buffer(&self, buffer: BufferHandle) -> Result<Vec<u8>, ComputeError> {
        (**self).read_buffer(buffer)
    }

    fn release_buffer(&mut self, buffer: BufferHandle) {
        (**self).release_buffer(buffer)
    }

    fn dispatch(
        &mut self,
        descriptor: &DispatchDescriptor,
        bindings: &Bindings,
    ) -> Result<(), ComputeError> {
        (**self).dispatch(descriptor, bindings)
    }
}
