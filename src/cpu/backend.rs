use std::collections::HashMap;

use bevy::log::debug;

use crate::cpu::{bitonic, flow};
use crate::error::{ComputeError, InvalidArgument};
use crate::gpu::dispatch::{Bindings, BufferHandle, ComputeBackend, DispatchDescriptor};
use crate::gpu::ffi::{FLOW_THREADS_PER_GROUP, KernelParams, THREADS_PER_GROUP};

struct CpuBuffer {
    label: String,
    data: Vec<f32>,
}

/// [`ComputeBackend`] that runs the kernels on the CPU over `f32` storage.
///
/// Dispatches execute immediately, so submission order is trivially kept.
pub struct CpuBackend {
    buffers: HashMap<BufferHandle, CpuBuffer>,
    next_id: u32,
    threads_per_group: u32,
    dispatches: usize,
}

impl Default for CpuBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuBackend {
    pub fn new() -> Self {
        Self {
            buffers: HashMap::new(),
            next_id: 0,
            threads_per_group: THREADS_PER_GROUP,
            dispatches: 0,
        }
    }

    /// Backend whose bitonic kernel runs `threads_per_group` threads per group.
    pub fn with_threads_per_group(threads_per_group: u32) -> Result<Self, InvalidArgument> {
        if threads_per_group == 0 {
            return Err(InvalidArgument::ZeroThreadsPerGroup);
        }
        Ok(Self {
            threads_per_group,
            ..Self::new()
        })
    }

    /// Number of dispatches executed so far.
    pub fn dispatch_count(&self) -> usize {
        self.dispatches
    }

    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    pub fn label(&self, buffer: BufferHandle) -> Option<&str> {
        self.buffers.get(&buffer).map(|b| b.label.as_str())
    }

    pub fn data(&self, buffer: BufferHandle) -> Result<&[f32], ComputeError> {
        self.buffers
            .get(&buffer)
            .map(|b| b.data.as_slice())
            .ok_or(ComputeError::UnknownBuffer(buffer))
    }

    fn data_mut(&mut self, buffer: BufferHandle) -> Result<&mut Vec<f32>, ComputeError> {
        self.buffers
            .get_mut(&buffer)
            .map(|b| &mut b.data)
            .ok_or(ComputeError::UnknownBuffer(buffer))
    }
}

// threads that do real work: launches past `limit` are skipped by the kernel
// bounds check, so there is no point looping over them
#[inline]
fn live_threads(groups: u64, threads_per_group: u32, limit: usize) -> u32 {
    let launched = groups.saturating_mul(threads_per_group as u64);
    launched.min(limit as u64).min(u32::MAX as u64) as u32
}

impl ComputeBackend for CpuBackend {
    fn threads_per_group(&self) -> u32 {
        self.threads_per_group
    }

    fn create_buffer(&mut self, label: &str, len: u32) -> Result<BufferHandle, ComputeError> {
        let handle = BufferHandle(self.next_id);
        self.next_id += 1;
        self.buffers.insert(
            handle,
            CpuBuffer {
                label: label.to_owned(),
                data: vec![0.0; len as usize],
            },
        );
        debug!("cpu backend: created {:?} '{}' ({} elements)", handle, label, len);
        Ok(handle)
    }

    fn write_buffer(&mut self, buffer: BufferHandle, bytes: &[u8]) -> Result<(), ComputeError> {
        let elem = std::mem::size_of::<f32>();
        if bytes.len() % elem != 0 {
            return Err(ComputeError::MisalignedData(bytes.len()));
        }
        let data = self.data_mut(buffer)?;
        if bytes.len() / elem != data.len() {
            return Err(ComputeError::SizeMismatch {
                buffer,
                expected: data.len(),
                actual: bytes.len() / elem,
            });
        }
        bytemuck::cast_slice_mut::<f32, u8>(data.as_mut_slice()).copy_from_slice(bytes);
        Ok(())
    }

    fn read_buffer(&self, buffer: BufferHandle) -> Result<Vec<u8>, ComputeError> {
        Ok(bytemuck::cast_slice(self.data(buffer)?).to_vec())
    }

    fn release_buffer(&mut self, buffer: BufferHandle) {
        if let Some(b) = self.buffers.remove(&buffer) {
            debug!("cpu backend: released {:?} '{}'", buffer, b.label);
        }
    }

    fn dispatch(
        &mut self,
        descriptor: &DispatchDescriptor,
        bindings: &Bindings,
    ) -> Result<(), ComputeError> {
        let groups = descriptor.total_groups();
        match (descriptor.params(), *bindings) {
            (KernelParams::BitonicSort(params), Bindings::BitonicSort { data }) => {
                let tpg = self.threads_per_group;
                let data = self.data_mut(data)?;
                // one thread per pair
                let threads = live_threads(groups, tpg, data.len() / 2);
                bitonic::apply_step(data, params, threads);
            }
            (KernelParams::Flow(params), Bindings::Flow { src, dst }) => {
                // src may alias dst, read it out first
                let input = self.data(src)?.to_vec();
                let threads = live_threads(groups, FLOW_THREADS_PER_GROUP, input.len());
                flow::apply_flow(&input, self.data_mut(dst)?, params, threads);
            }
            _ => {
                return Err(ComputeError::BindingMismatch {
                    kernel: descriptor.kernel(),
                    bound: bindings.kernel(),
                });
            }
        }
        self.dispatches += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_group_size_is_rejected() {
        assert_eq!(
            CpuBackend::with_threads_per_group(0).err(),
            Some(InvalidArgument::ZeroThreadsPerGroup)
        );
        assert_eq!(CpuBackend::with_threads_per_group(8).unwrap().threads_per_group(), 8);
    }

    #[test]
    fn live_threads_saturate() {
        assert_eq!(live_threads(4, 64, 1000), 256);
        assert_eq!(live_threads(u64::MAX, 64, 512), 512);
        assert_eq!(live_threads(u32::MAX as u64, u32::MAX, usize::MAX), u32::MAX);
    }
}
