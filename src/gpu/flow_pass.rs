use bevy::log::{debug, info};

use crate::error::{ComputeError, InvalidArgument};
use crate::gpu::buffers::{create_buffer_with_data, element_count};
use crate::gpu::dispatch::{Bindings, BufferHandle, ComputeBackend, DispatchDescriptor};
use crate::gpu::ffi::{FLOW_THREADS_PER_GROUP, FlowParams};
use crate::gpu::pipeline::FramePass;

/// Runs the flow kernel every frame, ping-ponging between two buffers.
pub struct FlowPass {
    count: u32,
    src: BufferHandle,
    dst: BufferHandle,
    descriptor: DispatchDescriptor,
}

impl FlowPass {
    /// Zero-filled buffers of `count` elements.
    pub fn new<B: ComputeBackend + ?Sized>(backend: &mut B, count: u32) -> Result<Self, ComputeError> {
        Self::with_contents(backend, &vec![0.0; count as usize])
    }

    pub fn with_contents<B: ComputeBackend + ?Sized>(
        backend: &mut B,
        contents: &[f32],
    ) -> Result<Self, ComputeError> {
        let count = element_count(contents.len())?;
        if count == 0 {
            return Err(InvalidArgument::ZeroCount.into());
        }

        let src = create_buffer_with_data(backend, "flow_src", contents)?;
        let dst = match backend.create_buffer("flow_dst", count) {
            Ok(dst) => dst,
            Err(e) => {
                backend.release_buffer(src);
                return Err(e);
            }
        };

        let groups = count.div_ceil(FLOW_THREADS_PER_GROUP);
        info!("flow pass: {} elements, {} groups", count, groups);

        Ok(Self {
            count,
            src,
            dst,
            descriptor: DispatchDescriptor::flow(FlowParams { count }, groups),
        })
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn descriptor(&self) -> &DispatchDescriptor {
        &self.descriptor
    }

    /// Buffer holding the latest flow result (the initial contents before the
    /// first frame).
    pub fn current(&self) -> BufferHandle {
        self.src
    }
}

impl<B: ComputeBackend> FramePass<B> for FlowPass {
    fn label(&self) -> &str {
        "flow_pass"
    }

    fn record(&mut self, backend: &mut B, frame: u64) -> Result<(), ComputeError> {
        let bindings = Bindings::Flow {
            src: self.src,
            dst: self.dst,
        };
        backend.dispatch(&self.descriptor, &bindings)?;
        std::mem::swap(&mut self.src, &mut self.dst);
        debug!("flow pass: frame {} wrote {:?}", frame, self.src);
        Ok(())
    }

    fn output(&self) -> Option<BufferHandle> {
        Some(self.current())
    }

    fn release(&mut self, backend: &mut B) {
        backend.release_buffer(self.src);
        backend.release_buffer(self.dst);
    }
}
