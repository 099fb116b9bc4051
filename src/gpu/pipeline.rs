//! Owned per-frame loop over compute passes.
//!
//! The caller drives [`ComputeContext::tick`] once per frame. Passes are
//! recorded in the order they were added, so a later pass sees the output of
//! an earlier one. Buffers acquired by passes live until the context is shut
//! down or dropped.

use bevy::log::{error, info};

use crate::error::ComputeError;
use crate::gpu::dispatch::{BufferHandle, ComputeBackend};

/// A unit of GPU work recorded every frame.
pub trait FramePass<B: ComputeBackend> {
    fn label(&self) -> &str;

    fn record(&mut self, backend: &mut B, frame: u64) -> Result<(), ComputeError>;

    /// Buffer a consumer should read after this frame, if any.
    fn output(&self) -> Option<BufferHandle> {
        None
    }

    /// Gives back every buffer the pass acquired. Called exactly once.
    fn release(&mut self, backend: &mut B);
}

// ==================== context ========================================

pub struct ComputeContext<B: ComputeBackend> {
    backend: B,
    passes: Vec<Box<dyn FramePass<B>>>,
    frame: u64,
}

impl<B: ComputeBackend> ComputeContext<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            passes: Vec::new(),
            frame: 0,
        }
    }

    /// Builds a pass against this context's backend and appends it.
    pub fn add_pass<P, F>(&mut self, build: F) -> Result<usize, ComputeError>
    where
        P: FramePass<B> + 'static,
        F: FnOnce(&mut B) -> Result<P, ComputeError>,
    {
        let pass = build(&mut self.backend)?;
        info!("compute context: added pass '{}'", pass.label());
        self.passes.push(Box::new(pass));
        Ok(self.passes.len() - 1)
    }

    /* one frame: every pass in insertion order. A failing pass stops the
    frame; the frame index still moves on and the next tick starts over from
    the first pass */
    pub fn tick(&mut self) -> Result<(), ComputeError> {
        let frame = self.frame;
        self.frame += 1;
        for pass in &mut self.passes {
            if let Err(e) = pass.record(&mut self.backend, frame) {
                error!("pass '{}' failed on frame {}: {}", pass.label(), frame, e);
                return Err(e);
            }
        }
        Ok(())
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Output of the pass returned by [`ComputeContext::add_pass`].
    pub fn output(&self, pass: usize) -> Option<BufferHandle> {
        self.passes.get(pass).and_then(|p| p.output())
    }

    pub fn pass_count(&self) -> usize {
        self.passes.len()
    }

    /// Releases every pass's buffers and drops the passes. Later ticks
    /// record nothing.
    pub fn shutdown(&mut self) {
        if self.passes.is_empty() {
            return;
        }
        for pass in self.passes.iter_mut().rev() {
            pass.release(&mut self.backend);
        }
        info!("compute context: released {} passes", self.passes.len());
        self.passes.clear();
    }
}

// =====================================================================

// scoped release: buffers go back to the backend when the context does
impl<B: ComputeBackend> Drop for ComputeContext<B> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
