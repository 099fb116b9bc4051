use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::ComputeError;
use crate::gpu::dispatch::{BufferHandle, ComputeBackend};

// ========================== helpers ==================================

/// Element count of a host slice as the u32 the kernels index with.
pub fn element_count(len: usize) -> Result<u32, ComputeError> {
    u32::try_from(len).map_err(|_| ComputeError::TooManyElements(len))
}

/// Creates a buffer and uploads `contents` into it.
pub fn create_buffer_with_data<B: ComputeBackend + ?Sized>(
    backend: &mut B,
    label: &str,
    contents: &[f32],
) -> Result<BufferHandle, ComputeError> {
    let buffer = backend.create_buffer(label, element_count(contents.len())?)?;
    // writing the slice into the whole buffer, give it back if that fails
    if let Err(e) = backend.write_buffer(buffer, bytemuck::cast_slice(contents)) {
        backend.release_buffer(buffer);
        return Err(e);
    }
    Ok(buffer)
}

/// Reads a buffer back as `f32` elements.
pub fn read_elements<B: ComputeBackend + ?Sized>(
    backend: &B,
    buffer: BufferHandle,
) -> Result<Vec<f32>, ComputeError> {
    let bytes = backend.read_buffer(buffer)?;
    if bytes.len() % std::mem::size_of::<f32>() != 0 {
        return Err(ComputeError::MisalignedData(bytes.len()));
    }
    // the byte vec is not guaranteed to be 4-aligned
    Ok(bytes
        .chunks_exact(std::mem::size_of::<f32>())
        .map(bytemuck::pod_read_unaligned::<f32>)
        .collect())
}

// =====================================================================

/* initial data of the sort pass, seeded so every run sorts the same input */

/// `count` uniform floats in `[0, 1)`, reproducible from `seed`.
pub fn random_values(count: u32, seed: u64) -> Vec<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count).map(|_| rng.random::<f32>()).collect()
}
