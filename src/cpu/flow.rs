use crate::gpu::ffi::FlowParams;

/// CPU version of the flow kernel: every element moves one slot forward,
/// the last one wraps to the front.
pub fn apply_flow<T: Copy>(src: &[T], dst: &mut [T], params: FlowParams, threads: u32) {
    let count = (params.count as usize).min(src.len()).min(dst.len());
    if count == 0 {
        return;
    }

    for i in 0..(threads as usize).min(count) {
        dst[(i + 1) % count] = src[i];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shifts_by_one() {
        let src = [1.0f32, 2.0, 3.0, 4.0];
        let mut dst = [0.0f32; 4];
        apply_flow(&src, &mut dst, FlowParams { count: 4 }, 256);
        assert_eq!(dst, [4.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn count_limits_the_range() {
        let src = [1, 2, 3, 4];
        let mut dst = [0; 4];
        apply_flow(&src, &mut dst, FlowParams { count: 2 }, 256);
        assert_eq!(dst, [2, 1, 0, 0]);
    }
}
