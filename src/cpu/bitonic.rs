// bitonic compare-and-swap kernel on the CPU (reference for the GPU kernel)
use crate::error::ComputeError;
use crate::gpu::dispatch::DispatchDescriptor;
use crate::gpu::ffi::BitonicParams;
use crate::gpu::plan::SortPlan;

// element pair handled by thread `t` for a given `inc`
#[inline]
fn pair(t: u32, inc: u32) -> (usize, usize) {
    let low = t & (inc - 1);
    let i0 = (t << 1) - low;
    (i0 as usize, (i0 + inc) as usize)
}

/// Runs `threads` invocations of one compare-and-swap step.
///
/// Threads touch disjoint pairs, so running them one after another gives the
/// same result as a parallel dispatch. Pairs past the end are skipped, like
/// the bounds check in the kernel.
pub fn apply_step<T: PartialOrd + Copy>(data: &mut [T], params: BitonicParams, threads: u32) {
    let BitonicParams { inc, dir } = params;
    if inc == 0 {
        return;
    }

    for t in 0..threads {
        let (i0, i1) = pair(t, inc);
        if i1 >= data.len() {
            continue;
        }

        // lower half of every `dir` sized block goes up, upper half goes down
        let ascending = (i0 as u32 & dir) == 0;
        let (a, b) = (data[i0], data[i1]);
        let swap = if ascending { a > b } else { a < b };
        if swap {
            data.swap(i0, i1);
        }
    }
}

/// Simulates one descriptor; non-bitonic descriptors leave `data` untouched.
pub fn apply_dispatch<T: PartialOrd + Copy>(
    data: &mut [T],
    descriptor: &DispatchDescriptor,
    threads_per_group: u32,
) {
    if let Some(params) = descriptor.bitonic_params() {
        // pairs past data.len() / 2 are skipped anyway
        let threads = descriptor
            .total_groups()
            .saturating_mul(threads_per_group as u64)
            .min((data.len() / 2) as u64)
            .min(u32::MAX as u64) as u32;
        apply_step(data, params, threads);
    }
}

/// Replays a whole plan over `data`.
pub fn sort_with_plan<T: PartialOrd + Copy>(
    data: &mut [T],
    plan: &SortPlan,
) -> Result<(), ComputeError> {
    if data.len() != plan.count() as usize {
        return Err(ComputeError::PlanMismatch {
            plan: plan.count(),
            len: data.len(),
        });
    }
    for descriptor in plan.dispatches() {
        apply_dispatch(data, descriptor, plan.threads_per_group());
    }
    Ok(())
}
