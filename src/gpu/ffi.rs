use bytemuck::{Pod, Zeroable};

// Must match @workgroup_size of the bitonic kernel
pub const THREADS_PER_GROUP: u32 = 64;

// Must match @workgroup_size of the flow kernel
pub const FLOW_THREADS_PER_GROUP: u32 = 256;

/// One compare-and-swap step of the bitonic network.
///
/// `inc` is the distance between the two elements of a pair, `dir` the size
/// of the block whose lower half sorts ascending.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Pod, Zeroable)]
pub struct BitonicParams {
    pub inc: u32,
    pub dir: u32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Pod, Zeroable)]
pub struct FlowParams {
    pub count: u32,
}

/// Parameters of a dispatch, one variant per kernel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KernelParams {
    BitonicSort(BitonicParams),
    Flow(FlowParams),
}

impl KernelParams {
    // raw uniform contents for a GPU backend
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            KernelParams::BitonicSort(p) => bytemuck::bytes_of(p),
            KernelParams::Flow(p) => bytemuck::bytes_of(p),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_layout() {
        let params = KernelParams::BitonicSort(BitonicParams { inc: 4, dir: 16 });
        let bytes = params.as_bytes();
        assert_eq!(bytes.len(), 8);
        assert_eq!(&bytes[..4], &4u32.to_ne_bytes());
        assert_eq!(&bytes[4..], &16u32.to_ne_bytes());

        assert_eq!(KernelParams::Flow(FlowParams { count: 256 }).as_bytes().len(), 4);
    }
}
