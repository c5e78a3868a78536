use std::ops::Range;

/// Per-write limits imposed by the durable store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkLimits {
    pub max_bytes: usize,
    pub max_count: usize,
}

impl ChunkLimits {
    pub fn new(max_bytes: usize, max_count: usize) -> Self {
        Self {
            max_bytes: max_bytes.max(1),
            max_count: max_count.max(1),
        }
    }
}

/// Split a batch into contiguous chunks, given the serialized size of each event.
///
/// Greedy: the current chunk is closed as soon as adding the next event would
/// exceed either limit. An event larger than `max_bytes` on its own still
/// forms a (single-event) chunk so it is never dropped.
pub fn plan_chunks(sizes: &[usize], limits: ChunkLimits) -> Vec<Range<usize>> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut bytes = 0usize;

    for (i, &size) in sizes.iter().enumerate() {
        let count = i - start;
        let over_bytes = bytes.saturating_add(size) > limits.max_bytes;
        let over_count = count + 1 > limits.max_count;
        if count > 0 && (over_bytes || over_count) {
            chunks.push(start..i);
            start = i;
            bytes = 0;
        }
        bytes = bytes.saturating_add(size);
    }

    if start < sizes.len() {
        chunks.push(start..sizes.len());
    }
    chunks
}
