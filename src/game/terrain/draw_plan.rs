use std::ops::Range;

use crate::engine::mesh::INDEX_SIZE;

use super::{
    chunks::{Chunk, ChunkTable},
    visibility::VisibleChunks,
};

/// A single indexed draw out of the chunk ordered index buffer.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ChunkDrawRange {
    pub first_index: u32,
    pub index_count: u32,
}

impl ChunkDrawRange {
    fn from_chunk(chunk: &Chunk) -> Self {
        Self {
            first_index: chunk.offset,
            index_count: chunk.index_count(),
        }
    }

    /// Offset of the first index into the index buffer, in bytes.
    #[inline]
    pub fn byte_offset(&self) -> wgpu::BufferAddress {
        self.first_index as wgpu::BufferAddress * INDEX_SIZE
    }

    /// The range to pass to [wgpu::RenderPass::draw_indexed].
    #[inline]
    pub fn indices(&self) -> Range<u32> {
        self.first_index..self.first_index + self.index_count
    }
}

/// Fields copied from [wgpu::util::DrawIndexedIndirectArgs], but wgpu doesn't support bytemuck.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, bytemuck::NoUninit)]
pub struct ChunkDrawCall {
    pub index_count: u32,
    pub instance_count: u32,
    pub first_index: u32,
    pub base_vertex: i32,
    pub first_instance: u32,
}

impl From<ChunkDrawRange> for ChunkDrawCall {
    fn from(range: ChunkDrawRange) -> Self {
        Self {
            index_count: range.index_count,
            instance_count: 1,
            first_index: range.first_index,
            base_vertex: 0,
            first_instance: 0,
        }
    }
}

/// The draws needed to render a terrain for one frame, in ascending chunk order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DrawPlan {
    ranges: Vec<ChunkDrawRange>,
}

impl DrawPlan {
    /// Draw every chunk in the table.
    pub fn all(table: &ChunkTable) -> Self {
        Self {
            ranges: table.chunks().iter().map(ChunkDrawRange::from_chunk).collect(),
        }
    }

    /// Draw only the chunks in `visible`. Ids that are not in the table are skipped.
    pub fn visible(table: &ChunkTable, visible: &VisibleChunks) -> Self {
        Self {
            ranges: visible
                .iter()
                .filter_map(|id| table.get(id))
                .map(ChunkDrawRange::from_chunk)
                .collect(),
        }
    }

    #[inline]
    pub fn ranges(&self) -> &[ChunkDrawRange] {
        &self.ranges
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Amount of indices submitted over all draws.
    pub fn total_index_count(&self) -> u64 {
        self.ranges
            .iter()
            .map(|range| range.index_count as u64)
            .sum()
    }

    /// Arguments for a [wgpu::RenderPass::multi_draw_indexed_indirect] buffer.
    pub fn indirect_args(&self) -> Vec<ChunkDrawCall> {
        self.ranges.iter().copied().map(ChunkDrawCall::from).collect()
    }
}
