use glam::Vec3;

use super::chunks::{Chunk, ChunkId};

/// Ids of the chunks that passed the visibility test, in ascending order. Kept around between
/// frames so the storage can be reused.
#[derive(Debug, Default)]
pub struct VisibleChunks {
    ids: Vec<ChunkId>,
}

impl VisibleChunks {
    #[inline]
    pub fn ids(&self) -> &[ChunkId] {
        &self.ids
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    #[inline]
    pub fn contains(&self, id: ChunkId) -> bool {
        self.ids.binary_search(&id).is_ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = ChunkId> + '_ {
        self.ids.iter().copied()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.ids.clear();
    }

    fn push(&mut self, id: ChunkId) {
        self.ids.push(id);
    }
}

/// Returns true if a chunk centred at `chunk_centre` (world space) lies within the cone around
/// `camera_forward` described by `tolerance`.
///
/// A chunk at the camera position has no direction and is always visible.
#[inline]
pub fn is_chunk_visible(
    chunk_centre: Vec3,
    camera_position: Vec3,
    camera_forward: Vec3,
    tolerance: f32,
) -> bool {
    if tolerance <= -1.0 {
        return true;
    }

    let to_chunk = (chunk_centre - camera_position).normalize_or_zero();
    if to_chunk == Vec3::ZERO {
        return true;
    }

    camera_forward.dot(to_chunk) > tolerance
}

/// Fill `visible` with the ids of every chunk in front of the camera.
///
/// Chunk centres are stored in grid units and scaled by `stride` here. The chunks themselves are
/// never modified, so calling this repeatedly with the same camera yields the same result.
pub fn select_visible_chunks(
    chunks: &[Chunk],
    camera_position: Vec3,
    camera_forward: Vec3,
    tolerance: f32,
    stride: f32,
    visible: &mut VisibleChunks,
) {
    visible.clear();

    for (id, chunk) in chunks.iter().enumerate() {
        let centre = chunk.centre_point * stride;
        if is_chunk_visible(centre, camera_position, camera_forward, tolerance) {
            visible.push(id);
        }
    }
}
