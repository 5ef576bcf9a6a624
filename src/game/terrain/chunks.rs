use std::ops::Range;

use glam::{UVec2, Vec3};
use tracing::debug;

use crate::game::error::TerrainError;

/// Index of a chunk in the [ChunkTable], `row * chunk_dim + col`.
pub type ChunkId = usize;

/// A group of cells that occupies one contiguous range of the chunk ordered index buffer.
#[derive(Clone, Debug, PartialEq)]
pub struct Chunk {
    /// Coordinate of the chunk in the chunk grid, (col, row).
    pub coord: UVec2,
    /// Vertex indices of every cell in the chunk, six per cell.
    pub indices: Vec<u32>,
    /// First element of this chunk in the chunk ordered index buffer.
    pub offset: u32,
    /// Centre of the chunk footprint in grid units. Multiply with the vertex stride to get the
    /// world position.
    pub centre_point: Vec3,
}

impl Chunk {
    #[inline]
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    /// Range of this chunk in the chunk ordered index buffer.
    #[inline]
    pub fn index_range(&self) -> Range<u32> {
        self.offset..self.offset + self.index_count()
    }
}

/// All the chunks of a terrain, ordered by [ChunkId]. Immutable once built.
#[derive(Debug, Default)]
pub struct ChunkTable {
    chunk_dim: u32,
    chunks: Vec<Chunk>,
}

impl ChunkTable {
    /// Amount of chunks along each side of the terrain.
    #[inline]
    pub fn chunk_dim(&self) -> u32 {
        self.chunk_dim
    }

    #[inline]
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    #[inline]
    pub fn get(&self, id: ChunkId) -> Option<&Chunk> {
        self.chunks.get(id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Total amount of indices over all chunks.
    pub fn index_count(&self) -> usize {
        self.chunks.iter().map(|chunk| chunk.indices.len()).sum()
    }
}

/// Maps cells onto an `N x N` chunk grid, `N = min(num_chunks, cells)`.
///
/// Cell coordinates are scaled into chunk space and truncated, so every chunk receives at least
/// one row and one column of cells and any remainder is spread over the chunks.
struct ChunkGrid {
    cells: u64,
    dim: u64,
}

impl ChunkGrid {
    fn new(cells: u32, num_chunks: u32) -> Self {
        Self {
            cells: cells as u64,
            dim: num_chunks.min(cells) as u64,
        }
    }

    /// Chunk row/col containing the given cell row/col.
    #[inline]
    fn chunk_of(&self, cell: u32) -> u32 {
        (cell as u64 * self.dim / self.cells) as u32
    }

    /// First cell of the chunk row/col. One past the last cell of the chunk is `first_cell(c + 1)`.
    #[inline]
    fn first_cell(&self, chunk: u32) -> u32 {
        (chunk as u64 * self.cells).div_ceil(self.dim) as u32
    }

    fn footprint_centre(&self, chunk: u32) -> f32 {
        (self.first_cell(chunk) + self.first_cell(chunk + 1)) as f32 * 0.5
    }
}

/// Sort the cell ordered `raw_indices` of a grid with `size` vertices per side into chunks.
///
/// Returns the chunk ordered index buffer along with the table describing where each chunk
/// lives in it.
pub fn partition(
    raw_indices: &[u32],
    size: u32,
    num_chunks: u32,
) -> Result<(Vec<u32>, ChunkTable), TerrainError> {
    if num_chunks == 0 {
        return Err(TerrainError::invalid_input(
            "number of chunks must be greater than 0",
        ));
    }

    let cells = size.saturating_sub(1);
    let expected = cells as usize * cells as usize * 6;
    if raw_indices.len() != expected {
        return Err(TerrainError::invalid_input(format!(
            "a grid of {size} x {size} vertices has {expected} indices, got {}",
            raw_indices.len()
        )));
    }

    if cells == 0 {
        return Ok((Vec::new(), ChunkTable::default()));
    }

    let grid = ChunkGrid::new(cells, num_chunks);
    let chunk_dim = grid.dim as u32;

    // Place the centre of each footprint relative to the centred mesh origin.
    let half_size = size as f32 * 0.5;

    let mut chunks: Vec<Chunk> = (0..chunk_dim * chunk_dim)
        .map(|id| {
            let coord = UVec2::new(id % chunk_dim, id / chunk_dim);
            Chunk {
                coord,
                indices: Vec::new(),
                offset: 0,
                centre_point: Vec3::new(
                    grid.footprint_centre(coord.x) - half_size,
                    0.0,
                    grid.footprint_centre(coord.y) - half_size,
                ),
            }
        })
        .collect();

    for (cell, cell_indices) in raw_indices.chunks_exact(6).enumerate() {
        let row = cell as u32 / cells;
        let col = cell as u32 % cells;

        let chunk_id = (grid.chunk_of(row) * chunk_dim + grid.chunk_of(col)) as usize;
        chunks[chunk_id].indices.extend_from_slice(cell_indices);
    }

    let mut ordered = Vec::with_capacity(raw_indices.len());
    for chunk in chunks.iter_mut() {
        chunk.offset = ordered.len() as u32;
        ordered.extend_from_slice(&chunk.indices);
    }

    debug!(
        "Partitioned {} cells into {chunk_dim} x {chunk_dim} chunks",
        cells as usize * cells as usize
    );

    Ok((ordered, ChunkTable { chunk_dim, chunks }))
}
