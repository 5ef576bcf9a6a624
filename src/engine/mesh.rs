use glam::{Vec2, Vec3};

use super::vertex_layouts::{AsVertexLayout, VertexAttribute, VertexBufferLayout, VertexFormat};

#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::NoUninit)]
#[repr(C)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub tex_coord: Vec2,
}

impl Vertex {
    pub fn new(position: Vec3, normal: Vec3, tex_coord: Vec2) -> Self {
        Self {
            position,
            normal,
            tex_coord,
        }
    }
}

impl AsVertexLayout for Vertex {
    fn vertex_buffer_layout() -> VertexBufferLayout {
        const ATTRIBUTES: &[VertexAttribute] = &[
            VertexAttribute {
                format: VertexFormat::Float32x3,
                offset: std::mem::offset_of!(Vertex, position) as u64,
                shader_location: 0,
            },
            VertexAttribute {
                format: VertexFormat::Float32x3,
                offset: std::mem::offset_of!(Vertex, normal) as u64,
                shader_location: 1,
            },
            VertexAttribute {
                format: VertexFormat::Float32x2,
                offset: std::mem::offset_of!(Vertex, tex_coord) as u64,
                shader_location: 2,
            },
        ];

        VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            attributes: ATTRIBUTES,
        }
    }
}

/// Index type used by every terrain index buffer.
pub const INDEX_FORMAT: wgpu::IndexFormat = wgpu::IndexFormat::Uint32;

/// Size of a single index in bytes.
pub const INDEX_SIZE: wgpu::BufferAddress = std::mem::size_of::<u32>() as wgpu::BufferAddress;

/// CPU side vertex and index data, ready to be uploaded by a rendering backend.
#[derive(Default)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn vertex_buffer_descriptor<'a>(
        &'a self,
        label: &'a str,
    ) -> wgpu::util::BufferInitDescriptor<'a> {
        debug_assert!(!self.vertices.is_empty(), "Describing empty vertex buffer.");

        wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&self.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        }
    }

    pub fn index_buffer_descriptor<'a>(
        &'a self,
        label: &'a str,
    ) -> wgpu::util::BufferInitDescriptor<'a> {
        wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&self.indices),
            usage: wgpu::BufferUsages::INDEX,
        }
    }
}
