/// Describes a per vertex buffer layout without tying the description to a device.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct VertexBufferLayout {
    pub array_stride: u64,
    pub attributes: &'static [VertexAttribute],
}

impl VertexBufferLayout {
    /// The attributes converted for `wgpu`. Keep the result alive for as long as the layout
    /// returned by [VertexBufferLayout::to_wgpu] is in use.
    pub fn wgpu_attributes(&self) -> Vec<wgpu::VertexAttribute> {
        self.attributes
            .iter()
            .copied()
            .map(VertexAttribute::to_wgpu)
            .collect()
    }

    /// Converts this layout into `wgpu::VertexBufferLayout`.
    ///
    /// `wgpu_attributes` should come from [VertexBufferLayout::wgpu_attributes].
    pub fn to_wgpu<'a>(
        &self,
        wgpu_attributes: &'a [wgpu::VertexAttribute],
    ) -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: self.array_stride,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: wgpu_attributes,
        }
    }

    /// Total size of the attributes, which is never more than the stride.
    pub fn attributes_size(&self) -> u64 {
        self.attributes
            .iter()
            .map(|attribute| attribute.offset + attribute.format.size())
            .max()
            .unwrap_or(0)
    }
}

/// Implemented by vertex types that hand their layout to a rendering backend.
pub trait AsVertexLayout {
    fn vertex_buffer_layout() -> VertexBufferLayout;
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct VertexAttribute {
    pub format: VertexFormat,
    pub offset: u64,
    pub shader_location: u32,
}

impl VertexAttribute {
    pub fn to_wgpu(self) -> wgpu::VertexAttribute {
        wgpu::VertexAttribute {
            format: self.format.to_wgpu(),
            offset: self.offset,
            shader_location: self.shader_location,
        }
    }
}

/// The attribute formats used by terrain vertices.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum VertexFormat {
    Float32x2,
    Float32x3,
}

impl VertexFormat {
    /// Size of the attribute in bytes.
    pub const fn size(self) -> u64 {
        match self {
            Self::Float32x2 => 8,
            Self::Float32x3 => 12,
        }
    }

    pub fn to_wgpu(self) -> wgpu::VertexFormat {
        match self {
            Self::Float32x2 => wgpu::VertexFormat::Float32x2,
            Self::Float32x3 => wgpu::VertexFormat::Float32x3,
        }
    }
}
