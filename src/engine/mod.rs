pub mod mesh;
pub mod tracked;
pub mod vertex_layouts;
