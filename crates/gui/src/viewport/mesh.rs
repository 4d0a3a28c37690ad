use glam::Vec3;

/// Floats per vertex: position(3) + normal(3)
pub const STRIDE: usize = 6;

/// CPU-side mesh data: interleaved [pos.x, pos.y, pos.z, norm.x, norm.y, norm.z]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    /// 6 floats per vertex: position(3) + normal(3)
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / STRIDE
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Append a vertex and return its index
    pub fn push_vertex(&mut self, position: Vec3, normal: Vec3) -> u32 {
        let index = self.vertex_count() as u32;
        self.vertices.extend_from_slice(&[
            position.x, position.y, position.z, normal.x, normal.y, normal.z,
        ]);
        index
    }

    /// Append a flat-shaded triangle with its own three vertices
    pub fn push_triangle(&mut self, a: Vec3, b: Vec3, c: Vec3, normal: Vec3) {
        let i0 = self.push_vertex(a, normal);
        let i1 = self.push_vertex(b, normal);
        let i2 = self.push_vertex(c, normal);
        self.indices.extend_from_slice(&[i0, i1, i2]);
    }

    pub fn position(&self, index: usize) -> Vec3 {
        let base = index * STRIDE;
        Vec3::new(
            self.vertices[base],
            self.vertices[base + 1],
            self.vertices[base + 2],
        )
    }

    pub fn normal(&self, index: usize) -> Vec3 {
        let base = index * STRIDE + 3;
        Vec3::new(
            self.vertices[base],
            self.vertices[base + 1],
            self.vertices[base + 2],
        )
    }

    /// Move every vertex by `offset`
    pub fn translate(&mut self, offset: Vec3) {
        for vertex in self.vertices.chunks_exact_mut(STRIDE) {
            vertex[0] += offset.x;
            vertex[1] += offset.y;
            vertex[2] += offset.z;
        }
    }
}

/// Face normal of a counter-clockwise triangle, or zero when degenerate
pub fn face_normal(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    (b - a).cross(c - a).normalize_or_zero()
}
