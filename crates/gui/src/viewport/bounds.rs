use glam::Vec3;

use super::mesh::MeshData;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Compute AABB from MeshData. `None` for a mesh without vertices.
    pub fn from_mesh(data: &MeshData) -> Option<Self> {
        (0..data.vertex_count())
            .map(|i| data.position(i))
            .fold(None, |acc: Option<Aabb>, p| match acc {
                None => Some(Aabb { min: p, max: p }),
                Some(b) => Some(Aabb {
                    min: b.min.min(p),
                    max: b.max.max(p),
                }),
            })
    }

    /// Center of the bounding box
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Extent along each axis
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Largest extent of the three axes
    pub fn max_dim(&self) -> f32 {
        self.size().max_element()
    }

    /// Box scaled about its center by `factor` per axis
    pub fn scaled(&self, factor: Vec3) -> Self {
        let center = self.center();
        let half = self.size() * 0.5 * factor;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn translated(&self, offset: Vec3) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }
}
