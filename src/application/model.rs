//! Model geometry: OBJ import, vertex/index buffers and technique binding.

use super::{
    material::{Material, MaterialUniforms},
    technique::Technique,
    transform::Transform,
};
use crate::rendering::AssetError;

use std::{path::Path, rc::Rc};

use glium::{
    backend::Facade,
    implement_vertex,
    index::PrimitiveType,
    uniforms::{UniformValue, Uniforms},
    IndexBuffer, VertexBuffer,
};
use itertools::Itertools;
use log::{debug, info};
use ultraviolet::{Vec2, Vec3};

/// A single vertex as the vertex shaders see it. The tangent is zero for
/// meshes without texture coordinates; only the bump-mapping techniques
/// read it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
    tangent: [f32; 3],
    uv: [f32; 2],
}
implement_vertex!(Vertex, position, normal, tangent, uv);

/// One uploaded sub-mesh.
pub struct ModelGroup {
    pub(crate) vertex_buffer: VertexBuffer<Vertex>,
    pub(crate) index_buffer: IndexBuffer<u32>,
}

/// A placed model: geometry buffers, placement, bound material and
/// technique, and a flat colour for the plain/tint techniques.
pub struct Model {
    pub transform: Transform,
    pub colour: Vec3,
    groups: Vec<ModelGroup>,
    material: Option<Rc<Material>>,
    technique: Rc<Technique>,
}

impl Model {
    /// Imports a Wavefront OBJ file and uploads its meshes. The starting
    /// technique is bound as-is; later changes go through
    /// [`Model::set_technique`].
    pub fn load(
        facade: &impl Facade,
        filename: impl AsRef<Path>,
        material: Option<Rc<Material>>,
        technique: Rc<Technique>,
    ) -> Result<Model, AssetError> {
        let filename = filename.as_ref();
        let (meshes, _) = tobj::load_obj(
            filename,
            &tobj::LoadOptions {
                triangulate: true,
                single_index: true,
                ..Default::default()
            },
        )
        .map_err(|source| AssetError::Mesh {
            path: filename.to_owned(),
            source,
        })?;

        let mut groups = Vec::with_capacity(meshes.len());
        for mesh in meshes {
            let mesh = mesh.mesh;
            let positions: Vec<Vec3> = mesh
                .positions
                .chunks(3)
                .map(|p| Vec3::new(p[0], p[1], p[2]))
                .collect();
            let normals: Vec<Vec3> = mesh
                .normals
                .chunks(3)
                .map(|n| Vec3::new(n[0], n[1], n[2]))
                .collect();
            let uvs: Vec<Vec2> = mesh
                .texcoords
                .chunks(2)
                .map(|t| Vec2::new(t[0], t[1]))
                .collect();
            let tangents = compute_tangents(&positions, &uvs, &mesh.indices);

            let vertices: Vec<Vertex> = (0..positions.len())
                .map(|i| Vertex {
                    position: positions[i].into(),
                    normal: normals
                        .get(i)
                        .copied()
                        .unwrap_or(Vec3::new(0.0, 1.0, 0.0))
                        .into(),
                    tangent: tangents[i].into(),
                    uv: uvs.get(i).copied().unwrap_or(Vec2::zero()).into(),
                })
                .collect();

            let vertex_buffer = VertexBuffer::new(facade, &vertices)
                .map_err(|e| AssetError::Device(Box::new(e)))?;
            let index_buffer =
                IndexBuffer::new(facade, PrimitiveType::TrianglesList, &mesh.indices)
                    .map_err(|e| AssetError::Device(Box::new(e)))?;
            debug!(
                "Uploaded mesh group: {} vertices, {} indices",
                vertices.len(),
                mesh.indices.len()
            );
            groups.push(ModelGroup {
                vertex_buffer,
                index_buffer,
            });
        }

        info!("Loaded model {:?} ({} groups)", filename, groups.len());
        Ok(Model {
            transform: Transform::default(),
            colour: Vec3::zero(),
            groups,
            material,
            technique,
        })
    }

    pub fn groups(&self) -> &[ModelGroup] {
        &self.groups
    }

    pub fn material(&self) -> Option<&Rc<Material>> {
        self.material.as_ref()
    }

    pub fn technique(&self) -> &Technique {
        &self.technique
    }

    /// Whether the bump-mapping techniques can run on this model, which
    /// comes down to the bound material carrying a normal map.
    pub fn uses_tangents(&self) -> bool {
        self.material
            .as_ref()
            .map_or(false, |material| material.has_normal_map())
    }

    /// Switches the rendering technique, refusing any technique whose
    /// requirements the current material does not satisfy.
    pub fn set_technique(&mut self, technique: &Rc<Technique>) -> bool {
        let capabilities = self.material.as_ref().map(|material| material.capabilities());
        if technique.is_compatible(capabilities) {
            self.technique = Rc::clone(technique);
            true
        } else {
            debug!(
                "Technique {} rejected: material does not satisfy {:?}",
                technique.name(),
                technique.requirements()
            );
            false
        }
    }

    /// The bound material's shader bindings, empty for bare models.
    pub fn material_uniforms(&self) -> MaterialUniforms {
        MaterialUniforms::of(self.material.as_deref())
    }

    /// Per-model shader bindings: world matrix and flat colour.
    pub fn to_uniforms(&self) -> ModelUniforms {
        ModelUniforms {
            world_matrix: self.transform.world_matrix().into(),
            colour: self.colour.into(),
        }
    }
}

pub struct ModelUniforms {
    world_matrix: [[f32; 4]; 4],
    colour: [f32; 3],
}

impl Uniforms for ModelUniforms {
    fn visit_values<'a, F: FnMut(&str, UniformValue<'a>)>(&'a self, mut callback: F) {
        callback("model_matrix", UniformValue::Mat4(self.world_matrix));
        callback("model_colour", UniformValue::Vec3(self.colour));
    }
}

/// Accumulates per-triangle tangents (from the UV derivatives) onto the
/// vertices they touch, then normalizes. Degenerate UV triangles are
/// skipped and leave their vertices' tangents untouched.
fn compute_tangents(positions: &[Vec3], uvs: &[Vec2], indices: &[u32]) -> Vec<Vec3> {
    let mut tangents = vec![Vec3::zero(); positions.len()];
    if uvs.len() < positions.len() {
        return tangents;
    }

    for (&i0, &i1, &i2) in indices.iter().tuples() {
        let (i0, i1, i2) = (i0 as usize, i1 as usize, i2 as usize);
        let edge1 = positions[i1] - positions[i0];
        let edge2 = positions[i2] - positions[i0];
        let delta_uv1 = uvs[i1] - uvs[i0];
        let delta_uv2 = uvs[i2] - uvs[i0];

        let determinant = delta_uv1.x * delta_uv2.y - delta_uv2.x * delta_uv1.y;
        if determinant.abs() <= f32::EPSILON {
            continue;
        }
        let tangent = (edge1 * delta_uv2.y - edge2 * delta_uv1.y) / determinant;
        tangents[i0] += tangent;
        tangents[i1] += tangent;
        tangents[i2] += tangent;
    }

    for tangent in &mut tangents {
        if tangent.mag() > f32::EPSILON {
            tangent.normalize();
        }
    }
    tangents
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tangents_follow_the_u_axis() {
        // A quad in the XY plane with UVs aligned to it: the tangent must
        // point along +X for every vertex.
        let positions = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        let uvs = [
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ];
        let indices = [0u32, 1, 2, 0, 2, 3];

        let tangents = compute_tangents(&positions, &uvs, &indices);
        for tangent in &tangents {
            assert!((*tangent - Vec3::new(1.0, 0.0, 0.0)).mag() < 1e-5);
        }
    }

    #[test]
    fn missing_uvs_produce_zero_tangents() {
        let positions = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        let tangents = compute_tangents(&positions, &[], &[0, 1, 2]);
        assert!(tangents.iter().all(|t| *t == Vec3::zero()));
    }

    #[test]
    fn degenerate_uv_triangles_are_skipped() {
        let positions = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        // All three vertices share one UV, so the determinant is zero.
        let uvs = [Vec2::new(0.5, 0.5); 3];
        let tangents = compute_tangents(&positions, &uvs, &[0, 1, 2]);
        assert!(tangents.iter().all(|t| *t == Vec3::zero()));
    }
}
