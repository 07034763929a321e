//! Scene lights: ambient, point and spot, plus the spot shadow map target.
//!
//! Point and spot share one struct with a kind tag; the spot-specific data
//! (cone angle, shadow map) lives in the variant. Each light owns a marker
//! model so the light source itself is visible in the scene.

use super::{model::Model, transform::Transform};
use crate::rendering::AssetError;

use glium::{
    backend::Facade,
    uniform,
    texture::{DepthFormat, DepthTexture2d, MipmapsOption},
    uniforms::{UniformValue, Uniforms},
};
use ultraviolet::{projection::perspective_gl, Mat4, Vec3};

const SHADOW_MAP_SIZE: u32 = 1024;

/// Flat ambient term, also used as the clear colour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight(pub Vec3);

impl AmbientLight {
    pub fn to_uniforms(&self) -> impl Uniforms {
        let colour: [f32; 3] = self.0.into();
        glium::uniform! {
            ambient_colour: colour,
        }
    }
}

/// Depth-only render target for spot-light shadows.
pub struct ShadowMap {
    texture: DepthTexture2d,
}

impl ShadowMap {
    pub fn create(facade: &impl Facade) -> Result<ShadowMap, AssetError> {
        let texture = DepthTexture2d::empty_with_format(
            facade,
            DepthFormat::F32,
            MipmapsOption::NoMipmap,
            SHADOW_MAP_SIZE,
            SHADOW_MAP_SIZE,
        )
        .map_err(|e| AssetError::Device(Box::new(e)))?;
        Ok(ShadowMap { texture })
    }

    pub fn texture(&self) -> &DepthTexture2d {
        &self.texture
    }
}

/// What kind of light this is, with the kind-specific data.
pub enum LightKind {
    Point,
    Spot { cone_angle: f32, shadow: ShadowMap },
}

/// A positional light with diffuse/specular colours and a marker model.
pub struct Light {
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub specular_power: f32,
    pub stationary: bool,
    pub marker: Model,
    pub kind: LightKind,
}

impl Light {
    pub fn position(&self) -> Vec3 {
        self.marker.transform.position
    }

    pub fn transform(&self) -> &Transform {
        &self.marker.transform
    }

    /// Per-light shader bindings, numbered from 1 as the shaders expect.
    /// The colours are passed in explicitly so the pulsing light can push
    /// its modulated colour without overwriting the base value.
    pub fn to_uniforms(&self, index: usize, diffuse: Vec3, specular: Vec3) -> LightUniforms {
        LightUniforms {
            index,
            diffuse: diffuse.into(),
            specular: specular.into(),
            position: self.position().into(),
            specular_power: self.specular_power,
        }
    }

    /// The spot-only bindings: cone cosine, facing vector, the light's
    /// view-projection matrix and the shadow map. Empty for point lights.
    pub fn spot_uniforms(&self) -> SpotUniforms {
        SpotUniforms(self)
    }
}

pub struct LightUniforms {
    index: usize,
    diffuse: [f32; 3],
    specular: [f32; 3],
    position: [f32; 3],
    specular_power: f32,
}

impl Uniforms for LightUniforms {
    fn visit_values<'a, F: FnMut(&str, UniformValue<'a>)>(&'a self, mut callback: F) {
        let n = self.index + 1;
        callback(
            &format!("light{}_diffuse", n),
            UniformValue::Vec3(self.diffuse),
        );
        callback(
            &format!("light{}_specular", n),
            UniformValue::Vec3(self.specular),
        );
        callback(
            &format!("light{}_position", n),
            UniformValue::Vec3(self.position),
        );
        callback(
            &format!("light{}_specular_power", n),
            UniformValue::Float(self.specular_power),
        );
    }
}

pub struct SpotUniforms<'a>(&'a Light);

impl Uniforms for SpotUniforms<'_> {
    fn visit_values<'b, F: FnMut(&str, UniformValue<'b>)>(&'b self, mut callback: F) {
        let (cone_angle, shadow) = match &self.0.kind {
            LightKind::Spot { cone_angle, shadow } => (*cone_angle, shadow),
            LightKind::Point => return,
        };

        let view_projection: [[f32; 4]; 4] =
            spot_view_projection(self.0.transform(), cone_angle).into();
        let facing: [f32; 3] = self.0.transform().facing().into();

        callback(
            "spot_cos_half_angle",
            UniformValue::Float(cos_half_angle(cone_angle)),
        );
        callback("spot_facing", UniformValue::Vec3(facing));
        callback(
            "spot_view_projection",
            UniformValue::Mat4(view_projection),
        );
        callback(
            "spot_shadow_map",
            UniformValue::DepthTexture2d(shadow.texture(), None),
        );
    }
}

/// The spot light's view matrix is the inverse of its marker's world
/// matrix.
pub fn spot_view_matrix(transform: &Transform) -> Mat4 {
    transform.world_matrix().inversed()
}

/// Perspective projection using the cone angle (degrees) as the FOV.
pub fn spot_projection_matrix(cone_angle: f32) -> Mat4 {
    perspective_gl(cone_angle.to_radians(), 1.0, 0.1, 1000.0)
}

pub fn spot_view_projection(transform: &Transform, cone_angle: f32) -> Mat4 {
    spot_projection_matrix(cone_angle) * spot_view_matrix(transform)
}

/// Cosine of half the cone angle, which is what the pixel shader compares
/// against.
pub fn cos_half_angle(cone_angle: f32) -> f32 {
    (cone_angle.to_radians() * 0.5).cos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ultraviolet::Vec4;

    const TOLERANCE: f32 = 1e-4;

    #[test]
    fn spot_view_undoes_the_marker_world_matrix() {
        let transform = Transform::new(
            Vec3::new(-90.0, 21.0, 23.1),
            Vec3::new(-0.26, 5.23, 0.0),
            1.0,
        );
        let round_trip = spot_view_matrix(&transform) * transform.world_matrix();
        let identity = Mat4::identity();
        for column in 0..4 {
            let difference: Vec4 = round_trip.cols[column] - identity.cols[column];
            assert!(difference.mag() < TOLERANCE);
        }
    }

    #[test]
    fn cone_cosine_is_cos_of_half_angle() {
        let expected = (45.0f32).to_radians().cos();
        assert!((cos_half_angle(90.0) - expected).abs() < TOLERANCE);
    }

    #[test]
    fn spot_projection_maps_cone_edge_to_clip_edge() {
        // A point on the cone boundary (45 degrees off axis for a
        // 90-degree cone) lands on the edge of clip space.
        let projection = spot_projection_matrix(90.0);
        let on_edge = projection * Vec4::new(0.0, 5.0, -5.0, 1.0);
        assert!((on_edge.y / on_edge.w - 1.0).abs() < TOLERANCE);
    }
}
