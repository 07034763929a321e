//! Materials: optional texture maps plus scalar shading parameters,
//! shared between models by reference.

use crate::rendering::{load_texture, AssetError};

use std::path::Path;

use glium::{
    backend::Facade,
    uniforms::{UniformValue, Uniforms},
    Texture2d,
};

/// Which maps a material actually carries. Consumed by the technique
/// compatibility check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaterialCapabilities {
    pub diffuse_map: bool,
    pub normal_map: bool,
    pub cel_gradient: bool,
}

/// A bundle of texture maps and scalar parameters.
///
/// Any of the maps may be absent; techniques declare which ones they need
/// and the check in [`super::technique`] keeps incompatible pairs apart.
pub struct Material {
    diffuse_map: Option<Texture2d>,
    normal_map: Option<Texture2d>,
    cel_gradient: Option<Texture2d>,
    specular_power: f32,
    parallax_depth: f32,
    outline_thickness: f32,
}

impl Material {
    pub fn new() -> Material {
        Material {
            diffuse_map: None,
            normal_map: None,
            cel_gradient: None,
            specular_power: 1.0,
            parallax_depth: 0.0,
            outline_thickness: 0.015,
        }
    }

    /// Loads the combined diffuse/specular map from an image file.
    pub fn with_diffuse_map(
        mut self,
        facade: &impl Facade,
        filename: impl AsRef<Path>,
    ) -> Result<Material, AssetError> {
        self.diffuse_map = Some(load_texture(facade, filename)?);
        Ok(self)
    }

    /// Loads the combined normal/depth map from an image file.
    pub fn with_normal_map(
        mut self,
        facade: &impl Facade,
        filename: impl AsRef<Path>,
    ) -> Result<Material, AssetError> {
        self.normal_map = Some(load_texture(facade, filename)?);
        Ok(self)
    }

    /// Loads the cel-shading gradient from an image file.
    pub fn with_cel_gradient(
        mut self,
        facade: &impl Facade,
        filename: impl AsRef<Path>,
    ) -> Result<Material, AssetError> {
        self.cel_gradient = Some(load_texture(facade, filename)?);
        Ok(self)
    }

    pub fn with_specular_power(mut self, specular_power: f32) -> Material {
        self.specular_power = specular_power;
        self
    }

    pub fn with_parallax_depth(mut self, parallax_depth: f32) -> Material {
        self.parallax_depth = parallax_depth;
        self
    }

    pub fn with_outline_thickness(mut self, outline_thickness: f32) -> Material {
        self.outline_thickness = outline_thickness;
        self
    }

    pub fn capabilities(&self) -> MaterialCapabilities {
        MaterialCapabilities {
            diffuse_map: self.diffuse_map.is_some(),
            normal_map: self.normal_map.is_some(),
            cel_gradient: self.cel_gradient.is_some(),
        }
    }

    pub fn has_normal_map(&self) -> bool {
        self.normal_map.is_some()
    }

    /// The per-draw shader bindings of this material. Absent maps are
    /// simply not bound; scalars always are.
    pub fn to_uniforms(&self) -> MaterialUniforms {
        MaterialUniforms(Some(self))
    }
}

/// Shader bindings for an optional material; binds nothing when the model
/// has no material at all.
pub struct MaterialUniforms<'a>(Option<&'a Material>);

impl<'a> MaterialUniforms<'a> {
    pub fn of(material: Option<&'a Material>) -> MaterialUniforms<'a> {
        MaterialUniforms(material)
    }
}

impl Uniforms for MaterialUniforms<'_> {
    fn visit_values<'a, F: FnMut(&str, UniformValue<'a>)>(&'a self, mut callback: F) {
        let material = match self.0 {
            Some(material) => material,
            None => return,
        };
        if let Some(map) = &material.diffuse_map {
            callback("material_diffuse_map", UniformValue::Texture2d(map, None));
        }
        if let Some(map) = &material.normal_map {
            callback("material_normal_map", UniformValue::Texture2d(map, None));
        }
        if let Some(map) = &material.cel_gradient {
            callback("material_cel_gradient", UniformValue::Texture2d(map, None));
        }
        callback(
            "material_specular_power",
            UniformValue::Float(material.specular_power),
        );
        callback(
            "material_parallax_depth",
            UniformValue::Float(material.parallax_depth),
        );
        callback(
            "material_outline_thickness",
            UniformValue::Float(material.outline_thickness),
        );
    }
}

impl Default for Material {
    fn default() -> Material {
        Material::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_material_has_no_capabilities() {
        let capabilities = Material::new().capabilities();
        assert!(!capabilities.diffuse_map);
        assert!(!capabilities.normal_map);
        assert!(!capabilities.cel_gradient);
    }

    #[test]
    fn scalar_setters_do_not_add_capabilities() {
        let material = Material::new()
            .with_specular_power(64.0)
            .with_parallax_depth(0.08)
            .with_outline_thickness(0.035);
        let capabilities = material.capabilities();
        assert!(!capabilities.diffuse_map);
        assert!(!capabilities.normal_map);
        assert!(!capabilities.cel_gradient);
        assert!(!material.has_normal_map());
    }
}
