//! Rendering techniques: a compiled shader variant plus the capability
//! flags describing what its shaders sample from the material.

use super::material::MaterialCapabilities;
use crate::rendering::{load_program, AssetError};

use std::rc::Rc;

use glium::{backend::Facade, Blend, BlendingFunction, LinearBlendingFactor, Program};
use log::info;

/// What a technique's shaders require from the bound material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TechniqueRequirements {
    pub diffuse_map: bool,
    pub normal_map: bool,
    pub cel_gradient: bool,
}

impl TechniqueRequirements {
    pub const NONE: TechniqueRequirements = TechniqueRequirements {
        diffuse_map: false,
        normal_map: false,
        cel_gradient: false,
    };

    pub const fn new(diffuse_map: bool, normal_map: bool, cel_gradient: bool) -> Self {
        TechniqueRequirements {
            diffuse_map,
            normal_map,
            cel_gradient,
        }
    }

    /// The compatibility check. False for a missing material, false if any
    /// required map is absent from it, true otherwise.
    pub fn satisfied_by(&self, capabilities: Option<MaterialCapabilities>) -> bool {
        let capabilities = match capabilities {
            Some(capabilities) => capabilities,
            None => return false,
        };

        if self.diffuse_map && !capabilities.diffuse_map {
            return false;
        }
        if self.normal_map && !capabilities.normal_map {
            return false;
        }
        if self.cel_gradient && !capabilities.cel_gradient {
            return false;
        }
        true
    }
}

/// A named shader variant. Outlined techniques carry a second program drawn
/// before the main one with front faces culled.
pub struct Technique {
    name: &'static str,
    program: Program,
    outline_program: Option<Program>,
    requirements: TechniqueRequirements,
    blend: Blend,
    depth_write: bool,
}

impl Technique {
    fn load(
        facade: &impl Facade,
        name: &'static str,
        basename: &str,
        requirements: TechniqueRequirements,
    ) -> Result<Rc<Technique>, AssetError> {
        Ok(Rc::new(Technique {
            name,
            program: load_program(facade, basename)?,
            outline_program: None,
            requirements,
            blend: Blend::default(),
            depth_write: true,
        }))
    }

    /// As `load`, but drawn with additive blending and no depth writes
    /// (the light marker technique).
    fn load_additive(
        facade: &impl Facade,
        name: &'static str,
        basename: &str,
        requirements: TechniqueRequirements,
    ) -> Result<Rc<Technique>, AssetError> {
        let additive = Blend {
            color: BlendingFunction::Addition {
                source: LinearBlendingFactor::One,
                destination: LinearBlendingFactor::One,
            },
            alpha: BlendingFunction::Addition {
                source: LinearBlendingFactor::One,
                destination: LinearBlendingFactor::One,
            },
            constant_value: (1.0, 1.0, 1.0, 1.0),
        };
        Ok(Rc::new(Technique {
            name,
            program: load_program(facade, basename)?,
            outline_program: None,
            requirements,
            blend: additive,
            depth_write: false,
        }))
    }

    fn load_outlined(
        facade: &impl Facade,
        name: &'static str,
        basename: &str,
        requirements: TechniqueRequirements,
    ) -> Result<Rc<Technique>, AssetError> {
        Ok(Rc::new(Technique {
            name,
            program: load_program(facade, basename)?,
            outline_program: Some(load_program(facade, "outline")?),
            requirements,
            blend: Blend::default(),
            depth_write: true,
        }))
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn outline_program(&self) -> Option<&Program> {
        self.outline_program.as_ref()
    }

    pub fn requirements(&self) -> TechniqueRequirements {
        self.requirements
    }

    pub fn blend(&self) -> Blend {
        self.blend
    }

    pub fn writes_depth(&self) -> bool {
        self.depth_write
    }

    pub fn is_compatible(&self, capabilities: Option<MaterialCapabilities>) -> bool {
        self.requirements.satisfied_by(capabilities)
    }
}

/// All techniques of the scene, compiled once at startup, plus the
/// depth-only program used for shadow map rendering.
pub struct TechniqueSet {
    pub plain_colour: Rc<Technique>,
    pub diffuse_tex: Rc<Technique>,
    pub wiggle_scroll: Rc<Technique>,
    pub pixel_lighting: Rc<Technique>,
    pub normal_mapping: Rc<Technique>,
    pub parallax_mapping: Rc<Technique>,
    pub cel_shading: Rc<Technique>,
    pub additive_tex_tint: Rc<Technique>,
    pub parallax_cel: Rc<Technique>,
    pub alpha_cutout: Rc<Technique>,
    pub parallax_outlined: Rc<Technique>,
    pub pixel_lit_outlined: Rc<Technique>,
    pub depth_only: Program,
}

impl TechniqueSet {
    pub fn load(facade: &impl Facade) -> Result<TechniqueSet, AssetError> {
        use TechniqueRequirements as Req;

        let set = TechniqueSet {
            plain_colour: Technique::load(facade, "PlainColour", "plain_colour", Req::NONE)?,
            diffuse_tex: Technique::load(
                facade,
                "DiffuseTex",
                "diffuse_tex",
                Req::new(true, false, false),
            )?,
            wiggle_scroll: Technique::load(
                facade,
                "WiggleAndScroll",
                "wiggle_scroll",
                Req::new(true, false, false),
            )?,
            pixel_lighting: Technique::load(
                facade,
                "PixelLighting",
                "pixel_lighting",
                Req::new(true, false, false),
            )?,
            normal_mapping: Technique::load(
                facade,
                "NormalMapping",
                "normal_mapping",
                Req::new(true, true, false),
            )?,
            parallax_mapping: Technique::load(
                facade,
                "ParallaxMapping",
                "parallax_mapping",
                Req::new(true, true, false),
            )?,
            cel_shading: Technique::load(
                facade,
                "CelShading",
                "cel_shading",
                Req::new(false, false, true),
            )?,
            additive_tex_tint: Technique::load_additive(
                facade,
                "AdditiveTexTint",
                "additive_tex_tint",
                Req::new(true, false, false),
            )?,
            parallax_cel: Technique::load(
                facade,
                "ParallaxCelShaded",
                "parallax_cel",
                Req::new(true, true, true),
            )?,
            alpha_cutout: Technique::load(
                facade,
                "AlphaCutout",
                "alpha_cutout",
                Req::new(true, false, false),
            )?,
            parallax_outlined: Technique::load_outlined(
                facade,
                "ParallaxOutlined",
                "parallax_mapping",
                Req::new(true, true, false),
            )?,
            pixel_lit_outlined: Technique::load_outlined(
                facade,
                "PixelLitOutlined",
                "pixel_lighting",
                Req::new(true, false, false),
            )?,
            depth_only: load_program(facade, "depth_only")?,
        };
        info!("Compiled all techniques");
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capabilities(diffuse: bool, normal: bool, cel: bool) -> MaterialCapabilities {
        MaterialCapabilities {
            diffuse_map: diffuse,
            normal_map: normal,
            cel_gradient: cel,
        }
    }

    #[test]
    fn missing_material_is_never_compatible() {
        let all = [false, true];
        for &d in &all {
            for &n in &all {
                for &c in &all {
                    assert!(!TechniqueRequirements::new(d, n, c).satisfied_by(None));
                }
            }
        }
    }

    #[test]
    fn compatible_iff_every_required_map_is_present() {
        let all = [false, true];
        for &rd in &all {
            for &rn in &all {
                for &rc in &all {
                    let requirements = TechniqueRequirements::new(rd, rn, rc);
                    for &cd in &all {
                        for &cn in &all {
                            for &cc in &all {
                                let caps = capabilities(cd, cn, cc);
                                let expected = (!rd || cd) && (!rn || cn) && (!rc || cc);
                                assert_eq!(
                                    requirements.satisfied_by(Some(caps)),
                                    expected,
                                    "requirements {:?} against {:?}",
                                    requirements,
                                    caps
                                );
                            }
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn diffuse_only_material_matches_diffuse_only_technique() {
        // The concrete pairing from the scene: DiffuseTex-style requirements
        // against a material that only carries a diffuse map.
        let requirements = TechniqueRequirements::new(true, false, false);
        assert!(requirements.satisfied_by(Some(capabilities(true, false, false))));
        assert!(!requirements.satisfied_by(Some(capabilities(false, false, false))));
    }

    #[test]
    fn no_requirements_accept_any_material() {
        let all = [false, true];
        for &cd in &all {
            for &cn in &all {
                for &cc in &all {
                    assert!(TechniqueRequirements::NONE
                        .satisfied_by(Some(capabilities(cd, cn, cc))));
                }
            }
        }
    }
}
