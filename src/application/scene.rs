//! The hard-coded scene: construction of every material, model and light,
//! and the per-frame update (controls, technique switching, animation).

use super::{
    camera::Camera,
    color::{hsl_to_rgb, rgb_to_hsl},
    light::{AmbientLight, Light, LightKind, ShadowMap},
    material::Material,
    model::Model,
    technique::TechniqueSet,
    transform::{ControlBindings, Transform},
};
use crate::input::InputState;
use crate::rendering::AssetError;

use std::rc::Rc;

use glium::{backend::Facade, glutin::event::VirtualKeyCode};
use log::info;
use ultraviolet::Vec3;

const LIGHT_ORBIT_RADIUS: f32 = 20.0;
const LIGHT_ORBIT_SPEED: f32 = 0.5;
const WIGGLE_SPEED: f32 = 15.0;
const PULSE_SPEED: f32 = 2.0;
const HUE_STEP_INTERVAL: f32 = 0.04;
const HUE_STEP_DEGREES: f32 = 2.0;

/// Fixed roles of the three lights.
pub const ORBITING_LIGHT: usize = 0;
pub const PULSING_LIGHT: usize = 1;
pub const SPOT_LIGHT: usize = 2;

/// Keys controlling the movable model (the cube).
const MODEL_BINDINGS: ControlBindings = ControlBindings {
    turn_up: VirtualKeyCode::I,
    turn_down: VirtualKeyCode::K,
    turn_left: VirtualKeyCode::J,
    turn_right: VirtualKeyCode::L,
    roll_cw: VirtualKeyCode::U,
    roll_ccw: VirtualKeyCode::O,
    move_forward: VirtualKeyCode::Period,
    move_backward: VirtualKeyCode::Comma,
};

/// Everything that exists in the scene, plus the open-loop animation
/// accumulators. All former global state lives here.
pub struct Scene {
    pub camera: Camera,
    pub models: Vec<Model>,
    pub ambient: AmbientLight,
    pub lights: Vec<Light>,
    pub techniques: TechniqueSet,
    wiggle: f32,
    pulse_time: f32,
    orbit_angle: f32,
    hue_timer: f32,
}

impl Scene {
    /// Builds the fixed scene: nine materials, seven models, an ambient
    /// light, two point lights and a spot light.
    pub fn create(facade: &impl Facade, aspect_ratio: f32) -> Result<Scene, AssetError> {
        let techniques = TechniqueSet::load(facade)?;

        let camera = Camera::new(
            Vec3::new(-15.0, 20.0, -40.0),
            Vec3::new(13f32.to_radians(), 18f32.to_radians(), 0.0),
            aspect_ratio,
        );

        // Materials, shared across models by reference
        let stone = Rc::new(
            Material::new()
                .with_diffuse_map(facade, "assets/textures/StoneDiffuseSpecular.dds")?
                .with_specular_power(64.0)
                .with_cel_gradient(facade, "assets/textures/CelGradient.png")?
                .with_outline_thickness(0.035),
        );
        let wood = Rc::new(
            Material::new()
                .with_diffuse_map(facade, "assets/textures/WoodDiffuseSpecular.dds")?
                .with_specular_power(64.0)
                .with_normal_map(facade, "assets/textures/WoodNormal.dds")?
                .with_parallax_depth(0.08)
                .with_cel_gradient(facade, "assets/textures/CelGradient.png")?
                .with_outline_thickness(0.035),
        );
        let brain = Rc::new(
            Material::new()
                .with_diffuse_map(facade, "assets/textures/BrainDiffuseSpecular.dds")?
                .with_specular_power(16.0)
                .with_normal_map(facade, "assets/textures/BrainNormalDepth.dds")?
                .with_parallax_depth(0.08)
                .with_cel_gradient(facade, "assets/textures/CelGradient.png")?
                .with_outline_thickness(0.035),
        );
        let pattern = Rc::new(
            Material::new()
                .with_diffuse_map(facade, "assets/textures/PatternDiffuseSpecular.dds")?
                .with_specular_power(8.0)
                .with_normal_map(facade, "assets/textures/PatternNormalDepth.dds")?
                .with_parallax_depth(0.08)
                .with_cel_gradient(facade, "assets/textures/CelGradient.png")?
                .with_outline_thickness(0.035),
        );
        let wall = Rc::new(
            Material::new()
                .with_diffuse_map(facade, "assets/textures/WallDiffuseSpecular.dds")?
                .with_specular_power(128.0)
                .with_normal_map(facade, "assets/textures/WallNormalDepth.dds")?
                .with_parallax_depth(0.08)
                .with_cel_gradient(facade, "assets/textures/CelGradient.png")?
                .with_outline_thickness(0.035),
        );
        let troll = Rc::new(
            Material::new()
                .with_diffuse_map(facade, "assets/textures/TrollDiffuseSpecular.dds")?
                .with_specular_power(16.0)
                .with_cel_gradient(facade, "assets/textures/CelGradient.png")?
                .with_outline_thickness(0.035),
        );
        let thunderbolt = Rc::new(
            Material::new()
                .with_diffuse_map(facade, "assets/textures/Thunderbolt.jpg")?
                .with_specular_power(2.0)
                .with_cel_gradient(facade, "assets/textures/CelGradient.png")?,
        );
        let flare = Rc::new(
            Material::new()
                .with_diffuse_map(facade, "assets/textures/Flare.jpg")?
                .with_specular_power(64.0),
        );
        let flames = Rc::new(
            Material::new()
                .with_diffuse_map(facade, "assets/textures/Flames.png")?
                .with_specular_power(64.0),
        );

        // Models. Each starts with a technique its material supports.
        let red = Vec3::new(1.0, 0.0, 0.0);
        let green = Vec3::new(0.0, 1.0, 0.0);
        let blue = Vec3::new(0.0, 0.0, 1.0);
        let yellow = Vec3::new(1.0, 1.0, 0.0);

        let mut cube = Model::load(
            facade,
            "assets/models/Cube.obj",
            Some(Rc::clone(&wall)),
            Rc::clone(&techniques.parallax_mapping),
        )?;
        cube.transform = Transform::new(Vec3::new(0.0, 10.0, 0.0), Vec3::zero(), 1.0);
        cube.colour = red;

        let mut teapot = Model::load(
            facade,
            "assets/models/Teapot.obj",
            Some(Rc::clone(&pattern)),
            Rc::clone(&techniques.parallax_mapping),
        )?;
        teapot.transform = Transform::new(Vec3::new(10.0, 20.0, 50.0), Vec3::zero(), 1.0);
        teapot.colour = green;

        let mut floor = Model::load(
            facade,
            "assets/models/Floor.obj",
            Some(Rc::clone(&wood)),
            Rc::clone(&techniques.parallax_mapping),
        )?;
        floor.transform = Transform::new(Vec3::zero(), Vec3::zero(), 1.0);
        floor.colour = blue;

        let mut sphere = Model::load(
            facade,
            "assets/models/Sphere.obj",
            Some(Rc::clone(&stone)),
            Rc::clone(&techniques.wiggle_scroll),
        )?;
        sphere.transform = Transform::new(Vec3::new(-40.0, 15.0, 20.0), Vec3::zero(), 0.7);
        sphere.colour = yellow;

        let mut troll_model = Model::load(
            facade,
            "assets/models/Troll.obj",
            Some(Rc::clone(&troll)),
            Rc::clone(&techniques.cel_shading),
        )?;
        troll_model.transform = Transform::new(Vec3::new(-25.0, 1.0, 80.0), Vec3::zero(), 10.0);
        troll_model.colour = green;

        let mut hills = Model::load(
            facade,
            "assets/models/Hills.obj",
            Some(Rc::clone(&brain)),
            Rc::clone(&techniques.parallax_outlined),
        )?;
        hills.transform = Transform::new(Vec3::new(500.0, 0.0, 0.0), Vec3::zero(), 1.0);
        hills.colour = red;

        let mut plane = Model::load(
            facade,
            "assets/models/Thunderbolt.obj",
            Some(Rc::clone(&thunderbolt)),
            Rc::clone(&techniques.pixel_lit_outlined),
        )?;
        plane.transform = Transform::new(
            Vec3::new(-128.0, 32.5, 45.0),
            Vec3::new(15f32.to_radians(), 120f32.to_radians(), 0.0),
            5.0,
        );
        plane.colour = yellow;

        let models = vec![cube, teapot, floor, sphere, troll_model, hills, plane];

        // Lights. Marker scale roughly reflects brightness.
        let ambient = AmbientLight(Vec3::new(0.2, 0.2, 0.2));

        let mut orbit_marker = Model::load(
            facade,
            "assets/models/Light.obj",
            Some(Rc::clone(&flare)),
            Rc::clone(&techniques.additive_tex_tint),
        )?;
        orbit_marker.transform = Transform::new(Vec3::new(30.0, 10.0, 0.0), Vec3::zero(), 4.0);
        let orbiting = Light {
            diffuse: Vec3::new(1.0, 0.0, 0.0) * 10.0,
            specular: Vec3::new(1.0, 0.0, 0.0) * 1.5,
            specular_power: 64.0,
            stationary: false,
            marker: orbit_marker,
            kind: LightKind::Point,
        };

        let mut pulse_marker = Model::load(
            facade,
            "assets/models/Light.obj",
            Some(Rc::clone(&flare)),
            Rc::clone(&techniques.additive_tex_tint),
        )?;
        pulse_marker.transform = Transform::new(Vec3::new(-20.0, 30.0, 50.0), Vec3::zero(), 4.0);
        let pulsing = Light {
            diffuse: Vec3::new(1.0, 0.0, 0.7) * 15.0,
            specular: Vec3::new(1.0, 0.0, 0.7) * 15.0,
            specular_power: 64.0,
            stationary: true,
            marker: pulse_marker,
            kind: LightKind::Point,
        };

        let mut flame_marker = Model::load(
            facade,
            "assets/models/FlameShell.obj",
            Some(Rc::clone(&flames)),
            Rc::clone(&techniques.alpha_cutout),
        )?;
        flame_marker.transform = Transform::new(
            Vec3::new(-90.0, 21.0, 23.1),
            Vec3::new((-15f32).to_radians(), 300f32.to_radians(), 0.0),
            4.0,
        );
        let spot = Light {
            diffuse: Vec3::new(1.0, 0.2, 0.0) * 20.0,
            specular: Vec3::new(1.0, 0.2, 0.0) * 15.0,
            specular_power: 64.0,
            stationary: true,
            marker: flame_marker,
            kind: LightKind::Spot {
                cone_angle: 90.0,
                shadow: ShadowMap::create(facade)?,
            },
        };

        // Stationary lights get their one and only matrix update here;
        // Transform::new has already built it.
        let lights = vec![orbiting, pulsing, spot];

        info!(
            "Scene ready: {} models, {} lights",
            models.len(),
            lights.len()
        );
        Ok(Scene {
            camera,
            models,
            ambient,
            lights,
            techniques,
            wiggle: 0.0,
            pulse_time: 0.0,
            orbit_angle: 0.0,
            hue_timer: 0.0,
        })
    }

    /// Advances everything by one frame.
    pub fn update(&mut self, frame_time: f32, input: &InputState) {
        self.switch_techniques(input);

        self.camera.control(input, frame_time);
        self.camera.update_matrices();

        // Only the cube is directly controllable
        self.models[0]
            .transform
            .control(input, frame_time, &MODEL_BINDINGS);
        for model in &mut self.models {
            model.transform.update_matrix();
        }

        self.wiggle += WIGGLE_SPEED * frame_time;
        self.pulse_time += PULSE_SPEED * frame_time;

        // Hue-cycling light: nudge the hue a fixed amount at a fixed rate.
        // The cycle runs on the normalized colour so the HDR brightness
        // multiplier stays out of the conversion.
        self.hue_timer += frame_time;
        if self.hue_timer > HUE_STEP_INTERVAL {
            self.hue_timer = 0.0;
            let light = &mut self.lights[ORBITING_LIGHT];
            let (hue, saturation, lightness) = rgb_to_hsl(light.diffuse / 10.0);
            let cycled = hsl_to_rgb(hue + HUE_STEP_DEGREES, saturation, lightness);
            light.diffuse = cycled * 10.0;
            light.specular = cycled * 1.5;
        }

        // Orbit the first light around the cube
        let centre = self.models[0].transform.position;
        self.lights[ORBITING_LIGHT].marker.transform.position =
            orbit_position(centre, LIGHT_ORBIT_RADIUS, self.orbit_angle);
        self.orbit_angle -= LIGHT_ORBIT_SPEED * frame_time;

        // Marker models are tinted with the light's current colour; the
        // pulsing light's marker fades with the envelope.
        let envelope = pulse_envelope(self.pulse_time);
        for (index, light) in self.lights.iter_mut().enumerate() {
            light.marker.colour = if index == PULSING_LIGHT {
                light.diffuse * envelope
            } else {
                light.diffuse
            };
        }

        for light in &mut self.lights {
            if !light.stationary {
                light.marker.transform.update_matrix();
            }
        }
    }

    /// The pulsing light's brightness envelope for the current frame.
    pub fn pulse_envelope(&self) -> f32 {
        pulse_envelope(self.pulse_time)
    }

    pub fn wiggle(&self) -> f32 {
        self.wiggle
    }

    /// Number keys set the technique of every scene model. Keys 7 and 8
    /// pick the tangent-capable variant per model; incompatible switches
    /// are rejected by the models themselves.
    fn switch_techniques(&mut self, input: &InputState) {
        let techniques = &self.techniques;
        if input.key_hit(VirtualKeyCode::Key1) {
            for model in &mut self.models {
                model.set_technique(&techniques.plain_colour);
            }
        }
        if input.key_hit(VirtualKeyCode::Key2) {
            for model in &mut self.models {
                model.set_technique(&techniques.diffuse_tex);
            }
        }
        if input.key_hit(VirtualKeyCode::Key3) {
            for model in &mut self.models {
                model.set_technique(&techniques.wiggle_scroll);
            }
        }
        if input.key_hit(VirtualKeyCode::Key4) {
            for model in &mut self.models {
                model.set_technique(&techniques.pixel_lighting);
            }
        }
        if input.key_hit(VirtualKeyCode::Key5) {
            for model in &mut self.models {
                model.set_technique(&techniques.normal_mapping);
            }
        }
        if input.key_hit(VirtualKeyCode::Key6) {
            for model in &mut self.models {
                model.set_technique(&techniques.parallax_mapping);
            }
        }
        if input.key_hit(VirtualKeyCode::Key7) {
            for model in &mut self.models {
                if model.uses_tangents() {
                    model.set_technique(&techniques.parallax_outlined);
                } else {
                    model.set_technique(&techniques.pixel_lit_outlined);
                }
            }
        }
        if input.key_hit(VirtualKeyCode::Key8) {
            for model in &mut self.models {
                if model.uses_tangents() {
                    model.set_technique(&techniques.parallax_cel);
                } else {
                    model.set_technique(&techniques.cel_shading);
                }
            }
        }
    }
}

/// Position on a circle of `radius` around `centre` in the XZ plane.
pub fn orbit_position(centre: Vec3, radius: f32, angle: f32) -> Vec3 {
    centre + Vec3::new(angle.cos() * radius, 0.0, angle.sin() * radius)
}

/// Cosine envelope in [0, 1] driving the pulsing light.
pub fn pulse_envelope(time: f32) -> f32 {
    (time.cos() + 1.0) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::TAU;

    #[test]
    fn orbit_returns_to_start_after_a_full_turn() {
        let centre = Vec3::new(0.0, 10.0, 0.0);
        let start = orbit_position(centre, LIGHT_ORBIT_RADIUS, 0.0);

        // The orbit angle decreases over time; step it through a whole
        // turn the way the update loop does.
        let mut angle = 0.0f32;
        let steps = 1000;
        for _ in 0..steps {
            angle -= TAU / steps as f32;
        }
        let end = orbit_position(centre, LIGHT_ORBIT_RADIUS, angle);
        assert!((end - start).mag() < 1e-2);
    }

    #[test]
    fn orbit_stays_on_the_circle() {
        let centre = Vec3::new(5.0, 0.0, -3.0);
        for i in 0..64 {
            let angle = -(i as f32) * 0.1;
            let position = orbit_position(centre, LIGHT_ORBIT_RADIUS, angle);
            let offset = position - centre;
            assert!((offset.mag() - LIGHT_ORBIT_RADIUS).abs() < 1e-4);
            assert!(offset.y.abs() < 1e-6);
        }
    }

    #[test]
    fn pulse_envelope_is_bounded_and_periodic() {
        for i in 0..1000 {
            let t = i as f32 * 0.05;
            let value = pulse_envelope(t);
            assert!((0.0..=1.0).contains(&value));
        }
        assert!((pulse_envelope(0.0) - 1.0).abs() < 1e-6);
        assert!((pulse_envelope(TAU) - 1.0).abs() < 1e-5);
        assert!(pulse_envelope(std::f32::consts::PI) < 1e-6);
    }
}
