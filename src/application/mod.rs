//! The application behaviour: owns the scene, advances it every frame and
//! draws it (shadow maps first, then the models, then the light markers).

mod camera;
mod color;
mod light;
mod material;
mod model;
mod scene;
mod technique;
mod transform;

use crate::input::InputState;
use crate::rendering::UniformsSet;
use light::LightKind;
use model::Model;
use scene::{Scene, PULSING_LIGHT, SPOT_LIGHT};

use std::time::Duration;

use anyhow::Result;
use glium::{
    framebuffer::SimpleFrameBuffer,
    uniform,
    uniforms::Uniforms,
    BackfaceCullingMode, Depth, DepthTest, Display, DrawParameters, Frame, Surface,
};

pub struct Application {
    scene: Scene,
}

impl Application {
    pub fn new(display: &Display) -> Result<Application> {
        let (width, height) = display.get_framebuffer_dimensions();
        let scene = Scene::create(display, width as f32 / height as f32)?;
        Ok(Application { scene })
    }

    /// Called every frame before drawing.
    pub fn tick(&mut self, delta: Duration, input: &InputState) {
        self.scene.update(delta.as_secs_f32(), input);
    }

    /// Renders the shadow maps and then the whole scene into `frame`.
    pub fn draw(&mut self, display: &Display, frame: &mut Frame) -> Result<()> {
        self.draw_shadow_maps(display)?;

        let ambient = self.scene.ambient.0;
        frame.clear_color_and_depth((ambient.x, ambient.y, ambient.z, 1.0), 1.0);
        self.draw_models(frame)?;
        Ok(())
    }

    /// Depth-only pass from each spot light's point of view.
    fn draw_shadow_maps(&self, display: &Display) -> Result<()> {
        for light in &self.scene.lights {
            let (cone_angle, shadow) = match &light.kind {
                LightKind::Spot { cone_angle, shadow } => (*cone_angle, shadow),
                LightKind::Point => continue,
            };
            let mut buffer = SimpleFrameBuffer::depth_only(display, shadow.texture())?;
            buffer.clear_depth(1.0);

            let view_projection: [[f32; 4]; 4] =
                light::spot_view_projection(light.transform(), cone_angle).into();
            let params = DrawParameters {
                depth: Depth {
                    test: DepthTest::IfLess,
                    write: true,
                    ..Default::default()
                },
                backface_culling: BackfaceCullingMode::CullClockwise,
                ..Default::default()
            };
            for model in &self.scene.models {
                let uniforms = UniformsSet::new(model.to_uniforms()).add(uniform! {
                    light_view_projection: view_projection,
                });
                for group in model.groups() {
                    buffer.draw(
                        &group.vertex_buffer,
                        &group.index_buffer,
                        &self.scene.techniques.depth_only,
                        &uniforms,
                        &params,
                    )?;
                }
            }
        }
        Ok(())
    }

    /// The main pass over every scene model, with the light markers last so
    /// their blending sees the lit scene behind them.
    fn draw_models(&self, frame: &mut Frame) -> Result<()> {
        let scene = &self.scene;
        let envelope = scene.pulse_envelope();
        let light_uniforms = |index: usize| {
            let light = &scene.lights[index];
            if index == PULSING_LIGHT {
                light.to_uniforms(index, light.diffuse * envelope, light.specular * envelope)
            } else {
                light.to_uniforms(index, light.diffuse, light.specular)
            }
        };
        let shared = || {
            UniformsSet::new(scene.camera.to_uniforms())
                .add(scene.ambient.to_uniforms())
                .add(light_uniforms(0))
                .add(light_uniforms(1))
                .add(light_uniforms(2))
                .add(scene.lights[SPOT_LIGHT].spot_uniforms())
                .add(uniform! {
                    wiggle: scene.wiggle(),
                })
        };

        for model in &scene.models {
            draw_model(frame, model, &shared)?;
        }
        for light in &scene.lights {
            draw_model(frame, &light.marker, &shared)?;
        }
        Ok(())
    }
}

/// Draws one model with its bound technique. Outlined techniques get their
/// outline pass first, with front faces culled so only the expanded shell
/// behind the model remains visible.
fn draw_model<U: Uniforms, UG: Fn() -> U>(
    frame: &mut Frame,
    model: &Model,
    generate_uniforms: UG,
) -> Result<()> {
    let technique = model.technique();

    if let Some(outline_program) = technique.outline_program() {
        let params = DrawParameters {
            depth: Depth {
                test: DepthTest::IfLess,
                write: true,
                ..Default::default()
            },
            backface_culling: BackfaceCullingMode::CullCounterClockwise,
            ..Default::default()
        };
        let uniforms = UniformsSet::new(generate_uniforms())
            .add(model.to_uniforms())
            .add(model.material_uniforms());
        for group in model.groups() {
            frame.draw(
                &group.vertex_buffer,
                &group.index_buffer,
                outline_program,
                &uniforms,
                &params,
            )?;
        }
    }

    let params = DrawParameters {
        depth: Depth {
            test: DepthTest::IfLess,
            write: technique.writes_depth(),
            ..Default::default()
        },
        backface_culling: BackfaceCullingMode::CullClockwise,
        blend: technique.blend(),
        ..Default::default()
    };
    let uniforms = UniformsSet::new(generate_uniforms())
        .add(model.to_uniforms())
        .add(model.material_uniforms());
    for group in model.groups() {
        frame.draw(
            &group.vertex_buffer,
            &group.index_buffer,
            technique.program(),
            &uniforms,
            &params,
        )?;
    }
    Ok(())
}
