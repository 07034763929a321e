//! The scene camera: view/projection matrices and keyboard control.

use super::transform::{Transform, MOVE_SPEED, ROTATION_SPEED};
use crate::input::InputState;

use glium::{
    glutin::event::VirtualKeyCode,
    uniforms::{UniformValue, Uniforms},
};
use ultraviolet::{projection::perspective_gl, Mat4, Vec3};

pub struct Camera {
    transform: Transform,
    projection_matrix: Mat4,
    view_matrix: Mat4,
}

impl Camera {
    pub fn new(position: Vec3, rotation: Vec3, aspect_ratio: f32) -> Camera {
        let mut camera = Camera {
            transform: Transform::new(position, rotation, 1.0),
            projection_matrix: perspective_gl(78f32.to_radians(), aspect_ratio, 0.1, 10000.0),
            view_matrix: Mat4::identity(),
        };
        camera.update_matrices();
        camera
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.view_matrix
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix * self.view_matrix
    }

    /// Rebuilds the view matrix from the camera placement. The view matrix
    /// is the inverse of the camera's world matrix.
    pub fn update_matrices(&mut self) {
        self.transform.update_matrix();
        self.view_matrix = self.transform.world_matrix().inversed();
    }

    /// Arrow keys rotate, WASD moves (forward/backward along the facing
    /// direction, strafing along the local X axis).
    pub fn control(&mut self, input: &InputState, frame_time: f32) {
        let rotation_step = ROTATION_SPEED * frame_time;
        if input.key_held(VirtualKeyCode::Down) {
            self.transform.rotation.x += rotation_step;
        }
        if input.key_held(VirtualKeyCode::Up) {
            self.transform.rotation.x -= rotation_step;
        }
        if input.key_held(VirtualKeyCode::Right) {
            self.transform.rotation.y += rotation_step;
        }
        if input.key_held(VirtualKeyCode::Left) {
            self.transform.rotation.y -= rotation_step;
        }

        let world = self.transform.world_matrix();
        let right = Vec3::new(world.cols[0].x, world.cols[0].y, world.cols[0].z).normalized();
        let facing = self.transform.facing();
        let move_step = MOVE_SPEED * frame_time;
        if input.key_held(VirtualKeyCode::W) {
            self.transform.position += facing * move_step;
        }
        if input.key_held(VirtualKeyCode::S) {
            self.transform.position -= facing * move_step;
        }
        if input.key_held(VirtualKeyCode::D) {
            self.transform.position += right * move_step;
        }
        if input.key_held(VirtualKeyCode::A) {
            self.transform.position -= right * move_step;
        }
    }

    /// The camera's shader bindings, shared by every draw call.
    pub fn to_uniforms(&self) -> CameraUniforms {
        CameraUniforms {
            view: self.view_matrix.into(),
            projection: self.projection_matrix.into(),
            view_projection: self.view_projection_matrix().into(),
            position: self.transform.position.into(),
        }
    }
}

pub struct CameraUniforms {
    view: [[f32; 4]; 4],
    projection: [[f32; 4]; 4],
    view_projection: [[f32; 4]; 4],
    position: [f32; 3],
}

impl Uniforms for CameraUniforms {
    fn visit_values<'a, F: FnMut(&str, UniformValue<'a>)>(&'a self, mut callback: F) {
        callback("env_view_matrix", UniformValue::Mat4(self.view));
        callback("env_projection_matrix", UniformValue::Mat4(self.projection));
        callback(
            "env_view_projection_matrix",
            UniformValue::Mat4(self.view_projection),
        );
        callback("env_camera_position", UniformValue::Vec3(self.position));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ultraviolet::Vec4;

    #[test]
    fn view_matrix_inverts_camera_placement() {
        let position = Vec3::new(-15.0, 20.0, -40.0);
        let camera = Camera::new(position, Vec3::new(0.23, 0.31, 0.0), 4.0 / 3.0);
        // The camera's own position maps to the view-space origin.
        let origin = camera.view_matrix() * Vec4::new(position.x, position.y, position.z, 1.0);
        assert!(Vec3::new(origin.x, origin.y, origin.z).mag() < 1e-3);
    }
}
