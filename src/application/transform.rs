//! Model positioning: position/rotation/scale and the derived world matrix.

use crate::input::InputState;

use glium::glutin::event::VirtualKeyCode;
use ultraviolet::{Mat4, Vec3, Vec4};

pub const MOVE_SPEED: f32 = 50.0;
pub const ROTATION_SPEED: f32 = 2.0;

/// Key assignments for [`Transform::control`].
#[derive(Debug, Clone, Copy)]
pub struct ControlBindings {
    pub turn_up: VirtualKeyCode,
    pub turn_down: VirtualKeyCode,
    pub turn_left: VirtualKeyCode,
    pub turn_right: VirtualKeyCode,
    pub roll_cw: VirtualKeyCode,
    pub roll_ccw: VirtualKeyCode,
    pub move_forward: VirtualKeyCode,
    pub move_backward: VirtualKeyCode,
}

/// Placement of a model (or light marker) in the scene.
///
/// The world matrix is rebuilt explicitly with [`Transform::update_matrix`];
/// stationary objects compute it once and never again.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    /// Euler angles in radians, applied in Z, X, Y order.
    pub rotation: Vec3,
    pub scale: Vec3,
    world_matrix: Mat4,
}

impl Transform {
    pub fn new(position: Vec3, rotation: Vec3, scale: f32) -> Transform {
        let mut transform = Transform {
            position,
            rotation,
            scale: Vec3::new(scale, scale, scale),
            world_matrix: Mat4::identity(),
        };
        transform.update_matrix();
        transform
    }

    pub fn world_matrix(&self) -> Mat4 {
        self.world_matrix
    }

    /// Rebuilds the world matrix as scale, then Z/X/Y rotation, then
    /// translation.
    pub fn update_matrix(&mut self) {
        self.world_matrix = Mat4::from_translation(self.position)
            * Mat4::from_rotation_y(self.rotation.y)
            * Mat4::from_rotation_x(self.rotation.x)
            * Mat4::from_rotation_z(self.rotation.z)
            * Mat4::from_nonuniform_scale(self.scale);
    }

    /// The direction the local Z axis points in world space.
    pub fn facing(&self) -> Vec3 {
        let z_axis = self.world_matrix.cols[2];
        Vec3::new(z_axis.x, z_axis.y, z_axis.z).normalized()
    }

    /// Rotates so that the local Z axis points at `target`.
    pub fn face_point(&mut self, target: Vec3) {
        let direction = (target - self.position).normalized();
        self.rotation.x = (-direction.y).asin();
        self.rotation.y = direction.x.atan2(direction.z);
        self.rotation.z = 0.0;
        self.update_matrix();
    }

    /// Rotates on all three axes and moves along the local Z axis according
    /// to the held keys. Motion scales with the frame time.
    pub fn control(&mut self, input: &InputState, frame_time: f32, bindings: &ControlBindings) {
        let rotation_step = ROTATION_SPEED * frame_time;
        if input.key_held(bindings.turn_down) {
            self.rotation.x += rotation_step;
        }
        if input.key_held(bindings.turn_up) {
            self.rotation.x -= rotation_step;
        }
        if input.key_held(bindings.turn_right) {
            self.rotation.y += rotation_step;
        }
        if input.key_held(bindings.turn_left) {
            self.rotation.y -= rotation_step;
        }
        if input.key_held(bindings.roll_cw) {
            self.rotation.z += rotation_step;
        }
        if input.key_held(bindings.roll_ccw) {
            self.rotation.z -= rotation_step;
        }

        // Forward motion follows the local Z axis of the current matrix,
        // so a rotated model moves the way it is pointing.
        let facing = self.facing();
        let move_step = MOVE_SPEED * frame_time;
        if input.key_held(bindings.move_forward) {
            self.position += facing * move_step;
        }
        if input.key_held(bindings.move_backward) {
            self.position -= facing * move_step;
        }
    }
}

impl Default for Transform {
    fn default() -> Transform {
        Transform::new(Vec3::zero(), Vec3::zero(), 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f32 = 1e-5;

    fn transform_direction(matrix: Mat4, direction: Vec3) -> Vec3 {
        let v = matrix * Vec4::new(direction.x, direction.y, direction.z, 0.0);
        Vec3::new(v.x, v.y, v.z)
    }

    fn assert_vec_close(a: Vec3, b: Vec3) {
        assert!(
            (a - b).mag() < TOLERANCE,
            "{:?} != {:?}",
            a,
            b
        );
    }

    #[test]
    fn identity_transform_is_identity_on_directions() {
        let transform = Transform::default();
        let direction = Vec3::new(0.3, -0.6, 0.9);
        assert_vec_close(
            transform_direction(transform.world_matrix(), direction),
            direction,
        );
    }

    #[test]
    fn scale_only_keeps_directions_parallel() {
        let mut transform = Transform::new(Vec3::zero(), Vec3::zero(), 1.0);
        transform.scale = Vec3::new(2.0, 2.0, 2.0);
        transform.update_matrix();

        let direction = Vec3::new(1.0, 2.0, -3.0).normalized();
        let transformed = transform_direction(transform.world_matrix(), direction);
        // Parallel: normalizing recovers the input direction.
        assert_vec_close(transformed.normalized(), direction);
    }

    #[test]
    fn translation_does_not_affect_directions() {
        let transform = Transform::new(Vec3::new(10.0, -4.0, 7.0), Vec3::zero(), 1.0);
        let direction = Vec3::new(0.0, 1.0, 0.0);
        assert_vec_close(
            transform_direction(transform.world_matrix(), direction),
            direction,
        );
    }

    #[test]
    fn default_facing_is_positive_z() {
        let transform = Transform::default();
        assert_vec_close(transform.facing(), Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn face_point_aims_local_z_at_target() {
        let mut transform = Transform::new(Vec3::new(0.0, 0.0, 0.0), Vec3::zero(), 1.0);
        let target = Vec3::new(5.0, 3.0, -2.0);
        transform.face_point(target);
        assert_vec_close(transform.facing(), target.normalized());
    }

    #[test]
    fn yaw_rotates_facing_in_xz_plane() {
        let mut transform = Transform::default();
        transform.rotation.y = std::f32::consts::FRAC_PI_2;
        transform.update_matrix();
        assert_vec_close(transform.facing(), Vec3::new(1.0, 0.0, 0.0));
    }
}
