//! Keyboard state tracking fed from the window event loop.

use std::collections::HashSet;

use glium::glutin::event::{ElementState, KeyboardInput, VirtualKeyCode};

/// Collects keyboard events into per-frame key state.
///
/// `key_held` reports keys currently down; `key_hit` reports keys that went
/// down since the last `end_frame` call, so a single press registers exactly
/// once no matter how long it is held.
#[derive(Debug, Default)]
pub struct InputState {
    held: HashSet<VirtualKeyCode>,
    hit: HashSet<VirtualKeyCode>,
}

impl InputState {
    pub fn new() -> InputState {
        Default::default()
    }

    /// Feeds a keyboard event from the window loop.
    pub fn process(&mut self, input: &KeyboardInput) {
        let key = match input.virtual_keycode {
            Some(key) => key,
            None => return,
        };
        match input.state {
            ElementState::Pressed => {
                if self.held.insert(key) {
                    self.hit.insert(key);
                }
            }
            ElementState::Released => {
                self.held.remove(&key);
            }
        }
    }

    pub fn key_held(&self, key: VirtualKeyCode) -> bool {
        self.held.contains(&key)
    }

    pub fn key_hit(&self, key: VirtualKeyCode) -> bool {
        self.hit.contains(&key)
    }

    /// Clears the edge-triggered state. Call once per frame, after update.
    pub fn end_frame(&mut self) {
        self.hit.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(key: VirtualKeyCode) -> KeyboardInput {
        #[allow(deprecated)]
        KeyboardInput {
            scancode: 0,
            state: ElementState::Pressed,
            virtual_keycode: Some(key),
            modifiers: Default::default(),
        }
    }

    fn release(key: VirtualKeyCode) -> KeyboardInput {
        #[allow(deprecated)]
        KeyboardInput {
            scancode: 0,
            state: ElementState::Released,
            virtual_keycode: Some(key),
            modifiers: Default::default(),
        }
    }

    #[test]
    fn hit_registers_once_per_press() {
        let mut input = InputState::new();
        input.process(&press(VirtualKeyCode::Key1));
        assert!(input.key_hit(VirtualKeyCode::Key1));
        assert!(input.key_held(VirtualKeyCode::Key1));

        input.end_frame();
        // Key repeat sends further Pressed events while held.
        input.process(&press(VirtualKeyCode::Key1));
        assert!(!input.key_hit(VirtualKeyCode::Key1));
        assert!(input.key_held(VirtualKeyCode::Key1));

        input.process(&release(VirtualKeyCode::Key1));
        input.process(&press(VirtualKeyCode::Key1));
        assert!(input.key_hit(VirtualKeyCode::Key1));
    }

    #[test]
    fn release_clears_held() {
        let mut input = InputState::new();
        input.process(&press(VirtualKeyCode::W));
        input.process(&release(VirtualKeyCode::W));
        assert!(!input.key_held(VirtualKeyCode::W));
    }
}
