use winit::event::{KeyEvent, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::{KeyCode, PhysicalKey};

/// Demo actions bound to keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    CyclePalette,
    ToggleOrientation,
    ToggleColorMode,
}

pub struct InputManager {}

impl InputManager {
    pub fn new() -> InputManager {
        InputManager {}
    }

    /// Closes the window on request or Escape, maps the remaining bound keys to actions.
    pub fn manage_input(&self, event: &WindowEvent, event_loop: &ActiveEventLoop) -> Option<InputAction> {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
                None
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: key_state,
                        repeat: false,
                        ..
                    },
                ..
            } => self.handle_key(event_loop, code, key_state.is_pressed()),
            _ => None,
        }
    }

    fn handle_key(&self, event_loop: &ActiveEventLoop, code: &KeyCode, is_pressed: bool) -> Option<InputAction> {
        match (code, is_pressed) {
            (KeyCode::Escape, true) => {
                event_loop.exit();
                None
            }
            (KeyCode::KeyP, true) => Some(InputAction::CyclePalette),
            (KeyCode::KeyO, true) => Some(InputAction::ToggleOrientation),
            (KeyCode::KeyC, true) => Some(InputAction::ToggleColorMode),
            _ => None,
        }
    }
}
