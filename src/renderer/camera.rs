use glam::{Mat4, Vec3};
use winit::event::{ElementState, KeyEvent, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// A perspective camera orbiting a target point.
///
/// Angles are in degrees. The camera only produces matrices, whoever draws uploads them.
pub struct Camera {
    pub target: Vec3,
    pub distance: f32,
    pub azimuth: f32,
    pub elevation: f32,
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    /// Degrees per second added to the azimuth every update.
    pub auto_rotate_speed: f32,
    camera_controller: CameraController,
}

impl Camera {
    pub fn new(distance: f32, fov_y: f32, near: f32, far: f32) -> Self {
        Self {
            target: Vec3::ZERO,
            distance,
            azimuth: 0.0,
            elevation: 0.0,
            fov_y,
            near,
            far,
            auto_rotate_speed: 7.5,
            camera_controller: CameraController::new(45.0, 0.1),
        }
    }

    pub fn eye(&self) -> Vec3 {
        let azimuth = self.azimuth.to_radians();
        let elevation = self.elevation.to_radians();
        let direction = Vec3::new(
            elevation.cos() * azimuth.sin(),
            elevation.sin(),
            elevation.cos() * azimuth.cos(),
        );
        self.target + direction * self.distance
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self, screen_width: f32, screen_height: f32) -> Mat4 {
        let aspect = if screen_height > 0.0 { screen_width / screen_height } else { 1.0 };
        Mat4::perspective_rh(self.fov_y.to_radians(), aspect, self.near, self.far)
    }

    pub fn process_events(&mut self, event: &WindowEvent) -> bool {
        self.camera_controller.process_events(event)
    }

    pub fn update(&mut self, delta_time: f32) {
        self.azimuth = (self.azimuth + self.auto_rotate_speed * delta_time) % 360.0;
        let mut controller = std::mem::take(&mut self.camera_controller);
        controller.update_camera(self, delta_time);
        self.camera_controller = controller;
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(1000.0, 45.0, 0.01, 5000.0)
    }
}

#[derive(Debug, Default)]
struct CameraController {
    is_up_pressed: bool,
    is_down_pressed: bool,
    is_left_pressed: bool,
    is_right_pressed: bool,
    speed: f32,
    zoom_sensitivity: f32,
    scroll_delta: f32,
}

impl CameraController {
    fn new(speed: f32, zoom_sensitivity: f32) -> Self {
        Self {
            speed,
            zoom_sensitivity,
            ..Default::default()
        }
    }

    fn process_events(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        ..
                    },
                ..
            } => {
                let is_pressed = *state == ElementState::Pressed;
                match code {
                    KeyCode::KeyW | KeyCode::ArrowUp => self.is_up_pressed = is_pressed,
                    KeyCode::KeyS | KeyCode::ArrowDown => self.is_down_pressed = is_pressed,
                    KeyCode::KeyA | KeyCode::ArrowLeft => self.is_left_pressed = is_pressed,
                    KeyCode::KeyD | KeyCode::ArrowRight => self.is_right_pressed = is_pressed,
                    _ => return false,
                }
                true
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.scroll_delta += match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(position) => position.y as f32 / 100.0,
                };
                true
            }
            _ => false,
        }
    }

    fn update_camera(&mut self, camera: &mut Camera, delta_time: f32) {
        let step = self.speed * delta_time;

        if self.is_up_pressed {
            camera.elevation += step;
        }
        if self.is_down_pressed {
            camera.elevation -= step;
        }
        if self.is_right_pressed {
            camera.azimuth += step;
        }
        if self.is_left_pressed {
            camera.azimuth -= step;
        }
        camera.elevation = camera.elevation.clamp(-89.0, 89.0);

        if self.scroll_delta != 0.0 {
            let zoom_factor = 1.0 - (self.scroll_delta * self.zoom_sensitivity);
            camera.distance = (camera.distance * zoom_factor).clamp(1.0, camera.far * 0.5);
        }

        self.scroll_delta = 0.0;
    }
}
