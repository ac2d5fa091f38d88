pub mod config;
pub mod error;
pub mod particles;
pub mod renderer;
pub mod utils;

mod input_manager;
mod state;

use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::Window,
};
use config::Settings;
use state::State;

pub struct App {
    settings: Settings,
    state: Option<State>,
}

impl App {
    pub fn new(settings: Settings) -> Self {
        Self { settings, state: None }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        let window_attributes = Window::default_attributes()
            .with_title("Curl particles")
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.settings.window_width as f64,
                self.settings.window_height as f64,
            ));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Unable to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        match pollster::block_on(State::new(window, &self.settings)) {
            Ok(state) => self.state = Some(state),
            Err(e) => {
                log::error!("Unable to start: {e:#}");
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: winit::window::WindowId, event: WindowEvent) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        state.render_loop(&event, event_loop);
    }
}

pub fn run() -> anyhow::Result<()> {
    env_logger::init();

    let settings = Settings::from_args()?;
    let event_loop = EventLoop::new()?;
    let mut app = App::new(settings);

    event_loop.run_app(&mut app)?;

    Ok(())
}
