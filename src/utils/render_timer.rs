use std::time::{Duration, Instant};

/// Time values handed to the simulation once per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTime {
    /// Seconds since the timer was created.
    pub time: f32,
    /// Seconds since the previous tick.
    pub delta_time: f32,
}

pub struct RenderTimer {
    start_time: Instant,
    last_render_time: Instant,
    max_delta: Duration,
}

impl RenderTimer {
    /// `max_delta` caps the delta reported after a stall (window drag, breakpoint).
    pub fn new(max_delta: Duration) -> Self {
        let now = Instant::now();
        Self {
            start_time: now,
            last_render_time: now,
            max_delta,
        }
    }

    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        let delta_time = (now - self.last_render_time).min(self.max_delta);
        self.last_render_time = now;
        FrameTime {
            time: (now - self.start_time).as_secs_f32(),
            delta_time: delta_time.as_secs_f32(),
        }
    }
}

impl Default for RenderTimer {
    fn default() -> Self {
        Self::new(Duration::from_millis(100))
    }
}
