//! Cooperative render loop.
//!
//! The host calls [`RenderLoop::tick`] once per display refresh; nothing is
//! scheduled while the loop is stopped.

#[derive(Debug, Default)]
pub struct RenderLoop {
    running: bool,
    frames: u64,
}

impl RenderLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Claim the next frame. `false` once stopped.
    pub fn tick(&mut self) -> bool {
        if self.running {
            self.frames += 1;
        }
        self.running
    }

    /// Frames run since construction
    pub fn frames(&self) -> u64 {
        self.frames
    }
}
