//! Playback time tracking

/// Elapsed time within the active clip
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackClock {
    /// Index of the clip being played
    pub active_clip: Option<usize>,
    /// Seconds since the clip started
    pub elapsed: f32,
    /// Multiplier applied to every time step
    pub speed: f32,
    pub paused: bool,
}

impl PlaybackClock {
    pub fn new(active_clip: Option<usize>) -> Self {
        Self {
            active_clip,
            elapsed: 0.0,
            speed: 1.0,
            paused: false,
        }
    }

    /// Check if a clip is being played
    pub fn is_active(&self) -> bool {
        self.active_clip.is_some()
    }

    /// Switch clips, restarting from the beginning
    pub fn set_clip(&mut self, clip: Option<usize>) {
        self.active_clip = clip;
        self.elapsed = 0.0;
    }

    /// Advance by `dt` seconds
    ///
    /// Once elapsed time passes `duration` it jumps back to 0 rather than
    /// wrapping the remainder into the next loop.
    pub fn advance(&mut self, dt: f32, duration: f32) {
        if self.paused || !self.is_active() {
            return;
        }
        self.elapsed += dt * self.speed;
        if self.elapsed > duration || self.elapsed < 0.0 {
            self.elapsed = 0.0;
        }
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
    }
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self::new(None)
    }
}
