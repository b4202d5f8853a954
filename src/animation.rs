//! One-shot entrance animation for the displayed model.
//!
//! When the model is attached it spins in: the yaw offset starts at two
//! full turns and eases down to the rest orientation over a fixed duration.
//! The spin is sampled once per frame from the render loop; there is no
//! completion callback and nothing waits on it.

use cgmath::Rad;
use instant::Duration;

/// Number of full turns the model makes while entering.
pub const ENTRANCE_TURNS: f32 = 2.0;
/// Length of the entrance spin.
pub const ENTRANCE_SECONDS: f32 = 4.0;

/// Quadratic ease-out: fast start, decelerating towards the end.
fn ease_out_quad(t: f32) -> f32 {
    1.0 - (1.0 - t) * (1.0 - t)
}

/// Samples the entrance spin over time.
///
/// [`advance`](Self::advance) returns the yaw offset to compose onto the
/// model's rest rotation. The offset starts at `ENTRANCE_TURNS` full turns
/// and decreases monotonically to zero; it never overshoots.
#[derive(Clone, Debug)]
pub struct EntranceSpin {
    start: Rad<f32>,
    duration: Duration,
    elapsed: Duration,
}

impl EntranceSpin {
    pub fn new() -> Self {
        Self::with(
            Rad(ENTRANCE_TURNS * std::f32::consts::TAU),
            Duration::from_secs_f32(ENTRANCE_SECONDS),
        )
    }

    pub fn with(start: Rad<f32>, duration: Duration) -> Self {
        Self {
            start,
            duration,
            elapsed: Duration::from_secs(0),
        }
    }

    /// Advances the clock by `dt` and returns the current yaw offset.
    pub fn advance(&mut self, dt: Duration) -> Rad<f32> {
        self.elapsed += dt;
        self.offset()
    }

    /// The yaw offset at the current clock, without advancing.
    pub fn offset(&self) -> Rad<f32> {
        if self.is_finished() {
            return Rad(0.0);
        }
        let t = self.elapsed.as_secs_f32() / self.duration.as_secs_f32();
        self.start * (1.0 - ease_out_quad(t))
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }
}

impl Default for EntranceSpin {
    fn default() -> Self {
        Self::new()
    }
}
