//! Spawn and cull policy for the hero particle overlay. The rigid-body
//! simulation itself lives in the wasm crate; this module decides when a
//! particle appears, how big it is, and when it is retired.

use crate::rng::XorShift;

/// Live-particle ceiling.
pub const MAX_PARTICLES: usize = 40;
/// Milliseconds between spawns.
pub const SPAWN_INTERVAL_MS: f64 = 150.0;
/// Particle radius range, in pixels.
pub const MIN_RADIUS: f64 = 1.5;
pub const MAX_RADIUS: f64 = 3.5;
/// Spawn height above the canvas top.
pub const SPAWN_Y: f64 = -10.0;

/// Where and how big the next particle is.
#[derive(Clone, Copy, Debug)]
pub struct SpawnPlan {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

pub fn spawn_plan(rng: &mut XorShift, span: f64) -> SpawnPlan {
    SpawnPlan {
        x: rng.range(span),
        y: SPAWN_Y,
        radius: MIN_RADIUS + rng.range(MAX_RADIUS - MIN_RADIUS),
    }
}

/// A particle below the canvas floor is done and should be removed.
pub fn expired(y: f64, canvas_height: f64) -> bool {
    y > canvas_height
}

/// Accumulates frame time and says how many particles to spawn this frame,
/// respecting the live ceiling.
#[derive(Clone, Copy, Debug, Default)]
pub struct SpawnClock {
    acc_ms: f64,
}

impl SpawnClock {
    pub fn tick(&mut self, dt_ms: f64, live: usize) -> usize {
        self.acc_ms += dt_ms;
        let mut due = 0;
        while self.acc_ms >= SPAWN_INTERVAL_MS {
            self.acc_ms -= SPAWN_INTERVAL_MS;
            due += 1;
        }
        due.min(MAX_PARTICLES.saturating_sub(live))
    }
}
