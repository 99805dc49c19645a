//! Frame-by-frame math for the portfolio's canvas sketches, kept free of any
//! rendering surface so it can be exercised on the host.

pub mod math;
pub mod network;
pub mod path;
pub mod physics;
pub mod ray;
pub mod rng;
pub mod tint;
pub mod title;
