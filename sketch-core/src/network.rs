//! Ring-of-nodes math for the hero connection-network sketch: a slowly
//! rotating ring of breathing nodes joined by links whose strength follows a
//! travelling sine wave.

use crate::math::{lerp, remap};

pub const NODE_COUNT: usize = 8;
pub const RING_RADIUS: f64 = 70.0;
pub const NODE_SIZE: f64 = 6.0;

/// One node on the ring.
#[derive(Clone, Debug)]
pub struct NetNode {
    pub angle: f64,
    pub radius: f64,
    pub size: f64,
    /// Hue in degrees, distributed evenly around the color wheel.
    pub hue: f64,
    pub pulse_offset: f64,
}

impl NetNode {
    pub fn new(index: usize, count: usize, pulse_offset: f64) -> Self {
        let angle = std::f64::consts::TAU / count as f64 * index as f64;
        NetNode {
            angle,
            radius: RING_RADIUS,
            size: NODE_SIZE,
            hue: 360.0 / count as f64 * index as f64,
            pulse_offset,
        }
    }

    /// Advance rotation and the breathing motion of the ring radius.
    pub fn update(&mut self, t: f64) {
        self.angle += 0.005;
        self.radius = RING_RADIUS + (t * 2.0 + self.pulse_offset).sin() * 3.0;
    }

    pub fn position(&self) -> (f64, f64) {
        (self.angle.cos() * self.radius, self.angle.sin() * self.radius)
    }

    /// Diameter of the outer pulse ring at time `t`.
    pub fn pulse_diameter(&self, t: f64) -> f64 {
        (self.size + 2.0 + (t * 3.0 + self.pulse_offset).sin() * 1.5) * 3.0
    }
}

/// Link between two node indices, with a smoothed activation strength.
#[derive(Clone, Debug)]
pub struct NetLink {
    pub a: usize,
    pub b: usize,
    pub strength: f64,
    pub target: f64,
}

impl NetLink {
    pub fn new(a: usize, b: usize) -> Self {
        NetLink {
            a,
            b,
            strength: 0.0,
            target: 0.0,
        }
    }

    /// Feed the raw activation wave (in [-1, 1]) for this frame.
    pub fn drive(&mut self, wave: f64) {
        self.target = remap(wave, -1.0, 1.0, 0.2, 1.0);
    }

    /// Ease the visible strength toward its target.
    pub fn settle(&mut self) {
        self.strength = lerp(self.strength, self.target, 0.1);
    }
}

/// Node pairs that carry a link: near neighbours on the ring, plus the
/// wrap-around pairs that cross the center.
pub fn link_topology(count: usize) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for i in 0..count {
        for j in (i + 1)..count {
            let d = j - i;
            if d <= 2 || d >= count - 2 {
                pairs.push((i, j));
            }
        }
    }
    pairs
}

/// Travelling activation wave sampled per link index.
pub fn activation_wave(t: f64, link_index: usize) -> f64 {
    (t * 1.5 + link_index as f64 * 0.5).sin()
}

/// Hue of the rotating center core at time `t`.
pub fn core_hue(t: f64) -> f64 {
    (t * 30.0) % 360.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topology_links_near_and_wraparound_pairs() {
        let pairs = link_topology(NODE_COUNT);
        assert!(pairs.contains(&(0, 1)));
        assert!(pairs.contains(&(0, 2)));
        assert!(pairs.contains(&(0, 6)));
        assert!(pairs.contains(&(0, 7)));
        assert!(!pairs.contains(&(0, 3)));
        assert!(!pairs.contains(&(0, 4)));
        // Symmetric by construction: every node touches the same number of
        // pairs, so the count is n * 4 / 2.
        assert_eq!(pairs.len(), NODE_COUNT * 4 / 2);
    }

    #[test]
    fn driven_strength_stays_in_band() {
        let mut link = NetLink::new(0, 1);
        for step in 0..500 {
            link.drive(activation_wave(step as f64 * 0.02, 3));
            link.settle();
            assert!(link.target >= 0.2 && link.target <= 1.0);
            assert!(link.strength >= 0.0 && link.strength <= 1.0);
        }
        // After many frames the smoothed value tracks the band too.
        assert!(link.strength >= 0.15);
    }

    #[test]
    fn hues_are_evenly_distributed() {
        let nodes: Vec<NetNode> = (0..NODE_COUNT)
            .map(|i| NetNode::new(i, NODE_COUNT, 0.0))
            .collect();
        assert_eq!(nodes[0].hue, 0.0);
        assert_eq!(nodes[4].hue, 180.0);
        assert!((nodes[1].hue - 45.0).abs() < 1e-12);
    }

    #[test]
    fn breathing_keeps_radius_near_ring() {
        let mut node = NetNode::new(0, NODE_COUNT, 1.3);
        for step in 0..300 {
            node.update(step as f64 * 0.02);
            assert!((node.radius - RING_RADIUS).abs() <= 3.0 + 1e-12);
        }
    }

    #[test]
    fn core_hue_wraps() {
        assert!(core_hue(13.0) < 360.0);
        assert!(core_hue(0.5) >= 0.0);
    }
}
