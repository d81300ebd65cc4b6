//! Signal pulses fired along edges when a node is clicked.
//!
//! Pulses age in simulated time, so pausing the simulation freezes them in
//! place. The curve math is shared with edge drawing so a pulse follows the
//! exact waver of the edge it travels along.

use std::collections::VecDeque;

use super::store::{EntityStore, NodeIdx};

/// Simulated-time units a pulse stays alive.
pub const PULSE_LIFESPAN: f64 = 1.0;
/// How far behind the head (in eased progress) the trail point sits.
pub const TRAIL_LAG: f64 = 0.15;
/// Maximum live pulses; the oldest are dropped first.
pub const PULSE_CAPACITY: usize = 512;

/// Sideways waver of an edge curve's control point.
pub fn curve_offset(time: f64, phase_x: f64) -> f64 {
	(time * 2.0 + phase_x * 0.05).sin() * 12.0
}

/// Control point of the quadratic curve between `from` and `to`.
pub fn control_point(from: (f64, f64), to: (f64, f64), offset: f64) -> (f64, f64) {
	(
		(from.0 + to.0) / 2.0 + offset,
		(from.1 + to.1) / 2.0 + offset,
	)
}

/// Point on the quadratic Bézier `(from, control, to)` at `t` in `[0, 1]`.
pub fn quadratic_point(from: (f64, f64), control: (f64, f64), to: (f64, f64), t: f64) -> (f64, f64) {
	let inv = 1.0 - t;
	(
		inv * inv * from.0 + 2.0 * inv * t * control.0 + t * t * to.0,
		inv * inv * from.1 + 2.0 * inv * t * control.1 + t * t * to.1,
	)
}

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

/// A signal travelling from a clicked node to one neighbor.
#[derive(Clone, Debug, PartialEq)]
pub struct Pulse {
	/// Clicked node.
	pub source: NodeIdx,
	/// Neighbor the pulse travels to.
	pub target: NodeIdx,
	/// The edge's declared source, which seeds the curve phase.
	pub phase: NodeIdx,
	/// Simulated time at spawn.
	pub start_time: f64,
	/// CSS color.
	pub color: String,
}

/// Where a live pulse is drawn this frame.
#[derive(Clone, Debug, PartialEq)]
pub struct PulseFrame {
	/// Leading point in world coordinates.
	pub head: (f64, f64),
	/// Trailing point, a little behind the head on the same curve.
	pub trail: (f64, f64),
	/// CSS color.
	pub color: String,
}

/// Live pulses, oldest first.
#[derive(Clone, Debug, Default)]
pub struct PulseTracker {
	pulses: VecDeque<Pulse>,
}

impl PulseTracker {
	/// Spawn one pulse per edge touching `clicked`. Returns how many were added.
	pub fn spawn_from(&mut self, store: &EntityStore, clicked: NodeIdx, now: f64, color: &str) -> usize {
		let mut spawned = 0;
		for (edge, neighbor) in store.incident_edges(clicked) {
			self.push(Pulse {
				source: clicked,
				target: neighbor,
				phase: edge.source,
				start_time: now,
				color: color.to_string(),
			});
			spawned += 1;
		}
		spawned
	}

	/// Add a pulse, dropping the oldest when full.
	pub fn push(&mut self, pulse: Pulse) {
		if self.pulses.len() == PULSE_CAPACITY {
			self.pulses.pop_front();
		}
		self.pulses.push_back(pulse);
	}

	/// Drop every pulse whose age has reached its lifespan.
	pub fn prune(&mut self, now: f64) {
		self.pulses.retain(|p| now - p.start_time < PULSE_LIFESPAN);
	}

	/// Head and trail positions of every live pulse at simulated time `now`.
	pub fn frames(&self, store: &EntityStore, now: f64) -> Vec<PulseFrame> {
		self.pulses
			.iter()
			.filter_map(|pulse| {
				let age = now - pulse.start_time;
				if !(0.0..PULSE_LIFESPAN).contains(&age) {
					return None;
				}
				let (s, t, phase) = (
					store.node(pulse.source)?,
					store.node(pulse.target)?,
					store.node(pulse.phase)?,
				);
				let (from, to) = ((s.x, s.y), (t.x, t.y));
				let control = control_point(from, to, curve_offset(now, phase.x));
				let eased = ease_out_cubic(age / PULSE_LIFESPAN);
				Some(PulseFrame {
					head: quadratic_point(from, control, to, eased),
					trail: quadratic_point(from, control, to, (eased - TRAIL_LAG).max(0.0)),
					color: pulse.color.clone(),
				})
			})
			.collect()
	}

	/// Number of live pulses.
	pub fn len(&self) -> usize {
		self.pulses.len()
	}

	/// No pulse is live.
	pub fn is_empty(&self) -> bool {
		self.pulses.is_empty()
	}

	/// Live pulses, oldest first.
	pub fn iter(&self) -> impl Iterator<Item = &Pulse> {
		self.pulses.iter()
	}
}
