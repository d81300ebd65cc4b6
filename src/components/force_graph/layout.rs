//! Per-tick layout strategies and velocity integration.
//!
//! Each [`LayoutMode`] contributes a velocity delta per node; afterwards every
//! free node is damped, speed-limited and moved. Dragged nodes never receive
//! force and end every step with zero velocity.

use std::f64::consts::PI;

use super::store::{EntityStore, SimEdge, SimNode};

/// Physics knobs for the force-directed layout, supplied by the theme.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ForceParams {
	/// Numerator of the inverse-square repulsion.
	pub repulsion: f64,
	/// Spring stiffness along edges.
	pub spring: f64,
	/// Pull of every node toward the origin.
	pub center_gravity: f64,
}

impl ForceParams {
	/// Repulsion used when a theme sets none.
	pub const DEFAULT_REPULSION: f64 = 1000.0;
	/// Spring stiffness used when a theme sets none.
	pub const DEFAULT_SPRING: f64 = 0.05;
	/// Center gravity used when a theme sets none.
	pub const DEFAULT_CENTER_GRAVITY: f64 = 0.01;
}

impl Default for ForceParams {
	fn default() -> Self {
		Self {
			repulsion: Self::DEFAULT_REPULSION,
			spring: Self::DEFAULT_SPRING,
			center_gravity: Self::DEFAULT_CENTER_GRAVITY,
		}
	}
}

/// Grid layout knobs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridParams {
	/// Distance between neighboring cells.
	pub spacing: f64,
	/// Fraction of the gap to the target added to velocity per tick.
	pub gain: f64,
}

impl Default for GridParams {
	fn default() -> Self {
		Self {
			spacing: 150.0,
			gain: 0.05,
		}
	}
}

/// Radial layout knobs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RadialParams {
	/// Radius of the innermost ring.
	pub base_radius: f64,
	/// Distance between consecutive rings.
	pub ring_spacing: f64,
	/// Fraction of the gap to the target added to velocity per tick.
	pub gain: f64,
}

impl Default for RadialParams {
	fn default() -> Self {
		Self {
			base_radius: 200.0,
			ring_spacing: 150.0,
			gain: 0.05,
		}
	}
}

/// Layout strategy, resolved once per theme change.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LayoutMode {
	/// Pairwise repulsion, edge springs and center gravity.
	Force(ForceParams),
	/// Pull each node toward a deterministic grid cell.
	Grid(GridParams),
	/// Pull each node onto its cluster's ring.
	Radial(RadialParams),
}

impl Default for LayoutMode {
	fn default() -> Self {
		LayoutMode::Force(ForceParams::default())
	}
}

/// Constants shared by every layout mode.
#[derive(Clone, Copy, Debug)]
pub struct SimulationParams {
	/// Pairs further apart than this do not repel.
	pub repulsion_cutoff: f64,
	pub spring_length: f64,
	/// Added to squared distances so coincident nodes stay finite.
	pub epsilon: f64,
	pub damping: f64,
	pub max_speed: f64,
	/// Speeds below this are zeroed so the layout comes to rest.
	pub rest_speed: f64,
}

impl Default for SimulationParams {
	fn default() -> Self {
		Self {
			repulsion_cutoff: 400.0,
			spring_length: 120.0,
			epsilon: 0.1,
			damping: 0.85,
			max_speed: 50.0,
			rest_speed: 0.1,
		}
	}
}

/// Advance every node by one tick under `mode`.
pub fn step(mode: &LayoutMode, params: &SimulationParams, store: &mut EntityStore) {
	match mode {
		LayoutMode::Force(force) => {
			let (nodes, edges) = store.split_mut();
			apply_repulsion(nodes, force.repulsion, params);
			apply_springs(nodes, edges, force.spring, params);
			apply_center_gravity(nodes, force.center_gravity);
		}
		LayoutMode::Grid(grid) => {
			let cols = grid_cols(store.nodes().len());
			for (index, node) in store.nodes_mut().iter_mut().enumerate() {
				let (col, row) = grid_cell(index, cols);
				let half = cols as f64 / 2.0;
				let target = (
					(col as f64 - half) * grid.spacing,
					(row as f64 - half) * grid.spacing,
				);
				pull_toward(node, target, grid.gain);
			}
		}
		LayoutMode::Radial(radial) => {
			let targets: Vec<(f64, f64)> = store
				.nodes()
				.iter()
				.map(|node| radial_target(store, node, radial))
				.collect();
			for (node, target) in store.nodes_mut().iter_mut().zip(targets) {
				pull_toward(node, target, radial.gain);
			}
		}
	}

	integrate(store.nodes_mut(), params);
}

fn apply_repulsion(nodes: &mut [SimNode], strength: f64, params: &SimulationParams) {
	// O(n²) over all pairs; the cutoff only skips the force, not the visit.
	for i in 0..nodes.len() {
		let (head, tail) = nodes.split_at_mut(i + 1);
		let a = &mut head[i];
		for b in tail.iter_mut() {
			let (dx, dy) = (a.x - b.x, a.y - b.y);
			let dist_sq = dx * dx + dy * dy + params.epsilon;
			let dist = dist_sq.sqrt();
			if dist >= params.repulsion_cutoff {
				continue;
			}
			let force = strength / dist_sq;
			let (fx, fy) = (dx / dist * force, dy / dist * force);
			if !a.is_dragging {
				a.vx += fx;
				a.vy += fy;
			}
			if !b.is_dragging {
				b.vx -= fx;
				b.vy -= fy;
			}
		}
	}
}

fn apply_springs(nodes: &mut [SimNode], edges: &[SimEdge], strength: f64, params: &SimulationParams) {
	for edge in edges {
		let (s, t) = (&nodes[edge.source], &nodes[edge.target]);
		let (dx, dy) = (t.x - s.x, t.y - s.y);
		let dist = (dx * dx + dy * dy).sqrt();
		// Coincident endpoints (including self-loops) have no direction.
		if dist == 0.0 {
			continue;
		}
		let force = (dist - params.spring_length) * strength;
		let (fx, fy) = (dx / dist * force, dy / dist * force);

		let source = &mut nodes[edge.source];
		if !source.is_dragging {
			source.vx += fx;
			source.vy += fy;
		}
		let target = &mut nodes[edge.target];
		if !target.is_dragging {
			target.vx -= fx;
			target.vy -= fy;
		}
	}
}

fn apply_center_gravity(nodes: &mut [SimNode], gravity: f64) {
	for node in nodes.iter_mut().filter(|n| !n.is_dragging) {
		node.vx -= node.x * gravity;
		node.vy -= node.y * gravity;
	}
}

fn pull_toward(node: &mut SimNode, (tx, ty): (f64, f64), gain: f64) {
	if node.is_dragging {
		return;
	}
	node.vx += (tx - node.x) * gain;
	node.vy += (ty - node.y) * gain;
}

/// Number of grid columns for `count` nodes.
pub fn grid_cols(count: usize) -> usize {
	((count as f64 * 1.5).sqrt().ceil() as usize).max(1)
}

/// `(col, row)` of the node at stable `index`.
pub fn grid_cell(index: usize, cols: usize) -> (usize, usize) {
	(index % cols, index / cols)
}

/// Deterministic angle in radians: sum of UTF-16 code units mod 360, as degrees.
///
/// Ids with similar character sums bunch together; the spread is not even.
pub fn radial_angle(id: &str) -> f64 {
	let sum: u64 = id.encode_utf16().map(u64::from).sum();
	(sum % 360) as f64 * (PI / 180.0)
}

/// Ring index for a node: its cluster's rank, or one past the last cluster.
pub fn radial_ring(store: &EntityStore, node: &SimNode) -> usize {
	node.cluster
		.as_deref()
		.and_then(|id| store.cluster_rank(id))
		.unwrap_or(store.clusters().len())
}

fn radial_target(store: &EntityStore, node: &SimNode, radial: &RadialParams) -> (f64, f64) {
	let radius = radial.base_radius + radial_ring(store, node) as f64 * radial.ring_spacing;
	let angle = radial_angle(&node.id);
	(angle.cos() * radius, angle.sin() * radius)
}

fn integrate(nodes: &mut [SimNode], params: &SimulationParams) {
	for node in nodes {
		if node.is_dragging {
			node.vx = 0.0;
			node.vy = 0.0;
			continue;
		}
		node.vx *= params.damping;
		node.vy *= params.damping;
		let speed = (node.vx * node.vx + node.vy * node.vy).sqrt();
		if speed > params.max_speed {
			node.vx = node.vx / speed * params.max_speed;
			node.vy = node.vy / speed * params.max_speed;
		}
		if speed < params.rest_speed {
			node.vx = 0.0;
			node.vy = 0.0;
		}
		node.x += node.vx;
		node.y += node.vy;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::store::tests::{cluster, edge, node};
	use crate::components::force_graph::types::GraphData;

	fn store_of(nodes: Vec<crate::components::force_graph::types::GraphNode>) -> EntityStore {
		EntityStore::from_data(&GraphData {
			clusters: vec![],
			nodes,
			edges: vec![],
		})
	}

	#[test]
	fn test_grid_scenario_ten_nodes() {
		let cols = grid_cols(10);
		assert_eq!(cols, 4);
		assert_eq!(grid_cell(5, cols), (1, 1));
	}

	#[test]
	fn test_grid_pull_moves_toward_cell() {
		let mut store = store_of(vec![node("a", None, 0.0, 0.0)]);
		// one node: cols = 2, cell (0, 0) targets (-150, -150)
		step(&LayoutMode::Grid(GridParams::default()), &SimulationParams::default(), &mut store);
		let a = &store.nodes()[0];
		assert!(a.x < 0.0 && a.y < 0.0);
		assert!((a.x - (-150.0 * 0.05 * 0.85)).abs() < 1e-9);
	}

	#[test]
	fn test_repulsion_pushes_apart() {
		let mut store = store_of(vec![node("a", None, -10.0, 0.0), node("b", None, 10.0, 0.0)]);
		let mode = LayoutMode::Force(ForceParams {
			repulsion: 1000.0,
			spring: 0.0,
			center_gravity: 0.0,
		});
		step(&mode, &SimulationParams::default(), &mut store);
		assert!(store.nodes()[0].x < -10.0);
		assert!(store.nodes()[1].x > 10.0);
	}

	#[test]
	fn test_coincident_nodes_stay_finite() {
		let mut store = EntityStore::from_data(&GraphData {
			clusters: vec![],
			nodes: vec![node("a", None, 0.0, 0.0), node("b", None, 0.0, 0.0)],
			edges: vec![edge("a", "b"), edge("a", "a")],
		});
		step(&LayoutMode::default(), &SimulationParams::default(), &mut store);
		for n in store.nodes() {
			assert!(n.x.is_finite() && n.y.is_finite());
			assert!(n.vx.is_finite() && n.vy.is_finite());
		}
	}

	#[test]
	fn test_dragged_node_gets_no_force() {
		let mut store = store_of(vec![node("a", None, 0.0, 0.0), node("b", None, 5.0, 0.0)]);
		store.nodes_mut()[0].is_dragging = true;
		store.nodes_mut()[0].vx = 3.0;
		step(&LayoutMode::default(), &SimulationParams::default(), &mut store);

		let a = &store.nodes()[0];
		assert_eq!((a.x, a.y), (0.0, 0.0));
		assert_eq!((a.vx, a.vy), (0.0, 0.0));
		assert!(store.nodes()[1].x > 5.0);
	}

	#[test]
	fn test_speed_is_clamped() {
		let mut store = store_of(vec![node("a", None, 0.0, 0.0)]);
		store.nodes_mut()[0].vx = 1000.0;
		let mode = LayoutMode::Force(ForceParams {
			repulsion: 0.0,
			spring: 0.0,
			center_gravity: 0.0,
		});
		step(&mode, &SimulationParams::default(), &mut store);
		let a = &store.nodes()[0];
		assert!((a.vx - 50.0).abs() < 1e-9);
		assert!((a.x - 50.0).abs() < 1e-9);
	}

	#[test]
	fn test_slow_nodes_come_to_rest() {
		let mut store = store_of(vec![node("a", None, 0.0, 0.0)]);
		store.nodes_mut()[0].vx = 0.05;
		let mode = LayoutMode::Force(ForceParams {
			repulsion: 0.0,
			spring: 0.0,
			center_gravity: 0.0,
		});
		step(&mode, &SimulationParams::default(), &mut store);
		assert_eq!(store.nodes()[0].vx, 0.0);
		assert_eq!(store.nodes()[0].x, 0.0);
	}

	#[test]
	fn test_radial_rings_and_angle() {
		let store = EntityStore::from_data(&GraphData {
			clusters: vec![cluster("inner", "#fff"), cluster("outer", "#000")],
			nodes: vec![node("a", Some("outer"), 0.0, 0.0), node("b", Some("nope"), 0.0, 0.0)],
			edges: vec![],
		});
		assert_eq!(radial_ring(&store, &store.nodes()[0]), 1);
		assert_eq!(radial_ring(&store, &store.nodes()[1]), 2);
		// 'a' = 97
		assert!((radial_angle("a") - 97.0_f64.to_radians()).abs() < 1e-12);
		// deterministic and wraps at 360
		assert_eq!(radial_angle("zz"), radial_angle("zz"));
		assert!((radial_angle("zzzz") - (488.0_f64 - 360.0).to_radians()).abs() < 1e-12);
	}
}
