//! Entity store: node, edge and cluster tables built once per session.
//!
//! Membership is fixed after ingestion. Node position, velocity and the drag
//! flag stay mutable for the simulation and the interaction layer.

use std::collections::HashMap;

use log::debug;

use super::types::{EdgeKind, GraphData};

/// Stable index of a node in the store.
pub type NodeIdx = usize;

/// A node with its live simulation fields.
#[derive(Clone, Debug)]
pub struct SimNode {
	/// Unique id from the input.
	pub id: String,
	/// Display label.
	pub label: String,
	/// Cluster id, which may not name a known cluster.
	pub cluster: Option<String>,
	/// World x.
	pub x: f64,
	/// World y.
	pub y: f64,
	/// Velocity x, world units per tick.
	pub vx: f64,
	/// Velocity y, world units per tick.
	pub vy: f64,
	/// Radius in world units.
	pub size: f64,
	/// Held by the pointer; receives no force.
	pub is_dragging: bool,
}

impl SimNode {
	/// Squared distance to a world point.
	pub fn distance_sq_to(&self, x: f64, y: f64) -> f64 {
		let (dx, dy) = (self.x - x, self.y - y);
		dx * dx + dy * dy
	}
}

/// An edge whose endpoints are both known to exist.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SimEdge {
	pub source: NodeIdx,
	pub target: NodeIdx,
	pub kind: EdgeKind,
}

impl SimEdge {
	/// The opposite endpoint when `idx` touches this edge.
	pub fn neighbor_of(&self, idx: NodeIdx) -> Option<NodeIdx> {
		if self.source == idx {
			Some(self.target)
		} else if self.target == idx {
			Some(self.source)
		} else {
			None
		}
	}
}

#[derive(Clone, Debug)]
pub struct Cluster {
	pub id: String,
	pub label: String,
	/// Opaque CSS color.
	pub color: String,
}

/// Axis-aligned world bounds of all nodes, used by the minimap.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldBounds {
	/// Smallest node x.
	pub min_x: f64,
	/// Smallest node y.
	pub min_y: f64,
	/// Largest node x.
	pub max_x: f64,
	/// Largest node y.
	pub max_y: f64,
}

impl WorldBounds {
	/// Horizontal extent.
	pub fn width(&self) -> f64 {
		self.max_x - self.min_x
	}

	/// Vertical extent.
	pub fn height(&self) -> f64 {
		self.max_y - self.min_y
	}
}

#[derive(Clone, Debug, Default)]
pub struct EntityStore {
	nodes: Vec<SimNode>,
	edges: Vec<SimEdge>,
	clusters: Vec<Cluster>,
	id_to_idx: HashMap<String, NodeIdx>,
	cluster_rank: HashMap<String, usize>,
	max_node_size: f64,
}

impl EntityStore {
	/// Ingest graph data. Never fails: dangling edges are dropped and
	/// duplicate node or cluster ids keep the last record in the first slot.
	pub fn from_data(data: &GraphData) -> Self {
		let mut store = Self::default();

		for cluster in &data.clusters {
			let record = Cluster {
				id: cluster.id.clone(),
				label: cluster.label.clone().unwrap_or_else(|| cluster.id.clone()),
				color: cluster.color.clone(),
			};
			match store.cluster_rank.get(&cluster.id) {
				Some(&rank) => store.clusters[rank] = record,
				None => {
					store.cluster_rank.insert(cluster.id.clone(), store.clusters.len());
					store.clusters.push(record);
				}
			}
		}

		for node in &data.nodes {
			let record = SimNode {
				id: node.id.clone(),
				label: node.label.clone().unwrap_or_else(|| node.id.clone()),
				cluster: node.cluster.clone(),
				x: node.x,
				y: node.y,
				vx: 0.0,
				vy: 0.0,
				size: node.size.max(0.0),
				is_dragging: false,
			};
			match store.id_to_idx.get(&node.id) {
				Some(&idx) => store.nodes[idx] = record,
				None => {
					store.id_to_idx.insert(node.id.clone(), store.nodes.len());
					store.nodes.push(record);
				}
			}
		}

		let mut dropped = 0usize;
		for edge in &data.edges {
			match (store.index_of(&edge.source), store.index_of(&edge.target)) {
				(Some(source), Some(target)) => store.edges.push(SimEdge {
					source,
					target,
					kind: edge.kind,
				}),
				_ => dropped += 1,
			}
		}
		if dropped > 0 {
			debug!("neuro-graph: dropped {dropped} edges with missing endpoints");
		}

		store.max_node_size = store.nodes.iter().map(|n| n.size).fold(0.0, f64::max);
		store
	}

	pub fn nodes(&self) -> &[SimNode] {
		&self.nodes
	}

	pub fn nodes_mut(&mut self) -> &mut [SimNode] {
		&mut self.nodes
	}

	/// Mutable nodes alongside the read-only edge list.
	pub fn split_mut(&mut self) -> (&mut [SimNode], &[SimEdge]) {
		(&mut self.nodes, &self.edges)
	}

	pub fn node(&self, idx: NodeIdx) -> Option<&SimNode> {
		self.nodes.get(idx)
	}

	pub fn node_mut(&mut self, idx: NodeIdx) -> Option<&mut SimNode> {
		self.nodes.get_mut(idx)
	}

	pub fn edges(&self) -> &[SimEdge] {
		&self.edges
	}

	pub fn clusters(&self) -> &[Cluster] {
		&self.clusters
	}

	pub fn index_of(&self, id: &str) -> Option<NodeIdx> {
		self.id_to_idx.get(id).copied()
	}

	pub fn cluster(&self, id: &str) -> Option<&Cluster> {
		self.cluster_rank.get(id).map(|&rank| &self.clusters[rank])
	}

	/// Position of a cluster in the input order.
	pub fn cluster_rank(&self, id: &str) -> Option<usize> {
		self.cluster_rank.get(id).copied()
	}

	/// Color of the cluster a node belongs to, if that cluster is known.
	pub fn cluster_color(&self, node: &SimNode) -> Option<&str> {
		node.cluster
			.as_deref()
			.and_then(|id| self.cluster(id))
			.map(|c| c.color.as_str())
	}

	/// Largest node radius, used to size hover queries.
	pub fn max_node_size(&self) -> f64 {
		self.max_node_size
	}

	/// Edges touching `idx`, paired with the opposite endpoint.
	pub fn incident_edges(&self, idx: NodeIdx) -> impl Iterator<Item = (&SimEdge, NodeIdx)> {
		self.edges
			.iter()
			.filter_map(move |edge| edge.neighbor_of(idx).map(|n| (edge, n)))
	}

	/// Mean position of a cluster's nodes, or `None` for an empty cluster.
	pub fn cluster_centroid(&self, cluster_id: &str) -> Option<(f64, f64)> {
		let (mut sx, mut sy, mut count) = (0.0, 0.0, 0usize);
		for node in self
			.nodes
			.iter()
			.filter(|n| n.cluster.as_deref() == Some(cluster_id))
		{
			sx += node.x;
			sy += node.y;
			count += 1;
		}
		(count > 0).then(|| (sx / count as f64, sy / count as f64))
	}

	pub fn bounds(&self) -> Option<WorldBounds> {
		let first = self.nodes.first()?;
		let init = WorldBounds {
			min_x: first.x,
			min_y: first.y,
			max_x: first.x,
			max_y: first.y,
		};
		Some(self.nodes.iter().fold(init, |b, n| WorldBounds {
			min_x: b.min_x.min(n.x),
			min_y: b.min_y.min(n.y),
			max_x: b.max_x.max(n.x),
			max_y: b.max_y.max(n.y),
		}))
	}
}

#[cfg(test)]
pub(crate) mod tests {
	use super::*;
	use crate::components::force_graph::types::{GraphCluster, GraphEdge, GraphNode};

	pub(crate) fn node(id: &str, cluster: Option<&str>, x: f64, y: f64) -> GraphNode {
		GraphNode {
			id: id.to_string(),
			label: None,
			cluster: cluster.map(str::to_string),
			x,
			y,
			size: 8.0,
		}
	}

	pub(crate) fn edge(source: &str, target: &str) -> GraphEdge {
		GraphEdge {
			source: source.to_string(),
			target: target.to_string(),
			kind: EdgeKind::Normal,
		}
	}

	pub(crate) fn cluster(id: &str, color: &str) -> GraphCluster {
		GraphCluster {
			id: id.to_string(),
			label: None,
			color: color.to_string(),
		}
	}

	#[test]
	fn test_dangling_edges_are_dropped() {
		let data = GraphData {
			clusters: vec![],
			nodes: vec![node("a", None, 0.0, 0.0), node("b", None, 10.0, 0.0)],
			edges: vec![edge("a", "b"), edge("a", "ghost"), edge("ghost", "b")],
		};
		let store = EntityStore::from_data(&data);

		assert_eq!(store.edges().len(), 1);
		for e in store.edges() {
			assert!(store.node(e.source).is_some());
			assert!(store.node(e.target).is_some());
		}
	}

	#[test]
	fn test_duplicate_ids_last_wins() {
		let data = GraphData {
			clusters: vec![],
			nodes: vec![
				node("a", None, 1.0, 1.0),
				node("b", None, 0.0, 0.0),
				node("a", Some("late"), 5.0, 5.0),
			],
			edges: vec![],
		};
		let store = EntityStore::from_data(&data);

		assert_eq!(store.nodes().len(), 2);
		let a = store.node(store.index_of("a").unwrap()).unwrap();
		assert_eq!(a.x, 5.0);
		assert_eq!(a.cluster.as_deref(), Some("late"));
		assert_eq!(store.index_of("a"), Some(0));
	}

	#[test]
	fn test_empty_graph() {
		let store = EntityStore::from_data(&GraphData::default());
		assert!(store.nodes().is_empty());
		assert_eq!(store.bounds(), None);
		assert_eq!(store.max_node_size(), 0.0);
	}

	#[test]
	fn test_self_loop_is_incident_once() {
		let data = GraphData {
			clusters: vec![],
			nodes: vec![node("a", None, 0.0, 0.0)],
			edges: vec![edge("a", "a")],
		};
		let store = EntityStore::from_data(&data);
		let incident: Vec<_> = store.incident_edges(0).map(|(_, n)| n).collect();
		assert_eq!(incident, vec![0]);
	}

	#[test]
	fn test_cluster_lookup_and_centroid() {
		let data = GraphData {
			clusters: vec![cluster("x", "#111111"), cluster("y", "#222222")],
			nodes: vec![
				node("a", Some("x"), 0.0, 0.0),
				node("b", Some("x"), 10.0, 20.0),
				node("c", Some("unknown"), 5.0, 5.0),
			],
			edges: vec![],
		};
		let store = EntityStore::from_data(&data);

		assert_eq!(store.cluster_rank("y"), Some(1));
		assert_eq!(store.cluster_centroid("x"), Some((5.0, 10.0)));
		assert_eq!(store.cluster_centroid("y"), None);
		assert_eq!(store.cluster_color(&store.nodes()[0]), Some("#111111"));
		assert_eq!(store.cluster_color(&store.nodes()[2]), None);
	}
}
