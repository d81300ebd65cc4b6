//! Graph data structures for input to the force graph component.

use serde::{Deserialize, Deserializer};

fn default_size() -> f64 {
	8.0
}

/// A node in the graph.
#[derive(Clone, Debug, Deserialize)]
pub struct GraphNode {
	/// Unique identifier for this node. Used to reference nodes in edges.
	pub id: String,
	/// Display label. Falls back to the id when absent.
	#[serde(default)]
	pub label: Option<String>,
	/// Cluster this node belongs to, used for coloring and radial rings.
	#[serde(default, alias = "clusterId")]
	pub cluster: Option<String>,
	/// Initial world x position.
	#[serde(default)]
	pub x: f64,
	/// Initial world y position.
	#[serde(default)]
	pub y: f64,
	/// Radius in world units.
	#[serde(default = "default_size")]
	pub size: f64,
}

/// Visual kind of an edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EdgeKind {
	/// Solid edge.
	#[default]
	Normal,
	/// Dashed, slightly wider edge.
	Backlink,
}

impl<'de> Deserialize<'de> for EdgeKind {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let raw = String::deserialize(deserializer)?;
		Ok(match raw.as_str() {
			"backlink" => EdgeKind::Backlink,
			_ => EdgeKind::Normal,
		})
	}
}

/// A directed edge between two nodes.
#[derive(Clone, Debug, Deserialize)]
pub struct GraphEdge {
	/// Source node ID.
	pub source: String,
	/// Target node ID.
	pub target: String,
	/// Edge kind; unknown values read as [`EdgeKind::Normal`].
	#[serde(default, rename = "type", alias = "kind")]
	pub kind: EdgeKind,
}

/// A named group of nodes sharing a color.
#[derive(Clone, Debug, Deserialize)]
pub struct GraphCluster {
	/// Cluster identifier referenced by [`GraphNode::cluster`].
	pub id: String,
	/// Human-readable name.
	#[serde(default)]
	pub label: Option<String>,
	/// CSS color passed through to the renderer untouched.
	pub color: String,
}

/// Complete graph data: clusters, nodes and edges.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct GraphData {
	/// Clusters in ring order.
	#[serde(default)]
	pub clusters: Vec<GraphCluster>,
	/// Nodes; a repeated id replaces the earlier record.
	#[serde(default)]
	pub nodes: Vec<GraphNode>,
	/// Edges; those with an unknown endpoint are dropped.
	#[serde(default, alias = "links")]
	pub edges: Vec<GraphEdge>,
}
