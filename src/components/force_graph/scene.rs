//! Per-frame scene description handed to the renderer.
//!
//! Everything here is plain data in world coordinates plus the camera needed
//! to map it to the screen. Nodes outside the viewport (with a margin) are
//! culled; an edge survives if either endpoint is visible.

use std::collections::HashSet;

use super::camera::Camera;
use super::lod::RenderFlags;
use super::pulses::{PulseFrame, PulseTracker, control_point, curve_offset};
use super::store::{EntityStore, NodeIdx, SimNode};
use super::theme::Theme;
use super::types::EdgeKind;

/// Screen-space margin kept around the viewport when culling.
pub const CULL_MARGIN: f64 = 200.0;
/// Size multiplier for the hovered node.
pub const HOVER_GROWTH: f64 = 1.25;

/// One node to draw, in world coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeDraw {
	/// Store index of the node.
	pub index: NodeIdx,
	/// World x.
	pub x: f64,
	/// World y.
	pub y: f64,
	/// Radius, grown while hovered.
	pub size: f64,
	/// CSS fill color.
	pub color: String,
	/// Node is under the pointer.
	pub hovered: bool,
	/// Present when the label should be drawn.
	pub label: Option<String>,
	/// Draw a glow halo.
	pub glow: bool,
}

/// One edge to draw as a quadratic curve.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeDraw {
	/// Source position.
	pub from: (f64, f64),
	/// Target position.
	pub to: (f64, f64),
	/// Quadratic curve control point.
	pub control: (f64, f64),
	/// Normal or backlink.
	pub kind: EdgeKind,
	/// Stroke width in world units.
	pub width: f64,
	/// CSS color at the source end.
	pub source_color: String,
	/// CSS color at the target end.
	pub target_color: String,
	/// Ambient flow dot along the straight segment, when flow dots are on.
	pub flow: Option<(f64, f64)>,
}

impl EdgeDraw {
	/// Backlinks are stroked dashed.
	pub fn dashed(&self) -> bool {
		self.kind == EdgeKind::Backlink
	}
}

/// Everything a renderer needs for one frame.
///
/// Draw in field order: background, edges, pulses, nodes. World coordinates
/// map to the screen by translating to the viewport center plus `offset`,
/// then scaling by `zoom`.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
	/// Viewport width in pixels.
	pub width: f64,
	/// Viewport height in pixels.
	pub height: f64,
	/// Camera offset in pixels.
	pub offset: (f64, f64),
	/// Camera zoom.
	pub zoom: f64,
	/// CSS background color.
	pub background: String,
	/// CSS label color.
	pub text_color: String,
	/// CSS font family for labels.
	pub font: &'static str,
	/// Detail flags this scene was built with.
	pub flags: RenderFlags,
	/// Visible edges.
	pub edges: Vec<EdgeDraw>,
	/// Live click pulses.
	pub pulses: Vec<PulseFrame>,
	/// Visible nodes.
	pub nodes: Vec<NodeDraw>,
}

/// Read-only view of engine state needed to assemble a [`Scene`].
pub struct SceneInputs<'a> {
	pub store: &'a EntityStore,
	pub camera: &'a Camera,
	pub theme: &'a Theme,
	pub flags: RenderFlags,
	pub pulses: &'a PulseTracker,
	pub hovered: Option<NodeIdx>,
	pub time: f64,
	pub animating: bool,
}

/// World-space rectangle that is on screen, expanded by `margin` pixels.
pub fn visible_rect(camera: &Camera, margin: f64) -> ((f64, f64), (f64, f64)) {
	let min = camera.screen_to_world(-margin, -margin);
	let max = camera.screen_to_world(camera.width + margin, camera.height + margin);
	(min, max)
}

fn is_visible(node: &SimNode, (min, max): ((f64, f64), (f64, f64))) -> bool {
	node.x >= min.0 && node.x <= max.0 && node.y >= min.1 && node.y <= max.1
}

fn node_color(inputs: &SceneInputs<'_>, node: &SimNode) -> String {
	let base = || inputs.theme.colors.node_base.to_css();
	if !inputs.theme.cluster_node_colors {
		return base();
	}
	inputs.store.cluster_color(node).map_or_else(base, str::to_string)
}

fn edge_color(inputs: &SceneInputs<'_>, node: &SimNode) -> String {
	let base = || inputs.theme.colors.edge_base.to_css();
	if !inputs.theme.cluster_edge_colors {
		return base();
	}
	inputs.store.cluster_color(node).map_or_else(base, str::to_string)
}

/// Position of the ambient flow dot, in `[0, 1)` along the edge.
pub fn flow_position(time: f64, source_id: &str) -> f64 {
	let code = source_id.encode_utf16().next().map_or(0.0, f64::from);
	(time * 0.25 + code * 0.1).rem_euclid(1.0)
}

pub fn build(inputs: &SceneInputs<'_>) -> Scene {
	let rect = visible_rect(inputs.camera, CULL_MARGIN);
	let nodes = inputs.store.nodes();
	let visible: HashSet<NodeIdx> = nodes
		.iter()
		.enumerate()
		.filter(|(_, n)| is_visible(n, rect))
		.map(|(i, _)| i)
		.collect();

	let show_flow = inputs.flags.flow && inputs.animating;
	let edges = inputs
		.store
		.edges()
		.iter()
		.filter(|e| visible.contains(&e.source) || visible.contains(&e.target))
		.map(|edge| {
			let (s, t) = (&nodes[edge.source], &nodes[edge.target]);
			let (from, to) = ((s.x, s.y), (t.x, t.y));
			let factor = match edge.kind {
				EdgeKind::Backlink => 1.5,
				EdgeKind::Normal => 1.0,
			};
			let flow = show_flow.then(|| {
				let p = flow_position(inputs.time, &s.id);
				(from.0 + (to.0 - from.0) * p, from.1 + (to.1 - from.1) * p)
			});
			EdgeDraw {
				from,
				to,
				control: control_point(from, to, curve_offset(inputs.time, s.x)),
				kind: edge.kind,
				width: factor * inputs.flags.edge_width,
				source_color: edge_color(inputs, s),
				target_color: edge_color(inputs, t),
				flow,
			}
		})
		.collect();

	let pulses = if inputs.flags.pulses {
		inputs.pulses.frames(inputs.store, inputs.time)
	} else {
		Vec::new()
	};

	let nodes = nodes
		.iter()
		.enumerate()
		.filter(|(i, _)| visible.contains(i))
		.map(|(index, node)| {
			let hovered = inputs.hovered == Some(index);
			NodeDraw {
				index,
				x: node.x,
				y: node.y,
				size: if hovered { node.size * HOVER_GROWTH } else { node.size },
				color: node_color(inputs, node),
				hovered,
				label: (inputs.flags.labels || hovered).then(|| node.label.clone()),
				glow: inputs.theme.glow && (inputs.flags.glow || hovered),
			}
		})
		.collect();

	Scene {
		width: inputs.camera.width,
		height: inputs.camera.height,
		offset: (inputs.camera.offset_x, inputs.camera.offset_y),
		zoom: inputs.camera.zoom(),
		background: inputs.theme.colors.background.to_css(),
		text_color: inputs.theme.colors.text.to_css(),
		font: inputs.theme.font,
		flags: inputs.flags,
		edges,
		pulses,
		nodes,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::lod::ViewSettings;
	use crate::components::force_graph::store::tests::{cluster, edge, node};
	use crate::components::force_graph::types::{GraphData, GraphEdge};

	fn store() -> EntityStore {
		EntityStore::from_data(&GraphData {
			clusters: vec![cluster("c", "#123456")],
			nodes: vec![
				node("a", Some("c"), 0.0, 0.0),
				node("b", None, 50.0, 0.0),
				node("far", None, 10_000.0, 0.0),
				node("farther", None, 20_000.0, 0.0),
			],
			edges: vec![
				edge("a", "b"),
				GraphEdge {
					kind: EdgeKind::Backlink,
					..edge("b", "far")
				},
				edge("far", "farther"),
			],
		})
	}

	fn inputs<'a>(
		store: &'a EntityStore,
		camera: &'a Camera,
		theme: &'a Theme,
		pulses: &'a PulseTracker,
	) -> SceneInputs<'a> {
		SceneInputs {
			store,
			camera,
			theme,
			flags: RenderFlags::resolve(camera.zoom(), &ViewSettings::default(), theme),
			pulses,
			hovered: Some(1),
			time: 0.0,
			animating: true,
		}
	}

	#[test]
	fn test_culling_keeps_edges_with_one_visible_end() {
		let (store, camera, theme, pulses) = (
			store(),
			Camera::new(800.0, 600.0),
			Theme::default_theme(),
			PulseTracker::default(),
		);
		let scene = build(&inputs(&store, &camera, &theme, &pulses));

		let ids: Vec<_> = scene.nodes.iter().map(|n| n.index).collect();
		assert_eq!(ids, vec![0, 1]);
		assert_eq!(scene.edges.len(), 2);
		assert!(scene.edges[1].dashed());
		assert_eq!(scene.edges[1].width, 1.5 * 0.8);
	}

	#[test]
	fn test_colors_and_hover() {
		let (store, camera, theme, pulses) = (
			store(),
			Camera::new(800.0, 600.0),
			Theme::default_theme(),
			PulseTracker::default(),
		);
		let scene = build(&inputs(&store, &camera, &theme, &pulses));

		assert_eq!(scene.nodes[0].color, "#123456");
		assert_eq!(scene.nodes[1].color, theme.colors.node_base.to_css());
		assert!(scene.nodes[1].hovered);
		assert_eq!(scene.nodes[1].size, 8.0 * HOVER_GROWTH);
		assert_eq!(scene.nodes[1].label.as_deref(), Some("b"));
		assert_eq!(scene.edges[0].source_color, "#123456");
		assert_eq!(scene.edges[0].target_color, theme.colors.edge_base.to_css());
	}

	#[test]
	fn test_theme_without_cluster_colors_uses_base() {
		let (store, camera, theme, pulses) = (
			store(),
			Camera::new(800.0, 600.0),
			Theme::by_key("void"),
			PulseTracker::default(),
		);
		let scene = build(&inputs(&store, &camera, &theme, &pulses));
		assert_eq!(scene.nodes[0].color, theme.colors.node_base.to_css());
		assert_eq!(scene.edges[0].source_color, theme.colors.edge_base.to_css());
		assert!(scene.edges.iter().all(|e| e.flow.is_none()));
	}

	#[test]
	fn test_edge_control_point_matches_pulse_curve() {
		let (store, camera, theme, pulses) = (
			store(),
			Camera::new(800.0, 600.0),
			Theme::default_theme(),
			PulseTracker::default(),
		);
		let scene = build(&inputs(&store, &camera, &theme, &pulses));
		let offset = curve_offset(0.0, 0.0);
		assert_eq!(scene.edges[0].control, (25.0 + offset, offset));
	}

	#[test]
	fn test_flow_position_wraps() {
		// 'a' = 97 -> 9.7 mod 1
		assert!((flow_position(0.0, "a") - 0.7).abs() < 1e-9);
		assert!((flow_position(1.2, "") - 0.3).abs() < 1e-9);
	}
}
