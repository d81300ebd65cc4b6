//! Graph engine: the single owner of all simulation and interaction state.
//!
//! The host drives it from three sources that must never interleave: the
//! frame callback ([`GraphEngine::tick`]), the fixed-rate camera timer
//! ([`GraphEngine::smooth_camera`]), and pointer/keyboard events. Every
//! subsystem receives borrows of the pieces it needs from here.

use log::{debug, info};

use super::camera::{Camera, Nudge};
use super::interaction::{Interaction, InteractionOutcome, PointerState, Scope};
use super::layout::{self, SimulationParams};
use super::lod::{RenderFlags, ViewSettings};
use super::pulses::PulseTracker;
use super::scene::{self, Scene, SceneInputs};
use super::share::ShareLink;
use super::spatial::SpatialHash;
use super::store::{EntityStore, NodeIdx, SimNode, WorldBounds};
use super::theme::Theme;
use super::types::GraphData;

/// Simulated time advanced per frame while playing.
pub const TIME_STEP: f64 = 0.006;

/// A navigation intent from outside the canvas.
#[derive(Clone, Debug, PartialEq)]
pub enum FocusRequest {
	/// Search result or list pick: center on the node and select it.
	Node(String),
	/// Center on the centroid of a cluster's nodes.
	Cluster(String),
	/// Minimap click, already in world coordinates.
	World(f64, f64),
	/// Back to the origin.
	Reset,
}

/// Camera and layout summary for minimaps and link sharing.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewState {
	/// Current offset, zoom and selection.
	pub share: ShareLink,
	/// Viewport size in pixels.
	pub viewport: (f64, f64),
	/// Extent of all nodes; `None` for an empty graph.
	pub bounds: Option<WorldBounds>,
}

/// Owns the simulation, camera, pointer state and pulses of one graph.
pub struct GraphEngine {
	store: EntityStore,
	index: SpatialHash,
	camera: Camera,
	interaction: Interaction,
	pulses: PulseTracker,
	theme: Theme,
	view: ViewSettings,
	params: SimulationParams,
	selected: Option<NodeIdx>,
	animating: bool,
	time: f64,
}

impl GraphEngine {
	/// Ingest `data` for a `width` x `height` viewport. Starts playing.
	pub fn new(data: &GraphData, width: f64, height: f64, theme: Theme) -> Self {
		let store = EntityStore::from_data(data);
		let mut index = SpatialHash::default();
		index.rebuild(store.nodes());
		info!(
			"neuro-graph: engine ready with {} nodes, {} edges, theme {}",
			store.nodes().len(),
			store.edges().len(),
			theme.key
		);
		Self {
			store,
			index,
			camera: Camera::new(width, height),
			interaction: Interaction::default(),
			pulses: PulseTracker::default(),
			theme,
			view: ViewSettings::default(),
			params: SimulationParams::default(),
			selected: None,
			animating: true,
			time: 0.0,
		}
	}

	fn scope(&mut self) -> (&mut Interaction, Scope<'_>) {
		(
			&mut self.interaction,
			Scope {
				store: &mut self.store,
				index: &self.index,
				camera: &mut self.camera,
				pulses: &mut self.pulses,
				theme: &self.theme,
				now: self.time,
			},
		)
	}

	/// Switch theme by key; unknown keys resolve to the default theme.
	pub fn set_theme(&mut self, key: &str) {
		self.theme = Theme::by_key(key);
		info!("neuro-graph: theme {} ({:?})", self.theme.key, self.theme.layout);
	}

	/// The active theme.
	pub fn theme(&self) -> &Theme {
		&self.theme
	}

	/// Replace the user visibility toggles.
	pub fn set_view_settings(&mut self, view: ViewSettings) {
		self.view = view;
	}

	/// Current user visibility toggles.
	pub fn view_settings(&self) -> ViewSettings {
		self.view
	}

	/// Track a new viewport size in pixels.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.camera.resize(width, height);
	}

	/// One frame: integrate (when playing), rebuild the index, prune pulses.
	pub fn tick(&mut self) {
		if self.animating {
			layout::step(&self.theme.layout, &self.params, &mut self.store);
			self.time += TIME_STEP;
		}
		self.index.rebuild(self.store.nodes());
		self.pulses.prune(self.time);
	}

	/// One step of the fixed-rate camera smoothing timer.
	pub fn smooth_camera(&mut self) {
		self.camera.smooth_tick();
	}

	/// Pointer moved to screen position `(sx, sy)`.
	pub fn pointer_move(&mut self, sx: f64, sy: f64) -> InteractionOutcome {
		let (interaction, scope) = self.scope();
		interaction.pointer_move(sx, sy, scope)
	}

	/// Pointer pressed. A press on a node selects it.
	pub fn pointer_down(&mut self, sx: f64, sy: f64) -> InteractionOutcome {
		let (interaction, scope) = self.scope();
		let outcome = interaction.pointer_down(sx, sy, scope);
		if outcome.selected.is_some() {
			self.selected = outcome.selected;
		}
		outcome
	}

	/// Pointer released.
	pub fn pointer_up(&mut self) -> InteractionOutcome {
		let (interaction, scope) = self.scope();
		interaction.pointer_up(scope)
	}

	/// Pointer left the canvas.
	pub fn pointer_leave(&mut self) -> InteractionOutcome {
		self.interaction.pointer_leave(&mut self.store)
	}

	/// Wheel tick; positive `delta_y` zooms out.
	pub fn wheel(&mut self, delta_y: f64) {
		self.camera.wheel(delta_y);
	}

	/// Glide the camera to center a world point.
	pub fn focus_world(&mut self, wx: f64, wy: f64) {
		self.camera.focus(wx, wy);
	}

	/// Glide to a node. Returns `false` for an unknown index.
	pub fn focus_node(&mut self, idx: NodeIdx) -> bool {
		match self.store.node(idx) {
			Some(node) => {
				let (x, y) = (node.x, node.y);
				self.camera.focus(x, y);
				true
			}
			None => false,
		}
	}

	/// Glide to a node by id.
	pub fn focus_node_id(&mut self, id: &str) -> bool {
		self.store.index_of(id).is_some_and(|idx| self.focus_node(idx))
	}

	/// Center on a cluster's centroid. Empty or unknown clusters are ignored.
	pub fn focus_cluster(&mut self, cluster_id: &str) -> bool {
		match self.store.cluster_centroid(cluster_id) {
			Some((x, y)) => {
				self.camera.focus(x, y);
				true
			}
			None => {
				debug!("neuro-graph: no nodes in cluster {cluster_id:?}");
				false
			}
		}
	}

	/// Minimap click: the point is already in world space.
	pub fn minimap_navigate(&mut self, wx: f64, wy: f64) {
		self.camera.focus(wx, wy);
	}

	/// Apply a navigation intent. Returns whether the camera target moved.
	pub fn request_focus(&mut self, request: &FocusRequest) -> bool {
		match request {
			FocusRequest::Node(id) => match self.store.index_of(id) {
				Some(idx) => {
					self.selected = Some(idx);
					self.focus_node(idx)
				}
				None => {
					debug!("neuro-graph: no node {id:?} to focus");
					false
				}
			},
			FocusRequest::Cluster(id) => self.focus_cluster(id),
			FocusRequest::World(wx, wy) => {
				self.minimap_navigate(*wx, *wy);
				true
			}
			FocusRequest::Reset => {
				self.reset_view();
				true
			}
		}
	}

	/// Move the camera target one keyboard step.
	pub fn nudge(&mut self, direction: Nudge) {
		self.camera.nudge(direction);
	}

	/// Glide back to the world origin.
	pub fn reset_view(&mut self) {
		self.camera.focus(0.0, 0.0);
	}

	/// Handle a keyboard shortcut. Returns whether the key was consumed.
	pub fn key(&mut self, key: &str) -> bool {
		match key {
			" " => self.toggle_animation(),
			"r" | "R" => self.reset_view(),
			"ArrowUp" => self.nudge(Nudge::Up),
			"ArrowDown" => self.nudge(Nudge::Down),
			"ArrowLeft" => self.nudge(Nudge::Left),
			"ArrowRight" => self.nudge(Nudge::Right),
			_ => return false,
		}
		true
	}

	/// Play or pause the simulation.
	pub fn toggle_animation(&mut self) {
		self.animating = !self.animating;
		debug!("neuro-graph: animating = {}", self.animating);
	}

	/// Play (`true`) or pause the simulation.
	pub fn set_animating(&mut self, animating: bool) {
		self.animating = animating;
	}

	/// Whether the simulation is playing.
	pub fn is_animating(&self) -> bool {
		self.animating
	}

	/// Current simulated time.
	pub fn time(&self) -> f64 {
		self.time
	}

	/// The camera.
	pub fn camera(&self) -> &Camera {
		&self.camera
	}

	pub(crate) fn store(&self) -> &EntityStore {
		&self.store
	}

	/// Live click pulses.
	pub fn pulses(&self) -> &PulseTracker {
		&self.pulses
	}

	/// Current pointer state.
	pub fn pointer_state(&self) -> PointerState {
		self.interaction.state()
	}

	/// Node under the pointer, including a node being dragged.
	pub fn hovered(&self) -> Option<&SimNode> {
		self.interaction.hovered().and_then(|idx| self.store.node(idx))
	}

	/// Last node selected by click, search or share link.
	pub fn selected(&self) -> Option<&SimNode> {
		self.selected.and_then(|idx| self.store.node(idx))
	}

	/// Extent of all nodes, for the minimap.
	pub fn world_bounds(&self) -> Option<WorldBounds> {
		self.store.bounds()
	}

	/// LOD resolved against the current zoom, toggles and theme.
	pub fn render_flags(&self) -> RenderFlags {
		RenderFlags::resolve(self.camera.zoom(), &self.view, &self.theme)
	}

	/// Draw records for the current frame.
	pub fn scene(&self) -> Scene {
		scene::build(&SceneInputs {
			store: &self.store,
			camera: &self.camera,
			theme: &self.theme,
			flags: self.render_flags(),
			pulses: &self.pulses,
			hovered: self.interaction.hovered(),
			time: self.time,
			animating: self.animating,
		})
	}

	/// Link to the current camera view and selection.
	pub fn share_link(&self) -> ShareLink {
		ShareLink {
			x: self.camera.offset_x,
			y: self.camera.offset_y,
			zoom: self.camera.zoom(),
			node: self.selected().map(|node| node.id.clone()),
		}
	}

	/// Camera, viewport and bounds for external observers.
	pub fn view_state(&self) -> ViewState {
		ViewState {
			share: self.share_link(),
			viewport: (self.camera.width, self.camera.height),
			bounds: self.world_bounds(),
		}
	}

	/// Restore a shared view. Snaps the camera, selects the linked node if it
	/// exists and returns it.
	pub fn apply_share_link(&mut self, link: &ShareLink) -> Option<NodeIdx> {
		self.camera.jump_to(link.x, link.y, link.zoom);
		let found = link.node.as_deref().and_then(|id| self.store.index_of(id));
		if found.is_some() {
			self.selected = found;
		}
		found
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::camera::{MAX_ZOOM, MIN_ZOOM};
	use crate::components::force_graph::store::tests::{cluster, edge, node};

	fn engine() -> GraphEngine {
		let data = GraphData {
			clusters: vec![cluster("c", "#ff0000")],
			nodes: vec![
				node("A", Some("c"), 0.0, 0.0),
				node("B", Some("c"), 100.0, 0.0),
				node("C", None, 200.0, 0.0),
			],
			edges: vec![edge("A", "B"), edge("B", "C"), edge("C", "missing")],
		};
		GraphEngine::new(&data, 800.0, 600.0, Theme::default_theme())
	}

	fn click_node(engine: &mut GraphEngine, id: &str) -> InteractionOutcome {
		let idx = engine.store().index_of(id).unwrap();
		let node = &engine.store().nodes()[idx];
		let (sx, sy) = engine.camera().world_to_screen(node.x, node.y);
		engine.pointer_move(sx, sy);
		let outcome = engine.pointer_down(sx, sy);
		engine.pointer_up();
		outcome
	}

	#[test]
	fn test_click_scenario_pulse_counts() {
		let mut engine = engine();
		assert_eq!(click_node(&mut engine, "A").pulses_spawned, 1);
		assert_eq!(engine.pulses().len(), 1);

		let mut engine = self::engine();
		assert_eq!(click_node(&mut engine, "B").pulses_spawned, 2);
	}

	#[test]
	fn test_dangling_edge_never_reaches_pulses() {
		let mut engine = engine();
		assert_eq!(engine.store().edges().len(), 2);
		let outcome = click_node(&mut engine, "C");
		assert_eq!(outcome.pulses_spawned, 1);
		engine.tick();
		assert_eq!(engine.scene().pulses.len(), 1);
	}

	#[test]
	fn test_drag_invariant_holds_across_ticks() {
		let mut engine = engine();
		let (sx, sy) = engine.camera().world_to_screen(0.0, 0.0);
		engine.pointer_move(sx, sy);
		engine.pointer_down(sx, sy);
		engine.pointer_move(sx + 30.0, sy + 30.0);
		for _ in 0..20 {
			engine.tick();
			for n in engine.store().nodes().iter().filter(|n| n.is_dragging) {
				assert_eq!((n.vx, n.vy), (0.0, 0.0));
			}
			assert_eq!(engine.pointer_state(), PointerState::DraggingNode(0));
		}
		let a = &engine.store().nodes()[0];
		assert_eq!((a.x, a.y), (30.0, 30.0));
	}

	#[test]
	fn test_pause_freezes_time_and_positions() {
		let mut engine = engine();
		engine.tick();
		engine.set_animating(false);
		let before: Vec<_> = engine.store().nodes().iter().map(|n| (n.x, n.y)).collect();
		let time = engine.time();
		engine.focus_world(50.0, 0.0);
		for _ in 0..5 {
			engine.tick();
			engine.smooth_camera();
		}
		let after: Vec<_> = engine.store().nodes().iter().map(|n| (n.x, n.y)).collect();
		assert_eq!(before, after);
		assert_eq!(engine.time(), time);
		assert!(engine.camera().offset_x < 0.0);
	}

	#[test]
	fn test_pulses_expire_after_lifespan() {
		let mut engine = engine();
		click_node(&mut engine, "B");
		// 1.0 / 0.006 frames plus one
		for _ in 0..167 {
			engine.tick();
		}
		assert!(engine.pulses().is_empty());
	}

	#[test]
	fn test_zoom_stays_in_range() {
		let mut engine = engine();
		for i in 0..200 {
			engine.wheel(if i % 3 == 0 { 1.0 } else { -1.0 });
			let zoom = engine.camera().zoom();
			assert!((MIN_ZOOM..=MAX_ZOOM).contains(&zoom));
		}
	}

	#[test]
	fn test_focus_cluster_targets_centroid() {
		let mut engine = engine();
		assert!(engine.focus_cluster("c"));
		assert_eq!(engine.camera().target_x, -50.0);
		assert!(!engine.focus_cluster("empty"));
	}

	#[test]
	fn test_keyboard_shortcuts() {
		let mut engine = engine();
		assert!(engine.key(" "));
		assert!(!engine.is_animating());
		assert!(engine.key("ArrowLeft"));
		assert_eq!(engine.camera().target_x, 50.0);
		assert!(engine.key("r"));
		assert_eq!(engine.camera().target_x, 0.0);
		assert!(!engine.key("q"));
	}

	#[test]
	fn test_share_link_roundtrip() {
		let mut engine = engine();
		engine.wheel(-1.0);
		engine.camera.pan_by(10.4, -3.6);
		assert!(engine.request_focus(&FocusRequest::Node("B".into())));
		let link = engine.share_link();
		assert_eq!(link.to_query(), "x=10&y=-4&z=1.08&node=B");

		let mut other = self::engine();
		let selected = other.apply_share_link(&ShareLink::parse(&link.to_query()));
		assert_eq!(selected, other.store().index_of("B"));
		assert_eq!(other.selected().map(|n| n.id.as_str()), Some("B"));
		assert_eq!(other.camera().offset_x, 10.0);
		assert_eq!(other.camera().zoom(), 1.08);
	}

	#[test]
	fn test_unknown_theme_falls_back() {
		let mut engine = engine();
		engine.set_theme("nonsense");
		assert_eq!(engine.theme().key, "default");
		engine.set_theme("cyber");
		engine.tick();
		assert_eq!(engine.theme().key, "cyber");
	}

	#[test]
	fn test_empty_graph_is_accepted() {
		let mut engine = GraphEngine::new(&GraphData::default(), 800.0, 600.0, Theme::default());
		engine.tick();
		engine.pointer_move(10.0, 10.0);
		engine.pointer_down(10.0, 10.0);
		engine.pointer_up();
		assert!(engine.scene().nodes.is_empty());
		assert_eq!(engine.world_bounds(), None);
	}

	#[test]
	fn test_extreme_share_link_keeps_hit_testing_alive() {
		let mut engine = engine();
		engine.apply_share_link(&ShareLink::parse("?x=1e300&y=0&z=1"));
		engine.tick();
		let outcome = engine.pointer_move(10.0, 10.0);
		assert!(!outcome.hover_changed);
		assert_eq!(engine.pointer_state(), PointerState::Idle);
	}

	#[test]
	fn test_click_pulses_render_on_theme_without_flow() {
		let mut engine = engine();
		engine.set_theme("obsidian");
		assert_eq!(click_node(&mut engine, "A").pulses_spawned, 1);
		engine.tick();
		let scene = engine.scene();
		assert_eq!(scene.pulses.len(), 1);
		assert!(scene.edges.iter().all(|e| e.flow.is_none()));
	}

	#[test]
	fn test_focus_requests() {
		let mut engine = engine();
		assert!(engine.request_focus(&FocusRequest::Cluster("c".into())));
		assert_eq!(engine.camera().target_x, -50.0);
		assert!(engine.request_focus(&FocusRequest::World(30.0, -20.0)));
		assert_eq!((engine.camera().target_x, engine.camera().target_y), (-30.0, 20.0));
		assert!(engine.request_focus(&FocusRequest::Node("C".into())));
		assert_eq!(engine.camera().target_x, -200.0);
		assert_eq!(engine.selected().map(|n| n.id.as_str()), Some("C"));
		assert!(!engine.request_focus(&FocusRequest::Node("nope".into())));
		assert_eq!(engine.selected().map(|n| n.id.as_str()), Some("C"));
		assert!(engine.request_focus(&FocusRequest::Reset));
		assert_eq!((engine.camera().target_x, engine.camera().target_y), (0.0, 0.0));
	}

	#[test]
	fn test_view_state_reports_camera_and_bounds() {
		let mut engine = engine();
		click_node(&mut engine, "B");
		let state = engine.view_state();
		assert_eq!(state.share.node.as_deref(), Some("B"));
		assert_eq!(state.share.zoom, 1.0);
		assert_eq!(state.viewport, (800.0, 600.0));
		let bounds = state.bounds.unwrap();
		assert_eq!((bounds.min_x, bounds.max_x), (0.0, 200.0));
	}
}
