//! Pointer interaction state machine.
//!
//! Exactly one of idle, hovering, dragging or panning is active. Dragging and
//! panning are entered only from hovering and idle respectively, and both end
//! on pointer-up, so they can never overlap.

use log::debug;

use super::camera::Camera;
use super::pulses::PulseTracker;
use super::spatial::SpatialHash;
use super::store::{EntityStore, NodeIdx};
use super::theme::Theme;

/// Hit radius as a multiple of node size.
pub const HIT_SCALE: f64 = 1.5;

/// What the pointer is doing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PointerState {
	/// Over empty canvas, or outside it.
	#[default]
	Idle,
	/// Over a node.
	HoveringNode(NodeIdx),
	/// Holding a node.
	DraggingNode(NodeIdx),
	/// Dragging the view.
	PanningCanvas,
}

/// Side effects of a pointer event for the host to act on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InteractionOutcome {
	/// Node clicked by this event.
	pub selected: Option<NodeIdx>,
	/// The hovered node changed.
	pub hover_changed: bool,
	/// Pulses fired by this event.
	pub pulses_spawned: usize,
}

/// Everything a pointer event may read or mutate, borrowed from the engine.
pub struct Scope<'a> {
	pub store: &'a mut EntityStore,
	pub index: &'a SpatialHash,
	pub camera: &'a mut Camera,
	pub pulses: &'a mut PulseTracker,
	pub theme: &'a Theme,
	/// Current simulated time, stamped on new pulses.
	pub now: f64,
}

#[derive(Clone, Debug, Default)]
pub struct Interaction {
	state: PointerState,
	/// Last pointer position in screen space.
	pointer: Option<(f64, f64)>,
	/// Screen position of the last pan/drag step.
	anchor: Option<(f64, f64)>,
}

impl Interaction {
	pub fn state(&self) -> PointerState {
		self.state
	}

	/// Node under the pointer: hovered or being dragged.
	pub fn hovered(&self) -> Option<NodeIdx> {
		match self.state {
			PointerState::HoveringNode(idx) | PointerState::DraggingNode(idx) => Some(idx),
			_ => None,
		}
	}

	pub fn pointer_move(&mut self, sx: f64, sy: f64, scope: Scope<'_>) -> InteractionOutcome {
		self.pointer = Some((sx, sy));
		match self.state {
			PointerState::DraggingNode(idx) => {
				let (wx, wy) = scope.camera.screen_to_world(sx, sy);
				if let Some(node) = scope.store.node_mut(idx) {
					node.x = wx;
					node.y = wy;
					node.vx = 0.0;
					node.vy = 0.0;
				}
				self.anchor = Some((sx, sy));
				InteractionOutcome::default()
			}
			PointerState::PanningCanvas => {
				if let Some((ax, ay)) = self.anchor {
					scope.camera.pan_by(sx - ax, sy - ay);
				}
				self.anchor = Some((sx, sy));
				InteractionOutcome::default()
			}
			PointerState::Idle | PointerState::HoveringNode(_) => {
				let found = hit_test(scope.store, scope.index, scope.camera, sx, sy);
				self.set_hover(found)
			}
		}
	}

	pub fn pointer_down(&mut self, sx: f64, sy: f64, scope: Scope<'_>) -> InteractionOutcome {
		self.pointer = Some((sx, sy));
		match self.state {
			PointerState::HoveringNode(idx) => {
				let mut outcome = InteractionOutcome {
					selected: Some(idx),
					..Default::default()
				};
				if !scope.theme.draggable {
					return outcome;
				}
				if let Some(node) = scope.store.node_mut(idx) {
					node.is_dragging = true;
					node.vx = 0.0;
					node.vy = 0.0;
				}
				self.anchor = Some((sx, sy));
				let color = scope.theme.colors.node_base.to_css();
				outcome.pulses_spawned = scope.pulses.spawn_from(scope.store, idx, scope.now, &color);
				debug!(
					"neuro-graph: drag start on node {idx}, {} pulses",
					outcome.pulses_spawned
				);
				self.state = PointerState::DraggingNode(idx);
				outcome
			}
			PointerState::Idle => {
				self.anchor = Some((sx, sy));
				self.state = PointerState::PanningCanvas;
				InteractionOutcome::default()
			}
			// A second press during a gesture changes nothing.
			PointerState::DraggingNode(_) | PointerState::PanningCanvas => {
				InteractionOutcome::default()
			}
		}
	}

	/// End any gesture and re-resolve hover at the last pointer position.
	pub fn pointer_up(&mut self, scope: Scope<'_>) -> InteractionOutcome {
		self.end_gesture(scope.store);
		match self.pointer {
			Some((sx, sy)) => {
				let found = hit_test(scope.store, scope.index, scope.camera, sx, sy);
				self.set_hover(found)
			}
			None => self.set_hover(None),
		}
	}

	/// Leaving the canvas ends any gesture and clears hover.
	pub fn pointer_leave(&mut self, store: &mut EntityStore) -> InteractionOutcome {
		self.end_gesture(store);
		self.pointer = None;
		self.set_hover(None)
	}

	fn end_gesture(&mut self, store: &mut EntityStore) {
		if let PointerState::DraggingNode(idx) = self.state {
			if let Some(node) = store.node_mut(idx) {
				node.is_dragging = false;
			}
			// Keep the node hovered until the next resolve.
			self.state = PointerState::HoveringNode(idx);
		} else if self.state == PointerState::PanningCanvas {
			self.state = PointerState::Idle;
		}
		self.anchor = None;
	}

	fn set_hover(&mut self, found: Option<NodeIdx>) -> InteractionOutcome {
		let before = self.hovered();
		self.state = match found {
			Some(idx) => PointerState::HoveringNode(idx),
			None => PointerState::Idle,
		};
		InteractionOutcome {
			hover_changed: before != found,
			..Default::default()
		}
	}
}

/// Nearest node within `1.5 × size` of the screen point, via the spatial index.
pub fn hit_test(
	store: &EntityStore,
	index: &SpatialHash,
	camera: &Camera,
	sx: f64,
	sy: f64,
) -> Option<NodeIdx> {
	let (wx, wy) = camera.screen_to_world(sx, sy);
	let radius = store.max_node_size() * HIT_SCALE;
	index
		.query(wx, wy, radius)
		.into_iter()
		.filter_map(|idx| {
			let node = store.node(idx)?;
			let dist_sq = node.distance_sq_to(wx, wy);
			let reach = node.size * HIT_SCALE;
			(dist_sq < reach * reach).then_some((idx, dist_sq))
		})
		.min_by(|a, b| a.1.total_cmp(&b.1))
		.map(|(idx, _)| idx)
}
