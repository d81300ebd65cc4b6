//! Leptos component hosting the graph engine on a canvas.
//!
//! The component creates an HTML canvas element, wires mouse/wheel/keyboard
//! handlers into the engine, and runs two timers: a `requestAnimationFrame`
//! loop that ticks the simulation and renders, and a 16 ms interval that
//! smooths the camera. All of them share one `Rc<RefCell<_>>`, so their
//! mutations are serialized by the event loop and the borrow.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU32, Ordering};

use leptos::prelude::*;
use log::{debug, info, warn};
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, Element, HtmlCanvasElement, KeyboardEvent, MouseEvent, WheelEvent,
	Window,
};

use super::interaction::InteractionOutcome;
use super::lod::ViewSettings;
use super::render;
use super::share::ShareLink;
use super::state::{FocusRequest, GraphEngine, ViewState};
use super::theme::Theme;
use super::types::GraphData;

/// Camera smoothing period, independent of the display refresh rate.
const SMOOTHING_INTERVAL_MS: i32 = 16;

type SharedEngine = Rc<RefCell<Option<GraphEngine>>>;
type SharedClosure = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// Listeners a mounted canvas registers on the window.
#[derive(Default)]
struct WindowListeners {
	resize: Option<Closure<dyn FnMut()>>,
	keydown: Option<Closure<dyn FnMut(KeyboardEvent)>>,
}

impl WindowListeners {
	fn attach(&self, window: &Window) {
		if let Some(cb) = &self.resize {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}
		if let Some(cb) = &self.keydown {
			let _ = window.add_event_listener_with_callback("keydown", cb.as_ref().unchecked_ref());
		}
	}

	fn detach(self, window: &Window) {
		if let Some(cb) = &self.resize {
			let _ = window.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}
		if let Some(cb) = &self.keydown {
			let _ = window.remove_event_listener_with_callback("keydown", cb.as_ref().unchecked_ref());
		}
	}
}

thread_local! {
	// JS closures cannot cross into the Send cleanup hook, so they are parked
	// here under the owning canvas's id.
	static LISTENERS: RefCell<HashMap<u32, WindowListeners>> = RefCell::new(HashMap::new());
}

static NEXT_CANVAS_ID: AtomicU32 = AtomicU32::new(0);

/// Handles needed to stop the frame loop, the smoothing timer and the window
/// listeners.
///
/// Only plain ids and flags live here so cleanup can run from any owner.
#[derive(Clone)]
struct Teardown {
	canvas_id: u32,
	stopped: Arc<AtomicBool>,
	frame_id: Arc<AtomicI32>,
	interval_id: Arc<AtomicI32>,
}

impl Teardown {
	fn new() -> Self {
		Self {
			canvas_id: NEXT_CANVAS_ID.fetch_add(1, Ordering::Relaxed),
			stopped: Arc::default(),
			frame_id: Arc::default(),
			interval_id: Arc::default(),
		}
	}

	fn is_stopped(&self) -> bool {
		self.stopped.load(Ordering::Relaxed)
	}

	/// Hold `listeners` until [`Teardown::stop`], detaching any set parked
	/// earlier for this canvas.
	fn park(&self, listeners: WindowListeners) {
		let previous = LISTENERS.with_borrow_mut(|map| map.insert(self.canvas_id, listeners));
		if let Some(previous) = previous {
			if let Some(window) = web_sys::window() {
				previous.detach(&window);
			}
		}
	}

	fn unpark(&self) -> Option<WindowListeners> {
		LISTENERS.with_borrow_mut(|map| map.remove(&self.canvas_id))
	}

	/// Cancel the frame callback, clear the interval and remove the window
	/// listeners. Safe to call repeatedly.
	fn stop(&self) {
		if self.stopped.swap(true, Ordering::Relaxed) {
			return;
		}
		let listeners = self.unpark();
		if let Some(window) = web_sys::window() {
			let _ = window.cancel_animation_frame(self.frame_id.load(Ordering::Relaxed));
			window.clear_interval_with_handle(self.interval_id.load(Ordering::Relaxed));
			if let Some(listeners) = listeners {
				listeners.detach(&window);
			}
		}
		info!("neuro-graph: canvas {} stopped", self.canvas_id);
	}
}

fn viewport_size(window: &Window) -> (f64, f64) {
	let read = |v: Result<JsValue, JsValue>, fallback: f64| {
		v.ok().and_then(|v| v.as_f64()).unwrap_or(fallback)
	};
	(
		read(window.inner_width(), 800.0),
		read(window.inner_height(), 600.0),
	)
}

fn pointer_position(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

fn is_text_entry(tag_name: &str) -> bool {
	matches!(tag_name, "INPUT" | "TEXTAREA")
}

/// Keys typed into form fields belong to the field, not the graph.
fn typing_in_field(ev: &KeyboardEvent) -> bool {
	ev.target()
		.and_then(|target| target.dyn_into::<Element>().ok())
		.is_some_and(|el| is_text_entry(&el.tag_name()))
}

/// Renders the interactive graph on a canvas element.
///
/// Pass graph data via the reactive `data` signal. The component sizes itself
/// to its parent container by default; set `fullscreen = true` to fill the
/// viewport and resize with the window. Share-link parameters in the page URL
/// restore the camera on mount.
///
/// Inputs that may change while mounted:
/// - `theme`: theme key, unknown keys fall back to the default theme
/// - `view`: label, glow and pulse toggles
/// - `focus`: navigation intents (search pick, cluster, minimap click, reset)
///
/// Outputs:
/// - `on_select`: id of every clicked node
/// - `on_hover`: id of the hovered node, `None` when hover clears
/// - `on_view`: camera, selection and world bounds whenever they change
#[component]
pub fn ForceGraphCanvas(
	#[prop(into)] data: Signal<GraphData>,
	#[prop(into, optional)] theme: Option<Signal<String>>,
	#[prop(into, optional)] view: Option<Signal<ViewSettings>>,
	#[prop(into, optional)] focus: Option<Signal<Option<FocusRequest>>>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
	#[prop(optional)] on_select: Option<Callback<String>>,
	#[prop(optional)] on_hover: Option<Callback<Option<String>>>,
	#[prop(optional)] on_view: Option<Callback<ViewState>>,
) -> impl IntoView {
	let theme = theme.unwrap_or_else(|| Signal::derive(|| "default".to_string()));
	let view = view.unwrap_or_else(|| Signal::derive(ViewSettings::default));

	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let engine: SharedEngine = Rc::new(RefCell::new(None));
	let animate: SharedClosure = Rc::new(RefCell::new(None));
	let smooth: SharedClosure = Rc::new(RefCell::new(None));
	let teardown = Teardown::new();

	let (engine_init, animate_init, smooth_init, teardown_init) =
		(engine.clone(), animate.clone(), smooth.clone(), teardown.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			warn!("neuro-graph: no window, not starting");
			return;
		};

		let (w, h) = if fullscreen {
			viewport_size(&window)
		} else {
			let parent = canvas.parent_element();
			(
				width.unwrap_or_else(|| parent.as_ref().map_or(800.0, |p| p.client_width() as f64)),
				height.unwrap_or_else(|| parent.as_ref().map_or(600.0, |p| p.client_height() as f64)),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let ctx: CanvasRenderingContext2d = match canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into().ok())
		{
			Some(ctx) => ctx,
			None => {
				warn!("neuro-graph: canvas has no 2d context");
				return;
			}
		};

		let mut graph = GraphEngine::new(
			&data.get_untracked(),
			w,
			h,
			Theme::by_key(&theme.get_untracked()),
		);
		graph.set_view_settings(view.get_untracked());
		if let Ok(search) = window.location().search() {
			if !search.is_empty() {
				let link = ShareLink::parse(&search);
				if let Some(idx) = graph.apply_share_link(&link) {
					info!("neuro-graph: share link selects node {idx}");
				}
			}
		}
		*engine_init.borrow_mut() = Some(graph);

		let mut listeners = WindowListeners::default();
		if fullscreen {
			let (engine_resize, canvas_resize) = (engine_init.clone(), canvas.clone());
			listeners.resize = Some(Closure::new(move || {
				let Some(win) = web_sys::window() else {
					return;
				};
				let (nw, nh) = viewport_size(&win);
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut e) = *engine_resize.borrow_mut() {
					e.resize(nw, nh);
				}
			}));
		}
		let engine_keys = engine_init.clone();
		listeners.keydown = Some(Closure::new(move |ev: KeyboardEvent| {
			if typing_in_field(&ev) {
				return;
			}
			if let Some(ref mut e) = *engine_keys.borrow_mut() {
				if e.key(&ev.key()) {
					ev.prevent_default();
				}
			}
		}));
		listeners.attach(&window);
		teardown_init.park(listeners);

		let engine_smooth = engine_init.clone();
		*smooth_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref mut e) = *engine_smooth.borrow_mut() {
				e.smooth_camera();
			}
		}));
		if let Some(ref cb) = *smooth_init.borrow() {
			let function: &js_sys::Function = cb.as_ref().unchecked_ref();
			match window.set_interval_with_callback_and_timeout_and_arguments_0(
				function,
				SMOOTHING_INTERVAL_MS,
			) {
				Ok(id) => teardown_init.interval_id.store(id, Ordering::Relaxed),
				Err(e) => warn!("neuro-graph: camera timer failed: {e:?}"),
			}
		}

		let (engine_anim, animate_inner, teardown_anim) = (
			engine_init.clone(),
			animate_init.clone(),
			teardown_init.clone(),
		);
		let mut last_view: Option<ViewState> = None;
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if teardown_anim.is_stopped() {
				return;
			}
			let changed = engine_anim.borrow_mut().as_mut().and_then(|e| {
				e.tick();
				render::render(&e.scene(), &ctx);
				let state = on_view.is_some().then(|| e.view_state())?;
				(last_view.as_ref() != Some(&state)).then_some(state)
			});
			// callbacks run after the engine borrow is released
			if let (Some(state), Some(cb)) = (changed, on_view) {
				last_view = Some(state.clone());
				cb.run(state);
			}
			if let (Some(cb), Some(win)) = (&*animate_inner.borrow(), web_sys::window()) {
				if let Ok(id) = win.request_animation_frame(cb.as_ref().unchecked_ref()) {
					teardown_anim.frame_id.store(id, Ordering::Relaxed);
				}
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			if let Ok(id) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
				teardown_init.frame_id.store(id, Ordering::Relaxed);
			}
		}
	});

	let engine_theme = engine.clone();
	Effect::new(move |_| {
		let key = theme.get();
		if let Some(ref mut e) = *engine_theme.borrow_mut() {
			if e.theme().key != key {
				e.set_theme(&key);
			}
		}
	});

	let engine_view = engine.clone();
	Effect::new(move |_| {
		let settings = view.get();
		if let Some(ref mut e) = *engine_view.borrow_mut() {
			e.set_view_settings(settings);
		}
	});

	if let Some(focus) = focus {
		let engine_focus = engine.clone();
		Effect::new(move |_| {
			let Some(request) = focus.get() else {
				return;
			};
			if let Some(ref mut e) = *engine_focus.borrow_mut() {
				if !e.request_focus(&request) {
					debug!("neuro-graph: ignored focus request {request:?}");
				}
			}
		});
	}

	let teardown_cleanup = teardown.clone();
	on_cleanup(move || teardown_cleanup.stop());

	let report_hover = {
		let engine = engine.clone();
		move |outcome: InteractionOutcome| {
			let Some(cb) = on_hover.filter(|_| outcome.hover_changed) else {
				return;
			};
			let id = engine
				.borrow()
				.as_ref()
				.and_then(|e| e.hovered().map(|n| n.id.clone()));
			cb.run(id);
		}
	};

	let (engine_md, report_md) = (engine.clone(), report_hover.clone());
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = pointer_position(canvas_ref, &ev) else {
			return;
		};
		let Some((outcome, selected)) = engine_md.borrow_mut().as_mut().map(|e| {
			let outcome = e.pointer_down(x, y);
			let selected = outcome.selected.and_then(|idx| {
				e.focus_node(idx);
				e.selected().map(|n| n.id.clone())
			});
			(outcome, selected)
		}) else {
			return;
		};
		report_md(outcome);
		if let (Some(id), Some(cb)) = (selected, on_select) {
			cb.run(id);
		}
	};

	let (engine_mm, report_mm) = (engine.clone(), report_hover.clone());
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = pointer_position(canvas_ref, &ev) else {
			return;
		};
		let outcome = engine_mm.borrow_mut().as_mut().map(|e| e.pointer_move(x, y));
		if let Some(outcome) = outcome {
			report_mm(outcome);
		}
	};

	let (engine_mu, report_mu) = (engine.clone(), report_hover.clone());
	let on_mouseup = move |_: MouseEvent| {
		let outcome = engine_mu.borrow_mut().as_mut().map(|e| e.pointer_up());
		if let Some(outcome) = outcome {
			report_mu(outcome);
		}
	};

	let (engine_ml, report_ml) = (engine.clone(), report_hover);
	let on_mouseleave = move |_: MouseEvent| {
		let outcome = engine_ml.borrow_mut().as_mut().map(|e| e.pointer_leave());
		if let Some(outcome) = outcome {
			report_ml(outcome);
		}
	};

	let engine_wh = engine.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		if let Some(ref mut e) = *engine_wh.borrow_mut() {
			e.wheel(ev.delta_y());
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="force-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_form_fields_keep_their_keys() {
		assert!(is_text_entry("INPUT"));
		assert!(is_text_entry("TEXTAREA"));
		assert!(!is_text_entry("CANVAS"));
		assert!(!is_text_entry("BODY"));
	}

	#[test]
	fn test_parked_listeners_are_released_once() {
		let (first, second) = (Teardown::new(), Teardown::new());
		assert_ne!(first.canvas_id, second.canvas_id);
		first.park(WindowListeners::default());
		second.park(WindowListeners::default());

		assert!(first.unpark().is_some());
		assert!(first.unpark().is_none());
		assert!(second.unpark().is_some());
	}
}
