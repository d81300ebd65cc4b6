//! neuro-graph: interactive node-link graph visualization.
//!
//! This crate provides a WASM-based graph component: nodes settle under a
//! physics simulation or snap to grid/radial layouts, the camera pans and
//! zooms smoothly, and clicking a node fires signal pulses along its edges.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;

pub use components::force_graph::{
	EdgeKind, FocusRequest, ForceGraphCanvas, GraphCluster, GraphData, GraphEdge, GraphEngine,
	GraphNode, Scene, THEME_KEYS, Theme, ViewSettings, ViewState,
};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("neuro-graph: logging initialized");
}

/// Read an attribute of the graph-data element, e.g. `data-theme`.
fn graph_data_attribute(name: &str) -> Option<String> {
	let window: Window = web_sys::window()?;
	window
		.document()?
		.get_element_by_id("graph-data")?
		.get_attribute(name)
}

/// Load graph data from a script element with id="graph-data".
/// Expected format: JSON with { clusters: [...], nodes: [...], edges: [...] }
fn load_graph_data() -> Option<GraphData> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id("graph-data")?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	let json_text = script.text().ok()?;

	match serde_json::from_str::<GraphData>(&json_text) {
		Ok(data) => {
			info!(
				"neuro-graph: loaded {} clusters, {} nodes, {} edges",
				data.clusters.len(),
				data.nodes.len(),
				data.edges.len()
			);
			Some(data)
		}
		Err(e) => {
			warn!("neuro-graph: failed to parse graph data: {}", e);
			None
		}
	}
}

/// Main application component.
/// Loads graph data from DOM and renders the interactive visualization.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let graph_data = load_graph_data().unwrap_or_default();
	let graph_signal = Signal::derive(move || graph_data.clone());
	let initial_theme = graph_data_attribute("data-theme").unwrap_or_else(|| "default".to_string());
	let theme = RwSignal::new(initial_theme);
	let focus = RwSignal::new(None::<FocusRequest>);
	let hovered = RwSignal::new(None::<String>);
	let on_select = Callback::new(|id: String| info!("neuro-graph: selected {id}"));
	let on_hover = Callback::new(move |id: Option<String>| hovered.set(id));

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Neuro Graph" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="fullscreen-graph">
			<ForceGraphCanvas
				data=graph_signal
				theme=theme
				focus=focus
				fullscreen=true
				on_select=on_select
				on_hover=on_hover
			/>
			<div class="graph-overlay">
				<h1>"Neuro Graph"</h1>
				<p class="subtitle">"Click a node to send a signal. Drag to pan, scroll to zoom, space to pause, R to reset."</p>
				<p class="hovered">{move || hovered.get().unwrap_or_default()}</p>
				<select on:change=move |ev| theme.set(event_target_value(&ev))>
					{THEME_KEYS
						.into_iter()
						.map(|key| {
							view! {
								<option value=key selected=move || theme.get() == key>
									{key}
								</option>
							}
						})
						.collect_view()}
				</select>
				<button on:click=move |_| focus.set(Some(FocusRequest::Reset))>"Reset view"</button>
			</div>
		</div>
	}
}
