//! Interactive node-link graph engine and its canvas host.
//!
//! The engine ([`GraphEngine`]) owns every piece of mutable state:
//! - Physics layouts (force-directed, grid, radial) advanced once per frame
//! - A uniform spatial hash for hover hit-testing
//! - A camera whose offset chases a target on a fixed-rate timer
//! - The pointer state machine (hover, drag, pan)
//! - Signal pulses spawned along edges when a node is clicked
//!
//! Each frame it emits a [`Scene`] for a renderer to draw.
//!
//! # Example
//!
//! ```ignore
//! use neuro_graph::{FocusRequest, ForceGraphCanvas, GraphData};
//!
//! let data: GraphData = serde_json::from_str(json)?;
//! let theme = RwSignal::new("cosmos".to_string());
//! let focus = RwSignal::new(Some(FocusRequest::Cluster("ml".into())));
//! view! { <ForceGraphCanvas data=data.into() theme=theme focus=focus fullscreen=true /> }
//! ```

mod camera;
mod component;
mod interaction;
mod layout;
mod lod;
mod pulses;
mod render;
mod scene;
mod share;
mod spatial;
mod state;
mod store;
mod theme;
mod types;

pub use camera::{Camera, Nudge};
pub use component::ForceGraphCanvas;
pub use interaction::{InteractionOutcome, PointerState};
pub use layout::{ForceParams, GridParams, LayoutMode, RadialParams};
pub use lod::{RenderFlags, ViewSettings};
pub use pulses::{Pulse, PulseFrame, PulseTracker};
pub use scene::{EdgeDraw, NodeDraw, Scene};
pub use share::ShareLink;
pub use state::{FocusRequest, GraphEngine, ViewState};
pub use store::{NodeIdx, SimNode, WorldBounds};
pub use theme::{Color, THEME_KEYS, Theme, ThemeColors};
pub use types::{EdgeKind, GraphCluster, GraphData, GraphEdge, GraphNode};
