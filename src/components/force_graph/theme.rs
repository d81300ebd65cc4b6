//! Visual theming and physics presets for the graph.
//!
//! A [`Theme`] is resolved once from its key and carries everything the
//! engine needs per frame: the layout strategy with its physics constants,
//! interaction permissions, and colors that are passed straight through to
//! the renderer.

use super::layout::{ForceParams, GridParams, LayoutMode, RadialParams};

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	/// Red channel.
	pub r: u8,
	/// Green channel.
	pub g: u8,
	/// Blue channel.
	pub b: u8,
	/// Alpha in `[0, 1]`.
	pub a: f64,
}

impl Color {
	/// Opaque color from channels.
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	/// Build a color from a packed `0xRRGGBB` literal.
	pub const fn hex(rgb: u32) -> Self {
		Self::rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
	}

	/// Same color with a different alpha.
	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// `#rrggbb` when opaque, `rgba(...)` otherwise.
	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Colors handed to the renderer. The engine never inspects them.
#[derive(Clone, Debug)]
pub struct ThemeColors {
	/// Canvas fill.
	pub background: Color,
	/// Fallback node color when the node has no known cluster.
	pub node_base: Color,
	/// Fallback edge color when an endpoint has no known cluster.
	pub edge_base: Color,
	/// Label color.
	pub text: Color,
}

/// Complete visual theme.
#[derive(Clone, Debug)]
pub struct Theme {
	/// Lookup key, one of [`THEME_KEYS`].
	pub key: &'static str,
	/// Display name.
	pub label: &'static str,
	/// Layout strategy and its physics constants.
	pub layout: LayoutMode,
	/// Renderer colors.
	pub colors: ThemeColors,
	/// Theme supports glow halos around nodes.
	pub glow: bool,
	/// Theme draws ambient flow dots along edges.
	pub pulses: bool,
	/// Nodes can be dragged; otherwise clicks only select.
	pub draggable: bool,
	/// Nodes take their cluster color instead of `node_base`.
	pub cluster_node_colors: bool,
	/// Edges take their endpoints' cluster colors instead of `edge_base`.
	pub cluster_edge_colors: bool,
	/// CSS font family for labels.
	pub font: &'static str,
}

/// Keys accepted by [`Theme::by_key`], in menu order.
pub const THEME_KEYS: [&str; 12] = [
	"default", "obsidian", "cyber", "blueprint", "matrix", "cosmos", "minimal", "forest", "sunset",
	"terminal", "paper", "void",
];

struct Preset {
	key: &'static str,
	label: &'static str,
	layout: LayoutKind,
	background: u32,
	node_base: u32,
	edge_base: u32,
	text: u32,
	glow: bool,
	pulses: bool,
	repulsion: f64,
	spring: f64,
	center_gravity: Option<f64>,
	cluster_node_colors: bool,
	cluster_edge_colors: bool,
	font: &'static str,
}

#[derive(Clone, Copy)]
enum LayoutKind {
	Force,
	Grid,
	Radial,
}

impl Preset {
	const fn new(key: &'static str, label: &'static str, layout: LayoutKind) -> Self {
		Self {
			key,
			label,
			layout,
			background: 0x000000,
			node_base: 0x888888,
			edge_base: 0x666666,
			text: 0xe8e6e3,
			glow: false,
			pulses: false,
			repulsion: ForceParams::DEFAULT_REPULSION,
			spring: ForceParams::DEFAULT_SPRING,
			center_gravity: None,
			cluster_node_colors: true,
			cluster_edge_colors: true,
			font: "monospace",
		}
	}

	fn build(&self) -> Theme {
		let physics = ForceParams {
			repulsion: self.repulsion,
			spring: self.spring,
			center_gravity: self
				.center_gravity
				.unwrap_or(ForceParams::DEFAULT_CENTER_GRAVITY),
		};
		let layout = match self.layout {
			LayoutKind::Force => LayoutMode::Force(physics),
			LayoutKind::Grid => LayoutMode::Grid(GridParams::default()),
			LayoutKind::Radial => LayoutMode::Radial(RadialParams::default()),
		};
		Theme {
			key: self.key,
			label: self.label,
			layout,
			colors: ThemeColors {
				background: Color::hex(self.background),
				node_base: Color::hex(self.node_base),
				edge_base: Color::hex(self.edge_base),
				text: Color::hex(self.text),
			},
			glow: self.glow,
			pulses: self.pulses,
			draggable: true,
			cluster_node_colors: self.cluster_node_colors,
			cluster_edge_colors: self.cluster_edge_colors,
			font: self.font,
		}
	}
}

const PRESETS: [Preset; 12] = [
	Preset {
		background: 0x040406,
		glow: true,
		pulses: true,
		repulsion: 4000.0,
		spring: 0.005,
		center_gravity: Some(0.0001),
		font: "'JetBrains Mono', monospace",
		..Preset::new("default", "Neuro", LayoutKind::Force)
	},
	Preset {
		node_base: 0x444444,
		edge_base: 0x333333,
		text: 0x888888,
		repulsion: 3000.0,
		spring: 0.015,
		font: "'Inter', sans-serif",
		..Preset::new("obsidian", "Obsidian", LayoutKind::Force)
	},
	Preset {
		background: 0x0d0221,
		node_base: 0x00ffff,
		edge_base: 0xff00ff,
		text: 0x00ffff,
		glow: true,
		pulses: true,
		repulsion: 1500.0,
		spring: 0.04,
		font: "'Orbitron', sans-serif",
		..Preset::new("cyber", "Cyberpunk", LayoutKind::Grid)
	},
	Preset {
		background: 0x1a3c6e,
		node_base: 0xffffff,
		edge_base: 0xaaccff,
		text: 0xffffff,
		repulsion: 2000.0,
		spring: 0.05,
		cluster_node_colors: false,
		font: "'Courier New', monospace",
		..Preset::new("blueprint", "Blueprint", LayoutKind::Grid)
	},
	Preset {
		background: 0x000800,
		node_base: 0x00ff00,
		edge_base: 0x003300,
		text: 0x00ff00,
		glow: true,
		pulses: true,
		repulsion: 2000.0,
		spring: 0.05,
		cluster_edge_colors: false,
		font: "'Courier', monospace",
		..Preset::new("matrix", "Matrix", LayoutKind::Grid)
	},
	Preset {
		background: 0x050510,
		node_base: 0xffffff,
		edge_base: 0x4b0082,
		text: 0xaaaaff,
		glow: true,
		pulses: true,
		repulsion: 1000.0,
		spring: 0.02,
		font: "'Exo 2', sans-serif",
		..Preset::new("cosmos", "Cosmos", LayoutKind::Radial)
	},
	Preset {
		background: 0xffffff,
		node_base: 0x333333,
		edge_base: 0xdddddd,
		text: 0x000000,
		repulsion: 2500.0,
		spring: 0.03,
		cluster_node_colors: false,
		cluster_edge_colors: false,
		font: "'Helvetica Neue', sans-serif",
		..Preset::new("minimal", "Minimal Light", LayoutKind::Force)
	},
	Preset {
		background: 0x0a1a0a,
		node_base: 0x4caf50,
		edge_base: 0x2e7d32,
		text: 0xa5d6a7,
		glow: true,
		pulses: true,
		repulsion: 2200.0,
		spring: 0.03,
		font: "'Karma', serif",
		..Preset::new("forest", "Forest", LayoutKind::Force)
	},
	Preset {
		background: 0x1a0b0b,
		node_base: 0xff9800,
		edge_base: 0xe91e63,
		text: 0xffcc80,
		glow: true,
		pulses: true,
		repulsion: 2400.0,
		spring: 0.04,
		font: "'Poppins', sans-serif",
		..Preset::new("sunset", "Sunset", LayoutKind::Force)
	},
	Preset {
		background: 0x0c0c0c,
		node_base: 0x33ff33,
		edge_base: 0x1a4d1a,
		text: 0x33ff33,
		glow: true,
		repulsion: 2000.0,
		spring: 0.05,
		font: "'VT323', monospace",
		..Preset::new("terminal", "Terminal", LayoutKind::Grid)
	},
	Preset {
		background: 0xfdf6e3,
		node_base: 0x586e75,
		edge_base: 0x93a1a1,
		text: 0x657b83,
		repulsion: 2500.0,
		spring: 0.03,
		font: "'Garamond', serif",
		..Preset::new("paper", "Paper", LayoutKind::Force)
	},
	Preset {
		node_base: 0x333333,
		edge_base: 0x111111,
		text: 0x444444,
		repulsion: 4000.0,
		spring: 0.01,
		cluster_node_colors: false,
		cluster_edge_colors: false,
		font: "'Roboto', sans-serif",
		..Preset::new("void", "Void", LayoutKind::Radial)
	},
];

impl Theme {
	/// Resolve a theme by key, falling back to the default theme.
	pub fn by_key(key: &str) -> Self {
		match PRESETS.iter().find(|preset| preset.key == key) {
			Some(preset) => preset.build(),
			None => {
				log::warn!("neuro-graph: unknown theme {key:?}, using default");
				Self::default_theme()
			}
		}
	}

	/// Deep-dark force-directed theme with glow and pulses (default)
	pub fn default_theme() -> Self {
		PRESETS[0].build()
	}
}

impl Default for Theme {
	fn default() -> Self {
		Self::default_theme()
	}
}
