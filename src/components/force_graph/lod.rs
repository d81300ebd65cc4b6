//! Zoom-dependent level of detail.
//!
//! Three fixed bands pick how much gets drawn. There is no hysteresis, so a
//! zoom jittering across a band edge flips the profile each frame.
//!
//! | band | labels | glow | pulses | edge width |
//! |---|---|---|---|---|
//! | `zoom < 0.6` | no | no | no | 0.3 |
//! | `0.6 <= zoom < 1.2` | no | yes | yes | 0.8 |
//! | `zoom >= 1.2` | yes | yes | yes | 1.2 |
//!
//! User toggles in [`ViewSettings`] sit on top as master switches; see
//! [`RenderFlags::resolve`]. The labels column is the band's own default; a
//! user who enables labels also gets them in the middle band.

use super::theme::Theme;

const FAR_BELOW: f64 = 0.6;
const NEAR_FROM: f64 = 1.2;

/// Zoom band, from furthest out to closest in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LodBand {
	Far,
	Mid,
	Near,
}

impl LodBand {
	pub fn for_zoom(zoom: f64) -> Self {
		if zoom < FAR_BELOW {
			LodBand::Far
		} else if zoom < NEAR_FROM {
			LodBand::Mid
		} else {
			LodBand::Near
		}
	}
}

/// Detail profile for one band.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LodSettings {
	pub render_labels: bool,
	pub render_glow: bool,
	pub render_pulses: bool,
	/// Multiplier on edge stroke width.
	pub edge_width: f64,
}

pub fn lod_for_zoom(zoom: f64) -> LodSettings {
	match LodBand::for_zoom(zoom) {
		LodBand::Far => LodSettings {
			render_labels: false,
			render_glow: false,
			render_pulses: false,
			edge_width: 0.3,
		},
		LodBand::Mid => LodSettings {
			render_labels: false,
			render_glow: true,
			render_pulses: true,
			edge_width: 0.8,
		},
		LodBand::Near => LodSettings {
			render_labels: true,
			render_glow: true,
			render_pulses: true,
			edge_width: 1.2,
		},
	}
}

/// User-facing visibility toggles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ViewSettings {
	/// Show node labels (never in the far band).
	pub render_labels: bool,
	/// Show glow halos where the theme supports them.
	pub render_glow: bool,
	/// Show click pulses and, where the theme supports them, flow dots.
	pub render_pulses: bool,
}

impl Default for ViewSettings {
	fn default() -> Self {
		Self {
			render_labels: true,
			render_glow: true,
			render_pulses: true,
		}
	}
}

/// What actually gets drawn this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderFlags {
	/// Node labels.
	pub labels: bool,
	/// Glow halos.
	pub glow: bool,
	/// Pulses fired by clicking a node.
	pub pulses: bool,
	/// Ambient flow dots along edges.
	pub flow: bool,
	/// Multiplier on edge stroke width.
	pub edge_width: f64,
}

impl RenderFlags {
	/// Combine the LOD profile with user toggles and theme capabilities.
	///
	/// A toggle that is off always wins. Click pulses follow the toggle and the
	/// band only; glow and flow dots also need theme support.
	pub fn resolve(zoom: f64, view: &ViewSettings, theme: &Theme) -> Self {
		let band = LodBand::for_zoom(zoom);
		let lod = lod_for_zoom(zoom);
		let pulses = view.render_pulses && lod.render_pulses;
		Self {
			// the user toggle lifts the middle band's default, never the far band's
			labels: view.render_labels && (lod.render_labels || band != LodBand::Far),
			glow: view.render_glow && theme.glow && lod.render_glow,
			pulses,
			flow: pulses && theme.pulses,
			edge_width: lod.edge_width,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_band_boundaries() {
		assert_eq!(LodBand::for_zoom(0.25), LodBand::Far);
		assert_eq!(LodBand::for_zoom(0.5999), LodBand::Far);
		assert_eq!(LodBand::for_zoom(0.6), LodBand::Mid);
		assert_eq!(LodBand::for_zoom(1.1999), LodBand::Mid);
		assert_eq!(LodBand::for_zoom(1.2), LodBand::Near);
		assert_eq!(LodBand::for_zoom(3.0), LodBand::Near);
	}

	#[test]
	fn test_profiles() {
		let far = lod_for_zoom(0.3);
		assert!(!far.render_labels && !far.render_glow && !far.render_pulses);
		assert_eq!(far.edge_width, 0.3);

		let mid = lod_for_zoom(1.0);
		assert!(!mid.render_labels && mid.render_glow && mid.render_pulses);
		assert_eq!(mid.edge_width, 0.8);

		let near = lod_for_zoom(2.0);
		assert!(near.render_labels);
		assert_eq!(near.edge_width, 1.2);
	}

	#[test]
	fn test_user_toggle_off_wins() {
		let theme = Theme::default_theme();
		let view = ViewSettings {
			render_labels: false,
			render_glow: false,
			render_pulses: false,
		};
		let flags = RenderFlags::resolve(2.0, &view, &theme);
		assert!(!flags.labels && !flags.glow && !flags.pulses);
	}

	#[test]
	fn test_labels_follow_user_except_far_band() {
		let theme = Theme::default_theme();
		let view = ViewSettings::default();
		assert!(RenderFlags::resolve(1.0, &view, &theme).labels);
		assert!(!RenderFlags::resolve(0.4, &view, &theme).labels);
	}

	#[test]
	fn test_theme_without_glow_disables_glow_and_flow() {
		let theme = Theme::by_key("paper");
		let flags = RenderFlags::resolve(2.0, &ViewSettings::default(), &theme);
		assert!(!flags.glow);
		assert!(!flags.flow);
		assert!(flags.pulses);
	}

	#[test]
	fn test_click_pulses_ignore_theme_capability() {
		let view = ViewSettings::default();
		for key in ["obsidian", "blueprint", "minimal", "terminal", "paper", "void"] {
			let theme = Theme::by_key(key);
			assert!(RenderFlags::resolve(1.0, &view, &theme).pulses, "{key}");
			assert!(!RenderFlags::resolve(0.4, &view, &theme).pulses, "{key}");
		}
	}
}
