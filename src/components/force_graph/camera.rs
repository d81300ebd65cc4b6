//! Camera controller: smoothed offset, immediate clamped zoom.
//!
//! The offset chases `target` with a first-order exponential filter driven by
//! a fixed-rate timer. Navigation only ever writes `target`; the one exception
//! is [`Camera::jump_to`], which snaps both.

/// Lower zoom bound.
pub const MIN_ZOOM: f64 = 0.25;
/// Upper zoom bound.
pub const MAX_ZOOM: f64 = 3.0;
/// Fraction of the remaining gap closed per smoothing tick.
pub const SMOOTHING: f64 = 0.1;
pub const ZOOM_OUT_FACTOR: f64 = 0.92;
pub const ZOOM_IN_FACTOR: f64 = 1.08;
/// World units moved by one keyboard nudge.
pub const NUDGE_STEP: f64 = 50.0;

/// Direction of a keyboard nudge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Nudge {
	/// Arrow up.
	Up,
	/// Arrow down.
	Down,
	/// Arrow left.
	Left,
	/// Arrow right.
	Right,
}

/// Pan offset (screen pixels) chasing a target, plus zoom.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
	/// Current offset x.
	pub offset_x: f64,
	/// Current offset y.
	pub offset_y: f64,
	/// Offset x the smoothing step moves toward.
	pub target_x: f64,
	/// Offset y the smoothing step moves toward.
	pub target_y: f64,
	zoom: f64,
	/// Viewport width in pixels.
	pub width: f64,
	/// Viewport height in pixels.
	pub height: f64,
}

impl Camera {
	/// Centered camera at zoom 1.
	pub fn new(width: f64, height: f64) -> Self {
		Self {
			offset_x: 0.0,
			offset_y: 0.0,
			target_x: 0.0,
			target_y: 0.0,
			zoom: 1.0,
			width,
			height,
		}
	}

	/// Current zoom, within `MIN_ZOOM..=MAX_ZOOM`.
	pub fn zoom(&self) -> f64 {
		self.zoom
	}

	/// Track a new viewport size.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	/// Canvas pixel to world point.
	pub fn screen_to_world(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.width / 2.0 - self.offset_x) / self.zoom,
			(sy - self.height / 2.0 - self.offset_y) / self.zoom,
		)
	}

	/// World point to canvas pixel.
	pub fn world_to_screen(&self, wx: f64, wy: f64) -> (f64, f64) {
		(
			wx * self.zoom + self.width / 2.0 + self.offset_x,
			wy * self.zoom + self.height / 2.0 + self.offset_y,
		)
	}

	/// One smoothing step: `offset += (target - offset) * 0.1`.
	pub fn smooth_tick(&mut self) {
		self.offset_x += (self.target_x - self.offset_x) * SMOOTHING;
		self.offset_y += (self.target_y - self.offset_y) * SMOOTHING;
	}

	/// Center the view on a world point; the smoothing step animates there.
	pub fn focus(&mut self, wx: f64, wy: f64) {
		self.target_x = -wx;
		self.target_y = -wy;
	}

	/// Move the target one [`NUDGE_STEP`] for an arrow key.
	pub fn nudge(&mut self, direction: Nudge) {
		match direction {
			Nudge::Up => self.target_y += NUDGE_STEP,
			Nudge::Down => self.target_y -= NUDGE_STEP,
			Nudge::Left => self.target_x += NUDGE_STEP,
			Nudge::Right => self.target_x -= NUDGE_STEP,
		}
	}

	/// Apply a wheel tick: positive `delta_y` zooms out.
	pub fn wheel(&mut self, delta_y: f64) {
		let factor = if delta_y > 0.0 {
			ZOOM_OUT_FACTOR
		} else {
			ZOOM_IN_FACTOR
		};
		self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
	}

	/// Pan by a screen-space delta. Moves the target too, so release does not rebound.
	pub fn pan_by(&mut self, dx: f64, dy: f64) {
		self.offset_x += dx;
		self.offset_y += dy;
		self.target_x = self.offset_x;
		self.target_y = self.offset_y;
	}

	/// Snap offset and target, and set zoom (clamped).
	pub fn jump_to(&mut self, offset_x: f64, offset_y: f64, zoom: f64) {
		self.offset_x = offset_x;
		self.offset_y = offset_y;
		self.target_x = offset_x;
		self.target_y = offset_y;
		self.zoom = clamp_zoom(zoom);
	}
}

/// Clamp to the zoom range; non-finite input maps to 1.0.
pub fn clamp_zoom(zoom: f64) -> f64 {
	if zoom.is_finite() {
		zoom.clamp(MIN_ZOOM, MAX_ZOOM)
	} else {
		1.0
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_smoothing_scenario() {
		let mut camera = Camera::new(800.0, 600.0);
		camera.target_x = 100.0;
		camera.target_y = -50.0;
		for _ in 0..10 {
			camera.smooth_tick();
		}
		let k = 1.0 - 0.9_f64.powi(10);
		assert!((camera.offset_x - 100.0 * k).abs() < 1e-9);
		assert!((camera.offset_y + 50.0 * k).abs() < 1e-9);
		assert!((camera.offset_x - 65.1).abs() < 0.05);
		assert!((camera.offset_y + 32.6).abs() < 0.05);
	}

	#[test]
	fn test_gap_shrinks_geometrically() {
		let mut camera = Camera::new(800.0, 600.0);
		camera.offset_x = 40.0;
		camera.target_x = -200.0;
		let initial = (camera.target_x - camera.offset_x).abs();
		for n in 1..=30 {
			camera.smooth_tick();
			let gap = (camera.target_x - camera.offset_x).abs();
			assert!((gap - initial * 0.9_f64.powi(n)).abs() < 1e-9);
		}
	}

	#[test]
	fn test_zoom_in_clamps_exactly() {
		let mut camera = Camera::new(800.0, 600.0);
		for _ in 0..100 {
			camera.wheel(-1.0);
			assert!(camera.zoom() <= MAX_ZOOM);
		}
		assert_eq!(camera.zoom(), 3.0);
		camera.wheel(-1.0);
		assert_eq!(camera.zoom(), 3.0);
	}

	#[test]
	fn test_zoom_out_clamps() {
		let mut camera = Camera::new(800.0, 600.0);
		for _ in 0..100 {
			camera.wheel(1.0);
		}
		assert_eq!(camera.zoom(), MIN_ZOOM);
	}

	#[test]
	fn test_screen_world_roundtrip_at_center() {
		let mut camera = Camera::new(800.0, 600.0);
		camera.offset_x = 30.0;
		camera.wheel(-1.0);
		let (wx, wy) = camera.screen_to_world(430.0, 300.0);
		assert!(wx.abs() < 1e-9 && wy.abs() < 1e-9);
		let (sx, sy) = camera.world_to_screen(12.0, -7.0);
		let (bx, by) = camera.screen_to_world(sx, sy);
		assert!((bx - 12.0).abs() < 1e-9 && (by + 7.0).abs() < 1e-9);
	}

	#[test]
	fn test_focus_negates_world_point() {
		let mut camera = Camera::new(800.0, 600.0);
		camera.focus(120.0, -40.0);
		assert_eq!((camera.target_x, camera.target_y), (-120.0, 40.0));
		assert_eq!((camera.offset_x, camera.offset_y), (0.0, 0.0));
	}

	#[test]
	fn test_pan_moves_offset_and_target_together() {
		let mut camera = Camera::new(800.0, 600.0);
		camera.pan_by(15.0, -5.0);
		assert_eq!((camera.offset_x, camera.offset_y), (15.0, -5.0));
		assert_eq!((camera.target_x, camera.target_y), (15.0, -5.0));
		camera.smooth_tick();
		assert_eq!((camera.offset_x, camera.offset_y), (15.0, -5.0));
	}

	#[test]
	fn test_nudge_directions() {
		let mut camera = Camera::new(800.0, 600.0);
		camera.nudge(Nudge::Up);
		camera.nudge(Nudge::Left);
		assert_eq!((camera.target_x, camera.target_y), (50.0, 50.0));
		camera.nudge(Nudge::Down);
		camera.nudge(Nudge::Right);
		assert_eq!((camera.target_x, camera.target_y), (0.0, 0.0));
	}

	#[test]
	fn test_jump_to_clamps_zoom() {
		let mut camera = Camera::new(800.0, 600.0);
		camera.jump_to(5.0, 6.0, 10.0);
		assert_eq!(camera.zoom(), MAX_ZOOM);
		assert_eq!(camera.target_x, 5.0);
		camera.jump_to(0.0, 0.0, f64::NAN);
		assert_eq!(camera.zoom(), 1.0);
	}
}
