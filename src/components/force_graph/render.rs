//! Canvas adapter for a [`Scene`].
//!
//! Strokes and fills exactly what the scene describes, in this order:
//! 1. Background (screen space)
//! 2. Edges and flow dots (world space)
//! 3. Click pulses
//! 4. Nodes, then labels

use std::f64::consts::TAU;

use web_sys::CanvasRenderingContext2d;

use super::scene::{EdgeDraw, NodeDraw, Scene};
use super::pulses::PulseFrame;

/// Draws the complete scene to the canvas.
pub fn render(scene: &Scene, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(&scene.background);
	ctx.fill_rect(0.0, 0.0, scene.width, scene.height);

	ctx.save();
	let _ = ctx.translate(
		scene.width / 2.0 + scene.offset.0,
		scene.height / 2.0 + scene.offset.1,
	);
	let _ = ctx.scale(scene.zoom, scene.zoom);

	for edge in &scene.edges {
		draw_edge(ctx, edge);
	}
	for pulse in &scene.pulses {
		draw_pulse(ctx, pulse);
	}
	for node in &scene.nodes {
		draw_node(ctx, node);
	}
	ctx.set_font(&format!("9px {}", scene.font));
	ctx.set_text_align("center");
	ctx.set_fill_style_str(&scene.text_color);
	for node in scene.nodes.iter().filter(|n| n.label.is_some()) {
		draw_label(ctx, node);
	}

	ctx.restore();
}

fn draw_edge(ctx: &CanvasRenderingContext2d, edge: &EdgeDraw) {
	ctx.set_global_alpha(0.25);
	ctx.set_stroke_style_str(&edge.source_color);
	ctx.set_line_width(edge.width);
	let dash = js_sys::Array::new();
	if edge.dashed() {
		dash.push(&4.0.into());
		dash.push(&4.0.into());
	}
	let _ = ctx.set_line_dash(&dash);

	ctx.begin_path();
	ctx.move_to(edge.from.0, edge.from.1);
	ctx.quadratic_curve_to(edge.control.0, edge.control.1, edge.to.0, edge.to.1);
	ctx.stroke();
	let _ = ctx.set_line_dash(&js_sys::Array::new());

	if let Some((fx, fy)) = edge.flow {
		ctx.set_global_alpha(0.5);
		ctx.set_fill_style_str(&edge.source_color);
		ctx.begin_path();
		let _ = ctx.arc(fx, fy, 1.5, 0.0, TAU);
		ctx.fill();
	}
	ctx.set_global_alpha(1.0);
}

fn draw_pulse(ctx: &CanvasRenderingContext2d, pulse: &PulseFrame) {
	let (hx, hy) = pulse.head;
	let (tx, ty) = pulse.trail;

	ctx.set_global_alpha(0.5);
	ctx.set_stroke_style_str(&pulse.color);
	ctx.set_line_width(3.0);
	ctx.set_line_cap("round");
	ctx.begin_path();
	ctx.move_to(hx, hy);
	ctx.line_to(tx, ty);
	ctx.stroke();

	ctx.set_global_alpha(1.0);
	ctx.set_fill_style_str("#ffffff");
	ctx.begin_path();
	let _ = ctx.arc(hx, hy, 2.5, 0.0, TAU);
	ctx.fill();
}

fn draw_node(ctx: &CanvasRenderingContext2d, node: &NodeDraw) {
	ctx.begin_path();
	let _ = ctx.arc(node.x, node.y, node.size, 0.0, TAU);
	ctx.set_fill_style_str(&node.color);
	ctx.fill();
	ctx.set_stroke_style_str(&node.color);
	ctx.set_line_width(if node.hovered { 2.0 } else { 1.0 });
	ctx.stroke();
}

fn draw_label(ctx: &CanvasRenderingContext2d, node: &NodeDraw) {
	if let Some(label) = &node.label {
		let _ = ctx.fill_text(label, node.x, node.y + node.size + 14.0);
	}
}
