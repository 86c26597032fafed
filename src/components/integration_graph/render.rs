use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::canvas::{CanvasState, NODE_HEIGHT};
use super::types::{Direction, Edge, Node};

const BACKGROUND: &str = "#1a1a2e";
const GRID_DOT: &str = "rgba(255, 255, 255, 0.08)";
const GRID_SPACING: f64 = 20.0;
const NODE_FILL: &str = "#16213e";
const NODE_BORDER: &str = "rgba(255, 255, 255, 0.35)";
const SELECTED_BORDER: &str = "#64b4ff";

pub fn render(state: &CanvasState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_grid(state, ctx);
	draw_edges(state, ctx);
	draw_connect_preview(state, ctx);
	draw_nodes(state, ctx);
	ctx.restore();
}

fn draw_grid(state: &CanvasState, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	let (x0, y0) = state.screen_to_graph(0.0, 0.0);
	let (x1, y1) = state.screen_to_graph(state.width, state.height);
	let dot = 1.5 / k;
	ctx.set_fill_style_str(GRID_DOT);
	let mut gx = (x0 / GRID_SPACING).floor() * GRID_SPACING;
	while gx <= x1 {
		let mut gy = (y0 / GRID_SPACING).floor() * GRID_SPACING;
		while gy <= y1 {
			ctx.fill_rect(gx - dot / 2.0, gy - dot / 2.0, dot, dot);
			gy += GRID_SPACING;
		}
		gx += GRID_SPACING;
	}
}

fn center(node: &Node) -> (f64, f64) {
	(
		node.position.x + node.visual_width / 2.0,
		node.position.y + NODE_HEIGHT / 2.0,
	)
}

/// Distance from a box centre to its border along the unit vector `(ux, uy)`.
fn border_distance(half_w: f64, half_h: f64, ux: f64, uy: f64) -> f64 {
	let tx = if ux.abs() > f64::EPSILON { half_w / ux.abs() } else { f64::INFINITY };
	let ty = if uy.abs() > f64::EPSILON { half_h / uy.abs() } else { f64::INFINITY };
	tx.min(ty)
}

fn draw_edges(state: &CanvasState, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	let (dash, gap, arrow_size) = (8.0 / k, 4.0 / k, 8.0 / k);
	let dash_offset = -(state.flow_time * 30.0) % (dash + gap);
	let nodes = state.session.nodes();

	for edge in state.session.edges() {
		// dangling references have nothing to anchor to
		let (Some(n1), Some(n2)) = (
			nodes.iter().find(|n| n.id == edge.source),
			nodes.iter().find(|n| n.id == edge.target),
		) else {
			continue;
		};
		let ((x1, y1), (x2, y2)) = (center(n1), center(n2));
		let (dx, dy) = (x2 - x1, y2 - y1);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < 0.001 {
			continue;
		}
		let (ux, uy) = (dx / dist, dy / dist);
		let start = border_distance(n1.visual_width / 2.0, NODE_HEIGHT / 2.0, ux, uy);
		let end = border_distance(n2.visual_width / 2.0, NODE_HEIGHT / 2.0, ux, uy);
		if start + end >= dist {
			continue;
		}
		let bidirectional = edge.metadata.direction == Direction::Bidirectional;
		let (sx, sy) = (x1 + ux * start, y1 + uy * start);
		let (tx, ty) = (x2 - ux * end, y2 - uy * end);
		let lead = if bidirectional { arrow_size } else { 0.0 };

		ctx.set_stroke_style_str(&edge.color);
		ctx.set_line_width(stroke_for(edge, k));
		if edge.animated {
			let _ = ctx.set_line_dash(&js_sys::Array::of2(
				&JsValue::from_f64(dash),
				&JsValue::from_f64(gap),
			));
			ctx.set_line_dash_offset(dash_offset);
		}
		ctx.begin_path();
		ctx.move_to(sx + ux * lead, sy + uy * lead);
		ctx.line_to(tx - ux * arrow_size, ty - uy * arrow_size);
		ctx.stroke();
		let _ = ctx.set_line_dash(&js_sys::Array::new());

		ctx.set_fill_style_str(&edge.color);
		draw_arrowhead(ctx, (tx, ty), (ux, uy), arrow_size);
		if bidirectional {
			draw_arrowhead(ctx, (sx, sy), (-ux, -uy), arrow_size);
		}

		if let Some(label) = &edge.label {
			ctx.set_fill_style_str("rgba(255, 255, 255, 0.85)");
			ctx.set_font(&format!("{}px sans-serif", 11.0 / k.max(0.5)));
			ctx.set_text_align("center");
			ctx.set_text_baseline("bottom");
			let _ = ctx.fill_text(label, (sx + tx) / 2.0, (sy + ty) / 2.0 - 4.0 / k);
		}
	}
}

fn stroke_for(edge: &Edge, k: f64) -> f64 {
	let width = edge.stroke_width / k.max(0.5);
	if edge.selected { width * 1.5 } else { width }
}

fn draw_arrowhead(
	ctx: &CanvasRenderingContext2d,
	(tip_x, tip_y): (f64, f64),
	(ux, uy): (f64, f64),
	size: f64,
) {
	let (back_x, back_y) = (tip_x - ux * size, tip_y - uy * size);
	let (px, py) = (-uy * size * 0.5, ux * size * 0.5);
	ctx.begin_path();
	ctx.move_to(tip_x, tip_y);
	ctx.line_to(back_x + px, back_y + py);
	ctx.line_to(back_x - px, back_y - py);
	ctx.close_path();
	ctx.fill();
}

fn draw_connect_preview(state: &CanvasState, ctx: &CanvasRenderingContext2d) {
	let Some(source) = state
		.connect
		.source
		.as_deref()
		.and_then(|id| state.session.node(id))
	else {
		return;
	};
	let k = state.transform.k;
	let (x, y) = center(source);
	ctx.set_stroke_style_str("rgba(136, 136, 136, 0.9)");
	ctx.set_line_width(2.0 / k);
	let _ = ctx.set_line_dash(&js_sys::Array::of2(
		&JsValue::from_f64(4.0 / k),
		&JsValue::from_f64(4.0 / k),
	));
	ctx.begin_path();
	ctx.move_to(x, y);
	ctx.line_to(state.connect.cursor.x, state.connect.cursor.y);
	ctx.stroke();
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

fn draw_nodes(state: &CanvasState, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	ctx.set_font(&format!("{}px sans-serif", 13.0 / k.max(0.5)));
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");

	// the dragged node paints last so it stays on top
	let dragging = state.session.dragging_node();
	let nodes = state.session.nodes();
	let (held, resting): (Vec<&Node>, Vec<&Node>) =
		nodes.iter().partition(|n| Some(n.id.as_str()) == dragging);
	for node in resting.into_iter().chain(held) {
		let (x, y, w) = (node.position.x, node.position.y, node.visual_width);
		ctx.set_fill_style_str(NODE_FILL);
		ctx.fill_rect(x, y, w, NODE_HEIGHT);

		let (border, width) = if node.selected {
			(SELECTED_BORDER, 2.0 / k)
		} else {
			(NODE_BORDER, 1.0 / k)
		};
		ctx.set_stroke_style_str(border);
		ctx.set_line_width(width);
		ctx.stroke_rect(x, y, w, NODE_HEIGHT);

		ctx.set_fill_style_str("white");
		let (cx, cy) = center(node);
		let _ = ctx.fill_text(&node.label, cx, cy);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn border_distance_hits_nearest_side() {
		// horizontal ray exits through the left/right side
		assert_eq!(border_distance(75.0, 20.0, 1.0, 0.0), 75.0);
		// vertical ray exits through the top/bottom side
		assert_eq!(border_distance(75.0, 20.0, 0.0, -1.0), 20.0);
		let d = std::f64::consts::FRAC_1_SQRT_2;
		assert!((border_distance(75.0, 20.0, d, d) - 20.0 / d).abs() < 1e-9);
	}
}
