use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasPattern, CanvasRenderingContext2d, HtmlCanvasElement};

use super::state::{GraphCanvasState, NODE_HEIGHT, NODE_WIDTH, SceneNode};

const BACKGROUND: &str = "#1a1a2e";
const GRID_GAP: f64 = 12.0;
const GRID_DOT: f64 = 1.0;
const GRID_COLOUR: &str = "rgba(255, 255, 255, 0.12)";

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

/// One grid cell with a dot in its corner, for tiling the background.
pub fn grid_pattern(ctx: &CanvasRenderingContext2d) -> Option<CanvasPattern> {
	let document = web_sys::window()?.document()?;
	let tile: HtmlCanvasElement = document.create_element("canvas").ok()?.dyn_into().ok()?;
	tile.set_width(GRID_GAP as u32);
	tile.set_height(GRID_GAP as u32);
	let tile_ctx: CanvasRenderingContext2d = tile.get_context("2d").ok()??.dyn_into().ok()?;
	tile_ctx.set_fill_style_str(GRID_COLOUR);
	tile_ctx.fill_rect(0.0, 0.0, GRID_DOT, GRID_DOT);
	ctx.create_pattern_with_html_canvas_element(&tile, "repeat").ok()?
}

pub fn render(
	state: &GraphCanvasState,
	ctx: &CanvasRenderingContext2d,
	grid: Option<&CanvasPattern>,
) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	if let Some(grid) = grid {
		draw_grid(state, ctx, grid);
	}
	draw_edges(state, ctx);
	draw_nodes(state, ctx);
	ctx.restore();
	draw_minimap(state, ctx);
}

/// Dotted background over the visible region, skipped when dots would merge.
/// The pattern is filled under the view transform, so dots stay pinned to
/// graph coordinates.
fn draw_grid(state: &GraphCanvasState, ctx: &CanvasRenderingContext2d, grid: &CanvasPattern) {
	if GRID_GAP * state.transform.k < 4.0 {
		return;
	}
	let view = state.viewport_bounds();
	#[allow(deprecated)]
	ctx.set_fill_style(grid);
	ctx.fill_rect(view.min_x, view.min_y, view.width(), view.height());
}

/// Scene overview with the visible region outlined. Drawn in screen space.
fn draw_minimap(state: &GraphCanvasState, ctx: &CanvasRenderingContext2d) {
	let Some(map) = state.minimap() else {
		return;
	};
	ctx.set_fill_style_str("rgba(255, 255, 255, 0.08)");
	ctx.fill_rect(map.x, map.y, map.width, map.height);
	ctx.set_stroke_style_str("rgba(255, 255, 255, 0.25)");
	ctx.set_line_width(1.0);
	ctx.stroke_rect(map.x, map.y, map.width, map.height);

	for node in &state.nodes {
		let (x, y) = map.graph_to_minimap(node.x, node.y);
		ctx.set_fill_style_str(node.fill);
		ctx.fill_rect(x, y, (NODE_WIDTH * map.scale).max(1.0), (NODE_HEIGHT * map.scale).max(1.0));
	}

	let view = state.viewport_bounds();
	let (vx, vy) = map.graph_to_minimap(view.min_x, view.min_y);
	ctx.set_stroke_style_str("rgba(100, 180, 255, 0.9)");
	ctx.stroke_rect(vx, vy, view.width() * map.scale, view.height() * map.scale);
}

fn draw_edges(state: &GraphCanvasState, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	let (line_width, dash, gap, arrow_size) = (1.5 / k.max(0.5), 5.0, 5.0, 8.0);
	let dash_offset = -(state.flow_time * 30.0) % (dash + gap);
	let t = ease_out_cubic(state.hover.highlight_t);

	for edge in &state.edges {
		let (Some(src), Some(tgt)) = (state.nodes.get(edge.source), state.nodes.get(edge.target))
		else {
			continue;
		};
		let (x1, y1) = src.handle(src.source_side);
		let (x2, y2) = tgt.handle(tgt.target_side);

		let is_highlighted = state.is_highlighted(edge.source) && state.is_highlighted(edge.target);

		// t=0: all edges at base (0.6), t=1: highlighted at 0.9, others at 0.15
		let (edge_alpha, width) = if is_highlighted {
			(0.6 + 0.3 * t, line_width * (1.0 + 0.3 * t))
		} else {
			(0.6 - 0.45 * t, line_width * (1.0 - 0.3 * t))
		};
		let colour = format!("rgba(177, 177, 183, {})", edge_alpha);

		ctx.set_stroke_style_str(&colour);
		ctx.set_line_width(width);
		if edge.dashed {
			let _ = ctx.set_line_dash(&js_sys::Array::of2(
				&JsValue::from_f64(dash),
				&JsValue::from_f64(gap),
			));
			ctx.set_line_dash_offset(dash_offset);
		} else {
			let _ = ctx.set_line_dash(&js_sys::Array::new());
		}

		// Horizontal bezier from the right handle to the left handle.
		let bend = ((x2 - x1).abs() / 2.0).max(40.0);
		ctx.begin_path();
		ctx.move_to(x1, y1);
		ctx.bezier_curve_to(x1 + bend, y1, x2 - bend - arrow_size, y2, x2 - arrow_size, y2);
		ctx.stroke();

		let _ = ctx.set_line_dash(&js_sys::Array::new());
		ctx.set_fill_style_str(&colour);
		ctx.begin_path();
		ctx.move_to(x2, y2);
		ctx.line_to(x2 - arrow_size, y2 - arrow_size * 0.5);
		ctx.line_to(x2 - arrow_size, y2 + arrow_size * 0.5);
		ctx.close_path();
		ctx.fill();
	}
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

fn draw_nodes(state: &GraphCanvasState, ctx: &CanvasRenderingContext2d) {
	let (has_highlight, t) = (
		state.has_active_highlight(),
		ease_out_cubic(state.hover.highlight_t),
	);

	for (idx, node) in state.nodes.iter().enumerate() {
		let alpha = if has_highlight && !state.is_highlighted(idx) {
			1.0 - 0.7 * t
		} else {
			1.0
		};
		ctx.set_global_alpha(alpha);
		draw_box(node, ctx, state.is_hovered(idx) && t > 0.01, t);
		ctx.set_global_alpha(1.0);
	}
}

fn draw_box(node: &SceneNode, ctx: &CanvasRenderingContext2d, hovered: bool, t: f64) {
	ctx.set_fill_style_str(node.fill);
	ctx.fill_rect(node.x, node.y, NODE_WIDTH, NODE_HEIGHT);

	if hovered {
		ctx.set_stroke_style_str(&format!("rgba(255, 255, 255, {})", 0.7 * t));
		ctx.set_line_width(2.0);
	} else {
		ctx.set_stroke_style_str("#1a192b");
		ctx.set_line_width(1.0);
	}
	ctx.stroke_rect(node.x, node.y, NODE_WIDTH, NODE_HEIGHT);

	ctx.set_fill_style_str("#222222");
	ctx.set_font("9px monospace");
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	let _ = ctx.fill_text_with_max_width(
		&node.label,
		node.x + NODE_WIDTH / 2.0,
		node.y + NODE_HEIGHT / 2.0,
		NODE_WIDTH - 8.0,
	);
}
