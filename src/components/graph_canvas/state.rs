use std::collections::{HashMap, HashSet};

use super::types::{EdgeStroke, GraphLayout, HandleSide};

pub const NODE_WIDTH: f64 = 220.0;
pub const NODE_HEIGHT: f64 = 36.0;
/// Margin kept around the layout when fitting it to the canvas.
const FIT_PADDING: f64 = 40.0;
const DEFAULT_FILL: &str = "#ffffff";
pub const MINIMAP_WIDTH: f64 = 200.0;
pub const MINIMAP_HEIGHT: f64 = 150.0;
const MINIMAP_MARGIN: f64 = 15.0;

/// Axis-aligned rectangle in graph space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
	pub min_x: f64,
	pub min_y: f64,
	pub max_x: f64,
	pub max_y: f64,
}

impl Bounds {
	pub fn width(&self) -> f64 {
		self.max_x - self.min_x
	}

	pub fn height(&self) -> f64 {
		self.max_y - self.min_y
	}

	pub fn union(&self, other: &Bounds) -> Bounds {
		Bounds {
			min_x: self.min_x.min(other.min_x),
			min_y: self.min_y.min(other.min_y),
			max_x: self.max_x.max(other.max_x),
			max_y: self.max_y.max(other.max_y),
		}
	}
}

/// Overview inset in the bottom-right corner, showing the scene and the viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Minimap {
	/// Screen-space frame of the inset.
	pub x: f64,
	pub y: f64,
	pub width: f64,
	pub height: f64,
	/// Screen pixels per graph unit inside the inset.
	pub scale: f64,
	/// Graph region shown, centred in the frame.
	pub world: Bounds,
}

impl Minimap {
	pub fn contains(&self, sx: f64, sy: f64) -> bool {
		sx >= self.x && sx <= self.x + self.width && sy >= self.y && sy <= self.y + self.height
	}

	fn pad(&self) -> (f64, f64) {
		(
			(self.width - self.world.width() * self.scale) / 2.0,
			(self.height - self.world.height() * self.scale) / 2.0,
		)
	}

	pub fn graph_to_minimap(&self, gx: f64, gy: f64) -> (f64, f64) {
		let (px, py) = self.pad();
		(
			self.x + px + (gx - self.world.min_x) * self.scale,
			self.y + py + (gy - self.world.min_y) * self.scale,
		)
	}

	pub fn minimap_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		let (px, py) = self.pad();
		(
			self.world.min_x + (sx - self.x - px) / self.scale,
			self.world.min_y + (sy - self.y - py) / self.scale,
		)
	}
}

#[derive(Clone, Debug)]
pub struct SceneNode {
	pub label: String,
	pub x: f64,
	pub y: f64,
	pub fill: &'static str,
	pub source_side: HandleSide,
	pub target_side: HandleSide,
}

impl SceneNode {
	pub fn contains(&self, gx: f64, gy: f64) -> bool {
		gx >= self.x && gx <= self.x + NODE_WIDTH && gy >= self.y && gy <= self.y + NODE_HEIGHT
	}

	/// Graph-space point where an edge attaches on `side`.
	pub fn handle(&self, side: HandleSide) -> (f64, f64) {
		let y = self.y + NODE_HEIGHT / 2.0;
		match side {
			HandleSide::Left => (self.x, y),
			HandleSide::Right => (self.x + NODE_WIDTH, y),
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SceneEdge {
	pub source: usize,
	pub target: usize,
	pub dashed: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node_idx: Option<usize>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f64,
	pub node_start_y: f64,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

#[derive(Clone, Debug, Default)]
pub struct HoverState {
	pub node: Option<usize>,
	pub neighbors: HashSet<usize>,
	pub highlight_t: f64,
	pub prev_node: Option<usize>,
	pub prev_neighbors: HashSet<usize>,
	delay_t: f64,
}

pub struct GraphCanvasState {
	pub nodes: Vec<SceneNode>,
	pub edges: Vec<SceneEdge>,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub hover: HoverState,
	pub width: f64,
	pub height: f64,
	pub flow_time: f64,
	/// Nodes cannot be dragged while locked; panning and zooming still work.
	pub locked: bool,
}

impl GraphCanvasState {
	pub fn new(layout: &GraphLayout, width: f64, height: f64) -> Self {
		let mut state = Self {
			nodes: Vec::new(),
			edges: Vec::new(),
			transform: ViewTransform {
				x: 0.0,
				y: 0.0,
				k: 1.0,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			hover: HoverState::default(),
			width,
			height,
			flow_time: 0.0,
			locked: false,
		};
		state.set_layout(layout);
		state
	}

	/// Replace the whole scene. Interaction state is reset and the view refitted.
	pub fn set_layout(&mut self, layout: &GraphLayout) {
		let mut id_to_idx = HashMap::new();
		self.nodes = layout
			.nodes
			.iter()
			.enumerate()
			.map(|(i, node)| {
				id_to_idx.insert(node.id.as_str(), i);
				SceneNode {
					label: node.label.clone(),
					x: node.position.x,
					y: node.position.y,
					fill: node.fill.map(|f| f.css()).unwrap_or(DEFAULT_FILL),
					source_side: node.source_side,
					target_side: node.target_side,
				}
			})
			.collect();

		self.edges = layout
			.edges
			.iter()
			.filter_map(|edge| {
				let source = *id_to_idx.get(edge.source.as_str())?;
				let target = *id_to_idx.get(edge.target.as_str())?;
				Some(SceneEdge {
					source,
					target,
					dashed: edge.stroke == EdgeStroke::Dashed,
				})
			})
			.collect();

		self.drag = DragState::default();
		self.pan = PanState::default();
		self.hover = HoverState::default();
		self.fit_view();
	}

	/// Centre the scene and zoom out until it fits, never zooming in past 1.
	pub fn fit_view(&mut self) {
		if self.nodes.is_empty() {
			self.transform = ViewTransform {
				x: self.width / 2.0,
				y: self.height / 2.0,
				k: 1.0,
			};
			return;
		}
		let Some(b) = self.scene_bounds() else {
			return;
		};
		let (bw, bh) = (b.width(), b.height());
		let k = ((self.width - 2.0 * FIT_PADDING) / bw)
			.min((self.height - 2.0 * FIT_PADDING) / bh)
			.clamp(0.1, 1.0);
		self.transform = ViewTransform {
			x: self.width / 2.0 - (b.min_x + bw / 2.0) * k,
			y: self.height / 2.0 - (b.min_y + bh / 2.0) * k,
			k,
		};
	}

	/// Box around every node, `None` for an empty scene.
	pub fn scene_bounds(&self) -> Option<Bounds> {
		let first = self.nodes.first()?;
		let start = Bounds {
			min_x: first.x,
			min_y: first.y,
			max_x: first.x + NODE_WIDTH,
			max_y: first.y + NODE_HEIGHT,
		};
		Some(self.nodes.iter().fold(start, |b, node| {
			b.union(&Bounds {
				min_x: node.x,
				min_y: node.y,
				max_x: node.x + NODE_WIDTH,
				max_y: node.y + NODE_HEIGHT,
			})
		}))
	}

	/// Graph-space region currently on screen.
	pub fn viewport_bounds(&self) -> Bounds {
		let (min_x, min_y) = self.screen_to_graph(0.0, 0.0);
		let (max_x, max_y) = self.screen_to_graph(self.width, self.height);
		Bounds {
			min_x,
			min_y,
			max_x,
			max_y,
		}
	}

	/// Inset covering both the scene and the viewport, or `None` when there is
	/// nothing to show or no room for it.
	pub fn minimap(&self) -> Option<Minimap> {
		let scene = self.scene_bounds()?;
		if self.width < MINIMAP_WIDTH + 2.0 * MINIMAP_MARGIN
			|| self.height < MINIMAP_HEIGHT + 2.0 * MINIMAP_MARGIN
		{
			return None;
		}
		let world = scene.union(&self.viewport_bounds());
		let scale = (MINIMAP_WIDTH / world.width()).min(MINIMAP_HEIGHT / world.height());
		Some(Minimap {
			x: self.width - MINIMAP_WIDTH - MINIMAP_MARGIN,
			y: self.height - MINIMAP_HEIGHT - MINIMAP_MARGIN,
			width: MINIMAP_WIDTH,
			height: MINIMAP_HEIGHT,
			scale,
			world,
		})
	}

	/// Pan so that a graph point sits in the middle of the canvas.
	pub fn center_on(&mut self, gx: f64, gy: f64) {
		self.transform.x = self.width / 2.0 - gx * self.transform.k;
		self.transform.y = self.height / 2.0 - gy * self.transform.k;
	}

	/// Zoom around the canvas centre, as the control buttons do.
	pub fn zoom_step(&mut self, zoom_in: bool) {
		self.zoom_at(self.width / 2.0, self.height / 2.0, zoom_in);
	}

	pub fn toggle_lock(&mut self) -> bool {
		self.locked = !self.locked;
		if self.locked {
			self.drag = DragState::default();
		}
		self.locked
	}

	/// Pointer pressed: the minimap recentres, a node starts dragging unless
	/// locked, anything else pans.
	pub fn press(&mut self, x: f64, y: f64) {
		if let Some(map) = self.minimap().filter(|m| m.contains(x, y)) {
			let (gx, gy) = map.minimap_to_graph(x, y);
			self.center_on(gx, gy);
			return;
		}
		match self.node_at_position(x, y) {
			Some(idx) if !self.locked => self.start_drag(idx, x, y),
			_ => self.start_pan(x, y),
		}
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// Topmost node under a screen point. Later nodes are drawn on top.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<usize> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		self.nodes.iter().rposition(|node| node.contains(gx, gy))
	}

	pub fn start_drag(&mut self, idx: usize, x: f64, y: f64) {
		let Some(node) = self.nodes.get(idx) else {
			return;
		};
		self.drag = DragState {
			active: true,
			node_idx: Some(idx),
			start_x: x,
			start_y: y,
			node_start_x: node.x,
			node_start_y: node.y,
		};
	}

	pub fn drag_to(&mut self, x: f64, y: f64) {
		let Some(idx) = self.drag.node_idx else {
			return;
		};
		let (dx, dy) = (
			(x - self.drag.start_x) / self.transform.k,
			(y - self.drag.start_y) / self.transform.k,
		);
		if let Some(node) = self.nodes.get_mut(idx) {
			node.x = self.drag.node_start_x + dx;
			node.y = self.drag.node_start_y + dy;
		}
	}

	pub fn start_pan(&mut self, x: f64, y: f64) {
		self.pan = PanState {
			active: true,
			start_x: x,
			start_y: y,
			transform_start_x: self.transform.x,
			transform_start_y: self.transform.y,
		};
	}

	pub fn pan_to(&mut self, x: f64, y: f64) {
		self.transform.x = self.pan.transform_start_x + (x - self.pan.start_x);
		self.transform.y = self.pan.transform_start_y + (y - self.pan.start_y);
	}

	pub fn end_gesture(&mut self) {
		self.drag.active = false;
		self.drag.node_idx = None;
		self.pan.active = false;
	}

	/// Zoom around a screen point, keeping that point fixed.
	pub fn zoom_at(&mut self, x: f64, y: f64, zoom_in: bool) {
		let factor = if zoom_in { 1.1 } else { 0.9 };
		let new_k = (self.transform.k * factor).clamp(0.1, 10.0);
		let ratio = new_k / self.transform.k;
		self.transform.x = x - (x - self.transform.x) * ratio;
		self.transform.y = y - (y - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	pub fn set_hover(&mut self, node: Option<usize>) {
		if self.hover.node == node {
			return;
		}
		let was_hovering = self.hover.node.is_some();

		// Save previous state for fade-out
		if was_hovering && node.is_none() {
			self.hover.prev_node = self.hover.node.take();
			self.hover.prev_neighbors = std::mem::take(&mut self.hover.neighbors);
		} else {
			self.hover.prev_node = None;
			self.hover.prev_neighbors.clear();
		}

		self.hover.node = node;
		self.hover.neighbors.clear();

		if let Some(idx) = node {
			if !was_hovering {
				self.hover.delay_t = 0.0;
			}
			for edge in &self.edges {
				if edge.source == idx {
					self.hover.neighbors.insert(edge.target);
				} else if edge.target == idx {
					self.hover.neighbors.insert(edge.source);
				}
			}
		}
	}

	pub fn is_highlighted(&self, idx: usize) -> bool {
		self.hover.node == Some(idx)
			|| self.hover.neighbors.contains(&idx)
			|| self.hover.prev_node == Some(idx)
			|| self.hover.prev_neighbors.contains(&idx)
	}

	pub fn is_hovered(&self, idx: usize) -> bool {
		self.hover.node == Some(idx) || self.hover.prev_node == Some(idx)
	}

	pub fn has_active_highlight(&self) -> bool {
		self.hover.node.is_some() || self.hover.prev_node.is_some()
	}

	/// Advance the hover fade and dash animation. Positions never move on their own.
	pub fn tick(&mut self, dt: f64) {
		self.flow_time += dt;

		let (target, delay, speed) = if self.hover.node.is_some() {
			(1.0, 0.08, 1.8)
		} else {
			(0.0, 0.0, 1.26)
		};

		if self.hover.node.is_some() {
			self.hover.delay_t = (self.hover.delay_t + dt).min(delay);
			if self.hover.delay_t >= delay {
				self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt;
			}
		} else {
			self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt;
			if self.hover.highlight_t < 0.01 {
				self.hover.highlight_t = 0.0;
				self.hover.prev_node = None;
				self.hover.prev_neighbors.clear();
			}
		}
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::graph_canvas::types::{GraphEdge, GraphNode, NodeFill};

	fn sample_layout() -> GraphLayout {
		GraphLayout {
			nodes: vec![
				GraphNode::new("center", "center", 600.0, 600.0),
				GraphNode::new("in", "in", 200.0, 600.0).with_fill(NodeFill::LightGreen),
				GraphNode::new("out", "out", 1000.0, 450.0).with_fill(NodeFill::Yellow),
			],
			edges: vec![
				GraphEdge {
					id: "in-center".into(),
					source: "in".into(),
					target: "center".into(),
					stroke: EdgeStroke::Solid,
				},
				GraphEdge {
					id: "out-center".into(),
					source: "center".into(),
					target: "out".into(),
					stroke: EdgeStroke::Dashed,
				},
				GraphEdge {
					id: "ghost-center".into(),
					source: "ghost".into(),
					target: "center".into(),
					stroke: EdgeStroke::Solid,
				},
			],
		}
	}

	fn identity(state: &mut GraphCanvasState) {
		state.transform = ViewTransform {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		};
	}

	#[test]
	fn scene_mirrors_layout() {
		let state = GraphCanvasState::new(&sample_layout(), 1200.0, 800.0);
		assert_eq!(state.nodes.len(), 3);
		assert_eq!(state.nodes[0].fill, DEFAULT_FILL);
		assert_eq!(state.nodes[1].fill, "lightgreen");
		assert_eq!(
			state.edges,
			vec![
				SceneEdge {
					source: 1,
					target: 0,
					dashed: false
				},
				SceneEdge {
					source: 0,
					target: 2,
					dashed: true
				},
			]
		);
	}

	#[test]
	fn handles_sit_on_box_sides() {
		let state = GraphCanvasState::new(&sample_layout(), 1200.0, 800.0);
		let node = &state.nodes[1];
		assert_eq!(node.handle(HandleSide::Right), (200.0 + NODE_WIDTH, 600.0 + NODE_HEIGHT / 2.0));
		assert_eq!(node.handle(HandleSide::Left), (200.0, 600.0 + NODE_HEIGHT / 2.0));
	}

	#[test]
	fn fit_view_keeps_scene_on_screen() {
		let state = GraphCanvasState::new(&sample_layout(), 1200.0, 800.0);
		assert!(state.transform.k <= 1.0 && state.transform.k > 0.1);
		for node in &state.nodes {
			let sx = state.transform.x + node.x * state.transform.k;
			let sy = state.transform.y + node.y * state.transform.k;
			assert!(sx >= 0.0 && sx <= state.width, "{} off screen", node.label);
			assert!(sy >= 0.0 && sy <= state.height, "{} off screen", node.label);
		}
	}

	#[test]
	fn hit_test_uses_boxes() {
		let mut state = GraphCanvasState::new(&sample_layout(), 1200.0, 800.0);
		identity(&mut state);
		assert_eq!(state.node_at_position(610.0, 610.0), Some(0));
		assert_eq!(state.node_at_position(1000.0 + NODE_WIDTH - 1.0, 451.0), Some(2));
		assert_eq!(state.node_at_position(500.0, 500.0), None);
	}

	#[test]
	fn drag_moves_node_in_graph_space() {
		let mut state = GraphCanvasState::new(&sample_layout(), 1200.0, 800.0);
		identity(&mut state);
		state.transform.k = 2.0;
		state.start_drag(1, 100.0, 100.0);
		state.drag_to(140.0, 80.0);
		assert_eq!((state.nodes[1].x, state.nodes[1].y), (220.0, 590.0));
		state.end_gesture();
		assert!(!state.drag.active);
		assert_eq!(state.drag.node_idx, None);
	}

	#[test]
	fn zoom_keeps_cursor_point_fixed() {
		let mut state = GraphCanvasState::new(&sample_layout(), 1200.0, 800.0);
		let before = state.screen_to_graph(300.0, 200.0);
		state.zoom_at(300.0, 200.0, true);
		let after = state.screen_to_graph(300.0, 200.0);
		assert!((before.0 - after.0).abs() < 1e-9);
		assert!((before.1 - after.1).abs() < 1e-9);
	}

	#[test]
	fn hover_collects_neighbors_and_fades_out() {
		let mut state = GraphCanvasState::new(&sample_layout(), 1200.0, 800.0);
		state.set_hover(Some(0));
		assert_eq!(state.hover.neighbors, HashSet::from([1, 2]));
		assert!(state.is_highlighted(2));

		state.set_hover(None);
		assert_eq!(state.hover.prev_node, Some(0));
		assert!(state.has_active_highlight());
		for _ in 0..1000 {
			state.tick(0.016);
		}
		assert!(!state.has_active_highlight());
	}

	#[test]
	fn fit_view_restores_transform_after_pan_and_zoom() {
		let mut state = GraphCanvasState::new(&sample_layout(), 1200.0, 800.0);
		let fitted = state.transform.clone();

		state.start_pan(100.0, 100.0);
		state.pan_to(-400.0, 350.0);
		state.end_gesture();
		state.zoom_step(false);
		state.zoom_step(false);
		assert_ne!(state.transform, fitted);

		state.fit_view();
		assert_eq!(state.transform, fitted);
	}

	#[test]
	fn zoom_step_keeps_canvas_centre_fixed() {
		let mut state = GraphCanvasState::new(&sample_layout(), 1200.0, 800.0);
		let before = state.screen_to_graph(600.0, 400.0);
		state.zoom_step(true);
		let after = state.screen_to_graph(600.0, 400.0);
		assert!((before.0 - after.0).abs() < 1e-9);
		assert!((before.1 - after.1).abs() < 1e-9);
		assert!(state.transform.k > 1.0);
	}

	#[test]
	fn minimap_sits_in_bottom_right_and_maps_both_ways() {
		let state = GraphCanvasState::new(&sample_layout(), 1200.0, 800.0);
		let map = state.minimap().unwrap();
		assert_eq!(map.x, 1200.0 - MINIMAP_WIDTH - MINIMAP_MARGIN);
		assert_eq!(map.y, 800.0 - MINIMAP_HEIGHT - MINIMAP_MARGIN);

		for node in &state.nodes {
			let (mx, my) = map.graph_to_minimap(node.x, node.y);
			assert!(map.contains(mx, my), "{} outside minimap", node.label);
			let (gx, gy) = map.minimap_to_graph(mx, my);
			assert!((gx - node.x).abs() < 1e-9);
			assert!((gy - node.y).abs() < 1e-9);
		}

		let view = state.viewport_bounds();
		let (vx0, vy0) = map.graph_to_minimap(view.min_x, view.min_y);
		let (vx1, vy1) = map.graph_to_minimap(view.max_x, view.max_y);
		let eps = 1e-6;
		assert!(vx0 >= map.x - eps && vy0 >= map.y - eps);
		assert!(vx1 <= map.x + map.width + eps && vy1 <= map.y + map.height + eps);
	}

	#[test]
	fn viewport_bounds_follow_pan_and_zoom() {
		let mut state = GraphCanvasState::new(&sample_layout(), 1200.0, 800.0);
		state.transform = ViewTransform {
			x: 100.0,
			y: 50.0,
			k: 2.0,
		};
		let view = state.viewport_bounds();
		assert_eq!((view.min_x, view.min_y), (-50.0, -25.0));
		assert_eq!((view.max_x, view.max_y), (550.0, 375.0));
		assert_eq!((view.width(), view.height()), (600.0, 400.0));
	}

	#[test]
	fn minimap_grows_to_include_a_panned_away_viewport() {
		let mut state = GraphCanvasState::new(&sample_layout(), 1200.0, 800.0);
		state.center_on(10_000.0, 10_000.0);
		let map = state.minimap().unwrap();
		assert!(map.world.max_x > 10_000.0);
		assert!(map.world.min_x <= 200.0);
	}

	#[test]
	fn no_minimap_for_tiny_canvas_or_empty_scene() {
		assert!(GraphCanvasState::new(&sample_layout(), 150.0, 100.0).minimap().is_none());
		assert!(GraphCanvasState::new(&GraphLayout::default(), 1200.0, 800.0).minimap().is_none());
	}

	#[test]
	fn pressing_minimap_recentres_view() {
		let mut state = GraphCanvasState::new(&sample_layout(), 1200.0, 800.0);
		let map = state.minimap().unwrap();
		let (sx, sy) = map.graph_to_minimap(1000.0, 450.0);
		state.press(sx, sy);

		assert!(!state.drag.active && !state.pan.active);
		let (cx, cy) = state.screen_to_graph(600.0, 400.0);
		assert!((cx - 1000.0).abs() < 1e-6);
		assert!((cy - 450.0).abs() < 1e-6);
	}

	#[test]
	fn lock_turns_node_press_into_pan() {
		let mut state = GraphCanvasState::new(&sample_layout(), 1200.0, 800.0);
		identity(&mut state);
		state.press(610.0, 610.0);
		assert_eq!(state.drag.node_idx, Some(0));
		state.end_gesture();

		assert!(state.toggle_lock());
		state.press(610.0, 610.0);
		assert!(!state.drag.active);
		assert!(state.pan.active);
		state.end_gesture();

		assert!(!state.toggle_lock());
	}

	#[test]
	fn set_layout_replaces_scene() {
		let mut state = GraphCanvasState::new(&sample_layout(), 1200.0, 800.0);
		state.set_hover(Some(1));
		state.set_layout(&GraphLayout {
			nodes: vec![GraphNode::new("solo", "solo", 0.0, 0.0)],
			edges: Vec::new(),
		});
		assert_eq!(state.nodes.len(), 1);
		assert!(state.edges.is_empty());
		assert_eq!(state.hover.node, None);
	}
}
