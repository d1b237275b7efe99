//! Pointer gesture tracking and the canvas view transform.
//!
//! Only one gesture is active at a time. A `begin_*` call while another
//! gesture is running is ignored and reports `false`.

use super::behaviors;
use super::geometry::Bounds;
use super::types::{NodeId, Point, Port, Size};

pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 10.0;
const FIT_PADDING: f64 = 40.0;

/// Pan offset `(x, y)` in screen pixels and zoom factor `k`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

impl ViewTransform {
	pub fn screen_to_graph(&self, screen: Point) -> Point {
		Point::new((screen.x - self.x) / self.k, (screen.y - self.y) / self.k)
	}

	/// Scales by `factor` keeping the graph point under `anchor` fixed.
	pub fn zoom_at(&mut self, anchor: Point, factor: f64) {
		let k = (self.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = k / self.k;
		self.x = anchor.x - (anchor.x - self.x) * ratio;
		self.y = anchor.y - (anchor.y - self.y) * ratio;
		self.k = k;
	}

	/// Frames `bounds` in a viewport of the given size. Never zooms past 1.
	pub fn fit(&mut self, bounds: Bounds, viewport: Size) {
		let width = bounds.width() + 2.0 * FIT_PADDING;
		let height = bounds.height() + 2.0 * FIT_PADDING;
		let k = (viewport.width / width)
			.min(viewport.height / height)
			.clamp(MIN_ZOOM, 1.0);
		let center = bounds.center();
		self.k = k;
		self.x = viewport.width / 2.0 - center.x * k;
		self.y = viewport.height / 2.0 - center.y * k;
	}

	pub fn css(&self) -> String {
		format!("translate({}px, {}px) scale({})", self.x, self.y, self.k)
	}
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum Gesture {
	#[default]
	Idle,
	DraggingNode {
		node: NodeId,
		pointer_start: Point,
		node_start: Point,
	},
	Resizing {
		node: NodeId,
		pointer_start: Point,
		size_start: Size,
	},
	Panning {
		pointer_start: Point,
		pan_start: Point,
	},
	Connecting {
		node: NodeId,
		port: Port,
		/// Graph-space end of the preview line.
		cursor: Point,
	},
	SortingColumn {
		node: NodeId,
		from: usize,
	},
}

/// Effect of a pointer move on the running gesture.
#[derive(Clone, Debug, PartialEq)]
pub enum GestureUpdate {
	MoveNode(NodeId, Point),
	ResizeGroup(NodeId, Size),
	Pan(Point),
	Preview(Point),
}

impl Gesture {
	pub fn is_idle(&self) -> bool {
		matches!(self, Gesture::Idle)
	}

	/// Enters `next` only from `Idle`.
	pub fn begin(&mut self, next: Gesture) -> bool {
		if !self.is_idle() {
			return false;
		}
		*self = next;
		true
	}

	/// Translates a pointer position (screen pixels) into the gesture's effect.
	pub fn update(&mut self, pointer: Point, view: &ViewTransform) -> Option<GestureUpdate> {
		match self {
			Gesture::Idle | Gesture::SortingColumn { .. } => None,
			Gesture::DraggingNode {
				node,
				pointer_start,
				node_start,
			} => {
				let (dx, dy) = pointer.delta_from(*pointer_start);
				Some(GestureUpdate::MoveNode(
					node.clone(),
					node_start.offset(dx / view.k, dy / view.k),
				))
			}
			Gesture::Resizing {
				node,
				pointer_start,
				size_start,
			} => {
				let (dx, dy) = pointer.delta_from(*pointer_start);
				Some(GestureUpdate::ResizeGroup(
					node.clone(),
					behaviors::resized(*size_start, dx / view.k, dy / view.k),
				))
			}
			Gesture::Panning {
				pointer_start,
				pan_start,
			} => {
				let (dx, dy) = pointer.delta_from(*pointer_start);
				Some(GestureUpdate::Pan(pan_start.offset(dx, dy)))
			}
			Gesture::Connecting { cursor, .. } => {
				*cursor = view.screen_to_graph(pointer);
				Some(GestureUpdate::Preview(*cursor))
			}
		}
	}

	/// Returns to `Idle`, handing back the gesture that was running.
	pub fn end(&mut self) -> Gesture {
		std::mem::take(self)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn second_begin_is_ignored_until_end() {
		let mut gesture = Gesture::default();
		let resize = Gesture::Resizing {
			node: NodeId::from("g"),
			pointer_start: Point::new(0.0, 0.0),
			size_start: Size::new(320.0, 200.0),
		};
		assert!(gesture.begin(resize.clone()));
		assert!(!gesture.begin(Gesture::Panning {
			pointer_start: Point::default(),
			pan_start: Point::default(),
		}));
		assert_eq!(gesture.end(), resize);
		assert!(gesture.is_idle());
	}

	#[test]
	fn drag_delta_is_scaled_by_zoom() {
		let mut gesture = Gesture::DraggingNode {
			node: NodeId::from("n"),
			pointer_start: Point::new(10.0, 10.0),
			node_start: Point::new(100.0, 100.0),
		};
		let view = ViewTransform {
			k: 2.0,
			..ViewTransform::default()
		};
		assert_eq!(
			gesture.update(Point::new(30.0, 50.0), &view),
			Some(GestureUpdate::MoveNode(
				NodeId::from("n"),
				Point::new(110.0, 120.0)
			))
		);
	}

	#[test]
	fn resize_follows_pointer_and_clamps() {
		let mut gesture = Gesture::Resizing {
			node: NodeId::from("g"),
			pointer_start: Point::new(0.0, 0.0),
			size_start: Size::new(320.0, 200.0),
		};
		let view = ViewTransform::default();
		assert_eq!(
			gesture.update(Point::new(-500.0, 40.0), &view),
			Some(GestureUpdate::ResizeGroup(
				NodeId::from("g"),
				Size::new(150.0, 240.0)
			))
		);
	}

	#[test]
	fn zoom_keeps_anchor_fixed_and_clamps() {
		let mut view = ViewTransform::default();
		let anchor = Point::new(200.0, 100.0);
		let before = view.screen_to_graph(anchor);
		view.zoom_at(anchor, 1.1);
		let after = view.screen_to_graph(anchor);
		assert!((before.x - after.x).abs() < 1e-9);
		assert!((before.y - after.y).abs() < 1e-9);

		view.zoom_at(anchor, 1000.0);
		assert_eq!(view.k, MAX_ZOOM);
	}

	#[test]
	fn fit_centers_bounds() {
		let mut view = ViewTransform::default();
		let bounds = Bounds::new(Point::new(0.0, 0.0), Size::new(100.0, 100.0));
		view.fit(bounds, Size::new(800.0, 600.0));
		assert_eq!(view.k, 1.0);
		assert_eq!(view.screen_to_graph(Point::new(400.0, 300.0)), Point::new(50.0, 50.0));
	}
}
