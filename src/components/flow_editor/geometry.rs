//! Containment and bounding-box helpers. Pure functions, no state.

use super::types::{Node, NodeId, Point, Size};

/// Axis-aligned box `[x, x + width] × [y, y + height]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
	pub min: Point,
	pub max: Point,
}

impl Bounds {
	pub fn new(origin: Point, size: Size) -> Self {
		Self {
			min: origin,
			max: origin.offset(size.width, size.height),
		}
	}

	pub fn of(node: &Node) -> Self {
		Self::new(node.position, node.size())
	}

	/// Closed-interval test: points on the border are inside.
	pub fn contains(&self, p: Point) -> bool {
		p.x >= self.min.x && p.y >= self.min.y && p.x <= self.max.x && p.y <= self.max.y
	}

	pub fn union(self, other: Bounds) -> Self {
		Self {
			min: Point::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
			max: Point::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
		}
	}

	pub fn width(&self) -> f64 {
		self.max.x - self.min.x
	}

	pub fn height(&self) -> f64 {
		self.max.y - self.min.y
	}

	pub fn center(&self) -> Point {
		Point::new(
			(self.min.x + self.max.x) / 2.0,
			(self.min.y + self.max.y) / 2.0,
		)
	}
}

/// Returns the first group whose box contains `point`.
///
/// Non-group nodes in `nodes` are skipped, so the whole node list can be passed.
pub fn locate<'a, I>(point: Point, nodes: I) -> Option<&'a NodeId>
where
	I: IntoIterator<Item = &'a Node>,
{
	nodes
		.into_iter()
		.filter(|n| n.is_group())
		.find(|g| Bounds::of(g).contains(point))
		.map(|g| &g.id)
}

/// Smallest box around every node, `None` for an empty graph.
pub fn bounds_of_all<'a, I>(nodes: I) -> Option<Bounds>
where
	I: IntoIterator<Item = &'a Node>,
{
	nodes.into_iter().map(Bounds::of).reduce(Bounds::union)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::flow_editor::types::{NodeBody, NodeKind};

	fn group_at(x: f64, y: f64, w: f64, h: f64) -> Node {
		let mut node = Node::new(NodeKind::Group, Point::new(x, y));
		node.body = NodeBody::Group {
			size: Size::new(w, h),
			children: Vec::new(),
		};
		node
	}

	#[test]
	fn locate_finds_enclosing_group() {
		let group = group_at(100.0, 100.0, 320.0, 200.0);
		let nodes = vec![group.clone()];
		assert_eq!(locate(Point::new(150.0, 150.0), &nodes), Some(&group.id));
		assert_eq!(locate(Point::new(1000.0, 1000.0), &nodes), None);
	}

	#[test]
	fn border_counts_as_inside() {
		let nodes = vec![group_at(0.0, 0.0, 10.0, 10.0)];
		assert!(locate(Point::new(10.0, 10.0), &nodes).is_some());
		assert!(locate(Point::new(0.0, 0.0), &nodes).is_some());
		assert!(locate(Point::new(10.01, 5.0), &nodes).is_none());
	}

	#[test]
	fn first_group_wins_on_overlap() {
		let a = group_at(0.0, 0.0, 100.0, 100.0);
		let b = group_at(50.0, 50.0, 100.0, 100.0);
		let nodes = vec![a.clone(), b];
		assert_eq!(locate(Point::new(60.0, 60.0), &nodes), Some(&a.id));
	}

	#[test]
	fn plain_nodes_are_never_containers() {
		let square = Node::new(NodeKind::Shape, Point::new(0.0, 0.0));
		assert_eq!(locate(Point::new(5.0, 5.0), [&square]), None);
	}

	#[test]
	fn bounds_of_all_spans_every_node() {
		let nodes = vec![
			group_at(0.0, 0.0, 10.0, 10.0),
			group_at(100.0, 50.0, 20.0, 20.0),
		];
		let b = bounds_of_all(&nodes).unwrap();
		assert_eq!(b.min, Point::new(0.0, 0.0));
		assert_eq!(b.max, Point::new(120.0, 70.0));
		assert!(bounds_of_all(&Vec::<Node>::new()).is_none());
	}
}
