use super::types::{Edge, Node, Point, Port};

const MIN_CONTROL_OFFSET: f64 = 25.0;
const CURVATURE: f64 = 0.5;

/// Canvas position of a port on the node's bounding box.
pub fn port_anchor(node: &Node, port: Port) -> Point {
	let size = node.size();
	let p = node.position;
	match port {
		Port::Left => p.offset(0.0, size.height / 2.0),
		Port::Right => p.offset(size.width, size.height / 2.0),
		Port::Top => p.offset(size.width / 2.0, 0.0),
		Port::Bottom => p.offset(size.width / 2.0, size.height),
	}
}

fn control_point(from: Point, towards: Port, distance: f64) -> Point {
	let offset = (distance * CURVATURE).max(MIN_CONTROL_OFFSET);
	match towards {
		Port::Left => from.offset(-offset, 0.0),
		Port::Right => from.offset(offset, 0.0),
		Port::Top => from.offset(0.0, -offset),
		Port::Bottom => from.offset(0.0, offset),
	}
}

/// Cubic bezier SVG path leaving `from` along `from_side` and entering `to` along `to_side`.
pub fn bezier_path(from: Point, from_side: Port, to: Point, to_side: Port) -> String {
	let (dx, dy) = to.delta_from(from);
	let distance = (dx * dx + dy * dy).sqrt();
	let c1 = control_point(from, from_side, distance);
	let c2 = control_point(to, to_side, distance);
	format!(
		"M {},{} C {},{} {},{} {},{}",
		from.x, from.y, c1.x, c1.y, c2.x, c2.y, to.x, to.y
	)
}

/// Path for a stored edge, `None` if an endpoint is missing from `nodes`.
pub fn edge_path(edge: &Edge, nodes: &[Node]) -> Option<String> {
	let source = nodes.iter().find(|n| n.id == edge.source)?;
	let target = nodes.iter().find(|n| n.id == edge.target)?;
	Some(bezier_path(
		port_anchor(source, edge.source_port),
		edge.source_position,
		port_anchor(target, edge.target_port),
		edge.target_position,
	))
}

/// Dashed preview shown while a connection is being dragged.
pub fn preview_path(node: &Node, port: Port, cursor: Point) -> String {
	let from = port_anchor(node, port);
	let back = match port {
		Port::Left => Port::Right,
		Port::Right => Port::Left,
		Port::Top => Port::Bottom,
		Port::Bottom => Port::Top,
	};
	bezier_path(from, port, cursor, back)
}
