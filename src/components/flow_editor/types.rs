//! Core graph types for the flow editor.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_EDGE_COLOR: &str = "#999999";
pub const DEFAULT_EDGE_WIDTH: f64 = 3.0;
pub const SELECTED_EDGE_WIDTH: f64 = 6.0;

pub const GROUP_DEFAULT_SIZE: Size = Size::new(320.0, 200.0);
pub const GROUP_MIN_SIZE: Size = Size::new(150.0, 100.0);
pub const GROUP_DEFAULT_TITLE: &str = "그룹 타이틀명";

pub const PLACEHOLDER_COLUMN_NAME: &str = "컬럼명";
pub const PLACEHOLDER_COLUMN_TYPE: &str = "타입";

/// Height of the table title bar and the "add column" footer.
pub const TABLE_HEADER_HEIGHT: f64 = 40.0;
pub const TABLE_FOOTER_HEIGHT: f64 = 24.0;
pub const TABLE_ROW_HEIGHT: f64 = 28.0;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
	pub fn random() -> Self {
		Self(Uuid::new_v4().simple().to_string())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for NodeId {
	fn from(value: &str) -> Self {
		Self(value.to_owned())
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(pub String);

impl EdgeId {
	pub fn random() -> Self {
		Self(format!("edge-{}", Uuid::new_v4().simple()))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for EdgeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for EdgeId {
	fn from(value: &str) -> Self {
		Self(value.to_owned())
	}
}

/// A point in canvas coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	pub fn offset(self, dx: f64, dy: f64) -> Self {
		Self::new(self.x + dx, self.y + dy)
	}

	/// Vector from `origin` to `self`.
	pub fn delta_from(self, origin: Point) -> (f64, f64) {
		(self.x - origin.x, self.y - origin.y)
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
	pub width: f64,
	pub height: f64,
}

impl Size {
	pub const fn new(width: f64, height: f64) -> Self {
		Self { width, height }
	}

	/// Component-wise maximum with `min`.
	pub fn clamp_min(self, min: Size) -> Self {
		Self::new(self.width.max(min.width), self.height.max(min.height))
	}
}

/// One of the four fixed connection points on a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Port {
	Top,
	Bottom,
	Left,
	Right,
}

/// Whether a port starts or ends an edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PortRole {
	Source,
	Target,
}

impl Port {
	pub const ALL: [Port; 4] = [Port::Left, Port::Right, Port::Top, Port::Bottom];

	pub fn role(self) -> PortRole {
		match self {
			Port::Right | Port::Bottom => PortRole::Source,
			Port::Left | Port::Top => PortRole::Target,
		}
	}

	/// Parses a handle id, falling back to `right` for anything unknown.
	pub fn from_handle(handle: &str) -> Self {
		match handle {
			"top" => Port::Top,
			"bottom" => Port::Bottom,
			"left" => Port::Left,
			_ => Port::Right,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Port::Top => "top",
			Port::Bottom => "bottom",
			Port::Left => "left",
			Port::Right => "right",
		}
	}
}

/// The closed set of node kinds, tagged by their wire names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
	#[serde(rename = "square")]
	Shape,
	#[serde(rename = "condition")]
	Condition,
	#[serde(rename = "circle")]
	Circle,
	#[serde(rename = "table")]
	Table,
	#[serde(rename = "customGroup")]
	Group,
}

impl NodeKind {
	/// Toolbar order and button captions.
	pub const TOOLBAR: [(NodeKind, &'static str); 5] = [
		(NodeKind::Group, "그룹"),
		(NodeKind::Shape, "사각형"),
		(NodeKind::Condition, "조건"),
		(NodeKind::Table, "테이블"),
		(NodeKind::Circle, "원형"),
	];

	pub fn type_name(self) -> &'static str {
		match self {
			NodeKind::Shape => "square",
			NodeKind::Condition => "condition",
			NodeKind::Circle => "circle",
			NodeKind::Table => "table",
			NodeKind::Group => "customGroup",
		}
	}

	pub fn default_label(self) -> String {
		format!("{} 노드명", self.type_name())
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
	pub name: String,
	#[serde(rename = "type")]
	pub ty: String,
}

impl Column {
	pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			ty: ty.into(),
		}
	}

	pub fn placeholder() -> Self {
		Self::new(PLACEHOLDER_COLUMN_NAME, PLACEHOLDER_COLUMN_TYPE)
	}
}

/// Kind-specific payload of a node.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeBody {
	Shape,
	Condition,
	Circle,
	Table {
		columns: Vec<Column>,
	},
	Group {
		size: Size,
		/// Derived: ids of nodes whose parent is this group. Rebuilt by the store.
		children: Vec<NodeId>,
	},
}

impl NodeBody {
	pub fn fresh(kind: NodeKind) -> Self {
		match kind {
			NodeKind::Shape => NodeBody::Shape,
			NodeKind::Condition => NodeBody::Condition,
			NodeKind::Circle => NodeBody::Circle,
			NodeKind::Table => NodeBody::Table {
				columns: vec![Column::placeholder()],
			},
			NodeKind::Group => NodeBody::Group {
				size: GROUP_DEFAULT_SIZE,
				children: Vec::new(),
			},
		}
	}

	pub fn kind(&self) -> NodeKind {
		match self {
			NodeBody::Shape => NodeKind::Shape,
			NodeBody::Condition => NodeKind::Condition,
			NodeBody::Circle => NodeKind::Circle,
			NodeBody::Table { .. } => NodeKind::Table,
			NodeBody::Group { .. } => NodeKind::Group,
		}
	}
}

/// A positioned, typed graph vertex.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
	pub id: NodeId,
	/// Root-level canvas position, never relative to the parent group.
	pub position: Point,
	pub label: String,
	pub body: NodeBody,
	pub parent_group_id: Option<NodeId>,
	pub read_only: bool,
	pub selected: bool,
}

impl Node {
	pub fn new(kind: NodeKind, position: Point) -> Self {
		Self {
			id: NodeId::random(),
			position,
			label: kind.default_label(),
			body: NodeBody::fresh(kind),
			parent_group_id: None,
			read_only: false,
			selected: false,
		}
	}

	pub fn kind(&self) -> NodeKind {
		self.body.kind()
	}

	pub fn is_group(&self) -> bool {
		matches!(self.body, NodeBody::Group { .. })
	}

	/// Rendered size. Fixed per kind except groups and tables.
	pub fn size(&self) -> Size {
		match &self.body {
			NodeBody::Shape => Size::new(160.0, 80.0),
			NodeBody::Condition => Size::new(128.0, 128.0),
			NodeBody::Circle => Size::new(80.0, 80.0),
			NodeBody::Table { columns } => Size::new(
				256.0,
				TABLE_HEADER_HEIGHT + TABLE_FOOTER_HEIGHT + TABLE_ROW_HEIGHT * columns.len() as f64,
			),
			NodeBody::Group { size, .. } => *size,
		}
	}

	pub fn columns(&self) -> Option<&[Column]> {
		match &self.body {
			NodeBody::Table { columns } => Some(columns),
			_ => None,
		}
	}

	pub fn columns_mut(&mut self) -> Option<&mut Vec<Column>> {
		match &mut self.body {
			NodeBody::Table { columns } => Some(columns),
			_ => None,
		}
	}

	pub fn children(&self) -> &[NodeId] {
		match &self.body {
			NodeBody::Group { children, .. } => children,
			_ => &[],
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct EdgeStyle {
	pub stroke_color: String,
	pub stroke_width: f64,
}

impl Default for EdgeStyle {
	fn default() -> Self {
		Self {
			stroke_color: DEFAULT_EDGE_COLOR.to_owned(),
			stroke_width: DEFAULT_EDGE_WIDTH,
		}
	}
}

/// A directed connection between two node ports.
#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
	pub id: EdgeId,
	pub source: NodeId,
	pub source_port: Port,
	pub target: NodeId,
	pub target_port: Port,
	/// Orientation the curve leaves the source with.
	pub source_position: Port,
	pub target_position: Port,
	pub animated: bool,
	pub style: EdgeStyle,
	pub selected: bool,
}

impl Edge {
	pub fn touches(&self, node: &NodeId) -> bool {
		&self.source == node || &self.target == node
	}
}
