use std::collections::HashSet;
use std::f64::consts::PI;

use log::{debug, warn};

use super::geometry;
use super::serialize::{self, FlowDocument};
use super::types::{Column, Edge, EdgeId, GROUP_MIN_SIZE, Node, NodeBody, NodeId, NodeKind, Point, Size};

/// Where freshly created nodes are fanned out around.
const PLACEMENT_CENTER: Point = Point::new(300.0, 200.0);
const PLACEMENT_RADIUS: f64 = 150.0;
const PLACEMENT_SLOTS: usize = 8;

/// Partial update for [`GraphStore::update_node`]. `None` fields are left alone.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodePatch {
	pub label: Option<String>,
	/// Ignored for nodes that are not tables.
	pub columns: Option<Vec<Column>>,
}

impl NodePatch {
	pub fn label(text: impl Into<String>) -> Self {
		Self {
			label: Some(text.into()),
			..Self::default()
		}
	}

	pub fn columns(columns: Vec<Column>) -> Self {
		Self {
			columns: Some(columns),
			..Self::default()
		}
	}
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum Selection {
	#[default]
	None,
	Node(NodeId),
	Edge(EdgeId),
}

/// Canonical owner of nodes and edges. Every mutation passes through here.
///
/// Nodes keep insertion order with groups in front so they render beneath
/// their children.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphStore {
	nodes: Vec<Node>,
	pub(super) edges: Vec<Edge>,
	read_only: bool,
	created: usize,
}

impl GraphStore {
	pub fn new(read_only: bool) -> Self {
		Self {
			read_only,
			..Self::default()
		}
	}

	pub fn read_only(&self) -> bool {
		self.read_only
	}

	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	pub fn edges(&self) -> &[Edge] {
		&self.edges
	}

	pub fn node(&self, id: &NodeId) -> Option<&Node> {
		self.nodes.iter().find(|n| &n.id == id)
	}

	fn node_mut(&mut self, id: &NodeId) -> Option<&mut Node> {
		self.nodes.iter_mut().find(|n| &n.id == id)
	}

	pub fn edge(&self, id: &EdgeId) -> Option<&Edge> {
		self.edges.iter().find(|e| &e.id == id)
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty() && self.edges.is_empty()
	}

	/// Read-only graphs refuse every user edit. Loading and clearing still work.
	pub(super) fn writable(&self, action: &str) -> bool {
		if self.read_only {
			debug!("read-only graph ignored {action}");
		}
		!self.read_only
	}

	/// Creates a node of `kind` at the next free placement slot.
	pub fn add_node(&mut self, kind: NodeKind) -> Option<NodeId> {
		let position = self.next_placement();
		self.add_node_at(kind, position)
	}

	pub fn add_node_at(&mut self, kind: NodeKind, position: Point) -> Option<NodeId> {
		if !self.writable("add node") {
			return None;
		}
		let mut node = Node::new(kind, position);
		node.read_only = self.read_only;
		let id = node.id.clone();
		self.created += 1;
		if node.is_group() {
			self.nodes.insert(0, node);
		} else {
			self.nodes.push(node);
		}
		debug!("added {} node {}", kind.type_name(), id);
		self.refresh_children();
		Some(id)
	}

	fn next_placement(&self) -> Point {
		let slot = self.created % PLACEMENT_SLOTS;
		let ring = (self.created / PLACEMENT_SLOTS) as f64;
		let angle = slot as f64 * 2.0 * PI / PLACEMENT_SLOTS as f64;
		let radius = PLACEMENT_RADIUS + 40.0 * ring;
		PLACEMENT_CENTER.offset(radius * angle.cos(), radius * angle.sin())
	}

	/// Applies `patch` to the node. Unknown ids are ignored.
	pub fn update_node(&mut self, id: &NodeId, patch: NodePatch) {
		if !self.writable("node update") {
			return;
		}
		let Some(node) = self.node_mut(id) else {
			debug!("update for unknown node {id} ignored");
			return;
		};
		if let Some(label) = patch.label {
			node.label = label;
		}
		if let Some(columns) = patch.columns {
			match node.columns_mut() {
				Some(existing) => *existing = columns,
				None => debug!("columns patch on non-table node {id} ignored"),
			}
		}
	}

	/// Removes a node with its incident edges. A group's children are orphaned.
	pub fn remove_node(&mut self, id: &NodeId) {
		if !self.writable("node removal") {
			return;
		}
		let Some(index) = self.nodes.iter().position(|n| &n.id == id) else {
			return;
		};
		let removed = self.nodes.remove(index);
		if removed.is_group() {
			for node in &mut self.nodes {
				if node.parent_group_id.as_ref() == Some(id) {
					node.parent_group_id = None;
				}
			}
		}
		self.edges.retain(|e| !e.touches(id));
		debug!("removed {} node {}", removed.kind().type_name(), id);
		self.refresh_children();
	}

	/// Moves a node and keeps group membership consistent with geometry.
	///
	/// Groups carry their children rigidly; any other node is re-classified
	/// against the current group boxes.
	pub fn move_node(&mut self, id: &NodeId, position: Point) {
		if !self.writable("node move") {
			return;
		}
		let Some(node) = self.node_mut(id) else {
			return;
		};
		let (dx, dy) = position.delta_from(node.position);
		node.position = position;

		if node.is_group() {
			for child in &mut self.nodes {
				if child.parent_group_id.as_ref() == Some(id) {
					child.position = child.position.offset(dx, dy);
				}
			}
		} else {
			let found = geometry::locate(position, &self.nodes).cloned();
			if let Some(node) = self.node_mut(id) {
				if node.parent_group_id != found {
					debug!(
						"node {} membership {:?} -> {:?}",
						id, node.parent_group_id, found
					);
					node.parent_group_id = found;
				}
			}
		}
		self.refresh_children();
	}

	/// Sets a group's size, clamped to the minimum. Membership is not re-evaluated.
	pub fn resize_group(&mut self, id: &NodeId, size: Size) {
		if !self.writable("group resize") {
			return;
		}
		let Some(node) = self.node_mut(id) else {
			return;
		};
		if let NodeBody::Group { size: current, .. } = &mut node.body {
			*current = size.clamp_min(GROUP_MIN_SIZE);
		}
	}

	pub fn set_selection(&mut self, selection: &Selection) {
		for node in &mut self.nodes {
			node.selected = matches!(selection, Selection::Node(id) if id == &node.id);
		}
		for edge in &mut self.edges {
			edge.selected = matches!(selection, Selection::Edge(id) if id == &edge.id);
		}
	}

	pub fn selection(&self) -> Selection {
		if let Some(node) = self.nodes.iter().find(|n| n.selected) {
			return Selection::Node(node.id.clone());
		}
		if let Some(edge) = self.edges.iter().find(|e| e.selected) {
			return Selection::Edge(edge.id.clone());
		}
		Selection::None
	}

	pub fn clear(&mut self) {
		self.nodes.clear();
		self.edges.clear();
		self.created = 0;
	}

	pub fn to_snapshot(&self) -> FlowDocument {
		serialize::serialize(self)
	}

	/// Replaces the whole graph with the document's contents.
	pub fn load_snapshot(&mut self, doc: &FlowDocument) {
		let (nodes, edges) = serialize::deserialize(doc, self.read_only);
		self.replace(nodes, edges);
	}

	pub(super) fn replace(&mut self, nodes: Vec<Node>, edges: Vec<Edge>) {
		self.nodes = nodes;
		self.edges = edges;
		self.created = self.nodes.len();
		self.repair_membership();
		self.refresh_children();
	}

	/// Nulls parent references that do not point at an existing group.
	fn repair_membership(&mut self) {
		let groups: HashSet<NodeId> = self
			.nodes
			.iter()
			.filter(|n| n.is_group())
			.map(|n| n.id.clone())
			.collect();
		for node in &mut self.nodes {
			let dangling = match &node.parent_group_id {
				Some(parent) => node.is_group() || !groups.contains(parent),
				None => false,
			};
			if dangling {
				warn!(
					"node {} had invalid parent group {:?}, detached",
					node.id, node.parent_group_id
				);
				node.parent_group_id = None;
			}
		}
	}

	/// Rebuilds every group's derived `children` list.
	fn refresh_children(&mut self) {
		let memberships: Vec<(NodeId, NodeId)> = self
			.nodes
			.iter()
			.filter_map(|n| n.parent_group_id.clone().map(|p| (p, n.id.clone())))
			.collect();
		for node in &mut self.nodes {
			let group_id = node.id.clone();
			if let NodeBody::Group { children, .. } = &mut node.body {
				*children = memberships
					.iter()
					.filter(|(parent, _)| parent == &group_id)
					.map(|(_, child)| child.clone())
					.collect();
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::components::flow_editor::types::{NodeKind, Port};

	fn store_with_group() -> (GraphStore, NodeId) {
		let mut store = GraphStore::new(false);
		let group = store.add_node_at(NodeKind::Group, Point::new(100.0, 100.0)).unwrap();
		store.resize_group(&group, Size::new(320.0, 200.0));
		(store, group)
	}

	#[test]
	fn groups_are_prepended_and_others_appended() {
		let mut store = GraphStore::new(false);
		let a = store.add_node(NodeKind::Shape).unwrap();
		let g = store.add_node(NodeKind::Group).unwrap();
		let b = store.add_node(NodeKind::Circle).unwrap();
		let order: Vec<_> = store.nodes().iter().map(|n| n.id.clone()).collect();
		assert_eq!(order, vec![g, a, b]);
	}

	#[test]
	fn consecutive_nodes_do_not_share_a_position() {
		let mut store = GraphStore::new(false);
		let a = store.add_node(NodeKind::Shape).unwrap();
		let b = store.add_node(NodeKind::Shape).unwrap();
		assert_ne!(store.node(&a).unwrap().position, store.node(&b).unwrap().position);
	}

	#[test]
	fn moving_into_group_sets_parent_and_children() {
		let (mut store, group) = store_with_group();
		let square = store.add_node(NodeKind::Shape).unwrap();
		store.move_node(&square, Point::new(150.0, 150.0));

		assert_eq!(store.node(&square).unwrap().parent_group_id, Some(group.clone()));
		assert_eq!(store.node(&group).unwrap().children(), &[square.clone()]);

		store.move_node(&square, Point::new(1000.0, 1000.0));
		assert_eq!(store.node(&square).unwrap().parent_group_id, None);
		assert!(store.node(&group).unwrap().children().is_empty());
	}

	#[test]
	fn group_move_carries_children_rigidly() {
		let (mut store, group) = store_with_group();
		let inside = store.add_node(NodeKind::Circle).unwrap();
		let outside = store.add_node(NodeKind::Circle).unwrap();
		store.move_node(&inside, Point::new(120.0, 130.0));
		store.move_node(&outside, Point::new(900.0, 900.0));

		store.move_node(&group, Point::new(130.0, 90.0));

		let moved = store.node(&inside).unwrap();
		assert_eq!(moved.position, Point::new(150.0, 120.0));
		assert_eq!(moved.parent_group_id, Some(group));
		assert_eq!(store.node(&outside).unwrap().position, Point::new(900.0, 900.0));
	}

	#[test]
	fn group_move_does_not_capture_new_nodes() {
		let (mut store, group) = store_with_group();
		let square = store.add_node(NodeKind::Shape).unwrap();
		store.move_node(&square, Point::new(500.0, 150.0));
		store.move_node(&group, Point::new(450.0, 100.0));
		assert_eq!(store.node(&square).unwrap().parent_group_id, None);
	}

	#[test]
	fn resize_clamps_and_keeps_membership() {
		let (mut store, group) = store_with_group();
		let square = store.add_node(NodeKind::Shape).unwrap();
		store.move_node(&square, Point::new(400.0, 250.0));
		store.resize_group(&group, Size::new(10.0, 10.0));

		assert_eq!(store.node(&group).unwrap().size(), Size::new(150.0, 100.0));
		assert_eq!(store.node(&square).unwrap().parent_group_id, Some(group));
	}

	#[test]
	fn removing_group_orphans_children() {
		let (mut store, group) = store_with_group();
		let square = store.add_node(NodeKind::Shape).unwrap();
		store.move_node(&square, Point::new(150.0, 150.0));
		store.remove_node(&group);

		assert_eq!(store.nodes().len(), 1);
		assert_eq!(store.node(&square).unwrap().parent_group_id, None);
	}

	#[test]
	fn unknown_ids_are_tolerated() {
		let mut store = GraphStore::new(false);
		let before = store.clone();
		let ghost = NodeId::from("ghost");
		store.update_node(&ghost, NodePatch::label("x"));
		store.remove_node(&ghost);
		store.move_node(&ghost, Point::new(1.0, 1.0));
		assert_eq!(store, before);
	}

	#[test]
	fn update_applies_label_and_columns() {
		let mut store = GraphStore::new(false);
		let table = store.add_node(NodeKind::Table).unwrap();
		store.update_node(&table, NodePatch::label(""));
		store.update_node(&table, NodePatch::columns(vec![Column::new("id", "int")]));

		let node = store.node(&table).unwrap();
		assert_eq!(node.label, "");
		assert_eq!(node.columns(), Some(&[Column::new("id", "int")][..]));
	}

	#[test]
	fn selection_is_exclusive() {
		let mut store = GraphStore::new(false);
		let a = store.add_node(NodeKind::Shape).unwrap();
		let b = store.add_node(NodeKind::Shape).unwrap();
		store.set_selection(&Selection::Node(a.clone()));
		store.set_selection(&Selection::Node(b.clone()));
		assert!(!store.node(&a).unwrap().selected);
		assert_eq!(store.selection(), Selection::Node(b));
	}

	#[test]
	fn read_only_store_loads_but_refuses_edits() {
		let mut source = GraphStore::new(false);
		let table = source.add_node(NodeKind::Table).unwrap();
		let circle = source.add_node(NodeKind::Circle).unwrap();
		source.connect(&table, Port::Right, &circle, Port::Left);
		let doc = source.to_snapshot();

		let mut store = GraphStore::new(true);
		store.load_snapshot(&doc);
		assert!(store.node(&table).unwrap().read_only);

		assert_eq!(store.add_node(NodeKind::Shape), None);
		assert!(store.connect(&circle, Port::Right, &table, Port::Left).is_none());
		store.commit_label(&table, "changed");
		assert_eq!(store.add_column(&table), None);
		store.delete_column(&table, 0);
		store.move_node(&circle, Point::new(900.0, 900.0));
		store.remove_node(&circle);
		let edge = store.edges()[0].id.clone();
		store.recolor_edge(&edge, "#ff0000");
		store.remove_edge(&edge);

		assert_eq!(store.to_snapshot(), doc);
	}
}
