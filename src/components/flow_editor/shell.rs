//! One editing session: the store plus selection, gestures and view state.
//!
//! Node views never touch the store directly. They send an [`EditorCommand`]
//! and the shell decides whether it applies (mutations are dropped in
//! read-only mode).

use log::debug;

use super::connection::{self, ConnectionManager};
use super::geometry;
use super::gesture::{Gesture, GestureUpdate, ViewTransform};
use super::serialize::FlowDocument;
use super::store::{GraphStore, Selection};
use super::types::{EdgeId, NodeId, NodeKind, Point, Port, Size};

const WHEEL_ZOOM_IN: f64 = 1.1;
const WHEEL_ZOOM_OUT: f64 = 0.9;
const BUTTON_ZOOM: f64 = 1.2;

#[derive(Clone, Debug, PartialEq)]
pub enum EditorCommand {
	AddNode(NodeKind),
	CommitLabel { node: NodeId, text: String },
	AddColumn(NodeId),
	DeleteColumn { node: NodeId, index: usize },
	EditColumn { node: NodeId, index: usize, name: String, ty: String },
	SelectNode(NodeId),
	SelectEdge(EdgeId),
	DeleteSelection,
	SetEdgeColorDraft(String),
	ResetEdgeColorDraft,
	ConfirmEdgeColor,
	CloseEdgeColor,
	/// Pointer pressed on a node body or group title bar.
	BeginDrag { node: NodeId, pointer: Point },
	/// Pointer pressed on a group's resize handle.
	BeginResize { node: NodeId, pointer: Point },
	BeginConnect { node: NodeId, port: Port, pointer: Point },
	BeginColumnSort { node: NodeId, index: usize },
	DropOnPort { node: NodeId, port: Port },
	DropOnColumn { node: NodeId, index: usize },
	// view-only commands below
	ClickBackground,
	BeginPan { pointer: Point },
	PointerMove { pointer: Point },
	PointerUp,
	Wheel { pointer: Point, delta_y: f64 },
	ZoomIn { viewport: Size },
	ZoomOut { viewport: Size },
	FitView { viewport: Size },
}

impl EditorCommand {
	/// Whether the command can change the persisted graph.
	pub fn is_mutation(&self) -> bool {
		!matches!(
			self,
			EditorCommand::ClickBackground
				| EditorCommand::BeginPan { .. }
				| EditorCommand::PointerMove { .. }
				| EditorCommand::PointerUp
				| EditorCommand::Wheel { .. }
				| EditorCommand::ZoomIn { .. }
				| EditorCommand::ZoomOut { .. }
				| EditorCommand::FitView { .. }
		)
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct EditorShell {
	store: GraphStore,
	connections: ConnectionManager,
	gesture: Gesture,
	view: ViewTransform,
}

impl EditorShell {
	/// The mode is fixed for the lifetime of the shell.
	pub fn new(read_only: bool) -> Self {
		Self {
			store: GraphStore::new(read_only),
			connections: ConnectionManager::default(),
			gesture: Gesture::Idle,
			view: ViewTransform::default(),
		}
	}

	pub fn read_only(&self) -> bool {
		self.store.read_only()
	}

	pub fn store(&self) -> &GraphStore {
		&self.store
	}

	pub fn connections(&self) -> &ConnectionManager {
		&self.connections
	}

	pub fn gesture(&self) -> &Gesture {
		&self.gesture
	}

	pub fn view(&self) -> &ViewTransform {
		&self.view
	}

	pub fn get_flow(&self) -> FlowDocument {
		self.store.to_snapshot()
	}

	pub fn set_flow(&mut self, doc: &FlowDocument) {
		self.store.load_snapshot(doc);
		self.connections = ConnectionManager::default();
		self.gesture = Gesture::Idle;
		debug!(
			"flow loaded: {} nodes, {} edges",
			self.store.nodes().len(),
			self.store.edges().len()
		);
	}

	pub fn clear_flow(&mut self) {
		self.store.clear();
		self.connections = ConnectionManager::default();
		self.gesture = Gesture::Idle;
	}

	pub fn reset_edge_styles(&mut self) {
		self.store.reset_edge_styles();
	}

	/// Highlight-free document, ready to persist.
	pub fn save_flow(&mut self) -> FlowDocument {
		self.reset_edge_styles();
		self.get_flow()
	}

	/// Applies a command. Returns `false` when it was ignored.
	pub fn apply(&mut self, command: EditorCommand) -> bool {
		if self.read_only() && command.is_mutation() {
			debug!("read-only editor ignored {command:?}");
			return false;
		}
		match command {
			EditorCommand::AddNode(kind) => return self.store.add_node(kind).is_some(),
			EditorCommand::CommitLabel { node, text } => self.store.commit_label(&node, &text),
			EditorCommand::AddColumn(node) => return self.store.add_column(&node).is_some(),
			EditorCommand::DeleteColumn { node, index } => self.store.delete_column(&node, index),
			EditorCommand::EditColumn {
				node,
				index,
				name,
				ty,
			} => self.store.edit_column(&node, index, &name, &ty),
			EditorCommand::SelectNode(node) => {
				self.connections.deselect_all(&mut self.store);
				self.store.set_selection(&Selection::Node(node));
			}
			EditorCommand::SelectEdge(edge) => self.connections.select_edge(&mut self.store, &edge),
			EditorCommand::DeleteSelection => self.delete_selection(),
			EditorCommand::SetEdgeColorDraft(color) => self.connections.set_draft(&color),
			EditorCommand::ResetEdgeColorDraft => self.connections.reset_draft(),
			EditorCommand::ConfirmEdgeColor => self.connections.confirm_color(&mut self.store),
			EditorCommand::CloseEdgeColor => self.connections.close_color_editor(&mut self.store),
			EditorCommand::BeginDrag { node, pointer } => {
				let Some(start) = self.store.node(&node).map(|n| n.position) else {
					return false;
				};
				return self.gesture.begin(Gesture::DraggingNode {
					node,
					pointer_start: pointer,
					node_start: start,
				});
			}
			EditorCommand::BeginResize { node, pointer } => {
				let Some(size) = self.store.node(&node).filter(|n| n.is_group()).map(|n| n.size())
				else {
					return false;
				};
				return self.gesture.begin(Gesture::Resizing {
					node,
					pointer_start: pointer,
					size_start: size,
				});
			}
			EditorCommand::BeginConnect {
				node,
				port,
				pointer,
			} => {
				let cursor = self.view.screen_to_graph(pointer);
				return self.gesture.begin(Gesture::Connecting { node, port, cursor });
			}
			EditorCommand::BeginColumnSort { node, index } => {
				return self.gesture.begin(Gesture::SortingColumn { node, from: index });
			}
			EditorCommand::DropOnPort { node, port } => return self.finish_connection(node, port),
			EditorCommand::DropOnColumn { node, index } => {
				if let Gesture::SortingColumn { node: sorting, from } = self.gesture.end() {
					if sorting == node {
						self.store.reorder_columns(&node, from, index);
					}
				}
			}
			EditorCommand::ClickBackground => {
				self.connections.deselect_all(&mut self.store);
			}
			EditorCommand::BeginPan { pointer } => {
				let pan_start = Point::new(self.view.x, self.view.y);
				return self.gesture.begin(Gesture::Panning {
					pointer_start: pointer,
					pan_start,
				});
			}
			EditorCommand::PointerMove { pointer } => return self.pointer_move(pointer),
			EditorCommand::PointerUp => {
				self.gesture.end();
			}
			EditorCommand::Wheel { pointer, delta_y } => {
				let factor = if delta_y > 0.0 {
					WHEEL_ZOOM_OUT
				} else {
					WHEEL_ZOOM_IN
				};
				self.view.zoom_at(pointer, factor);
			}
			EditorCommand::ZoomIn { viewport } => self.zoom_center(viewport, BUTTON_ZOOM),
			EditorCommand::ZoomOut { viewport } => self.zoom_center(viewport, 1.0 / BUTTON_ZOOM),
			EditorCommand::FitView { viewport } => {
				if let Some(bounds) = geometry::bounds_of_all(self.store.nodes()) {
					self.view.fit(bounds, viewport);
				}
			}
		}
		true
	}

	fn pointer_move(&mut self, pointer: Point) -> bool {
		match self.gesture.update(pointer, &self.view) {
			Some(GestureUpdate::MoveNode(node, position)) => self.store.move_node(&node, position),
			Some(GestureUpdate::ResizeGroup(node, size)) => self.store.resize_group(&node, size),
			Some(GestureUpdate::Pan(offset)) => {
				self.view.x = offset.x;
				self.view.y = offset.y;
			}
			Some(GestureUpdate::Preview(_)) => {}
			None => return false,
		}
		true
	}

	fn finish_connection(&mut self, node: NodeId, port: Port) -> bool {
		let Gesture::Connecting {
			node: from,
			port: from_port,
			..
		} = self.gesture.end()
		else {
			return false;
		};
		match connection::orient((from, from_port), (node, port)) {
			Some(((source, source_port), (target, target_port))) => {
				self.store
					.connect(&source, source_port, &target, target_port)
					.is_some()
			}
			None => {
				debug!("ports {} and {} share a role, not connected", from_port.as_str(), port.as_str());
				false
			}
		}
	}

	fn delete_selection(&mut self) {
		match self.store.selection() {
			Selection::Node(node) => self.store.remove_node(&node),
			Selection::Edge(edge) => self.store.remove_edge(&edge),
			Selection::None => return,
		}
		self.connections.sync(&self.store);
	}

	fn zoom_center(&mut self, viewport: Size, factor: f64) {
		let center = Point::new(viewport.width / 2.0, viewport.height / 2.0);
		self.view.zoom_at(center, factor);
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::components::flow_editor::types::{Column, SELECTED_EDGE_WIDTH};

	fn shell_with(kinds: &[NodeKind]) -> (EditorShell, Vec<NodeId>) {
		let mut shell = EditorShell::new(false);
		for kind in kinds {
			shell.apply(EditorCommand::AddNode(*kind));
		}
		let ids = shell.store().nodes().iter().map(|n| n.id.clone()).collect();
		(shell, ids)
	}

	#[test]
	fn drag_gesture_moves_node_into_group() {
		let (mut shell, ids) = shell_with(&[NodeKind::Group, NodeKind::Shape]);
		let (group, square) = (ids[0].clone(), ids[1].clone());
		let group_pos = shell.store().node(&group).unwrap().position;
		let square_pos = shell.store().node(&square).unwrap().position;

		assert!(shell.apply(EditorCommand::BeginDrag {
			node: square.clone(),
			pointer: Point::new(0.0, 0.0),
		}));
		let (dx, dy) = group_pos.offset(10.0, 10.0).delta_from(square_pos);
		shell.apply(EditorCommand::PointerMove {
			pointer: Point::new(dx, dy),
		});
		shell.apply(EditorCommand::PointerUp);

		let node = shell.store().node(&square).unwrap();
		assert_eq!(node.parent_group_id, Some(group));
		assert!(shell.gesture().is_idle());
	}

	#[test]
	fn resize_cannot_start_during_another_resize() {
		let (mut shell, ids) = shell_with(&[NodeKind::Group]);
		let begin = EditorCommand::BeginResize {
			node: ids[0].clone(),
			pointer: Point::new(0.0, 0.0),
		};
		assert!(shell.apply(begin.clone()));
		assert!(!shell.apply(begin.clone()));
		shell.apply(EditorCommand::PointerMove {
			pointer: Point::new(80.0, 20.0),
		});
		shell.apply(EditorCommand::PointerUp);
		assert_eq!(shell.store().nodes()[0].size(), Size::new(400.0, 220.0));
		assert!(shell.apply(begin));
	}

	#[test]
	fn connect_gesture_normalizes_direction() {
		let (mut shell, ids) = shell_with(&[NodeKind::Shape, NodeKind::Circle]);
		shell.apply(EditorCommand::BeginConnect {
			node: ids[1].clone(),
			port: Port::Left,
			pointer: Point::default(),
		});
		assert!(shell.apply(EditorCommand::DropOnPort {
			node: ids[0].clone(),
			port: Port::Right,
		}));
		let edge = &shell.store().edges()[0];
		assert_eq!((&edge.source, edge.source_port), (&ids[0], Port::Right));
		assert_eq!((&edge.target, edge.target_port), (&ids[1], Port::Left));

		shell.apply(EditorCommand::BeginConnect {
			node: ids[1].clone(),
			port: Port::Right,
			pointer: Point::default(),
		});
		assert!(!shell.apply(EditorCommand::DropOnPort {
			node: ids[0].clone(),
			port: Port::Bottom,
		}));
		assert_eq!(shell.store().edges().len(), 1);
	}

	#[test]
	fn column_sort_gesture_reorders() {
		let (mut shell, ids) = shell_with(&[NodeKind::Table]);
		let table = ids[0].clone();
		shell.apply(EditorCommand::AddColumn(table.clone()));
		shell.apply(EditorCommand::EditColumn {
			node: table.clone(),
			index: 1,
			name: "second".into(),
			ty: "text".into(),
		});
		shell.apply(EditorCommand::BeginColumnSort {
			node: table.clone(),
			index: 1,
		});
		shell.apply(EditorCommand::DropOnColumn {
			node: table.clone(),
			index: 0,
		});
		let columns = shell.store().node(&table).unwrap().columns().unwrap().to_vec();
		assert_eq!(columns, vec![Column::new("second", "text"), Column::placeholder()]);
	}

	#[test]
	fn read_only_ignores_mutations_but_allows_view_changes() {
		let mut shell = EditorShell::new(true);
		assert!(!shell.apply(EditorCommand::AddNode(NodeKind::Shape)));
		assert!(shell.store().is_empty());

		assert!(shell.apply(EditorCommand::BeginPan {
			pointer: Point::new(0.0, 0.0),
		}));
		shell.apply(EditorCommand::PointerMove {
			pointer: Point::new(15.0, -5.0),
		});
		assert_eq!((shell.view().x, shell.view().y), (15.0, -5.0));
	}

	#[test]
	fn delete_selection_removes_node_and_its_edges() {
		let (mut shell, ids) = shell_with(&[NodeKind::Shape, NodeKind::Shape]);
		shell.apply(EditorCommand::BeginConnect {
			node: ids[0].clone(),
			port: Port::Right,
			pointer: Point::default(),
		});
		shell.apply(EditorCommand::DropOnPort {
			node: ids[1].clone(),
			port: Port::Left,
		});
		shell.apply(EditorCommand::SelectNode(ids[1].clone()));
		shell.apply(EditorCommand::DeleteSelection);

		assert_eq!(shell.store().nodes().len(), 1);
		assert!(shell.store().edges().is_empty());
	}

	#[test]
	fn deleting_selected_edge_closes_color_editor() {
		let (mut shell, ids) = shell_with(&[NodeKind::Shape, NodeKind::Shape]);
		let edge = shell
			.store
			.connect(&ids[0], Port::Right, &ids[1], Port::Left)
			.unwrap()
			.id
			.clone();
		shell.apply(EditorCommand::SelectEdge(edge));
		assert!(shell.connections().color_editor().is_some());
		shell.apply(EditorCommand::DeleteSelection);
		assert!(shell.store().edges().is_empty());
		assert!(shell.connections().color_editor().is_none());
	}

	#[test]
	fn save_flow_strips_highlight() {
		let (mut shell, ids) = shell_with(&[NodeKind::Shape, NodeKind::Shape]);
		let edge = shell
			.store
			.connect(&ids[0], Port::Right, &ids[1], Port::Left)
			.unwrap()
			.id
			.clone();
		shell.apply(EditorCommand::SelectEdge(edge));
		assert_eq!(shell.store().edges()[0].style.stroke_width, SELECTED_EDGE_WIDTH);

		let doc = shell.save_flow();
		assert_eq!(doc.edges[0].style.stroke_width, Some(3.0));
	}

	#[test]
	fn set_flow_then_clear() {
		let (mut source, _) = shell_with(&[NodeKind::Group, NodeKind::Table]);
		let doc = source.get_flow();
		let mut shell = EditorShell::new(false);
		shell.set_flow(&doc);
		assert_eq!(shell.get_flow(), doc);
		shell.clear_flow();
		assert!(shell.store().is_empty());
		source.clear_flow();
		assert_eq!(source.get_flow(), FlowDocument::default());
	}
}
