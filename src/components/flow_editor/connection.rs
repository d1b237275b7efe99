//! Edge creation, selection highlight and recoloring.

use log::debug;

use super::store::{GraphStore, Selection};
use super::types::{
	DEFAULT_EDGE_COLOR, DEFAULT_EDGE_WIDTH, Edge, EdgeId, EdgeStyle, NodeId, Port, PortRole,
	SELECTED_EDGE_WIDTH,
};

impl GraphStore {
	/// Creates an edge between two ports. Parallel edges and self-loops are
	/// allowed; only a read-only graph refuses.
	pub fn connect(
		&mut self,
		source: &NodeId,
		source_port: Port,
		target: &NodeId,
		target_port: Port,
	) -> Option<&Edge> {
		if !self.writable("connect") {
			return None;
		}
		let edge = Edge {
			id: EdgeId::random(),
			source: source.clone(),
			source_port,
			target: target.clone(),
			target_port,
			source_position: source_port,
			target_position: target_port,
			animated: true,
			style: EdgeStyle::default(),
			selected: false,
		};
		debug!(
			"edge {} {}:{} -> {}:{}",
			edge.id,
			source,
			source_port.as_str(),
			target,
			target_port.as_str()
		);
		self.edges.push(edge);
		self.edges.last()
	}

	pub fn remove_edge(&mut self, id: &EdgeId) {
		if !self.writable("edge removal") {
			return;
		}
		self.edges.retain(|e| &e.id != id);
	}

	/// Widens `id` and resets every other edge to the default width.
	fn highlight_edge(&mut self, id: &EdgeId) {
		for edge in &mut self.edges {
			edge.style.stroke_width = if &edge.id == id {
				SELECTED_EDGE_WIDTH
			} else {
				DEFAULT_EDGE_WIDTH
			};
		}
	}

	/// Changes only the stroke color.
	pub fn recolor_edge(&mut self, id: &EdgeId, color: &str) {
		if !self.writable("edge recolor") {
			return;
		}
		if let Some(edge) = self.edges.iter_mut().find(|e| &e.id == id) {
			edge.style.stroke_color = color.to_owned();
		}
	}

	/// Drops every selection highlight. Call before serializing.
	pub fn reset_edge_styles(&mut self) {
		for edge in &mut self.edges {
			edge.style.stroke_width = DEFAULT_EDGE_WIDTH;
		}
	}
}

/// Orders a pair of ports picked by the user as source then target.
///
/// Returns `None` when both ports have the same role.
pub fn orient(
	a: (NodeId, Port),
	b: (NodeId, Port),
) -> Option<((NodeId, Port), (NodeId, Port))> {
	match (a.1.role(), b.1.role()) {
		(PortRole::Source, PortRole::Target) => Some((a, b)),
		(PortRole::Target, PortRole::Source) => Some((b, a)),
		_ => None,
	}
}

/// Which edge the color editor works on.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum EdgeSelection {
	#[default]
	Unselected,
	Selected {
		/// Snapshot refreshed after every confirmed style change.
		edge: Edge,
		style_changed: bool,
	},
}

/// Open color picker with its uncommitted value.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorEditor {
	pub draft: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConnectionManager {
	selection: EdgeSelection,
	editor: Option<ColorEditor>,
}

impl ConnectionManager {
	pub fn selection(&self) -> &EdgeSelection {
		&self.selection
	}

	pub fn selected_edge(&self) -> Option<&Edge> {
		match &self.selection {
			EdgeSelection::Selected { edge, .. } => Some(edge),
			EdgeSelection::Unselected => None,
		}
	}

	pub fn color_editor(&self) -> Option<&ColorEditor> {
		self.editor.as_ref()
	}

	/// Highlights `id` and opens the color editor on it.
	pub fn select_edge(&mut self, store: &mut GraphStore, id: &EdgeId) {
		if store.edge(id).is_none() {
			return;
		}
		store.highlight_edge(id);
		store.set_selection(&Selection::Edge(id.clone()));
		let Some(edge) = store.edge(id).cloned() else {
			return;
		};
		self.editor = Some(ColorEditor {
			draft: edge.style.stroke_color.clone(),
		});
		self.selection = EdgeSelection::Selected {
			edge,
			style_changed: false,
		};
	}

	pub fn deselect_all(&mut self, store: &mut GraphStore) {
		store.reset_edge_styles();
		store.set_selection(&Selection::None);
		self.selection = EdgeSelection::Unselected;
		self.editor = None;
	}

	pub fn set_draft(&mut self, color: &str) {
		if let Some(editor) = &mut self.editor {
			editor.draft = color.to_owned();
		}
	}

	pub fn reset_draft(&mut self) {
		self.set_draft(DEFAULT_EDGE_COLOR);
	}

	/// Cancels the editor without saving, which also ends the selection.
	pub fn close_color_editor(&mut self, store: &mut GraphStore) {
		if self.editor.take().is_some() {
			self.deselect_all(store);
		}
	}

	/// Applies the draft color. The edge stays selected with a fresh snapshot.
	pub fn confirm_color(&mut self, store: &mut GraphStore) {
		let Some(editor) = self.editor.take() else {
			return;
		};
		let EdgeSelection::Selected { edge, .. } = &self.selection else {
			return;
		};
		let id = edge.id.clone();
		store.recolor_edge(&id, &editor.draft);
		self.selection = match store.edge(&id).cloned() {
			Some(edge) => EdgeSelection::Selected {
				edge,
				style_changed: true,
			},
			None => EdgeSelection::Unselected,
		};
	}

	/// Forgets a selection whose edge no longer exists.
	pub fn sync(&mut self, store: &GraphStore) {
		if let EdgeSelection::Selected { edge, .. } = &self.selection {
			if store.edge(&edge.id).is_none() {
				self.selection = EdgeSelection::Unselected;
				self.editor = None;
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::components::flow_editor::types::NodeKind;

	fn two_nodes() -> (GraphStore, NodeId, NodeId) {
		let mut store = GraphStore::new(false);
		let a = store.add_node(NodeKind::Shape).unwrap();
		let b = store.add_node(NodeKind::Shape).unwrap();
		(store, a, b)
	}

	fn highlighted(store: &GraphStore) -> usize {
		store
			.edges()
			.iter()
			.filter(|e| e.style.stroke_width == SELECTED_EDGE_WIDTH)
			.count()
	}

	#[test]
	fn connect_uses_default_style_and_port_orientation() {
		let (mut store, a, b) = two_nodes();
		let edge = store.connect(&a, Port::Right, &b, Port::Left).unwrap().clone();
		assert_eq!(edge.style, EdgeStyle::default());
		assert_eq!(edge.source_position, Port::Right);
		assert_eq!(edge.target_position, Port::Left);
		assert!(edge.animated);
	}

	#[test]
	fn parallel_edges_and_self_loops_are_allowed() {
		let (mut store, a, b) = two_nodes();
		store.connect(&a, Port::Right, &b, Port::Left);
		store.connect(&a, Port::Right, &b, Port::Left);
		store.connect(&a, Port::Bottom, &a, Port::Top);
		assert_eq!(store.edges().len(), 3);
	}

	#[test]
	fn at_most_one_edge_is_highlighted() {
		let (mut store, a, b) = two_nodes();
		let ids: Vec<EdgeId> = (0..4)
			.map(|_| store.connect(&a, Port::Right, &b, Port::Left).unwrap().id.clone())
			.collect();
		let mut manager = ConnectionManager::default();
		for id in [&ids[0], &ids[2], &ids[2], &ids[3], &ids[1]] {
			manager.select_edge(&mut store, id);
			assert_eq!(highlighted(&store), 1);
			assert_eq!(store.edge(id).unwrap().style.stroke_width, SELECTED_EDGE_WIDTH);
		}
		manager.deselect_all(&mut store);
		assert_eq!(highlighted(&store), 0);
		assert_eq!(manager.selection(), &EdgeSelection::Unselected);
	}

	#[test]
	fn confirm_refreshes_snapshot_and_keeps_selection() {
		let (mut store, a, b) = two_nodes();
		let id = store.connect(&a, Port::Right, &b, Port::Left).unwrap().id.clone();
		let mut manager = ConnectionManager::default();
		manager.select_edge(&mut store, &id);
		assert_eq!(manager.color_editor().unwrap().draft, "#999999");

		manager.set_draft("#ff0000");
		manager.confirm_color(&mut store);

		assert!(manager.color_editor().is_none());
		match manager.selection() {
			EdgeSelection::Selected {
				edge,
				style_changed,
			} => {
				assert!(*style_changed);
				assert_eq!(edge.style.stroke_color, "#ff0000");
			}
			EdgeSelection::Unselected => panic!("edge should stay selected"),
		}
		manager.select_edge(&mut store, &id);
		assert_eq!(manager.color_editor().unwrap().draft, "#ff0000");
	}

	#[test]
	fn closing_editor_without_saving_deselects() {
		let (mut store, a, b) = two_nodes();
		let id = store.connect(&a, Port::Right, &b, Port::Left).unwrap().id.clone();
		let mut manager = ConnectionManager::default();
		manager.select_edge(&mut store, &id);
		manager.set_draft("#00ff00");
		manager.close_color_editor(&mut store);

		assert_eq!(store.edge(&id).unwrap().style, EdgeStyle::default());
		assert_eq!(manager.selection(), &EdgeSelection::Unselected);
	}

	#[test]
	fn reset_draft_restores_default_color() {
		let (mut store, a, b) = two_nodes();
		let id = store.connect(&a, Port::Right, &b, Port::Left).unwrap().id.clone();
		store.recolor_edge(&id, "#123456");
		let mut manager = ConnectionManager::default();
		manager.select_edge(&mut store, &id);
		manager.reset_draft();
		assert_eq!(manager.color_editor().unwrap().draft, DEFAULT_EDGE_COLOR);
	}

	#[test]
	fn orient_normalizes_to_source_then_target() {
		let a = NodeId::from("a");
		let b = NodeId::from("b");
		let oriented = orient((a.clone(), Port::Left), (b.clone(), Port::Bottom));
		assert_eq!(
			oriented,
			Some(((b.clone(), Port::Bottom), (a.clone(), Port::Left)))
		);
		assert_eq!(orient((a, Port::Right), (b, Port::Bottom)), None);
	}
}
