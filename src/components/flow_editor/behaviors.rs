//! Per-kind editing rules: in-place labels, table columns, group resizing.

use super::store::{GraphStore, NodePatch};
use super::types::{Column, GROUP_MIN_SIZE, Node, NodeId, Size};

/// What an in-place editor is currently bound to.
#[derive(Clone, Debug, PartialEq)]
pub enum EditTarget {
	Label(NodeId),
	Column { node: NodeId, index: usize },
}

impl EditTarget {
	pub fn node(&self) -> &NodeId {
		match self {
			EditTarget::Label(node) | EditTarget::Column { node, .. } => node,
		}
	}
}

/// Starting text for a label editor, or `None` when editing is refused.
pub fn begin_label_edit(node: &Node) -> Option<String> {
	(!node.read_only).then(|| node.label.clone())
}

/// Starting `(name, type)` drafts for a column editor.
pub fn begin_column_edit(node: &Node, index: usize) -> Option<(String, String)> {
	if node.read_only {
		return None;
	}
	let column = node.columns()?.get(index)?;
	Some((column.name.clone(), column.ty.clone()))
}

/// Moves the item at `from` so it ends up at `to`. Out-of-range indices are ignored.
pub fn reorder<T>(list: &mut Vec<T>, from: usize, to: usize) {
	if from >= list.len() || to >= list.len() || from == to {
		return;
	}
	let item = list.remove(from);
	list.insert(to, item);
}

/// Applies an edited column. Blank fields keep their previous value.
pub fn apply_column_edit(columns: &mut [Column], index: usize, name: &str, ty: &str) {
	let Some(column) = columns.get_mut(index) else {
		return;
	};
	let (name, ty) = (name.trim(), ty.trim());
	if !name.is_empty() {
		column.name = name.to_owned();
	}
	if !ty.is_empty() {
		column.ty = ty.to_owned();
	}
}

/// Group size after dragging the resize handle by `(dx, dy)`.
pub fn resized(start: Size, dx: f64, dy: f64) -> Size {
	Size::new(start.width + dx, start.height + dy).clamp_min(GROUP_MIN_SIZE)
}

impl GraphStore {
	pub fn commit_label(&mut self, id: &NodeId, text: &str) {
		self.update_node(id, NodePatch::label(text));
	}

	/// Appends a placeholder column, returning its index.
	pub fn add_column(&mut self, id: &NodeId) -> Option<usize> {
		if !self.writable("add column") {
			return None;
		}
		let mut columns = self.node(id)?.columns()?.to_vec();
		columns.push(Column::placeholder());
		let index = columns.len() - 1;
		self.update_node(id, NodePatch::columns(columns));
		Some(index)
	}

	pub fn delete_column(&mut self, id: &NodeId, index: usize) {
		self.edit_columns(id, |columns| {
			if index < columns.len() {
				columns.remove(index);
			}
		});
	}

	pub fn reorder_columns(&mut self, id: &NodeId, from: usize, to: usize) {
		self.edit_columns(id, |columns| reorder(columns, from, to));
	}

	pub fn edit_column(&mut self, id: &NodeId, index: usize, name: &str, ty: &str) {
		self.edit_columns(id, |columns| apply_column_edit(columns, index, name, ty));
	}

	fn edit_columns(&mut self, id: &NodeId, f: impl FnOnce(&mut Vec<Column>)) {
		let Some(mut columns) = self.node(id).and_then(|n| n.columns()).map(<[Column]>::to_vec)
		else {
			return;
		};
		f(&mut columns);
		self.update_node(id, NodePatch::columns(columns));
	}
}
