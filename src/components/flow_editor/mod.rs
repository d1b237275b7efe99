//! Visual flow editor for API processing diagrams.
//!
//! [`GraphStore`] owns nodes and edges. [`EditorShell`] wraps one editing
//! session around it, and [`FlowEditor`] renders the session through a
//! [`FlowEditorHandle`] shared with the hosting screen.

mod behaviors;
mod component;
mod connection;
mod geometry;
mod gesture;
mod handle;
mod render;
mod serialize;
mod shell;
mod store;
mod types;

pub use behaviors::{EditTarget, apply_column_edit, begin_column_edit, begin_label_edit, reorder, resized};
pub use component::FlowEditor;
pub use connection::{ColorEditor, ConnectionManager, EdgeSelection, orient};
pub use geometry::{Bounds, bounds_of_all, locate};
pub use gesture::{Gesture, GestureUpdate, ViewTransform};
pub use handle::FlowEditorHandle;
pub use serialize::{
	EdgeRecord, EdgeStyleRecord, FlowDocument, FlowError, NodeData, NodeRecord, deserialize, serialize,
};
pub use shell::{EditorCommand, EditorShell};
pub use store::{GraphStore, NodePatch, Selection};
pub use types::*;
