//! Flow document wire format.
//!
//! The document is stored by the host screen as a JSON string in the API
//! definition's `flow_data` field. Transient state (selection, read-only mode,
//! derived group children) never reaches the wire.

use std::collections::HashSet;

use log::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use super::store::GraphStore;
use super::types::{
	Column, DEFAULT_EDGE_COLOR, DEFAULT_EDGE_WIDTH, Edge, EdgeId, EdgeStyle, GROUP_DEFAULT_SIZE,
	GROUP_DEFAULT_TITLE, Node, NodeBody, NodeId, NodeKind, Point, Port, Size,
};

#[derive(Debug, Error)]
pub enum FlowError {
	#[error("flow document is not valid JSON: {0}")]
	Parse(#[source] serde_json::Error),
	#[error("flow document could not be encoded: {0}")]
	Encode(#[source] serde_json::Error),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowDocument {
	#[serde(default, deserialize_with = "readable_records")]
	pub nodes: Vec<NodeRecord>,
	#[serde(default, deserialize_with = "readable_records")]
	pub edges: Vec<EdgeRecord>,
}

impl FlowDocument {
	pub fn from_json(text: &str) -> Result<Self, FlowError> {
		serde_json::from_str(text).map_err(FlowError::Parse)
	}

	pub fn to_json(&self) -> Result<String, FlowError> {
		serde_json::to_string(self).map_err(FlowError::Encode)
	}

	pub fn to_json_pretty(&self) -> Result<String, FlowError> {
		serde_json::to_string_pretty(self).map_err(FlowError::Encode)
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
	pub id: NodeId,
	#[serde(rename = "type")]
	pub kind: NodeKind,
	#[serde(default)]
	pub position: Point,
	/// Present on groups only.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub style: Option<Size>,
	#[serde(default)]
	pub data: NodeData,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub parent_group_id: Option<NodeId>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub label: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub columns: Option<Vec<Column>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub width: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub height: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeRecord {
	pub id: EdgeId,
	pub source: NodeId,
	#[serde(default = "default_source_port", deserialize_with = "source_handle")]
	pub source_handle: Port,
	pub target: NodeId,
	#[serde(default = "default_target_port", deserialize_with = "target_handle")]
	pub target_handle: Port,
	#[serde(
		default,
		deserialize_with = "handle_position",
		skip_serializing_if = "Option::is_none"
	)]
	pub source_position: Option<Port>,
	#[serde(
		default,
		deserialize_with = "handle_position",
		skip_serializing_if = "Option::is_none"
	)]
	pub target_position: Option<Port>,
	#[serde(default = "animated_by_default")]
	pub animated: bool,
	#[serde(default)]
	pub style: EdgeStyleRecord,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeStyleRecord {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub stroke: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub stroke_width: Option<f64>,
}

fn default_source_port() -> Port {
	Port::Right
}

fn default_target_port() -> Port {
	Port::Left
}

fn animated_by_default() -> bool {
	true
}

/// Reads a record list one entry at a time. Entries that do not parse (an
/// unknown node type, a non-object) are dropped with a warning so the rest
/// of the document still loads.
fn readable_records<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
	D: Deserializer<'de>,
	T: DeserializeOwned,
{
	let values = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?;
	Ok(values
		.unwrap_or_default()
		.into_iter()
		.filter_map(|value| match serde_json::from_value(value) {
			Ok(record) => Some(record),
			Err(err) => {
				warn!("unreadable flow record dropped: {err}");
				None
			}
		})
		.collect())
}

/// Handle ids are free text. Absent or non-string values give `None`.
fn handle_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
	D: Deserializer<'de>,
{
	let value = Option::<serde_json::Value>::deserialize(deserializer)?;
	Ok(value.and_then(|v| v.as_str().map(str::to_owned)))
}

fn source_handle<'de, D>(deserializer: D) -> Result<Port, D::Error>
where
	D: Deserializer<'de>,
{
	Ok(handle_id(deserializer)?.map_or_else(default_source_port, |h| Port::from_handle(&h)))
}

fn target_handle<'de, D>(deserializer: D) -> Result<Port, D::Error>
where
	D: Deserializer<'de>,
{
	Ok(handle_id(deserializer)?.map_or_else(default_target_port, |h| Port::from_handle(&h)))
}

fn handle_position<'de, D>(deserializer: D) -> Result<Option<Port>, D::Error>
where
	D: Deserializer<'de>,
{
	Ok(handle_id(deserializer)?.map(|h| Port::from_handle(&h)))
}

/// Flattens the store into a document.
pub fn serialize(store: &GraphStore) -> FlowDocument {
	FlowDocument {
		nodes: store.nodes().iter().map(node_record).collect(),
		edges: store.edges().iter().map(edge_record).collect(),
	}
}

fn node_record(node: &Node) -> NodeRecord {
	let (style, data) = match &node.body {
		NodeBody::Group { size, .. } => (
			Some(*size),
			NodeData {
				label: Some(node.label.clone()),
				width: Some(size.width),
				height: Some(size.height),
				..NodeData::default()
			},
		),
		NodeBody::Table { columns } => (
			None,
			NodeData {
				label: Some(node.label.clone()),
				columns: Some(columns.clone()),
				..NodeData::default()
			},
		),
		NodeBody::Shape | NodeBody::Condition | NodeBody::Circle => (
			None,
			NodeData {
				label: Some(node.label.clone()),
				..NodeData::default()
			},
		),
	};
	NodeRecord {
		id: node.id.clone(),
		kind: node.kind(),
		position: node.position,
		style,
		data,
		parent_group_id: node.parent_group_id.clone(),
	}
}

fn edge_record(edge: &Edge) -> EdgeRecord {
	EdgeRecord {
		id: edge.id.clone(),
		source: edge.source.clone(),
		source_handle: edge.source_port,
		target: edge.target.clone(),
		target_handle: edge.target_port,
		source_position: Some(edge.source_position),
		target_position: Some(edge.target_position),
		animated: edge.animated,
		style: EdgeStyleRecord {
			stroke: Some(edge.style.stroke_color.clone()),
			stroke_width: Some(edge.style.stroke_width),
		},
	}
}

/// Hydrates nodes and edges from a document, filling defaults for anything
/// missing. Parent references are repaired by the store afterwards.
pub fn deserialize(doc: &FlowDocument, read_only: bool) -> (Vec<Node>, Vec<Edge>) {
	let nodes: Vec<Node> = doc
		.nodes
		.iter()
		.map(|record| hydrate_node(record, read_only))
		.collect();
	let known: HashSet<&NodeId> = nodes.iter().map(|n| &n.id).collect();
	let edges = doc
		.edges
		.iter()
		.filter(|record| {
			let ok = known.contains(&record.source) && known.contains(&record.target);
			if !ok {
				warn!("edge {} references a missing node, dropped", record.id);
			}
			ok
		})
		.map(hydrate_edge)
		.collect();
	(nodes, edges)
}

fn hydrate_node(record: &NodeRecord, read_only: bool) -> Node {
	let data = &record.data;
	let body = match record.kind {
		NodeKind::Shape => NodeBody::Shape,
		NodeKind::Condition => NodeBody::Condition,
		NodeKind::Circle => NodeBody::Circle,
		NodeKind::Table => {
			let columns = match &data.columns {
				Some(columns) => columns.clone(),
				None => {
					warn!("table {} has no column list, using placeholder", record.id);
					vec![Column::placeholder()]
				}
			};
			NodeBody::Table { columns }
		}
		NodeKind::Group => {
			let fallback = record.style.unwrap_or(GROUP_DEFAULT_SIZE);
			NodeBody::Group {
				size: Size::new(
					data.width.unwrap_or(fallback.width),
					data.height.unwrap_or(fallback.height),
				),
				children: Vec::new(),
			}
		}
	};
	let label = match (&data.label, record.kind) {
		(Some(label), _) => label.clone(),
		(None, NodeKind::Group) => GROUP_DEFAULT_TITLE.to_owned(),
		(None, _) => String::new(),
	};
	Node {
		id: record.id.clone(),
		position: record.position,
		label,
		body,
		parent_group_id: record.parent_group_id.clone(),
		read_only,
		selected: false,
	}
}

fn hydrate_edge(record: &EdgeRecord) -> Edge {
	Edge {
		id: record.id.clone(),
		source: record.source.clone(),
		source_port: record.source_handle,
		target: record.target.clone(),
		target_port: record.target_handle,
		source_position: record.source_position.unwrap_or(Port::Right),
		target_position: record.target_position.unwrap_or(Port::Left),
		animated: record.animated,
		style: EdgeStyle {
			stroke_color: record
				.style
				.stroke
				.clone()
				.unwrap_or_else(|| DEFAULT_EDGE_COLOR.to_owned()),
			stroke_width: record.style.stroke_width.unwrap_or(DEFAULT_EDGE_WIDTH),
		},
		selected: false,
	}
}
