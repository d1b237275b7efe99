use leptos::either::Either;
use leptos::html;
use leptos::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{HtmlInputElement, KeyboardEvent, MouseEvent, PointerEvent, WheelEvent};

use super::behaviors::{self, EditTarget};
use super::gesture::Gesture;
use super::handle::FlowEditorHandle;
use super::render;
use super::shell::EditorCommand;
use super::types::{Column, DEFAULT_EDGE_COLOR, Node, NodeId, NodeKind, Point, Port, Size};

/// Drafts of the single in-place editor that may be open at a time.
#[derive(Clone, Copy)]
struct InlineEditor {
	target: RwSignal<Option<EditTarget>>,
	name: RwSignal<String>,
	ty: RwSignal<String>,
}

impl InlineEditor {
	fn new() -> Self {
		Self {
			target: RwSignal::new(None),
			name: RwSignal::new(String::new()),
			ty: RwSignal::new(String::new()),
		}
	}

	fn is_editing(&self, target: &EditTarget) -> bool {
		self.target.with(|t| t.as_ref() == Some(target))
	}

	fn open(&self, target: EditTarget, name: String, ty: String) {
		self.name.set(name);
		self.ty.set(ty);
		self.target.set(Some(target));
	}

	fn cancel(&self) {
		self.target.set(None);
	}

	/// Sends the drafts to the store. A second call (blur after Enter) is a no-op.
	fn commit(&self, handle: FlowEditorHandle) {
		let Some(target) = self.target.get_untracked() else {
			return;
		};
		self.target.set(None);
		let command = match target {
			EditTarget::Label(node) => EditorCommand::CommitLabel {
				node,
				text: self.name.get_untracked(),
			},
			EditTarget::Column { node, index } => EditorCommand::EditColumn {
				node,
				index,
				name: self.name.get_untracked(),
				ty: self.ty.get_untracked(),
			},
		};
		handle.dispatch(command);
	}
}

/// Shared by every view inside one editor.
#[derive(Clone, Copy)]
struct EditorCtx {
	handle: FlowEditorHandle,
	editor: InlineEditor,
	viewport: NodeRef<html::Div>,
	read_only: bool,
}

impl EditorCtx {
	/// Pointer position relative to the viewport's top-left corner.
	fn pointer(&self, ev: &MouseEvent) -> Point {
		self.viewport
			.get_untracked()
			.map(|el| {
				let rect = el.get_bounding_client_rect();
				Point::new(
					ev.client_x() as f64 - rect.left(),
					ev.client_y() as f64 - rect.top(),
				)
			})
			.unwrap_or_default()
	}

	fn viewport_size(&self) -> Size {
		self.viewport
			.get_untracked()
			.map(|el| Size::new(el.client_width() as f64, el.client_height() as f64))
			.unwrap_or(Size::new(800.0, 600.0))
	}

	fn dispatch(&self, command: EditorCommand) -> bool {
		self.handle.dispatch(command)
	}
}

/// Diagram editor for one API definition's processing flow.
#[component]
pub fn FlowEditor(
	handle: FlowEditorHandle,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let ctx = EditorCtx {
		handle,
		editor: InlineEditor::new(),
		viewport: NodeRef::new(),
		read_only: handle.read_only(),
	};

	let on_pointerdown = move |ev: PointerEvent| {
		ctx.editor.commit(ctx.handle);
		let pointer = ctx.pointer(&ev);
		ctx.dispatch(EditorCommand::BeginPan { pointer });
	};
	let on_pointermove = move |ev: PointerEvent| {
		let pointer = ctx.pointer(&ev);
		ctx.dispatch(EditorCommand::PointerMove { pointer });
	};
	let on_pointerup = move |_: PointerEvent| {
		ctx.dispatch(EditorCommand::PointerUp);
	};
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let pointer = ctx.pointer(&ev);
		ctx.dispatch(EditorCommand::Wheel {
			pointer,
			delta_y: ev.delta_y(),
		});
	};
	let on_keydown = move |ev: KeyboardEvent| {
		let typing = ev
			.target()
			.and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
			.is_some();
		if !typing && matches!(ev.key().as_str(), "Delete" | "Backspace") {
			ctx.dispatch(EditorCommand::DeleteSelection);
		}
	};

	let layer_style = move || {
		let css = handle.with(|s| s.view().css());
		format!("transform: {css}; transform-origin: 0 0;")
	};
	let viewport_style = format!("height: {}px;", height.unwrap_or(600.0));

	view! {
		<div class="flow-editor">
			{(!ctx.read_only).then(|| view! { <Toolbar ctx=ctx /> })}
			<div
				node_ref=ctx.viewport
				class="flow-viewport"
				tabindex="0"
				style=viewport_style
				on:pointerdown=on_pointerdown
				on:pointermove=on_pointermove
				on:pointerup=on_pointerup
				on:pointerleave=on_pointerup
				on:wheel=on_wheel
				on:keydown=on_keydown
				on:click=move |_: MouseEvent| {
					ctx.dispatch(EditorCommand::ClickBackground);
				}
			>
				<div class="flow-layer" style=layer_style>
					<EdgeLayer ctx=ctx />
					<For
						each=move || {
							handle
								.with(|s| {
									s.store()
										.nodes()
										.iter()
										.map(|n| (n.id.clone(), n.kind()))
										.collect::<Vec<_>>()
								})
						}
						key=|(id, _)| id.clone()
						children=move |(id, kind)| node_view(ctx, id, kind)
					/>
				</div>
				<Controls ctx=ctx />
			</div>
			<EdgeColorModal ctx=ctx />
		</div>
	}
}

#[component]
fn Toolbar(ctx: EditorCtx) -> impl IntoView {
	view! {
		<div class="flow-toolbar">
			{NodeKind::TOOLBAR
				.iter()
				.map(move |&(kind, caption)| {
					view! {
						<button
							class="flow-toolbar-button"
							on:click=move |_| {
								ctx.dispatch(EditorCommand::AddNode(kind));
							}
						>
							"+ "
							{caption}
						</button>
					}
				})
				.collect_view()}
		</div>
	}
}

#[component]
fn Controls(ctx: EditorCtx) -> impl IntoView {
	let stop = |ev: PointerEvent| ev.stop_propagation();
	let zoom_in = move |ev: MouseEvent| {
		ev.stop_propagation();
		ctx.dispatch(EditorCommand::ZoomIn {
			viewport: ctx.viewport_size(),
		});
	};
	let zoom_out = move |ev: MouseEvent| {
		ev.stop_propagation();
		ctx.dispatch(EditorCommand::ZoomOut {
			viewport: ctx.viewport_size(),
		});
	};
	let fit = move |ev: MouseEvent| {
		ev.stop_propagation();
		ctx.dispatch(EditorCommand::FitView {
			viewport: ctx.viewport_size(),
		});
	};
	view! {
		<div class="flow-controls" on:pointerdown=stop>
			<button on:click=zoom_in title="zoom in">"+"</button>
			<button on:click=zoom_out title="zoom out">"−"</button>
			<button on:click=fit title="fit view">"⤢"</button>
		</div>
	}
}

#[component]
fn EdgeLayer(ctx: EditorCtx) -> impl IntoView {
	let edges = move || {
		ctx.handle.with(|s| {
			let nodes = s.store().nodes();
			s.store()
				.edges()
				.iter()
				.filter_map(|edge| {
					let d = render::edge_path(edge, nodes)?;
					let id = edge.id.clone();
					let class = if edge.animated {
						"flow-edge animated"
					} else {
						"flow-edge"
					};
					let select = move |ev: MouseEvent| {
						ev.stop_propagation();
						ctx.dispatch(EditorCommand::SelectEdge(id.clone()));
					};
					Some(view! {
						<g>
							<path
								class="flow-edge-hit"
								d=d.clone()
								fill="none"
								stroke="transparent"
								stroke-width="20"
								on:click=select
								on:pointerdown=|ev: PointerEvent| ev.stop_propagation()
							/>
							<path
								class=class
								d=d
								fill="none"
								stroke=edge.style.stroke_color.clone()
								stroke-width=edge.style.stroke_width.to_string()
							/>
						</g>
					})
				})
				.collect_view()
		})
	};
	let preview = move || {
		ctx.handle.with(|s| match s.gesture() {
			Gesture::Connecting { node, port, cursor } => s
				.store()
				.node(node)
				.map(|n| render::preview_path(n, *port, *cursor)),
			_ => None,
		})
	};
	view! {
		<svg class="flow-edges" overflow="visible">
			{edges}
			{move || {
				preview()
					.map(|d| {
						view! {
							<path
								class="flow-edge-preview"
								d=d
								fill="none"
								stroke=DEFAULT_EDGE_COLOR
								stroke-dasharray="6 4"
							/>
						}
					})
			}}
		</svg>
	}
}

fn node_view(ctx: EditorCtx, id: NodeId, kind: NodeKind) -> impl IntoView {
	let node = Memo::new({
		let id = id.clone();
		move |_| ctx.handle.with(|s| s.store().node(&id).cloned())
	});
	let id = StoredValue::new(id);

	let frame = move || {
		node.with(|n| {
			n.as_ref()
				.map(|n| {
					let size = n.size();
					format!(
						"left: {}px; top: {}px; width: {}px; height: {}px;",
						n.position.x, n.position.y, size.width, size.height
					)
				})
				.unwrap_or_default()
		})
	};
	let class = move || {
		let selected = node.with(|n| n.as_ref().is_some_and(|n| n.selected));
		format!(
			"flow-node flow-{}{}",
			kind.type_name(),
			if selected { " selected" } else { "" }
		)
	};
	let select = move |ev: MouseEvent| {
		ev.stop_propagation();
		ctx.dispatch(EditorCommand::SelectNode(id.get_value()));
	};
	let drag = move |ev: PointerEvent| {
		ev.stop_propagation();
		ctx.editor.commit(ctx.handle);
		let pointer = ctx.pointer(&ev);
		ctx.dispatch(EditorCommand::BeginDrag {
			node: id.get_value(),
			pointer,
		});
	};

	let body = match kind {
		NodeKind::Group => group_body(ctx, id, node).into_any(),
		NodeKind::Table => view! {
			<div class="flow-table-title">{label_view(ctx, id, node)}</div>
			{columns_view(ctx, id, node)}
			{ports_view(ctx, id)}
		}
		.into_any(),
		NodeKind::Shape | NodeKind::Condition | NodeKind::Circle => view! {
			<div class="flow-node-label">{label_view(ctx, id, node)}</div>
			{ports_view(ctx, id)}
		}
		.into_any(),
	};

	if kind == NodeKind::Group {
		Either::Left(view! {
			<div class=class style=frame on:click=select>
				{body}
			</div>
		})
	} else {
		Either::Right(view! {
			<div class=class style=frame on:click=select on:pointerdown=drag>
				{body}
			</div>
		})
	}
}

fn label_view(ctx: EditorCtx, id: StoredValue<NodeId>, node: Memo<Option<Node>>) -> impl IntoView {
	let target = move || EditTarget::Label(id.get_value());
	let begin = move |ev: MouseEvent| {
		ev.stop_propagation();
		let draft = node.with_untracked(|n| n.as_ref().and_then(behaviors::begin_label_edit));
		if let Some(draft) = draft {
			ctx.editor.open(target(), draft, String::new());
		}
	};
	move || {
		if ctx.editor.is_editing(&target()) {
			Either::Left(draft_input(ctx, ctx.editor.name, "flow-label-input", true))
		} else {
			let label = node.with(|n| n.as_ref().map(|n| n.label.clone()).unwrap_or_default());
			Either::Right(view! {
				<div class="flow-label" on:dblclick=begin>
					{label}
				</div>
			})
		}
	}
}

/// Text input bound to one draft signal. Enter or blur commits the editor.
fn draft_input(
	ctx: EditorCtx,
	draft: RwSignal<String>,
	class: &'static str,
	focus: bool,
) -> impl IntoView {
	let input_ref = NodeRef::<html::Input>::new();
	Effect::new(move |_| {
		if let Some(input) = input_ref.get() {
			if focus {
				let _ = input.focus();
			}
		}
	});
	view! {
		<input
			node_ref=input_ref
			class=class
			prop:value=move || draft.get()
			on:input=move |ev| draft.set(event_target_value(&ev))
			on:blur=move |_| ctx.editor.commit(ctx.handle)
			on:keydown=move |ev: KeyboardEvent| {
				if ev.key() == "Enter" {
					ctx.editor.commit(ctx.handle);
				}
			}
			on:pointerdown=|ev: PointerEvent| ev.stop_propagation()
			on:click=|ev: MouseEvent| ev.stop_propagation()
		/>
	}
}

fn columns_view(ctx: EditorCtx, id: StoredValue<NodeId>, node: Memo<Option<Node>>) -> impl IntoView {
	let rows = move || {
		let columns: Vec<Column> =
			node.with(|n| n.as_ref().and_then(|n| n.columns()).map(<[Column]>::to_vec).unwrap_or_default());
		columns
			.into_iter()
			.enumerate()
			.map(move |(index, column)| column_row(ctx, id, node, index, column))
			.collect_view()
	};
	let add = move |ev: MouseEvent| {
		ev.stop_propagation();
		ctx.editor.commit(ctx.handle);
		let node_id = id.get_value();
		if ctx.dispatch(EditorCommand::AddColumn(node_id.clone())) {
			let index = node.with_untracked(|n| {
				n.as_ref()
					.and_then(|n| n.columns())
					.map_or(0, |c| c.len().saturating_sub(1))
			});
			ctx.editor.open(
				EditTarget::Column {
					node: node_id,
					index,
				},
				String::new(),
				String::new(),
			);
		}
	};
	view! {
		<ul class="flow-columns">{rows}</ul>
		{(!ctx.read_only)
			.then(|| {
				view! {
					<button
						class="flow-add-column"
						on:click=add
						on:pointerdown=|ev: PointerEvent| ev.stop_propagation()
					>
						"＋ 컬럼 추가"
					</button>
				}
			})}
	}
}

fn column_row(
	ctx: EditorCtx,
	id: StoredValue<NodeId>,
	node: Memo<Option<Node>>,
	index: usize,
	column: Column,
) -> impl IntoView {
	let target = move || EditTarget::Column {
		node: id.get_value(),
		index,
	};
	let begin = move |ev: MouseEvent| {
		ev.stop_propagation();
		let drafts = node.with_untracked(|n| {
			n.as_ref()
				.and_then(|n| behaviors::begin_column_edit(n, index))
		});
		if let Some((name, ty)) = drafts {
			ctx.editor.open(target(), name, ty);
		}
	};
	let start_sort = move |ev: PointerEvent| {
		ev.stop_propagation();
		ctx.dispatch(EditorCommand::BeginColumnSort {
			node: id.get_value(),
			index,
		});
	};
	let drop_here = move |_: PointerEvent| {
		ctx.dispatch(EditorCommand::DropOnColumn {
			node: id.get_value(),
			index,
		});
	};
	let delete = move |ev: MouseEvent| {
		ev.stop_propagation();
		if ctx.editor.is_editing(&target()) {
			ctx.editor.cancel();
		}
		ctx.dispatch(EditorCommand::DeleteColumn {
			node: id.get_value(),
			index,
		});
	};
	let cells = move || {
		if ctx.editor.is_editing(&target()) && !ctx.read_only {
			Either::Left((
				draft_input(ctx, ctx.editor.name, "flow-column-name", true),
				draft_input(ctx, ctx.editor.ty, "flow-column-type", false),
			))
		} else {
			Either::Right(view! {
				<span
					class="flow-column-name"
					on:dblclick=begin
					on:pointerdown=|ev: PointerEvent| ev.stop_propagation()
				>
					{column.name.clone()}
				</span>
				<span
					class="flow-column-type"
					on:dblclick=begin
					on:pointerdown=|ev: PointerEvent| ev.stop_propagation()
				>
					{column.ty.clone()}
				</span>
			})
		}
	};
	view! {
		<li class="flow-column" on:pointerup=drop_here>
			<span class="flow-drag-handle" on:pointerdown=start_sort>
				"☰"
			</span>
			{cells}
			{(!ctx.read_only)
				.then(|| {
					view! {
						<button
							class="flow-delete-column"
							on:click=delete
							on:pointerdown=|ev: PointerEvent| ev.stop_propagation()
						>
							"✕"
						</button>
					}
				})}
		</li>
	}
}

fn group_body(ctx: EditorCtx, id: StoredValue<NodeId>, node: Memo<Option<Node>>) -> impl IntoView {
	let drag = move |ev: PointerEvent| {
		ev.stop_propagation();
		ctx.editor.commit(ctx.handle);
		let pointer = ctx.pointer(&ev);
		ctx.dispatch(EditorCommand::BeginDrag {
			node: id.get_value(),
			pointer,
		});
	};
	let resize = move |ev: PointerEvent| {
		ev.prevent_default();
		ev.stop_propagation();
		let pointer = ctx.pointer(&ev);
		ctx.dispatch(EditorCommand::BeginResize {
			node: id.get_value(),
			pointer,
		});
	};
	view! {
		<div class="flow-group-title" data-drag-handle="" on:pointerdown=drag>
			{label_view(ctx, id, node)}
		</div>
		{(!ctx.read_only)
			.then(|| {
				view! {
					<div class="flow-group-resize" title="크기 조절" on:pointerdown=resize>
						"⤡"
					</div>
				}
			})}
	}
}

fn ports_view(ctx: EditorCtx, id: StoredValue<NodeId>) -> impl IntoView {
	Port::ALL
		.into_iter()
		.map(move |port| {
			let begin = move |ev: PointerEvent| {
				ev.stop_propagation();
				let pointer = ctx.pointer(&ev);
				ctx.dispatch(EditorCommand::BeginConnect {
					node: id.get_value(),
					port,
					pointer,
				});
			};
			let finish = move |_: PointerEvent| {
				ctx.dispatch(EditorCommand::DropOnPort {
					node: id.get_value(),
					port,
				});
			};
			let class = format!(
				"flow-port flow-port-{}{}",
				port.as_str(),
				if ctx.read_only { " hidden" } else { "" }
			);
			view! { <div class=class on:pointerdown=begin on:pointerup=finish></div> }
		})
		.collect_view()
}

#[component]
fn EdgeColorModal(ctx: EditorCtx) -> impl IntoView {
	let open = Memo::new(move |_| {
		!ctx.read_only && ctx.handle.with(|s| s.connections().color_editor().is_some())
	});
	let draft = move || {
		ctx.handle.with(|s| {
			s.connections()
				.color_editor()
				.map(|e| e.draft.clone())
				.unwrap_or_default()
		})
	};
	move || {
		open.get().then(|| {
			view! {
				<div class="flow-color-modal">
					<h2>"엣지 색상 선택"</h2>
					<div class="flow-color-row">
						<label>"색상"</label>
						<input
							type="color"
							prop:value=draft
							on:input=move |ev| {
								ctx.dispatch(EditorCommand::SetEdgeColorDraft(event_target_value(&ev)));
							}
						/>
						<button on:click=move |_| {
							ctx.dispatch(EditorCommand::ResetEdgeColorDraft);
						}>"↺"</button>
					</div>
					<div class="flow-color-actions">
						<button
							class="primary"
							on:click=move |_| {
								ctx.dispatch(EditorCommand::ConfirmEdgeColor);
							}
						>
							"확인"
						</button>
						<button on:click=move |_| {
							ctx.dispatch(EditorCommand::CloseEdgeColor);
						}>"취소"</button>
					</div>
				</div>
			}
		})
	}
}
