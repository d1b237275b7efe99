use std::sync::Arc;

use leptos::prelude::*;
use leptos_router::components::A;
use log::{info, warn};

use crate::components::flow_editor::{FlowEditor, FlowEditorHandle, FlowError};

/// A small processing diagram so the editor never opens empty.
const SAMPLE_FLOW: &str = r##"{
	"nodes": [
		{ "id": "auth", "type": "customGroup", "position": { "x": 40, "y": 40 },
		  "style": { "width": 420, "height": 240 },
		  "data": { "label": "인증", "width": 420, "height": 240 } },
		{ "id": "check", "type": "condition", "position": { "x": 80, "y": 110 },
		  "data": { "label": "토큰 유효?" }, "parentGroupId": "auth" },
		{ "id": "users", "type": "table", "position": { "x": 560, "y": 60 },
		  "data": { "label": "users", "columns": [
			  { "name": "id", "type": "bigint" },
			  { "name": "email", "type": "varchar" }
		  ] } },
		{ "id": "reply", "type": "square", "position": { "x": 560, "y": 320 },
		  "data": { "label": "응답" } }
	],
	"edges": [
		{ "id": "e-check-users", "source": "check", "sourceHandle": "right",
		  "target": "users", "targetHandle": "left",
		  "style": { "stroke": "#3b82f6", "strokeWidth": 3 } },
		{ "id": "e-users-reply", "source": "users", "sourceHandle": "bottom",
		  "target": "reply", "targetHandle": "top" }
	]
}"##;

/// The API definition's `flow_data` field, shared between routes.
#[derive(Clone, Copy)]
pub struct FlowData(pub RwSignal<String>);

impl FlowData {
	pub fn sample() -> Self {
		Self(RwSignal::new(SAMPLE_FLOW.to_owned()))
	}
}

/// API definition screen: edits the diagram and persists it as `flow_data`.
#[component]
pub fn Home() -> impl IntoView {
	let FlowData(flow_data) = use_context::<FlowData>().unwrap_or_else(FlowData::sample);
	let editor = FlowEditorHandle::new(false);
	// Outcome of the last load or save, surfaced through the error boundary.
	let status = RwSignal::new(Ok::<(), Arc<FlowError>>(()));
	status.set(editor.set_flow_json(&flow_data.get_untracked()).map_err(Arc::new));

	let save = move |_| {
		// Highlight widths must not be persisted.
		editor.reset_edge_styles();
		let saved = editor.get_flow().to_json_pretty().map(|text| {
			info!("saved flow_data ({} bytes)", text.len());
			flow_data.set(text);
		});
		if let Err(err) = &saved {
			warn!("could not save flow: {err}");
		}
		status.set(saved.map_err(Arc::new));
	};
	let load = move |_| status.set(editor.set_flow_json(&flow_data.get_untracked()).map_err(Arc::new));
	let clear = move |_| {
		editor.clear_flow();
		status.set(Ok(()));
	};

	view! {
		<div class="api-definition">
			<header class="api-definition-header">
				<h1>"API 처리 흐름"</h1>
				<nav class="api-definition-actions">
					<button on:click=save>"저장"</button>
					<button on:click=load>"불러오기"</button>
					<button on:click=clear>"초기화"</button>
					<A href="/view">"읽기 전용 보기"</A>
				</nav>
			</header>
			<ErrorBoundary fallback=|errors| {
				view! {
					<div class="flow-status error">
						<p>"Errors: "</p>
						<ul>
							{move || {
								errors
									.get()
									.into_iter()
									.map(|(_, e)| view! { <li>{e.to_string()}</li> })
									.collect_view()
							}}
						</ul>
					</div>
				}
			}>{move || status.get()}</ErrorBoundary>
			<FlowEditor handle=editor height=Some(520.0) />
			<label class="flow-data">
				"flow_data"
				<textarea
					prop:value=move || flow_data.get()
					on:input=move |ev| flow_data.set(event_target_value(&ev))
					rows="12"
				/>
			</label>
		</div>
	}
}
