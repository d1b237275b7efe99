use leptos::prelude::*;
use leptos_router::components::A;

use super::home::FlowData;
use crate::components::flow_editor::{FlowEditor, FlowEditorHandle};

/// Read-only rendering of the last saved `flow_data`.
#[component]
pub fn Viewer() -> impl IntoView {
	let FlowData(flow_data) = use_context::<FlowData>().unwrap_or_else(FlowData::sample);
	let viewer = FlowEditorHandle::new(true);
	// A broken document still mounts, as an empty canvas.
	let _ = viewer.set_flow_json(&flow_data.get_untracked());

	view! {
		<div class="api-definition read-only">
			<header class="api-definition-header">
				<h1>"API 처리 흐름 (읽기 전용)"</h1>
				<A href="/">"편집으로 돌아가기"</A>
			</header>
			<FlowEditor handle=viewer height=Some(600.0) />
		</div>
	}
}
