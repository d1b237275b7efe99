//! Leptos client-side app wiring and routes.

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::path;
use log::{Level, info};

// Modules
pub mod components;
mod pages;

// Top-Level pages
use crate::pages::home::{FlowData, Home};
use crate::pages::not_found::NotFound;
use crate::pages::viewer::Viewer;

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("Logging initialized");
}

/// An app router which renders the flow editor page, the read-only viewer and handles 404's
#[component]
pub fn App() -> impl IntoView {
	// Provides context that manages stylesheets, titles, meta tags, etc.
	provide_meta_context();

	// The `flow_data` string shared by the editor and the viewer.
	provide_context(FlowData::sample());

	view! {
		<Html attr:lang="ko" attr:dir="ltr" attr:data-theme="light" />

		// sets the document title
		<Title text="API Flow Editor" />

		// injects metadata in the <head> of the page
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<Router>
			<Routes fallback=|| view! { <NotFound /> }>
				<Route path=path!("/") view=Home />
				<Route path=path!("/view") view=Viewer />
			</Routes>
		</Router>
	}
}
