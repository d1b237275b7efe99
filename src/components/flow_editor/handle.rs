use leptos::prelude::*;
use log::warn;

use super::serialize::{FlowDocument, FlowError};
use super::shell::{EditorCommand, EditorShell};

/// Imperative access to a mounted [`FlowEditor`](super::FlowEditor).
///
/// The hosting screen creates the handle, passes it to the editor as a prop and
/// keeps a copy to load and read the flow. The read-only flag is fixed here.
#[derive(Clone, Copy)]
pub struct FlowEditorHandle {
	shell: RwSignal<EditorShell>,
}

impl FlowEditorHandle {
	pub fn new(read_only: bool) -> Self {
		Self {
			shell: RwSignal::new(EditorShell::new(read_only)),
		}
	}

	pub fn read_only(&self) -> bool {
		self.shell.with_untracked(EditorShell::read_only)
	}

	pub fn get_flow(&self) -> FlowDocument {
		self.shell.with_untracked(EditorShell::get_flow)
	}

	pub fn set_flow(&self, doc: &FlowDocument) {
		self.shell.update(|s| s.set_flow(doc));
	}

	/// Loads a `flow_data` string. Unparsable text leaves an empty canvas and
	/// the error is handed back for the host to report.
	pub fn set_flow_json(&self, text: &str) -> Result<(), FlowError> {
		match FlowDocument::from_json(text) {
			Ok(doc) => {
				self.set_flow(&doc);
				Ok(())
			}
			Err(err) => {
				warn!("{err}; showing an empty flow");
				self.clear_flow();
				Err(err)
			}
		}
	}

	pub fn clear_flow(&self) {
		self.shell.update(EditorShell::clear_flow);
	}

	/// Must run right before [`get_flow`](Self::get_flow) when saving.
	pub fn reset_edge_styles(&self) {
		self.shell.update(EditorShell::reset_edge_styles);
	}

	/// Sends a command to the shell. Commands that cannot apply do not notify views.
	pub fn dispatch(&self, command: EditorCommand) -> bool {
		let inert = self.shell.with_untracked(|s| {
			(s.read_only() && command.is_mutation())
				|| (matches!(command, EditorCommand::PointerMove { .. }) && s.gesture().is_idle())
		});
		if inert {
			return false;
		}
		let mut applied = false;
		self.shell.update(|s| applied = s.apply(command));
		applied
	}

	/// Tracked read access for views.
	pub fn with<R>(&self, f: impl FnOnce(&EditorShell) -> R) -> R {
		self.shell.with(f)
	}

	pub fn with_untracked<R>(&self, f: impl FnOnce(&EditorShell) -> R) -> R {
		self.shell.with_untracked(f)
	}
}

#[cfg(test)]
mod tests {
	use leptos::reactive::owner::Owner;

	use super::*;

	#[test]
	fn unparsable_text_clears_and_reports() {
		let owner = Owner::new();
		owner.set();

		let handle = FlowEditorHandle::new(false);
		handle
			.set_flow_json(r#"{"nodes":[{"id":"a","type":"circle"}],"edges":[]}"#)
			.unwrap();
		assert_eq!(handle.with_untracked(|s| s.store().nodes().len()), 1);

		assert!(matches!(
			handle.set_flow_json("{ broken"),
			Err(FlowError::Parse(_))
		));
		assert!(handle.with_untracked(|s| s.store().is_empty()));
	}
}
