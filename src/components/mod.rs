pub mod flow_editor;
