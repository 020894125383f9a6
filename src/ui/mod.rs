pub mod decoder;
pub mod draw;
pub mod line_edit;
pub mod terminal;
