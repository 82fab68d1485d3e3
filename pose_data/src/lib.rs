pub mod document;
pub mod landmark;
pub mod player;
