pub mod events;
pub mod root;
