pub mod annotations;
pub mod client;
pub mod settings;

pub use annotations::{markers_for, AnnotationMap, MarkerRow, PALETTE_SIZE};
pub use client::{spawn_fetch, EventClient, FetchOutcome};
pub use settings::Settings;
