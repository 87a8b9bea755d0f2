mod commands;
mod event_loop;
mod events;

pub use commands::CataAction;
pub use event_loop::CataEditor;
pub use events::CataEvent;
