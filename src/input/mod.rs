pub mod events;
pub mod handler;

// Re-export the essential types
pub use events::{InputEvent, KeyCode, KeyModifiers, MouseButton};
pub use handler::{InputHandler, InteractionState};
