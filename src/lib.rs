// Export modules for use in tests
pub mod bookmark;
pub mod comic;
pub mod geometry;
pub mod input;
pub mod main_app;
pub mod navigation;
pub mod panic_handler;
pub mod settings;
pub mod theme;
pub mod viewer;

pub mod test_utils;

// Re-export the pieces a host needs
pub use main_app::{App, run_app_with_event_source};
pub use viewer::{ViewTransform, ViewUpdate, Viewer, ViewerOptions};
