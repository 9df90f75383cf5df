//! UI layer for desktop GUI: the call panel window.

pub mod app;

pub use app::CallpadApp;
