//! Bridge between the egui thread and the tokio worker that owns the call session.

pub mod commands;
pub mod runtime;
