//! Controller layer: backend events, call panel state, and command dispatch.

pub mod events;
pub mod orchestration;
pub mod reducer;
