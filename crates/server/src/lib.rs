//! HTTP gateway for the game library: search aggregation, library
//! management and a pass-through proxy to the backend.

pub mod api;
pub mod metrics;
pub mod state;
