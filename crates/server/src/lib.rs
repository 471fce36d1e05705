pub mod api;
pub mod metrics;
pub mod monitor;
pub mod state;
