// Library crate for integration tests.
// main.rs has its own mod declarations; this re-exports all modules.

pub mod collector;
pub mod config;
pub mod custom_status;
pub mod error;
pub mod metrics;
pub mod routes;
pub mod scheduler;
pub mod server;
pub mod state;
pub mod testrail;
