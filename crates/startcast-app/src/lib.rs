// Library root: config, data loading, league store, and output formatting
// around the projection engine, exposed for the binary and integration tests.

pub mod api;
pub mod config;
pub mod export;
pub mod leagues;
pub mod teams;
