//! Operator HTTP API

pub mod server;

pub use server::{router, ApiServer, AppState};
