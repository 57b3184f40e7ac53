//! HTTP API layer.
//!
//! Exposes the swap/quote façade, the external catalog and the token
//! registry as JSON endpoints.

pub mod dto;
pub mod routes;
pub mod server;
pub mod state;

pub use server::{create_app, start_server};
pub use state::AppState;
