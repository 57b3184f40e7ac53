//! BNB Smart Chain interaction module.
//!
//! Contains the RPC client, PancakeSwap contract bindings and the smart
//! order router used by the swap façade.

pub mod client;
pub mod constants;
pub mod contracts;
pub mod router;

pub use client::{ChainClient, HttpProvider};
pub use router::{PancakeSmartRouter, SmartRouter};
