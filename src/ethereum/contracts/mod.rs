//! Smart contract bindings.

pub mod pancakeswap_v2;
pub mod pancakeswap_v3;
pub mod smart_router;

pub use crate::ethereum::constants::{BASE_TOKENS, WBNB_ADDRESS};
