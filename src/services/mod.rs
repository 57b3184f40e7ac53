//! Business logic services module.

pub mod catalog;
pub mod registry;
pub mod swap;

pub use catalog::TokenCatalog;
pub use registry::{CreateTokenRequest, DeleteTokenRequest, RegistryService, TokenPatchRequest};
pub use swap::SwapService;
