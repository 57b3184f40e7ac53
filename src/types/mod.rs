//! Type definitions module.
//!
//! Contains shared types used across the application.

pub mod swap;
pub mod token;

pub use swap::*;
pub use token::*;
