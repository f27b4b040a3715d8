//! Type definitions module.
//!
//! Contains shared types used across the application.

pub mod account;
pub mod rpc;

pub use account::*;
pub use rpc::*;
