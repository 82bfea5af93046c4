//! Middleware modules.

pub mod context;
pub mod error;
