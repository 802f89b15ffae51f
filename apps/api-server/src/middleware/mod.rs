//! Middleware modules.

pub mod error;
pub mod user_id;
