//! Request handlers.

pub mod health;
pub mod recognize;

pub use health::*;
pub use recognize::*;
