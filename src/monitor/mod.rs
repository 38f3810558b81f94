//! Status classification and poll-cycle aggregation.

mod aggregate;
mod classify;
mod models;

pub use aggregate::*;
pub use classify::*;
pub use models::*;
