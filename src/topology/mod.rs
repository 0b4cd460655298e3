//! Agent and target topology records.
//!
//! These come from the control service and are used only as tag sources.

mod endpoint;
mod models;

pub use endpoint::*;
pub use models::*;
