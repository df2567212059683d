//! Commands - transport-agnostic bridge for administrative tooling
//!
//! Each function maps onto one engine operation. Failures come back as
//! [`CommandError`] carrying an HTTP-equivalent status.

mod connections;
mod error;
mod sync;
mod systems;

pub use connections::*;
pub use error::{CommandError, CommandResult};
pub use sync::*;
pub use systems::*;
