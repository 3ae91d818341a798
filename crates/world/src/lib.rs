//! Host world contract plus an in-memory host for tests and headless runs.

mod drop_item;
mod effect;
mod host;
mod pos;
mod sim;

pub use drop_item::*;
pub use effect::*;
pub use host::*;
pub use pos::*;
pub use sim::*;
