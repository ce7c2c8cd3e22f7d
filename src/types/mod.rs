// Shared domain types — used by the stores, the engine and the views.
// None of those layers depends on another for these; all import from here.

pub mod cycle;
pub mod identity;
pub mod issue;

pub use cycle::*;
pub use identity::*;
pub use issue::*;
